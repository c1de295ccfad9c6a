//! Internal finite-state machine for locating and decoding frames.
//!
//! This module is intended for applications that need fine control over how
//! bytes reach the decoder, such as those feeding it from an interrupt handler
//! or a DMA buffer. See [`crate::avec`] for a synchronizer driving these states
//! from any [`ByteSource`](crate::avec::ByteSource).
//!
//! # Architecture
//!
//! Every state is represented by a non-copy token. Once enough bytes are
//! ready, transition to another state by calling the token's `advance` method
//! with the [`FrameFormat`](format::FrameFormat) in use. This returns a
//! successor state token, along with any decoded data.
//!
//! ```text
//! Scanning --header--> HeaderMatched --remainder--> Validating --> Reading
//!    ^                      |                           |
//!    +------ short read ----+------- bad checksum ------+
//! ```
//!
//! Some parts of synchronization are not represented in the finite-state
//! machine and must be carefully written:
//!
//! - Re-scanning the bytes returned by a
//! [`ChecksumMismatch`](sync::ChecksumMismatch) before reading new ones.
//!
//! - Discarding stale bytes when the producer outpaces the consumer.
//!
//! Implementers are recommended to begin by studying
//! [`Synchronizer`](crate::avec::Synchronizer).

pub mod check;
pub mod format;
pub mod reading;
pub mod sync;

/// Entrypoint to the finite-state machine.
pub type Decoder = sync::Scanning;
