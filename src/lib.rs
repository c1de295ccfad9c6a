#![no_std]

//! A frame synchronizer and decoder for rangefinder sensors streaming
//! fixed-size binary frames over a serial link.
//!
//! Rangeframe locates frame boundaries in an unbounded, possibly corrupted
//! byte stream, validates each frame's checksum, and decodes its fields. It
//! recovers from noise, dropped bytes, and false headers on its own, and
//! always prefers the freshest frame when the sensor outpaces the reader.
//!
//! Most users should begin with [`avec::Synchronizer`] and a preset from the
//! [`sensor`] module. Applications feeding bytes by other means (such as
//! those running on embedded systems) can drive the finite-state machine in
//! the [`sans`] module directly.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based byte source and deadline polling (default).
//! - `serialport`: enable a byte source over serial ports.
//! - `tracing`: emit trace-level events whenever bytes are discarded.

/// Emit a trace-level event when the `tracing` feature is enabled.
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    };
}

pub mod avec;
pub mod sans;
pub mod sensor;
