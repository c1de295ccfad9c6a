//! Convenience interfaces for reading from live byte streams.
//!
//! A [`Synchronizer`] drives the finite-state machine in [`crate::sans`] from
//! any [`ByteSource`], recovering from noise, partial frames, and corrupted
//! frames on its own. Decoded readings can be published to the
//! [`FromReading`] trait, which can usually be derived. See the
//! [`FromReading`](macro@FromReading) macro for details.
//!
//! ```
//! let mut sync = Synchronizer::new(SerialSource::open("/dev/ttyUSB0", Sensor::Tf350)?, TF350);
//!
//! loop {
//!     if let Next::Decoded(reading) = sync.next_reading()? {
//!         let measurement: Tf350Measurement = reading.to();
//!         println!("{:?}", measurement);
//!     }
//! }
//! ```

#[cfg(feature = "std")]
pub mod reader;
#[cfg(feature = "serialport")]
pub mod serial;
pub mod source;
pub mod synchronizer;

#[cfg(feature = "std")]
pub use reader::IoSource;
#[cfg(feature = "serialport")]
pub use serial::SerialSource;
pub use source::ByteSource;
pub use synchronizer::{Error, Next, Readings, SCAN_LIMIT, SyncStats, Synchronizer};

use crate::sans::reading::Reading;

/// Derive [`FromReading`] for a struct receiving decoded field values.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive a field, add the `field(name)` attribute to an `Option<T>`
/// struct field, where `name` is the field name in the frame format and `T`
/// is any integer type a `u32` converts into with [`TryFrom`]. Values that do
/// not fit are skipped.
///
/// ```
/// #[derive(Debug, Default, FromReading)]
/// struct Measurement {
///     #[field(distance)]
///     distance_cm: Option<u32>,
///     #[field(strength)]
///     strength: Option<u16>,
/// }
/// ```
///
/// To decode into any other type, supply an accumulator closure. The first
/// argument is the struct field, the second the received value.
///
/// ```
/// #[derive(Debug, Default, FromReading)]
/// struct Measurement {
///     #[field(distance, |t, v: u32| *t = Some(Target::from_distance(v)))]
///     target: Option<Target>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use rangeframe_derive::FromReading;

/// Receive field values of a decoded reading.
///
/// See the [`FromReading`](macro@FromReading) derive macro for an automatic
/// implementation of this trait.
pub trait FromReading {
    /// Add the value of a named field.
    fn add_field(&mut self, name: &str, value: u32);
}

impl Reading {
    /// Publish every field value, in layout order, to a receiver.
    pub fn publish(&self, o: &mut impl FromReading) {
        for (name, value) in self.iter() {
            o.add_field(name, value);
        }
    }

    /// Build a receiver from its default value and publish to it.
    pub fn to<T: FromReading + Default>(&self) -> T {
        let mut o = T::default();
        self.publish(&mut o);
        o
    }
}
