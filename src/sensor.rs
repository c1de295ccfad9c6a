//! Presets for known rangefinder sensors.
//!
//! Interpretation helpers in this module encode the manufacturers' published
//! guidance. The synchronizer itself never applies them.

use core::time::Duration;

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    byteorder::little_endian::U16,
};

use crate::{
    avec::{ByteSource, FromReading, Synchronizer},
    sans::{
        check::compute_checksum,
        format::{ChecksumKind, ChecksumSpan, FieldSpec, FrameFormat},
    },
};

const TF350_FIELDS: &[FieldSpec] = &[
    FieldSpec::le("distance", 2, 2),
    FieldSpec::le("strength", 4, 2),
    FieldSpec::le("reserved", 6, 2),
];

const TFA1500_FIELDS: &[FieldSpec] = &[FieldSpec::le("distance", 1, 3)];

/// TF350 frame: `59 59`, distance, strength, reserved, and a sum over the
/// whole frame.
pub const TF350: FrameFormat = match FrameFormat::new(
    &[0x59, 0x59],
    9,
    ChecksumKind::SumMod256,
    ChecksumSpan::Frame,
    TF350_FIELDS,
) {
    Ok(format) => format,
    Err(_) => panic!("TF350 frame format is inconsistent"),
};

/// TFA1500 frame: `5C`, a 24-bit distance, and an inverted sum over the
/// distance bytes only.
pub const TFA1500: FrameFormat = match FrameFormat::new(
    &[0x5C],
    5,
    ChecksumKind::InvertedSumMod256,
    ChecksumSpan::Payload,
    TFA1500_FIELDS,
) {
    Ok(format) => format,
    Err(_) => panic!("TFA1500 frame format is inconsistent"),
};

/// A supported sensor model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Tf350,
    Tfa1500,
}

impl Sensor {
    /// Read timeout used by the vendor tools.
    pub const TIMEOUT: Duration = Duration::from_secs(1);

    pub fn format(self) -> FrameFormat {
        match self {
            Self::Tf350 => TF350,
            Self::Tfa1500 => TFA1500,
        }
    }

    /// Factory default baud rate. Both models use 8 data bits, no parity,
    /// and one stop bit.
    pub fn baud_rate(self) -> u32 {
        match self {
            Self::Tf350 => 115_200,
            Self::Tfa1500 => 460_800,
        }
    }

    /// Start synchronizing with this sensor's frame format.
    pub fn synchronizer<S: ByteSource>(self, source: S) -> Synchronizer<S> {
        Synchronizer::new(source, self.format())
    }
}

/// Reliability of a TF350 distance, judged by its signal strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalQuality {
    /// Below 40: the distance may be clamped to the maximum range.
    Weak,
    /// 40 to 1200.
    Reliable,
    /// 1201 to 1500, which the datasheet does not rate.
    Unrated,
    /// Above 1500: a highly reflective object, possibly an artifact.
    HighReflectivity,
}

impl SignalQuality {
    pub fn classify(strength: u32) -> Self {
        match strength {
            0..40 => Self::Weak,
            40..=1200 => Self::Reliable,
            1201..=1500 => Self::Unrated,
            _ => Self::HighReflectivity,
        }
    }
}

/// What a TFA1500 distance describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// No object detected, or out of range.
    NoTarget,
    /// Distance to an object, in centimeters.
    Distance(u32),
}

impl Target {
    /// A zero distance means nothing was detected.
    pub fn from_distance(cm: u32) -> Self {
        match cm {
            0 => Self::NoTarget,
            cm => Self::Distance(cm),
        }
    }
}

/// A decoded TF350 reading.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tf350Measurement {
    pub distance_cm: Option<u16>,
    pub strength: Option<u16>,
    pub reserved: Option<u16>,
}

impl Tf350Measurement {
    pub fn quality(&self) -> Option<SignalQuality> {
        self.strength.map(|s| SignalQuality::classify(s.into()))
    }
}

impl FromReading for Tf350Measurement {
    fn add_field(&mut self, name: &str, value: u32) {
        let slot = match name {
            "distance" => &mut self.distance_cm,
            "strength" => &mut self.strength,
            "reserved" => &mut self.reserved,
            _ => return,
        };

        *slot = value.try_into().ok();
    }
}

/// A decoded TFA1500 reading.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tfa1500Measurement {
    pub target: Option<Target>,
}

impl FromReading for Tfa1500Measurement {
    fn add_field(&mut self, name: &str, value: u32) {
        if name == "distance" {
            self.target = Some(Target::from_distance(value));
        }
    }
}

/// Wire layout of a TF350 frame, for emulating the sensor.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct Tf350Frame {
    header: [u8; 2],
    distance: U16,
    strength: U16,
    reserved: U16,
    checksum: u8,
}

impl Tf350Frame {
    pub fn new(distance: u16, strength: u16, reserved: u16) -> Self {
        let mut frame = Self {
            header: [0x59, 0x59],
            distance: U16::new(distance),
            strength: U16::new(strength),
            reserved: U16::new(reserved),
            checksum: 0,
        };

        frame.checksum = compute_checksum(ChecksumKind::SumMod256, &frame.as_bytes()[..8]);
        frame
    }

    /// Replace the checksum, for example to emulate line noise.
    pub fn with_checksum(self, checksum: u8) -> Self {
        Self { checksum, ..self }
    }

    pub fn distance(&self) -> u16 {
        self.distance.get()
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }
}

/// Wire layout of a TFA1500 frame, for emulating the sensor.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct Tfa1500Frame {
    header: u8,
    distance: [u8; 3],
    checksum: u8,
}

impl Tfa1500Frame {
    /// Bits above the 24-bit range are dropped.
    pub fn new(distance: u32) -> Self {
        let [a, b, c, _] = distance.to_le_bytes();
        let distance = [a, b, c];

        Self {
            header: 0x5C,
            distance,
            checksum: compute_checksum(ChecksumKind::InvertedSumMod256, &distance),
        }
    }

    pub fn with_checksum(self, checksum: u8) -> Self {
        Self { checksum, ..self }
    }

    pub fn distance(&self) -> u32 {
        let [a, b, c] = self.distance;
        u32::from_le_bytes([a, b, c, 0])
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_strength_thresholds() {
        assert_eq!(SignalQuality::classify(0), SignalQuality::Weak);
        assert_eq!(SignalQuality::classify(39), SignalQuality::Weak);
        assert_eq!(SignalQuality::classify(40), SignalQuality::Reliable);
        assert_eq!(SignalQuality::classify(1200), SignalQuality::Reliable);
        assert_eq!(SignalQuality::classify(1201), SignalQuality::Unrated);
        assert_eq!(SignalQuality::classify(1500), SignalQuality::Unrated);
        assert_eq!(SignalQuality::classify(1501), SignalQuality::HighReflectivity);
    }

    #[test]
    fn zero_distance_is_no_target() {
        assert_eq!(Target::from_distance(0), Target::NoTarget);
        assert_eq!(Target::from_distance(1), Target::Distance(1));
    }

    #[test]
    fn wire_frames_match_generic_encoder() {
        let frame = Tf350Frame::new(100, 200, 0);
        assert_eq!(frame.as_bytes(), TF350.encode(&[100, 200, 0]).as_slice());
        assert_eq!(frame.checksum(), 0xDE);

        let frame = Tfa1500Frame::new(0x012345);
        assert_eq!(frame.as_bytes(), TFA1500.encode(&[0x012345]).as_slice());
        assert_eq!(frame.distance(), 0x012345);
    }

    #[test]
    fn sensor_selects_format() {
        let frame = Tfa1500Frame::new(321);
        let mut sync = Sensor::Tfa1500.synchronizer(frame.as_bytes());

        let reading = sync.next_reading().unwrap().decoded().unwrap();
        let measurement: Tfa1500Measurement = reading.to();
        assert_eq!(measurement.target, Some(Target::Distance(321)));
        assert_eq!(Sensor::Tfa1500.baud_rate(), 460_800);
    }

    #[test]
    fn wire_frame_reads_back() {
        let bytes = [0x59, 0x59, 0x64, 0x00, 0xC8, 0x00, 0x00, 0x00, 0xDE];
        let frame = Tf350Frame::read_from_bytes(&bytes).unwrap();
        assert_eq!(frame.distance(), 100);
        assert_eq!(frame.checksum(), 0xDE);
    }
}
