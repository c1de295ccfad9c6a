mod common;

use proptest::prelude::*;
use rangeframe::{
    avec::Synchronizer,
    sans::{
        check::{compute_checksum, validate_checksum},
        format::ChecksumKind,
    },
    sensor::{TF350, TFA1500},
};

fn kind() -> impl Strategy<Value = ChecksumKind> {
    prop_oneof![
        Just(ChecksumKind::SumMod256),
        Just(ChecksumKind::InvertedSumMod256),
    ]
}

proptest! {
    #[test]
    fn checksum_accepts_its_own_span(kind in kind(), span in prop::collection::vec(any::<u8>(), 0..16)) {
        prop_assert!(validate_checksum(kind, &span, compute_checksum(kind, &span)));
    }

    #[test]
    fn checksum_detects_single_bit_flip_in_span(
        kind in kind(),
        span in prop::collection::vec(any::<u8>(), 1..16),
        index in any::<prop::sample::Index>(),
        bit in 0..8u8,
    ) {
        let checksum = compute_checksum(kind, &span);

        let mut corrupted = span.clone();
        corrupted[index.index(span.len())] ^= 1 << bit;

        prop_assert!(!validate_checksum(kind, &corrupted, checksum));
    }

    #[test]
    fn checksum_detects_single_bit_flip_in_checksum(
        kind in kind(),
        span in prop::collection::vec(any::<u8>(), 0..16),
        bit in 0..8u8,
    ) {
        let checksum = compute_checksum(kind, &span) ^ (1 << bit);
        prop_assert!(!validate_checksum(kind, &span, checksum));
    }

    #[test]
    fn tf350_frame_survives_noise(
        distance in any::<u16>(),
        strength in any::<u16>(),
        lead in 0..64usize,
        seed in any::<u32>(),
    ) {
        let mut stream = common::noise(lead, seed, &[0x59]);
        stream.extend_from_slice(TF350.encode(&[distance.into(), strength.into(), 0]).as_slice());

        let mut readings = Synchronizer::new(common::Trickle::new(&stream), TF350).into_readings();
        let reading = readings.next().and_then(Result::ok);

        prop_assert_eq!(reading.and_then(|r| r.distance()), Some(u32::from(distance)));
        prop_assert_eq!(reading.and_then(|r| r.get("strength")), Some(u32::from(strength)));
    }

    #[test]
    fn tfa1500_frame_survives_noise(
        distance in 0..(1u32 << 24),
        lead in 0..64usize,
        seed in any::<u32>(),
    ) {
        let mut stream = common::noise(lead, seed, &[0x5C]);
        stream.extend_from_slice(TFA1500.encode(&[distance]).as_slice());

        let mut readings = Synchronizer::new(common::Trickle::new(&stream), TFA1500).into_readings();
        let reading = readings.next().and_then(Result::ok);

        prop_assert_eq!(reading.and_then(|r| r.distance()), Some(distance));
    }
}
