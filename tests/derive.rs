#![cfg(feature = "derive")]

use rangeframe::{
    avec::{FromReading, Synchronizer},
    sensor::{SignalQuality, TF350, TFA1500, Target, Tf350Frame, Tfa1500Frame},
};
use zerocopy::IntoBytes;

#[derive(Debug, Default, FromReading)]
struct Lidar {
    #[field(distance)]
    distance_cm: Option<u32>,
    #[field(strength, |q, v: u32| *q = Some(SignalQuality::classify(v)))]
    quality: Option<SignalQuality>,
    #[field("reserved")]
    reserved: Option<u8>,
    unrelated: u8,
}

#[derive(Debug, Default, FromReading)]
struct History {
    #[field(distance, |h, v: u32| h.push(v))]
    distances: Vec<u32>,
}

#[test]
fn decode_into_struct() {
    let frame = Tf350Frame::new(412, 1800, 7);
    let mut sync = Synchronizer::new(frame.as_bytes(), TF350);
    let reading = sync.next_reading().unwrap().decoded().unwrap();

    let lidar: Lidar = reading.to();
    assert_eq!(lidar.distance_cm, Some(412));
    assert_eq!(lidar.quality, Some(SignalQuality::HighReflectivity));
    assert_eq!(lidar.reserved, Some(7));
    assert_eq!(lidar.unrelated, 0);
}

#[test]
fn skip_values_that_do_not_fit() {
    let frame = Tf350Frame::new(10, 20, 300);
    let mut sync = Synchronizer::new(frame.as_bytes(), TF350);
    let lidar: Lidar = sync.next_reading().unwrap().decoded().unwrap().to();

    assert_eq!(lidar.reserved, None);
}

#[test]
fn accumulate_across_readings() {
    let mut history = History::default();

    for distance in [0, 5, 9] {
        let frame = Tfa1500Frame::new(distance);
        let mut sync = Synchronizer::new(frame.as_bytes(), TFA1500);
        sync.next_reading()
            .unwrap()
            .decoded()
            .unwrap()
            .publish(&mut history);
    }

    assert_eq!(history.distances, [0, 5, 9]);
    assert_eq!(
        history.distances.iter().map(|d| Target::from_distance(*d)).next(),
        Some(Target::NoTarget)
    );
}
