use proptest::prelude::*;
use slotlog::{ConfigBuilder, ElementKind, LoggerError, Recorder};
use std::fs;
use std::path::Path;

fn start(path: &Path, kind: ElementKind, channels: usize, period: f64, format: &str) -> Recorder {
    let config = ConfigBuilder::new()
        .channels(channels)
        .window(0.0, 1.0)
        .sample_period(period)
        .kind(kind)
        .output_path(path)
        .format(format)
        .build()
        .unwrap();
    Recorder::start(config).unwrap()
}

#[test]
fn two_channel_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.dat");
    let mut rec = start(&path, ElementKind::Double, 2, 0.5, "%f ");
    assert_eq!(rec.record(0.0, &[1.0, 2.0]).unwrap(), Some(0));
    assert_eq!(rec.record(0.5, &[3.0, 4.0]).unwrap(), Some(1));
    assert_eq!(rec.record(1.0, &[5.0, 6.0]).unwrap(), Some(2));
    let report = rec.finish().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "1.000000 2.000000 \n3.000000 4.000000 \n5.000000 6.000000 \n"
    );
    assert_eq!(report.rows, 3);
    assert_eq!(report.channels, 2);
    assert_eq!(report.bytes, text.len() as u64);
}

#[test]
fn skipped_slots_drain_as_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sparse.dat");
    let mut rec = start(&path, ElementKind::Double, 2, 0.5, "%f ");
    rec.record(0.0, &[1.0, 2.0]).unwrap();
    rec.finish().unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "1.000000 2.000000 \n0.000000 0.000000 \n0.000000 0.000000 \n"
    );
}

#[test]
fn one_line_per_slot_and_one_token_per_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.dat");
    let mut rec = start(&path, ElementKind::Int16, 3, 0.1, "%d ");
    for k in 0..=10 {
        let t = k as f64 * 0.1;
        rec.record(t, &[k as i16, -(k as i16), 100]).unwrap();
    }
    rec.finish().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 11);
    for (k, line) in lines.iter().enumerate() {
        let tokens: Vec<i64> = line
            .split_whitespace()
            .map(|tok| tok.parse().unwrap())
            .collect();
        assert_eq!(tokens, vec![k as i64, -(k as i64), 100]);
    }
}

#[test]
fn existing_file_is_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.dat");
    fs::write(&path, "stale contents that are much longer than the new output\n").unwrap();
    let rec = start(&path, ElementKind::Boolean, 1, 1.0, "%d\t");
    rec.finish().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "0\t\n0\t\n");
}

#[test]
fn unwritable_path_reports_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.dat");
    let mut rec = start(&path, ElementKind::Double, 1, 0.5, "%f");
    rec.record(0.0, &[1.0]).unwrap();
    let err = rec.finish().unwrap_err();
    assert!(!err.is_fatal());
    match err {
        LoggerError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Io, got {:?}", other),
    }
    assert!(!path.exists());
}

#[test]
fn unsigned_and_hex_formats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hex.dat");
    let mut rec = start(&path, ElementKind::Uint8, 2, 1.0, "0x%02X,");
    rec.record(1.0, &[255u8, 10]).unwrap();
    rec.finish().unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "0x00,0x00,\n0xFF,0x0A,\n"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn drained_values_parse_back(values in prop::collection::vec(-1.0e6f64..1.0e6, 4)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.dat");
        let mut rec = start(&path, ElementKind::Double, 4, 1.0, "%.17g ");
        rec.record(1.0, &values).unwrap();
        rec.finish().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let last = text.lines().nth(1).unwrap();
        let parsed: Vec<f64> = last
            .split_whitespace()
            .map(|tok| tok.parse().unwrap())
            .collect();
        prop_assert_eq!(parsed, values);
    }
}
