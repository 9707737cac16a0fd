/// Tests for the file-based batch harness
mod common;

use phishing_detector::mail_scanner::{scan_file, ScanOutcome};
use phishing_detector::Label;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_short_file_is_not_scanned() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mail.txt");
    fs::write(&path, "  \n abc \n").unwrap();

    let outcome = scan_file(&common::fixture_detector(), &path).unwrap();
    assert_eq!(
        outcome,
        ScanOutcome::TooShort {
            path: path.clone(),
            chars: 3
        }
    );
    assert!(outcome.render().contains("too short"));
}

#[test]
fn test_missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mail.txt");

    let outcome = scan_file(&common::fixture_detector(), &path).unwrap();
    assert!(matches!(outcome, ScanOutcome::MissingFile { .. }));
    assert!(outcome.render().contains("not found"));
}

#[test]
fn test_phishing_file_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mail.txt");
    fs::write(
        &path,
        "Dear customer,\r\n\r\nYour Amazon order has a PROBLEM.\n\tClick https://amaz0n.example/verify to verify your payment info immediately.\n",
    )
    .unwrap();

    let outcome = scan_file(&common::fixture_detector(), &path).unwrap();
    let ScanOutcome::Scanned(prediction) = &outcome else {
        panic!("expected a scan, got {:?}", outcome);
    };
    assert_eq!(prediction.label, Label::Phishing);
    assert!(prediction.confidence() > 50.0);

    let report = outcome.render();
    assert!(report.contains("PHISHING DETECTION REPORT"));
    assert!(report.contains("PHISHING DETECTED"));
}

#[test]
fn test_invalid_utf8_is_read_lossily() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mail.txt");
    let mut bytes = b"Team meeting agenda attached ".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    fs::write(&path, bytes).unwrap();

    let outcome = scan_file(&common::fixture_detector(), &path).unwrap();
    assert!(matches!(outcome, ScanOutcome::Scanned(_)));
}
