/// End-to-end training, persistence and reload
mod common;

use phishing_detector::dataset_loader::CsvDirectoryLoader;
use phishing_detector::decision_tree::Node;
use phishing_detector::implementations::InMemoryDataset;
use phishing_detector::model_store::{self, ModelPaths};
use phishing_detector::training::{train, TrainingOptions};
use phishing_detector::{DetectorError, Label};
use serde::Serialize;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_train_save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let paths = ModelPaths::in_dir(dir.path());
    let dataset = InMemoryDataset::new("fixture", common::fixture_records());

    let report = train(&dataset, &common::fixture_options(), &paths).unwrap();
    assert_eq!(report.records, 32);
    assert_eq!(report.train_records, 32);
    assert_eq!(report.trees, 50);
    assert!(report.evaluation.is_none());
    assert!(paths.model.is_file());
    assert!(paths.vectorizer.is_file());

    let original = common::fixture_detector();
    let loaded = model_store::load(&paths).unwrap();

    let held_out = [
        common::PHISHING_SAMPLE,
        common::LEGITIMATE_SAMPLE,
        "Please verify the meeting agenda before lunch",
        "completely unrelated words zebra",
    ];
    for text in held_out {
        assert_eq!(
            original.vectorizer().transform(text),
            loaded.vectorizer().transform(text)
        );
        let a = original.predict(text).unwrap();
        let b = loaded.predict(text).unwrap();
        assert_eq!(a.label, b.label);
        assert!((a.confidence() - b.confidence()).abs() < 1e-9);
    }
}

#[test]
fn test_probabilities_always_sum_to_one() {
    let detector = common::fixture_detector();
    let texts = common::PHISHING_EMAILS
        .iter()
        .chain(common::LEGITIMATE_EMAILS)
        .copied()
        .chain(["", "zzz", "verify meeting payment lunch"]);

    for text in texts {
        let prediction = detector.predict(text).unwrap();
        let [p0, p1] = prediction.probabilities;
        assert!((p0 + p1 - 1.0).abs() < 1e-9, "text {:?}", text);
    }
}

#[test]
fn test_training_fits_the_fixture_corpus() {
    let detector = common::fixture_detector();
    assert_eq!(
        detector.predict(common::PHISHING_SAMPLE).unwrap().label,
        Label::Phishing
    );
    assert_eq!(
        detector.predict(common::LEGITIMATE_SAMPLE).unwrap().label,
        Label::Legitimate
    );
}

#[test]
fn test_holdout_evaluation() {
    let dir = TempDir::new().unwrap();
    let paths = ModelPaths::in_dir(dir.path());
    let dataset = InMemoryDataset::new("fixture", common::fixture_records());
    let options = TrainingOptions {
        holdout_ratio: 0.25,
        ..common::fixture_options()
    };

    let report = train(&dataset, &options, &paths).unwrap();
    let evaluation = report.evaluation.expect("holdout evaluation");
    assert_eq!(evaluation.total(), 8);
    assert_eq!(report.train_records, 24);
}

#[test]
fn test_no_usable_files_fits_nothing() {
    let data = TempDir::new().unwrap();
    fs::write(data.path().join("a.csv"), "subject,from\nhello,me\n").unwrap();
    let out = TempDir::new().unwrap();
    let paths = ModelPaths::in_dir(out.path());

    let result = train(
        &CsvDirectoryLoader::new(data.path()),
        &common::fixture_options(),
        &paths,
    );

    assert!(matches!(result, Err(DetectorError::Configuration(_))));
    assert!(!paths.model.exists());
    assert!(!paths.vectorizer.exists());
}

#[test]
fn test_mismatched_artifacts_are_rejected() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let first_paths = ModelPaths::in_dir(first.path());
    let second_paths = ModelPaths::in_dir(second.path());

    let full = InMemoryDataset::new("full", common::fixture_records());
    train(&full, &common::fixture_options(), &first_paths).unwrap();

    let small_options = TrainingOptions {
        vectorizer: common::fixture_options().vectorizer.with_max_features(10),
        ..common::fixture_options()
    };
    train(&full, &small_options, &second_paths).unwrap();

    // model from one run, vectorizer from the other
    let mixed = ModelPaths {
        model: first_paths.model.clone(),
        vectorizer: second_paths.vectorizer.clone(),
    };
    assert!(matches!(
        model_store::load(&mixed),
        Err(DetectorError::ArtifactMismatch { .. })
    ));
}

/// Same bincode layout as a persisted forest
#[derive(Serialize)]
struct ForestFile {
    n_features: usize,
    trees: Vec<TreeFile>,
}

#[derive(Serialize)]
struct TreeFile {
    nodes: Vec<Node>,
}

#[test]
fn test_malformed_forest_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let paths = ModelPaths::in_dir(dir.path());
    let dataset = InMemoryDataset::new("fixture", common::fixture_records());
    train(&dataset, &common::fixture_options(), &paths).unwrap();
    let n_features = model_store::load(&paths).unwrap().forest().n_features();

    let split = |left, right| Node::Split {
        feature: 0,
        threshold: 0.5,
        left,
        right,
    };
    let leaf = Node::Leaf { counts: [1, 1] };
    let cases = [
        ("empty forest", vec![]),
        (
            "child out of range",
            vec![TreeFile {
                nodes: vec![split(99, 99)],
            }],
        ),
        (
            "self loop",
            vec![TreeFile {
                nodes: vec![split(0, 1), leaf.clone()],
            }],
        ),
        (
            "feature out of range",
            vec![TreeFile {
                nodes: vec![
                    Node::Split {
                        feature: n_features,
                        threshold: 0.5,
                        left: 1,
                        right: 2,
                    },
                    leaf.clone(),
                    leaf.clone(),
                ],
            }],
        ),
    ];

    for (name, trees) in cases {
        let forest = ForestFile { n_features, trees };
        fs::write(&paths.model, bincode::serialize(&forest).unwrap()).unwrap();
        assert!(
            matches!(model_store::load(&paths), Err(DetectorError::InvalidModel(_))),
            "{} was accepted",
            name
        );
    }
}
