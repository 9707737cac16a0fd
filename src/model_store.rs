/// Persistence of the fitted vectorizer and forest as two bincode files
use crate::detector::PhishingDetector;
use crate::error::{DetectorError, Result};
use crate::random_forest::RandomForest;
use crate::vectorizer::TfidfVectorizer;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub const MODEL_FILE_NAME: &str = "phishing_rf_model.bin";
pub const VECTORIZER_FILE_NAME: &str = "tfidf_vectorizer.bin";

/// Locations of the two artifacts written by one training run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub model: PathBuf,
    pub vectorizer: PathBuf,
}

impl ModelPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE_NAME),
            vectorizer: dir.join(VECTORIZER_FILE_NAME),
        }
    }

    /// First artifact that is absent, if any
    pub fn first_missing(&self) -> Option<&Path> {
        [&self.model, &self.vectorizer]
            .into_iter()
            .find(|p| !p.is_file())
            .map(PathBuf::as_path)
    }
}

fn write_blob<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(writer, value)?;
    Ok(())
}

fn read_blob<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DetectorError::MissingArtifact {
            path: path.to_path_buf(),
        },
        _ => DetectorError::Io(e),
    })?;
    Ok(bincode::deserialize_from(BufReader::new(file))?)
}

pub fn save(detector: &PhishingDetector, paths: &ModelPaths) -> Result<()> {
    write_blob(&paths.model, detector.forest())?;
    write_blob(&paths.vectorizer, detector.vectorizer())?;
    tracing::info!(
        "Saved model to {} and vectorizer to {}",
        paths.model.display(),
        paths.vectorizer.display()
    );
    Ok(())
}

/// Load both artifacts. Fails with `MissingArtifact` before reading anything
/// if either file is absent.
pub fn load(paths: &ModelPaths) -> Result<PhishingDetector> {
    if let Some(missing) = paths.first_missing() {
        return Err(DetectorError::MissingArtifact {
            path: missing.to_path_buf(),
        });
    }

    let forest: RandomForest = read_blob(&paths.model)?;
    let vectorizer: TfidfVectorizer = read_blob(&paths.vectorizer)?;
    PhishingDetector::new(vectorizer, forest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names() {
        let paths = ModelPaths::in_dir("models");
        assert_eq!(paths.model, Path::new("models").join("phishing_rf_model.bin"));
        assert_eq!(paths.vectorizer, Path::new("models").join("tfidf_vectorizer.bin"));
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ModelPaths::in_dir(dir.path());
        match load(&paths) {
            Err(DetectorError::MissingArtifact { path }) => assert_eq!(path, paths.model),
            other => panic!("expected MissingArtifact, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ModelPaths::in_dir(dir.path());
        fs::write(&paths.model, b"not a model").unwrap();
        fs::write(&paths.vectorizer, b"not a vectorizer").unwrap();
        assert!(matches!(load(&paths), Err(DetectorError::Serialization(_))));
    }
}
