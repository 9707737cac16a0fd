use crate::error::{DetectorError, Result};
use crate::traits::{CanonicalRecord, DatasetLoader};

/// Simple in-memory dataset for testing
pub struct InMemoryDataset {
    name: String,
    records: Vec<CanonicalRecord>,
}

impl InMemoryDataset {
    pub fn new(name: &str, records: Vec<CanonicalRecord>) -> Self {
        Self {
            name: name.to_string(),
            records,
        }
    }
}

impl DatasetLoader for InMemoryDataset {
    fn load_records(&self) -> Result<Vec<CanonicalRecord>> {
        if self.records.is_empty() {
            return Err(DetectorError::configuration(format!(
                "Dataset '{}' is empty",
                self.name
            )));
        }
        Ok(self.records.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
