// Core modules
pub mod config;
pub mod error;
pub mod traits;

// Corpus loading
pub mod dataset_loader;
pub mod dataset_splitter;
pub mod implementations;

// Feature extraction and classification
pub mod decision_tree;
pub mod detector;
pub mod random_forest;
pub mod stop_words;
pub mod text_cleaner;
pub mod vectorizer;

// Persistence, training and the serving surfaces
pub mod mail_scanner;
pub mod model_store;
pub mod server;
pub mod training;

pub use detector::{PhishingDetector, Prediction};
pub use error::{DetectorError, Result};
pub use traits::{CanonicalRecord, Label};
