use crate::error::{DetectorError, Result};
use crate::model_store::ModelPaths;
use crate::random_forest::RandomForestConfig;
use crate::vectorizer::VectorizerConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    // Training input
    pub data_dir: PathBuf,

    // Artifact location, shared by training and serving
    pub model_dir: PathBuf,

    // Batch harness input
    pub mail_file: PathBuf,

    // Model hyperparameters
    pub max_features: usize,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
    pub holdout_ratio: f64,

    // HTTP server
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            model_dir: PathBuf::from("."),
            mail_file: PathBuf::from("mail.txt"),
            max_features: 5_000,
            n_trees: 100,
            max_depth: None,
            seed: 42,
            holdout_ratio: 0.0,
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            DetectorError::configuration(format!("{} has an invalid value: {:?}", key, raw))
        }),
        _ => Ok(default),
    }
}

impl Config {
    /// Read settings from the environment. Every setting has a default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let max_depth = match lookup("PHISHING_MAX_DEPTH") {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse().map_err(|_| {
                DetectorError::configuration(format!(
                    "PHISHING_MAX_DEPTH has an invalid value: {:?}",
                    raw
                ))
            })?),
            _ => defaults.max_depth,
        };

        let config = Config {
            data_dir: lookup("PHISHING_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            model_dir: lookup("PHISHING_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            mail_file: lookup("PHISHING_MAIL_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.mail_file),
            max_features: parse_var(&lookup, "PHISHING_MAX_FEATURES", defaults.max_features)?,
            n_trees: parse_var(&lookup, "PHISHING_N_TREES", defaults.n_trees)?,
            max_depth,
            seed: parse_var(&lookup, "PHISHING_SEED", defaults.seed)?,
            holdout_ratio: parse_var(&lookup, "PHISHING_HOLDOUT_RATIO", defaults.holdout_ratio)?,
            host: lookup("PHISHING_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PHISHING_PORT", defaults.port)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(DetectorError::configuration(
                "PHISHING_MAX_FEATURES must be at least 1",
            ));
        }
        if self.n_trees == 0 {
            return Err(DetectorError::configuration(
                "PHISHING_N_TREES must be at least 1",
            ));
        }
        if !(0.0..1.0).contains(&self.holdout_ratio) {
            return Err(DetectorError::configuration(
                "PHISHING_HOLDOUT_RATIO must be in [0.0, 1.0)",
            ));
        }
        Ok(())
    }

    pub fn model_paths(&self) -> ModelPaths {
        ModelPaths::in_dir(&self.model_dir)
    }

    pub fn vectorizer_config(&self) -> VectorizerConfig {
        VectorizerConfig::new().with_max_features(self.max_features)
    }

    pub fn forest_config(&self) -> RandomForestConfig {
        RandomForestConfig::new()
            .with_trees(self.n_trees)
            .with_max_depth(self.max_depth)
            .with_seed(self.seed)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn log_config(&self) {
        let paths = self.model_paths();
        tracing::info!("📋 Configuration:");
        tracing::info!("   Data directory: {}", self.data_dir.display());
        tracing::info!("   Model file: {}", paths.model.display());
        tracing::info!("   Vectorizer file: {}", paths.vectorizer.display());
        tracing::info!("   Max features: {}", self.max_features);
        tracing::info!("   Trees: {}", self.n_trees);
        match self.max_depth {
            Some(depth) => tracing::info!("   Max depth: {}", depth),
            None => tracing::info!("   Max depth: unlimited"),
        }
        tracing::info!("   Seed: {}", self.seed);
        tracing::info!("   Holdout ratio: {}", self.holdout_ratio);
    }
}
