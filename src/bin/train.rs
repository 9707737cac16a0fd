/// Train the phishing classifier
///
/// Merges every CSV under the data directory, fits the TF-IDF vectorizer and
/// the Random Forest, and writes both artifacts next to each other.
use anyhow::{Context, Result};
use phishing_detector::config::Config;
use phishing_detector::dataset_loader::CsvDirectoryLoader;
use phishing_detector::training::{train, TrainingOptions};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    config.log_config();

    let options = TrainingOptions {
        vectorizer: config.vectorizer_config(),
        forest: config.forest_config(),
        holdout_ratio: config.holdout_ratio,
    };
    let paths = config.model_paths();
    let loader = CsvDirectoryLoader::new(&config.data_dir);

    let report = train(&loader, &options, &paths).context("Training failed")?;

    if let Some(evaluation) = &report.evaluation {
        evaluation.print();
    }

    println!(
        "Success: model trained on {} of {} emails ({} features, {} trees) in {:.1}s",
        report.train_records, report.records, report.vocabulary_size, report.trees, report.elapsed_secs
    );
    println!("   Model:      {}", paths.model.display());
    println!("   Vectorizer: {}", paths.vectorizer.display());

    Ok(())
}
