/// Scan a local email file and print a detection report
///
/// Reads `mail.txt` (or `PHISHING_MAIL_FILE`) from the working directory.
use phishing_detector::config::Config;
use phishing_detector::mail_scanner::scan_file;
use phishing_detector::model_store;
use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let detector = match model_store::load(&config.model_paths()) {
        Ok(detector) => detector,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match scan_file(&detector, &config.mail_file) {
        Ok(outcome) => {
            println!("\n{}", outcome.render());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
