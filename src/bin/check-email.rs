/// Classify an email pasted on standard input
use anyhow::{Context, Result};
use phishing_detector::config::Config;
use phishing_detector::mail_scanner::scan_text;
use phishing_detector::model_store;
use std::io::{self, Read, Write};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;
    let detector = model_store::load(&config.model_paths())?;

    print!("Paste email content here (end with Ctrl-D): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read standard input")?;

    if input.trim().is_empty() {
        println!("\n⚠️  No content provided.");
        return Ok(());
    }

    let prediction = scan_text(&detector, &input)?;
    println!();
    if prediction.is_phishing() {
        println!(
            "⚠️ ALERT: This looks like a PHISHING email. ({:.2}% confidence)",
            prediction.confidence()
        );
    } else {
        println!(
            "✅ This email seems SAFE. ({:.2}% confidence)",
            prediction.confidence()
        );
    }

    Ok(())
}
