/// Batch harness: classify one email stored in a local file
use crate::detector::{PhishingDetector, Prediction};
use crate::error::Result;
use crate::text_cleaner::clean_email_text;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Files whose trimmed content is shorter than this are not scanned
pub const MIN_CONTENT_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    MissingFile { path: PathBuf },
    TooShort { path: PathBuf, chars: usize },
    Scanned(Prediction),
}

impl ScanOutcome {
    /// User-facing text for this outcome
    pub fn render(&self) -> String {
        match self {
            ScanOutcome::MissingFile { path } => format!(
                "❌ Error: '{}' not found.\nAction: Create the file and paste an email inside it.",
                path.display()
            ),
            ScanOutcome::TooShort { path, .. } => format!(
                "⚠️  The file '{}' is too short. Paste more content to test.",
                path.display()
            ),
            ScanOutcome::Scanned(prediction) => render_report(prediction),
        }
    }
}

pub fn render_report(prediction: &Prediction) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "           PHISHING DETECTION REPORT");
    let _ = writeln!(out, "{}", rule);
    if prediction.is_phishing() {
        let _ = writeln!(out, "VERDICT:    [ ⚠️  PHISHING DETECTED ]");
        let _ = writeln!(out, "CONFIDENCE: {:.2}%", prediction.confidence());
        let _ = writeln!(out);
        let _ = writeln!(out, "Reasoning: Found strong linguistic patterns used by scammers.");
    } else {
        let _ = writeln!(out, "VERDICT:    [ ✅ SAFE / LEGITIMATE ]");
        let _ = writeln!(out, "CONFIDENCE: {:.2}%", prediction.confidence());
        let _ = writeln!(out);
        let _ = writeln!(out, "Reasoning: Content matches standard communication patterns.");
    }
    let _ = write!(out, "{}", rule);
    out
}

/// Classify already-read raw email text
pub fn scan_text(detector: &PhishingDetector, raw: &str) -> Result<Prediction> {
    detector.predict(&clean_email_text(raw))
}

pub fn scan_file(detector: &PhishingDetector, path: &Path) -> Result<ScanOutcome> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(ScanOutcome::MissingFile {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    let raw = String::from_utf8_lossy(&bytes);

    let chars = raw.trim().chars().count();
    if chars < MIN_CONTENT_CHARS {
        return Ok(ScanOutcome::TooShort {
            path: path.to_path_buf(),
            chars,
        });
    }

    tracing::info!("🔍 Scanning content from '{}'...", path.display());
    Ok(ScanOutcome::Scanned(scan_text(detector, &raw)?))
}
