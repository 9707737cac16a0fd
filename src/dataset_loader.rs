/// Labeled email dataset loader
///
/// Merges a directory of CSV exports with heterogeneous headers into one
/// canonical `{text, label}` corpus.
use crate::error::{DetectorError, Result};
use crate::traits::{CanonicalRecord, DatasetLoader, Label};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Text,
    Label,
}

impl Column {
    pub fn canonical_name(self) -> &'static str {
        match self {
            Column::Text => "text",
            Column::Label => "label",
        }
    }
}

/// Header aliases in priority order. Earlier entries win when a file carries
/// more than one alias for the same column.
pub const COLUMN_ALIASES: &[(&str, Column)] = &[
    ("text", Column::Text),
    ("body", Column::Text),
    ("message", Column::Text),
    ("text_combined", Column::Text),
    ("label", Column::Label),
    ("class", Column::Label),
];

/// Positions of the canonical columns within a file's header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub text: usize,
    pub label: usize,
}

/// Lower-case and trim a raw header cell
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn find_column(headers: &[String], column: Column) -> Option<usize> {
    COLUMN_ALIASES
        .iter()
        .filter(|(_, target)| *target == column)
        .find_map(|(alias, _)| headers.iter().position(|h| h == alias))
}

/// Map normalized headers onto the canonical schema.
///
/// On failure returns the canonical names that could not be mapped.
pub fn resolve_columns(headers: &[String]) -> std::result::Result<ColumnMap, Vec<&'static str>> {
    let text = find_column(headers, Column::Text);
    let label = find_column(headers, Column::Label);

    match (text, label) {
        (Some(text), Some(label)) => Ok(ColumnMap { text, label }),
        _ => {
            let mut missing = Vec::new();
            if text.is_none() {
                missing.push(Column::Text.canonical_name());
            }
            if label.is_none() {
                missing.push(Column::Label.canonical_name());
            }
            Err(missing)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingColumns(Vec<&'static str>),
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingColumns(cols) => {
                write!(f, "missing required column(s): {}", cols.join(", "))
            }
            SkipReason::Unreadable(err) => write!(f, "could not be parsed: {}", err),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub files_found: usize,
    pub files_used: usize,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
}

pub struct CsvDirectoryLoader {
    data_dir: PathBuf,
    name: String,
}

impl CsvDirectoryLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let name = data_dir.display().to_string();
        Self { data_dir, name }
    }

    /// List `*.csv` files in the directory, sorted by path
    pub fn csv_files(&self) -> Result<Vec<PathBuf>> {
        if !self.data_dir.is_dir() {
            return Err(DetectorError::configuration(format!(
                "Data directory not found: {}",
                self.data_dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if is_csv && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Load the corpus and report what was kept and what was skipped
    pub fn load_with_summary(&self) -> Result<(Vec<CanonicalRecord>, LoadSummary)> {
        let files = self.csv_files()?;
        if files.is_empty() {
            return Err(DetectorError::configuration(format!(
                "No CSV files found in {}",
                self.data_dir.display()
            )));
        }

        let mut summary = LoadSummary {
            files_found: files.len(),
            ..Default::default()
        };
        let mut records = Vec::new();

        for path in &files {
            match load_file(path) {
                Ok(FileLoad::Mapped { rows, dropped }) => {
                    info!(
                        "Loaded {} rows from {} ({} dropped for missing text/label)",
                        rows.len(),
                        path.display(),
                        dropped
                    );
                    summary.files_used += 1;
                    summary.rows_loaded += rows.len();
                    summary.rows_dropped += dropped;
                    records.extend(rows);
                }
                Ok(FileLoad::Skipped(reason)) | Err(reason) => {
                    warn!("Skipping {}: {}", path.display(), reason);
                    summary.skipped.push((path.clone(), reason));
                }
            }
        }

        if summary.files_used == 0 {
            return Err(DetectorError::configuration(format!(
                "None of the {} CSV file(s) in {} has recognizable text and label columns",
                summary.files_found,
                self.data_dir.display()
            )));
        }

        if records.is_empty() {
            return Err(DetectorError::configuration(format!(
                "No rows with both text and label found in {}",
                self.data_dir.display()
            )));
        }

        Ok((records, summary))
    }
}

impl DatasetLoader for CsvDirectoryLoader {
    fn load_records(&self) -> Result<Vec<CanonicalRecord>> {
        self.load_with_summary().map(|(records, _)| records)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

enum FileLoad {
    Mapped {
        rows: Vec<CanonicalRecord>,
        dropped: usize,
    },
    Skipped(SkipReason),
}

fn load_file(path: &Path) -> std::result::Result<FileLoad, SkipReason> {
    let unreadable = |e: csv::Error| SkipReason::Unreadable(e.to_string());

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(unreadable)?;

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(unreadable)?
        .iter()
        .map(|h| normalize_header(&String::from_utf8_lossy(h)))
        .collect();

    let columns = match resolve_columns(&headers) {
        Ok(columns) => columns,
        Err(missing) => return Ok(FileLoad::Skipped(SkipReason::MissingColumns(missing))),
    };

    let mut rows = Vec::new();
    let mut dropped = 0;

    for result in reader.byte_records() {
        let record = match result {
            Ok(record) => record,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };

        let text = record
            .get(columns.text)
            .map(|t| String::from_utf8_lossy(t).into_owned())
            .filter(|t| !t.trim().is_empty());
        let label = record
            .get(columns.label)
            .and_then(|l| Label::parse(&String::from_utf8_lossy(l)));

        match (text, label) {
            (Some(text), Some(label)) => rows.push(CanonicalRecord { text, label }),
            _ => dropped += 1,
        }
    }

    Ok(FileLoad::Mapped { rows, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|h| normalize_header(h)).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Body "), "body");
        assert_eq!(normalize_header("TEXT_COMBINED"), "text_combined");
    }

    #[test]
    fn test_resolve_each_alias() {
        for alias in ["text", "body", "message", "text_combined"] {
            let map = resolve_columns(&headers(&["id", alias, "class"])).unwrap();
            assert_eq!(map, ColumnMap { text: 1, label: 2 });
        }
    }

    #[test]
    fn test_alias_priority() {
        let map = resolve_columns(&headers(&["text_combined", "message", "body", "label"])).unwrap();
        assert_eq!(map.text, 2);

        let map = resolve_columns(&headers(&["message", "text_combined", "class"])).unwrap();
        assert_eq!(map.text, 0);

        let map = resolve_columns(&headers(&["class", "body", "label"])).unwrap();
        assert_eq!(map.label, 2);
    }

    #[test]
    fn test_missing_columns_reported() {
        assert_eq!(
            resolve_columns(&headers(&["subject", "sender"])),
            Err(vec!["text", "label"])
        );
        assert_eq!(resolve_columns(&headers(&["Body", "sender"])), Err(vec!["label"]));
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::MissingColumns(vec!["label"]);
        assert_eq!(reason.to_string(), "missing required column(s): label");
    }
}
