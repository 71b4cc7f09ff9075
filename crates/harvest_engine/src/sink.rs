//! Output sink boundary and the tabular reference sink.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::types::{CategoryHarvest, Completion};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSummary {
    pub rows: usize,
    pub table_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
}

/// Persists one run's aggregate. Implementations only rely on the
/// `ProductRecord` field set and the aggregate order they are handed.
pub trait OutputSink {
    fn write_run(&self, harvests: &[CategoryHarvest]) -> Result<SinkSummary, SinkError>;
}

#[derive(Debug, Clone)]
pub struct CsvSinkOptions {
    pub table_filename: String,
    pub manifest_filename: Option<String>,
    /// RFC3339 run timestamp recorded in the manifest, supplied by the
    /// caller so the sink stays clock-free.
    pub generated_utc: Option<String>,
}

impl Default for CsvSinkOptions {
    fn default() -> Self {
        Self {
            table_filename: "top_products.csv".to_string(),
            manifest_filename: Some("manifest.json".to_string()),
            generated_utc: None,
        }
    }
}

/// Writes the aggregate as one CSV table plus a JSON run manifest with
/// per-category completion state.
pub struct CsvSink {
    dir: PathBuf,
    options: CsvSinkOptions,
}

impl CsvSink {
    pub fn new(dir: PathBuf, options: CsvSinkOptions) -> Self {
        Self { dir, options }
    }
}

impl OutputSink for CsvSink {
    fn write_run(&self, harvests: &[CategoryHarvest]) -> Result<SinkSummary, SinkError> {
        let mut table = String::from("Category,Name,Link,Reviews,Rating,Price\n");
        let mut rows = 0usize;
        for harvest in harvests {
            for record in &harvest.records {
                let rating = record
                    .rating
                    .map(|r| format!("{r}"))
                    .unwrap_or_default();
                let row = [
                    record.category.as_str(),
                    record.name.as_str(),
                    record.link.as_str(),
                    &record.review_count.to_string(),
                    &rating,
                    record.price.as_str(),
                ]
                .map(csv_field)
                .join(",");
                table.push_str(&row);
                table.push('\n');
                rows += 1;
            }
        }

        let writer = AtomicFileWriter::new(self.dir.clone());
        let table_path = writer.write(&self.options.table_filename, &table)?;

        let manifest_path = if let Some(name) = &self.options.manifest_filename {
            let manifest = json!({
                "generated_utc": self.options.generated_utc,
                "total_rows": rows,
                "categories": harvests.iter().map(|h| {
                    let (complete, error) = match &h.completion {
                        Completion::Complete => (true, None),
                        Completion::Truncated { error, .. } => (false, Some(error.to_string())),
                    };
                    json!({
                        "category": h.category,
                        "site": h.site,
                        "rows": h.records.len(),
                        "pages_fetched": h.pages_fetched,
                        "cards_skipped": h.cards_skipped,
                        "complete": complete,
                        "error": error,
                    })
                }).collect::<Vec<_>>(),
            });
            Some(writer.write(name, &manifest.to_string())?)
        } else {
            None
        };

        Ok(SinkSummary {
            rows,
            table_path,
            manifest_path,
        })
    }
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Ensure the output directory exists and is writable.
pub fn ensure_output_dir(dir: &Path) -> Result<(), SinkError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| SinkError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(SinkError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| SinkError::OutputDir(e.to_string()))?;
    }
    // Writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| SinkError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}`: temp file, then rename.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, SinkError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace any previous run's file to keep reruns deterministic.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| SinkError::Io(e.error))?;
        Ok(target)
    }
}
