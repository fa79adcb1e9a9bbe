//! Persistence for audit reports - JSON and CSV export.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{DocscreenError, Result};

use super::report::AuditReport;

impl AuditReport {
    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the report to a JSON file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use docscreen::audit::AuditReport;
    /// # fn example(report: &AuditReport) -> docscreen::Result<()> {
    /// report.save("out/run.audit.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent(path)?;

        let file = File::create(path).map_err(|e| {
            DocscreenError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            DocscreenError::Persistence(format!("Failed to serialize audit report: {}", e))
        })?;

        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            DocscreenError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            DocscreenError::Persistence(format!(
                "Failed to parse audit report '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Write one CSV row per record.
    ///
    /// Columns: processed_at, decision, source_id, source_path, file_name,
    /// extension, status, reason.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "processed_at",
            "decision",
            "source_id",
            "source_path",
            "file_name",
            "extension",
            "status",
            "reason",
        ])?;

        for record in &self.records {
            let meta = record.metadata();
            csv.write_record([
                record.processed_at().to_rfc3339().as_str(),
                record.decision().as_str(),
                meta.source_id.as_str(),
                meta.source_path.as_str(),
                meta.file_name.as_str(),
                meta.extension.as_str(),
                meta.status.as_deref().unwrap_or(""),
                record.reason(),
            ])?;
        }

        csv.flush().map_err(|e| {
            DocscreenError::Persistence(format!("Failed to flush CSV export: {}", e))
        })?;
        Ok(())
    }

    /// Save the CSV export to a file.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent(path)?;

        let file = File::create(path).map_err(|e| {
            DocscreenError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;
        self.write_csv(BufWriter::new(file))
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                DocscreenError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// Default report location next to a run's output artifact.
///
/// ```
/// use docscreen::audit::audit_path;
///
/// let path = audit_path("out/agent_output.txt");
/// assert_eq!(path.to_string_lossy(), "out/agent_output.audit.json");
/// ```
pub fn audit_path(output_path: impl AsRef<Path>) -> PathBuf {
    let output_path = output_path.as_ref();
    let stem = output_path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = output_path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}.audit.json", stem))
}
