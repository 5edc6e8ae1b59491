//! Summary of a conversion run.
//!
//! Mirrors what the operator sees in the log, in a form that can also be
//! printed as JSON for scripts.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use crate::error::{FormatError, SkipCode};

/// What a single `convert()` call did.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionSummary {
    /// Converter name (`yolo`, `yolo-tiny`, `attributes`).
    pub format: String,
    /// Annotation files discovered and opened.
    pub files_read: usize,
    /// Annotation files that produced output.
    pub files_converted: usize,
    /// Samples written to the training split.
    pub train_count: usize,
    /// Samples written to the evaluation split.
    pub eval_count: usize,
    pub elapsed_secs: f64,
    /// Batch-level files written, in write order.
    pub outputs: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

/// An input file left out of the output.
#[derive(Clone, Debug, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub code: SkipCode,
    pub message: String,
}

impl ConversionSummary {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            ..Default::default()
        }
    }

    pub fn record_converted(&mut self) {
        self.files_read += 1;
        self.files_converted += 1;
    }

    /// Logs the skip as a warning and keeps it for the report.
    pub fn record_skipped(&mut self, path: &Path, error: &FormatError) {
        warn!("Bad format, skipping {} ({})", path.display(), error);
        self.files_read += 1;
        self.skipped.push(SkippedFile {
            path: path.to_path_buf(),
            code: error.code(),
            message: error.to_string(),
        });
    }

    pub fn record_output(&mut self, path: &Path) {
        self.outputs.push(path.to_path_buf());
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed_secs = elapsed.as_secs_f64();
        info!(
            "Converted {} files ({} read) in {:.6} s",
            self.files_converted, self.files_read, self.elapsed_secs
        );
        info!(
            "Split: {} train, {} evaluation",
            self.train_count, self.eval_count
        );
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: converted {} of {} file(s) in {:.3} s",
            self.format, self.files_converted, self.files_read, self.elapsed_secs
        )?;
        writeln!(
            f,
            "  {} train, {} evaluation",
            self.train_count, self.eval_count
        )?;

        if !self.outputs.is_empty() {
            writeln!(f)?;
            writeln!(f, "Written ({}):", self.outputs.len())?;
            for path in &self.outputs {
                writeln!(f, "  - {}", path.display())?;
            }
        }

        if !self.skipped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped ({}):", self.skipped.len())?;
            for skip in &self.skipped {
                writeln!(f, "  - {}: {}", skip.path.display(), skip.message)?;
            }
        }

        Ok(())
    }
}
