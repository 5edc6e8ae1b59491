use std::path::PathBuf;
use thiserror::Error;

/// The main error type for labelexport operations.
///
/// Only [`ExportError::Format`] is local to a single input file; every other
/// variant aborts the whole run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("Refusing to overwrite existing output file(s): {}", display_paths(.paths))]
    OverwriteRefused { paths: Vec<PathBuf> },

    #[error(
        "A different class list already exists in {path}; a training run may depend on it"
    )]
    ClassVocabularyMismatch { path: PathBuf },

    #[error("Failed to parse vocabulary from {path}: {source}")]
    VocabularyParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Confirmation prompt failed: {0}")]
    Prompt(#[source] std::io::Error),
}

impl ExportError {
    /// Shorthand for wrapping an IO error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }

    /// True if the error only disqualifies one input file.
    pub fn is_skippable(&self) -> bool {
        matches!(self, ExportError::Format { .. })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a single annotation file could not be converted.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("not in labelme format")]
    NotAnnotationFormat,

    #[error("image dimensions must be positive (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("shape '{label}' has {count} point(s), expected 2")]
    PointCount { label: String, count: usize },

    #[error("no known flag specified")]
    NoMatchingFlag,

    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("no colors in annotation file")]
    NoColors,

    #[error("no vehicles in annotation file")]
    NoVehicles,

    #[error("centers of all color boxes are not in any vehicle")]
    NoContainment,

    #[error("{count} objects found, but multiple objects in one annotation file are disabled")]
    MultipleObjectsDisallowed { count: usize },
}

impl FormatError {
    /// Stable code used in conversion summaries.
    pub fn code(&self) -> SkipCode {
        match self {
            FormatError::InvalidJson(_) => SkipCode::InvalidJson,
            FormatError::NotAnnotationFormat => SkipCode::NotAnnotationFormat,
            FormatError::InvalidDimensions { .. } => SkipCode::InvalidDimensions,
            FormatError::PointCount { .. } => SkipCode::PointCount,
            FormatError::NoMatchingFlag => SkipCode::NoMatchingFlag,
            FormatError::UnknownLabel(_) => SkipCode::UnknownLabel,
            FormatError::NoColors => SkipCode::NoColors,
            FormatError::NoVehicles => SkipCode::NoVehicles,
            FormatError::NoContainment => SkipCode::NoContainment,
            FormatError::MultipleObjectsDisallowed { .. } => SkipCode::MultipleObjectsDisallowed,
        }
    }
}

/// Stable skip codes for programmatic consumption.
///
/// These codes are part of the JSON report schema and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipCode {
    InvalidJson,
    NotAnnotationFormat,
    InvalidDimensions,
    PointCount,
    NoMatchingFlag,
    UnknownLabel,
    NoColors,
    NoVehicles,
    NoContainment,
    MultipleObjectsDisallowed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_format_errors_are_skippable() {
        let format = ExportError::Format {
            path: PathBuf::from("a.json"),
            source: FormatError::NoColors,
        };
        assert!(format.is_skippable());

        let refused = ExportError::OverwriteRefused {
            paths: vec![PathBuf::from("out/train.json")],
        };
        assert!(!refused.is_skippable());
    }

    #[test]
    fn overwrite_refused_lists_every_path() {
        let err = ExportError::OverwriteRefused {
            paths: vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
        };
        assert_eq!(
            err.to_string(),
            "Refusing to overwrite existing output file(s): a.txt, b.txt"
        );
    }

    #[test]
    fn containment_errors_have_distinct_codes() {
        assert_eq!(FormatError::NoColors.code(), SkipCode::NoColors);
        assert_eq!(FormatError::NoVehicles.code(), SkipCode::NoVehicles);
        assert_eq!(FormatError::NoContainment.code(), SkipCode::NoContainment);
    }
}
