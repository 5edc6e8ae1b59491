//! Closed label vocabulary and the YOLO class table derived from it.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ExportError;

/// Valid vehicle type and color names, read from the labeling tool's flag
/// file (`{"vehicle": [...], "color": [...]}`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Vocabulary {
    #[serde(rename = "vehicle")]
    pub vehicle_types: Vec<String>,
    #[serde(rename = "color", default)]
    pub colors: Vec<String>,
}

impl Vocabulary {
    pub fn new(vehicle_types: Vec<String>, colors: Vec<String>) -> Self {
        Self {
            vehicle_types,
            colors,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let content = fs::read_to_string(path).map_err(|source| ExportError::io(path, source))?;
        serde_json::from_str(&content).map_err(|source| ExportError::VocabularyParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_vehicle_type(&self, name: &str) -> bool {
        self.vehicle_types.iter().any(|t| t == name)
    }

    pub fn is_color(&self, name: &str) -> bool {
        self.colors.iter().any(|c| c == name)
    }
}

/// Ordered class names; a name's position is its YOLO class index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassTable {
    names: Vec<String>,
}

impl ClassTable {
    /// Builds the table in vocabulary order. Repeated names keep their first
    /// index.
    pub fn from_vocabulary(vocabulary: &Vocabulary) -> Self {
        let mut names: Vec<String> = Vec::with_capacity(vocabulary.vehicle_types.len());
        for name in &vocabulary.vehicle_types {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Self { names }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True if an existing names file lists exactly these classes in this
    /// order. Trailing whitespace is ignored.
    pub fn matches_names_file(&self, contents: &str) -> bool {
        let existing: Vec<&str> = contents.trim_end().lines().collect();
        existing.len() == self.names.len()
            && existing.iter().zip(&self.names).all(|(old, new)| *old == new)
    }
}
