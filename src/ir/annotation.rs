//! labelme annotation records.
//!
//! A labelme file is decoded in one pass into [`RawAnnotation`], which
//! records which top-level keys were present. Only after the required-field
//! check passes is it narrowed into an [`AnnotationRecord`].

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{ExportError, FormatError};
use crate::resolve::is_well_formed;

/// Which top-level keys an annotation file must carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strictness {
    /// `shapes`, `imagePath`, `imageHeight` and `imageWidth`.
    Minimal,
    /// The minimal set plus `version`, `flags` and `imageData`.
    #[default]
    Strict,
}

/// Boolean flags attached to a shape, in the order they were stored.
///
/// The first `true` flag is the one that counts, so the map must never be
/// re-sorted. `serde_json::Value` would sort keys, hence the dedicated
/// deserializer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags(Vec<(String, bool)>);

impl Flags {
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Flags {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Flags(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de> Deserialize<'de> for Flags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagsVisitor;

        impl<'de> Visitor<'de> for FlagsVisitor {
            type Value = Flags;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of flag names to booleans")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Flags, E> {
                Ok(Flags::default())
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Flags, E> {
                Ok(Flags::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Flags, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, bool>()? {
                    entries.push((name, value));
                }
                Ok(Flags(entries))
            }
        }

        deserializer.deserialize_any(FlagsVisitor)
    }
}

/// One labeled polygon.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Shape {
    pub label: String,
    #[serde(default)]
    pub flags: Flags,
    pub points: Vec<[f64; 2]>,
}

/// Top-level keys of a labelme file, before the required-field check.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnnotation {
    #[serde(default, deserialize_with = "key_present")]
    pub version: bool,
    #[serde(default, deserialize_with = "key_present")]
    pub flags: bool,
    #[serde(default, deserialize_with = "key_present")]
    pub image_data: bool,
    pub shapes: Option<Vec<Shape>>,
    pub image_path: Option<String>,
    pub image_height: Option<u32>,
    pub image_width: Option<u32>,
}

// A key counts as present even when its value is null.
fn key_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

/// A parsed, well-formed annotation file.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationRecord {
    pub shapes: Vec<Shape>,
    /// Image location relative to the annotation file's directory.
    pub image_path: String,
    pub image_height: u32,
    pub image_width: u32,
}

impl RawAnnotation {
    /// Narrows the raw fields into a record, or explains why the file is not
    /// a usable annotation.
    pub fn into_record(self, strictness: Strictness) -> Result<AnnotationRecord, FormatError> {
        if !is_well_formed(&self, strictness) {
            return Err(FormatError::NotAnnotationFormat);
        }
        let (Some(shapes), Some(image_path), Some(image_height), Some(image_width)) = (
            self.shapes,
            self.image_path,
            self.image_height,
            self.image_width,
        ) else {
            return Err(FormatError::NotAnnotationFormat);
        };

        if image_height == 0 || image_width == 0 {
            return Err(FormatError::InvalidDimensions {
                width: image_width,
                height: image_height,
            });
        }

        Ok(AnnotationRecord {
            shapes,
            image_path,
            image_height,
            image_width,
        })
    }
}

/// Parse annotation JSON from bytes.
pub fn parse_annotation(
    bytes: &[u8],
    strictness: Strictness,
) -> Result<AnnotationRecord, FormatError> {
    let raw: RawAnnotation = serde_json::from_slice(bytes).map_err(FormatError::InvalidJson)?;
    raw.into_record(strictness)
}

/// Read and parse one annotation file.
///
/// Failing to read the file is fatal; failing to understand its contents is
/// reported as a skippable [`ExportError::Format`].
pub fn read_annotation(path: &Path, strictness: Strictness) -> Result<AnnotationRecord, ExportError> {
    let bytes = fs::read(path).map_err(|source| ExportError::io(path, source))?;
    parse_annotation(&bytes, strictness).map_err(|source| ExportError::Format {
        path: path.to_path_buf(),
        source,
    })
}
