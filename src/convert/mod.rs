//! Batch converters from labelme annotations to trainer input.
//!
//! A converter is built from [`ConverterOptions`] and a [`Context`], then
//! driven with [`Converter::convert`]. Each run goes through the same steps:
//!
//! 1. overwrite gate over the batch-level output files
//! 2. per-file conversion, skipping files with format problems
//! 3. train/evaluation split
//! 4. writing of the batch-level files
//!
//! Anything that is not a [`FormatError`](crate::error::FormatError) aborts
//! the run.

mod attributes;
pub mod report;
mod yolo;

pub use attributes::{
    pair_shapes, sort_shapes, AttributesConverter, AttributesObject, AttributesOptions,
    AttributesRecord, ColorShape, ObjectAttributes, VehicleShape,
};
pub use report::{ConversionSummary, SkippedFile};
pub use yolo::{YoloConverter, YoloOptions, YoloOutputs};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::confirm::Confirm;
use crate::error::ExportError;
use crate::finder::{FindAll, PathFinder};
use crate::ir::{Strictness, Vocabulary};
use crate::paths::PathStyle;
use crate::split::Evaluation;

/// Shape label marking a vehicle box.
pub const VEHICLE_LABEL: &str = "vehicle";
/// Shape label marking a color region inside a vehicle.
pub const COLOR_LABEL: &str = "color";

/// Settings shared by every converter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Root searched for annotation files.
    pub input: PathBuf,
    /// Directory receiving the batch-level files.
    pub output: PathBuf,
    /// Directory the trainer runs from; relative paths are written against it.
    pub exec: PathBuf,
    /// Only directories whose name starts with this are descended into.
    pub prefix: String,
    /// Annotation file extension, without the dot.
    pub data_extension: String,
    /// Image file extension, without the dot.
    pub image_extension: String,
    pub evaluation: Evaluation,
    pub absolute_paths: bool,
    /// Delete existing outputs without asking.
    pub force: bool,
    /// Also accept the label conventions of older annotation sets.
    pub legacy: bool,
    pub strictness: Strictness,
    pub seed: Option<u64>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data"),
            output: PathBuf::from("config"),
            exec: PathBuf::from("."),
            prefix: "!".to_string(),
            data_extension: "json".to_string(),
            image_extension: "jpg".to_string(),
            evaluation: Evaluation::default(),
            absolute_paths: false,
            force: false,
            legacy: false,
            strictness: Strictness::default(),
            seed: None,
        }
    }
}

impl ConverterOptions {
    pub fn validate(&self) -> Result<(), ExportError> {
        self.evaluation.validate()?;
        if self.data_extension.is_empty() || self.image_extension.is_empty() {
            return Err(ExportError::InvalidConfig(
                "file extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Finder over the input tree for annotation files.
    pub fn finder(&self) -> PathFinder {
        PathFinder::new(&self.input, &self.prefix, &self.data_extension)
    }

    pub fn path_style(&self) -> PathStyle {
        if self.absolute_paths {
            PathStyle::Absolute
        } else {
            PathStyle::RelativeTo(self.exec.clone())
        }
    }
}

/// Run-wide collaborators, built once by the caller.
pub struct Context {
    pub vocabulary: Vocabulary,
    pub confirm: Box<dyn Confirm>,
}

impl Context {
    pub fn new(vocabulary: Vocabulary, confirm: impl Confirm + 'static) -> Self {
        Self {
            vocabulary,
            confirm: Box::new(confirm),
        }
    }
}

/// A labelme-to-trainer conversion.
pub trait Converter {
    /// What one annotation file turns into.
    type Output;

    /// Convert a single annotation file.
    ///
    /// Format problems come back as [`ExportError::Format`]; the batch loop
    /// skips those and aborts on everything else.
    fn convert_file(&self, path: &Path) -> Result<Self::Output, ExportError>;

    /// Convert everything under the input root and write the batch outputs.
    fn convert(&self) -> Result<ConversionSummary, ExportError>;
}

/// Checks the batch-level outputs before anything is written.
///
/// Existing files are deleted when `force` is set or the user agrees;
/// otherwise the run stops with [`ExportError::OverwriteRefused`] and the
/// files are left as they were.
pub(crate) fn confirm_overwrite(
    paths: &[&Path],
    force: bool,
    confirm: &dyn Confirm,
) -> Result<(), ExportError> {
    let existing: Vec<PathBuf> = paths
        .iter()
        .filter(|p| p.exists())
        .map(|p| p.to_path_buf())
        .collect();
    if existing.is_empty() {
        return Ok(());
    }

    if !force {
        let listing = existing
            .iter()
            .map(|p| format!("  {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!("The following files already exist and will be deleted:\n{listing}");
        if !confirm.confirm(&prompt)? {
            return Err(ExportError::OverwriteRefused { paths: existing });
        }
    }

    for path in &existing {
        fs::remove_file(path).map_err(|source| ExportError::io(path, source))?;
        info!("Deleted {}", path.display());
    }
    Ok(())
}

/// Runs `converter` over every file from `files`, recording each outcome in
/// `summary`.
pub(crate) fn convert_batch<C>(
    converter: &C,
    files: FindAll,
    summary: &mut ConversionSummary,
) -> Result<Vec<C::Output>, ExportError>
where
    C: Converter + ?Sized,
{
    let mut outputs = Vec::new();
    for path in files {
        let path = path?;
        debug!("Converting {}", path.display());
        match converter.convert_file(&path) {
            Ok(output) => {
                summary.record_converted();
                outputs.push(output);
            }
            Err(ExportError::Format { path, source }) => summary.record_skipped(&path, &source),
            Err(err) => return Err(err),
        }
    }
    Ok(outputs)
}

pub(crate) fn create_output_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::io(dir, source))
}

pub(crate) fn write_text(path: &Path, contents: &str) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|source| ExportError::io(path, source))
}

/// Compact JSON, no trailing newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let file = fs::File::create(path).map_err(|source| ExportError::io(path, source))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| ExportError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| ExportError::io(path, source))
}

/// Location of the file an annotation's `imagePath` points at.
pub(crate) fn image_location(annotation: &Path, image_path: &str) -> PathBuf {
    annotation
        .parent()
        .unwrap_or(Path::new(""))
        .join(image_path)
}
