//! Darknet YOLO export.
//!
//! Writes one `<image-stem>.txt` label file next to every image, then the
//! class list, the `.data` pointer file, the network config and the
//! train/evaluation image lists into the output directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{info, warn};

use super::{
    confirm_overwrite, convert_batch, create_output_dir, image_location, write_text, Context,
    ConversionSummary, Converter, ConverterOptions, VEHICLE_LABEL,
};
use crate::confirm::Confirm;
use crate::emit::{names_file_contents, DataFile, NetworkParams, NetworkTemplate, TemplateSource};
use crate::error::{ExportError, FormatError};
use crate::finder::PathFinder;
use crate::ir::{read_annotation, AnnotationRecord, ClassTable, Shape};
use crate::paths::PathStyle;
use crate::resolve::{resolve_label_from_flags, resolve_normalized_box};
use crate::split::{split_by_percent, split_dedicated, Evaluation};

/// Settings specific to the YOLO export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YoloOptions {
    pub template: NetworkTemplate,
    pub template_source: TemplateSource,
    pub network: NetworkParams,
    /// Where the trainer keeps weight snapshots; written verbatim.
    pub backup: PathBuf,
    /// Stem of the `.data` file.
    pub dataset_name: String,
}

impl Default for YoloOptions {
    fn default() -> Self {
        Self {
            template: NetworkTemplate::default(),
            template_source: TemplateSource::Builtin,
            network: NetworkParams::default(),
            backup: PathBuf::from("backup"),
            dataset_name: "obj".to_string(),
        }
    }
}

/// Batch-level files written into the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YoloOutputs {
    pub names: PathBuf,
    pub data: PathBuf,
    pub config: PathBuf,
    pub train: PathBuf,
    pub eval: PathBuf,
}

impl YoloOutputs {
    pub fn new(output_dir: &Path, template: NetworkTemplate, dataset_name: &str) -> Self {
        Self {
            names: output_dir.join("names.txt"),
            data: output_dir.join(format!("{dataset_name}.data")),
            config: output_dir.join(template.file_name()),
            train: output_dir.join("train.txt"),
            eval: output_dir.join("test.txt"),
        }
    }

    /// Files covered by the overwrite gate. The names file has its own guard.
    fn gated(&self) -> [&Path; 4] {
        [
            self.data.as_path(),
            self.config.as_path(),
            self.train.as_path(),
            self.eval.as_path(),
        ]
    }
}

pub struct YoloConverter {
    options: ConverterOptions,
    yolo: YoloOptions,
    classes: ClassTable,
    confirm: Box<dyn Confirm>,
    outputs: YoloOutputs,
}

impl YoloConverter {
    /// Fails with [`ExportError::ClassVocabularyMismatch`] when an existing
    /// names file lists different classes and the user does not agree to
    /// replace it. `force` does not bypass this check.
    pub fn new(
        options: ConverterOptions,
        yolo: YoloOptions,
        context: Context,
    ) -> Result<Self, ExportError> {
        options.validate()?;
        let classes = ClassTable::from_vocabulary(&context.vocabulary);
        if classes.is_empty() {
            return Err(ExportError::InvalidConfig(
                "vocabulary lists no vehicle types".to_string(),
            ));
        }
        let outputs = YoloOutputs::new(&options.output, yolo.template, &yolo.dataset_name);
        check_names_file(&outputs.names, &classes, context.confirm.as_ref())?;

        Ok(Self {
            options,
            yolo,
            classes,
            confirm: context.confirm,
            outputs,
        })
    }

    pub fn outputs(&self) -> &YoloOutputs {
        &self.outputs
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    /// Class index for a shape, or `None` when the shape is not a vehicle.
    fn class_of(&self, shape: &Shape) -> Result<Option<usize>, FormatError> {
        if self.options.legacy {
            if let Some(index) = self.classes.index_of(&shape.label) {
                return Ok(Some(index));
            }
        }
        if shape.label != VEHICLE_LABEL {
            return Ok(None);
        }
        let name = resolve_label_from_flags(&shape.flags, self.classes.names())?;
        Ok(self.classes.index_of(name))
    }

    /// One `<class> <cx> <cy> <w> <h>` line per vehicle shape.
    pub fn label_lines(&self, record: &AnnotationRecord) -> Result<Vec<String>, FormatError> {
        let mut lines = Vec::new();
        for shape in &record.shapes {
            let Some(class) = self.class_of(shape)? else {
                continue;
            };
            let bbox = resolve_normalized_box(shape, record.image_width, record.image_height)?;
            lines.push(format!("{class} {bbox}"));
        }
        Ok(lines)
    }

    fn split_images(&self) -> Result<(Vec<PathBuf>, Vec<PathBuf>), ExportError> {
        let images = self
            .options
            .finder()
            .find_list_with_extension(&self.options.image_extension)?;

        let split = match &self.options.evaluation {
            Evaluation::Percent(percent) => split_by_percent(images, *percent, self.options.seed),
            Evaluation::Dedicated(dir) => {
                info!("Using dedicated evaluation images from {}", dir.display());
                let eval = PathFinder::new(dir, "", &self.options.image_extension).find_all_list()?;
                split_dedicated(images, eval, self.options.seed)
            }
        };
        Ok((split.train, split.eval))
    }
}

impl Converter for YoloConverter {
    type Output = PathBuf;

    /// Writes the sidecar label file and returns its path.
    fn convert_file(&self, path: &Path) -> Result<PathBuf, ExportError> {
        let record = read_annotation(path, self.options.strictness)?;
        let lines = self
            .label_lines(&record)
            .map_err(|source| ExportError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        let sidecar = image_location(path, &record.image_path).with_extension("txt");
        write_text(&sidecar, &lines.join("\n"))?;
        Ok(sidecar)
    }

    fn convert(&self) -> Result<ConversionSummary, ExportError> {
        let start = Instant::now();
        let mut summary = ConversionSummary::new(self.yolo.template.name());
        let outputs = &self.outputs;

        confirm_overwrite(&outputs.gated(), self.options.force, self.confirm.as_ref())?;
        create_output_dir(&self.options.output)?;

        convert_batch(self, self.options.finder().find_all(), &mut summary)?;

        let style = self.options.path_style();
        let data = DataFile {
            classes: self.classes.len(),
            train: style.render(&outputs.train)?,
            valid: style.render(&outputs.eval)?,
            names: style.render(&outputs.names)?,
            backup: self.yolo.backup.to_string_lossy().into_owned(),
        };
        write_text(&outputs.data, &data.render())?;
        summary.record_output(&outputs.data);

        write_text(&outputs.names, &names_file_contents(&self.classes))?;
        summary.record_output(&outputs.names);

        let network = self.yolo.template_source.render(
            self.yolo.template,
            &self.yolo.network,
            self.classes.len(),
        );
        write_text(&outputs.config, &network)?;
        summary.record_output(&outputs.config);

        let (train, eval) = self.split_images()?;
        if train.is_empty() {
            warn!(
                "No .{} images found under {}",
                self.options.image_extension,
                self.options.input.display()
            );
        }
        write_path_list(&outputs.train, &train, &style)?;
        summary.record_output(&outputs.train);
        write_path_list(&outputs.eval, &eval, &style)?;
        summary.record_output(&outputs.eval);

        summary.train_count = train.len();
        summary.eval_count = eval.len();
        summary.finish(start.elapsed());
        Ok(summary)
    }
}

/// Compares an existing names file with the class table and asks before it
/// is replaced.
fn check_names_file(
    path: &Path,
    classes: &ClassTable,
    confirm: &dyn Confirm,
) -> Result<(), ExportError> {
    let existing = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(source) => return Err(ExportError::io(path, source)),
    };
    if classes.matches_names_file(&existing) {
        return Ok(());
    }

    let prompt = format!(
        "{} lists different classes than the vocabulary.\n\
         Existing trained weights may depend on the old class order.",
        path.display()
    );
    if confirm.confirm(&prompt)? {
        Ok(())
    } else {
        Err(ExportError::ClassVocabularyMismatch {
            path: path.to_path_buf(),
        })
    }
}

fn write_path_list(path: &Path, items: &[PathBuf], style: &PathStyle) -> Result<(), ExportError> {
    let lines = items
        .iter()
        .map(|item| style.render(item))
        .collect::<Result<Vec<_>, _>>()?;
    write_text(path, &lines.join("\n"))
}
