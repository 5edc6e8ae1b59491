//! Vehicle attribute export.
//!
//! Every color box is paired with the vehicle box that contains its center.
//! Each pair becomes one object in the attribute classifier's training
//! records, which are written as compact JSON arrays (`train.json`,
//! `test.json`).

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::Serialize;

use super::{
    confirm_overwrite, convert_batch, create_output_dir, image_location, write_json, Context,
    ConversionSummary, Converter, ConverterOptions, COLOR_LABEL, VEHICLE_LABEL,
};
use crate::confirm::Confirm;
use crate::error::{ExportError, FormatError};
use crate::finder::PathFinder;
use crate::ir::{read_annotation, AnnotationRecord, RoundedBox, Shape, Vocabulary};
use crate::resolve::{resolve_label_from_flags, resolve_pixel_box};
use crate::split::{split_by_percent, split_dedicated, Evaluation};

const VEHICLE_DIGITS: i32 = 1;
const COLOR_DIGITS: i32 = 0;

/// Settings specific to the attributes export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributesOptions {
    /// Allow more than one vehicle/color pair per annotation file.
    pub allow_multiple: bool,
}

impl Default for AttributesOptions {
    fn default() -> Self {
        Self {
            allow_multiple: true,
        }
    }
}

/// One training record: an image and the vehicles found in it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributesRecord {
    pub image: String,
    pub objects: Vec<AttributesObject>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributesObject {
    pub label: String,
    pub attributes: ObjectAttributes,
    pub bbox: RoundedBox,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectAttributes {
    #[serde(rename = "type")]
    pub vehicle_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub color_bbox: Vec<RoundedBox>,
}

/// A vehicle shape with its type resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleShape {
    pub vehicle_type: String,
    pub bbox: RoundedBox,
}

/// A color region; the color name is known only if a color flag is set.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorShape {
    pub color: Option<String>,
    pub bbox: RoundedBox,
}

/// Splits shapes into vehicles and color regions, in file order.
///
/// Any other label is an error. In legacy mode a shape may also be labeled
/// with a vehicle type or color name directly.
pub fn sort_shapes(
    shapes: &[Shape],
    vocabulary: &Vocabulary,
    legacy: bool,
) -> Result<(Vec<VehicleShape>, Vec<ColorShape>), FormatError> {
    let mut vehicles = Vec::new();
    let mut colors = Vec::new();

    for shape in shapes {
        if shape.label == VEHICLE_LABEL {
            let vehicle_type = resolve_label_from_flags(&shape.flags, &vocabulary.vehicle_types)?;
            vehicles.push(VehicleShape {
                vehicle_type: vehicle_type.to_string(),
                bbox: rounded(shape, VEHICLE_DIGITS)?,
            });
        } else if shape.label == COLOR_LABEL {
            let color = resolve_label_from_flags(&shape.flags, &vocabulary.colors).ok();
            colors.push(ColorShape {
                color: color.map(str::to_string),
                bbox: rounded(shape, COLOR_DIGITS)?,
            });
        } else if legacy && vocabulary.is_vehicle_type(&shape.label) {
            vehicles.push(VehicleShape {
                vehicle_type: shape.label.clone(),
                bbox: rounded(shape, VEHICLE_DIGITS)?,
            });
        } else if legacy && vocabulary.is_color(&shape.label) {
            colors.push(ColorShape {
                color: Some(shape.label.clone()),
                bbox: rounded(shape, COLOR_DIGITS)?,
            });
        } else {
            return Err(FormatError::UnknownLabel(shape.label.clone()));
        }
    }
    Ok((vehicles, colors))
}

fn rounded(shape: &Shape, digits: i32) -> Result<RoundedBox, FormatError> {
    Ok(RoundedBox {
        bbox: resolve_pixel_box(shape, Some(digits))?,
        digits,
    })
}

/// Pairs every color region with the first vehicle (in file order) whose box
/// strictly contains the region's center.
///
/// Colors with no containing vehicle are dropped. Objects come out in color
/// order.
pub fn pair_shapes(
    vehicles: &[VehicleShape],
    colors: &[ColorShape],
    allow_multiple: bool,
) -> Result<Vec<AttributesObject>, FormatError> {
    let mut objects = Vec::new();
    for color in colors {
        let center = color.bbox.bbox.center();
        let Some(vehicle) = vehicles.iter().find(|v| v.bbox.bbox.contains_strict(&center)) else {
            continue;
        };
        objects.push(AttributesObject {
            label: VEHICLE_LABEL.to_string(),
            attributes: ObjectAttributes {
                vehicle_type: vehicle.vehicle_type.clone(),
                color: color.color.clone(),
                color_bbox: vec![color.bbox],
            },
            bbox: vehicle.bbox,
        });
    }

    if objects.is_empty() {
        return Err(if colors.is_empty() {
            FormatError::NoColors
        } else if vehicles.is_empty() {
            FormatError::NoVehicles
        } else {
            FormatError::NoContainment
        });
    }
    if objects.len() > 1 && !allow_multiple {
        return Err(FormatError::MultipleObjectsDisallowed {
            count: objects.len(),
        });
    }
    Ok(objects)
}

pub struct AttributesConverter {
    options: ConverterOptions,
    attributes: AttributesOptions,
    vocabulary: Vocabulary,
    confirm: Box<dyn Confirm>,
    train_path: PathBuf,
    eval_path: PathBuf,
}

impl AttributesConverter {
    pub fn new(
        options: ConverterOptions,
        attributes: AttributesOptions,
        context: Context,
    ) -> Result<Self, ExportError> {
        options.validate()?;
        let train_path = options.output.join("train.json");
        let eval_path = options.output.join("test.json");
        Ok(Self {
            options,
            attributes,
            vocabulary: context.vocabulary,
            confirm: context.confirm,
            train_path,
            eval_path,
        })
    }

    pub fn train_path(&self) -> &Path {
        &self.train_path
    }

    pub fn eval_path(&self) -> &Path {
        &self.eval_path
    }

    pub fn objects(&self, record: &AnnotationRecord) -> Result<Vec<AttributesObject>, FormatError> {
        let (vehicles, colors) = sort_shapes(&record.shapes, &self.vocabulary, self.options.legacy)?;
        pair_shapes(&vehicles, &colors, self.attributes.allow_multiple)
    }
}

impl Converter for AttributesConverter {
    type Output = AttributesRecord;

    fn convert_file(&self, path: &Path) -> Result<AttributesRecord, ExportError> {
        let record = read_annotation(path, self.options.strictness)?;
        let objects = self
            .objects(&record)
            .map_err(|source| ExportError::Format {
                path: path.to_path_buf(),
                source,
            })?;
        let image = self
            .options
            .path_style()
            .render(&image_location(path, &record.image_path))?;
        Ok(AttributesRecord { image, objects })
    }

    fn convert(&self) -> Result<ConversionSummary, ExportError> {
        let start = Instant::now();
        let mut summary = ConversionSummary::new("attributes");

        confirm_overwrite(
            &[self.train_path.as_path(), self.eval_path.as_path()],
            self.options.force,
            self.confirm.as_ref(),
        )?;
        create_output_dir(&self.options.output)?;

        let records = convert_batch(self, self.options.finder().find_all(), &mut summary)?;
        let split = match &self.options.evaluation {
            Evaluation::Percent(percent) => split_by_percent(records, *percent, self.options.seed),
            Evaluation::Dedicated(dir) => {
                info!("Using dedicated evaluation annotations from {}", dir.display());
                let finder = PathFinder::new(dir, "", &self.options.data_extension);
                let eval = convert_batch(self, finder.find_all(), &mut summary)?;
                split_dedicated(records, eval, self.options.seed)
            }
        };

        write_json(&self.train_path, &split.train)?;
        summary.record_output(&self.train_path);
        write_json(&self.eval_path, &split.eval)?;
        summary.record_output(&self.eval_path);

        summary.train_count = split.train.len();
        summary.eval_count = split.eval.len();
        summary.finish(start.elapsed());
        Ok(summary)
    }
}
