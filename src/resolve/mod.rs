//! Geometry and label resolution for annotation shapes.
//!
//! Everything here is a pure function of its inputs. Failures are
//! [`FormatError`]s, which the converters treat as "skip this file".

use crate::error::FormatError;
use crate::ir::{BBoxXYXY, Coord, Flags, Pixel, RawAnnotation, Shape, Strictness, YoloBox};

/// Round `value` to `digits` decimal places; `digits <= 0` rounds to an
/// integer. Ties go to the even neighbour.
pub fn round_to_digits(value: f64, digits: i32) -> f64 {
    if digits <= 0 {
        value.round_ties_even()
    } else {
        let scale = 10f64.powi(digits);
        (value * scale).round_ties_even() / scale
    }
}

fn corners(shape: &Shape) -> Result<(Coord<Pixel>, Coord<Pixel>), FormatError> {
    match shape.points.as_slice() {
        [a, b] => Ok((Coord::from_point(*a), Coord::from_point(*b))),
        points => Err(FormatError::PointCount {
            label: shape.label.clone(),
            count: points.len(),
        }),
    }
}

/// Pixel-space box spanned by the shape's two corners.
///
/// With `round_digits`, every coordinate is rounded before the axes are
/// ordered.
pub fn resolve_pixel_box(
    shape: &Shape,
    round_digits: Option<i32>,
) -> Result<BBoxXYXY<Pixel>, FormatError> {
    let (mut a, mut b) = corners(shape)?;
    if let Some(digits) = round_digits {
        for corner in [&mut a, &mut b] {
            corner.x = round_to_digits(corner.x, digits);
            corner.y = round_to_digits(corner.y, digits);
        }
    }
    Ok(BBoxXYXY::from_corners(a, b))
}

/// YOLO `cx cy w h` box relative to the image dimensions.
pub fn resolve_normalized_box(
    shape: &Shape,
    image_width: u32,
    image_height: u32,
) -> Result<YoloBox, FormatError> {
    let (a, b) = corners(shape)?;
    Ok(BBoxXYXY::from_corners(a, b).to_yolo(image_width as f64, image_height as f64))
}

/// The first flag that is set and belongs to `allowed`.
///
/// Flags are visited in stored order; a later `true` flag never overrides an
/// earlier one.
pub fn resolve_label_from_flags<'a>(
    flags: &'a Flags,
    allowed: &[String],
) -> Result<&'a str, FormatError> {
    flags
        .iter()
        .find(|(name, value)| *value && allowed.iter().any(|a| a == name))
        .map(|(name, _)| name)
        .ok_or(FormatError::NoMatchingFlag)
}

/// Whether the annotation carries every key `strictness` requires.
pub fn is_well_formed(raw: &RawAnnotation, strictness: Strictness) -> bool {
    let required = raw.shapes.is_some()
        && raw.image_path.is_some()
        && raw.image_height.is_some()
        && raw.image_width.is_some();

    match strictness {
        Strictness::Minimal => required,
        Strictness::Strict => required && raw.version && raw.flags && raw.image_data,
    }
}
