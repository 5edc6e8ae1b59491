//! Bounding box types in canonical XYXY format.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::Serialize;

use super::coord::Coord;
use super::Pixel;

/// An axis-aligned bounding box in XYXY format (xmin, ymin, xmax, ymax).
///
/// [`BBoxXYXY::from_corners`] always yields an ordered box.
/// [`BBoxXYXY::from_xyxy`] does not reorder, so callers holding trusted
/// coordinates can skip the comparison.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    /// Creates a box spanning two opposite corners given in any order.
    ///
    /// Each axis is min/max-resolved independently, so a shape drawn from
    /// bottom-right to top-left produces the same box as one drawn the other
    /// way round.
    pub fn from_corners(a: Coord<TSpace>, b: Coord<TSpace>) -> Self {
        Self::from_xyxy(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.min.x
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.min.y
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.max.x
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.max.y
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Coord<TSpace> {
        self.min.midpoint(&self.max)
    }

    /// True if `point` lies strictly inside the box. Points on an edge are
    /// outside.
    #[inline]
    pub fn contains_strict(&self, point: &Coord<TSpace>) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }

    /// Returns true if the box is properly ordered (min <= max for both axes).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Returns the coordinates as `[xmin, ymin, xmax, ymax]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

impl<TSpace> fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.min.x)
            .field("ymin", &self.min.y)
            .field("xmax", &self.max.x)
            .field("ymax", &self.max.y)
            .finish()
    }
}

impl BBoxXYXY<Pixel> {
    /// Converts to the normalized center/extent form used by YOLO labels.
    ///
    /// Sums and differences are taken in pixel space before dividing, which
    /// keeps round pixel values exact where possible.
    pub fn to_yolo(&self, image_width: f64, image_height: f64) -> YoloBox {
        YoloBox {
            cx: (self.min.x + self.max.x) / 2.0 / image_width,
            cy: (self.min.y + self.max.y) / 2.0 / image_height,
            w: self.width() / image_width,
            h: self.height() / image_height,
        }
    }
}

/// A normalized box in YOLO's `cx cy w h` form.
///
/// Displays as four space-separated values, each keeping a fractional part
/// (`1.0`, not `1`) so label files read the same as those written by other
/// darknet tooling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloBox {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl YoloBox {
    /// Iterates the four values in label-file order.
    pub fn values(&self) -> [f64; 4] {
        [self.cx, self.cy, self.w, self.h]
    }
}

impl fmt::Display for YoloBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?} {:?}", self.cx, self.cy, self.w, self.h)
    }
}

/// A pixel box that remembers how many decimal digits it was rounded to.
///
/// Serializes as a JSON array `[xmin, ymin, xmax, ymax]`; boxes rounded to
/// zero or fewer digits are written as integers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundedBox {
    pub bbox: BBoxXYXY<Pixel>,
    pub digits: i32,
}

impl Serialize for RoundedBox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(4))?;
        for value in self.bbox.to_array() {
            if self.digits <= 0 {
                seq.serialize_element(&(value as i64))?;
            } else {
                seq.serialize_element(&value)?;
            }
        }
        seq.end()
    }
}
