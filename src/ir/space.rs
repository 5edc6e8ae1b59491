//! Coordinate space marker.
//!
//! Points and boxes carry their space as a zero-sized type parameter. Shapes
//! read from annotations live in [`Pixel`] space; YOLO output leaves it only
//! through [`crate::ir::YoloBox`], which is already divided by the image size.

use std::fmt;

/// Absolute image coordinates, origin at the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
