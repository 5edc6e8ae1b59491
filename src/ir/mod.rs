//! In-memory representation of labelme annotations.
//!
//! Shapes are decoded into typed records, and their corners into boxes
//! tagged with the [`Pixel`] coordinate space. Normalized values only exist
//! as a [`YoloBox`].
//!
//! # Example
//!
//! ```
//! use labelexport::ir::{BBoxXYXY, Coord, Pixel};
//!
//! let bbox: BBoxXYXY<Pixel> =
//!     BBoxXYXY::from_corners(Coord::new(60.0, 40.0), Coord::new(20.0, 20.0));
//! assert_eq!(bbox.to_array(), [20.0, 20.0, 60.0, 40.0]);
//! assert_eq!(bbox.to_yolo(200.0, 100.0).to_string(), "0.2 0.3 0.2 0.2");
//! ```

mod annotation;
mod bbox;
mod coord;
mod space;
mod vocabulary;

pub use annotation::{
    parse_annotation, read_annotation, AnnotationRecord, Flags, RawAnnotation, Shape, Strictness,
};
pub use bbox::{BBoxXYXY, RoundedBox, YoloBox};
pub use coord::Coord;
pub use space::Pixel;
pub use vocabulary::{ClassTable, Vocabulary};
