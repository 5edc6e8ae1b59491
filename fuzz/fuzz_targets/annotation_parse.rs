//! Fuzz target for labelme annotation parsing.
//!
//! Feeds arbitrary bytes through both strictness levels and, when a record
//! comes out, through box resolution for every shape.

#![no_main]

use libfuzzer_sys::fuzz_target;
use labelexport::ir::{parse_annotation, Strictness};
use labelexport::resolve::{resolve_normalized_box, resolve_pixel_box};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    for strictness in [Strictness::Minimal, Strictness::Strict] {
        let Ok(record) = parse_annotation(data, strictness) else {
            continue;
        };
        for shape in &record.shapes {
            let _ = resolve_pixel_box(shape, Some(1));
            let _ = resolve_normalized_box(shape, record.image_width, record.image_height);
        }
    }
});
