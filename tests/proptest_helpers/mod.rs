#![allow(dead_code)]

use labelexport::ir::{Flags, Shape};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Image dimensions as labelme stores them.
pub fn arb_image_dims() -> impl Strategy<Value = (u32, u32)> {
    (1u32..4000, 1u32..4000)
}

/// A point inside (or on the edge of) a `width` x `height` image.
pub fn arb_point_in(width: u32, height: u32) -> impl Strategy<Value = [f64; 2]> {
    (0.0..=width as f64, 0.0..=height as f64).prop_map(|(x, y)| [x, y])
}

/// Image dimensions plus a two-point shape lying inside the image.
pub fn arb_shape_in_image() -> impl Strategy<Value = (u32, u32, Shape)> {
    arb_image_dims().prop_flat_map(|(w, h)| {
        (arb_point_in(w, h), arb_point_in(w, h))
            .prop_map(move |(a, b)| (w, h, rectangle("vehicle", a, b)))
    })
}

pub fn rectangle(label: &str, a: [f64; 2], b: [f64; 2]) -> Shape {
    Shape {
        label: label.to_string(),
        flags: Flags::default(),
        points: vec![a, b],
    }
}

/// Flag maps over a small name pool, possibly with duplicates set to true.
pub fn arb_flags() -> impl Strategy<Value = Vec<(String, bool)>> {
    prop::collection::vec(
        (prop::sample::select(vec!["car", "bus", "van", "tram", "red"]), any::<bool>()),
        0..6,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    })
}
