#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// labelme shape JSON. Flags keep the given order.
pub fn shape_json(label: &str, flags: &[(&str, bool)], points: [[f64; 2]; 2]) -> String {
    let flags = flags
        .iter()
        .map(|(name, value)| format!("\"{name}\": {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"{{"label": "{label}", "points": [[{}, {}], [{}, {}]], "group_id": null, "shape_type": "rectangle", "flags": {{{flags}}}}}"#,
        points[0][0], points[0][1], points[1][0], points[1][1]
    )
}

pub fn vehicle(vehicle_type: &str, points: [[f64; 2]; 2]) -> String {
    shape_json("vehicle", &[(vehicle_type, true)], points)
}

pub fn color(color: &str, points: [[f64; 2]; 2]) -> String {
    shape_json("color", &[(color, true)], points)
}

/// Complete labelme document as written by the labeling tool.
pub fn annotation_json(image_path: &str, width: u32, height: u32, shapes: &[String]) -> String {
    format!(
        r#"{{"version": "4.5.6", "flags": {{}}, "shapes": [{}], "imagePath": "{image_path}", "imageData": null, "imageHeight": {height}, "imageWidth": {width}}}"#,
        shapes.join(", ")
    )
}

/// Writes `<dir>/<stem>.json` and a placeholder `<dir>/<stem>.jpg`.
pub fn write_sample(dir: &Path, stem: &str, width: u32, height: u32, shapes: &[String]) -> PathBuf {
    fs::create_dir_all(dir).expect("create sample dir");
    let image_name = format!("{stem}.jpg");
    fs::write(dir.join(&image_name), b"jpg").expect("write image");
    let path = dir.join(format!("{stem}.json"));
    fs::write(&path, annotation_json(&image_name, width, height, shapes))
        .expect("write annotation");
    path
}

pub fn write_vocabulary(path: &Path, vehicles: &[&str], colors: &[&str]) {
    let quote = |names: &[&str]| {
        names
            .iter()
            .map(|n| format!("\"{n}\""))
            .collect::<Vec<_>>()
            .join(", ")
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create vocabulary dir");
    }
    fs::write(
        path,
        format!(
            r#"{{"vehicle": [{}], "color": [{}]}}"#,
            quote(vehicles),
            quote(colors)
        ),
    )
    .expect("write vocabulary");
}

/// Every file under `dir` (non-recursive) with its contents, sorted by name.
pub fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            let entry = entry.expect("dir entry");
            let name = entry.file_name().to_string_lossy().into_owned();
            let contents = fs::read(entry.path()).expect("read file");
            (name, contents)
        })
        .collect();
    files.sort();
    files
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}
