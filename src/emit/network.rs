//! Darknet network configuration rendering.
//!
//! The built-in templates carry the `[net]` block and the detection heads,
//! which are the only sections that depend on the dataset. A complete
//! backbone can be supplied as a custom template file using the same
//! placeholders.

use serde::Serialize;

/// Training hyperparameters injected into the network config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NetworkParams {
    pub batch_size: u32,
    pub subdivisions: u32,
    pub height: u32,
    pub width: u32,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            batch_size: 64,
            subdivisions: 16,
            height: 416,
            width: 416,
        }
    }
}

/// Which detector architecture the config describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkTemplate {
    #[default]
    Yolo,
    YoloTiny,
}

impl NetworkTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            NetworkTemplate::Yolo => "yolo",
            NetworkTemplate::YoloTiny => "yolo-tiny",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            NetworkTemplate::Yolo => "yolov4.cfg",
            NetworkTemplate::YoloTiny => "yolov4-tiny.cfg",
        }
    }

    pub fn builtin(&self) -> &'static str {
        match self {
            NetworkTemplate::Yolo => YOLOV4_TEMPLATE,
            NetworkTemplate::YoloTiny => YOLOV4_TINY_TEMPLATE,
        }
    }

    pub fn render(&self, params: &NetworkParams, classes: usize) -> String {
        render_template(self.builtin(), params, classes)
    }
}

/// Where the network config text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin,
    /// Template text read from a user-supplied file.
    Custom(String),
}

impl TemplateSource {
    pub fn render(&self, template: NetworkTemplate, params: &NetworkParams, classes: usize) -> String {
        match self {
            TemplateSource::Builtin => template.render(params, classes),
            TemplateSource::Custom(text) => render_template(text, params, classes),
        }
    }
}

/// Darknet's rule of thumb: 2000 iterations per class, at least 6000.
pub fn max_batches(classes: usize) -> usize {
    (classes * 2000).max(6000)
}

/// Substitute every placeholder in `template`.
pub fn render_template(template: &str, params: &NetworkParams, classes: usize) -> String {
    let max_batches = max_batches(classes);
    let steps = format!("{},{}", max_batches * 8 / 10, max_batches * 9 / 10);
    let filters = (classes + 5) * 3;

    template
        .replace("{batch}", &params.batch_size.to_string())
        .replace("{subdivisions}", &params.subdivisions.to_string())
        .replace("{width}", &params.width.to_string())
        .replace("{height}", &params.height.to_string())
        .replace("{classes}", &classes.to_string())
        .replace("{filters}", &filters.to_string())
        .replace("{max_batches}", &max_batches.to_string())
        .replace("{steps}", &steps)
}

const YOLOV4_TEMPLATE: &str = "[net]
batch={batch}
subdivisions={subdivisions}
width={width}
height={height}
channels=3
momentum=0.949
decay=0.0005
angle=0
saturation=1.5
exposure=1.5
hue=.1
learning_rate=0.0013
burn_in=1000
max_batches={max_batches}
policy=steps
steps={steps}
scales=.1,.1
mosaic=1

[convolutional]
size=1
stride=1
pad=1
filters={filters}
activation=linear

[yolo]
mask=0,1,2
anchors=12,16,19,36,40,28,36,75,76,55,72,146,142,110,192,243,459,401
classes={classes}
num=9
jitter=.3
ignore_thresh=.7
truth_thresh=1
scale_x_y=1.2
iou_thresh=0.213
cls_normalizer=1.0
iou_normalizer=0.07
iou_loss=ciou
nms_kind=greedynms
beta_nms=0.6
max_delta=5

[convolutional]
size=1
stride=1
pad=1
filters={filters}
activation=linear

[yolo]
mask=3,4,5
anchors=12,16,19,36,40,28,36,75,76,55,72,146,142,110,192,243,459,401
classes={classes}
num=9
jitter=.3
ignore_thresh=.7
truth_thresh=1
scale_x_y=1.1
iou_thresh=0.213
cls_normalizer=1.0
iou_normalizer=0.07
iou_loss=ciou
nms_kind=greedynms
beta_nms=0.6
max_delta=5

[convolutional]
size=1
stride=1
pad=1
filters={filters}
activation=linear

[yolo]
mask=6,7,8
anchors=12,16,19,36,40,28,36,75,76,55,72,146,142,110,192,243,459,401
classes={classes}
num=9
jitter=.3
ignore_thresh=.7
truth_thresh=1
random=1
scale_x_y=1.05
iou_thresh=0.213
cls_normalizer=1.0
iou_normalizer=0.07
iou_loss=ciou
nms_kind=greedynms
beta_nms=0.6
max_delta=5
";

const YOLOV4_TINY_TEMPLATE: &str = "[net]
batch={batch}
subdivisions={subdivisions}
width={width}
height={height}
channels=3
momentum=0.9
decay=0.0005
angle=0
saturation=1.5
exposure=1.5
hue=.1
learning_rate=0.00261
burn_in=1000
max_batches={max_batches}
policy=steps
steps={steps}
scales=.1,.1

[convolutional]
size=1
stride=1
pad=1
filters={filters}
activation=linear

[yolo]
mask=3,4,5
anchors=10,14,23,27,37,58,81,82,135,169,344,319
classes={classes}
num=6
jitter=.3
scale_x_y=1.05
cls_normalizer=1.0
iou_normalizer=0.07
iou_loss=ciou
ignore_thresh=.7
truth_thresh=1
random=0
resize=1.5
nms_kind=greedynms
beta_nms=0.6

[convolutional]
size=1
stride=1
pad=1
filters={filters}
activation=linear

[yolo]
mask=0,1,2
anchors=10,14,23,27,37,58,81,82,135,169,344,319
classes={classes}
num=6
jitter=.3
scale_x_y=1.05
cls_normalizer=1.0
iou_normalizer=0.07
iou_loss=ciou
ignore_thresh=.7
truth_thresh=1
random=0
resize=1.5
nms_kind=greedynms
beta_nms=0.6
";
