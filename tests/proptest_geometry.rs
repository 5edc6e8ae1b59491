use labelexport::convert::{pair_shapes, ColorShape, VehicleShape};
use labelexport::ir::{BBoxXYXY, Coord, Flags, Pixel, RoundedBox};
use labelexport::resolve::{
    resolve_label_from_flags, resolve_normalized_box, resolve_pixel_box, round_to_digits,
};
use labelexport::split::{eval_count, split_by_percent};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn pixel_boxes_are_always_ordered(
        (_, _, shape) in proptest_helpers::arb_shape_in_image(),
        digits in prop::option::of(0i32..3),
    ) {
        let bbox = resolve_pixel_box(&shape, digits).expect("two points");
        prop_assert!(bbox.xmin() <= bbox.xmax());
        prop_assert!(bbox.ymin() <= bbox.ymax());
    }

    #[test]
    fn yolo_values_stay_within_unit_range(
        (w, h, shape) in proptest_helpers::arb_shape_in_image()
    ) {
        let yolo = resolve_normalized_box(&shape, w, h).expect("two points");
        for value in yolo.values() {
            prop_assert!((0.0..=1.0).contains(&value), "{} out of range", value);
        }
    }

    #[test]
    fn yolo_box_reconstructs_pixel_box(
        (w, h, shape) in proptest_helpers::arb_shape_in_image()
    ) {
        let pixel = resolve_pixel_box(&shape, None).expect("two points");
        let yolo = resolve_normalized_box(&shape, w, h).expect("two points");
        let eps = w.max(h) as f64 * 1e-9;
        prop_assert!(((yolo.cx - yolo.w / 2.0) * w as f64 - pixel.xmin()).abs() < eps);
        prop_assert!(((yolo.cy + yolo.h / 2.0) * h as f64 - pixel.ymax()).abs() < eps);
    }

    #[test]
    fn rounding_is_idempotent(value in -1.0e6f64..1.0e6, digits in 0i32..4) {
        let once = round_to_digits(value, digits);
        prop_assert_eq!(round_to_digits(once, digits), once);
    }

    #[test]
    fn first_true_allowed_flag_is_chosen(entries in proptest_helpers::arb_flags()) {
        let allowed = vec!["car".to_string(), "bus".to_string(), "van".to_string()];
        let expected = entries
            .iter()
            .find(|(name, value)| *value && allowed.contains(name))
            .map(|(name, _)| name.clone());
        let flags: Flags = entries.into_iter().collect();
        let resolved = resolve_label_from_flags(&flags, &allowed).ok().map(str::to_string);
        prop_assert_eq!(resolved, expected);
    }

    #[test]
    fn color_inside_vehicle_is_always_paired(
        x in 0.0f64..1000.0,
        y in 0.0f64..1000.0,
        vw in 4.0f64..500.0,
        vh in 4.0f64..500.0,
        fx in 0.1f64..0.9,
        fy in 0.1f64..0.9,
    ) {
        let vehicle = VehicleShape {
            vehicle_type: "car".to_string(),
            bbox: RoundedBox { bbox: BBoxXYXY::from_xyxy(x, y, x + vw, y + vh), digits: 1 },
        };
        let center: Coord<Pixel> = Coord::new(x + vw * fx, y + vh * fy);
        let color = ColorShape {
            color: None,
            bbox: RoundedBox {
                bbox: BBoxXYXY::from_xyxy(center.x - 1.0, center.y - 1.0, center.x + 1.0, center.y + 1.0),
                digits: 0,
            },
        };
        let objects = pair_shapes(&[vehicle], &[color], false).expect("paired");
        prop_assert_eq!(objects.len(), 1);
        prop_assert_eq!(objects[0].attributes.vehicle_type.as_str(), "car");
    }

    #[test]
    fn percent_split_sizes_follow_eval_count(total in 0usize..300, percent in 0u8..=100) {
        let split = split_by_percent((0..total).collect::<Vec<_>>(), percent, Some(11));
        prop_assert_eq!(split.eval.len(), eval_count(total, percent));
        prop_assert_eq!(split.train.len() + split.eval.len(), total);
    }
}
