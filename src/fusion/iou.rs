use crate::annotations::bounding_box::BoundingBoxGeometry;

/// Intersection over Union of two boxes, in `[0.0, 1.0]`.
///
/// Non-overlapping boxes score 0. When both boxes are degenerate the union is empty and the
/// result is 0 rather than a division by zero.
pub fn iou<A, B>(box_a: &A, box_b: &B) -> f32
where
    A: BoundingBoxGeometry + ?Sized,
    B: BoundingBoxGeometry + ?Sized,
{
    // Areas of finite f32 boxes can overflow f32, so the arithmetic is done in f64.
    let (a_left, a_top, a_right, a_bottom) = widen(box_a);
    let (b_left, b_top, b_right, b_bottom) = widen(box_b);
    let x1 = a_left.max(b_left);
    let y1 = a_top.max(b_top);
    let x2 = a_right.min(b_right);
    let y2 = a_bottom.min(b_bottom);

    // Negative extents mean the boxes are disjoint along that axis.
    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a_right - a_left) * (a_bottom - a_top);
    let area_b = (b_right - b_left) * (b_bottom - b_top);
    let union = area_a + area_b - intersection;
    if union > 0.0 {
        (intersection / union) as f32
    } else {
        0.0
    }
}

fn widen<T: BoundingBoxGeometry + ?Sized>(bbox: &T) -> (f64, f64, f64, f64) {
    (
        f64::from(bbox.left()),
        f64::from(bbox.top()),
        f64::from(bbox.right()),
        f64::from(bbox.bottom()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;

    fn bbox(left: f32, top: f32, right: f32, bottom: f32) -> BoundingBox {
        BoundingBox::new(left, top, right, bottom, "test".to_string()).unwrap()
    }

    #[test]
    fn identical_boxes() {
        let a = bbox(3.5, 1.0, 12.0, 40.25);
        assert_eq!(iou(&a, &a), 1.0);
    }

    #[test]
    fn symmetric() {
        let pairs = [
            (bbox(0.0, 0.0, 10.0, 10.0), bbox(5.0, 5.0, 15.0, 15.0)),
            (bbox(0.0, 0.0, 4.0, 8.0), bbox(1.0, 2.0, 3.0, 3.0)),
            (bbox(0.0, 0.0, 1.0, 1.0), bbox(2.0, 2.0, 3.0, 3.0)),
            (bbox(2.0, 2.0, 2.0, 2.0), bbox(0.0, 0.0, 5.0, 5.0)),
        ];
        for (a, b) in pairs.iter() {
            assert_eq!(iou(a, b), iou(b, a));
        }
    }

    #[test]
    fn disjoint_boxes() {
        assert_eq!(iou(&bbox(0.0, 0.0, 1.0, 1.0), &bbox(2.0, 2.0, 3.0, 3.0)), 0.0);
        // Overlap on one axis only must not yield a negative area.
        assert_eq!(iou(&bbox(0.0, 0.0, 10.0, 1.0), &bbox(5.0, 2.0, 15.0, 3.0)), 0.0);
    }

    #[test]
    fn touching_edges() {
        assert_eq!(iou(&bbox(0.0, 0.0, 1.0, 1.0), &bbox(1.0, 0.0, 2.0, 1.0)), 0.0);
    }

    #[test]
    fn degenerate_boxes() {
        let point = bbox(4.0, 4.0, 4.0, 4.0);
        let line = bbox(0.0, 4.0, 10.0, 4.0);
        assert_eq!(iou(&point, &point), 0.0);
        assert_eq!(iou(&point, &line), 0.0);
        assert_eq!(iou(&point, &bbox(0.0, 0.0, 10.0, 10.0)), 0.0);
    }

    #[test]
    fn partial_overlap() {
        let value = iou(&bbox(0.0, 0.0, 10.0, 10.0), &bbox(5.0, 5.0, 15.0, 15.0));
        assert!((value - 25.0 / 175.0).abs() < 1e-6);
        assert!((value - 0.142857).abs() < 1e-5);
    }

    #[test]
    fn contained_box() {
        let value = iou(&bbox(0.0, 0.0, 10.0, 10.0), &bbox(1.0, 1.0, 9.0, 9.0));
        assert!((value - 0.64).abs() < 1e-6);
    }

    #[test]
    fn huge_boxes_do_not_overflow() {
        let square = bbox(0.0, 0.0, 1e20, 1e20);
        assert_eq!(iou(&square, &square), 1.0);
        let wide = bbox(-3e38, 0.0, 3e38, 1.0);
        assert_eq!(iou(&wide, &wide), 1.0);
        let half = bbox(0.0, 0.0, 1e20, 5e19);
        assert!((iou(&square, &half) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn trait_method_delegates() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.intersection_over_union(&b), iou(&a, &b));
    }
}
