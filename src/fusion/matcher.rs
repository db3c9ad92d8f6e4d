use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::fusion::iou::iou;
use std::collections::BTreeMap;

/// The EO detections that were confirmed by at least one IR detection.
///
/// Keys are EO indices, values the IR index that confirmed them. Iteration is in ascending EO
/// index order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchResult {
    matches: BTreeMap<usize, usize>,
}

impl MatchResult {
    pub fn contains(&self, eo_index: usize) -> bool {
        self.matches.contains_key(&eo_index)
    }

    /// The IR index that verified `eo_index`, if any.
    pub fn partner(&self, eo_index: usize) -> Option<usize> {
        self.matches.get(&eo_index).copied()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.matches.iter().map(|(eo, ir)| (*eo, *ir))
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Greedy cross-matching of EO boxes against IR boxes.
///
/// For every EO box, IR boxes are scanned in order and the first one whose IoU is strictly
/// greater than `threshold` verifies it. This is not an optimal assignment: several EO boxes
/// may be verified by the same IR box, and a later IR box with a higher IoU is never
/// considered once an earlier one qualified.
pub fn verify_detections<A, B>(eo_boxes: &[A], ir_boxes: &[B], threshold: f32) -> MatchResult
where
    A: BoundingBoxGeometry,
    B: BoundingBoxGeometry,
{
    let mut matches = BTreeMap::new();
    for (eo_index, eo_box) in eo_boxes.iter().enumerate() {
        if let Some(ir_index) = ir_boxes
            .iter()
            .position(|ir_box| iou(eo_box, ir_box) > threshold)
        {
            matches.insert(eo_index, ir_index);
        }
    }
    MatchResult { matches }
}
