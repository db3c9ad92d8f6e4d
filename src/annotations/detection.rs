use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use serde::Serialize;
use std::ops::Deref;

/// A detection is what is produced as output from an object detection model.
///
/// A detection is any annotation combined with a confidence score: a probability value that
/// encodes the model's belief that the detection is true.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection<T: BoundingBoxGeometry> {
    pub annotation: T,
    pub confidence: f32,
}

impl<T: BoundingBoxGeometry> BoundingBoxGeometry for Detection<T> {
    fn left(&self) -> f32 {
        self.annotation.left()
    }

    fn top(&self) -> f32 {
        self.annotation.top()
    }

    fn right(&self) -> f32 {
        self.annotation.right()
    }

    fn bottom(&self) -> f32 {
        self.annotation.bottom()
    }

    fn category(&self) -> &str {
        self.annotation.category()
    }
}

/// The detections produced for one image, in the order the detector emitted them.
///
/// Indices into a `DetectionSet` are stable, which is what the cross-matcher reports.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DetectionSet {
    detections: Vec<Detection<BoundingBox>>,
}

impl DetectionSet {
    pub fn new(detections: Vec<Detection<BoundingBox>>) -> Self {
        DetectionSet { detections }
    }
}

impl Deref for DetectionSet {
    type Target = [Detection<BoundingBox>];

    fn deref(&self) -> &Self::Target {
        &self.detections
    }
}

impl FromIterator<Detection<BoundingBox>> for DetectionSet {
    fn from_iter<I: IntoIterator<Item = Detection<BoundingBox>>>(iter: I) -> Self {
        DetectionSet::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection<BoundingBox>;
    type IntoIter = std::slice::Iter<'a, Detection<BoundingBox>>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}
