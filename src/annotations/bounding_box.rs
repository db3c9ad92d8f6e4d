use crate::error::{Error, Result};
use crate::fusion::iou::iou;
use serde::Serialize;
use std::fmt;

/// A struct representing a bounding box.
///
/// A bounding box is a rectangle used to annotate objects in images for training deep object
/// detection models. An ideal bounding box is the smallest box that totally contains the
/// object within the image. Bounding boxes are composed of a rectangle and a category denoting
/// what object it is. When an object detection model runs, it will output bounding boxes as its
/// output along with a probability encoding its confidence in that box+category.
///
/// This project uses the standard convention of the left side of the image being x=0 and the top
/// of the image being y=0. EO and IR detections are compared in this shared pixel space.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    category: String,
}

impl BoundingBox {
    /// Checks if a box has valid parameters before constructing.
    ///
    /// Zero-area boxes are allowed. Inverted or non-finite boxes are rejected so that a NaN
    /// never reaches the overlap computation.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32, category: String) -> Result<Self> {
        if ![left, top, right, bottom].iter().all(|v| v.is_finite()) {
            Err(Error::MalformedBox(format!(
                "coordinates must be finite, got ({}, {}, {}, {}).",
                left, top, right, bottom
            )))
        } else if left > right {
            Err(Error::MalformedBox(format!(
                "value for left > value for right ({} > {}).",
                left, right
            )))
        } else if top > bottom {
            Err(Error::MalformedBox(format!(
                "value for top > value for bottom ({} > {}).",
                top, bottom
            )))
        } else {
            Ok(BoundingBox {
                left,
                top,
                right,
                bottom,
                category,
            })
        }
    }

    /// Builds a box from its center, width and height, the layout YOLO heads emit.
    pub fn from_center(
        center_x: f32,
        center_y: f32,
        width: f32,
        height: f32,
        category: String,
    ) -> Result<Self> {
        BoundingBox::new(
            center_x - (width / 2.0),
            center_y - (height / 2.0),
            center_x + (width / 2.0),
            center_y + (height / 2.0),
            category,
        )
    }
}

/// Read access to box geometry, shared by every annotation type that wraps a rectangle.
pub trait BoundingBoxGeometry {
    fn left(&self) -> f32;
    fn top(&self) -> f32;
    fn right(&self) -> f32;
    fn bottom(&self) -> f32;
    fn category(&self) -> &str;

    fn as_xyxy(&self) -> (f32, f32, f32, f32) {
        (self.left(), self.top(), self.right(), self.bottom())
    }

    fn intersection_over_union<U: BoundingBoxGeometry>(&self, other: &U) -> f32 {
        iou(self, other)
    }
}

impl BoundingBoxGeometry for BoundingBox {
    fn left(&self) -> f32 {
        self.left
    }

    fn top(&self) -> f32 {
        self.top
    }

    fn right(&self) -> f32 {
        self.right
    }

    fn bottom(&self) -> f32 {
        self.bottom
    }

    fn category(&self) -> &str {
        &self.category
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox {{ left: {}, top: {}, right: {}, bottom: {}, category: {} }}",
            self.left, self.top, self.right, self.bottom, self.category
        )
    }
}
