use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::annotations::detection::Detection;
use crate::error::Result;
use ndarray::Array4;

/// Defines a trait that all object detection models must follow.
pub trait ObjectDetectionModel<T: BoundingBoxGeometry> {
    /// Width of the input tensor the model expects, in pixels.
    fn input_width(&self) -> u32;

    fn input_height(&self) -> u32;

    /// Runs the model on a `(1, 3, input_height, input_width)` tensor with values in `[0, 1]`.
    ///
    /// Coordinates of the returned detections are in input tensor pixels. Only detections whose
    /// best class score is at least `confidence` are returned; no suppression is applied here.
    fn run_inference(&mut self, input_array: &Array4<f32>, confidence: f32)
    -> Result<Vec<Detection<T>>>;
}
