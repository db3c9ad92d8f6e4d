use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::Detection;
use crate::error::{Error, Result};
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use itertools::Itertools;
use ndarray::{Array4, ArrayView2, Axis, Ix2, s};
use ort::inputs;
use ort::value::TensorRef;
use std::path::Path;

/// YOLOv11 detection head: one row per anchor, `[cx, cy, w, h, score_0, .., score_n]`.
pub struct Yolov11BoundingBox {
    ort_session: OrtInferenceSession,
    class_names: Vec<String>,
    input_width: u32,
    input_height: u32,
    model_name: String,
}

impl Yolov11BoundingBox {
    pub fn new(
        model_path: &Path,
        class_names: Vec<String>,
        input_width: u32,
        input_height: u32,
        model_name: String,
    ) -> Result<Self> {
        let ort_session = OrtInferenceSession::new(model_path)?;
        Ok(Yolov11BoundingBox {
            ort_session,
            class_names,
            input_width,
            input_height,
            model_name,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl ObjectDetectionModel<BoundingBox> for Yolov11BoundingBox {
    fn input_width(&self) -> u32 {
        self.input_width
    }

    fn input_height(&self) -> u32 {
        self.input_height
    }

    fn run_inference(
        &mut self,
        input_array: &Array4<f32>,
        confidence: f32,
    ) -> Result<Vec<Detection<BoundingBox>>> {
        let outputs = self
            .ort_session
            .session
            .run(inputs!["images" => TensorRef::from_array_view(input_array)?])?;
        let output = outputs["output0"].try_extract_array::<f32>()?;
        if output.ndim() != 3 {
            return Err(Error::ModelOutput(format!(
                "expected a 3 dimensional output, got shape {:?}.",
                output.shape()
            )));
        }
        // (1, 4 + classes, anchors) -> (anchors, 4 + classes)
        let predictions = output
            .index_axis(Axis(0), 0)
            .reversed_axes()
            .into_dimensionality::<Ix2>()
            .map_err(|e| Error::ModelOutput(e.to_string()))?;
        decode_predictions(predictions, &self.class_names, confidence)
    }
}

/// Turns raw YOLO rows into detections, keeping rows whose best class score reaches `confidence`.
///
/// Class ids without a name in `class_names` are labelled with the id itself.
pub fn decode_predictions(
    predictions: ArrayView2<f32>,
    class_names: &[String],
    confidence: f32,
) -> Result<Vec<Detection<BoundingBox>>> {
    if predictions.ncols() < 5 {
        return Err(Error::ModelOutput(format!(
            "expected at least 5 values per prediction, got {}.",
            predictions.ncols()
        )));
    }
    let mut detections: Vec<Detection<BoundingBox>> = Vec::new();
    for row in predictions.axis_iter(Axis(0)) {
        let scores = row.slice(s![4..]);
        let Some(class_id) = scores.iter().position_max_by(|a, b| a.total_cmp(b)) else {
            continue;
        };
        let prob = scores[class_id];
        if prob.is_nan() || prob < confidence {
            continue;
        }
        let label = match class_names.get(class_id) {
            Some(v) => v.clone(),
            None => class_id.to_string(),
        };
        match BoundingBox::from_center(row[0], row[1], row[2], row[3], label) {
            Ok(annotation) => detections.push(Detection {
                annotation,
                confidence: prob,
            }),
            Err(e) => log::debug!("skipping prediction: {}", e),
        }
    }
    Ok(detections)
}
