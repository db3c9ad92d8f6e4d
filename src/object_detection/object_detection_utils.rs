use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::annotations::detection::{Detection, DetectionSet};
use crate::config::DetectorConfig;
use crate::error::Result;
use crate::image_utils::image_conversion::convert_rgb_image_to_owned_array;
use crate::image_utils::image_io::read_image_as_rgb8;
use crate::image_utils::padding::letterbox_rgb8;
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::yolov11_bounding_box::Yolov11BoundingBox;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads a file with the class names into a vector so that the number ids
/// which come directly from the ORT inference session can be given meaning.
pub fn read_classes_txt_file(filepath: &Path) -> io::Result<Vec<String>> {
    BufReader::new(File::open(filepath)?)
        .lines()
        .map(|line| line.map(|l| l.trim().to_string()))
        .filter(|line| !matches!(line, Ok(l) if l.is_empty()))
        .collect()
}

/// Loads the detector described by `config`.
///
/// The model identifier is the path to an ONNX weights file. Without a classes file the
/// detections are labelled with their numeric class id.
pub fn load_model(config: &DetectorConfig) -> Result<Yolov11BoundingBox> {
    let class_names = match &config.classes_path {
        Some(path) => read_classes_txt_file(path)?,
        None => Vec::new(),
    };
    let model_name = config
        .model_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.model_path.display().to_string());
    let model = Yolov11BoundingBox::new(
        &config.model_path,
        class_names,
        config.input_width,
        config.input_height,
        model_name,
    )?;
    log::info!("AI Model '{}' loaded successfully.", model.model_name());
    Ok(model)
}

/// Runs object detection on a single image.
///
/// The image is letterboxed to the model input, and the resulting boxes are mapped back to
/// pixels of the original image, clipped to its bounds and filtered with NMS.
pub fn run_detection<M: ObjectDetectionModel<BoundingBox>>(
    model: &mut M,
    image_path: &Path,
    confidence: f32,
    nms_iou_threshold: f32,
) -> Result<DetectionSet> {
    let image = read_image_as_rgb8(image_path)?;
    let (image_width, image_height) = image.dimensions();
    let letterboxed = letterbox_rgb8(&image, model.input_width(), model.input_height());
    let input_array = convert_rgb_image_to_owned_array(&letterboxed.image);
    let detections = model
        .run_inference(&input_array, confidence)?
        .into_iter()
        .map(|det| rescale_detection(det, letterboxed.scale, image_width, image_height))
        .collect::<Result<Vec<_>>>()?;
    let detections = non_maximum_suppression(detections, nms_iou_threshold);
    log::info!(
        "Detection complete for image: {} ({} detections)",
        image_path.display(),
        detections.len()
    );
    for det in detections.iter() {
        log::debug!("{} ({:.2})", det.annotation, det.confidence);
    }
    Ok(DetectionSet::new(detections))
}

/// Maps a detection from letterboxed input pixels back to original image pixels.
fn rescale_detection(
    detection: Detection<BoundingBox>,
    scale: f32,
    image_width: u32,
    image_height: u32,
) -> Result<Detection<BoundingBox>> {
    let max_x = image_width as f32;
    let max_y = image_height as f32;
    let (left, top, right, bottom) = detection.annotation.as_xyxy();
    let annotation = BoundingBox::new(
        (left / scale).clamp(0.0, max_x),
        (top / scale).clamp(0.0, max_y),
        (right / scale).clamp(0.0, max_x),
        (bottom / scale).clamp(0.0, max_y),
        detection.annotation.category().to_string(),
    )?;
    Ok(Detection {
        annotation,
        confidence: detection.confidence,
    })
}

/// Non maxmimum suppression is a way of removing duplicate detections.
///
/// Detections are ordered by descending confidence. A detection is dropped when it overlaps a
/// kept detection of the same category by more than `iou_threshold`.
pub fn non_maximum_suppression<T: BoundingBoxGeometry>(
    mut detections: Vec<Detection<T>>,
    iou_threshold: f32,
) -> Vec<Detection<T>> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut suppressed: Vec<bool> = vec![false; detections.len()];
    for current_index in 0..detections.len() {
        if suppressed[current_index] {
            continue;
        }
        for other_index in (current_index + 1)..detections.len() {
            if suppressed[other_index] {
                continue;
            }
            let current = &detections[current_index].annotation;
            let other = &detections[other_index].annotation;
            if current.category() != other.category() {
                continue;
            }
            if current.intersection_over_union(other) > iou_threshold {
                suppressed[other_index] = true;
            }
        }
    }
    let mut drop_iter = suppressed.into_iter();
    detections.retain(|_| !drop_iter.next().unwrap_or(false));
    detections
}
