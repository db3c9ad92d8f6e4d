//! EO/IR fusion: detections from the visible image are verified against the thermal image.

pub mod iou;
pub mod matcher;
pub mod report;

use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::annotations::detection::{Detection, DetectionSet};
use crate::config::DetectorConfig;
use crate::error::Result;
use crate::fusion::matcher::verify_detections;
use crate::fusion::report::FusionReport;
use crate::image_utils::image_io::read_image_dimensions;
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::object_detection_utils::run_detection;
use std::path::Path;

/// Detects on both images of a pair with the same model and verifies EO detections against IR.
///
/// IR detections are scaled into EO image pixels before matching, so frames of different sizes
/// are compared in one coordinate space. The report carries the scaled IR boxes.
pub fn fuse_pair<M: ObjectDetectionModel<BoundingBox>>(
    model: &mut M,
    detector: &DetectorConfig,
    eo_image: &Path,
    ir_image: &Path,
    iou_threshold: f32,
) -> Result<FusionReport> {
    let eo = run_detection(model, eo_image, detector.confidence, detector.nms_iou_threshold)?;
    let ir = run_detection(model, ir_image, detector.confidence, detector.nms_iou_threshold)?;
    let eo_size = read_image_dimensions(eo_image)?;
    let ir_size = read_image_dimensions(ir_image)?;
    let ir = if eo_size == ir_size {
        ir
    } else {
        log::info!(
            "Scaling IR detections from {}x{} to the {}x{} EO frame",
            ir_size.0,
            ir_size.1,
            eo_size.0,
            eo_size.1
        );
        scale_detections(&ir, ir_size, eo_size)?
    };
    let matches = verify_detections(&eo, &ir, iou_threshold);
    if matches.is_empty() && !eo.is_empty() {
        log::warn!("No EO detection was verified by the IR image");
    }
    log::info!(
        "{} of {} EO detections verified by {} IR detections (IoU > {})",
        matches.len(),
        eo.len(),
        ir.len(),
        iou_threshold
    );
    for (eo_index, ir_index) in matches.pairs() {
        log::debug!(
            "EO #{} {} verified by IR #{} {}",
            eo_index,
            eo[eo_index].annotation,
            ir_index,
            ir[ir_index].annotation
        );
    }
    Ok(FusionReport::new(
        eo_image,
        ir_image,
        iou_threshold,
        &eo,
        &ir,
        &matches,
    ))
}

/// Maps detections from a `from` sized frame into a `to` sized frame.
pub fn scale_detections(
    detections: &DetectionSet,
    from: (u32, u32),
    to: (u32, u32),
) -> Result<DetectionSet> {
    let scale_x = to.0 as f32 / from.0 as f32;
    let scale_y = to.1 as f32 / from.1 as f32;
    detections
        .iter()
        .map(|det| {
            let (left, top, right, bottom) = det.as_xyxy();
            let annotation = BoundingBox::new(
                left * scale_x,
                top * scale_y,
                right * scale_x,
                bottom * scale_y,
                det.category().to_string(),
            )?;
            Ok(Detection {
                annotation,
                confidence: det.confidence,
            })
        })
        .collect()
}
