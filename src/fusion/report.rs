use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::{Detection, DetectionSet};
use crate::error::Result;
use crate::fusion::matcher::MatchResult;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// One EO detection together with its IR verification.
#[derive(Debug, PartialEq, Serialize)]
pub struct FusedDetection {
    pub index: usize,
    #[serde(flatten)]
    pub detection: Detection<BoundingBox>,
    pub verified: bool,
    pub ir_match: Option<usize>,
}

/// The outcome of fusing one EO/IR image pair.
#[derive(Debug, Serialize)]
pub struct FusionReport {
    pub eo_image: PathBuf,
    pub ir_image: PathBuf,
    pub iou_threshold: f32,
    pub verified_count: usize,
    pub eo_detections: Vec<FusedDetection>,
    pub ir_detections: DetectionSet,
}

impl FusionReport {
    pub fn new(
        eo_image: &Path,
        ir_image: &Path,
        iou_threshold: f32,
        eo: &DetectionSet,
        ir: &DetectionSet,
        matches: &MatchResult,
    ) -> Self {
        let eo_detections = eo
            .iter()
            .enumerate()
            .map(|(index, detection)| FusedDetection {
                index,
                detection: detection.clone(),
                verified: matches.contains(index),
                ir_match: matches.partner(index),
            })
            .collect();
        FusionReport {
            eo_image: eo_image.to_path_buf(),
            ir_image: ir_image.to_path_buf(),
            iou_threshold,
            verified_count: matches.len(),
            eo_detections,
            ir_detections: ir.clone(),
        }
    }

    pub fn write_json(&self, filepath: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(filepath)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
