use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The parts of a COCO annotation file the YOLO conversion needs. Other keys are ignored.
#[derive(Debug, Deserialize)]
pub struct CocoDataset {
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
    pub categories: Vec<CocoCategory>,
}

#[derive(Debug, Deserialize)]
pub struct CocoImage {
    pub id: u64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub struct CocoAnnotation {
    #[serde(default)]
    pub id: u64,
    pub image_id: u64,
    pub category_id: u64,
    /// `[x_min, y_min, width, height]` in absolute pixels.
    pub bbox: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CocoCategory {
    pub id: u64,
    pub name: String,
}

/// Reads a COCO json file.
pub fn read_coco_json(filepath: &Path) -> Result<CocoDataset> {
    let file = File::open(filepath).map_err(|source| Error::AnnotationFileMissing {
        path: filepath.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::AnnotationParse {
        path: filepath.to_path_buf(),
        source,
    })
}
