//! Runtime configuration, read once at startup from a TOML file and passed to each command.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "configs/main_config.toml";

const DEFAULT_MODEL_PATH: &str = "data/models/yolo11n.onnx";
const DEFAULT_INPUT_SIZE: u32 = 640;
const DEFAULT_CONFIDENCE: f32 = 0.5;
const DEFAULT_NMS_IOU_THRESHOLD: f32 = 0.45;
const DEFAULT_FUSION_IOU_THRESHOLD: f32 = 0.5;
const DEFAULT_FUSION_OUTPUT_DIR: &str = "runs/fusion";
const DEFAULT_DATASET_ROOT: &str = "data/FLIR_ADAS_v2";
const DEFAULT_ANNOTATION_FILE: &str = "data/FLIR_ADAS_v2/images_thermal_train/coco.json";
const DEFAULT_YOLO_DATASET_DIR: &str = "data/FLIR_YOLO_Dataset";
const DEFAULT_RGB_FOLDER: &str = "images_rgb_train";
const DEFAULT_THERMAL_FOLDER: &str = "images_thermal_train";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub detector: DetectorConfig,
    pub fusion: FusionConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// ONNX weights file.
    pub model_path: PathBuf,
    /// Newline separated class names, in model output order.
    pub classes_path: Option<PathBuf>,
    pub input_width: u32,
    pub input_height: u32,
    pub confidence: f32,
    pub nms_iou_threshold: f32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FusionConfig {
    /// An EO box is verified by an IR box whose IoU is strictly greater than this.
    pub iou_threshold: f32,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    pub root: PathBuf,
    pub annotation_file: PathBuf,
    pub output_dir: PathBuf,
    pub rgb_folder: String,
    pub thermal_folder: String,
    /// Remove source images once their copy has been verified.
    pub move_images: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            classes_path: None,
            input_width: DEFAULT_INPUT_SIZE,
            input_height: DEFAULT_INPUT_SIZE,
            confidence: DEFAULT_CONFIDENCE,
            nms_iou_threshold: DEFAULT_NMS_IOU_THRESHOLD,
        }
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        FusionConfig {
            iou_threshold: DEFAULT_FUSION_IOU_THRESHOLD,
            output_dir: PathBuf::from(DEFAULT_FUSION_OUTPUT_DIR),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            root: PathBuf::from(DEFAULT_DATASET_ROOT),
            annotation_file: PathBuf::from(DEFAULT_ANNOTATION_FILE),
            output_dir: PathBuf::from(DEFAULT_YOLO_DATASET_DIR),
            rgb_folder: DEFAULT_RGB_FOLDER.to_string(),
            thermal_folder: DEFAULT_THERMAL_FOLDER.to_string(),
            move_images: false,
        }
    }
}

impl DatasetConfig {
    pub fn rgb_dir(&self) -> PathBuf {
        self.root.join(&self.rgb_folder)
    }

    pub fn thermal_dir(&self) -> PathBuf {
        self.root.join(&self.thermal_folder)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&raw).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let detector = &self.detector;
        if detector.model_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("detector.model_path must not be empty".into()));
        }
        if detector.input_width == 0 || detector.input_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "detector input size must be positive, got {}x{}",
                detector.input_width, detector.input_height
            )));
        }
        validate_unit_interval("detector.confidence", detector.confidence)?;
        validate_unit_interval("detector.nms_iou_threshold", detector.nms_iou_threshold)?;
        validate_unit_interval("fusion.iou_threshold", self.fusion.iou_threshold)?;
        let dataset = &self.dataset;
        if dataset.rgb_folder.trim().is_empty() || dataset.thermal_folder.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "dataset.rgb_folder and dataset.thermal_folder must not be empty".into(),
            ));
        }
        Ok(())
    }
}

pub fn validate_unit_interval(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}
