//! See [`Error`].

use std::path::PathBuf;
use thiserror::Error;

/// Error types for this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Model path does not exist, or cannot be read: `{}`", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("Failed to load model from `{}`", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ort::Error,
    },

    #[error("Failed to run inference")]
    Inference(#[from] ort::Error),

    #[error("Unexpected model output: {0}")]
    ModelOutput(String),

    #[error("Image path does not exist, or cannot be read: `{}`", path.display())]
    ImageNotFound { path: PathBuf },

    #[error("Failed to read image `{}`", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write image `{}`", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Malformed bounding box: {0}")]
    MalformedBox(String),

    #[error("Malformed image entry `{file_name}`: {reason}")]
    MalformedImage { file_name: String, reason: String },

    #[error("Annotation {annotation_id} refers to unknown category {category_id}")]
    UnknownCategory { annotation_id: u64, category_id: u64 },

    #[error("Annotation file not found at `{}`", path.display())]
    AnnotationFileMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse annotation file `{}`", path.display())]
    AnnotationParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not find dataset folder `{}`", path.display())]
    DatasetFolderMissing {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(
        "Copy of `{}` to `{}` could not be verified ({expected} bytes expected, {actual} found)",
        source_path.display(),
        destination.display()
    )]
    CopyVerification {
        source_path: PathBuf,
        destination: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Failed to read config file `{}`", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file `{}`", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to serialize fusion report")]
    Report(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Type alias for [`Result<T, Error>`].
pub type Result<T> = std::result::Result<T, Error>;
