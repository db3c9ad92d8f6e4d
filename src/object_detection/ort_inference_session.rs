use crate::error::{Error, Result};
use ort::session::Session;
use std::path::Path;

/// An onnxruntime inference session.
///
/// All of the object detection classes in this project are just wrappers
/// around an ONNX inference session that handles running the model on
/// hardware.
pub struct OrtInferenceSession {
    pub session: Session,
}

impl OrtInferenceSession {
    pub fn new(model_path: &Path) -> Result<Self> {
        if !model_path.is_file() {
            return Err(Error::ModelNotFound {
                path: model_path.to_path_buf(),
            });
        }
        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(model_path))
            .map_err(|source| Error::ModelLoad {
                path: model_path.to_path_buf(),
                source,
            })?;
        Ok(Self { session })
    }
}
