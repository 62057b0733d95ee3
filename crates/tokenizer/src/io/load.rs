//! Loading persisted models.

use super::format::SerializedModel;
use shabda_core::{BpeModel, Result, ShabdaError};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

/// Model loader - reads a model JSON file.
pub struct ModelLoader;

impl ModelLoader {
    /// Load a model from a JSON file.
    ///
    /// A missing file is [`ShabdaError::ModelNotFound`]; unparsable or
    /// inconsistent content is [`ShabdaError::ModelCorrupt`]. Nothing is
    /// loaded partially.
    pub fn load(path: &Path) -> Result<BpeModel> {
        let file = File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ShabdaError::ModelNotFound {
                path: path.to_path_buf(),
            },
            _ => ShabdaError::Io {
                path: path.to_path_buf(),
                err,
            },
        })?;

        let serialized: SerializedModel = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                ShabdaError::ModelCorrupt(format!("{}: {}", path.display(), e))
            })?;

        let model = serialized.into_model()?;
        log::debug!(
            "Loaded model from {}: {} merges, {} tokens",
            path.display(),
            model.merges().len(),
            model.vocab().len()
        );
        Ok(model)
    }

    /// Parse a model from a JSON string.
    pub fn from_json_str(json: &str) -> Result<BpeModel> {
        let serialized: SerializedModel = serde_json::from_str(json)
            .map_err(|e| ShabdaError::ModelCorrupt(e.to_string()))?;
        serialized.into_model()
    }
}
