//! Saving trained models.

use super::format::SerializedModel;
use shabda_core::{BpeModel, Result, ShabdaError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Model saver - writes a model as pretty-printed JSON.
pub struct ModelSaver<'a> {
    model: &'a BpeModel,
}

impl<'a> ModelSaver<'a> {
    pub fn new(model: &'a BpeModel) -> Self {
        Self { model }
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |err| ShabdaError::Io {
            path: path.to_path_buf(),
            err,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.serialize())?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        log::info!(
            "Saved model to {} ({} merges, {} tokens)",
            path.display(),
            self.model.merges().len(),
            self.model.vocab().len()
        );
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    fn serialize(&self) -> SerializedModel {
        SerializedModel::from_model(self.model)
    }
}
