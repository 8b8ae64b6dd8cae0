//! Raw texture payloads. Files are embedded as-is, never decoded.

use std::path::{Path, PathBuf};

use crate::error::{ModelError, ModelResult};

#[derive(Clone, Debug)]
pub struct TextureLoader {
    base_directory: PathBuf,
}

impl TextureLoader {
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
        }
    }

    /// Loader rooted at the directory holding `model_path`.
    pub fn for_model(model_path: impl AsRef<Path>) -> Self {
        let base = model_path
            .as_ref()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(base)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.base_directory.join(relative)
    }

    pub fn load(&self, slot: &'static str, relative: &str) -> ModelResult<Vec<u8>> {
        let path = self.resolve(relative);
        let to_error = |source| ModelError::TextureLoad {
            slot,
            path: path.clone(),
            source,
        };

        let metadata = std::fs::metadata(&path).map_err(to_error)?;
        if !metadata.is_file() {
            return Err(to_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let bytes = std::fs::read(&path).map_err(to_error)?;
        log::debug!("Loaded {} map {:?} ({} bytes)", slot, path, bytes.len());
        Ok(bytes)
    }

    /// Like [`TextureLoader::load`], but a failure only costs the slot.
    pub fn load_optional(&self, slot: &'static str, relative: &str) -> Option<Vec<u8>> {
        if relative.is_empty() {
            return None;
        }
        match self.load(slot, relative) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("{}; {} map omitted", err, slot);
                None
            }
        }
    }
}
