//! Binary `.model` container.
//!
//! Layout (bincode, little-endian, fixed-width integers):
//! `magic: [u8; 4]`, `version: u32`, then `u64` mesh count followed by the
//! mesh records. Strings and byte spans are `u64`-length prefixed, optional
//! fields carry a one-byte presence tag. The render state is stored by name.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::model::{Mesh, Model};

pub const MODEL_MAGIC: [u8; 4] = *b"LMDL";
pub const MODEL_VERSION: u32 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHeader {
    pub magic: [u8; 4],
    pub version: u32,
}

impl Default for ModelHeader {
    fn default() -> Self {
        Self {
            magic: MODEL_MAGIC,
            version: MODEL_VERSION,
        }
    }
}

#[derive(Serialize)]
struct ModelFileRef<'a> {
    header: ModelHeader,
    meshes: &'a [Mesh],
}

#[derive(Deserialize)]
struct ModelFile {
    header: ModelHeader,
    meshes: Vec<Mesh>,
}

pub struct ModelEncoder;

impl ModelEncoder {
    /// Validates every record and serializes the whole model in memory.
    pub fn encode(model: &Model) -> ModelResult<Vec<u8>> {
        for (index, mesh) in model.meshes.iter().enumerate() {
            mesh.validate(index)?;
        }

        let file = ModelFileRef {
            header: ModelHeader::default(),
            meshes: &model.meshes,
        };
        bincode::serialize(&file).map_err(|e| ModelError::Encode(e.to_string()))
    }

    /// Encodes `model` and replaces `path` with it.
    ///
    /// Bytes go to a sibling temporary file that is renamed over `path` only
    /// after a complete, flushed write. On failure nothing is left behind.
    pub fn save_to_file<P: AsRef<Path>>(model: &Model, path: P) -> ModelResult<usize> {
        let path = path.as_ref();
        let encoded = Self::encode(model)?;

        let temp_path = temp_path_for(path);
        if let Err(err) = write_synced(&temp_path, &encoded) {
            std::fs::remove_file(&temp_path).ok();
            return Err(ModelError::Encode(format!(
                "failed to write {:?}: {}",
                temp_path, err
            )));
        }

        if let Err(err) = std::fs::rename(&temp_path, path) {
            std::fs::remove_file(&temp_path).ok();
            return Err(ModelError::Encode(format!(
                "failed to move model into place at {:?}: {}",
                path, err
            )));
        }

        log::info!(
            "Wrote {} meshes to {:?} ({} bytes)",
            model.meshes.len(),
            path,
            encoded.len()
        );
        Ok(encoded.len())
    }

    pub fn decode(bytes: &[u8]) -> ModelResult<Model> {
        let file: ModelFile = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .reject_trailing_bytes()
            .deserialize(bytes)
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        if file.header.magic != MODEL_MAGIC {
            return Err(ModelError::Decode(format!(
                "bad magic {:?}, not a model file",
                file.header.magic
            )));
        }
        if file.header.version != MODEL_VERSION {
            return Err(ModelError::Decode(format!(
                "unsupported model version {} (expected {})",
                file.header.version, MODEL_VERSION
            )));
        }

        for (index, mesh) in file.meshes.iter().enumerate() {
            mesh.validate(index)
                .map_err(|e| ModelError::Decode(e.to_string()))?;
        }

        Ok(Model {
            meshes: file.meshes,
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ModelResult<Model> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ModelError::Decode(format!("failed to read {:?}: {}", path, e)))?;
        Self::decode(&bytes)
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling path unique per process and per call.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "model".into());
    let sequence = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    name.push(format!(".{}.{}.tmp", std::process::id(), sequence));
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
