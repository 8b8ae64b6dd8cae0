use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Scene Load Failed: {0}")]
    SceneLoad(String),

    #[error("Index Overflow: mesh {mesh} has {vertex_count} vertices, at most {max} fit 16-bit indices")]
    IndexOverflow {
        mesh: String,
        vertex_count: usize,
        max: usize,
    },

    #[error("Non-Triangle Face: mesh {mesh} face {face} has {arity} vertices")]
    NonTriangleFace {
        mesh: String,
        face: usize,
        arity: usize,
    },

    #[error("Index Out Of Range: mesh {mesh} face {face} references vertex {index} of {vertex_count}")]
    IndexOutOfRange {
        mesh: String,
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Attribute Mismatch: mesh {mesh} {attribute} has {actual} elements, expected {expected}")]
    AttributeMismatch {
        mesh: String,
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Texture Load Failed: {slot} map {path:?}: {source}")]
    TextureLoad {
        slot: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encode Failed: {0}")]
    Encode(String),

    #[error("Decode Failed: {0}")]
    Decode(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Human-readable label used in error messages and logs.
pub(crate) fn mesh_label(index: usize, name: &str) -> String {
    if name.is_empty() {
        format!("#{}", index)
    } else {
        format!("#{} '{}'", index, name)
    }
}
