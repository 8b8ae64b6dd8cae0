//! Converts an imported scene into a renderer-ready `.model` file.
//!
//! `import` → `scene` → (`attributes`, `indices`, `material` + `texture`)
//! per mesh → `encoder`.

#[cfg(not(target_endian = "little"))]
compile_error!("attribute buffers are cast in place and must be little-endian");

pub mod attributes;
pub mod encoder;
pub mod error;
pub mod import;
pub mod indices;
pub mod material;
pub mod model;
pub mod pipeline;
pub mod postprocess;
pub mod scene;
pub mod texture;

pub use encoder::{MODEL_MAGIC, MODEL_VERSION, ModelEncoder, ModelHeader};
pub use error::{ModelError, ModelResult};
pub use import::{ImportOptions, import_scene};
pub use model::{MAX_VERTICES, Mesh, Model, RenderState};
pub use pipeline::{ConvertOptions, build_mesh, convert_scene};
pub use scene::{Bone, Face, MeshDescriptor, Scene, SceneAdapter, SceneMaterial, SceneMesh, TextureSlot};
pub use texture::TextureLoader;
