//! In-memory scene handed over by the importer, and the adapter that turns it
//! into per-mesh descriptors for the rest of the pipeline.

use std::collections::HashMap;

use crate::error::{ModelError, ModelResult, mesh_label};

/// Vertex-index references of one polygon. The importer triangulates, so
/// anything other than three entries is a broken precondition.
pub type Face = Vec<u32>;

/// Named texture references a material can carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse,
    Height,
    Opacity,
    Ambient,
    Specular,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneMaterial {
    pub name: String,
    pub textures: HashMap<TextureSlot, String>,
}

impl SceneMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            textures: HashMap::new(),
        }
    }

    pub fn with_texture(mut self, slot: TextureSlot, path: impl Into<String>) -> Self {
        self.textures.insert(slot, path.into());
        self
    }

    /// Path bound to `slot`, or an empty string when the slot is unset.
    pub fn texture(&self, slot: TextureSlot) -> &str {
        self.textures.get(&slot).map_or("", String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bone {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneMesh {
    pub name: String,
    pub vertex_count: usize,
    pub positions: Option<Vec<[f32; 3]>>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub tangents: Option<Vec<[f32; 3]>>,
    pub bitangents: Option<Vec<[f32; 3]>>,
    /// UV channels, `[u, v, w]` per vertex. Only channel 0 is exported.
    pub texture_coords: Vec<Vec<[f32; 3]>>,
    pub faces: Vec<Face>,
    pub material_index: usize,
    pub bones: Vec<Bone>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
}

/// Borrowed, normalized view of one submesh.
#[derive(Clone, Debug)]
pub struct MeshDescriptor<'a> {
    pub index: usize,
    pub name: &'a str,
    pub vertex_count: usize,
    pub positions: Option<&'a [[f32; 3]]>,
    pub normals: Option<&'a [[f32; 3]]>,
    pub tangents: Option<&'a [[f32; 3]]>,
    pub bitangents: Option<&'a [[f32; 3]]>,
    pub texcoords: Option<&'a [[f32; 3]]>,
    pub faces: &'a [Face],
    pub material: &'a SceneMaterial,
    /// Diagnostic only, never persisted.
    pub bones: Vec<&'a str>,
}

impl MeshDescriptor<'_> {
    pub fn label(&self) -> String {
        mesh_label(self.index, self.name)
    }
}

pub struct SceneAdapter<'a> {
    scene: &'a Scene,
}

impl<'a> SceneAdapter<'a> {
    /// A missing scene is what the importer hands over when decoding failed.
    pub fn new(scene: Option<&'a Scene>) -> ModelResult<Self> {
        let scene = scene.ok_or_else(|| ModelError::SceneLoad("no scene to convert".into()))?;
        Ok(Self { scene })
    }

    pub fn len(&self) -> usize {
        self.scene.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene.meshes.is_empty()
    }

    pub fn descriptors(&self) -> ModelResult<Vec<MeshDescriptor<'a>>> {
        let scene = self.scene;
        scene
            .meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| {
                let material = scene.materials.get(mesh.material_index).ok_or_else(|| {
                    ModelError::SceneLoad(format!(
                        "mesh {} references material {} but the scene has {}",
                        mesh_label(index, &mesh.name),
                        mesh.material_index,
                        scene.materials.len()
                    ))
                })?;

                let descriptor = MeshDescriptor {
                    index,
                    name: &mesh.name,
                    vertex_count: mesh.vertex_count,
                    positions: mesh.positions.as_deref(),
                    normals: mesh.normals.as_deref(),
                    tangents: mesh.tangents.as_deref(),
                    bitangents: mesh.bitangents.as_deref(),
                    texcoords: mesh.texture_coords.first().map(Vec::as_slice),
                    faces: &mesh.faces,
                    material,
                    bones: mesh.bones.iter().map(|b| b.name.as_str()).collect(),
                };

                for bone in &descriptor.bones {
                    log::debug!("Mesh {}: bone {}", descriptor.label(), bone);
                }
                if mesh.texture_coords.len() > 1 {
                    log::debug!(
                        "Mesh {}: dropping {} extra UV channels",
                        descriptor.label(),
                        mesh.texture_coords.len() - 1
                    );
                }

                Ok(descriptor)
            })
            .collect()
    }
}
