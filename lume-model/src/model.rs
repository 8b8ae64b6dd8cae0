//! Renderer-ready model records.
//!
//! Every buffer is raw little-endian bytes: attributes are packed `[f32; 3]`
//! triples, indices are packed `u16`.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult, mesh_label};

/// Largest vertex count addressable by a 16-bit index buffer.
pub const MAX_VERTICES: usize = u16::MAX as usize;

/// Size in bytes of one packed attribute element.
pub const ATTRIBUTE_STRIDE: usize = std::mem::size_of::<[f32; 3]>();

/// Size in bytes of one packed index.
pub const INDEX_STRIDE: usize = std::mem::size_of::<u16>();

/// Render pipeline a mesh is drawn with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RenderState {
    #[default]
    Opaque,
    Transparent,
}

impl RenderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderState::Opaque => "pbr-opaque",
            RenderState::Transparent => "pbr-transparent",
        }
    }
}

impl std::fmt::Display for RenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RenderState> for String {
    fn from(state: RenderState) -> Self {
        state.as_str().to_owned()
    }
}

impl TryFrom<String> for RenderState {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pbr-opaque" => Ok(RenderState::Opaque),
            "pbr-transparent" => Ok(RenderState::Transparent),
            other => Err(format!("unknown render state {:?}", other)),
        }
    }
}

/// One renderable sub-surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub state: RenderState,
    pub positions: Option<Vec<u8>>,
    pub normals: Option<Vec<u8>>,
    pub tangents: Option<Vec<u8>>,
    pub bitangents: Option<Vec<u8>>,
    pub texcoords: Option<Vec<u8>>,
    pub indices: Vec<u8>,
    pub albedo_map: Option<Vec<u8>>,
    pub normal_map: Option<Vec<u8>>,
    pub rough_map: Option<Vec<u8>>,
    pub metal_map: Option<Vec<u8>>,
}

impl Mesh {
    /// Attribute buffers paired with their field names, in storage order.
    pub fn attributes(&self) -> [(&'static str, Option<&[u8]>); 5] {
        [
            ("positions", self.positions.as_deref()),
            ("normals", self.normals.as_deref()),
            ("tangents", self.tangents.as_deref()),
            ("bitangents", self.bitangents.as_deref()),
            ("texcoords", self.texcoords.as_deref()),
        ]
    }

    /// Vertex count implied by the first present attribute buffer.
    pub fn vertex_count(&self) -> usize {
        self.attributes()
            .iter()
            .find_map(|(_, buffer)| *buffer)
            .map_or(0, |buffer| buffer.len() / ATTRIBUTE_STRIDE)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / (INDEX_STRIDE * 3)
    }

    pub fn positions_f32(&self) -> Option<Vec<[f32; 3]>> {
        self.positions.as_deref().map(bytes_to_vec3)
    }

    pub fn normals_f32(&self) -> Option<Vec<[f32; 3]>> {
        self.normals.as_deref().map(bytes_to_vec3)
    }

    pub fn tangents_f32(&self) -> Option<Vec<[f32; 3]>> {
        self.tangents.as_deref().map(bytes_to_vec3)
    }

    pub fn bitangents_f32(&self) -> Option<Vec<[f32; 3]>> {
        self.bitangents.as_deref().map(bytes_to_vec3)
    }

    pub fn texcoords_f32(&self) -> Option<Vec<[f32; 3]>> {
        self.texcoords.as_deref().map(bytes_to_vec3)
    }

    pub fn indices_u16(&self) -> Vec<u16> {
        self.indices
            .chunks_exact(INDEX_STRIDE)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    /// Checks the record invariants the encoder relies on. `index` is only
    /// used to label errors.
    pub fn validate(&self, index: usize) -> ModelResult<()> {
        let label = mesh_label(index, &self.name);
        let mut vertex_count = None;

        for (attribute, buffer) in self.attributes() {
            let Some(buffer) = buffer else { continue };
            if buffer.len() % ATTRIBUTE_STRIDE != 0 {
                return Err(ModelError::Encode(format!(
                    "mesh {} {} buffer is {} bytes, not a multiple of {}",
                    label,
                    attribute,
                    buffer.len(),
                    ATTRIBUTE_STRIDE
                )));
            }
            let count = buffer.len() / ATTRIBUTE_STRIDE;
            match vertex_count {
                None => vertex_count = Some(count),
                Some(expected) if expected != count => {
                    return Err(ModelError::Encode(format!(
                        "mesh {} {} has {} elements, expected {}",
                        label, attribute, count, expected
                    )));
                }
                Some(_) => {}
            }
        }

        let vertex_count = vertex_count.unwrap_or(0);
        if vertex_count > MAX_VERTICES {
            return Err(ModelError::IndexOverflow {
                mesh: label,
                vertex_count,
                max: MAX_VERTICES,
            });
        }

        if self.indices.len() % (INDEX_STRIDE * 3) != 0 {
            return Err(ModelError::Encode(format!(
                "mesh {} index buffer is {} bytes, not whole triangles",
                label,
                self.indices.len()
            )));
        }

        if let Some(index) = self
            .indices_u16()
            .into_iter()
            .find(|&i| i as usize >= vertex_count)
        {
            return Err(ModelError::Encode(format!(
                "mesh {} index {} out of range for {} vertices",
                label, index, vertex_count
            )));
        }

        Ok(())
    }
}

/// Ordered collection of meshes, one per source submesh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub meshes: Vec<Mesh>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

fn bytes_to_vec3(bytes: &[u8]) -> Vec<[f32; 3]> {
    bytes
        .chunks_exact(ATTRIBUTE_STRIDE)
        .map(|v| {
            let f = |o: usize| f32::from_le_bytes([v[o], v[o + 1], v[o + 2], v[o + 3]]);
            [f(0), f(4), f(8)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> Mesh {
        let positions: Vec<[f32; 3]> = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        Mesh {
            name: "tri".into(),
            positions: Some(bytemuck::cast_slice(&positions).to_vec()),
            normals: Some(bytemuck::cast_slice(&[[0.0f32, 0.0, 1.0]; 3]).to_vec()),
            indices: [0u16, 1, 2].iter().flat_map(|i| i.to_le_bytes()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn render_state_names() {
        assert_eq!(RenderState::Opaque.as_str(), "pbr-opaque");
        assert_eq!(RenderState::try_from("pbr-transparent".to_string()), Ok(RenderState::Transparent));
        assert!(RenderState::try_from(String::new()).is_err());
    }

    #[test]
    fn typed_views() {
        let mesh = triangle_mesh();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.indices_u16(), vec![0, 1, 2]);
        assert_eq!(mesh.positions_f32().unwrap()[1], [1.0, 0.0, 0.0]);
        assert!(mesh.tangents_f32().is_none());
    }

    #[test]
    fn validate_accepts_consistent_mesh() {
        triangle_mesh().validate(0).unwrap();
    }

    #[test]
    fn validate_rejects_mismatched_attributes() {
        let mut mesh = triangle_mesh();
        mesh.normals.as_mut().unwrap().truncate(ATTRIBUTE_STRIDE * 2);
        assert!(matches!(mesh.validate(0), Err(ModelError::Encode(_))));
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let mut mesh = triangle_mesh();
        mesh.indices = [0u16, 1, 3].iter().flat_map(|i| i.to_le_bytes()).collect();
        assert!(matches!(mesh.validate(0), Err(ModelError::Encode(_))));
    }

    #[test]
    fn validate_rejects_partial_triangle() {
        let mut mesh = triangle_mesh();
        mesh.indices.truncate(INDEX_STRIDE * 2);
        assert!(mesh.validate(0).is_err());
    }
}
