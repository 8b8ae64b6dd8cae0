use crate::error::{ModelError, ModelResult};
use crate::scene::MeshDescriptor;

/// Flattened per-vertex attribute buffers of one mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeBuffers {
    pub positions: Option<Vec<u8>>,
    pub normals: Option<Vec<u8>>,
    pub tangents: Option<Vec<u8>>,
    pub bitangents: Option<Vec<u8>>,
    pub texcoords: Option<Vec<u8>>,
}

pub fn extract_attributes(mesh: &MeshDescriptor<'_>) -> ModelResult<AttributeBuffers> {
    Ok(AttributeBuffers {
        positions: flatten(mesh, "positions", mesh.positions)?,
        normals: flatten(mesh, "normals", mesh.normals)?,
        tangents: flatten(mesh, "tangents", mesh.tangents)?,
        bitangents: flatten(mesh, "bitangents", mesh.bitangents)?,
        texcoords: flatten(mesh, "texcoords", mesh.texcoords)?,
    })
}

fn flatten(
    mesh: &MeshDescriptor<'_>,
    attribute: &'static str,
    source: Option<&[[f32; 3]]>,
) -> ModelResult<Option<Vec<u8>>> {
    let Some(source) = source else {
        return Ok(None);
    };
    if source.len() != mesh.vertex_count {
        return Err(ModelError::AttributeMismatch {
            mesh: mesh.label(),
            attribute,
            expected: mesh.vertex_count,
            actual: source.len(),
        });
    }
    Ok(Some(bytemuck::cast_slice(source).to_vec()))
}
