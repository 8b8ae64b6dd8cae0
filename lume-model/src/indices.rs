use crate::error::{ModelError, ModelResult};
use crate::model::MAX_VERTICES;
use crate::scene::MeshDescriptor;

/// Packs the triangle list into little-endian `u16` indices.
///
/// Fails before touching any face if the vertex count cannot be addressed
/// with 16 bits.
pub fn compact_indices(mesh: &MeshDescriptor<'_>) -> ModelResult<Vec<u8>> {
    if mesh.vertex_count > MAX_VERTICES {
        return Err(ModelError::IndexOverflow {
            mesh: mesh.label(),
            vertex_count: mesh.vertex_count,
            max: MAX_VERTICES,
        });
    }

    let mut packed = Vec::with_capacity(mesh.faces.len() * 3 * std::mem::size_of::<u16>());
    for (face_index, face) in mesh.faces.iter().enumerate() {
        if face.len() != 3 {
            return Err(ModelError::NonTriangleFace {
                mesh: mesh.label(),
                face: face_index,
                arity: face.len(),
            });
        }
        for &index in face {
            let narrow = u16::try_from(index)
                .ok()
                .filter(|&i| (i as usize) < mesh.vertex_count)
                .ok_or_else(|| ModelError::IndexOutOfRange {
                    mesh: mesh.label(),
                    face: face_index,
                    index,
                    vertex_count: mesh.vertex_count,
                })?;
            packed.extend_from_slice(&narrow.to_le_bytes());
        }
    }

    Ok(packed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Face, SceneMaterial};

    fn descriptor<'a>(material: &'a SceneMaterial, vertex_count: usize, faces: &'a [Face]) -> MeshDescriptor<'a> {
        MeshDescriptor {
            index: 3,
            name: "rock",
            vertex_count,
            positions: None,
            normals: None,
            tangents: None,
            bitangents: None,
            texcoords: None,
            faces,
            material,
            bones: Vec::new(),
        }
    }

    #[test]
    fn preserves_face_and_corner_order() {
        let material = SceneMaterial::default();
        let faces = vec![vec![2, 0, 1], vec![3, 2, 1]];
        let packed = compact_indices(&descriptor(&material, 4, &faces)).unwrap();
        let values: Vec<u16> = packed
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(values, vec![2, 0, 1, 3, 2, 1]);
    }

    #[test]
    fn rejects_too_many_vertices() {
        let material = SceneMaterial::default();
        let err = compact_indices(&descriptor(&material, 70_000, &[])).unwrap_err();
        assert!(matches!(err, ModelError::IndexOverflow { vertex_count: 70_000, .. }));
    }

    #[test]
    fn accepts_exactly_max_vertices() {
        let material = SceneMaterial::default();
        let faces = vec![vec![0, 1, 65_534]];
        let packed = compact_indices(&descriptor(&material, MAX_VERTICES, &faces)).unwrap();
        assert_eq!(&packed[4..6], &65_534u16.to_le_bytes());
    }

    #[test]
    fn rejects_quads() {
        let material = SceneMaterial::default();
        let faces = vec![vec![0, 1, 2], vec![0, 1, 2, 3]];
        let err = compact_indices(&descriptor(&material, 4, &faces)).unwrap_err();
        assert!(matches!(err, ModelError::NonTriangleFace { face: 1, arity: 4, .. }));
    }

    #[test]
    fn rejects_dangling_index() {
        let material = SceneMaterial::default();
        let faces = vec![vec![0, 1, 3]];
        let err = compact_indices(&descriptor(&material, 3, &faces)).unwrap_err();
        assert!(matches!(err, ModelError::IndexOutOfRange { index: 3, .. }));
    }
}
