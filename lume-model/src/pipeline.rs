use rayon::prelude::*;

use crate::attributes::extract_attributes;
use crate::error::ModelResult;
use crate::indices::compact_indices;
use crate::material::classify;
use crate::model::{Mesh, Model};
use crate::scene::{MeshDescriptor, Scene, SceneAdapter};
use crate::texture::TextureLoader;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Build mesh records on the rayon pool. Output order is unchanged.
    pub parallel: bool,
}

/// Builds the record for one submesh. Texture failures only drop the slot;
/// everything else fails the mesh.
pub fn build_mesh(mesh: &MeshDescriptor<'_>, textures: &TextureLoader) -> ModelResult<Mesh> {
    log::debug!(
        "Processing mesh {}: {} vertices, {} faces",
        mesh.label(),
        mesh.vertex_count,
        mesh.faces.len()
    );

    let attributes = extract_attributes(mesh)?;
    let indices = compact_indices(mesh)?;
    let (state, slots) = classify(mesh.material);
    log::debug!("Mesh {} state: {}", mesh.label(), state);

    let [albedo, normal, rough, metal] =
        slots.persisted().map(|(slot, path)| textures.load_optional(slot, path));

    Ok(Mesh {
        name: mesh.name.to_owned(),
        state,
        positions: attributes.positions,
        normals: attributes.normals,
        tangents: attributes.tangents,
        bitangents: attributes.bitangents,
        texcoords: attributes.texcoords,
        indices,
        albedo_map: albedo,
        normal_map: normal,
        rough_map: rough,
        metal_map: metal,
    })
}

/// Converts every submesh of `scene`, in order. The first fatal error aborts
/// the whole conversion.
pub fn convert_scene(
    scene: Option<&Scene>,
    textures: &TextureLoader,
    options: &ConvertOptions,
) -> ModelResult<Model> {
    let adapter = SceneAdapter::new(scene)?;
    let descriptors = adapter.descriptors()?;

    let meshes = if options.parallel {
        descriptors
            .par_iter()
            .map(|d| build_mesh(d, textures))
            .collect::<ModelResult<Vec<_>>>()?
    } else {
        descriptors
            .iter()
            .map(|d| build_mesh(d, textures))
            .collect::<ModelResult<Vec<_>>>()?
    };

    let mut model = Model::new();
    for mesh in meshes {
        model.push(mesh);
    }

    log::info!(
        "Converted {} meshes ({} vertices, {} triangles)",
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    Ok(model)
}
