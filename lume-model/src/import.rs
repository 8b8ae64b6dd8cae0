//! Wavefront OBJ/MTL import through `tobj`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ModelError, ModelResult};
use crate::postprocess::{smooth_normals, tangent_space};
use crate::scene::{Face, Scene, SceneMaterial, SceneMesh, TextureSlot};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    /// Store `v` as `1 - v`, matching a top-left texture origin.
    pub flip_uvs: bool,
    pub generate_normals: bool,
    pub calc_tangent_space: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            flip_uvs: true,
            generate_normals: true,
            calc_tangent_space: true,
        }
    }
}

pub fn import_scene<P: AsRef<Path>>(path: P, options: &ImportOptions) -> ModelResult<Scene> {
    let path = path.as_ref();
    let load_options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };

    let (models, materials) = tobj::load_obj(path, &load_options)
        .map_err(|e| ModelError::SceneLoad(format!("{:?}: {}", path, e)))?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("Failed to load materials for {:?}: {}", path, e);
        Vec::new()
    });

    let mut scene = Scene {
        meshes: Vec::with_capacity(models.len()),
        materials: materials.iter().map(convert_material).collect(),
    };
    let default_material = scene.materials.len();
    scene.materials.push(SceneMaterial::new("default"));

    for model in models {
        let material_index = model
            .mesh
            .material_id
            .filter(|&id| id < default_material)
            .unwrap_or(default_material);
        scene
            .meshes
            .push(convert_mesh(model.name, &model.mesh, material_index, options));
    }

    log::info!(
        "Imported {:?}: {} meshes, {} materials",
        path,
        scene.meshes.len(),
        materials.len()
    );
    Ok(scene)
}

fn convert_material(material: &tobj::Material) -> SceneMaterial {
    let slots = [
        (TextureSlot::Diffuse, &material.diffuse_texture),
        (TextureSlot::Height, &material.normal_texture),
        (TextureSlot::Opacity, &material.dissolve_texture),
        (TextureSlot::Ambient, &material.ambient_texture),
        (TextureSlot::Specular, &material.specular_texture),
    ];

    let textures: HashMap<TextureSlot, String> = slots
        .into_iter()
        .filter_map(|(slot, path)| {
            path.as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| (slot, p.to_owned()))
        })
        .collect();

    SceneMaterial {
        name: material.name.clone(),
        textures,
    }
}

fn convert_mesh(
    name: String,
    mesh: &tobj::Mesh,
    material_index: usize,
    options: &ImportOptions,
) -> SceneMesh {
    let vertex_count = mesh.positions.len() / 3;
    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    let mut normals = if mesh.normals.len() == vertex_count * 3 && vertex_count > 0 {
        Some(mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect::<Vec<_>>())
    } else {
        if !mesh.normals.is_empty() {
            log::warn!("Mesh '{}': normal count does not match vertices, ignoring normals", name);
        }
        None
    };

    let texcoords = if mesh.texcoords.len() == vertex_count * 2 && vertex_count > 0 {
        let flip = options.flip_uvs;
        Some(
            mesh.texcoords
                .chunks_exact(2)
                .map(|uv| [uv[0], if flip { 1.0 - uv[1] } else { uv[1] }, 0.0])
                .collect::<Vec<_>>(),
        )
    } else {
        if !mesh.texcoords.is_empty() {
            log::warn!("Mesh '{}': UV count does not match vertices, ignoring UVs", name);
        }
        None
    };

    let faces: Vec<Face> = if mesh.face_arities.is_empty() {
        mesh.indices.chunks(3).map(<[u32]>::to_vec).collect()
    } else {
        let mut faces = Vec::with_capacity(mesh.face_arities.len());
        let mut start = 0;
        for &arity in &mesh.face_arities {
            let end = (start + arity as usize).min(mesh.indices.len());
            faces.push(mesh.indices[start..end].to_vec());
            start = end;
        }
        faces
    };

    if normals.is_none() && options.generate_normals && vertex_count > 0 {
        log::debug!("Mesh '{}': generating smooth normals", name);
        normals = Some(smooth_normals(&positions, &faces));
    }

    let (tangents, bitangents) = match (&normals, &texcoords) {
        (Some(n), Some(uv)) if options.calc_tangent_space => {
            let (t, b) = tangent_space(&positions, n, uv, &faces);
            (Some(t), Some(b))
        }
        _ => (None, None),
    };

    SceneMesh {
        name,
        vertex_count,
        positions: Some(positions),
        normals,
        tangents,
        bitangents,
        texture_coords: texcoords.into_iter().collect(),
        faces,
        material_index,
        bones: Vec::new(),
    }
}
