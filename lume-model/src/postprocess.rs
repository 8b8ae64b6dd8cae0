//! Geometry fix-ups applied to freshly imported meshes.

use glam::{Vec2, Vec3};

use crate::scene::Face;

fn triangles<'a>(faces: &'a [Face], vertex_count: usize) -> impl Iterator<Item = [usize; 3]> + 'a {
    faces.iter().filter_map(move |face| match face.as_slice() {
        &[a, b, c] if [a, b, c].iter().all(|&i| (i as usize) < vertex_count) => {
            Some([a as usize, b as usize, c as usize])
        }
        _ => None,
    })
}

/// Area-weighted vertex normals.
pub fn smooth_normals(positions: &[[f32; 3]], faces: &[Face]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for [a, b, c] in triangles(faces, positions.len()) {
        let p0 = Vec3::from_array(positions[a]);
        let p1 = Vec3::from_array(positions[b]);
        let p2 = Vec3::from_array(positions[c]);
        // Unnormalized cross product, its length is twice the triangle area.
        let n = (p1 - p0).cross(p2 - p0);
        accum[a] += n;
        accum[b] += n;
        accum[c] += n;
    }

    accum.into_iter().map(|n| n.normalize_or_zero().to_array()).collect()
}

/// Per-vertex tangents and bitangents from the first UV channel, made
/// orthogonal to the vertex normal.
pub fn tangent_space(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    uvs: &[[f32; 3]],
    faces: &[Face],
) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
    let vertex_count = positions.len().min(normals.len()).min(uvs.len());
    let mut tan = vec![Vec3::ZERO; vertex_count];
    let mut bitan = vec![Vec3::ZERO; vertex_count];

    for [a, b, c] in triangles(faces, vertex_count) {
        let p0 = Vec3::from_array(positions[a]);
        let e1 = Vec3::from_array(positions[b]) - p0;
        let e2 = Vec3::from_array(positions[c]) - p0;

        let uv0 = Vec2::new(uvs[a][0], uvs[a][1]);
        let d1 = Vec2::new(uvs[b][0], uvs[b][1]) - uv0;
        let d2 = Vec2::new(uvs[c][0], uvs[c][1]) - uv0;

        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let t = (e1 * d2.y - e2 * d1.y) * r;
        let bt = (e2 * d1.x - e1 * d2.x) * r;

        for i in [a, b, c] {
            tan[i] += t;
            bitan[i] += bt;
        }
    }

    let mut tangents = Vec::with_capacity(vertex_count);
    let mut bitangents = Vec::with_capacity(vertex_count);
    for i in 0..vertex_count {
        let n = Vec3::from_array(normals[i]);
        let mut t = (tan[i] - n * n.dot(tan[i])).normalize_or_zero();
        if t == Vec3::ZERO {
            let seed = if n.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
            t = (seed - n * n.dot(seed)).normalize_or_zero();
        }
        let mut b = n.cross(t);
        if b.dot(bitan[i]) < 0.0 {
            b = -b;
        }
        tangents.push(t.to_array());
        bitangents.push(b.to_array());
    }

    (tangents, bitangents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> (Vec<[f32; 3]>, Vec<[f32; 3]>, Vec<Face>) {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let uvs = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3]];
        (positions, uvs, faces)
    }

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        Vec3::from_array(a).distance(Vec3::from_array(b)) < 1e-5
    }

    #[test]
    fn flat_quad_normals_face_up() {
        let (positions, _, faces) = quad();
        let normals = smooth_normals(&positions, &faces);
        assert_eq!(normals.len(), 4);
        assert!(normals.iter().all(|&n| close(n, [0.0, 0.0, 1.0])));
    }

    #[test]
    fn unreferenced_vertex_gets_zero_normal() {
        let (mut positions, _, faces) = quad();
        positions.push([5.0, 5.0, 5.0]);
        let normals = smooth_normals(&positions, &faces);
        assert_eq!(normals[4], [0.0; 3]);
    }

    #[test]
    fn tangents_follow_uv_axes() {
        let (positions, uvs, faces) = quad();
        let normals = vec![[0.0, 0.0, 1.0]; 4];
        let (tangents, bitangents) = tangent_space(&positions, &normals, &uvs, &faces);

        for i in 0..4 {
            assert!(close(tangents[i], [1.0, 0.0, 0.0]));
            assert!(close(bitangents[i], [0.0, 1.0, 0.0]));
            assert!(Vec3::from_array(tangents[i]).dot(Vec3::from_array(normals[i])).abs() < 1e-5);
        }
    }

    #[test]
    fn degenerate_uvs_still_give_orthonormal_frame() {
        let (positions, _, faces) = quad();
        let normals = vec![[0.0, 0.0, 1.0]; 4];
        let uvs = vec![[0.5, 0.5, 0.0]; 4];
        let (tangents, bitangents) = tangent_space(&positions, &normals, &uvs, &faces);

        for i in 0..4 {
            let t = Vec3::from_array(tangents[i]);
            let b = Vec3::from_array(bitangents[i]);
            assert!((t.length() - 1.0).abs() < 1e-5);
            assert!(t.dot(b).abs() < 1e-5);
            assert!(t.dot(Vec3::Z).abs() < 1e-5);
        }
    }
}
