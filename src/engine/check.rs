//! Triangulation self-checks
//!
//! Every tetrahedron must be positively oriented and every face must be
//! shared by at most two tetrahedra. The faces used once form the boundary,
//! which is compared against an independent convex hull from parry3d: each
//! boundary face must lie in a supporting plane of the hull, and together the
//! boundary faces must cover the hull surface. Hull facets are compared by
//! plane and area rather than edge by edge, since a hull with coplanar facets
//! has many valid triangulations.

use std::collections::{HashMap, HashSet};

use glam::{DVec3, Vec3};
use parry3d::math::Point;
use parry3d::transformation;

use super::predicates::orient3d;
use super::Tetrahedron;
use crate::error::{EdgeError, Result};

/// Faces of a positively oriented tetrahedron, ordered so that the opposite
/// vertex lies on the positive side
const INWARD_FACES: [[usize; 3]; 4] = [[1, 3, 2], [0, 2, 3], [0, 3, 1], [0, 1, 2]];

/// Relative tolerance on the boundary area against the f32 hull
const AREA_TOLERANCE: f64 = 1e-4;

fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    0.5 * (b - a).cross(c - a).length()
}

/// Verify orientation, face sharing and hull coverage of a triangulation
pub(crate) fn check_triangulation(points: &[Vec3], tetrahedra: &[Tetrahedron]) -> Result<()> {
    if tetrahedra.is_empty() {
        return Ok(());
    }
    let p = |v: u32| points[v as usize].as_dvec3();

    let mut faces: HashMap<[u32; 3], (usize, [u32; 3])> =
        HashMap::with_capacity(tetrahedra.len() * 2);
    let mut used = HashSet::new();

    for tet in tetrahedra {
        let v = tet.0;
        let [a, b, c, d] = v.map(p);
        if orient3d(a, b, c, d) <= 0.0 {
            return Err(EdgeError::ValidationFailed(format!(
                "tetrahedron {:?} is not positively oriented",
                v
            )));
        }

        used.extend(v);
        for slots in INWARD_FACES {
            let face = slots.map(|i| v[i]);
            let mut key = face;
            key.sort_unstable();
            faces.entry(key).or_insert((0, face)).0 += 1;
        }
    }

    let mut boundary = Vec::new();
    for (key, (count, face)) in &faces {
        match count {
            1 => boundary.push(*face),
            2 => {}
            n => {
                return Err(EdgeError::ValidationFailed(format!(
                    "face {:?} is shared by {} tetrahedra",
                    key, n
                )))
            }
        }
    }

    let hull_input: Vec<Point<f32>> = used
        .iter()
        .map(|&v| {
            let q = points[v as usize];
            Point::new(q.x, q.y, q.z)
        })
        .collect();
    let (hull_vertices, hull_triangles) = transformation::convex_hull(&hull_input);
    let hull_vertices: Vec<DVec3> = hull_vertices
        .iter()
        .map(|q| DVec3::new(f64::from(q.x), f64::from(q.y), f64::from(q.z)))
        .collect();

    let mut boundary_area = 0.0;
    for face in &boundary {
        let [a, b, c] = face.map(p);
        if let Some(outside) = hull_vertices.iter().find(|&&h| orient3d(a, b, c, h) < 0.0) {
            return Err(EdgeError::ValidationFailed(format!(
                "boundary face {:?} is not on the hull: {:?} lies beyond it",
                face, outside
            )));
        }
        boundary_area += triangle_area(a, b, c);
    }

    let hull_area: f64 = hull_triangles
        .iter()
        .map(|t| {
            let [a, b, c] = t.map(|i| hull_vertices[i as usize]);
            triangle_area(a, b, c)
        })
        .sum();

    if (boundary_area - hull_area).abs() > AREA_TOLERANCE * hull_area.max(1.0) {
        return Err(EdgeError::ValidationFailed(format!(
            "boundary area {} does not match hull area {}",
            boundary_area, hull_area
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> Vec<Vec3> {
        vec![
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(9.0, 1.0, 1.0),
            Vec3::new(1.0, 9.0, 1.0),
            Vec3::new(1.0, 1.0, 9.0),
        ]
    }

    /// Cube `[1, 9]^3` split into six tetrahedra around the main diagonal
    fn cube() -> (Vec<Vec3>, Vec<Tetrahedron>) {
        let points: Vec<Vec3> = (0..8)
            .map(|i| {
                let c = |bit: u32| if i & bit != 0 { 9.0 } else { 1.0 };
                Vec3::new(c(1), c(2), c(4))
            })
            .collect();
        let tets = [[1, 3], [3, 2], [2, 6], [6, 4], [4, 5], [5, 1]]
            .into_iter()
            .map(|[a, b]| {
                let t = Tetrahedron::new(0, a, b, 7);
                let [p, q, r, s] = t.0.map(|v| points[v as usize].as_dvec3());
                if orient3d(p, q, r, s) > 0.0 {
                    t
                } else {
                    Tetrahedron::new(a, 0, b, 7)
                }
            })
            .collect();
        (points, tets)
    }

    #[test]
    fn test_single_tetrahedron_passes() {
        let result = check_triangulation(&corners(), &[Tetrahedron::new(0, 1, 2, 3)]);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_inverted_tetrahedron_fails() {
        let result = check_triangulation(&corners(), &[Tetrahedron::new(1, 0, 2, 3)]);
        assert!(matches!(result, Err(EdgeError::ValidationFailed(_))));
    }

    #[test]
    fn test_cube_with_coplanar_facets_passes() {
        // Hull squares may be split along either diagonal
        let (points, tets) = cube();
        assert_eq!(check_triangulation(&points, &tets), Ok(()));
    }

    #[test]
    fn test_missing_tetrahedron_fails() {
        let (points, mut tets) = cube();
        tets.pop();

        let result = check_triangulation(&points, &tets);
        assert!(matches!(result, Err(EdgeError::ValidationFailed(_))));
    }

    #[test]
    fn test_disjoint_tetrahedra_fail() {
        // Two tetrahedra touching nowhere: their union is not convex
        let mut points = corners();
        points.extend([
            Vec3::new(21.0, 1.5, 1.3),
            Vec3::new(29.0, 2.0, 1.7),
            Vec3::new(22.0, 10.0, 1.1),
            Vec3::new(21.5, 1.2, 9.6),
        ]);
        let tets = [Tetrahedron::new(0, 1, 2, 3), Tetrahedron::new(4, 5, 6, 7)];

        let result = check_triangulation(&points, &tets);
        assert!(matches!(result, Err(EdgeError::ValidationFailed(_))));
    }

    #[test]
    fn test_overlapping_face_fails() {
        // Three tetrahedra on one face
        let mut points = corners();
        points.push(Vec3::new(-5.0, -5.0, -5.0));
        points.push(Vec3::new(-6.0, -4.0, -5.5));
        let tets = [
            Tetrahedron::new(0, 1, 2, 3),
            Tetrahedron::new(1, 0, 2, 4),
            Tetrahedron::new(1, 0, 2, 5),
        ];

        let result = check_triangulation(&points, &tets);
        assert!(matches!(result, Err(EdgeError::ValidationFailed(_))));
    }

    #[test]
    fn test_empty_passes() {
        assert_eq!(check_triangulation(&corners(), &[]), Ok(()));
    }
}
