//! Host-memory triangle intersector (Möller–Trumbore).

use raypick_math::{Point3, Transform};

use crate::mesh::MeshGeometry;
use crate::ray::{Ray, RayHit};

/// Determinant tolerance below which a ray counts as parallel to a
/// triangle, and the minimum accepted parametric distance.
const EPSILON: f32 = 1e-7;

/// Intersect a world-space ray with one mesh instance.
///
/// The ray is transformed into mesh local space through the inverse
/// model matrix and tested against every triangle; the hit with the
/// smallest positive parametric distance wins, ties broken by lowest
/// triangle index. The result is mapped back to world space, with the
/// distance measured from the world-space ray origin so it stays
/// meaningful under non-uniform scale.
///
/// O(triangle count) per call: intended for precision queries against a
/// single target mesh, not whole-scene picking. The hit's `element` is
/// left unset; the caller assigns the entity it tested.
pub fn intersect_mesh(ray: &Ray, transform: &Transform, mesh: &MeshGeometry) -> Option<RayHit> {
    let aabb = mesh.local_aabb()?;
    let inverse = transform.inverse_model_matrix()?;

    let local_origin = inverse.transform_point(&ray.origin);
    let local_direction = inverse.transform_vector(ray.direction.as_ref());
    let local_ray = Ray::new(local_origin, local_direction).ok()?;

    local_ray.intersect_aabb(aabb)?;

    let mut best: Option<(f32, u32)> = None;
    for i in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle(i);
        if let Some(t) = intersect_triangle(&local_ray, &v0, &v1, &v2) {
            if best.map_or(true, |(best_t, _)| t < best_t) {
                best = Some((t, i as u32));
            }
        }
    }

    let (t, triangle) = best?;
    let position = transform.model_matrix().transform_point(&local_ray.at(t));
    Some(RayHit {
        position,
        distance: (position - ray.origin).norm(),
        triangle: Some(triangle),
        element: None,
    })
}

/// Möller–Trumbore ray-triangle test.
///
/// Returns the parametric distance of the intersection, or `None` when
/// the ray is parallel to the triangle plane, the barycentric
/// coordinates fall outside the triangle, or the intersection lies at or
/// behind the ray origin. Both windings are accepted.
pub fn intersect_triangle(ray: &Ray, v0: &Point3, v1: &Point3, v2: &Point3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(&edge2);
    let det = edge1.dot(&h);

    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - v0;
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv_det * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(&q);
    if t <= EPSILON {
        return None;
    }

    Some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use raypick_math::Vec3;

    fn single_triangle() -> MeshGeometry {
        MeshGeometry::from_positions(vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let hit = intersect_mesh(&ray, &Transform::identity(), &single_triangle()).unwrap();
        assert_eq!(hit.triangle, Some(0));
        assert!((hit.distance - 5.0).abs() < 1e-5);
        assert!((hit.position - Point3::new(0.0, 0.0, 0.0)).norm() < 1e-5);
        assert!(hit.element.is_none());
    }

    #[test]
    fn test_triangle_miss_outside_bounds() {
        let ray = Ray::new(Point3::new(5.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(intersect_mesh(&ray, &Transform::identity(), &single_triangle()).is_none());
    }

    #[test]
    fn test_triangle_behind_origin() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(intersect_mesh(&ray, &Transform::identity(), &single_triangle()).is_none());
    }

    #[test]
    fn test_parallel_ray() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let [v0, v1, v2] = single_triangle().triangle(0);
        assert!(intersect_triangle(&ray, &v0, &v1, &v2).is_none());
    }

    #[test]
    fn test_nearest_of_two_overlapping_triangles() {
        // Two parallel triangles stacked along the ray; the far one comes
        // first in the buffer to prove ordering does not decide the hit.
        let mesh = MeshGeometry::from_positions(vec![
            Point3::new(-1.0, -1.0, -2.0),
            Point3::new(1.0, -1.0, -2.0),
            Point3::new(0.0, 1.0, -2.0),
            Point3::new(-1.0, -1.0, 1.0),
            Point3::new(1.0, -1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ])
        .unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let hit = intersect_mesh(&ray, &Transform::identity(), &mesh).unwrap();
        assert_eq!(hit.triangle, Some(1));
        assert!((hit.distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_triangles_take_lowest_index() {
        let tri = [
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh =
            MeshGeometry::from_positions(tri.iter().chain(tri.iter()).copied().collect()).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let hit = intersect_mesh(&ray, &Transform::identity(), &mesh).unwrap();
        assert_eq!(hit.triangle, Some(0));
    }

    #[test]
    fn test_scaled_box_scenario() {
        // 2x5x2 box centered at (0, 1.5, 0); ray down -Z hits the +Z face
        // at z = 1, nine units from the origin.
        let transform = Transform::from_position_scale(
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(2.0, 5.0, 2.0),
        );
        let mesh = MeshGeometry::unit_cube();
        let ray = Ray::new(Point3::new(0.0, 1.5, 10.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let hit = intersect_mesh(&ray, &transform, &mesh).unwrap();
        assert!((hit.position - Point3::new(0.0, 1.5, 1.0)).norm() < 1e-4);
        assert!((hit.distance - 9.0).abs() < 1e-4);
        assert!(hit.triangle.is_some());
    }

    #[test]
    fn test_ray_pointing_away_from_box() {
        let transform = Transform::from_position_scale(
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(2.0, 5.0, 2.0),
        );
        let mesh = MeshGeometry::unit_cube();
        let ray = Ray::new(Point3::new(0.0, 1.5, 10.0), Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(intersect_mesh(&ray, &transform, &mesh).is_none());
    }

    #[test]
    fn test_empty_mesh_misses() {
        let mesh = MeshGeometry::from_positions(Vec::new()).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(intersect_mesh(&ray, &Transform::identity(), &mesh).is_none());
    }

    #[test]
    fn test_degenerate_transform_misses() {
        let transform =
            Transform::from_position_scale(Vec3::zeros(), Vec3::new(1.0, 0.0, 1.0));
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(intersect_mesh(&ray, &transform, &MeshGeometry::unit_cube()).is_none());
    }
}
