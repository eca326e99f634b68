//! CPU picking.
//!
//! Candidate objects are flattened into world space triangles once per query
//! or render pass and indexed by a bounding volume hierarchy.

use super::bvh::{Triangle, TriangleBvh};
use crate::scene::{ObjectKey, SceneRegistry};
use glam::Vec3;

const EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// One ray hit: the registry object, the model node whose mesh was struck and
/// the distance along the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub object: ObjectKey,
    pub node: usize,
    pub distance: f32,
}

/// Möller–Trumbore. Both faces count as hits.
pub fn intersect_triangle(ray: &Ray, [a, b, c]: [Vec3; 3]) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > EPSILON).then_some(t)
}

struct MeshInstance {
    object: ObjectKey,
    node: usize,
}

/// World space triangles of a set of registry objects.
pub struct SceneGeometry {
    instances: Vec<MeshInstance>,
    bvh: TriangleBvh,
}

impl SceneGeometry {
    pub fn build(registry: &SceneRegistry, keys: &[ObjectKey]) -> Self {
        let mut instances = Vec::new();
        let mut triangles = Vec::new();
        for &key in keys {
            let Some(object) = registry.get(key) else {
                continue;
            };
            let world = object.model.world_matrices(object.transform.matrix());
            for (node, mesh) in object.model.meshes() {
                let matrix = world[node];
                let instance = instances.len();
                triangles.extend(mesh.triangles().map(|tri| Triangle {
                    points: tri.map(|point| matrix.transform_point3(point)),
                    instance,
                }));
                instances.push(MeshInstance { object: key, node });
            }
        }
        Self {
            instances,
            bvh: TriangleBvh::build(triangles),
        }
    }

    fn hit(&self, instance: usize, distance: f32) -> Option<PickHit> {
        let instance = self.instances.get(instance)?;
        Some(PickHit {
            object: instance.object,
            node: instance.node,
            distance,
        })
    }

    /// Nearest hit per mesh, ordered nearest first.
    pub fn cast_all(&self, ray: &Ray) -> Vec<PickHit> {
        let mut closest: Vec<Option<f32>> = vec![None; self.instances.len()];
        self.bvh.for_each_hit(ray, |triangle, distance| {
            if let Some(slot) = closest.get_mut(triangle.instance) {
                if slot.map_or(true, |best| distance < best) {
                    *slot = Some(distance);
                }
            }
        });
        let mut hits: Vec<PickHit> = closest
            .into_iter()
            .enumerate()
            .filter_map(|(instance, distance)| self.hit(instance, distance?))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Nearest hit and the unit normal of the struck triangle, facing the ray.
    pub fn nearest(&self, ray: &Ray) -> Option<(PickHit, Vec3)> {
        let (index, distance) = self.bvh.nearest(ray)?;
        let triangle = self.bvh.triangles().get(index)?;
        let [a, b, c] = triangle.points;
        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        if normal.dot(ray.direction) > 0.0 {
            normal = -normal;
        }
        Some((self.hit(triangle.instance, distance)?, normal))
    }
}
