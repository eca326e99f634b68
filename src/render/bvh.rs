//! Bounding volume hierarchy over world space triangles.
//!
//! Built top down: every node sorts its triangles along the longest axis of
//! their centroid bounds and hands each half to a child, until a handful of
//! triangles remain. Nodes live in one flat vector, the root at index 0.

use super::pick::{intersect_triangle, Ray};
use crate::scene::Aabb;
use glam::Vec3;

const LEAF_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub points: [Vec3; 3],
    /// Mesh instance the triangle came from.
    pub instance: usize,
}

impl Triangle {
    fn centroid(&self) -> Vec3 {
        (self.points[0] + self.points[1] + self.points[2]) / 3.0
    }
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf { start: usize, end: usize },
    Inner { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    bounds: Aabb,
    kind: NodeKind,
}

pub struct TriangleBvh {
    nodes: Vec<Node>,
    triangles: Vec<Triangle>,
}

impl TriangleBvh {
    pub fn build(mut triangles: Vec<Triangle>) -> Self {
        let mut nodes = Vec::new();
        if !triangles.is_empty() {
            build_node(&mut nodes, &mut triangles, 0);
        }
        Self { nodes, triangles }
    }

    /// Triangles in tree order; hit indices point into this slice.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Closest triangle along the ray as `(triangle index, distance)`.
    pub fn nearest(&self, ray: &Ray) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        let mut stack = Vec::with_capacity(64);
        if !self.nodes.is_empty() {
            stack.push(0);
        }
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            let Some(entry) = node.bounds.ray_intersect(ray.origin, ray.direction) else {
                continue;
            };
            if best.is_some_and(|(_, distance)| entry > distance) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, end } => {
                    for (offset, triangle) in self.triangles[start..end].iter().enumerate() {
                        let Some(distance) = intersect_triangle(ray, triangle.points) else {
                            continue;
                        };
                        if best.map_or(true, |(_, closest)| distance < closest) {
                            best = Some((start + offset, distance));
                        }
                    }
                }
                NodeKind::Inner { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        best
    }

    /// Every triangle the ray crosses, in no particular order.
    pub fn for_each_hit<F>(&self, ray: &Ray, mut visit: F)
    where
        F: FnMut(&Triangle, f32),
    {
        let mut stack = Vec::with_capacity(64);
        if !self.nodes.is_empty() {
            stack.push(0);
        }
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.bounds.ray_intersect(ray.origin, ray.direction).is_none() {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, end } => {
                    for triangle in &self.triangles[start..end] {
                        if let Some(distance) = intersect_triangle(ray, triangle.points) {
                            visit(triangle, distance);
                        }
                    }
                }
                NodeKind::Inner { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }
}

/// Builds the subtree for `triangles`, which start at `offset` in the final
/// triangle order. Returns the node index.
fn build_node(nodes: &mut Vec<Node>, triangles: &mut [Triangle], offset: usize) -> usize {
    let end = offset + triangles.len();
    let index = nodes.len();
    // Callers never pass an empty slice.
    let bounds = Aabb::from_points(triangles.iter().flat_map(|triangle| triangle.points))
        .unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO));
    nodes.push(Node {
        bounds,
        kind: NodeKind::Leaf { start: offset, end },
    });
    if triangles.len() <= LEAF_SIZE {
        return index;
    }

    let Some(centroids) = Aabb::from_points(triangles.iter().map(Triangle::centroid)) else {
        return index;
    };
    let spread = centroids.max - centroids.min;
    let axis = if spread.x >= spread.y && spread.x >= spread.z {
        0
    } else if spread.y >= spread.z {
        1
    } else {
        2
    };
    if spread[axis] <= f32::EPSILON {
        return index;
    }

    let half = triangles.len() / 2;
    triangles.select_nth_unstable_by(half, |a, b| a.centroid()[axis].total_cmp(&b.centroid()[axis]));
    let (first, second) = triangles.split_at_mut(half);
    let left = build_node(nodes, first, offset);
    let right = build_node(nodes, second, offset + half);
    nodes[index].kind = NodeKind::Inner { left, right };
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_point(rng: &mut StdRng, spread: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-spread..spread),
            rng.gen_range(-spread..spread),
            rng.gen_range(-spread..spread),
        )
    }

    fn soup(rng: &mut StdRng, count: usize) -> Vec<Triangle> {
        (0..count)
            .map(|index| {
                let center = random_point(rng, 10.0);
                Triangle {
                    points: [
                        center + random_point(rng, 0.5),
                        center + random_point(rng, 0.5),
                        center + random_point(rng, 0.5),
                    ],
                    instance: index % 7,
                }
            })
            .collect()
    }

    fn brute_nearest(triangles: &[Triangle], ray: &Ray) -> Option<f32> {
        triangles
            .iter()
            .filter_map(|triangle| intersect_triangle(ray, triangle.points))
            .min_by(f32::total_cmp)
    }

    #[test]
    fn nearest_matches_exhaustive_search() {
        let mut rng = StdRng::seed_from_u64(7);
        let triangles = soup(&mut rng, 2000);
        let bvh = TriangleBvh::build(triangles.clone());

        let mut hits = 0;
        for _ in 0..300 {
            let origin = random_point(&mut rng, 15.0);
            let target = random_point(&mut rng, 8.0);
            let ray = Ray::new(origin, target - origin);
            let expected = brute_nearest(&triangles, &ray);
            let found = bvh.nearest(&ray).map(|(index, distance)| {
                let triangle = bvh.triangles()[index];
                assert_eq!(intersect_triangle(&ray, triangle.points), Some(distance));
                distance
            });
            match (expected, found) {
                (Some(a), Some(b)) => {
                    hits += 1;
                    assert!((a - b).abs() < 1e-5, "{a} vs {b}");
                }
                (None, None) => {}
                other => panic!("bvh and exhaustive search disagree: {other:?}"),
            }
        }
        assert!(hits > 50, "only {hits} rays hit anything");
    }

    #[test]
    fn every_crossed_triangle_is_visited() {
        let mut rng = StdRng::seed_from_u64(11);
        let triangles = soup(&mut rng, 500);
        let bvh = TriangleBvh::build(triangles.clone());

        for _ in 0..100 {
            let origin = random_point(&mut rng, 15.0);
            let ray = Ray::new(origin, -origin);
            let expected = triangles
                .iter()
                .filter(|triangle| intersect_triangle(&ray, triangle.points).is_some())
                .count();
            let mut visited = 0;
            bvh.for_each_hit(&ray, |_, _| visited += 1);
            assert_eq!(visited, expected);
        }
    }

    #[test]
    fn empty_tree_never_hits() {
        let bvh = TriangleBvh::build(Vec::new());
        let ray = Ray::new(Vec3::Z, -Vec3::Z);
        assert!(bvh.nearest(&ray).is_none());
        bvh.for_each_hit(&ray, |_, _| panic!("no triangles to hit"));
    }

    #[test]
    fn coincident_triangles_stay_in_one_leaf() {
        let triangle = Triangle {
            points: [Vec3::ZERO, Vec3::X, Vec3::Y],
            instance: 0,
        };
        let bvh = TriangleBvh::build(vec![triangle; 32]);
        assert_eq!(bvh.nodes.len(), 1);
        let (_, distance) = bvh.nearest(&Ray::new(Vec3::new(0.2, 0.2, 2.0), -Vec3::Z)).unwrap();
        assert!((distance - 2.0).abs() < 1e-6);
    }
}
