//! Renderable node trees produced by the model loader.
//!
//! A [`Model`] is a flat arena of nodes where every parent index is smaller
//! than its children's, so world matrices resolve in a single forward pass.
//! Node 0 is always the root and stands for the placed object itself.

use glam::{Mat4, Vec3};

pub const ROOT_NODE: usize = 0;

/// Axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(point1: Vec3, point2: Vec3) -> Self {
        Self {
            min: point1.min(point2),
            max: point1.max(point2),
        }
    }

    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::new(first, first);
        for point in points {
            bounds.min = bounds.min.min(point);
            bounds.max = bounds.max.max(point);
        }
        Some(bounds)
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Bounds of this box after `matrix`, computed from the transformed corners.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let corners = self.corners().map(|corner| matrix.transform_point3(corner));
        // Eight corners, never empty.
        Aabb::from_points(corners).unwrap_or(*self)
    }

    /// Slab test. Returns the entry distance along the ray (0 when the origin is inside).
    pub fn ray_intersect(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inv = direction.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;
        let t_min = t0.min(t1).max_element().max(0.0);
        let t_max = t0.max(t1).min_element();
        (t_max >= t_min).then_some(t_min)
    }
}

/// Surface description swapped in and out by the export passes.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Standard {
        base_color: [f32; 4],
        emissive: [f32; 3],
    },
    /// Linear view depth, white near and black far.
    Depth,
    /// World space normal encoded as `n * 0.5 + 0.5`.
    Normal,
    /// Unlit flat color, used by the object-id pass.
    Flat([u8; 3]),
}

impl Default for Material {
    fn default() -> Self {
        Material::Standard {
            base_color: [0.8, 0.8, 0.8, 1.0],
            emissive: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
    pub material: Material,
}

impl Mesh {
    /// Build a triangle list. Empty `indices` means the positions are already a
    /// non-indexed triangle list.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, material: Material) -> Option<Self> {
        let bounds = Aabb::from_points(positions.iter().copied())?;
        let indices = if indices.is_empty() {
            (0..positions.len() as u32).collect()
        } else {
            indices
        };
        Some(Self {
            positions,
            indices,
            bounds,
            material,
        })
    }

    /// Axis aligned box centered on the origin.
    #[cfg(test)]
    pub fn cuboid(half_extents: Vec3, material: Material) -> Self {
        let h = half_extents.abs();
        let positions = Aabb::new(-h, h).corners().to_vec();
        // Corner order follows `Aabb::corners`: bit 0 = x, bit 1 = y, bit 2 = z.
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 1, 2, 3, // -z
            4, 5, 6, 5, 7, 6, // +z
            0, 4, 2, 2, 4, 6, // -x
            1, 3, 5, 3, 7, 5, // +x
            0, 1, 4, 1, 5, 4, // -y
            2, 6, 3, 3, 6, 7, // +y
        ];
        Self {
            positions,
            indices,
            bounds: Aabb::new(-h, h),
            material,
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.positions.get(tri[0] as usize)?,
                *self.positions.get(tri[1] as usize)?,
                *self.positions.get(tri[2] as usize)?,
            ])
        })
    }
}

#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: String,
    pub parent: Option<usize>,
    pub local: Mat4,
    pub mesh: Option<Mesh>,
}

#[derive(Debug, Clone)]
pub struct Model {
    nodes: Vec<ModelNode>,
}

impl Model {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![ModelNode {
                name: root_name.into(),
                parent: None,
                local: Mat4::IDENTITY,
                mesh: None,
            }],
        }
    }

    /// A root with one mesh child, the shape most single-prop assets have.
    #[cfg(test)]
    pub fn single_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        let name = name.into();
        let mut model = Self::new(name.clone());
        model.add_node(ROOT_NODE, format!("{name}_mesh"), Mat4::IDENTITY, Some(mesh));
        model
    }

    /// Append a node under `parent`. Out of range parents attach to the root.
    pub fn add_node(
        &mut self,
        parent: usize,
        name: impl Into<String>,
        local: Mat4,
        mesh: Option<Mesh>,
    ) -> usize {
        let parent = if parent < self.nodes.len() {
            parent
        } else {
            ROOT_NODE
        };
        self.nodes.push(ModelNode {
            name: name.into(),
            parent: Some(parent),
            local,
            mesh,
        });
        self.nodes.len() - 1
    }

    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&ModelNode> {
        self.nodes.get(index)
    }

    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(|node| node.parent)
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.mesh.is_some()).count()
    }

    pub fn meshes(&self) -> impl Iterator<Item = (usize, &Mesh)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.mesh.as_ref().map(|mesh| (index, mesh)))
    }

    pub fn meshes_mut(&mut self) -> impl Iterator<Item = (usize, &mut Mesh)> {
        self.nodes
            .iter_mut()
            .enumerate()
            .filter_map(|(index, node)| node.mesh.as_mut().map(|mesh| (index, mesh)))
    }

    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.nodes.get_mut(index).and_then(|node| node.mesh.as_mut())
    }

    /// World matrix of every node given the placement of the root.
    pub fn world_matrices(&self, root: Mat4) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let parent = node
                .parent
                .and_then(|index| world.get(index).copied())
                .unwrap_or(root);
            world.push(parent * node.local);
        }
        world
    }

    /// Union of every mesh's bounds in world space, `None` for a model without geometry.
    pub fn world_bounds(&self, root: Mat4) -> Option<Aabb> {
        let world = self.world_matrices(root);
        self.meshes()
            .map(|(index, mesh)| mesh.bounds.transformed(&world[index]))
            .reduce(|acc, bounds| acc.union(&bounds))
    }
}
