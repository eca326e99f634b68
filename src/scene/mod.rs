pub mod import;
pub mod model;
pub mod registry;
pub mod serialization;

pub use import::{ImportError, ModelImporter, SavedPlacement};
pub use model::{Aabb, Material, Mesh, Model};
pub use registry::{RegistryError, SceneRegistry};

use glam::{EulerRot, Mat4, Quat, Vec3};

slotmap::new_key_type! {
    /// Stable handle to a registry member. Stale keys simply stop resolving.
    pub struct ObjectKey;
}

/// Placement of a scene object. Rotation is kept as XYZ Euler angles in
/// radians, the form written to scene documents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_arrays(position: [f32; 3], rotation: [f32; 3], scale: [f32; 3]) -> Self {
        Self {
            position: Vec3::from_array(position),
            rotation: Vec3::from_array(rotation),
            scale: Vec3::from_array(scale),
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        let (x, y, z) = orientation.normalize().to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

/// A placed instance of an imported asset (or the fixed environment).
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub source_asset: Option<String>,
    pub transform: Transform,
    pub selectable: bool,
    pub listable: bool,
    pub highlighted: bool,
    pub model: Model,
}

impl SceneObject {
    /// An object the user can pick, list, save and delete.
    pub fn placed(name: String, source_asset: String, transform: Transform, model: Model) -> Self {
        Self {
            name,
            source_asset: Some(source_asset),
            transform,
            selectable: true,
            listable: true,
            highlighted: false,
            model,
        }
    }

    /// The fixed environment: neither selectable nor listable, never persisted.
    pub fn environment(name: String, model: Model) -> Self {
        Self {
            name,
            source_asset: None,
            transform: Transform::default(),
            selectable: false,
            listable: false,
            highlighted: false,
            model,
        }
    }

    /// Selectable and listable objects are the ones scene documents carry.
    pub fn is_persistent(&self) -> bool {
        self.selectable && self.listable
    }

    pub fn world_bounds(&self) -> Option<Aabb> {
        self.model.world_bounds(self.transform.matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_roundtrips_through_euler() {
        let mut transform = Transform::default();
        let orientation = Quat::from_euler(EulerRot::XYZ, 0.3, -0.8, 1.1);
        transform.set_orientation(orientation);
        assert!(transform.orientation().angle_between(orientation) < 1e-4);
        assert!((transform.rotation - Vec3::new(0.3, -0.8, 1.1)).length() < 1e-4);
    }

    #[test]
    fn matrix_applies_scale_then_rotation_then_translation() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: Vec3::splat(2.0),
        };
        let point = transform.matrix().transform_point3(Vec3::X);
        // +X scaled to 2, yawed a quarter turn onto -Z, then translated.
        assert!((point - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn environment_is_never_persistent() {
        let object = SceneObject::environment("environment".to_string(), Model::new("env"));
        assert!(!object.is_persistent());
        assert!(object.source_asset.is_none());
    }
}
