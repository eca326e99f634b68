use crate::scene::{Aabb, ObjectKey, SceneRegistry};

/// World space bounds drawn around the selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingBoxOverlay {
    bounds: Option<Aabb>,
}

impl BoundingBoxOverlay {
    /// Recompute from the current world geometry of `selection`. No selection,
    /// a stale key, or an object without geometry all leave no overlay.
    pub fn rebuild(&mut self, registry: &SceneRegistry, selection: Option<ObjectKey>) {
        self.bounds = selection
            .and_then(|key| registry.get(key))
            .and_then(|object| object.world_bounds());
    }

    pub fn clear(&mut self) {
        self.bounds = None;
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }
}
