//! Selection & transform state machine.
//!
//! ```text
//! Idle --select(obj)--> Selected(obj) --drag begin--> Dragging(obj)
//!  ^                      |    ^                          |
//!  +--select(None)/delete-+    +--------drag end----------+
//! ```
//!
//! The pointer-up that ends a drag arrives as a click too, so clicks within
//! [`TRANSFORM_COOLDOWN`] of a drag end never change the selection. A drag the
//! widget still holds outlives the `Dragging` phase: deselecting, deleting or
//! disabling the gizmo mid-drag leaves it open until the drag-end signal.

use super::gizmo::{Axis, InteractionMode, TransformGizmo};
use super::overlay::BoundingBoxOverlay;
use crate::render::PickHit;
use crate::scene::model::ROOT_NODE;
use crate::scene::{ObjectKey, SceneObject, SceneRegistry, Transform};
use glam::{Quat, Vec3};
use std::time::{Duration, Instant};

pub const TRANSFORM_COOLDOWN: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPhase {
    #[default]
    Idle,
    Selected(ObjectKey),
    Dragging(ObjectKey),
}

impl SelectionPhase {
    pub fn key(self) -> Option<ObjectKey> {
        match self {
            SelectionPhase::Idle => None,
            SelectionPhase::Selected(key) | SelectionPhase::Dragging(key) => Some(key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Inside the post-drag cooldown; nothing changed.
    Suppressed,
    Selected(ObjectKey),
    Deselected,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct SelectionController {
    phase: SelectionPhase,
    gizmo: TransformGizmo,
    overlay: BoundingBoxOverlay,
    /// Between an accepted drag begin and its drag-end signal.
    drag_open: bool,
    last_drag_end: Option<Instant>,
}

impl SelectionController {
    pub fn selected(&self) -> Option<ObjectKey> {
        self.phase.key()
    }

    /// The widget still holds a drag, even if the phase already left `Dragging`.
    pub fn drag_open(&self) -> bool {
        self.drag_open
    }

    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    pub(crate) fn gizmo_mut(&mut self) -> &mut TransformGizmo {
        &mut self.gizmo
    }

    pub fn overlay(&self) -> &BoundingBoxOverlay {
        &self.overlay
    }

    /// Make `target` the selection. Re-selecting the current object is a
    /// no-op, and targets that are gone or not selectable are ignored.
    /// Returns whether the selection changed.
    pub fn select(&mut self, registry: &mut SceneRegistry, target: Option<ObjectKey>) -> bool {
        if target == self.selected() {
            return false;
        }
        if let Some(key) = target {
            if !registry.get(key).is_some_and(|object| object.selectable) {
                log::debug!("Ignoring selection of a missing or unselectable object");
                return false;
            }
        }

        self.release(registry);
        if let Some(key) = target {
            if let Some(object) = registry.get_mut(key) {
                object.highlighted = true;
                log::debug!("Selected '{}'", object.name);
            }
            self.gizmo.attach(key);
            self.phase = SelectionPhase::Selected(key);
            self.overlay.rebuild(registry, Some(key));
        }
        true
    }

    /// Tear down everything tied to the current selection and go idle.
    fn release(&mut self, registry: &mut SceneRegistry) {
        if let Some(key) = self.selected() {
            if let Some(object) = registry.get_mut(key) {
                object.highlighted = false;
                log::debug!("Deselected '{}'", object.name);
            }
        }
        self.gizmo.detach();
        self.overlay.clear();
        self.phase = SelectionPhase::Idle;
    }

    /// Gizmo drag-state signal. Returns whether the phase changed.
    ///
    /// The drag-end signal starts the click cooldown whenever a drag is open,
    /// whatever the phase is by then.
    pub fn on_drag_changed(
        &mut self,
        registry: &SceneRegistry,
        dragging: bool,
        now: Instant,
    ) -> bool {
        if dragging {
            let SelectionPhase::Selected(key) = self.phase else {
                return false;
            };
            if !self.gizmo.interactive() {
                return false;
            }
            let Some(object) = registry.get(key) else {
                return false;
            };
            self.gizmo.begin_drag(object.transform);
            self.phase = SelectionPhase::Dragging(key);
            self.drag_open = true;
            log::debug!("Drag started on '{}'", object.name);
            return true;
        }

        if !self.drag_open {
            return false;
        }
        self.drag_open = false;
        self.last_drag_end = Some(now);
        if let SelectionPhase::Dragging(key) = self.phase {
            self.gizmo.end_drag();
            self.phase = SelectionPhase::Selected(key);
        }
        log::debug!("Drag ended; clicks suppressed for {:?}", TRANSFORM_COOLDOWN);
        true
    }

    /// Gizmo object-changed signal carrying the widget's raw transform.
    ///
    /// In rotate mode only the yaw of the raw orientation survives.
    pub fn on_object_changed(&mut self, registry: &mut SceneRegistry, raw: Transform) -> bool {
        if !self.gizmo.enabled() {
            return false;
        }
        let Some(key) = self.selected() else {
            return false;
        };
        let Some(object) = registry.get_mut(key) else {
            return false;
        };

        let mut transform = raw;
        if self.gizmo.mode() == InteractionMode::Rotate {
            transform.rotation = Vec3::new(0.0, yaw_of(raw.orientation()), 0.0);
        }
        object.transform = transform;
        self.overlay.rebuild(registry, Some(key));
        true
    }

    pub fn clicks_suppressed(&self, now: Instant) -> bool {
        if self.drag_open {
            return true;
        }
        self.last_drag_end
            .is_some_and(|end| now.saturating_duration_since(end) < TRANSFORM_COOLDOWN)
    }

    /// Viewport click with the pick hits ordered nearest first.
    pub fn click(
        &mut self,
        registry: &mut SceneRegistry,
        hits: &[PickHit],
        now: Instant,
    ) -> ClickOutcome {
        if self.clicks_suppressed(now) {
            log::debug!("Click suppressed by transform cooldown");
            return ClickOutcome::Suppressed;
        }
        let target = hits.first().and_then(|hit| resolve_hit(registry, hit));
        if !self.select(registry, target) {
            return ClickOutcome::Unchanged;
        }
        match target {
            Some(key) => ClickOutcome::Selected(key),
            None => ClickOutcome::Deselected,
        }
    }

    /// Remove the selected object from the registry, clearing the selection in
    /// the same step.
    pub fn delete_selected(&mut self, registry: &mut SceneRegistry) -> Option<SceneObject> {
        let key = self.selected()?;
        self.release(registry);
        registry.remove(key)
    }

    /// Snap the dragged object back to its transform at drag start.
    pub fn reset(&mut self, registry: &mut SceneRegistry) -> bool {
        let SelectionPhase::Dragging(key) = self.phase else {
            return false;
        };
        if !self.gizmo.enabled() {
            return false;
        }
        let (Some(start), Some(object)) = (self.gizmo.drag_start(), registry.get_mut(key)) else {
            return false;
        };
        object.transform = start;
        self.overlay.rebuild(registry, Some(key));
        true
    }

    /// Per-frame overlay refresh; also drops a selection whose object vanished.
    pub fn refresh_overlay(&mut self, registry: &mut SceneRegistry) {
        if let Some(key) = self.selected() {
            if !registry.contains(key) {
                self.release(registry);
            }
        }
        self.overlay.rebuild(registry, self.selected());
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.gizmo.set_mode(mode);
        log::debug!("Interaction mode: {}", mode.label());
    }

    pub fn toggle_axis(&mut self, axis: Axis) {
        self.gizmo.toggle_axis(axis);
        log::debug!("Gizmo axes: {:?}", self.gizmo.axes());
    }

    pub fn grow_gizmo(&mut self) {
        self.gizmo.grow();
    }

    pub fn shrink_gizmo(&mut self) {
        self.gizmo.shrink();
    }

    /// Enabling also shows the gizmo again; disabling hides it.
    pub fn toggle_gizmo(&mut self) {
        let enabled = !self.gizmo.enabled();
        self.gizmo.set_enabled(enabled);
        self.gizmo.set_visible(enabled);
        if let (false, SelectionPhase::Dragging(key)) = (enabled, self.phase) {
            self.phase = SelectionPhase::Selected(key);
        }
        log::debug!("Gizmo {}", if enabled { "enabled" } else { "disabled" });
    }
}

/// Walk from the hit node up to the model root; the object owning that root
/// is the selectable candidate.
fn resolve_hit(registry: &SceneRegistry, hit: &PickHit) -> Option<ObjectKey> {
    let object = registry.get(hit.object)?;
    let mut node = hit.node;
    let mut steps = 0;
    while node != ROOT_NODE {
        node = object.model.parent_of(node)?;
        steps += 1;
        if steps > object.model.nodes().len() {
            return None;
        }
    }
    object.selectable.then_some(hit.object)
}

/// Yaw (rotation about +Y) of `orientation`.
pub fn yaw_of(orientation: Quat) -> f32 {
    let q = orientation.normalize();
    (2.0 * (q.w * q.y + q.x * q.z)).atan2(1.0 - 2.0 * (q.y * q.y + q.z * q.z))
}
