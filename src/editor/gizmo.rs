//! The one transform gizmo instance. Only the selection controller attaches,
//! detaches or configures it.

use crate::scene::{ObjectKey, Transform};
use glam::{Quat, Vec2, Vec3};

pub const GIZMO_SIZE_STEP: f32 = 0.1;
pub const GIZMO_MIN_SIZE: f32 = 0.1;

/// World units per pixel of pointer travel in translate mode, at size 1.0.
const TRANSLATE_PER_PIXEL: f32 = 0.01;
const ROTATE_PER_PIXEL: f32 = 0.01;
const SCALE_PER_PIXEL: f32 = 0.005;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl InteractionMode {
    pub fn label(self) -> &'static str {
        match self {
            InteractionMode::Translate => "translate",
            InteractionMode::Rotate => "rotate",
            InteractionMode::Scale => "scale",
        }
    }

    /// Axes shown when the mode is entered. Rotation only ever yaws.
    pub fn axis_preset(self) -> [bool; 3] {
        match self {
            InteractionMode::Rotate => [false, true, false],
            InteractionMode::Translate | InteractionMode::Scale => [true, true, true],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformGizmo {
    attached: Option<ObjectKey>,
    mode: InteractionMode,
    show: [bool; 3],
    size: f32,
    enabled: bool,
    visible: bool,
    drag_start: Option<Transform>,
}

impl Default for TransformGizmo {
    fn default() -> Self {
        Self {
            attached: None,
            mode: InteractionMode::Translate,
            show: InteractionMode::Translate.axis_preset(),
            size: 1.0,
            enabled: true,
            visible: true,
            drag_start: None,
        }
    }
}

impl TransformGizmo {
    pub fn attached(&self) -> Option<ObjectKey> {
        self.attached
    }

    pub fn attach(&mut self, key: ObjectKey) {
        self.attached = Some(key);
        self.drag_start = None;
    }

    pub fn detach(&mut self) {
        self.attached = None;
        self.drag_start = None;
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.show = mode.axis_preset();
    }

    pub fn axes(&self) -> [bool; 3] {
        self.show
    }

    pub fn toggle_axis(&mut self, axis: Axis) {
        let shown = &mut self.show[axis.index()];
        *shown = !*shown;
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn grow(&mut self) {
        self.size += GIZMO_SIZE_STEP;
    }

    pub fn shrink(&mut self) {
        self.size = (self.size - GIZMO_SIZE_STEP).max(GIZMO_MIN_SIZE);
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.drag_start = None;
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// True when a drag would be accepted right now.
    pub fn interactive(&self) -> bool {
        self.enabled && self.visible && self.attached.is_some()
    }

    pub fn begin_drag(&mut self, start: Transform) {
        self.drag_start = Some(start);
    }

    pub fn end_drag(&mut self) -> Option<Transform> {
        self.drag_start.take()
    }

    pub fn drag_start(&self) -> Option<Transform> {
        self.drag_start
    }

    /// Raw widget output for a pointer drag of `delta_px` since drag start.
    ///
    /// Rotation feeds horizontal travel into yaw and vertical travel into
    /// pitch; the controller strips the pitch again in rotate mode.
    pub fn drag_output(&self, start: &Transform, delta_px: Vec2) -> Transform {
        let mut out = *start;
        let [show_x, show_y, show_z] = self.show;
        match self.mode {
            InteractionMode::Translate => {
                let step = TRANSLATE_PER_PIXEL * self.size;
                if show_x {
                    out.position.x += delta_px.x * step;
                }
                if show_z {
                    out.position.z += delta_px.y * step;
                } else if show_y {
                    out.position.y -= delta_px.y * step;
                }
            }
            InteractionMode::Rotate => {
                let yaw = Quat::from_rotation_y(delta_px.x * ROTATE_PER_PIXEL);
                let pitch = Quat::from_rotation_x(delta_px.y * ROTATE_PER_PIXEL);
                out.set_orientation(yaw * start.orientation() * pitch);
            }
            InteractionMode::Scale => {
                let factor = (1.0 - delta_px.y * SCALE_PER_PIXEL * self.size).max(0.01);
                let mask = Vec3::new(
                    if show_x { factor } else { 1.0 },
                    if show_y { factor } else { 1.0 },
                    if show_z { factor } else { 1.0 },
                );
                out.scale = start.scale * mask;
            }
        }
        out
    }
}
