use super::pick::Ray;
use glam::{Mat4, Vec2, Vec3};

/// Orbit camera: a position plus yaw/pitch look direction, orbiting a pivot.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub pivot: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            pivot: Vec3::ZERO,
            fov_y_degrees: 50.0,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let (yaw, pitch) = forward_to_yaw_pitch(target - position);
        Self {
            pivot: target,
            ..Self::new(position, yaw, pitch)
        }
    }

    pub fn frame_bounds_preserve_orientation(&mut self, center: Vec3, extent: Vec3) {
        let radius = extent.max_element();
        let distance = if radius > 0.0 { radius * 3.0 } else { 3.0 };
        let (forward, _, _) = self.basis();
        self.position = center - forward * distance;
        self.pivot = center;
    }

    /// Dolly along the view direction and turn in place.
    pub fn nudge(&mut self, yaw_delta: f32, pitch_delta: f32, zoom_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch += pitch_delta;
        wrap_angles(&mut self.yaw, &mut self.pitch);
        if zoom_delta != 0.0 {
            let (forward, _, _) = self.basis();
            self.position += forward * zoom_delta;
        }
    }

    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        let pivot = self.pivot;
        self.orbit_around(pivot, yaw_delta, pitch_delta);
    }

    pub fn orbit_around(&mut self, pivot: Vec3, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-1.5, 1.5);
        wrap_angles(&mut self.yaw, &mut self.pitch);

        let distance = (self.position - pivot).length().max(0.05);
        let (forward, _, _) = self.basis();
        self.position = pivot - forward * distance;
        self.pivot = pivot;
    }

    /// `(forward, right, up)`.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let cos_pitch = self.pitch.cos();
        let forward = Vec3::new(
            self.yaw.cos() * cos_pitch,
            self.pitch.sin(),
            self.yaw.sin() * cos_pitch,
        );
        let right = Vec3::new(-self.yaw.sin(), 0.0, self.yaw.cos());
        let up = right.cross(forward).normalize_or_zero();
        (forward, right, up)
    }

    pub fn view(&self) -> Mat4 {
        let (forward, _, up) = self.basis();
        Mat4::look_at_rh(self.position, self.position + forward, up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            aspect.max(1e-3),
            self.near,
            self.far,
        )
    }

    /// World space ray through a point in normalized device coordinates
    /// (x right, y up, both in -1..1).
    pub fn ray_through(&self, ndc: Vec2, aspect: f32) -> Ray {
        let (forward, right, up) = self.basis();
        let half_height = (self.fov_y_degrees.to_radians() * 0.5).tan();
        let half_width = half_height * aspect.max(1e-3);
        let direction = forward + right * (ndc.x * half_width) + up * (ndc.y * half_height);
        Ray::new(self.position, direction)
    }
}

/// Window pixel coordinates (origin top left) to normalized device coordinates.
pub fn pointer_to_ndc(x: f32, y: f32, width: u32, height: u32) -> Vec2 {
    let width = width.max(1) as f32;
    let height = height.max(1) as f32;
    Vec2::new(x / width * 2.0 - 1.0, 1.0 - y / height * 2.0)
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let n = forward / forward.length().max(1e-6);
    let yaw = n.z.atan2(n.x);
    let pitch = n.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

fn wrap_angles(yaw: &mut f32, pitch: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if yaw.is_finite() {
        *yaw = (*yaw + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
    if pitch.is_finite() {
        *pitch = (*pitch + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
}
