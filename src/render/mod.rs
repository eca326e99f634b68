mod bvh;
mod camera;
pub mod pick;
pub mod raycast;
pub mod surface;

pub use camera::{pointer_to_ndc, OrbitCamera};
pub use pick::{PickHit, Ray, SceneGeometry};
pub use raycast::RayCastRenderer;

use crate::scene::{Aabb, ObjectKey, SceneRegistry};
use glam::Vec3;

/// Viewport clear color (mid grey).
pub const BACKGROUND: [u8; 4] = [0x80, 0x80, 0x80, 0xff];
/// Bounding overlay line color.
pub const OVERLAY_COLOR: [u8; 4] = [0xff, 0xff, 0x00, 0xff];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("viewport has no pixels ({width}x{height})")]
    EmptyViewport { width: u32, height: u32 },
    #[error("render backend failed: {0}")]
    Backend(String),
}

/// Where the transform gizmo is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoMarker {
    pub origin: Vec3,
    pub size: f32,
    pub axes: [bool; 3],
}

/// Everything one render call sees.
pub struct RenderView<'a> {
    pub registry: &'a SceneRegistry,
    pub camera: &'a OrbitCamera,
    pub width: u32,
    pub height: u32,
    /// Selection bounds, drawn only while helpers are visible.
    pub overlay: Option<Aabb>,
    /// Grid and other non-content helpers.
    pub helpers_visible: bool,
    pub gizmo: Option<GizmoMarker>,
    /// Clear color; `None` uses [`BACKGROUND`].
    pub clear: Option<[u8; 4]>,
}

impl RenderView<'_> {
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Row major RGBA8 pixels, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, clear: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![clear; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn set(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    pub fn to_image(&self) -> image::RgbaImage {
        let bytes: Vec<u8> = self.pixels.iter().flatten().copied().collect();
        image::RgbaImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

/// The graphics backend as the editor sees it.
pub trait RenderBackend {
    fn render(&mut self, view: &RenderView<'_>) -> Result<Framebuffer, RenderError>;

    /// Hits on `candidates` along `ray`, nearest first. Nothing outside
    /// `candidates` can be hit or occlude.
    fn pick(&self, registry: &SceneRegistry, ray: &Ray, candidates: &[ObjectKey]) -> Vec<PickHit> {
        SceneGeometry::build(registry, candidates).cast_all(ray)
    }
}

impl<B: RenderBackend + ?Sized> RenderBackend for Box<B> {
    fn render(&mut self, view: &RenderView<'_>) -> Result<Framebuffer, RenderError> {
        (**self).render(view)
    }

    fn pick(&self, registry: &SceneRegistry, ray: &Ray, candidates: &[ObjectKey]) -> Vec<PickHit> {
        (**self).pick(registry, ray, candidates)
    }
}
