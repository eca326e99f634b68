//! Reference CPU backend: one primary ray per pixel against the scene's
//! world space triangles, flat shaded per material.

use super::pick::{Ray, SceneGeometry};
use super::{
    Framebuffer, GizmoMarker, RenderBackend, RenderError, RenderView, BACKGROUND, OVERLAY_COLOR,
};
use crate::scene::Material;
use glam::{Mat4, Vec2, Vec3};

const LIGHT_POSITION: Vec3 = Vec3::new(5.0, 10.0, 5.0);
const AMBIENT: f32 = 0x9d as f32 / 255.0;
/// Added to the emissive term of highlighted (selected) objects.
const HIGHLIGHT_EMISSIVE: f32 = 0x55 as f32 / 255.0;
const GRID_HALF_SIZE: f32 = 5.0;
const GRID_COLOR: [u8; 4] = [0x44, 0x44, 0x44, 0xff];
const GIZMO_AXIS_COLORS: [[u8; 4]; 3] = [
    [0xff, 0x30, 0x30, 0xff],
    [0x30, 0xff, 0x30, 0xff],
    [0x30, 0x30, 0xff, 0xff],
];

#[derive(Debug, Default, Clone, Copy)]
pub struct RayCastRenderer;

impl RenderBackend for RayCastRenderer {
    fn render(&mut self, view: &RenderView<'_>) -> Result<Framebuffer, RenderError> {
        if view.width == 0 || view.height == 0 {
            return Err(RenderError::EmptyViewport {
                width: view.width,
                height: view.height,
            });
        }
        let keys: Vec<_> = view.registry.keys().collect();
        let geometry = SceneGeometry::build(view.registry, &keys);
        let aspect = view.aspect();
        let (forward, _, _) = view.camera.basis();
        let light = LIGHT_POSITION.normalize();

        let mut frame = Framebuffer::new(view.width, view.height, view.clear.unwrap_or(BACKGROUND));
        for y in 0..view.height {
            for x in 0..view.width {
                let ndc = super::pointer_to_ndc(x as f32 + 0.5, y as f32 + 0.5, view.width, view.height);
                let ray = view.camera.ray_through(ndc, aspect);
                let hit = geometry.nearest(&ray);

                if view.helpers_visible {
                    let mesh_distance = hit.map_or(f32::INFINITY, |(hit, _)| hit.distance);
                    if grid_line_hit(&ray, mesh_distance) {
                        frame.set(x, y, GRID_COLOR);
                        continue;
                    }
                }

                let Some((hit, normal)) = hit else {
                    continue;
                };
                let Some(object) = view.registry.get(hit.object) else {
                    continue;
                };
                let Some(mesh) = object.model.node(hit.node).and_then(|node| node.mesh.as_ref()) else {
                    continue;
                };
                let color = match &mesh.material {
                    Material::Standard {
                        base_color,
                        emissive,
                    } => {
                        let lit = AMBIENT + normal.dot(light).max(0.0);
                        let glow = if object.highlighted { HIGHLIGHT_EMISSIVE } else { 0.0 };
                        let channel = |i: usize| base_color[i] * lit + emissive[i] + glow;
                        to_rgba(Vec3::new(channel(0), channel(1), channel(2)))
                    }
                    Material::Depth => {
                        let depth = (ray.at(hit.distance) - view.camera.position).dot(forward);
                        let range = (view.camera.far - view.camera.near).max(1e-6);
                        let t = ((depth - view.camera.near) / range).clamp(0.0, 1.0);
                        to_rgba(Vec3::splat(1.0 - t))
                    }
                    Material::Normal => to_rgba(normal * 0.5 + Vec3::splat(0.5)),
                    Material::Flat([r, g, b]) => [*r, *g, *b, 0xff],
                };
                frame.set(x, y, color);
            }
        }

        let view_projection = view.camera.projection(aspect) * view.camera.view();
        if view.helpers_visible {
            if let Some(bounds) = view.overlay {
                let corners = bounds.corners();
                for (a, b) in BOX_EDGES {
                    draw_line(&mut frame, &view_projection, corners[a], corners[b], OVERLAY_COLOR);
                }
            }
        }
        if let Some(gizmo) = view.gizmo {
            draw_gizmo(&mut frame, &view_projection, &gizmo);
        }
        Ok(frame)
    }
}

#[rustfmt::skip]
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1), (2, 3), (4, 5), (6, 7),
    (0, 2), (1, 3), (4, 6), (5, 7),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

fn to_rgba(color: Vec3) -> [u8; 4] {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, 0xff]
}

/// Unit grid on the ground plane, drawn only where nothing closer was hit.
fn grid_line_hit(ray: &Ray, mesh_distance: f32) -> bool {
    if ray.direction.y.abs() < 1e-6 {
        return false;
    }
    let t = -ray.origin.y / ray.direction.y;
    if t <= 0.0 || t >= mesh_distance {
        return false;
    }
    let point = ray.at(t);
    if point.x.abs() > GRID_HALF_SIZE || point.z.abs() > GRID_HALF_SIZE {
        return false;
    }
    let width = 0.01 * t.max(1.0);
    let near_line = |v: f32| (v - v.round()).abs() < width;
    near_line(point.x) || near_line(point.z)
}

fn draw_gizmo(frame: &mut Framebuffer, view_projection: &Mat4, gizmo: &GizmoMarker) {
    for (index, axis) in [Vec3::X, Vec3::Y, Vec3::Z].into_iter().enumerate() {
        if gizmo.axes[index] {
            let tip = gizmo.origin + axis * gizmo.size;
            draw_line(frame, view_projection, gizmo.origin, tip, GIZMO_AXIS_COLORS[index]);
        }
    }
}

fn project(frame: &Framebuffer, view_projection: &Mat4, point: Vec3) -> Option<Vec2> {
    let clip = *view_projection * point.extend(1.0);
    if clip.w <= 1e-6 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * frame.width as f32,
        (1.0 - ndc.y) * 0.5 * frame.height as f32,
    ))
}

fn draw_line(frame: &mut Framebuffer, view_projection: &Mat4, a: Vec3, b: Vec3, color: [u8; 4]) {
    let (Some(start), Some(end)) = (
        project(frame, view_projection, a),
        project(frame, view_projection, b),
    ) else {
        return;
    };
    let steps = (end - start).abs().max_element().ceil().clamp(1.0, 4096.0) as u32;
    for step in 0..=steps {
        let point = start.lerp(end, step as f32 / steps as f32);
        if point.x >= 0.0 && point.y >= 0.0 {
            frame.set(point.x as u32, point.y as u32, color);
        }
    }
}
