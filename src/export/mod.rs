//! Render-pass export.
//!
//! Every pass runs inside a [`PassScope`]: controls are suspended, helpers and
//! the gizmo are hidden and the pass materials are swapped in. Dropping the
//! scope puts everything back, whether the render returned, failed or
//! panicked.

use crate::editor::gizmo::TransformGizmo;
use crate::editor::{Controls, EditorState};
use crate::render::{Framebuffer, OrbitCamera, RenderBackend, RenderError, RenderView};
use crate::scene::{Material, ObjectKey};
use rand::Rng;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write object id legend: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPass {
    Render,
    Depth,
    ObjectId,
    Normal,
}

impl ExportPass {
    pub const ALL: [ExportPass; 4] = [
        ExportPass::Render,
        ExportPass::Depth,
        ExportPass::ObjectId,
        ExportPass::Normal,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ExportPass::Render => "render.png",
            ExportPass::Depth => "depth.png",
            ExportPass::ObjectId => "object_id.png",
            ExportPass::Normal => "normal.png",
        }
    }

    /// Auxiliary passes clear to black so "no object" reads as zero.
    fn clear(self) -> Option<[u8; 4]> {
        match self {
            ExportPass::Render => None,
            ExportPass::Depth | ExportPass::ObjectId | ExportPass::Normal => Some([0, 0, 0, 0xff]),
        }
    }
}

/// Color of one object in the object-id pass.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IdLegendEntry {
    pub name: String,
    pub color: String,
}

pub struct PassOutput {
    pub pass: ExportPass,
    pub frame: Framebuffer,
    pub legend: Vec<IdLegendEntry>,
}

/// Random colors, one per key, never black and never repeated within a pass.
pub fn assign_id_colors<R: Rng + ?Sized>(
    keys: &[ObjectKey],
    rng: &mut R,
) -> Vec<(ObjectKey, [u8; 3])> {
    let mut used: HashSet<[u8; 3]> = HashSet::with_capacity(keys.len());
    keys.iter()
        .map(|&key| loop {
            let color: [u8; 3] = rng.gen();
            if color != [0, 0, 0] && used.insert(color) {
                break (key, color);
            }
        })
        .collect()
}

struct SavedObject {
    key: ObjectKey,
    highlighted: bool,
    materials: Vec<(usize, Material)>,
}

/// Scoped state swap for one export pass.
pub struct PassScope<'a> {
    state: &'a mut EditorState,
    controls: Controls,
    gizmo: TransformGizmo,
    objects: Vec<SavedObject>,
}

impl<'a> PassScope<'a> {
    /// Suspend interaction and apply `substitute` to every mesh of every
    /// object. `None` keeps a mesh's own material.
    pub fn enter<F>(state: &'a mut EditorState, mut substitute: F) -> Self
    where
        F: FnMut(ObjectKey, &Material) -> Option<Material>,
    {
        let controls = state.controls;
        let gizmo = state.selection.gizmo().clone();
        state.controls = Controls {
            orbit_enabled: false,
            helpers_visible: false,
        };
        let live_gizmo = state.selection.gizmo_mut();
        live_gizmo.set_enabled(false);
        live_gizmo.set_visible(false);

        let keys: Vec<ObjectKey> = state.registry.keys().collect();
        let mut objects = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(object) = state.registry.get_mut(key) else {
                continue;
            };
            let highlighted = std::mem::replace(&mut object.highlighted, false);
            let mut materials = Vec::new();
            for (node, mesh) in object.model.meshes_mut() {
                if let Some(material) = substitute(key, &mesh.material) {
                    materials.push((node, std::mem::replace(&mut mesh.material, material)));
                }
            }
            objects.push(SavedObject {
                key,
                highlighted,
                materials,
            });
        }

        Self {
            state,
            controls,
            gizmo,
            objects,
        }
    }

    pub fn view<'v>(
        &'v self,
        camera: &'v OrbitCamera,
        width: u32,
        height: u32,
        clear: Option<[u8; 4]>,
    ) -> RenderView<'v> {
        RenderView {
            registry: &self.state.registry,
            camera,
            width,
            height,
            overlay: None,
            helpers_visible: self.state.controls.helpers_visible,
            gizmo: None,
            clear,
        }
    }
}

impl Drop for PassScope<'_> {
    fn drop(&mut self) {
        for saved in self.objects.drain(..) {
            let Some(object) = self.state.registry.get_mut(saved.key) else {
                continue;
            };
            object.highlighted = saved.highlighted;
            for (node, material) in saved.materials {
                if let Some(mesh) = object.model.mesh_mut(node) {
                    mesh.material = material;
                }
            }
        }
        self.state.controls = self.controls;
        *self.state.selection.gizmo_mut() = std::mem::take(&mut self.gizmo);
    }
}

/// Render one pass of the current scene.
pub fn render_pass<B, R>(
    state: &mut EditorState,
    backend: &mut B,
    camera: &OrbitCamera,
    (width, height): (u32, u32),
    pass: ExportPass,
    rng: &mut R,
) -> Result<PassOutput, ExportError>
where
    B: RenderBackend + ?Sized,
    R: Rng + ?Sized,
{
    let mut legend = Vec::new();
    let scope = match pass {
        ExportPass::Render => PassScope::enter(state, |_, _| None),
        ExportPass::Depth => PassScope::enter(state, |_, _| Some(Material::Depth)),
        ExportPass::Normal => PassScope::enter(state, |_, _| Some(Material::Normal)),
        ExportPass::ObjectId => {
            let keys: Vec<ObjectKey> = state.registry.keys().collect();
            let colors = assign_id_colors(&keys, rng);
            for (key, [r, g, b]) in &colors {
                if let Some(object) = state.registry.get(*key) {
                    legend.push(IdLegendEntry {
                        name: object.name.clone(),
                        color: format!("#{:02x}{:02x}{:02x}", r, g, b),
                    });
                }
            }
            PassScope::enter(state, move |key, _| {
                colors
                    .iter()
                    .find(|(candidate, _)| *candidate == key)
                    .map(|(_, color)| Material::Flat(*color))
            })
        }
    };
    let frame = backend.render(&scope.view(camera, width, height, pass.clear()))?;
    drop(scope);
    Ok(PassOutput {
        pass,
        frame,
        legend,
    })
}

pub fn write_png(frame: &Framebuffer, path: &Path) -> Result<(), ExportError> {
    frame
        .to_image()
        .save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Render all four passes into `dir`, plus `object_id.json` mapping object
/// names to their id colors. Returns the written paths.
pub fn export_all<B, R>(
    state: &mut EditorState,
    backend: &mut B,
    camera: &OrbitCamera,
    size: (u32, u32),
    dir: &Path,
    rng: &mut R,
) -> Result<Vec<PathBuf>, ExportError>
where
    B: RenderBackend + ?Sized,
    R: Rng + ?Sized,
{
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for pass in ExportPass::ALL {
        let output = render_pass(state, backend, camera, size, pass, rng)?;
        let path = dir.join(output.pass.file_name());
        write_png(&output.frame, &path)?;
        written.push(path);

        if pass == ExportPass::ObjectId {
            let path = dir.join("object_id.json");
            std::fs::write(&path, serde_json::to_string_pretty(&output.legend)?)?;
            written.push(path);
        }
    }
    log::info!("Exported {} files to {}", written.len(), dir.display());
    Ok(written)
}
