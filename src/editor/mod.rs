//! Editor state and its single `handle(event)` entry point.

pub mod gizmo;
pub mod overlay;
pub mod selection;

use crate::assets::{AssetCatalog, ModelLoader};
use crate::config::EditorConfig;
use crate::export::{self, ExportError};
use crate::render::{Framebuffer, GizmoMarker, OrbitCamera, RenderBackend, RenderError, RenderView};
use crate::scene::serialization::{self, SceneDocument, SerializationError};
use crate::scene::{ImportError, ModelImporter, ObjectKey, SceneObject, SceneRegistry, Transform};
use gizmo::{Axis, InteractionMode};
use glam::Vec2;
use selection::{ClickOutcome, SelectionController};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Interactive controls that exports suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub orbit_enabled: bool,
    pub helpers_visible: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            orbit_enabled: true,
            helpers_visible: true,
        }
    }
}

/// Everything mutable about an editing session.
#[derive(Default)]
pub struct EditorState {
    pub registry: SceneRegistry,
    pub selection: SelectionController,
    pub controls: Controls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    SetMode(InteractionMode),
    ToggleAxis(Axis),
    GrowGizmo,
    ShrinkGizmo,
    ToggleGizmo,
    Reset,
    DeleteSelected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorEvent {
    /// Inventory list pick. Not subject to the drag cooldown.
    Select(Option<ObjectKey>),
    /// Viewport click at a point in normalized device coordinates.
    Click { ndc: Vec2 },
    GizmoDragChanged(bool),
    GizmoObjectChanged(Transform),
    Command(EditorCommand),
}

/// Outcome of restoring a scene document; one entry per document object.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub restored: Vec<String>,
    pub failed: Vec<(String, ImportError)>,
}

pub struct Editor<L, B> {
    state: EditorState,
    catalog: AssetCatalog,
    importer: ModelImporter<L>,
    backend: B,
    camera: OrbitCamera,
    viewport: (u32, u32),
}

impl<L: ModelLoader, B: RenderBackend> Editor<L, B> {
    /// Read the manifest and bootstrap the environment. Neither failure is
    /// fatal: the editor starts with whatever it could load.
    pub fn new(config: &EditorConfig, loader: L, backend: B) -> Self {
        let catalog = AssetCatalog::load_or_empty(&config.manifest_path);
        let mut editor = Self::from_parts(catalog, loader, &config.asset_root, backend);
        editor.viewport = (config.viewport[0], config.viewport[1]);
        if let Some(path) = &config.environment_asset {
            editor.bootstrap_environment(path, &config.environment_name);
        }
        editor
    }

    pub fn from_parts(
        catalog: AssetCatalog,
        loader: L,
        asset_root: impl Into<PathBuf>,
        backend: B,
    ) -> Self {
        Self {
            state: EditorState::default(),
            catalog,
            importer: ModelImporter::new(loader, asset_root),
            backend,
            camera: OrbitCamera::default(),
            viewport: (1280, 720),
        }
    }

    pub fn bootstrap_environment(&mut self, path: &Path, name: &str) -> Option<ObjectKey> {
        match self
            .importer
            .import_environment(&mut self.state.registry, path, name)
        {
            Ok(key) => {
                log::info!("Environment '{}' loaded from {}", name, path.display());
                Some(key)
            }
            Err(err) => {
                log::warn!("Environment unavailable: {}", err);
                None
            }
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.state.registry
    }

    pub fn selection(&self) -> &SelectionController {
        &self.state.selection
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.state
            .selection
            .selected()
            .and_then(|key| self.state.registry.get(key))
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn aspect(&self) -> f32 {
        self.viewport.0.max(1) as f32 / self.viewport.1.max(1) as f32
    }

    /// Apply one input event. Returns whether editor state changed.
    pub fn handle(&mut self, event: EditorEvent, now: Instant) -> bool {
        let aspect = self.aspect();
        let state = &mut self.state;
        let changed = match event {
            EditorEvent::Select(target) => state.selection.select(&mut state.registry, target),
            EditorEvent::Click { ndc } => {
                if state.selection.clicks_suppressed(now) {
                    log::debug!("Click suppressed by transform cooldown");
                    return false;
                }
                let candidates: Vec<ObjectKey> = state
                    .registry
                    .list(|object| object.selectable)
                    .map(|(key, _)| key)
                    .collect();
                let ray = self.camera.ray_through(ndc, aspect);
                let hits = self.backend.pick(&state.registry, &ray, &candidates);
                !matches!(
                    state.selection.click(&mut state.registry, &hits, now),
                    ClickOutcome::Suppressed | ClickOutcome::Unchanged
                )
            }
            EditorEvent::GizmoDragChanged(dragging) => {
                state
                    .selection
                    .on_drag_changed(&state.registry, dragging, now)
            }
            EditorEvent::GizmoObjectChanged(raw) => {
                state.selection.on_object_changed(&mut state.registry, raw)
            }
            EditorEvent::Command(command) => self.command(command),
        };
        self.state.controls.orbit_enabled = !self.state.selection.drag_open();
        changed
    }

    fn command(&mut self, command: EditorCommand) -> bool {
        let state = &mut self.state;
        match command {
            EditorCommand::SetMode(mode) => state.selection.set_mode(mode),
            EditorCommand::ToggleAxis(axis) => state.selection.toggle_axis(axis),
            EditorCommand::GrowGizmo => state.selection.grow_gizmo(),
            EditorCommand::ShrinkGizmo => state.selection.shrink_gizmo(),
            EditorCommand::ToggleGizmo => state.selection.toggle_gizmo(),
            EditorCommand::Reset => return state.selection.reset(&mut state.registry),
            EditorCommand::DeleteSelected => {
                let Some(object) = state.selection.delete_selected(&mut state.registry) else {
                    return false;
                };
                log::info!("Deleted '{}'", object.name);
            }
        }
        true
    }

    /// Selectable object under a viewport point, without touching the selection.
    pub fn object_at(&self, ndc: Vec2) -> Option<ObjectKey> {
        let candidates: Vec<ObjectKey> = self
            .state
            .registry
            .list(|object| object.selectable)
            .map(|(key, _)| key)
            .collect();
        let ray = self.camera.ray_through(ndc, self.aspect());
        self.backend
            .pick(&self.state.registry, &ray, &candidates)
            .first()
            .map(|hit| hit.object)
    }

    /// Feed a pointer drag of `delta_px` since drag start through the gizmo.
    pub fn drag_gizmo(&mut self, delta_px: Vec2, now: Instant) -> bool {
        let gizmo = self.state.selection.gizmo();
        let Some(start) = gizmo.drag_start() else {
            return false;
        };
        let raw = gizmo.drag_output(&start, delta_px);
        self.handle(EditorEvent::GizmoObjectChanged(raw), now)
    }

    /// Orbit the camera unless a gizmo drag (or an export) has suspended it.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) -> bool {
        if !self.state.controls.orbit_enabled {
            return false;
        }
        self.camera.orbit(yaw_delta, pitch_delta);
        true
    }

    /// Dolly forward by `amount` world units; negative backs away.
    pub fn zoom(&mut self, amount: f32) -> bool {
        if !self.state.controls.orbit_enabled {
            return false;
        }
        self.camera.nudge(0.0, 0.0, amount);
        true
    }

    /// Pull the camera back along its current view so the selection fills it.
    pub fn frame_selection(&mut self) -> bool {
        let Some(bounds) = self.selected_object().and_then(SceneObject::world_bounds) else {
            return false;
        };
        self.camera
            .frame_bounds_preserve_orientation(bounds.center(), bounds.extent());
        true
    }

    /// Fresh import of a catalog asset; the new object becomes the selection.
    pub fn import_asset(&mut self, asset_id: &str) -> Result<ObjectKey, ImportError> {
        let state = &mut self.state;
        let key = self
            .importer
            .import_asset(&mut state.registry, &self.catalog, asset_id, None)
            .map_err(|err| {
                log::warn!("Import of '{}' failed: {}", asset_id, err);
                err
            })?;
        if let Some(object) = state.registry.get(key) {
            log::info!("Imported '{}' as '{}'", asset_id, object.name);
        }
        state.selection.select(&mut state.registry, Some(key));
        Ok(key)
    }

    pub fn save_scene(&self) -> SceneDocument {
        SceneDocument::capture(&self.state.registry)
    }

    pub fn save_scene_to(&self, path: &Path) -> Result<(), SerializationError> {
        let document = self.save_scene();
        serialization::save_scene_to_file(&document, path)?;
        log::info!("Saved {} objects to {}", document.objects.len(), path.display());
        Ok(())
    }

    /// Replace every selectable, listable object with the document's.
    ///
    /// The document is validated first; a rejected document leaves the scene
    /// as it was. Each entry is then restored on its own, so one broken asset
    /// does not stop the rest. Nothing ends up selected.
    pub fn load_scene(&mut self, document: &SceneDocument) -> Result<LoadReport, SerializationError> {
        let state = &mut self.state;
        let retained: Vec<&str> = state
            .registry
            .list(|object| !object.is_persistent())
            .map(|(_, object)| object.name.as_str())
            .collect();
        document.validate(retained).map_err(|err| {
            log::warn!("Rejected scene document: {}", err);
            err
        })?;

        state.selection.select(&mut state.registry, None);
        let removed = state.registry.remove_where(SceneObject::is_persistent);
        log::debug!("Cleared {} objects before restore", removed.len());

        let mut report = LoadReport::default();
        for entry in &document.objects {
            let placement = entry.placement();
            match self.importer.import_asset(
                &mut state.registry,
                &self.catalog,
                &entry.original_file,
                Some(&placement),
            ) {
                Ok(_) => report.restored.push(entry.name.clone()),
                Err(err) => {
                    log::warn!("Could not restore '{}': {}", entry.name, err);
                    report.failed.push((entry.name.clone(), err));
                }
            }
        }
        log::info!(
            "Scene loaded: {} restored, {} failed",
            report.restored.len(),
            report.failed.len()
        );
        Ok(report)
    }

    pub fn load_scene_from(&mut self, path: &Path) -> Result<LoadReport, SerializationError> {
        let document = serialization::load_scene_from_file(path).map_err(|err| {
            log::warn!("Could not read {}: {}", path.display(), err);
            err
        })?;
        self.load_scene(&document)
    }

    /// Per-frame update: the overlay always reflects this frame's transforms.
    pub fn tick(&mut self) {
        self.state.selection.refresh_overlay(&mut self.state.registry);
    }

    pub fn render(&mut self) -> Result<Framebuffer, RenderError> {
        let (width, height) = self.viewport;
        self.render_at(width, height)
    }

    /// Render the current view at a resolution other than the viewport's,
    /// e.g. a reduced preview that gets stretched over the window.
    pub fn render_at(&mut self, width: u32, height: u32) -> Result<Framebuffer, RenderError> {
        let state = &self.state;
        let gizmo = state.selection.gizmo();
        let marker = gizmo
            .attached()
            .filter(|_| gizmo.visible())
            .and_then(|key| state.registry.get(key))
            .map(|object| GizmoMarker {
                origin: object.transform.position,
                size: gizmo.size(),
                axes: gizmo.axes(),
            });
        let view = RenderView {
            registry: &state.registry,
            camera: &self.camera,
            width,
            height,
            overlay: state.selection.overlay().bounds(),
            helpers_visible: state.controls.helpers_visible,
            gizmo: marker,
            clear: None,
        };
        self.backend.render(&view)
    }

    pub fn export_all(&mut self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        export::export_all(
            &mut self.state,
            &mut self.backend,
            &self.camera,
            self.viewport,
            dir,
            &mut rand::thread_rng(),
        )
        .map_err(|err| {
            log::warn!("Export failed: {}", err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RayCastRenderer;
    use crate::scene::import::test_support::CubeLoader;
    use crate::scene::serialization::ObjectSnapshot;
    use glam::Vec3;
    use std::time::Duration;

    type TestEditor = Editor<CubeLoader, RayCastRenderer>;

    fn editor() -> TestEditor {
        let catalog = AssetCatalog::new(vec![
            "chair.glb".to_string(),
            "table_001.glb".to_string(),
            "broken_lamp.glb".to_string(),
        ]);
        let mut editor = Editor::from_parts(catalog, CubeLoader::default(), "geo", RayCastRenderer);
        editor
            .bootstrap_environment(Path::new("geoBase/floor.gltf"), "environment")
            .unwrap();
        editor
    }

    fn names(editor: &TestEditor) -> Vec<String> {
        editor
            .registry()
            .list(|object| object.listable)
            .map(|(_, object)| object.name.clone())
            .collect()
    }

    fn delete(editor: &mut TestEditor, name: &str, now: Instant) {
        let key = editor.registry().find(name).unwrap();
        editor.handle(EditorEvent::Select(Some(key)), now);
        assert!(editor.handle(EditorEvent::Command(EditorCommand::DeleteSelected), now));
    }

    #[test]
    fn repeated_imports_never_collide() {
        let mut editor = editor();
        let now = Instant::now();
        editor.import_asset("chair.glb").unwrap();
        editor.import_asset("chair.glb").unwrap();
        assert_eq!(names(&editor), ["chair_001", "chair_002"]);

        delete(&mut editor, "chair_001", now);
        // Name allocation sees chair_001 free again and chair_002 still taken.
        editor.import_asset("chair.glb").unwrap();
        editor.import_asset("chair.glb").unwrap();
        assert_eq!(names(&editor), ["chair_002", "chair_001", "chair_003"]);

        editor.import_asset("table_001.glb").unwrap();
        assert_eq!(editor.selected_object().unwrap().name, "table_001");
    }

    #[test]
    fn fresh_import_selects_and_failed_import_changes_nothing() {
        let mut editor = editor();
        let key = editor.import_asset("chair.glb").unwrap();
        assert_eq!(editor.selection().selected(), Some(key));

        let before = editor.registry().len();
        assert!(matches!(
            editor.import_asset("broken_lamp.glb"),
            Err(ImportError::Asset(_))
        ));
        assert!(matches!(
            editor.import_asset("sofa.glb"),
            Err(ImportError::NotInCatalog(_))
        ));
        assert_eq!(editor.registry().len(), before);
        assert_eq!(editor.selection().selected(), Some(key));
    }

    #[test]
    fn delete_command_clears_selection_and_gizmo() {
        let mut editor = editor();
        editor.import_asset("chair.glb").unwrap();
        assert!(editor.handle(
            EditorEvent::Command(EditorCommand::DeleteSelected),
            Instant::now()
        ));
        assert_eq!(editor.selection().selected(), None);
        assert_eq!(editor.selection().gizmo().attached(), None);
        assert!(names(&editor).is_empty());
        assert!(!editor.handle(
            EditorEvent::Command(EditorCommand::DeleteSelected),
            Instant::now()
        ));
    }

    #[test]
    fn save_load_roundtrip_preserves_tuples_and_environment() {
        let mut editor = editor();
        let now = Instant::now();
        editor.import_asset("chair.glb").unwrap();
        editor.handle(
            EditorEvent::GizmoObjectChanged(Transform::from_arrays(
                [1.5, 0.0, -2.0],
                [0.0, 0.75, 0.0],
                [1.0, 2.0, 1.0],
            )),
            now,
        );
        editor.import_asset("table_001.glb").unwrap();
        editor.import_asset("chair.glb").unwrap();

        let saved = editor.save_scene();
        assert_eq!(saved.objects.len(), 3);
        assert!(saved.objects.iter().all(|entry| entry.name != "environment"));

        // Scramble the live scene before restoring.
        delete(&mut editor, "table_001", now);
        editor.import_asset("chair.glb").unwrap();

        let json = saved.to_json().unwrap();
        let report = editor
            .load_scene(&SceneDocument::from_json(&json).unwrap())
            .unwrap();
        assert!(report.failed.is_empty());
        assert_eq!(editor.save_scene(), saved);
        assert_eq!(editor.selection().selected(), None);
        assert!(editor.registry().find("environment").is_some());
        assert_eq!(editor.registry().len(), 4);
    }

    #[test]
    fn invalid_document_leaves_scene_untouched() {
        let mut editor = editor();
        editor.import_asset("chair.glb").unwrap();
        let before = editor.save_scene();

        let bad = SceneDocument {
            objects: vec![
                ObjectSnapshot {
                    name: "chair_009".to_string(),
                    original_file: "chair.glb".to_string(),
                    position: [0.0; 3],
                    rotation: [0.0; 3],
                    scale: [1.0; 3],
                },
                ObjectSnapshot {
                    name: "environment".to_string(),
                    original_file: "chair.glb".to_string(),
                    position: [0.0; 3],
                    rotation: [0.0; 3],
                    scale: [1.0; 3],
                },
            ],
        };
        assert!(matches!(
            editor.load_scene(&bad),
            Err(SerializationError::Invalid { index: 1, .. })
        ));
        assert_eq!(editor.save_scene(), before);
        assert!(editor.selection().selected().is_some());
    }

    #[test]
    fn one_broken_entry_does_not_abort_restore() {
        let mut editor = editor();
        let entry = |name: &str, file: &str| ObjectSnapshot {
            name: name.to_string(),
            original_file: file.to_string(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        };
        let document = SceneDocument {
            objects: vec![
                entry("chair_001", "chair.glb"),
                entry("lamp_001", "broken_lamp.glb"),
                entry("table_004", "table_001.glb"),
            ],
        };
        let report = editor.load_scene(&document).unwrap();
        assert_eq!(report.restored, ["chair_001", "table_004"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "lamp_001");
        assert_eq!(names(&editor), ["chair_001", "table_004"]);
    }

    #[test]
    fn viewport_click_picks_and_deselects() {
        let mut editor = editor();
        editor.import_asset("chair.glb").unwrap();
        editor.handle(EditorEvent::Select(None), Instant::now());

        let now = Instant::now();
        assert!(editor.handle(EditorEvent::Click { ndc: Vec2::ZERO }, now));
        assert_eq!(editor.selected_object().unwrap().name, "chair_001");

        // The corner ray only meets the environment, which is never a candidate.
        assert!(editor.handle(EditorEvent::Click { ndc: Vec2::new(0.0, -0.95) }, now));
        assert_eq!(editor.selection().selected(), None);
    }

    #[test]
    fn click_right_after_drag_is_ignored() {
        let mut editor = editor();
        editor.import_asset("chair.glb").unwrap();
        editor.import_asset("chair.glb").unwrap();
        let second = editor.selection().selected().unwrap();
        let start = Instant::now();

        assert!(editor.handle(EditorEvent::GizmoDragChanged(true), start));
        assert!(!editor.state().controls.orbit_enabled);
        assert!(!editor.orbit(0.1, 0.0));
        assert!(editor.handle(EditorEvent::GizmoDragChanged(false), start));
        assert!(editor.state().controls.orbit_enabled);

        // The corner ray misses both chairs, so an accepted click deselects.
        let early = start + Duration::from_millis(120);
        assert!(!editor.handle(EditorEvent::Click { ndc: Vec2::new(0.9, 0.9) }, early));
        assert_eq!(editor.selection().selected(), Some(second));

        let late = start + Duration::from_millis(210);
        assert!(editor.handle(EditorEvent::Click { ndc: Vec2::new(0.9, 0.9) }, late));
        assert_eq!(editor.selection().selected(), None);
    }

    #[test]
    fn space_mid_drag_does_not_turn_pointer_up_into_a_click() {
        let mut editor = editor();
        let key = editor.import_asset("chair.glb").unwrap();
        let start = Instant::now();

        assert!(editor.handle(EditorEvent::GizmoDragChanged(true), start));
        editor.handle(EditorEvent::Command(EditorCommand::ToggleGizmo), start);
        assert!(!editor.state().controls.orbit_enabled);

        let release = start + Duration::from_millis(600);
        assert!(editor.handle(EditorEvent::GizmoDragChanged(false), release));
        assert!(editor.state().controls.orbit_enabled);
        let pointer_up = release + Duration::from_millis(10);
        assert!(!editor.handle(EditorEvent::Click { ndc: Vec2::new(0.9, 0.9) }, pointer_up));
        assert_eq!(editor.selection().selected(), Some(key));
    }

    #[test]
    fn inventory_selection_ignores_cooldown() {
        let mut editor = editor();
        let first = editor.import_asset("chair.glb").unwrap();
        editor.import_asset("chair.glb").unwrap();
        let now = Instant::now();
        editor.handle(EditorEvent::GizmoDragChanged(true), now);
        editor.handle(EditorEvent::GizmoDragChanged(false), now);

        assert!(editor.handle(EditorEvent::Select(Some(first)), now));
        assert_eq!(editor.selection().selected(), Some(first));
    }

    #[test]
    fn rotate_drag_yields_pure_yaw() {
        let mut editor = editor();
        let key = editor.import_asset("chair.glb").unwrap();
        let now = Instant::now();
        editor.handle(
            EditorEvent::Command(EditorCommand::SetMode(InteractionMode::Rotate)),
            now,
        );
        editor.handle(EditorEvent::GizmoDragChanged(true), now);
        assert!(editor.drag_gizmo(Vec2::new(80.0, -45.0), now));
        editor.handle(EditorEvent::GizmoDragChanged(false), now);

        let q = editor.registry().get(key).unwrap().transform.orientation();
        assert!(q.x.abs() < 1e-5 && q.z.abs() < 1e-5);
        assert!(q.y.abs() > 0.1);
    }

    #[test]
    fn overlay_follows_edits_within_the_frame() {
        let mut editor = editor();
        editor.import_asset("chair.glb").unwrap();
        editor.handle(
            EditorEvent::GizmoObjectChanged(Transform::from_arrays(
                [3.0, 0.0, 0.0],
                [0.0; 3],
                [1.0; 3],
            )),
            Instant::now(),
        );
        editor.tick();
        let bounds = editor.selection().overlay().bounds().unwrap();
        assert!((bounds.center() - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn missing_environment_is_not_fatal() {
        let config = EditorConfig {
            manifest_path: PathBuf::from("/nonexistent/setdress/file-list.json"),
            environment_asset: Some(PathBuf::from("geoBase/broken_environment.gltf")),
            ..EditorConfig::default()
        };
        let editor: TestEditor = Editor::new(&config, CubeLoader::default(), RayCastRenderer);
        assert!(editor.registry().is_empty());
        assert!(editor.catalog().is_empty());
    }

    #[test]
    fn viewport_render_shows_selection_overlay() {
        let mut editor = editor();
        editor.set_viewport(40, 30);
        editor.import_asset("chair.glb").unwrap();
        let frame = editor.render().unwrap();
        assert!(frame.pixels.contains(&crate::render::OVERLAY_COLOR));
    }

    #[test]
    fn reduced_preview_keeps_viewport_and_framing() {
        let mut editor = editor();
        editor.set_viewport(80, 60);
        editor.import_asset("chair.glb").unwrap();
        let full = editor.render().unwrap();
        let preview = editor.render_at(20, 15).unwrap();
        assert_eq!((preview.width, preview.height), (20, 15));
        assert_eq!(editor.viewport(), (80, 60));
        // Same camera and aspect, so the chair covers the center of both.
        assert_ne!(full.get(40, 30), Some(crate::render::BACKGROUND));
        assert_ne!(preview.get(10, 7), Some(crate::render::BACKGROUND));
        assert!(preview.pixels.contains(&crate::render::OVERLAY_COLOR));
    }

    #[test]
    fn frame_selection_needs_a_selection() {
        let mut editor = editor();
        assert!(!editor.frame_selection());

        editor.import_asset("chair.glb").unwrap();
        let yaw = editor.camera.yaw;
        assert!(editor.frame_selection());
        assert!((editor.camera.yaw - yaw).abs() < 1e-6);
        assert!((editor.camera.position.length() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn object_at_leaves_selection_alone() {
        let mut editor = editor();
        let key = editor.import_asset("chair.glb").unwrap();
        editor.handle(EditorEvent::Select(None), Instant::now());
        assert_eq!(editor.object_at(Vec2::ZERO), Some(key));
        assert_eq!(editor.object_at(Vec2::new(0.95, 0.95)), None);
        assert_eq!(editor.selection().selected(), None);
    }
}
