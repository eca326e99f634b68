mod egui_host;
mod input;
mod timing;

use crate::assets::GltfLoader;
use crate::config::EditorConfig;
use crate::editor::{Editor, EditorEvent};
use crate::export;
use crate::render::surface::{PaintJobs, WindowSurface};
use crate::render::{pointer_to_ndc, RayCastRenderer};
use crate::ui::{self, UiState};
use egui_host::EguiHost;
use input::{InputAction, InputState};
use timing::FrameTiming;

use glam::Vec2;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

const TITLE: &str = "Set Dressing";
/// Pointer travel below this many pixels still counts as a click.
const CLICK_SLOP_PX: f32 = 4.0;
const ORBIT_PER_PIXEL: f32 = 0.005;
const ZOOM_STEP: f32 = 0.3;

/// Left button press in progress.
struct PointerPress {
    origin: Vec2,
    last: Vec2,
    /// Started on the selected object, so it drives the gizmo.
    gizmo: bool,
}

pub struct App {
    window: Option<Arc<Window>>,
    surface: Option<WindowSurface>,
    egui: Option<EguiHost>,
    /// Editor state changed since the preview was last rendered.
    viewport_dirty: bool,
    config: EditorConfig,
    editor: Editor<GltfLoader, RayCastRenderer>,
    ui: UiState,
    input: InputState,
    pointer: Option<Vec2>,
    press: Option<PointerPress>,
    timing: FrameTiming,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new(config: EditorConfig) -> Self {
        let editor = Editor::new(&config, GltfLoader, RayCastRenderer);
        log::info!(
            "{} importable assets, {} objects at startup",
            editor.catalog().len(),
            editor.registry().len()
        );
        Self {
            window: None,
            surface: None,
            egui: None,
            viewport_dirty: true,
            config,
            editor,
            ui: UiState::new(),
            input: InputState::default(),
            pointer: None,
            press: None,
            timing: FrameTiming::new(TITLE.to_string()),
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.editor.set_viewport(new_size.width, new_size.height);
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(new_size.width, new_size.height);
        }
        self.viewport_dirty = true;
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn ndc(&self, pointer: Vec2) -> Vec2 {
        let (width, height) = self.editor.viewport();
        pointer_to_ndc(pointer.x, pointer.y, width, height)
    }

    /// Re-render the preview into the egui viewport texture.
    fn refresh_viewport(&mut self) {
        let Some(egui) = self.egui.as_mut() else {
            return;
        };
        let (width, height) = self.editor.viewport();
        let divisor = self.config.preview_divisor.max(1);
        match self
            .editor
            .render_at((width / divisor).max(1), (height / divisor).max(1))
        {
            Ok(frame) => egui.set_viewport_image(&frame),
            Err(err) => log::warn!("Viewport render failed: {}", err),
        }
        self.viewport_dirty = false;
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        self.editor.tick();
        if self.viewport_dirty {
            self.refresh_viewport();
        }

        let Some(window) = self.window.clone() else {
            return;
        };
        let mut actions = Vec::new();
        if let Some(egui) = self.egui.as_mut() {
            let ui = &mut self.ui;
            let editor = &self.editor;
            let jobs = egui.run_ui(&window, |ctx| {
                actions = ui.show(ctx, editor.state(), editor.catalog());
            });
            self.present(event_loop, &jobs);
        }
        for action in actions {
            self.handle_action(action.into());
        }

        let selection = self.editor.selected_object().map(|object| object.name.clone());
        let mode = self.editor.selection().gizmo().mode().label();
        self.timing
            .update(Some(window.as_ref()), now, selection.as_deref(), mode);
    }

    fn present(&mut self, event_loop: &ActiveEventLoop, jobs: &PaintJobs) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match surface.present(jobs) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(err) => log::warn!("Frame skipped: {}", err),
        }
    }

    fn handle_left_button(&mut self, pressed: bool) {
        let Some(pointer) = self.pointer else {
            return;
        };
        let now = Instant::now();
        if pressed {
            let ndc = self.ndc(pointer);
            let selected = self.editor.selection().selected();
            let on_selection = selected.is_some()
                && self.editor.selection().gizmo().interactive()
                && self.editor.object_at(ndc) == selected;
            if on_selection {
                self.editor.handle(EditorEvent::GizmoDragChanged(true), now);
            }
            self.press = Some(PointerPress {
                origin: pointer,
                last: pointer,
                gizmo: on_selection,
            });
            return;
        }

        let Some(press) = self.press.take() else {
            return;
        };
        if press.gizmo {
            self.editor.handle(EditorEvent::GizmoDragChanged(false), now);
        }
        // A gizmo release always reaches the click handler, where the
        // cooldown swallows it; an orbit drag never counts as a click.
        if press.gizmo || pointer.distance(press.origin) < CLICK_SLOP_PX {
            let ndc = self.ndc(pointer);
            self.editor.handle(EditorEvent::Click { ndc }, now);
        }
        self.viewport_dirty = true;
    }

    fn handle_pointer_moved(&mut self, pointer: Vec2) {
        self.pointer = Some(pointer);
        let Some(press) = self.press.as_mut() else {
            return;
        };
        let delta = pointer - press.last;
        press.last = pointer;
        self.viewport_dirty = true;
        if press.gizmo {
            let total = pointer - press.origin;
            self.editor.drag_gizmo(total, Instant::now());
        } else {
            self.editor
                .orbit(-delta.x * ORBIT_PER_PIXEL, -delta.y * ORBIT_PER_PIXEL);
        }
    }

    fn handle_action(&mut self, action: InputAction) {
        let now = Instant::now();
        match action {
            InputAction::None => return,
            InputAction::Editor(command) => {
                self.editor.handle(EditorEvent::Command(command), now);
            }
            InputAction::SaveScene => self.handle_save_scene_action(),
            InputAction::LoadScene => self.handle_load_scene_action(),
            InputAction::ExportPasses => self.handle_export_action(),
            InputAction::Select(key) => {
                self.editor.handle(EditorEvent::Select(Some(key)), now);
            }
            InputAction::CycleSelection => {
                let rows =
                    ui::inventory_rows(self.editor.registry(), self.editor.selection().selected());
                if let Some(key) = ui::next_row(&rows) {
                    self.editor.handle(EditorEvent::Select(Some(key)), now);
                }
            }
            InputAction::ToggleInventory => self.ui.toggle_inventory(),
            InputAction::Import(index) => {
                let Some(asset) = self.editor.catalog().get(index).map(str::to_string) else {
                    return;
                };
                match self.editor.import_asset(&asset) {
                    Ok(_) => self.ui.set_status(format!("Imported {}", asset)),
                    Err(err) => self.ui.set_status(format!("Import failed: {}", err)),
                }
            }
            InputAction::ZoomIn => {
                self.editor.zoom(ZOOM_STEP);
            }
            InputAction::ZoomOut => {
                self.editor.zoom(-ZOOM_STEP);
            }
            InputAction::FrameSelection => {
                self.editor.frame_selection();
            }
            InputAction::Snapshot => self.handle_snapshot_action(),
        }
        self.viewport_dirty = true;
    }

    fn handle_save_scene_action(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Scene", &["json"])
            .set_file_name("scene.json")
            .save_file()
        else {
            return;
        };
        match self.editor.save_scene_to(&path) {
            Ok(()) => self.ui.set_status(format!("Saved {}", path.display())),
            Err(err) => self.ui.set_status(format!("Save failed: {}", err)),
        }
    }

    fn handle_load_scene_action(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Scene", &["json"])
            .pick_file()
        else {
            return;
        };
        match self.editor.load_scene_from(&path) {
            Ok(report) if report.failed.is_empty() => self
                .ui
                .set_status(format!("Loaded {} objects", report.restored.len())),
            Ok(report) => {
                let failed: Vec<&str> = report.failed.iter().map(|(name, _)| name.as_str()).collect();
                self.ui.set_status(format!(
                    "Loaded {} objects; missing: {}",
                    report.restored.len(),
                    failed.join(", ")
                ));
            }
            Err(err) => self.ui.set_status(format!("Load failed: {}", err)),
        }
    }

    fn handle_export_action(&mut self) {
        let dir = self.config.export_dir.clone();
        match self.editor.export_all(&dir) {
            Ok(files) => self
                .ui
                .set_status(format!("Exported {} files to {}", files.len(), dir.display())),
            Err(err) => self.ui.set_status(format!("Export failed: {}", err)),
        }
    }

    fn handle_snapshot_action(&mut self) {
        let path = self.config.export_dir.join("viewport.png");
        let written = std::fs::create_dir_all(&self.config.export_dir)
            .map_err(export::ExportError::from)
            .and_then(|()| {
                let frame = self.editor.render()?;
                export::write_png(&frame, &path)
            });
        match written {
            Ok(()) => {
                log::info!("Viewport written to {}", path.display());
                self.ui.set_status(format!("Saved {}", path.display()));
            }
            Err(err) => {
                log::warn!("Viewport snapshot failed: {}", err);
                self.ui.set_status(format!("Snapshot failed: {}", err));
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let [width, height] = self.config.viewport;
        let window_attrs = WindowAttributes::default()
            .with_title(TITLE)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(true);

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        match WindowSurface::new(window.clone()) {
            Ok(surface) => self.surface = Some(surface),
            Err(err) => {
                log::error!("Cannot present to the window: {}", err);
                event_loop.exit();
                return;
            }
        }
        self.egui = Some(EguiHost::new(&window));
        self.handle_resize(window.inner_size());
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // A press or scroll over a panel stays with egui; releases always
        // reach the editor so a drag that started in the viewport ends.
        let consumed = match (self.egui.as_mut(), self.window.as_deref()) {
            (Some(egui), Some(window)) => egui.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(false) => {
                self.input = InputState::default();
                self.pointer = None;
            }
            WindowEvent::KeyboardInput { .. } if consumed => {}
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                let action = self.input.handle_key(event.physical_key, pressed);
                self.handle_action(action);
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } if consumed => {}
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.handle_left_button(state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { .. } if consumed => {}
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                };
                self.editor.zoom(lines * ZOOM_STEP);
                self.viewport_dirty = true;
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("{}", TITLE);
    log::info!("   W/E/R mode, X/Y/Z axes, Tab cycles, 1-9 import, Ctrl+S/O save/load, Ctrl+P export");

    let config = EditorConfig::from_env();
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
}
