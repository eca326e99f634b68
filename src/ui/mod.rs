//! Editor panels drawn with egui over the viewport: the object inventory,
//! the importable asset list and a bottom bar with scene actions.

use crate::assets::AssetCatalog;
use crate::editor::gizmo::InteractionMode;
use crate::editor::{EditorCommand, EditorState};
use crate::scene::{ObjectKey, SceneRegistry};

const MODES: [InteractionMode; 3] = [
    InteractionMode::Translate,
    InteractionMode::Rotate,
    InteractionMode::Scale,
];

/// One listable object as the inventory shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub key: ObjectKey,
    pub name: String,
    pub selected: bool,
}

/// Listable objects in registry order; the environment never shows up here.
pub fn inventory_rows(registry: &SceneRegistry, selected: Option<ObjectKey>) -> Vec<InventoryRow> {
    registry
        .list(|object| object.listable)
        .map(|(key, object)| InventoryRow {
            key,
            name: object.name.clone(),
            selected: Some(key) == selected,
        })
        .collect()
}

/// Row after the selected one, wrapping; the first row when nothing is selected.
pub fn next_row(rows: &[InventoryRow]) -> Option<ObjectKey> {
    let next = match rows.iter().position(|row| row.selected) {
        Some(index) => (index + 1) % rows.len(),
        None => 0,
    };
    rows.get(next).map(|row| row.key)
}

/// What a panel click asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Select(ObjectKey),
    /// Zero-based catalog index.
    Import(usize),
    Command(EditorCommand),
    SaveScene,
    LoadScene,
    ExportPasses,
}

pub struct UiState {
    show_inventory: bool,
    status: String,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            show_inventory: true,
            status: String::new(),
        }
    }

    /// Draw every panel for this frame and collect the clicks.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        state: &EditorState,
        catalog: &AssetCatalog,
    ) -> Vec<UiAction> {
        let mut actions = Vec::new();

        egui::TopBottomPanel::bottom("scene_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    actions.push(UiAction::SaveScene);
                }
                if ui.button("Load").clicked() {
                    actions.push(UiAction::LoadScene);
                }
                if ui.button("Export").clicked() {
                    actions.push(UiAction::ExportPasses);
                }
                ui.separator();
                let current = state.selection.gizmo().mode();
                for mode in MODES {
                    if ui.selectable_label(mode == current, mode.label()).clicked() {
                        actions.push(UiAction::Command(EditorCommand::SetMode(mode)));
                    }
                }
                ui.separator();
                ui.label(&self.status);
            });
        });

        if self.show_inventory {
            egui::Window::new("Objects")
                .default_pos([12.0, 12.0])
                .default_width(180.0)
                .resizable(false)
                .show(ctx, |ui| {
                    let rows = inventory_rows(&state.registry, state.selection.selected());
                    if rows.is_empty() {
                        ui.weak("(none)");
                    }
                    egui::ScrollArea::vertical()
                        .id_salt("inventory_scroll")
                        .max_height(320.0)
                        .show(ui, |ui| {
                            if let Some(key) = inventory_list(ui, &rows) {
                                actions.push(UiAction::Select(key));
                            }
                        });
                });
        }

        egui::Window::new("Import")
            .default_pos([ctx.screen_rect().right() - 200.0, 12.0])
            .default_width(180.0)
            .resizable(false)
            .show(ctx, |ui| {
                if catalog.is_empty() {
                    ui.weak("(manifest empty)");
                }
                egui::ScrollArea::vertical()
                    .id_salt("import_scroll")
                    .max_height(320.0)
                    .show(ui, |ui| {
                        if let Some(index) = asset_list(ui, catalog.files()) {
                            actions.push(UiAction::Import(index));
                        }
                    });
            });

        actions
    }

    pub fn toggle_inventory(&mut self) {
        self.show_inventory = !self.show_inventory;
    }

    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

/// One selectable label per row; returns the clicked row's key.
fn inventory_list(ui: &mut egui::Ui, rows: &[InventoryRow]) -> Option<ObjectKey> {
    let mut clicked = None;
    for row in rows {
        if ui.selectable_label(row.selected, &row.name).clicked() {
            clicked = Some(row.key);
        }
    }
    clicked
}

fn asset_list(ui: &mut egui::Ui, assets: &[String]) -> Option<usize> {
    let mut clicked = None;
    for (index, asset) in assets.iter().enumerate() {
        if ui.button(asset).clicked() {
            clicked = Some(index);
        }
    }
    clicked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Mesh, Model, SceneObject, Transform};
    use glam::Vec3;

    fn cube() -> Model {
        Model::single_mesh("cube", Mesh::cuboid(Vec3::splat(0.5), Default::default()))
    }

    fn registry() -> (SceneRegistry, Vec<ObjectKey>) {
        let mut registry = SceneRegistry::new();
        registry
            .add(SceneObject::environment("environment".to_string(), cube()))
            .unwrap();
        let keys = ["chair_001", "table_001", "chair_002"]
            .into_iter()
            .map(|name| {
                registry
                    .add(SceneObject::placed(
                        name.to_string(),
                        "chair.glb".to_string(),
                        Transform::default(),
                        cube(),
                    ))
                    .unwrap()
            })
            .collect();
        (registry, keys)
    }

    fn raw_input(events: Vec<egui::Event>) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(400.0, 300.0),
            )),
            events,
            ..Default::default()
        }
    }

    /// Lays `draw` out in a central panel, then presses and releases the
    /// primary button at `pos` over the next two frames.
    fn click_at<T>(pos: egui::Pos2, mut draw: impl FnMut(&mut egui::Ui) -> Option<T>) -> Option<T> {
        let ctx = egui::Context::default();
        let button = |pressed| egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        };
        let frames = [
            Vec::new(),
            vec![egui::Event::PointerMoved(pos), button(true)],
            vec![button(false)],
        ];
        let mut result = None;
        for events in frames {
            let _ = ctx.run(raw_input(events), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    if let Some(value) = draw(ui) {
                        result = Some(value);
                    }
                });
            });
        }
        result
    }

    #[test]
    fn rows_skip_environment_and_mark_selection() {
        let (registry, keys) = registry();
        let rows = inventory_rows(&registry, Some(keys[1]));
        let names: Vec<_> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["chair_001", "table_001", "chair_002"]);
        assert_eq!(
            rows.iter().filter(|row| row.selected).map(|row| row.key).collect::<Vec<_>>(),
            [keys[1]]
        );
    }

    #[test]
    fn next_row_wraps_around() {
        let (registry, keys) = registry();
        assert_eq!(next_row(&inventory_rows(&registry, None)), Some(keys[0]));
        assert_eq!(next_row(&inventory_rows(&registry, Some(keys[0]))), Some(keys[1]));
        assert_eq!(next_row(&inventory_rows(&registry, Some(keys[2]))), Some(keys[0]));
        assert_eq!(next_row(&[]), None);
    }

    #[test]
    fn clicking_an_inventory_row_picks_its_key() {
        let (registry, keys) = registry();
        let rows = inventory_rows(&registry, None);
        // Rows are 18pt tall with 3pt spacing below the panel's 8pt margin.
        let clicked = click_at(egui::pos2(14.0, 38.0), |ui| inventory_list(ui, &rows));
        assert_eq!(clicked, Some(keys[1]));
    }

    #[test]
    fn clicking_an_asset_picks_its_catalog_index() {
        let assets = vec!["chair.glb".to_string(), "table_001.glb".to_string()];
        let clicked = click_at(egui::pos2(14.0, 17.0), |ui| asset_list(ui, &assets));
        assert_eq!(clicked, Some(0));
        let missed = click_at(egui::pos2(14.0, 250.0), |ui| asset_list(ui, &assets));
        assert_eq!(missed, None);
    }

    #[test]
    fn idle_frame_draws_panels_without_actions() {
        let (registry, keys) = registry();
        let mut state = EditorState {
            registry,
            ..EditorState::default()
        };
        state.selection.select(&mut state.registry, Some(keys[2]));
        let catalog = AssetCatalog::new(vec!["chair.glb".to_string()]);
        let mut ui = UiState::new();
        ui.set_status("Saved scene.json".to_string());

        let ctx = egui::Context::default();
        let mut actions = Vec::new();
        let output = ctx.run(raw_input(Vec::new()), |ctx| {
            actions = ui.show(ctx, &state, &catalog);
        });
        assert!(actions.is_empty());
        assert!(!output.shapes.is_empty());

        ui.toggle_inventory();
        let _ = ctx.run(raw_input(Vec::new()), |ctx| {
            actions = ui.show(ctx, &state, &catalog);
        });
        assert!(actions.is_empty());
    }
}
