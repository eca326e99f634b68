use crate::editor::gizmo::{Axis, InteractionMode};
use crate::editor::EditorCommand;
use crate::scene::ObjectKey;
use crate::ui::UiAction;
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Editor(EditorCommand),
    SaveScene,
    LoadScene,
    ExportPasses,
    CycleSelection,
    /// Inventory click.
    Select(ObjectKey),
    ToggleInventory,
    /// Zero-based catalog index.
    Import(usize),
    ZoomIn,
    ZoomOut,
    FrameSelection,
    /// Write the current viewport to a PNG.
    Snapshot,
}

impl From<UiAction> for InputAction {
    fn from(action: UiAction) -> Self {
        match action {
            UiAction::Select(key) => InputAction::Select(key),
            UiAction::Import(index) => InputAction::Import(index),
            UiAction::Command(command) => InputAction::Editor(command),
            UiAction::SaveScene => InputAction::SaveScene,
            UiAction::LoadScene => InputAction::LoadScene,
            UiAction::ExportPasses => InputAction::ExportPasses,
        }
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    pub ctrl: bool,
}

impl InputState {
    /// Map a key press to an action. Releases never act.
    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> InputAction {
        let PhysicalKey::Code(code) = key else {
            return InputAction::None;
        };
        if matches!(code, KeyCode::ControlLeft | KeyCode::ControlRight) {
            self.ctrl = pressed;
        }
        if !pressed {
            return InputAction::None;
        }
        if self.ctrl {
            return match code {
                KeyCode::KeyS => InputAction::SaveScene,
                KeyCode::KeyO => InputAction::LoadScene,
                KeyCode::KeyP => InputAction::ExportPasses,
                _ => InputAction::None,
            };
        }
        let command = match code {
            KeyCode::KeyW => EditorCommand::SetMode(InteractionMode::Translate),
            KeyCode::KeyE => EditorCommand::SetMode(InteractionMode::Rotate),
            KeyCode::KeyR => EditorCommand::SetMode(InteractionMode::Scale),
            KeyCode::KeyX => EditorCommand::ToggleAxis(Axis::X),
            KeyCode::KeyY => EditorCommand::ToggleAxis(Axis::Y),
            KeyCode::KeyZ => EditorCommand::ToggleAxis(Axis::Z),
            KeyCode::Equal | KeyCode::NumpadAdd => EditorCommand::GrowGizmo,
            KeyCode::Minus | KeyCode::NumpadSubtract => EditorCommand::ShrinkGizmo,
            KeyCode::Space => EditorCommand::ToggleGizmo,
            KeyCode::Escape => EditorCommand::Reset,
            KeyCode::Delete | KeyCode::Backspace => EditorCommand::DeleteSelected,
            KeyCode::Tab => return InputAction::CycleSelection,
            KeyCode::KeyI => return InputAction::ToggleInventory,
            KeyCode::PageUp => return InputAction::ZoomIn,
            KeyCode::PageDown => return InputAction::ZoomOut,
            KeyCode::KeyF => return InputAction::FrameSelection,
            KeyCode::F12 => return InputAction::Snapshot,
            other => {
                return digit_index(other).map_or(InputAction::None, InputAction::Import);
            }
        };
        InputAction::Editor(command)
    }
}

fn digit_index(code: KeyCode) -> Option<usize> {
    let index = match code {
        KeyCode::Digit1 | KeyCode::Numpad1 => 0,
        KeyCode::Digit2 | KeyCode::Numpad2 => 1,
        KeyCode::Digit3 | KeyCode::Numpad3 => 2,
        KeyCode::Digit4 | KeyCode::Numpad4 => 3,
        KeyCode::Digit5 | KeyCode::Numpad5 => 4,
        KeyCode::Digit6 | KeyCode::Numpad6 => 5,
        KeyCode::Digit7 | KeyCode::Numpad7 => 6,
        KeyCode::Digit8 | KeyCode::Numpad8 => 7,
        KeyCode::Digit9 | KeyCode::Numpad9 => 8,
        _ => return None,
    };
    Some(index)
}
