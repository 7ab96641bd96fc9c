use std::time::Instant;

use log::info;
use shaderlab::{GraphicsBackend, Harness};
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{Key, NamedKey},
};

use crate::presets::{self, Preset};

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ReloadCurrent,
    ToggleAutoReload,
    SelectPreset(usize),
}

/// Key bindings. In ShaderToy mode letters select presets, so reload and
/// auto-reload move to `F5` and `F6`.
pub fn action_for_key(key: &Key, shadertoy: bool) -> Option<Action> {
    match key {
        Key::Named(NamedKey::Escape) => Some(Action::Quit),
        Key::Named(NamedKey::F5) if shadertoy => Some(Action::ReloadCurrent),
        Key::Named(NamedKey::F6) if shadertoy => Some(Action::ToggleAutoReload),
        Key::Character(text) => {
            let c = text.chars().next()?;
            match c.to_ascii_lowercase() {
                'r' if !shadertoy => Some(Action::ReloadCurrent),
                'a' if !shadertoy => Some(Action::ToggleAutoReload),
                _ => presets::slot_for_key(c, shadertoy).map(Action::SelectPreset),
            }
        }
        _ => None,
    }
}

/// Routes window input into the harness.
pub struct Controls {
    shadertoy: bool,
    cursor: (f32, f32),
}

impl Controls {
    pub fn new(shadertoy: bool) -> Self {
        Self {
            shadertoy,
            cursor: (0.0, 0.0),
        }
    }

    /// Returns `true` when the user asked to quit.
    pub fn handle_event<B: GraphicsBackend>(
        &mut self,
        event: &WindowEvent,
        harness: &mut Harness<B>,
        presets: &[Preset],
    ) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                harness.on_pointer_move(self.cursor.0, self.cursor.1);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed => {
                    harness.on_pointer_down(self.cursor.0, self.cursor.1, Instant::now())
                }
                ElementState::Released => harness.on_pointer_up(),
            },
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                if let Some(action) = action_for_key(&event.logical_key, self.shadertoy) {
                    return self.apply(action, harness, presets);
                }
            }
            _ => {}
        }
        false
    }

    fn apply<B: GraphicsBackend>(
        &self,
        action: Action,
        harness: &mut Harness<B>,
        presets: &[Preset],
    ) -> bool {
        match action {
            Action::Quit => return true,
            // Outcomes are logged by the program manager.
            Action::ReloadCurrent => {
                let _ = harness.reload_current();
            }
            Action::ToggleAutoReload => {
                harness.toggle_auto_reload();
            }
            Action::SelectPreset(index) => match presets.get(index) {
                Some(preset) => {
                    if harness.request_reload(preset.sources.clone()).is_ok() {
                        info!(
                            "Switched to shader {} ({})",
                            presets::key_label(index, self.shadertoy).unwrap_or('?'),
                            preset.name
                        );
                    }
                }
                None => info!("No shader bound to slot {}", index + 1),
            },
        }
        false
    }
}
