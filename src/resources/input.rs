//! Platform-agnostic pointer input
//!
//! The stage is driven entirely by the mouse: buttons, cursor position,
//! wheel and window size. Platform adapters (see
//! [`app::input_adapter`](crate::app::input_adapter)) translate native events
//! into calls on [`Input`]; the frame driver reads it once per tick.

use glam::Vec2;
use rustc_hash::FxHashSet;

/// Mouse button enumeration (platform-agnostic)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Button state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Pointer state accumulated between two frame ticks.
#[derive(Debug, Clone)]
pub struct Input {
    pressed_mouse: FxHashSet<MouseButton>,
    just_pressed_mouse: FxHashSet<MouseButton>,
    just_released_mouse: FxHashSet<MouseButton>,

    mouse_position: Vec2,
    mouse_delta: Vec2,
    cursor_moved: bool,
    scroll_delta: Vec2,

    screen_size: Vec2,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pressed_mouse: FxHashSet::default(),
            just_pressed_mouse: FxHashSet::default(),
            just_released_mouse: FxHashSet::default(),
            mouse_position: Vec2::ZERO,
            mouse_delta: Vec2::ZERO,
            cursor_moved: false,
            scroll_delta: Vec2::ZERO,
            screen_size: Vec2::ZERO,
        }
    }

    // ========== System API (called by Engine/Adapter) ==========

    /// Clears per-frame state (just pressed/released, deltas).
    pub fn start_frame(&mut self) {
        self.just_pressed_mouse.clear();
        self.just_released_mouse.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
        self.cursor_moved = false;
    }

    pub fn inject_mouse_button(&mut self, button: MouseButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                if self.pressed_mouse.insert(button) {
                    self.just_pressed_mouse.insert(button);
                }
            }
            ButtonState::Released => {
                if self.pressed_mouse.remove(&button) {
                    self.just_released_mouse.insert(button);
                }
            }
        }
    }

    /// Cursor position in physical pixels, origin top-left.
    pub fn inject_mouse_position(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        if self.cursor_moved || self.mouse_position != Vec2::ZERO {
            self.mouse_delta += new_pos - self.mouse_position;
        }
        self.mouse_position = new_pos;
        self.cursor_moved = true;
    }

    pub fn inject_scroll(&mut self, delta_x: f32, delta_y: f32) {
        self.scroll_delta += Vec2::new(delta_x, delta_y);
    }

    pub fn inject_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    // ========== User API ==========

    #[must_use]
    pub fn get_mouse_button(&self, button: MouseButton) -> bool {
        self.pressed_mouse.contains(&button)
    }

    #[must_use]
    pub fn get_mouse_button_down(&self, button: MouseButton) -> bool {
        self.just_pressed_mouse.contains(&button)
    }

    #[must_use]
    pub fn get_mouse_button_up(&self, button: MouseButton) -> bool {
        self.just_released_mouse.contains(&button)
    }

    #[must_use]
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Whether any cursor movement arrived since the last [`Input::start_frame`].
    #[must_use]
    pub fn cursor_moved(&self) -> bool {
        self.cursor_moved
    }

    #[must_use]
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    #[must_use]
    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
