//! Input state tracking
//!
//! The host feeds key and button transitions in as they arrive; controllers
//! query the current state during the frame. Per-frame edges are cleared by
//! `end_frame`, which the engine calls after every frame.

use std::collections::HashSet;

use crate::foundation::math::{vec2, Vec2};

/// Anything that can be held down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    /// Keyboard key
    Key(KeyCode),
    /// Mouse button
    Mouse(MouseButton),
}

impl From<KeyCode> for InputKey {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

impl From<MouseButton> for InputKey {
    fn from(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

/// Keyboard and mouse state for the current frame
#[derive(Debug, Default, Clone)]
pub struct InputState {
    down: HashSet<InputKey>,
    pressed: HashSet<InputKey>,
    released: HashSet<InputKey>,
    mouse_position: Vec2,
}

impl InputState {
    /// Create an input state with nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press coming from the host
    pub fn press(&mut self, key: impl Into<InputKey>) {
        let key = key.into();
        if self.down.insert(key) {
            self.pressed.insert(key);
        }
    }

    /// Record a release coming from the host
    pub fn release(&mut self, key: impl Into<InputKey>) {
        let key = key.into();
        if self.down.remove(&key) {
            self.released.insert(key);
        }
    }

    /// Record the cursor position in screen space
    pub fn move_mouse(&mut self, x: f32, y: f32) {
        self.mouse_position = vec2(x, y);
    }

    /// Current cursor position in screen space
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// True while the key is held
    pub fn is_down(&self, key: impl Into<InputKey>) -> bool {
        self.down.contains(&key.into())
    }

    /// True only during the frame the key went down
    pub fn was_pressed_this_frame(&self, key: impl Into<InputKey>) -> bool {
        self.pressed.contains(&key.into())
    }

    /// True only during the frame the key went up
    pub fn was_released_this_frame(&self, key: impl Into<InputKey>) -> bool {
        self.released.contains(&key.into())
    }

    /// Forget this frame's edges; held keys stay held
    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    /// Release everything, e.g. when the window loses focus
    pub fn reset(&mut self) {
        self.down.clear();
        self.pressed.clear();
        self.released.clear();
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}
