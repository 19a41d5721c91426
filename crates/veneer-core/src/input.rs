use crate::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl PointerId {
    /// Conventional id for the desktop mouse.
    pub const MOUSE: PointerId = PointerId(0);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary, // Left mouse, touch
    Secondary, // Right mouse
    Tertiary,  // Middle mouse
    Other(u16),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Down,
    Up,
}

/// One pointer sample in render-target pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub pointer_id: PointerId,
    pub position: Vec2,
    pub kind: PointerKind,
    pub button: PointerButton,
}

impl PointerSample {
    pub fn new(pointer_id: PointerId, kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            pointer_id,
            position: Vec2 { x, y },
            kind,
            button: PointerButton::Primary,
        }
    }

    pub fn mouse_move(x: f32, y: f32) -> Self {
        Self::new(PointerId::MOUSE, PointerKind::Move, x, y)
    }

    pub fn mouse_down(x: f32, y: f32) -> Self {
        Self::new(PointerId::MOUSE, PointerKind::Down, x, y)
    }

    pub fn mouse_up(x: f32, y: f32) -> Self {
        Self::new(PointerId::MOUSE, PointerKind::Up, x, y)
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool, // Cmd on Mac, Win key on Windows
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Space,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub state: KeyState,
    pub modifiers: Modifiers,
    pub is_repeat: bool,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            is_repeat: false,
        }
    }
}
