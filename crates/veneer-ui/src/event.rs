//! Handler types and the context handed to them.
//!
//! Handlers never touch the surface directly. Side effects (pointer capture,
//! focus, property edits) are queued on the [`EventCtx`] and applied by the
//! surface once the current dispatch batch has finished.

use std::fmt;
use std::rc::Rc;

use veneer_core::{KeyEvent, PointerButton, PointerId, Rect, Scene, Vec2};

use crate::control::Control;
use crate::editor::ControlMut;
use crate::tree::{ControlId, Tree};

pub type PointerHandler = Rc<dyn Fn(&mut EventCtx<'_>, &PointerInfo)>;
pub type ControlHandler = Rc<dyn Fn(&mut EventCtx<'_>)>;
/// Returns `true` when the key was consumed.
pub type KeyHandler = Rc<dyn Fn(&mut EventCtx<'_>, &KeyEvent) -> bool>;
/// Custom drawing for a control, called with its measured rect.
pub type Painter = Rc<dyn Fn(&mut Scene, &Rect)>;

pub(crate) type Edit = Box<dyn FnOnce(&mut ControlMut<'_>)>;

/// What a pointer handler learns about the sample being dispatched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInfo {
    pub pointer_id: PointerId,
    pub button: PointerButton,
    /// Render-target pixels. Leave and cancel report the pointer's last
    /// known position.
    pub position: Vec2,
    /// Position in the receiving control's space, relative to its rect origin.
    pub local: Vec2,
    /// The control the sample was routed to before bubbling.
    pub target: ControlId,
}

#[derive(Clone, Default)]
pub struct Handlers {
    pub on_pointer_enter: Option<PointerHandler>,
    pub on_pointer_out: Option<PointerHandler>,
    pub on_pointer_down: Option<PointerHandler>,
    pub on_pointer_up: Option<PointerHandler>,
    pub on_pointer_move: Option<PointerHandler>,
    pub on_pointer_click: Option<PointerHandler>,
    pub on_focus: Option<ControlHandler>,
    pub on_blur: Option<ControlHandler>,
    pub on_key: Option<KeyHandler>,
    pub on_dirty: Option<ControlHandler>,
    pub on_after_draw: Option<ControlHandler>,
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn set<T>(h: &Option<T>) -> &'static str {
            if h.is_some() { "set" } else { "-" }
        }
        f.debug_struct("Handlers")
            .field("on_pointer_enter", &set(&self.on_pointer_enter))
            .field("on_pointer_out", &set(&self.on_pointer_out))
            .field("on_pointer_down", &set(&self.on_pointer_down))
            .field("on_pointer_up", &set(&self.on_pointer_up))
            .field("on_pointer_move", &set(&self.on_pointer_move))
            .field("on_pointer_click", &set(&self.on_pointer_click))
            .field("on_focus", &set(&self.on_focus))
            .field("on_blur", &set(&self.on_blur))
            .field("on_key", &set(&self.on_key))
            .field("on_dirty", &set(&self.on_dirty))
            .field("on_after_draw", &set(&self.on_after_draw))
            .finish()
    }
}

pub(crate) enum Command {
    Capture(PointerId, ControlId),
    ReleaseCapture(PointerId),
    Focus(Option<ControlId>),
    MarkDirty,
    Edit(ControlId, Edit),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Capture(p, id) => write!(f, "Capture({p:?}, {id:?})"),
            Command::ReleaseCapture(p) => write!(f, "ReleaseCapture({p:?})"),
            Command::Focus(id) => write!(f, "Focus({id:?})"),
            Command::MarkDirty => f.write_str("MarkDirty"),
            Command::Edit(id, _) => write!(f, "Edit({id:?})"),
        }
    }
}

pub struct EventCtx<'a> {
    tree: &'a Tree,
    commands: &'a mut Vec<Command>,
    current: ControlId,
    target: ControlId,
    pointer_id: Option<PointerId>,
    stopped: bool,
}

impl<'a> EventCtx<'a> {
    pub(crate) fn new(
        tree: &'a Tree,
        commands: &'a mut Vec<Command>,
        target: ControlId,
        pointer_id: Option<PointerId>,
    ) -> Self {
        Self {
            tree,
            commands,
            current: target,
            target,
            pointer_id,
            stopped: false,
        }
    }

    pub(crate) fn set_current(&mut self, id: ControlId) {
        self.current = id;
    }

    /// The control whose handler is running.
    pub fn current(&self) -> ControlId {
        self.current
    }

    /// The control the event was originally routed to.
    pub fn target(&self) -> ControlId {
        self.target
    }

    pub fn pointer_id(&self) -> Option<PointerId> {
        self.pointer_id
    }

    pub fn tree(&self) -> &Tree {
        self.tree
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.tree.get(id)
    }

    /// Routes every following sample of this pointer to the current control
    /// until release.
    pub fn capture_pointer(&mut self) {
        if let Some(p) = self.pointer_id {
            self.commands.push(Command::Capture(p, self.current));
        }
    }

    pub fn capture_pointer_for(&mut self, pointer: PointerId, id: ControlId) {
        self.commands.push(Command::Capture(pointer, id));
    }

    pub fn release_pointer_capture(&mut self) {
        if let Some(p) = self.pointer_id {
            self.commands.push(Command::ReleaseCapture(p));
        }
    }

    pub fn request_focus(&mut self, id: ControlId) {
        self.commands.push(Command::Focus(Some(id)));
    }

    pub fn focus_self(&mut self) {
        self.commands.push(Command::Focus(Some(self.current)));
    }

    pub fn blur(&mut self) {
        self.commands.push(Command::Focus(None));
    }

    pub fn mark_dirty(&mut self) {
        self.commands.push(Command::MarkDirty);
    }

    /// Queues a property edit; it runs with full dirty tracking after the
    /// handler batch.
    pub fn edit(&mut self, id: ControlId, f: impl FnOnce(&mut ControlMut<'_>) + 'static) {
        self.commands.push(Command::Edit(id, Box::new(f)));
    }

    pub fn edit_self(&mut self, f: impl FnOnce(&mut ControlMut<'_>) + 'static) {
        let id = self.current;
        self.edit(id, f);
    }

    /// Stops bubbling to the remaining ancestors.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }
}
