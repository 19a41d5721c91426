//! Per-pointer interaction state.
//!
//! [`InteractionState`] only decides *what* happens for a sample given the
//! picked control; the surface turns the resulting [`Transition`]s into
//! handler calls. Keeping it free of the tree makes the capture/over/down
//! rules testable on their own.

use std::collections::HashMap;

use smallvec::SmallVec;
use veneer_core::PointerId;

use crate::tree::ControlId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Out(ControlId),
    Enter(ControlId),
    Move(ControlId),
    Down(ControlId),
    Up { target: ControlId, click: bool },
}

pub type Transitions = SmallVec<[Transition; 4]>;

#[derive(Clone, Debug, Default)]
pub struct InteractionState {
    over: HashMap<PointerId, ControlId>,
    down: HashMap<PointerId, ControlId>,
    capture: HashMap<PointerId, ControlId>,
}

impl InteractionState {
    pub fn over(&self, pointer: PointerId) -> Option<ControlId> {
        self.over.get(&pointer).copied()
    }

    pub fn down(&self, pointer: PointerId) -> Option<ControlId> {
        self.down.get(&pointer).copied()
    }

    pub fn capturing(&self, pointer: PointerId) -> Option<ControlId> {
        self.capture.get(&pointer).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.over.is_empty() && self.down.is_empty() && self.capture.is_empty()
    }

    pub fn capture(&mut self, pointer: PointerId, id: ControlId) {
        self.capture.insert(pointer, id);
    }

    pub fn release_capture(&mut self, pointer: PointerId) -> Option<ControlId> {
        self.capture.remove(&pointer)
    }

    /// Where a move is routed: the capturing control, else the hit.
    pub fn route(&self, pointer: PointerId, hit: Option<ControlId>) -> Option<ControlId> {
        self.capturing(pointer).or(hit)
    }

    fn retarget(&mut self, pointer: PointerId, target: Option<ControlId>, out: &mut Transitions) {
        let previous = self.over(pointer);
        if previous == target {
            return;
        }
        if let Some(prev) = previous {
            out.push(Transition::Out(prev));
        }
        match target {
            Some(t) => {
                self.over.insert(pointer, t);
                out.push(Transition::Enter(t));
            }
            None => {
                self.over.remove(&pointer);
            }
        }
    }

    pub fn pointer_move(&mut self, pointer: PointerId, hit: Option<ControlId>) -> Transitions {
        let mut out = Transitions::new();
        let target = self.route(pointer, hit);
        self.retarget(pointer, target, &mut out);
        if let Some(t) = target {
            out.push(Transition::Move(t));
        }
        out
    }

    pub fn pointer_down(&mut self, pointer: PointerId, hit: Option<ControlId>) -> Transitions {
        let mut out = Transitions::new();
        self.retarget(pointer, hit, &mut out);
        if let Some(t) = hit {
            self.down.insert(pointer, t);
            out.push(Transition::Down(t));
        }
        out
    }

    /// `hit_path` is the picked control and its ancestors; a release anywhere
    /// inside the pressed control counts as a click.
    pub fn pointer_up(&mut self, pointer: PointerId, hit_path: &[ControlId]) -> Transitions {
        let mut out = Transitions::new();
        let captured = self.capture.remove(&pointer);
        if let Some(target) = self.down.remove(&pointer).or(captured) {
            out.push(Transition::Up {
                target,
                click: hit_path.contains(&target),
            });
        }
        out
    }

    /// The pointer left the render target.
    pub fn pointer_leave(&mut self, pointer: PointerId) -> Transitions {
        let mut out = Transitions::new();
        self.retarget(pointer, None, &mut out);
        out
    }

    /// Forgets everything about `pointer`, reporting the hover it loses.
    pub fn forget_pointer(&mut self, pointer: PointerId) -> Transitions {
        let out = self.pointer_leave(pointer);
        self.down.remove(&pointer);
        self.capture.remove(&pointer);
        out
    }

    /// Drops every entry that refers to one of `ids`, without reporting.
    pub fn forget_controls(&mut self, ids: &[ControlId]) {
        for map in [&mut self.over, &mut self.down, &mut self.capture] {
            map.retain(|_, c| !ids.contains(c));
        }
    }
}
