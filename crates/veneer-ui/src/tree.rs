//! The control arena.
//!
//! Controls live in a `SlotMap`; parent and child links are ids. Every
//! container keeps its children sorted by `(z_index, seq)`, where `seq` is
//! handed out when the child is attached, so equal z-indices keep insertion
//! order and the last-attached child draws on top.

use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::control::Control;

slotmap::new_key_type! {
    pub struct ControlId;
    pub struct StyleId;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("control {0:?} does not exist")]
    UnknownControl(ControlId),
    #[error("control {0:?} cannot hold children")]
    NotAContainer(ControlId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: ControlId, child: ControlId },
    #[error("the root container cannot be moved or disposed")]
    RootImmutable,
}

pub type Result<T> = std::result::Result<T, TreeError>;

pub struct Tree {
    nodes: SlotMap<ControlId, Control>,
    root: ControlId,
    next_seq: u64,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Control::container("root").hit_test_visible(false));
        Self {
            nodes,
            root,
            next_seq: 1,
        }
    }

    pub fn root(&self) -> ControlId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ControlId) -> Option<&Control> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ControlId, &Control)> {
        self.nodes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (ControlId, &mut Control)> {
        self.nodes.iter_mut()
    }

    /// Adds a detached control to the arena.
    pub fn insert(&mut self, mut control: Control) -> ControlId {
        control.parent = None;
        control.children.clear();
        self.nodes.insert(control)
    }

    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.nodes.get(id).and_then(|c| c.parent)
    }

    pub fn children(&self, id: ControlId) -> &[ControlId] {
        self.nodes.get(id).map(|c| c.children.as_slice()).unwrap_or(&[])
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: ControlId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// `id` followed by its ancestors up to the top of its subtree.
    pub fn path_to_root(&self, id: ControlId) -> SmallVec<[ControlId; 8]> {
        let mut path = SmallVec::new();
        if self.contains(id) {
            path.push(id);
            path.extend(self.ancestors(id));
        }
        path
    }

    /// `id` and everything below it, in pre-order.
    pub fn descendants(&self, id: ControlId) -> Vec<ControlId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    pub fn is_ancestor_of(&self, ancestor: ControlId, id: ControlId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Reachable from the root.
    pub fn is_attached(&self, id: ControlId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Every control reachable from the root, root included.
    pub fn reachable(&self) -> Vec<ControlId> {
        self.descendants(self.root)
    }

    /// Attaches `child` under `parent`, detaching it from any previous parent.
    pub fn add_child(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        if child == self.root {
            return Err(TreeError::RootImmutable);
        }
        let p = self
            .nodes
            .get(parent)
            .ok_or(TreeError::UnknownControl(parent))?;
        if !p.is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        if !self.contains(child) {
            return Err(TreeError::UnknownControl(child));
        }
        if parent == child || self.is_ancestor_of(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }

        self.detach(child);
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.seq = seq;
        }
        self.place(parent, child);
        log::debug!("attached {child:?} under {parent:?}");
        Ok(())
    }

    /// Removes `child` from `parent`'s list. Returns `false` when `child` is
    /// not a direct child of `parent`.
    pub fn remove_child(&mut self, parent: ControlId, child: ControlId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child)
    }

    /// Unlinks `id` from its parent, keeping it (and its subtree) in the arena.
    pub fn detach(&mut self, id: ControlId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(c) = self.nodes.get_mut(id) {
            c.parent = None;
        }
        true
    }

    /// Detaches `id` and drops its whole subtree from the arena.
    pub fn dispose(&mut self, id: ControlId) -> Result<Vec<ControlId>> {
        if id == self.root {
            return Err(TreeError::RootImmutable);
        }
        if !self.contains(id) {
            return Err(TreeError::UnknownControl(id));
        }
        let ids = self.descendants(id);
        self.detach(id);
        for n in &ids {
            self.nodes.remove(*n);
        }
        log::debug!("disposed {} control(s) under {id:?}", ids.len());
        Ok(ids)
    }

    /// Re-sorts `id` inside its parent after a z-index change.
    pub fn reorder(&mut self, id: ControlId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        self.place(parent, id);
    }

    fn place(&mut self, parent: ControlId, child: ControlId) {
        let Some(key) = self.nodes.get(child).map(|c| (c.z_index, c.seq)) else {
            return;
        };
        let pos = {
            let siblings = self.children(parent);
            siblings
                .iter()
                .position(|s| {
                    self.nodes
                        .get(*s)
                        .is_some_and(|c| (c.z_index, c.seq) > key)
                })
                .unwrap_or(siblings.len())
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.insert(pos, child);
        }
    }

    pub fn child_by_name(&self, parent: ControlId, name: &str) -> Option<ControlId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.nodes.get(*c).is_some_and(|n| n.name == name))
    }

    /// First direct child named `name` whose type name is `type_name`
    /// (`"Container"`, `"Rectangle"`, `"StackPanel"`, `"TextBlock"`, ...).
    pub fn child_by_type(&self, parent: ControlId, name: &str, type_name: &str) -> Option<ControlId> {
        self.children(parent).iter().copied().find(|c| {
            self.nodes
                .get(*c)
                .is_some_and(|n| n.name == name && n.type_name() == type_name)
        })
    }

    pub fn contains_control(&self, parent: ControlId, child: ControlId) -> bool {
        self.children(parent).contains(&child)
    }

    /// Depth-first search below `from` for a control called `name`.
    pub fn find_by_name(&self, from: ControlId, name: &str) -> Option<ControlId> {
        self.descendants(from)
            .into_iter()
            .find(|c| self.nodes.get(*c).is_some_and(|n| n.name == name))
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<ControlId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ControlId;

    fn next(&mut self) -> Option<ControlId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
