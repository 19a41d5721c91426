//! Dirty channels and their propagation.
//!
//! Propagation is a pure function of the tree: it answers which controls a
//! change touches, and the caller decides what to flag.

use bitflags::bitflags;

use crate::tree::{ControlId, Tree};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Dirty: u8 {
        /// Rect must be re-measured.
        const LAYOUT = 1;
        /// Accumulated transform must be rebuilt.
        const MATRIX = 1 << 1;
        /// Cached font must be resolved again.
        const FONT = 1 << 2;
    }
}

/// What a property change affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    Layout,
    Matrix,
    Font,
    /// Redraw only.
    Paint,
}

/// The control and every ancestor up to the root.
pub fn layout_invalidation(tree: &Tree, id: ControlId) -> Vec<ControlId> {
    tree.path_to_root(id).into_vec()
}

/// The control and every descendant.
pub fn matrix_invalidation(tree: &Tree, id: ControlId) -> Vec<ControlId> {
    tree.descendants(id)
}

/// The control and every descendant; callers also re-measure ancestors.
pub fn font_invalidation(tree: &Tree, id: ControlId) -> Vec<ControlId> {
    tree.descendants(id)
}

/// Flags the controls touched by `change` on `id`.
pub(crate) fn apply(tree: &mut Tree, id: ControlId, change: Change) {
    match change {
        Change::Layout => mark(tree, &layout_invalidation(tree, id), Dirty::LAYOUT),
        Change::Matrix => mark(tree, &matrix_invalidation(tree, id), Dirty::MATRIX),
        Change::Font => {
            mark(tree, &font_invalidation(tree, id), Dirty::FONT | Dirty::LAYOUT);
            mark(tree, &layout_invalidation(tree, id), Dirty::LAYOUT);
        }
        Change::Paint => {}
    }
}

fn mark(tree: &mut Tree, ids: &[ControlId], flags: Dirty) {
    for id in ids {
        if let Some(c) = tree.get_mut(*id) {
            c.dirty |= flags;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Control;

    #[test]
    fn layout_goes_up_matrix_goes_down() {
        let mut tree = Tree::new();
        let root = tree.root();
        let panel = tree.insert(Control::container("panel"));
        let a = tree.insert(Control::plain("a"));
        let b = tree.insert(Control::plain("b"));
        tree.add_child(root, panel).unwrap();
        tree.add_child(panel, a).unwrap();
        tree.add_child(panel, b).unwrap();

        assert_eq!(layout_invalidation(&tree, a), vec![a, panel, root]);
        assert_eq!(matrix_invalidation(&tree, panel), vec![panel, a, b]);
        assert_eq!(font_invalidation(&tree, b), vec![b]);
    }

    #[test]
    fn detached_control_invalidates_only_its_subtree() {
        let mut tree = Tree::new();
        let lone = tree.insert(Control::container("lone"));
        let child = tree.insert(Control::plain("child"));
        tree.add_child(lone, child).unwrap();

        assert_eq!(layout_invalidation(&tree, child), vec![child, lone]);
        assert!(!layout_invalidation(&tree, child).contains(&tree.root()));
    }

    #[test]
    fn paint_changes_flag_nothing() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.insert(Control::plain("a"));
        tree.add_child(root, a).unwrap();
        for (_, c) in tree.iter_mut() {
            c.dirty = Dirty::empty();
        }

        apply(&mut tree, a, Change::Paint);
        assert!(tree.iter().all(|(_, c)| c.dirty.is_empty()));

        apply(&mut tree, a, Change::Font);
        assert_eq!(tree.get(a).unwrap().dirty, Dirty::FONT | Dirty::LAYOUT);
        assert_eq!(tree.get(root).unwrap().dirty, Dirty::LAYOUT);
    }
}
