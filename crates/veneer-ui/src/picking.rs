//! Hit testing against the last drawn frame.

use veneer_core::Vec2;

use crate::control::ControlFlags;
use crate::tree::{ControlId, Tree};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PickResult {
    /// Topmost hit-test-visible control under the point.
    pub target: Option<ControlId>,
    /// A pointer blocker swallowed the point; hosts should not forward the
    /// sample to the scene behind the surface.
    pub blocked: bool,
}

enum Found {
    Miss,
    Hit(ControlId),
    Blocked,
}

/// Picks below `from`; children are tried topmost first.
pub fn pick(tree: &Tree, from: ControlId, point: Vec2) -> PickResult {
    match hit_test(tree, from, point) {
        Found::Miss => PickResult::default(),
        Found::Hit(id) => PickResult {
            target: Some(id),
            blocked: tree.path_to_root(id).iter().any(|a| {
                tree.get(*a)
                    .is_some_and(|c| c.flags.contains(ControlFlags::POINTER_BLOCKER))
            }),
        },
        Found::Blocked => PickResult {
            target: None,
            blocked: true,
        },
    }
}

fn hit_test(tree: &Tree, id: ControlId, point: Vec2) -> Found {
    let Some(c) = tree.get(id) else {
        return Found::Miss;
    };
    if !c.is_visible() {
        return Found::Miss;
    }
    let inside = c.contains(point);
    if c.is_container() && c.flags.contains(ControlFlags::CLIP_CHILDREN) && !inside {
        return Found::Miss;
    }
    for child in c.children.iter().rev() {
        match hit_test(tree, *child, point) {
            Found::Miss => continue,
            found => return found,
        }
    }
    if !inside {
        return Found::Miss;
    }
    if c.flags.contains(ControlFlags::HIT_TEST_VISIBLE) {
        Found::Hit(id)
    } else if c.flags.contains(ControlFlags::POINTER_BLOCKER) {
        Found::Blocked
    } else {
        Found::Miss
    }
}
