//! The draw pass: walks the measured tree and records a [`Scene`].

use veneer_core::{Affine2D, Rect, Scene, SceneNode, Vec2};

use crate::control::{Control, ControlFlags, ControlKind};
use crate::dirty::Dirty;
use crate::tree::{ControlId, Tree};

pub(crate) struct PaintPass<'a> {
    tree: &'a mut Tree,
    scene: &'a mut Scene,
    /// Controls that produced output, in draw order.
    pub drawn: Vec<ControlId>,
}

impl<'a> PaintPass<'a> {
    pub fn new(tree: &'a mut Tree, scene: &'a mut Scene) -> Self {
        Self {
            tree,
            scene,
            drawn: Vec::new(),
        }
    }

    pub fn run(&mut self, viewport: Rect) {
        let root = self.tree.root();
        self.paint(root, viewport, Affine2D::IDENTITY);
    }

    fn paint(&mut self, id: ControlId, parent_rect: Rect, parent_transform: Affine2D) {
        let Some(c) = self.tree.get_mut(id) else {
            return;
        };
        if !c.is_visible() {
            return;
        }

        let rect = c.layout.rect;
        let pivot = Vec2::new(
            rect.left + rect.width * c.pivot_x,
            rect.top + rect.height * c.pivot_y,
        );
        let local = Affine2D::around_pivot(pivot.x, pivot.y, c.rotation, c.scale_x, c.scale_y, None);
        if c.dirty.contains(Dirty::MATRIX)
            || c.layout.transform_source != Some((pivot, parent_transform))
        {
            c.layout.transform = local.multiply(&parent_transform);
            c.layout.inverse = c.layout.transform.invert();
            c.layout.transform_source = Some((pivot, parent_transform));
            c.dirty.remove(Dirty::MATRIX);
        }
        let transform = c.layout.transform;

        if !transformed_bounds(&rect, &local).intersects(&parent_rect) {
            log::trace!("culled '{}'", c.name);
            return;
        }

        let pushed_transform = !local.is_identity();
        if pushed_transform {
            self.scene.push(SceneNode::PushTransform { transform: local });
        }
        let pushed_alpha = c.alpha < 1.0;
        if pushed_alpha {
            self.scene.push(SceneNode::PushAlpha(c.alpha));
        }

        paint_kind(c, &mut *self.scene);
        if let Some(painter) = &c.painter {
            painter(&mut *self.scene, &rect);
        }
        self.drawn.push(id);

        let content = c.layout.content;
        let clip = c.is_container() && c.flags.contains(ControlFlags::CLIP_CHILDREN);
        if clip {
            self.scene.push(match &c.kind {
                ControlKind::Ellipse(_) => SceneNode::PushEllipseClip { rect: content },
                ControlKind::Rectangle(r) => SceneNode::PushClip {
                    rect: content,
                    radius: r.corner_radius,
                },
                _ => SceneNode::PushClip {
                    rect: content,
                    radius: 0.0,
                },
            });
        }
        let children = c.children.clone();
        for child in children {
            self.paint(child, content, transform);
        }
        if clip {
            self.scene.push(SceneNode::PopClip);
        }

        if pushed_alpha {
            self.scene.push(SceneNode::PopAlpha);
        }
        if pushed_transform {
            self.scene.push(SceneNode::PopTransform);
        }
    }
}

fn paint_kind(c: &Control, scene: &mut Scene) {
    let rect = c.layout.rect;
    match &c.kind {
        ControlKind::Plain => {}
        ControlKind::Container(_) | ControlKind::StackPanel(_) => {
            if let Some(bg) = c.kind.background().filter(|bg| !bg.is_transparent()) {
                scene.push(SceneNode::Rect {
                    rect,
                    color: bg,
                    radius: 0.0,
                });
            }
        }
        ControlKind::Rectangle(r) => {
            if let Some(bg) = r.background.filter(|bg| !bg.is_transparent()) {
                scene.push(SceneNode::Rect {
                    rect,
                    color: bg,
                    radius: r.corner_radius,
                });
            }
            if r.thickness > 0.0 {
                let half = r.thickness / 2.0;
                scene.push(SceneNode::Border {
                    rect: rect.inset(half, half, half, half),
                    color: c.color,
                    width: r.thickness,
                    radius: r.corner_radius,
                });
            }
        }
        ControlKind::Ellipse(e) => {
            if let Some(bg) = e.background.filter(|bg| !bg.is_transparent()) {
                scene.push(SceneNode::Ellipse { rect, color: bg });
            }
            if e.thickness > 0.0 {
                let half = e.thickness / 2.0;
                scene.push(SceneNode::EllipseBorder {
                    rect: rect.inset(half, half, half, half),
                    color: c.color,
                    width: e.thickness,
                });
            }
        }
        ControlKind::Text(t) => {
            if c.layout.broken || t.text.is_empty() {
                return;
            }
            if let Some(font) = &c.layout.font {
                scene.push(SceneNode::Text {
                    rect,
                    text: t.text.clone(),
                    color: c.color,
                    font: font.clone(),
                });
            }
        }
        ControlKind::Line(l) => scene.push(SceneNode::Polyline {
            points: l.ends.to_vec(),
            color: c.color,
            width: l.line_width,
            dash: l.dash.clone(),
        }),
        ControlKind::MultiLine(ml) => {
            if ml.resolved.len() >= 2 {
                scene.push(SceneNode::Polyline {
                    points: ml.resolved.clone(),
                    color: c.color,
                    width: ml.line_width,
                    dash: ml.dash.clone(),
                });
            }
        }
    }
}

/// Axis-aligned bounds of `rect` after `t`.
fn transformed_bounds(rect: &Rect, t: &Affine2D) -> Rect {
    if t.is_identity() {
        return *rect;
    }
    let corners = [
        t.transform_point(rect.left, rect.top),
        t.transform_point(rect.right(), rect.top),
        t.transform_point(rect.left, rect.bottom()),
        t.transform_point(rect.right(), rect.bottom()),
    ];
    Rect::bounding(&corners).unwrap_or(*rect)
}
