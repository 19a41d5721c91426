use crate::{Affine2D, Color, Font, Rect, Vec2};

/// Renderable scene: the complete draw list produced by one render pass.
///
/// Rects and points are in layout space; `PushTransform` carries the local
/// transform of the control that follows, so backends keep their own stack.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub clear_color: Color,
    pub nodes: Vec<SceneNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneNode {
    Rect {
        rect: Rect,
        color: Color,
        radius: f32,
    },
    Border {
        rect: Rect,
        color: Color,
        width: f32,
        radius: f32,
    },
    /// Filled ellipse inscribed in `rect`.
    Ellipse {
        rect: Rect,
        color: Color,
    },
    EllipseBorder {
        rect: Rect,
        color: Color,
        width: f32,
    },
    Polyline {
        points: Vec<Vec2>,
        color: Color,
        width: f32,
        dash: Vec<f32>,
    },
    Text {
        rect: Rect,
        text: String,
        color: Color,
        font: Font,
    },
    PushClip {
        rect: Rect,
        radius: f32,
    },
    /// Clips to the ellipse inscribed in `rect`; closed by `PopClip`.
    PushEllipseClip {
        rect: Rect,
    },
    PopClip,
    PushTransform {
        transform: Affine2D,
    },
    PopTransform,
    PushAlpha(f32),
    PopAlpha,
}

impl Scene {
    pub fn new(clear_color: Color) -> Self {
        Self {
            clear_color,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every `Push*` has a matching `Pop*` in the right nesting order.
    pub fn is_balanced(&self) -> bool {
        #[derive(PartialEq)]
        enum Open {
            Clip,
            Transform,
            Alpha,
        }
        let mut stack = Vec::new();
        for node in &self.nodes {
            match node {
                SceneNode::PushClip { .. } | SceneNode::PushEllipseClip { .. } => {
                    stack.push(Open::Clip)
                }
                SceneNode::PushTransform { .. } => stack.push(Open::Transform),
                SceneNode::PushAlpha(_) => stack.push(Open::Alpha),
                SceneNode::PopClip if stack.pop() != Some(Open::Clip) => return false,
                SceneNode::PopTransform if stack.pop() != Some(Open::Transform) => return false,
                SceneNode::PopAlpha if stack.pop() != Some(Open::Alpha) => return false,
                _ => {}
            }
        }
        stack.is_empty()
    }
}
