//! The measure pass.
//!
//! Each control is measured against the rect its parent hands it. A control
//! that is not layout-dirty and receives the same parent rect as last time is
//! skipped together with its subtree; dirty descendants always have dirty
//! ancestors, so nothing below a skipped control can be stale.

use slotmap::SlotMap;
use veneer_core::{Font, MeasureError, Rect, Size, Style, Vec2};

use crate::control::{
    Control, ControlKind, EllipseData, HorizontalAlignment, LineData, MultiLineData,
    MultiLinePoint, RectangleData, VerticalAlignment,
};
use crate::dirty::Dirty;
use crate::measure::ContentMeasurer;
use crate::tree::{ControlId, StyleId, Tree};

/// Axis a stack panel forces on the child being placed; `true` is vertical.
type StackAxis = Option<bool>;

enum Geometry {
    None,
    Line([Vec2; 2]),
    MultiLine(Vec<Vec2>),
}

struct Measured {
    rect: Rect,
    content: Rect,
    font: Option<Font>,
    geometry: Geometry,
    failure: Option<MeasureError>,
}

pub(crate) struct LayoutPass<'a> {
    tree: &'a mut Tree,
    styles: &'a SlotMap<StyleId, Style>,
    measurer: &'a dyn ContentMeasurer,
    scale: f32,
    pub measured: Vec<ControlId>,
}

impl<'a> LayoutPass<'a> {
    pub fn new(
        tree: &'a mut Tree,
        styles: &'a SlotMap<StyleId, Style>,
        measurer: &'a dyn ContentMeasurer,
        scale: f32,
    ) -> Self {
        Self {
            tree,
            styles,
            measurer,
            scale,
            measured: Vec::new(),
        }
    }

    pub fn run(&mut self, viewport: Rect) {
        let root = self.tree.root();
        self.process(root, viewport, None);
        log::debug!("layout pass measured {} control(s)", self.measured.len());
    }

    fn process(&mut self, id: ControlId, parent: Rect, stack: StackAxis) {
        let Some(c) = self.tree.get(id) else {
            return;
        };
        if !c.is_visible() {
            return;
        }
        if !c.dirty.contains(Dirty::LAYOUT) && c.layout.cached_parent == Some(parent) {
            return;
        }
        self.measured.push(id);

        let m = self.measure(c, parent, stack);
        let slots = self.child_slots(c, &m.content, parent.size());

        let Some(c) = self.tree.get_mut(id) else {
            return;
        };
        match m.failure {
            Some(e) => {
                if !c.layout.warned {
                    log::warn!("{} '{}' failed to measure: {e}", c.type_name(), c.name);
                    c.layout.warned = true;
                }
                c.layout.broken = true;
            }
            None => {
                c.layout.broken = false;
                c.layout.warned = false;
            }
        }
        c.layout.rect = m.rect;
        c.layout.content = m.content;
        c.layout.cached_parent = Some(parent);
        c.layout.font = m.font;
        match (&mut c.kind, m.geometry) {
            (ControlKind::Line(l), Geometry::Line(ends)) => l.ends = ends,
            (ControlKind::MultiLine(ml), Geometry::MultiLine(points)) => ml.resolved = points,
            _ => {}
        }
        c.dirty.remove(Dirty::LAYOUT | Dirty::FONT);

        for (child, slot, axis) in slots {
            self.process(child, slot, axis);
        }
    }

    fn measure(&self, c: &Control, parent: Rect, stack: StackAxis) -> Measured {
        match &c.kind {
            ControlKind::Line(l) => {
                let ends = line_ends(self.tree, l, parent, self.scale);
                let rect = stroke_bounds(&ends, l.line_width, parent);
                return Measured {
                    rect,
                    content: rect,
                    font: None,
                    geometry: Geometry::Line(ends),
                    failure: None,
                };
            }
            ControlKind::MultiLine(ml) => {
                let points = multi_line_points(self.tree, ml, parent, self.scale);
                let rect = stroke_bounds(&points, ml.line_width, parent);
                return Measured {
                    rect,
                    content: rect,
                    font: None,
                    geometry: Geometry::MultiLine(points),
                    failure: None,
                };
            }
            _ => {}
        }

        let font = matches!(c.kind, ControlKind::Text(_)).then(|| self.font_for(c, parent.height));
        let (size, failure) = match self.resolve_size(c, parent.size(), font.as_ref()) {
            Ok(s) => (s, None),
            Err(e) => (Size::ZERO, Some(e)),
        };
        let (mut w, mut h) = (size.width, size.height);
        match stack {
            Some(true) => h = parent.height,
            Some(false) => w = parent.width,
            None => {}
        }
        let rect = if failure.is_some() {
            Rect::new(parent.left, parent.top, 0.0, 0.0)
        } else {
            self.align(c, parent, w, h, stack)
        };
        let content = match &c.kind {
            ControlKind::Rectangle(RectangleData { thickness: t, .. })
            | ControlKind::Ellipse(EllipseData { thickness: t, .. }) => rect.inset(*t, *t, *t, *t),
            _ => rect,
        };
        Measured {
            rect,
            content,
            font,
            geometry: Geometry::None,
            failure,
        }
    }

    /// Positions a `w`×`h` box inside `parent`: alignment, then padding
    /// (which shrinks the box), then the left/top offsets.
    fn align(&self, c: &Control, parent: Rect, w: f32, h: f32, stack: StackAxis) -> Rect {
        let s = self.scale;
        let (mut h_align, mut v_align) = (c.h_align, c.v_align);
        let mut left = c.left.to_pixels_scaled(parent.width, s);
        let mut top = c.top.to_pixels_scaled(parent.height, s);
        match stack {
            Some(true) => {
                v_align = VerticalAlignment::Top;
                top = 0.0;
            }
            Some(false) => {
                h_align = HorizontalAlignment::Left;
                left = 0.0;
            }
            None => {}
        }
        let x = match h_align {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Right => parent.width - w,
            HorizontalAlignment::Center => (parent.width - w) / 2.0,
        };
        let y = match v_align {
            VerticalAlignment::Top => 0.0,
            VerticalAlignment::Bottom => parent.height - h,
            VerticalAlignment::Center => (parent.height - h) / 2.0,
        };
        let pl = c.padding.left.to_pixels_scaled(parent.width, s);
        let pr = c.padding.right.to_pixels_scaled(parent.width, s);
        let pt = c.padding.top.to_pixels_scaled(parent.height, s);
        let pb = c.padding.bottom.to_pixels_scaled(parent.height, s);

        Rect::new(
            parent.left + x + pl + left,
            parent.top + y + pt + top,
            w - pl - pr,
            h - pt - pb,
        )
        .truncated()
    }

    /// Outer size (padding included) the control takes inside `avail`.
    fn resolve_size(&self, c: &Control, avail: Size, font: Option<&Font>) -> Result<Size, MeasureError> {
        let s = self.scale;
        let (force_w, force_h) = match &c.kind {
            ControlKind::StackPanel(st) => (!st.vertical, st.vertical),
            _ => (false, false),
        };
        let width = c.width.filter(|_| !force_w);
        let height = c.height.filter(|_| !force_h);
        let content = if width.is_none() || height.is_none() {
            self.content_size(c, avail, font)?
        } else {
            Size::ZERO
        };
        let pad_w = c.padding.left.to_pixels_scaled(avail.width, s)
            + c.padding.right.to_pixels_scaled(avail.width, s);
        let pad_h = c.padding.top.to_pixels_scaled(avail.height, s)
            + c.padding.bottom.to_pixels_scaled(avail.height, s);
        Ok(Size::new(
            match width {
                Some(v) => v.to_pixels_scaled(avail.width, s),
                None => content.width + pad_w,
            },
            match height {
                Some(v) => v.to_pixels_scaled(avail.height, s),
                None => content.height + pad_h,
            },
        ))
    }

    /// Size of what the control holds, without its own padding.
    fn content_size(&self, c: &Control, avail: Size, font: Option<&Font>) -> Result<Size, MeasureError> {
        match &c.kind {
            ControlKind::Text(t) => {
                let resolved;
                let font = match font {
                    Some(f) => f,
                    None => {
                        resolved = self.font_for(c, avail.height);
                        &resolved
                    }
                };
                let max_width = t.wrap.then(|| {
                    let pad = c.padding.left.to_pixels_scaled(avail.width, self.scale)
                        + c.padding.right.to_pixels_scaled(avail.width, self.scale);
                    (avail.width - pad).max(0.0)
                });
                self.measurer.measure_text(&t.text, font, max_width)
            }
            ControlKind::Container(_) => Ok(self.children_extent(c, avail)),
            ControlKind::Rectangle(RectangleData { thickness: t, .. })
            | ControlKind::Ellipse(EllipseData { thickness: t, .. }) => {
                let inner = self.children_extent(c, avail);
                Ok(Size::new(inner.width + 2.0 * t, inner.height + 2.0 * t))
            }
            ControlKind::StackPanel(st) => {
                let mut size = Size::ZERO;
                for child in self.visible_children(c) {
                    let cs = self.outer_size(child, avail);
                    if st.vertical {
                        size.height += cs.height;
                        if !child.width.is_some_and(|v| v.is_percentage()) {
                            size.width = size.width.max(cs.width);
                        }
                    } else {
                        size.width += cs.width;
                        if !child.height.is_some_and(|v| v.is_percentage()) {
                            size.height = size.height.max(cs.height);
                        }
                    }
                }
                Ok(size)
            }
            ControlKind::Plain | ControlKind::Line(_) | ControlKind::MultiLine(_) => Ok(Size::ZERO),
        }
    }

    /// Largest child box, ignoring children sized as a percentage of us.
    fn children_extent(&self, c: &Control, avail: Size) -> Size {
        let mut size = Size::ZERO;
        for child in self.visible_children(c) {
            let cs = self.outer_size(child, avail);
            if !child.width.is_some_and(|v| v.is_percentage()) {
                let offset = if child.left.is_pixel() {
                    child.left.to_pixels_scaled(avail.width, self.scale).max(0.0)
                } else {
                    0.0
                };
                size.width = size.width.max(cs.width + offset);
            }
            if !child.height.is_some_and(|v| v.is_percentage()) {
                let offset = if child.top.is_pixel() {
                    child.top.to_pixels_scaled(avail.height, self.scale).max(0.0)
                } else {
                    0.0
                };
                size.height = size.height.max(cs.height + offset);
            }
        }
        size
    }

    fn outer_size(&self, c: &Control, avail: Size) -> Size {
        let font = matches!(c.kind, ControlKind::Text(_)).then(|| self.font_for(c, avail.height));
        self.resolve_size(c, avail, font.as_ref())
            .unwrap_or(Size::ZERO)
    }

    fn visible_children<'c>(&'c self, c: &'c Control) -> impl Iterator<Item = &'c Control> + 'c {
        c.children
            .iter()
            .filter_map(|id| self.tree.get(*id))
            .filter(|ch| ch.is_visible())
    }

    /// The rect each visible child is measured against.
    fn child_slots(&self, c: &Control, content: &Rect, avail: Size) -> Vec<(ControlId, Rect, StackAxis)> {
        let visible = c
            .children
            .iter()
            .copied()
            .filter(|id| self.tree.get(*id).is_some_and(|ch| ch.is_visible()));
        match &c.kind {
            ControlKind::StackPanel(st) => {
                let mut offset = 0.0;
                visible
                    .filter_map(|id| {
                        let child = self.tree.get(id)?;
                        let size = self.outer_size(child, avail);
                        let slot = if st.vertical {
                            let r = Rect::new(content.left, content.top + offset, content.width, size.height);
                            offset += size.height;
                            r
                        } else {
                            let r = Rect::new(content.left + offset, content.top, size.width, content.height);
                            offset += size.width;
                            r
                        };
                        Some((id, slot, Some(st.vertical)))
                    })
                    .collect()
            }
            k if k.is_container() => visible.map(|id| (id, *content, None)).collect(),
            _ => Vec::new(),
        }
    }

    fn font_for(&self, c: &Control, parent_height: f32) -> Font {
        let base = c
            .style
            .and_then(|s| self.styles.get(s))
            .cloned()
            .unwrap_or_default();
        Style {
            font_family: c.font.family.clone().unwrap_or(base.font_family),
            font_size: c.font.size.unwrap_or(base.font_size),
            font_style: c.font.style.clone().unwrap_or(base.font_style),
        }
        .resolve(parent_height, self.scale)
    }
}

fn attached_center(tree: &Tree, id: ControlId) -> Option<Vec2> {
    let c = tree.get(id)?;
    (c.is_visible() && tree.is_attached(id)).then(|| c.center())
}

fn line_ends(tree: &Tree, l: &LineData, parent: Rect, scale: f32) -> [Vec2; 2] {
    let start = Vec2::new(
        parent.left + l.x1.to_pixels_scaled(parent.width, scale),
        parent.top + l.y1.to_pixels_scaled(parent.height, scale),
    );
    let dx = l.x2.to_pixels_scaled(parent.width, scale);
    let dy = l.y2.to_pixels_scaled(parent.height, scale);
    let end = match l.connected.and_then(|id| attached_center(tree, id)) {
        Some(center) => Vec2::new(center.x + dx, center.y + dy),
        None => Vec2::new(parent.left + dx, parent.top + dy),
    };
    [start, end]
}

fn multi_line_points(tree: &Tree, ml: &MultiLineData, parent: Rect, scale: f32) -> Vec<Vec2> {
    ml.points
        .iter()
        .filter_map(|p| match p {
            MultiLinePoint::Fixed { x, y } => Some(Vec2::new(
                parent.left + x.to_pixels_scaled(parent.width, scale),
                parent.top + y.to_pixels_scaled(parent.height, scale),
            )),
            MultiLinePoint::Attached(id) => attached_center(tree, *id),
        })
        .collect()
}

/// Bounding box of `points` grown by half the stroke width on every side.
fn stroke_bounds(points: &[Vec2], line_width: f32, parent: Rect) -> Rect {
    let half = line_width / 2.0;
    match Rect::bounding(points) {
        Some(b) => Rect::new(
            b.left - half,
            b.top - half,
            b.width + line_width,
            b.height + line_width,
        ),
        None => Rect::new(parent.left, parent.top, 0.0, 0.0),
    }
}

/// Lines and multi-lines whose attached controls moved since they were
/// measured.
pub(crate) fn stale_attachments(tree: &Tree, scale: f32) -> Vec<ControlId> {
    tree.iter()
        .filter(|(_, c)| c.is_visible())
        .filter_map(|(id, c)| {
            let parent = c.layout.cached_parent?;
            let stale = match &c.kind {
                ControlKind::Line(l) if l.connected.is_some() => {
                    line_ends(tree, l, parent, scale) != l.ends
                }
                ControlKind::MultiLine(ml) if !c.kind.attachments().is_empty() => {
                    multi_line_points(tree, ml, parent, scale) != ml.resolved
                }
                _ => false,
            };
            (stale && tree.is_attached(id)).then_some(id)
        })
        .collect()
}
