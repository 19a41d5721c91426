use veneer_core::{Color, Value, ValueSource};

use crate::control::{
    assign_optional, assign_or_log, Control, ControlFlags, ControlKind, HorizontalAlignment,
    MultiLinePoint, Padding, VerticalAlignment,
};
use crate::dirty::Change;
use crate::event::{Handlers, Painter};
use crate::surface::Surface;
use crate::tree::{ControlId, StyleId};

/// Mutable access to one control of a [`Surface`].
///
/// Every setter returns whether the property actually changed and raises the
/// matching dirty channel: layout properties re-measure the control and its
/// ancestors, transform properties rebuild matrices below it, paint-only
/// properties just schedule a redraw.
pub struct ControlMut<'a> {
    surface: &'a mut Surface,
    id: ControlId,
}

impl<'a> ControlMut<'a> {
    pub(crate) fn new(surface: &'a mut Surface, id: ControlId) -> Self {
        Self { surface, id }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn control(&self) -> Option<&Control> {
        self.surface.tree().get(self.id)
    }

    pub fn surface(&mut self) -> &mut Surface {
        self.surface
    }

    fn update(&mut self, change: Change, f: impl FnOnce(&mut Control) -> bool) -> bool {
        let Some(c) = self.surface.tree_mut().get_mut(self.id) else {
            return false;
        };
        let changed = f(c);
        if changed {
            self.surface.invalidate(self.id, change);
        }
        changed
    }

    pub fn mark_dirty(&mut self) {
        self.surface.invalidate(self.id, Change::Paint);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if let Some(c) = self.surface.tree_mut().get_mut(self.id) {
            c.name = name;
        }
    }

    pub fn set_width(&mut self, v: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| assign_optional(&mut c.width, v, "width"))
    }

    pub fn set_height(&mut self, v: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| assign_optional(&mut c.height, v, "height"))
    }

    pub fn set_auto_width(&mut self) -> bool {
        self.update(Change::Layout, |c| c.width.take().is_some())
    }

    pub fn set_auto_height(&mut self) -> bool {
        self.update(Change::Layout, |c| c.height.take().is_some())
    }

    pub fn set_padding(&mut self, v: impl ValueSource) -> bool {
        let mut value = Value::default();
        if let Err(e) = v.apply_to(&mut value) {
            log::debug!("ignoring padding: {e}");
            return false;
        }
        let next = Padding {
            left: value,
            right: value,
            top: value,
            bottom: value,
        };
        self.update(Change::Layout, |c| replace(&mut c.padding, next))
    }

    pub fn set_padding_left(&mut self, v: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| assign_or_log(&mut c.padding.left, v, "padding_left"))
    }

    pub fn set_padding_right(&mut self, v: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| assign_or_log(&mut c.padding.right, v, "padding_right"))
    }

    pub fn set_padding_top(&mut self, v: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| assign_or_log(&mut c.padding.top, v, "padding_top"))
    }

    pub fn set_padding_bottom(&mut self, v: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| {
            assign_or_log(&mut c.padding.bottom, v, "padding_bottom")
        })
    }

    pub fn set_left(&mut self, v: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| assign_or_log(&mut c.left, v, "left"))
    }

    pub fn set_top(&mut self, v: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| assign_or_log(&mut c.top, v, "top"))
    }

    pub fn set_link_offset(&mut self, x: impl ValueSource, y: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| {
            let a = assign_or_log(&mut c.link_offset_x, x, "link_offset_x");
            let b = assign_or_log(&mut c.link_offset_y, y, "link_offset_y");
            a || b
        })
    }

    pub fn set_alignment(&mut self, h: HorizontalAlignment, v: VerticalAlignment) -> bool {
        self.update(Change::Layout, |c| {
            let changed = c.h_align != h || c.v_align != v;
            c.h_align = h;
            c.v_align = v;
            changed
        })
    }

    pub fn set_rotation(&mut self, radians: f32) -> bool {
        self.update(Change::Matrix, |c| replace(&mut c.rotation, radians))
    }

    pub fn set_scale(&mut self, sx: f32, sy: f32) -> bool {
        self.update(Change::Matrix, |c| {
            let a = replace(&mut c.scale_x, sx);
            let b = replace(&mut c.scale_y, sy);
            a || b
        })
    }

    pub fn set_pivot(&mut self, x: f32, y: f32) -> bool {
        self.update(Change::Matrix, |c| {
            let a = replace(&mut c.pivot_x, x);
            let b = replace(&mut c.pivot_y, y);
            a || b
        })
    }

    /// Re-sorts the control among its siblings. Stack panels lay children
    /// out in sibling order, so the parent is re-measured.
    pub fn set_z_index(&mut self, z: i32) -> bool {
        let changed = self.update(Change::Paint, |c| replace(&mut c.z_index, z));
        if changed {
            self.surface.tree_mut().reorder(self.id);
            if let Some(parent) = self.surface.tree().parent(self.id) {
                self.surface.invalidate(parent, Change::Layout);
            }
        }
        changed
    }

    pub fn set_alpha(&mut self, alpha: f32) -> bool {
        self.update(Change::Paint, |c| replace(&mut c.alpha, alpha.clamp(0.0, 1.0)))
    }

    pub fn set_color(&mut self, color: Color) -> bool {
        self.update(Change::Paint, |c| replace(&mut c.color, color))
    }

    pub fn set_background(&mut self, color: Option<Color>) -> bool {
        self.update(Change::Paint, |c| match &mut c.kind {
            ControlKind::Container(d) => replace(&mut d.background, color),
            ControlKind::Rectangle(d) => replace(&mut d.background, color),
            ControlKind::Ellipse(d) => replace(&mut d.background, color),
            ControlKind::StackPanel(d) => replace(&mut d.background, color),
            _ => false,
        })
    }

    /// Border thickness for rectangles and ellipses, stroke width for lines.
    pub fn set_thickness(&mut self, thickness: f32) -> bool {
        let thickness = thickness.max(0.0);
        self.update(Change::Layout, |c| match &mut c.kind {
            ControlKind::Rectangle(r) => replace(&mut r.thickness, thickness),
            ControlKind::Ellipse(e) => replace(&mut e.thickness, thickness),
            ControlKind::Line(l) => replace(&mut l.line_width, thickness),
            ControlKind::MultiLine(m) => replace(&mut m.line_width, thickness),
            _ => false,
        })
    }

    pub fn set_corner_radius(&mut self, radius: f32) -> bool {
        self.update(Change::Paint, |c| match &mut c.kind {
            ControlKind::Rectangle(r) => replace(&mut r.corner_radius, radius.max(0.0)),
            _ => false,
        })
    }

    pub fn set_dash(&mut self, dash: Vec<f32>) -> bool {
        self.update(Change::Paint, |c| match &mut c.kind {
            ControlKind::Line(l) => replace(&mut l.dash, dash),
            ControlKind::MultiLine(m) => replace(&mut m.dash, dash),
            _ => false,
        })
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(Change::Layout, |c| match &mut c.kind {
            ControlKind::Text(t) => replace(&mut t.text, text),
            _ => false,
        })
    }

    pub fn set_wrap(&mut self, wrap: bool) -> bool {
        self.update(Change::Layout, |c| match &mut c.kind {
            ControlKind::Text(t) => replace(&mut t.wrap, wrap),
            _ => false,
        })
    }

    pub fn set_line_from(&mut self, x: impl ValueSource, y: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| match &mut c.kind {
            ControlKind::Line(l) => {
                let a = assign_or_log(&mut l.x1, x, "x1");
                let b = assign_or_log(&mut l.y1, y, "y1");
                a || b
            }
            _ => false,
        })
    }

    pub fn set_line_to(&mut self, x: impl ValueSource, y: impl ValueSource) -> bool {
        self.update(Change::Layout, |c| match &mut c.kind {
            ControlKind::Line(l) => {
                let a = assign_or_log(&mut l.x2, x, "x2");
                let b = assign_or_log(&mut l.y2, y, "y2");
                a || b
            }
            _ => false,
        })
    }

    pub fn set_connected_control(&mut self, target: Option<ControlId>) -> bool {
        self.update(Change::Layout, |c| match &mut c.kind {
            ControlKind::Line(l) => replace(&mut l.connected, target),
            _ => false,
        })
    }

    pub fn set_points(&mut self, points: Vec<MultiLinePoint>) -> bool {
        self.update(Change::Layout, |c| match &mut c.kind {
            ControlKind::MultiLine(m) => replace(&mut m.points, points),
            _ => false,
        })
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) -> bool {
        let family = Some(family.into());
        self.update(Change::Font, |c| replace(&mut c.font.family, family))
    }

    pub fn set_font_size(&mut self, v: impl ValueSource) -> bool {
        self.update(Change::Font, |c| assign_optional(&mut c.font.size, v, "font_size"))
    }

    pub fn set_font_style(&mut self, style: impl Into<String>) -> bool {
        let style = Some(style.into());
        self.update(Change::Font, |c| replace(&mut c.font.style, style))
    }

    pub fn set_style(&mut self, style: Option<StyleId>) -> bool {
        self.update(Change::Font, |c| replace(&mut c.style, style))
    }

    /// Hiding drops every hover, press, capture and focus held by the
    /// control or its descendants.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.update(Change::Layout, |c| set_flag(c, ControlFlags::VISIBLE, visible));
        if changed && !visible {
            let ids = self.surface.tree().descendants(self.id);
            self.surface.clean_after_removal(&ids);
        }
        changed
    }

    pub fn set_hit_test_visible(&mut self, on: bool) -> bool {
        self.update(Change::Paint, |c| set_flag(c, ControlFlags::HIT_TEST_VISIBLE, on))
    }

    pub fn set_pointer_blocker(&mut self, on: bool) -> bool {
        self.update(Change::Paint, |c| set_flag(c, ControlFlags::POINTER_BLOCKER, on))
    }

    pub fn set_focusable(&mut self, on: bool) -> bool {
        let changed = self.update(Change::Paint, |c| set_flag(c, ControlFlags::FOCUSABLE, on));
        if changed && !on && self.surface.focused() == Some(self.id) {
            self.surface.request_focus(None);
        }
        changed
    }

    pub fn set_focus_invisible(&mut self, on: bool) -> bool {
        self.update(Change::Paint, |c| set_flag(c, ControlFlags::FOCUS_INVISIBLE, on))
    }

    pub fn set_clip_children(&mut self, on: bool) -> bool {
        self.update(Change::Paint, |c| set_flag(c, ControlFlags::CLIP_CHILDREN, on))
    }

    pub fn set_painter(&mut self, painter: Option<Painter>) {
        self.update(Change::Paint, |c| {
            c.painter = painter;
            true
        });
    }

    /// Replaces or extends the handler set.
    pub fn handlers(&mut self, f: impl FnOnce(&mut Handlers)) {
        if let Some(c) = self.surface.tree_mut().get_mut(self.id) {
            f(&mut c.handlers);
        }
    }

    /// Places the control's center on a projected point (plus its link
    /// offset), switching it to left/top alignment. Pixel offsets set this
    /// way ignore adaptive scaling; moves under half a pixel are dropped.
    pub fn move_to_projected_position(&mut self, x: f32, y: f32) -> bool {
        let Some(c) = self.control() else {
            return false;
        };
        let rect = c.rect();
        let scale = self.surface.adaptive_scale();
        let old_left = c.left.to_pixels_scaled(0.0, scale);
        let old_top = c.top.to_pixels_scaled(0.0, scale);
        let projected = c.left.ignore_adaptive_scaling && c.top.ignore_adaptive_scaling;
        let mut new_left = x + c.link_offset_x.to_pixels_scaled(0.0, scale) - rect.width / 2.0;
        let mut new_top = y + c.link_offset_y.to_pixels_scaled(0.0, scale) - rect.height / 2.0;
        if projected {
            if (new_left - old_left).abs() < 0.5 {
                new_left = old_left;
            }
            if (new_top - old_top).abs() < 0.5 {
                new_top = old_top;
            }
        }

        let aligned = self.set_alignment(HorizontalAlignment::Left, VerticalAlignment::Top);
        let moved = self.update(Change::Layout, |c| {
            let a = c.left.set(Value::px(new_left));
            let b = c.top.set(Value::px(new_top));
            c.left.ignore_adaptive_scaling = true;
            c.top.ignore_adaptive_scaling = true;
            a || b
        });
        aligned || moved
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn set_flag(c: &mut Control, flag: ControlFlags, on: bool) -> bool {
    let before = c.flags;
    c.flags.set(flag, on);
    before != c.flags
}
