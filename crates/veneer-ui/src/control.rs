//! Control nodes.
//!
//! A [`Control`] carries the layout properties shared by every node plus a
//! [`ControlKind`] with the per-variant data. Controls are built by value with
//! the chained setters below and then inserted into a [`crate::Surface`];
//! after that, every change goes through [`crate::ControlMut`] so the right
//! dirty channel is raised.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use smallvec::SmallVec;
use veneer_core::{
    Affine2D, Color, Font, KeyEvent, PointerId, Rect, Scene, Value, ValueSource, Vec2,
};

use crate::dirty::Dirty;
use crate::event::{ControlHandler, EventCtx, Handlers, Painter, PointerHandler, PointerInfo};
use crate::tree::{ControlId, StyleId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizontalAlignment {
    Left,
    Right,
    #[default]
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalAlignment {
    Top,
    Bottom,
    #[default]
    Center,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ControlFlags: u16 {
        const VISIBLE = 1;
        const HIT_TEST_VISIBLE = 1 << 1;
        /// Stops picking at this control even when it is not hit-test visible.
        const POINTER_BLOCKER = 1 << 2;
        const FOCUSABLE = 1 << 3;
        /// Pointer-down on this control leaves the current focus alone.
        const FOCUS_INVISIBLE = 1 << 4;
        const CLIP_CHILDREN = 1 << 5;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    pub left: Value,
    pub right: Value,
    pub top: Value,
    pub bottom: Value,
}

/// Per-control font overrides; unset fields come from the style, then defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontSpec {
    pub family: Option<String>,
    pub size: Option<Value>,
    pub style: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContainerData {
    pub background: Option<Color>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RectangleData {
    pub background: Option<Color>,
    pub thickness: f32,
    pub corner_radius: f32,
}

impl Default for RectangleData {
    fn default() -> Self {
        Self {
            background: None,
            thickness: 1.0,
            corner_radius: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EllipseData {
    pub background: Option<Color>,
    pub thickness: f32,
}

impl Default for EllipseData {
    fn default() -> Self {
        Self {
            background: None,
            thickness: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StackPanelData {
    pub background: Option<Color>,
    pub vertical: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextData {
    pub text: String,
    /// Wrap at the available width instead of growing horizontally.
    pub wrap: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineData {
    pub x1: Value,
    pub y1: Value,
    /// Offset from the connected control's center when one is set.
    pub x2: Value,
    pub y2: Value,
    pub line_width: f32,
    pub dash: Vec<f32>,
    pub connected: Option<ControlId>,
    /// Endpoints from the last measure, in layout space.
    pub(crate) ends: [Vec2; 2],
}

impl Default for LineData {
    fn default() -> Self {
        Self {
            x1: Value::px(0.0).allow_negative(),
            y1: Value::px(0.0).allow_negative(),
            x2: Value::px(0.0).allow_negative(),
            y2: Value::px(0.0).allow_negative(),
            line_width: 1.0,
            dash: Vec::new(),
            connected: None,
            ends: [Vec2::ZERO; 2],
        }
    }
}

impl LineData {
    pub fn ends(&self) -> [Vec2; 2] {
        self.ends
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MultiLinePoint {
    Fixed { x: Value, y: Value },
    /// Follows the center of another control; skipped while it is detached.
    Attached(ControlId),
}

impl MultiLinePoint {
    pub fn fixed(x: impl ValueSource, y: impl ValueSource) -> Self {
        let mut vx = Value::px(0.0).allow_negative();
        let mut vy = Value::px(0.0).allow_negative();
        assign_or_log(&mut vx, x, "multi-line x");
        assign_or_log(&mut vy, y, "multi-line y");
        MultiLinePoint::Fixed { x: vx, y: vy }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiLineData {
    pub points: Vec<MultiLinePoint>,
    pub line_width: f32,
    pub dash: Vec<f32>,
    pub(crate) resolved: Vec<Vec2>,
}

impl Default for MultiLineData {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            line_width: 1.0,
            dash: Vec::new(),
            resolved: Vec::new(),
        }
    }
}

impl MultiLineData {
    pub fn resolved(&self) -> &[Vec2] {
        &self.resolved
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControlKind {
    /// Leaf with no intrinsic drawing; pair it with a painter.
    Plain,
    Container(ContainerData),
    Rectangle(RectangleData),
    /// Clips its children to the inscribed ellipse.
    Ellipse(EllipseData),
    StackPanel(StackPanelData),
    Text(TextData),
    Line(LineData),
    MultiLine(MultiLineData),
}

impl ControlKind {
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ControlKind::Container(_)
                | ControlKind::Rectangle(_)
                | ControlKind::Ellipse(_)
                | ControlKind::StackPanel(_)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ControlKind::Plain => "Control",
            ControlKind::Container(_) => "Container",
            ControlKind::Rectangle(_) => "Rectangle",
            ControlKind::Ellipse(_) => "Ellipse",
            ControlKind::StackPanel(_) => "StackPanel",
            ControlKind::Text(_) => "TextBlock",
            ControlKind::Line(_) => "Line",
            ControlKind::MultiLine(_) => "MultiLine",
        }
    }

    pub fn background(&self) -> Option<Color> {
        match self {
            ControlKind::Container(c) => c.background,
            ControlKind::Rectangle(r) => r.background,
            ControlKind::Ellipse(e) => e.background,
            ControlKind::StackPanel(s) => s.background,
            _ => None,
        }
    }

    /// Controls whose geometry follows other controls.
    pub(crate) fn attachments(&self) -> SmallVec<[ControlId; 4]> {
        match self {
            ControlKind::Line(l) => l.connected.into_iter().collect(),
            ControlKind::MultiLine(m) => m
                .points
                .iter()
                .filter_map(|p| match p {
                    MultiLinePoint::Attached(id) => Some(*id),
                    MultiLinePoint::Fixed { .. } => None,
                })
                .collect(),
            _ => SmallVec::new(),
        }
    }
}

/// Results of the last measure and draw passes.
#[derive(Clone, Debug, Default)]
pub(crate) struct LayoutState {
    pub rect: Rect,
    pub cached_parent: Option<Rect>,
    /// Space handed to children.
    pub content: Rect,
    pub transform: Affine2D,
    pub inverse: Affine2D,
    /// Pivot and parent transform the current `transform` was built from.
    pub transform_source: Option<(Vec2, Affine2D)>,
    pub font: Option<Font>,
    /// Content measurement failed; the control draws nothing until remeasured.
    pub broken: bool,
    pub warned: bool,
}

#[derive(Clone)]
pub struct Control {
    pub(crate) name: String,
    pub(crate) kind: ControlKind,
    pub(crate) width: Option<Value>,
    pub(crate) height: Option<Value>,
    pub(crate) padding: Padding,
    pub(crate) left: Value,
    pub(crate) top: Value,
    pub(crate) link_offset_x: Value,
    pub(crate) link_offset_y: Value,
    pub(crate) h_align: HorizontalAlignment,
    pub(crate) v_align: VerticalAlignment,
    pub(crate) scale_x: f32,
    pub(crate) scale_y: f32,
    pub(crate) rotation: f32,
    pub(crate) pivot_x: f32,
    pub(crate) pivot_y: f32,
    pub(crate) z_index: i32,
    pub(crate) alpha: f32,
    pub(crate) color: Color,
    pub(crate) flags: ControlFlags,
    pub(crate) font: FontSpec,
    pub(crate) style: Option<StyleId>,
    pub(crate) painter: Option<Painter>,
    pub(crate) handlers: Handlers,

    pub(crate) parent: Option<ControlId>,
    pub(crate) children: Vec<ControlId>,
    pub(crate) seq: u64,

    pub(crate) dirty: Dirty,
    pub(crate) layout: LayoutState,
    pub(crate) hovered_by: SmallVec<[PointerId; 2]>,
    pub(crate) pressed_by: SmallVec<[PointerId; 2]>,
}

impl Control {
    pub fn new(name: impl Into<String>, kind: ControlKind) -> Self {
        let mut flags = ControlFlags::VISIBLE | ControlFlags::HIT_TEST_VISIBLE;
        let (mut width, mut height) = (Some(Value::percent(100.0)), Some(Value::percent(100.0)));
        let (mut h_align, mut v_align) = (HorizontalAlignment::Center, VerticalAlignment::Center);
        match &kind {
            ControlKind::Container(_) | ControlKind::Rectangle(_) | ControlKind::Ellipse(_) => {
                flags |= ControlFlags::CLIP_CHILDREN;
            }
            ControlKind::StackPanel(s) => {
                flags |= ControlFlags::CLIP_CHILDREN;
                if s.vertical {
                    height = None;
                } else {
                    width = None;
                }
            }
            ControlKind::Text(_) => {
                width = None;
                height = None;
            }
            ControlKind::Line(_) | ControlKind::MultiLine(_) => {
                flags.remove(ControlFlags::HIT_TEST_VISIBLE);
                h_align = HorizontalAlignment::Left;
                v_align = VerticalAlignment::Top;
            }
            ControlKind::Plain => {}
        }
        Self {
            name: name.into(),
            kind,
            width,
            height,
            padding: Padding::default(),
            left: Value::px(0.0).allow_negative(),
            top: Value::px(0.0).allow_negative(),
            link_offset_x: Value::px(0.0).allow_negative(),
            link_offset_y: Value::px(0.0).allow_negative(),
            h_align,
            v_align,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            pivot_x: 0.5,
            pivot_y: 0.5,
            z_index: 0,
            alpha: 1.0,
            color: Color::BLACK,
            flags,
            font: FontSpec::default(),
            style: None,
            painter: None,
            handlers: Handlers::default(),
            parent: None,
            children: Vec::new(),
            seq: 0,
            dirty: Dirty::all(),
            layout: LayoutState::default(),
            hovered_by: SmallVec::new(),
            pressed_by: SmallVec::new(),
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, ControlKind::Plain)
    }

    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, ControlKind::Container(ContainerData::default()))
    }

    pub fn rectangle(name: impl Into<String>) -> Self {
        Self::new(name, ControlKind::Rectangle(RectangleData::default()))
    }

    pub fn ellipse(name: impl Into<String>) -> Self {
        Self::new(name, ControlKind::Ellipse(EllipseData::default()))
    }

    pub fn stack_panel(name: impl Into<String>, vertical: bool) -> Self {
        Self::new(
            name,
            ControlKind::StackPanel(StackPanelData {
                background: None,
                vertical,
            }),
        )
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            name,
            ControlKind::Text(TextData {
                text: text.into(),
                wrap: false,
            }),
        )
    }

    pub fn line(name: impl Into<String>) -> Self {
        Self::new(name, ControlKind::Line(LineData::default()))
    }

    pub fn multi_line(name: impl Into<String>, points: Vec<MultiLinePoint>) -> Self {
        Self::new(
            name,
            ControlKind::MultiLine(MultiLineData {
                points,
                ..MultiLineData::default()
            }),
        )
    }

    // Chained setters, used before the control is inserted.

    pub fn width(mut self, v: impl ValueSource) -> Self {
        assign_optional(&mut self.width, v, "width");
        self
    }

    pub fn height(mut self, v: impl ValueSource) -> Self {
        assign_optional(&mut self.height, v, "height");
        self
    }

    pub fn size(self, w: impl ValueSource, h: impl ValueSource) -> Self {
        self.width(w).height(h)
    }

    /// Sizes the width to content.
    pub fn auto_width(mut self) -> Self {
        self.width = None;
        self
    }

    pub fn auto_height(mut self) -> Self {
        self.height = None;
        self
    }

    pub fn padding(mut self, v: impl ValueSource) -> Self {
        let mut value = Value::default();
        match v.apply_to(&mut value) {
            Ok(_) => {
                self.padding = Padding {
                    left: value,
                    right: value,
                    top: value,
                    bottom: value,
                }
            }
            Err(e) => log::debug!("ignoring padding: {e}"),
        }
        self
    }

    pub fn padding_left(mut self, v: impl ValueSource) -> Self {
        assign_or_log(&mut self.padding.left, v, "padding_left");
        self
    }

    pub fn padding_right(mut self, v: impl ValueSource) -> Self {
        assign_or_log(&mut self.padding.right, v, "padding_right");
        self
    }

    pub fn padding_top(mut self, v: impl ValueSource) -> Self {
        assign_or_log(&mut self.padding.top, v, "padding_top");
        self
    }

    pub fn padding_bottom(mut self, v: impl ValueSource) -> Self {
        assign_or_log(&mut self.padding.bottom, v, "padding_bottom");
        self
    }

    pub fn left(mut self, v: impl ValueSource) -> Self {
        assign_or_log(&mut self.left, v, "left");
        self
    }

    pub fn top(mut self, v: impl ValueSource) -> Self {
        assign_or_log(&mut self.top, v, "top");
        self
    }

    pub fn link_offset(mut self, x: impl ValueSource, y: impl ValueSource) -> Self {
        assign_or_log(&mut self.link_offset_x, x, "link_offset_x");
        assign_or_log(&mut self.link_offset_y, y, "link_offset_y");
        self
    }

    pub fn align(mut self, h: HorizontalAlignment, v: VerticalAlignment) -> Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    pub fn horizontal_alignment(mut self, h: HorizontalAlignment) -> Self {
        self.h_align = h;
        self
    }

    pub fn vertical_alignment(mut self, v: VerticalAlignment) -> Self {
        self.v_align = v;
        self
    }

    pub fn rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale_x = sx;
        self.scale_y = sy;
        self
    }

    /// Transform center as fractions of the measured rect.
    pub fn pivot(mut self, x: f32, y: f32) -> Self {
        self.pivot_x = x;
        self.pivot_y = y;
        self
    }

    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        match &mut self.kind {
            ControlKind::Container(c) => c.background = Some(color),
            ControlKind::Rectangle(r) => r.background = Some(color),
            ControlKind::Ellipse(e) => e.background = Some(color),
            ControlKind::StackPanel(s) => s.background = Some(color),
            other => log::debug!("{} has no background", other.type_name()),
        }
        self
    }

    pub fn thickness(mut self, thickness: f32) -> Self {
        match &mut self.kind {
            ControlKind::Rectangle(r) => r.thickness = thickness.max(0.0),
            ControlKind::Ellipse(e) => e.thickness = thickness.max(0.0),
            ControlKind::Line(l) => l.line_width = thickness.max(0.0),
            ControlKind::MultiLine(m) => m.line_width = thickness.max(0.0),
            other => log::debug!("{} has no thickness", other.type_name()),
        }
        self
    }

    pub fn corner_radius(mut self, radius: f32) -> Self {
        if let ControlKind::Rectangle(r) = &mut self.kind {
            r.corner_radius = radius.max(0.0);
        }
        self
    }

    pub fn dash(mut self, dash: Vec<f32>) -> Self {
        match &mut self.kind {
            ControlKind::Line(l) => l.dash = dash,
            ControlKind::MultiLine(m) => m.dash = dash,
            other => log::debug!("{} has no dash pattern", other.type_name()),
        }
        self
    }

    pub fn wrap(mut self, wrap: bool) -> Self {
        if let ControlKind::Text(t) = &mut self.kind {
            t.wrap = wrap;
        }
        self
    }

    pub fn from_point(mut self, x: impl ValueSource, y: impl ValueSource) -> Self {
        if let ControlKind::Line(l) = &mut self.kind {
            assign_or_log(&mut l.x1, x, "x1");
            assign_or_log(&mut l.y1, y, "y1");
        }
        self
    }

    pub fn to_point(mut self, x: impl ValueSource, y: impl ValueSource) -> Self {
        if let ControlKind::Line(l) = &mut self.kind {
            assign_or_log(&mut l.x2, x, "x2");
            assign_or_log(&mut l.y2, y, "y2");
        }
        self
    }

    pub fn connected_to(mut self, id: ControlId) -> Self {
        if let ControlKind::Line(l) = &mut self.kind {
            l.connected = Some(id);
        }
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.flags.set(ControlFlags::VISIBLE, visible);
        self
    }

    pub fn hit_test_visible(mut self, on: bool) -> Self {
        self.flags.set(ControlFlags::HIT_TEST_VISIBLE, on);
        self
    }

    pub fn pointer_blocker(mut self, on: bool) -> Self {
        self.flags.set(ControlFlags::POINTER_BLOCKER, on);
        self
    }

    pub fn focusable(mut self, on: bool) -> Self {
        self.flags.set(ControlFlags::FOCUSABLE, on);
        self
    }

    pub fn focus_invisible(mut self, on: bool) -> Self {
        self.flags.set(ControlFlags::FOCUS_INVISIBLE, on);
        self
    }

    pub fn clip_children(mut self, on: bool) -> Self {
        self.flags.set(ControlFlags::CLIP_CHILDREN, on);
        self
    }

    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font.family = Some(family.into());
        self
    }

    pub fn font_size(mut self, v: impl ValueSource) -> Self {
        let mut value = self
            .font
            .size
            .unwrap_or(Value::px(veneer_core::DEFAULT_FONT_SIZE_PX));
        if assign_or_log(&mut value, v, "font_size") {
            self.font.size = Some(value);
        }
        self
    }

    pub fn font_style(mut self, style: impl Into<String>) -> Self {
        self.font.style = Some(style.into());
        self
    }

    pub fn style(mut self, style: StyleId) -> Self {
        self.style = Some(style);
        self
    }

    pub fn painter(mut self, f: impl Fn(&mut Scene, &Rect) + 'static) -> Self {
        self.painter = Some(Rc::new(f));
        self
    }

    pub fn on_pointer_enter(mut self, f: impl Fn(&mut EventCtx<'_>, &PointerInfo) + 'static) -> Self {
        self.handlers.on_pointer_enter = Some(pointer_handler(f));
        self
    }

    pub fn on_pointer_out(mut self, f: impl Fn(&mut EventCtx<'_>, &PointerInfo) + 'static) -> Self {
        self.handlers.on_pointer_out = Some(pointer_handler(f));
        self
    }

    pub fn on_pointer_down(mut self, f: impl Fn(&mut EventCtx<'_>, &PointerInfo) + 'static) -> Self {
        self.handlers.on_pointer_down = Some(pointer_handler(f));
        self
    }

    pub fn on_pointer_up(mut self, f: impl Fn(&mut EventCtx<'_>, &PointerInfo) + 'static) -> Self {
        self.handlers.on_pointer_up = Some(pointer_handler(f));
        self
    }

    pub fn on_pointer_move(mut self, f: impl Fn(&mut EventCtx<'_>, &PointerInfo) + 'static) -> Self {
        self.handlers.on_pointer_move = Some(pointer_handler(f));
        self
    }

    pub fn on_pointer_click(mut self, f: impl Fn(&mut EventCtx<'_>, &PointerInfo) + 'static) -> Self {
        self.handlers.on_pointer_click = Some(pointer_handler(f));
        self
    }

    pub fn on_focus(mut self, f: impl Fn(&mut EventCtx<'_>) + 'static) -> Self {
        self.handlers.on_focus = Some(control_handler(f));
        self
    }

    pub fn on_blur(mut self, f: impl Fn(&mut EventCtx<'_>) + 'static) -> Self {
        self.handlers.on_blur = Some(control_handler(f));
        self
    }

    pub fn on_key(mut self, f: impl Fn(&mut EventCtx<'_>, &KeyEvent) -> bool + 'static) -> Self {
        self.handlers.on_key = Some(Rc::new(f));
        self
    }

    /// Raised whenever this control requests a redraw.
    pub fn on_dirty(mut self, f: impl Fn(&mut EventCtx<'_>) + 'static) -> Self {
        self.handlers.on_dirty = Some(control_handler(f));
        self
    }

    pub fn on_after_draw(mut self, f: impl Fn(&mut EventCtx<'_>) + 'static) -> Self {
        self.handlers.on_after_draw = Some(control_handler(f));
        self
    }

    // Read access.

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn parent(&self) -> Option<ControlId> {
        self.parent
    }

    /// Children in draw order: ascending z-index, then insertion order.
    pub fn children(&self) -> &[ControlId] {
        &self.children
    }

    /// Measured rect from the last layout pass, in layout space.
    pub fn rect(&self) -> Rect {
        self.layout.rect
    }

    /// Center of the measured rect.
    pub fn center(&self) -> Vec2 {
        self.layout.rect.center()
    }

    /// Accumulated transform from the last draw pass.
    pub fn transform(&self) -> Affine2D {
        self.layout.transform
    }

    pub fn font(&self) -> Option<&Font> {
        self.layout.font.as_ref()
    }

    pub fn width_value(&self) -> Option<Value> {
        self.width
    }

    pub fn height_value(&self) -> Option<Value> {
        self.height
    }

    pub fn left_value(&self) -> Value {
        self.left
    }

    pub fn top_value(&self) -> Value {
        self.top
    }

    pub fn padding_value(&self) -> Padding {
        self.padding
    }

    pub fn alignment(&self) -> (HorizontalAlignment, VerticalAlignment) {
        (self.h_align, self.v_align)
    }

    pub fn rotation_angle(&self) -> f32 {
        self.rotation
    }

    pub fn scale_factors(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    pub fn z(&self) -> i32 {
        self.z_index
    }

    pub fn opacity(&self) -> f32 {
        self.alpha
    }

    pub fn foreground(&self) -> Color {
        self.color
    }

    pub fn flags(&self) -> ControlFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ControlFlags::VISIBLE)
    }

    pub fn is_hit_test_visible(&self) -> bool {
        self.flags.contains(ControlFlags::HIT_TEST_VISIBLE)
    }

    pub fn is_pointer_blocker(&self) -> bool {
        self.flags.contains(ControlFlags::POINTER_BLOCKER)
    }

    pub fn is_focusable(&self) -> bool {
        self.flags.contains(ControlFlags::FOCUSABLE)
    }

    pub fn is_focus_invisible(&self) -> bool {
        self.flags.contains(ControlFlags::FOCUS_INVISIBLE)
    }

    pub fn style_id(&self) -> Option<StyleId> {
        self.style
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Pointers currently over this control.
    pub fn hovered_by(&self) -> &[PointerId] {
        &self.hovered_by
    }

    /// Pointers pressed on this control and not yet released.
    pub fn pressed_by(&self) -> &[PointerId] {
        &self.pressed_by
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Whether the last content measurement failed.
    pub fn is_broken(&self) -> bool {
        self.layout.broken
    }

    /// Maps a layout-space point through the inverse of the accumulated
    /// transform.
    pub(crate) fn to_layout_space(&self, p: Vec2) -> Vec2 {
        self.layout.inverse.apply(p)
    }

    pub(crate) fn contains(&self, p: Vec2) -> bool {
        self.layout.rect.contains(self.to_layout_space(p))
    }

    pub(crate) fn local_point(&self, p: Vec2) -> Vec2 {
        let q = self.to_layout_space(p);
        Vec2::new(q.x - self.layout.rect.left, q.y - self.layout.rect.top)
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("flags", &self.flags)
            .field("rect", &self.layout.rect)
            .field("dirty", &self.dirty)
            .field("painter", &self.painter.is_some())
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

fn pointer_handler(f: impl Fn(&mut EventCtx<'_>, &PointerInfo) + 'static) -> PointerHandler {
    Rc::new(f)
}

fn control_handler(f: impl Fn(&mut EventCtx<'_>) + 'static) -> ControlHandler {
    Rc::new(f)
}

/// Applies `source`, logging and keeping the old value on a parse failure.
/// Returns whether the value changed.
pub(crate) fn assign_or_log(target: &mut Value, source: impl ValueSource, what: &str) -> bool {
    match source.apply_to(target) {
        Ok(changed) => changed,
        Err(e) => {
            log::debug!("ignoring {what}: {e}");
            false
        }
    }
}

pub(crate) fn assign_optional(
    target: &mut Option<Value>,
    source: impl ValueSource,
    what: &str,
) -> bool {
    let was_auto = target.is_none();
    let mut value = target.unwrap_or_default();
    match source.apply_to(&mut value) {
        Ok(changed) => {
            *target = Some(value);
            changed || was_auto
        }
        Err(e) => {
            log::debug!("ignoring {what}: {e}");
            false
        }
    }
}
