//! The render surface: owns the control tree and drives measure, draw,
//! picking and event dispatch.

use std::collections::HashMap;

use slotmap::SlotMap;
use veneer_core::{
    KeyEvent, PointerButton, PointerId, PointerKind, PointerSample, Rect, RenderBackend, Scene,
    Size, Style, Vec2,
};

use crate::config::SurfaceConfig;
use crate::control::Control;
use crate::dirty::{self, Change, Dirty};
use crate::editor::ControlMut;
use crate::event::{Command, ControlHandler, EventCtx, Handlers, PointerHandler, PointerInfo};
use crate::interaction::{InteractionState, Transition, Transitions};
use crate::layout::{self, LayoutPass};
use crate::measure::{ContentMeasurer, FixedAdvanceMeasurer};
use crate::paint::PaintPass;
use crate::picking::{self, PickResult};
use crate::tree::{ControlId, StyleId, Tree, TreeError};

/// Bound on command flush rounds, so handlers that keep queueing work
/// for each other cannot hang the loop.
const MAX_FLUSH_ROUNDS: usize = 32;
/// Extra layout rounds allowed for lines chasing controls measured after them.
const MAX_ATTACHMENT_ROUNDS: usize = 2;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Controls measured this pass.
    pub measured: usize,
    pub measured_ids: Vec<ControlId>,
    /// Controls that produced draw output.
    pub drawn: usize,
    /// Scene node count.
    pub commands: usize,
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub scene: Scene,
    pub stats: RenderStats,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerOutcome {
    /// Control the sample was routed to.
    pub target: Option<ControlId>,
    /// At least one handler ran.
    pub handled: bool,
    /// A pointer blocker covered the sample.
    pub blocked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PointerEvent {
    Enter,
    Out,
    Down,
    Up,
    Move,
    Click,
}

impl PointerEvent {
    fn handler(self, h: &Handlers) -> Option<PointerHandler> {
        match self {
            PointerEvent::Enter => h.on_pointer_enter.clone(),
            PointerEvent::Out => h.on_pointer_out.clone(),
            PointerEvent::Down => h.on_pointer_down.clone(),
            PointerEvent::Up => h.on_pointer_up.clone(),
            PointerEvent::Move => h.on_pointer_move.clone(),
            PointerEvent::Click => h.on_pointer_click.clone(),
        }
    }
}

pub struct Surface {
    tree: Tree,
    interaction: InteractionState,
    /// Hovered control and its ancestors per pointer, deepest first.
    hover_chains: HashMap<PointerId, Vec<ControlId>>,
    /// Last sample position per pointer, reported by leave and cancel.
    positions: HashMap<PointerId, Vec2>,
    focused: Option<ControlId>,
    dirty: bool,
    config: SurfaceConfig,
    styles: SlotMap<StyleId, Style>,
    measurer: Box<dyn ContentMeasurer>,
    commands: Vec<Command>,
    configured: Option<(u32, u32)>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl Surface {
    pub fn new(config: SurfaceConfig) -> Self {
        log::debug!("surface {}x{}", config.width, config.height);
        Self {
            tree: Tree::new(),
            interaction: InteractionState::default(),
            positions: HashMap::new(),
            hover_chains: HashMap::new(),
            focused: None,
            dirty: true,
            config,
            styles: SlotMap::with_key(),
            measurer: Box::new(FixedAdvanceMeasurer::default()),
            commands: Vec::new(),
            configured: None,
        }
    }

    pub fn with_measurer(mut self, measurer: impl ContentMeasurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        for (_, c) in self.tree.iter_mut() {
            c.dirty |= Dirty::LAYOUT;
        }
        self.dirty = true;
        self
    }

    pub fn root(&self) -> ControlId {
        self.tree.root()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn size(&self) -> Size {
        Size::new(self.config.width, self.config.height)
    }

    pub fn adaptive_scale(&self) -> f32 {
        self.config.adaptive_scale()
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.tree.get(id)
    }

    pub fn control_mut(&mut self, id: ControlId) -> Option<ControlMut<'_>> {
        self.tree.contains(id).then(|| ControlMut::new(self, id))
    }

    // Tree management

    /// Adds a detached control; attach it later with [`Surface::attach`].
    pub fn insert(&mut self, control: Control) -> ControlId {
        self.tree.insert(control)
    }

    /// Adds a control directly under the root.
    pub fn add_control(&mut self, control: Control) -> ControlId {
        let root = self.tree.root();
        let id = self.tree.insert(control);
        self.attach(root, id)
            .map(|_| id)
            .unwrap_or_else(|e| {
                log::warn!("add_control: {e}");
                id
            })
    }

    /// Creates `control` under `parent`.
    pub fn add_child(&mut self, parent: ControlId, control: Control) -> Result<ControlId, TreeError> {
        let id = self.tree.insert(control);
        match self.attach(parent, id) {
            Ok(()) => Ok(id),
            Err(e) => {
                let _ = self.tree.dispose(id);
                Err(e)
            }
        }
    }

    /// Moves an existing control under `parent`.
    pub fn attach(&mut self, parent: ControlId, id: ControlId) -> Result<(), TreeError> {
        let old_parent = self.tree.parent(id);
        self.tree.add_child(parent, id)?;
        if let Some(old) = old_parent.filter(|o| *o != parent) {
            self.invalidate(old, Change::Layout);
        }
        for n in self.tree.descendants(id) {
            if let Some(c) = self.tree.get_mut(n) {
                c.dirty |= Dirty::LAYOUT | Dirty::MATRIX | Dirty::FONT;
            }
        }
        self.invalidate(id, Change::Layout);
        if !self.tree.is_attached(id) {
            let ids = self.tree.descendants(id);
            self.clean_after_removal(&ids);
        }
        Ok(())
    }

    /// Detaches `id` from whichever container holds it. Returns `false` when
    /// it had no parent.
    pub fn remove_control(&mut self, id: ControlId) -> bool {
        match self.tree.parent(id) {
            Some(parent) => self.remove_child(parent, id),
            None => false,
        }
    }

    /// Detaches `child` from `parent`; a no-op returning `false` when it is
    /// not a direct child.
    pub fn remove_child(&mut self, parent: ControlId, child: ControlId) -> bool {
        if !self.tree.remove_child(parent, child) {
            return false;
        }
        let ids = self.tree.descendants(child);
        self.clean_after_removal(&ids);
        self.invalidate(parent, Change::Layout);
        true
    }

    /// Removes `id` and its subtree from the surface for good.
    pub fn dispose(&mut self, id: ControlId) -> Result<(), TreeError> {
        if id == self.tree.root() {
            return Err(TreeError::RootImmutable);
        }
        let parent = self.tree.parent(id);
        let ids = self.tree.descendants(id);
        self.clean_after_removal(&ids);
        self.tree.dispose(id)?;
        if let Some(p) = parent {
            self.invalidate(p, Change::Layout);
        }
        self.dirty = true;
        Ok(())
    }

    /// Forgets hover, press, capture and focus held by any of `ids`.
    pub(crate) fn clean_after_removal(&mut self, ids: &[ControlId]) {
        self.interaction.forget_controls(ids);
        for chain in self.hover_chains.values_mut() {
            chain.retain(|c| !ids.contains(c));
        }
        self.hover_chains.retain(|_, chain| !chain.is_empty());
        if self.focused.is_some_and(|f| ids.contains(&f)) {
            self.focused = None;
        }
        for id in ids {
            if let Some(c) = self.tree.get_mut(*id) {
                c.hovered_by.clear();
                c.pressed_by.clear();
            }
        }
    }

    pub fn execute_on_all_controls(&mut self, mut f: impl FnMut(&mut ControlMut<'_>)) {
        for id in self.tree.reachable() {
            if self.tree.contains(id) {
                f(&mut ControlMut::new(self, id));
            }
        }
    }

    // Dirty tracking

    pub(crate) fn invalidate(&mut self, id: ControlId, change: Change) {
        dirty::apply(&mut self.tree, id, change);
        self.dirty = true;
        let handler = self.tree.get(id).and_then(|c| c.handlers.on_dirty.clone());
        if let Some(h) = handler {
            self.run_control_handler(id, &h);
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if self.config.width == width && self.config.height == height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if self.config.is_adaptive() {
            for (_, c) in self.tree.iter_mut() {
                c.dirty |= Dirty::LAYOUT | Dirty::FONT;
            }
        }
        log::debug!("surface resized to {width}x{height}");
        self.dirty = true;
    }

    // Styles

    pub fn create_style(&mut self, style: Style) -> StyleId {
        self.styles.insert(style)
    }

    pub fn style(&self, id: StyleId) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Edits a shared style; every control using it re-resolves its font.
    pub fn update_style(&mut self, id: StyleId, f: impl FnOnce(&mut Style)) -> bool {
        let Some(style) = self.styles.get_mut(id) else {
            return false;
        };
        let before = style.clone();
        f(style);
        if *style == before {
            return false;
        }
        for user in self.style_users(id) {
            self.invalidate(user, Change::Font);
        }
        true
    }

    pub fn dispose_style(&mut self, id: StyleId) -> bool {
        if self.styles.remove(id).is_none() {
            return false;
        }
        for user in self.style_users(id) {
            if let Some(c) = self.tree.get_mut(user) {
                c.style = None;
            }
            self.invalidate(user, Change::Font);
        }
        true
    }

    fn style_users(&self, id: StyleId) -> Vec<ControlId> {
        self.tree
            .iter()
            .filter(|(_, c)| c.style == Some(id))
            .map(|(cid, _)| cid)
            .collect()
    }

    /// See [`ControlMut::move_to_projected_position`].
    pub fn move_to_projected_position(&mut self, id: ControlId, x: f32, y: f32) -> bool {
        self.control_mut(id)
            .is_some_and(|mut c| c.move_to_projected_position(x, y))
    }

    // Rendering

    fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, self.config.width, self.config.height)
    }

    /// Runs a pass when something changed and hands the scene to `backend`.
    pub fn tick(&mut self, backend: &mut dyn RenderBackend) -> Option<RenderStats> {
        let frame = self.render_if_dirty()?;
        let size = (
            self.config.width.max(0.0) as u32,
            self.config.height.max(0.0) as u32,
        );
        if self.configured != Some(size) {
            backend.configure_surface(size.0, size.1);
            self.configured = Some(size);
        }
        backend.frame(&frame.scene);
        Some(frame.stats)
    }

    pub fn render_if_dirty(&mut self) -> Option<Frame> {
        self.flush();
        self.dirty.then(|| self.render())
    }

    /// Measures what is dirty and draws the whole tree.
    pub fn render(&mut self) -> Frame {
        self.flush();
        let viewport = self.viewport();
        let scale = self.config.adaptive_scale();

        let mut measured = Vec::new();
        for round in 0..=MAX_ATTACHMENT_ROUNDS {
            let mut pass = LayoutPass::new(&mut self.tree, &self.styles, self.measurer.as_ref(), scale);
            pass.run(viewport);
            measured.append(&mut pass.measured);

            let stale = layout::stale_attachments(&self.tree, scale);
            if stale.is_empty() {
                break;
            }
            if round == MAX_ATTACHMENT_ROUNDS {
                log::debug!("{} line(s) still chasing their targets", stale.len());
                break;
            }
            for id in stale {
                dirty::apply(&mut self.tree, id, Change::Layout);
            }
        }

        let mut scene = Scene::new(self.config.clear_color);
        let drawn = {
            let mut pass = PaintPass::new(&mut self.tree, &mut scene);
            pass.run(viewport);
            pass.drawn
        };
        self.dirty = false;

        for id in &drawn {
            let handler = self.tree.get(*id).and_then(|c| c.handlers.on_after_draw.clone());
            if let Some(h) = handler {
                self.run_control_handler(*id, &h);
            }
        }
        self.flush();

        let stats = RenderStats {
            measured: measured.len(),
            measured_ids: measured,
            drawn: drawn.len(),
            commands: scene.len(),
        };
        log::debug!(
            "frame: measured {}, drew {}, {} scene node(s)",
            stats.measured,
            stats.drawn,
            stats.commands
        );
        Frame { scene, stats }
    }

    // Picking

    pub fn pick(&self, x: f32, y: f32) -> Option<ControlId> {
        self.pick_detailed(x, y).target
    }

    pub fn pick_detailed(&self, x: f32, y: f32) -> PickResult {
        picking::pick(&self.tree, self.tree.root(), Vec2::new(x, y))
    }

    // Focus

    pub fn focused(&self) -> Option<ControlId> {
        self.focused
    }

    /// Blurs the current holder, then focuses `next` if it is attached and
    /// focusable. Commands queued by the handlers run afterwards.
    pub fn request_focus(&mut self, next: Option<ControlId>) {
        self.set_focus(next);
        self.flush();
    }

    fn set_focus(&mut self, next: Option<ControlId>) {
        let next = next.filter(|id| {
            let ok = self.tree.is_attached(*id)
                && self.tree.get(*id).is_some_and(|c| c.is_focusable() && c.is_visible());
            if !ok {
                log::debug!("{id:?} cannot take focus");
            }
            ok
        });
        if self.focused == next {
            return;
        }
        if let Some(prev) = self.focused.take() {
            let handler = self.tree.get(prev).and_then(|c| c.handlers.on_blur.clone());
            if let Some(h) = handler {
                self.run_control_handler(prev, &h);
            }
        }
        if let Some(id) = next {
            self.focused = Some(id);
            let handler = self.tree.get(id).and_then(|c| c.handlers.on_focus.clone());
            if let Some(h) = handler {
                self.run_control_handler(id, &h);
            }
        }
    }

    /// Pointer-down focus rule: focusable hits take focus; anything else
    /// blurs unless it is focus-invisible. Only the picked control counts,
    /// so pressing a non-focusable child of the focused control blurs it.
    fn manage_focus(&mut self, hit: Option<ControlId>) {
        let hit = hit.and_then(|id| {
            self.tree
                .get(id)
                .map(|c| (id, c.is_focusable(), c.is_focus_invisible()))
        });
        match hit {
            Some((id, true, _)) => self.set_focus(Some(id)),
            Some((_, false, true)) => {}
            _ => self.set_focus(None),
        }
    }

    /// Forwards a key to the focused control. Returns whether it was consumed.
    pub fn key(&mut self, event: &KeyEvent) -> bool {
        self.flush();
        let Some(id) = self.focused else {
            return false;
        };
        let Some(h) = self.tree.get(id).and_then(|c| c.handlers.on_key.clone()) else {
            return false;
        };
        let consumed = {
            let mut ctx = EventCtx::new(&self.tree, &mut self.commands, id, None);
            h(&mut ctx, event)
        };
        self.flush();
        consumed
    }

    // Pointer input

    pub fn pointer(&mut self, sample: PointerSample) -> PointerOutcome {
        self.flush();
        let p = sample.pointer_id;
        self.positions.insert(p, sample.position);
        let pick = picking::pick(&self.tree, self.tree.root(), sample.position);
        let transitions = match sample.kind {
            PointerKind::Move => self.interaction.pointer_move(p, pick.target),
            PointerKind::Down => self.interaction.pointer_down(p, pick.target),
            PointerKind::Up => {
                let path = pick
                    .target
                    .map(|t| self.tree.path_to_root(t))
                    .unwrap_or_default();
                self.interaction.pointer_up(p, &path)
            }
        };
        log::trace!("{:?} {:?} -> {:?}: {transitions:?}", p, sample.kind, pick.target);

        let target = transitions.iter().find_map(|t| match t {
            Transition::Move(id) | Transition::Down(id) => Some(*id),
            Transition::Up { target, .. } => Some(*target),
            _ => None,
        });
        let handled = self.run_transitions(&sample, transitions);
        if sample.kind == PointerKind::Down {
            self.manage_focus(pick.target);
        }
        self.flush();
        PointerOutcome {
            target,
            handled,
            blocked: pick.blocked,
        }
    }

    /// The pointer left the render target: hover ends, presses stay.
    pub fn pointer_leave(&mut self, pointer: PointerId) {
        let transitions = self.interaction.pointer_leave(pointer);
        let at = self.positions.get(&pointer).copied().unwrap_or_default();
        let sample = PointerSample::new(pointer, PointerKind::Move, at.x, at.y);
        self.run_transitions(&sample, transitions);
        self.flush();
    }

    /// Drops all state for `pointer`, firing out on whatever it hovered.
    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        if let Some(down) = self.interaction.down(pointer) {
            if let Some(c) = self.tree.get_mut(down) {
                c.pressed_by.retain(|p| *p != pointer);
            }
        }
        let transitions = self.interaction.forget_pointer(pointer);
        let at = self.positions.remove(&pointer).unwrap_or_default();
        let sample = PointerSample::new(pointer, PointerKind::Move, at.x, at.y);
        self.run_transitions(&sample, transitions);
        self.flush();
    }

    fn run_transitions(&mut self, sample: &PointerSample, transitions: Transitions) -> bool {
        let p = sample.pointer_id;
        let mut handled = false;
        let mut hover_done = false;
        for t in transitions {
            match t {
                Transition::Out(_) | Transition::Enter(_) => {
                    if !hover_done {
                        let over = self.interaction.over(p);
                        handled |= self.update_hover(sample, over);
                        hover_done = true;
                    }
                }
                Transition::Move(id) => handled |= self.bubble(id, PointerEvent::Move, sample),
                Transition::Down(id) => {
                    if let Some(c) = self.tree.get_mut(id) {
                        if !c.pressed_by.contains(&p) {
                            c.pressed_by.push(p);
                        }
                    }
                    handled |= self.bubble(id, PointerEvent::Down, sample);
                }
                Transition::Up { target, click } => {
                    if let Some(c) = self.tree.get_mut(target) {
                        c.pressed_by.retain(|q| *q != p);
                    }
                    handled |= self.bubble(target, PointerEvent::Up, sample);
                    if click {
                        handled |= self.bubble(target, PointerEvent::Click, sample);
                    }
                }
            }
        }
        handled
    }

    /// Fires out on controls leaving the hover chain, then enter on the ones
    /// joining it, deepest first.
    fn update_hover(&mut self, sample: &PointerSample, over: Option<ControlId>) -> bool {
        let p = sample.pointer_id;
        let new_chain: Vec<ControlId> = over
            .map(|id| self.tree.path_to_root(id).into_vec())
            .unwrap_or_default();
        let old_chain = self.hover_chains.remove(&p).unwrap_or_default();
        let mut handled = false;

        let old_target = old_chain.first().copied();
        for id in old_chain.iter().filter(|id| !new_chain.contains(id)) {
            if let Some(c) = self.tree.get_mut(*id) {
                c.hovered_by.retain(|q| *q != p);
            }
            if let Some(target) = old_target {
                handled |= self.fire(&[*id], target, PointerEvent::Out, sample);
            }
        }
        for id in new_chain.iter().filter(|id| !old_chain.contains(id)) {
            if let Some(c) = self.tree.get_mut(*id) {
                if !c.hovered_by.contains(&p) {
                    c.hovered_by.push(p);
                }
            }
            if let Some(target) = over {
                handled |= self.fire(&[*id], target, PointerEvent::Enter, sample);
            }
        }
        if !new_chain.is_empty() {
            self.hover_chains.insert(p, new_chain);
        }
        handled
    }

    /// Delivers `event` to `target` and then its ancestors until a handler
    /// stops propagation.
    fn bubble(&mut self, target: ControlId, event: PointerEvent, sample: &PointerSample) -> bool {
        let chain = self.tree.path_to_root(target);
        self.fire(&chain, target, event, sample)
    }

    fn fire(
        &mut self,
        chain: &[ControlId],
        target: ControlId,
        event: PointerEvent,
        sample: &PointerSample,
    ) -> bool {
        let tree = &self.tree;
        let mut ctx = EventCtx::new(tree, &mut self.commands, target, Some(sample.pointer_id));
        let mut handled = false;
        for id in chain {
            let Some(c) = tree.get(*id) else {
                continue;
            };
            let Some(h) = event.handler(&c.handlers) else {
                continue;
            };
            ctx.set_current(*id);
            let info = PointerInfo {
                pointer_id: sample.pointer_id,
                button: sample.button,
                position: sample.position,
                local: c.local_point(sample.position),
                target,
            };
            h(&mut ctx, &info);
            handled = true;
            if ctx.is_propagation_stopped() {
                break;
            }
        }
        handled
    }

    fn run_control_handler(&mut self, id: ControlId, h: &ControlHandler) {
        let mut ctx = EventCtx::new(&self.tree, &mut self.commands, id, None);
        h(&mut ctx);
    }

    /// Applies commands queued by handlers.
    fn flush(&mut self) {
        for _ in 0..MAX_FLUSH_ROUNDS {
            if self.commands.is_empty() {
                return;
            }
            for cmd in std::mem::take(&mut self.commands) {
                self.apply(cmd);
            }
        }
        if !self.commands.is_empty() {
            log::warn!(
                "dropping {} handler command(s) after {MAX_FLUSH_ROUNDS} rounds",
                self.commands.len()
            );
            self.commands.clear();
        }
    }

    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Capture(p, id) => {
                let live = self.tree.is_attached(id)
                    && self.tree.get(id).is_some_and(|c| c.is_visible());
                if live {
                    self.interaction.capture(p, id);
                } else {
                    log::debug!("ignoring capture of {p:?} by detached {id:?}");
                }
            }
            Command::ReleaseCapture(p) => {
                self.interaction.release_capture(p);
            }
            Command::Focus(next) => self.set_focus(next),
            Command::MarkDirty => self.dirty = true,
            Command::Edit(id, f) => {
                if let Some(mut c) = self.control_mut(id) {
                    f(&mut c);
                }
            }
        }
    }

    /// Pointers hovering `id`.
    pub fn hovered_by(&self, id: ControlId) -> &[PointerId] {
        self.tree.get(id).map(|c| c.hovered_by()).unwrap_or(&[])
    }

    /// Convenience for hosts with a single mouse pointer.
    pub fn mouse(&mut self, kind: PointerKind, x: f32, y: f32) -> PointerOutcome {
        self.pointer(PointerSample::new(PointerId::MOUSE, kind, x, y).with_button(PointerButton::Primary))
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("controls", &self.tree.len())
            .field("focused", &self.focused)
            .field("dirty", &self.dirty)
            .field("config", &self.config)
            .field("interaction", &self.interaction)
            .finish()
    }
}
