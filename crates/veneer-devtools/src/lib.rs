use web_time::Instant;

use veneer_core::{Affine2D, Color, Font, PointerId, Rect, Scene, SceneNode};
use veneer_ui::{ControlId, RenderStats, Surface};

const HUD_TEXT: Color = Color::from_rgb(0xAA, 0xAA, 0xAA);
const OUTLINE: Color = Color::from_rgb(0x44, 0xAA, 0xFF);

pub struct Hud {
    pub inspector_enabled: bool,
    /// Layout-space rect and accumulated transform of the outlined control.
    pub hovered: Option<(Rect, Affine2D)>,
    frame_count: u64,
    last_frame: Option<Instant>,
    fps_smooth: f32,
    pub metrics: Option<Metrics>,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            inspector_enabled: false,
            hovered: None,
            frame_count: 0,
            last_frame: None,
            fps_smooth: 0.0,
            metrics: None,
        }
    }

    pub fn toggle_inspector(&mut self) {
        self.inspector_enabled = !self.inspector_enabled;
    }

    pub fn set_hovered(&mut self, hovered: Option<(Rect, Affine2D)>) {
        self.hovered = hovered;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f32 {
        self.fps_smooth
    }

    fn tick(&mut self) {
        self.frame_count += 1;
        let now = Instant::now();
        if let Some(prev) = self.last_frame.replace(now) {
            let dt = (now - prev).as_secs_f32();
            if dt > 0.0 {
                let fps = 1.0 / dt;
                // EMA
                let a = 0.2;
                self.fps_smooth = if self.fps_smooth == 0.0 {
                    fps
                } else {
                    (1.0 - a) * self.fps_smooth + a * fps
                };
            }
        }
    }

    /// Status line shown in the top-left corner.
    pub fn status_line(&self) -> String {
        let mut parts = vec![
            format!("frame: {}", self.frame_count),
            format!("fps: {:.1}", self.fps_smooth),
        ];
        if let Some(m) = &self.metrics {
            parts.push(format!("measured: {}", m.measured));
            parts.push(format!("drawn: {}", m.drawn));
            parts.push(format!("nodes: {}", m.scene_nodes));
        }
        parts.join("  |  ")
    }

    pub fn overlay(&mut self, scene: &mut Scene) {
        self.tick();
        scene.push(SceneNode::Text {
            rect: Rect::new(8.0, 8.0, 320.0, 16.0),
            text: self.status_line(),
            color: HUD_TEXT,
            font: Font {
                size_px: 14.0,
                ..Font::default()
            },
        });

        if let Some((rect, transform)) = self.hovered {
            let transformed = !transform.is_identity();
            if transformed {
                scene.push(SceneNode::PushTransform { transform });
            }
            scene.push(SceneNode::Border {
                rect,
                color: OUTLINE,
                width: 2.0,
                radius: 0.0,
            });
            if transformed {
                scene.push(SceneNode::PopTransform);
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    pub measured: usize,
    pub drawn: usize,
    pub scene_nodes: usize,
}

impl From<&RenderStats> for Metrics {
    fn from(stats: &RenderStats) -> Self {
        Self {
            measured: stats.measured,
            drawn: stats.drawn,
            scene_nodes: stats.commands,
        }
    }
}

pub struct Inspector {
    pub hud: Hud,
    /// Pointer whose hovered control gets outlined.
    pub pointer: PointerId,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            hud: Hud::new(),
            pointer: PointerId::MOUSE,
        }
    }

    /// Picks up the stats of the pass that just ran and the control under
    /// the tracked pointer.
    pub fn observe(&mut self, surface: &Surface, stats: &RenderStats) {
        self.hud.metrics = Some(Metrics::from(stats));
        let hovered = surface
            .interaction()
            .over(self.pointer)
            .and_then(|id| outline_of(surface, id));
        self.hud.set_hovered(hovered);
    }

    pub fn frame(&mut self, scene: &mut Scene) {
        if self.hud.inspector_enabled {
            self.hud.overlay(scene);
        }
    }
}

fn outline_of(surface: &Surface, id: ControlId) -> Option<(Rect, Affine2D)> {
    let c = surface.control(id)?;
    if !c.is_visible() {
        return None;
    }
    log::trace!("outlining {} '{}'", c.type_name(), c.name());
    Some((c.rect(), c.transform()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_core::PointerSample;
    use veneer_ui::{Control, SurfaceConfig};

    #[test]
    fn disabled_inspector_draws_nothing() {
        let mut inspector = Inspector::new();
        let mut scene = Scene::default();
        inspector.frame(&mut scene);
        assert!(scene.is_empty());
        assert_eq!(inspector.hud.frame_count(), 0);
    }

    #[test]
    fn overlay_reports_stats_and_outlines_hover() {
        let mut surface = Surface::new(SurfaceConfig::new(800.0, 600.0));
        let button = surface.add_control(Control::plain("button").size("100px", "40px"));
        let mut frame = surface.render();
        surface.pointer(PointerSample::mouse_move(400.0, 300.0));

        let mut inspector = Inspector::new();
        inspector.hud.toggle_inspector();
        inspector.observe(&surface, &frame.stats);
        inspector.frame(&mut frame.scene);

        let status = frame.scene.nodes.iter().find_map(|n| match n {
            SceneNode::Text { text, .. } => Some(text.clone()),
            _ => None,
        });
        let status = status.unwrap();
        assert!(status.starts_with("frame: 1"));
        assert!(status.contains("measured: 2"));

        let outline = surface.control(button).unwrap().rect();
        assert!(frame.scene.nodes.iter().any(|n| matches!(
            n,
            SceneNode::Border { rect, width, .. } if *rect == outline && *width == 2.0
        )));
        assert!(frame.scene.is_balanced());
    }

    #[test]
    fn no_outline_without_hover() {
        let surface = Surface::new(SurfaceConfig::new(100.0, 100.0));
        let mut inspector = Inspector::new();
        inspector.hud.hovered = Some((Rect::new(0.0, 0.0, 1.0, 1.0), Affine2D::IDENTITY));
        inspector.observe(&surface, &RenderStats::default());
        assert!(inspector.hud.hovered.is_none());
        assert_eq!(inspector.hud.metrics, Some(Metrics::default()));
    }
}
