use std::cell::Cell;
use std::rc::Rc;

use veneer_core::{Color, Font, Key, KeyEvent, PointerSample, RenderBackend, Scene, SceneNode};
use veneer_devtools::Inspector;
use veneer_ui::*;

/// Logs a one-line summary of every scene it receives.
#[derive(Default)]
struct LogBackend {
    frames: usize,
}

impl RenderBackend for LogBackend {
    fn configure_surface(&mut self, width: u32, height: u32) {
        log::info!("configure {width}x{height}");
    }

    fn frame(&mut self, scene: &Scene) {
        self.frames += 1;
        let texts: Vec<&str> = scene
            .nodes
            .iter()
            .filter_map(|n| match n {
                SceneNode::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        log::info!(
            "frame {}: {} node(s), text {:?}",
            self.frames,
            scene.len(),
            texts
        );
    }
}

fn button(name: &str, label: &str, on_click: impl Fn(&mut EventCtx<'_>) + 'static) -> Control {
    Control::rectangle(name)
        .size("160px", "40px")
        .corner_radius(6.0)
        .background(Color::from_rgb(0x33, 0x22, 0x55))
        .color(Color::from_rgb(0x88, 0x77, 0xAA))
        .focusable(true)
        .on_pointer_enter(|ctx, _| ctx.edit_self(|c| {
            c.set_alpha(0.8);
        }))
        .on_pointer_out(|ctx, _| ctx.edit_self(|c| {
            c.set_alpha(1.0);
        }))
        .on_pointer_click(move |ctx, _| on_click(ctx))
        .on_key(|ctx, ev| {
            if ev.key == Key::Enter {
                log::info!("enter on {:?}", ctx.current());
                true
            } else {
                false
            }
        })
        .painter({
            let label = label.to_string();
            move |scene, rect| {
                scene.push(SceneNode::Text {
                    rect: *rect,
                    text: label.clone(),
                    color: Color::WHITE,
                    font: Font::default(),
                });
            }
        })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut surface = Surface::new(
        SurfaceConfig::new(640.0, 480.0).clear_color(Color::from_rgb(0x22, 0x16, 0x28)),
    );
    let count = Rc::new(Cell::new(0i32));

    let column = surface.add_control(Control::stack_panel("column", true).padding("12px"));
    let label = surface.add_child(column, Control::text("label", "Count: 0").font_size("24px"))?;

    let update = {
        let count = count.clone();
        move |delta: i32| {
            let count = count.clone();
            move |ctx: &mut EventCtx<'_>| {
                count.set(count.get() + delta);
                let text = format!("Count: {}", count.get());
                ctx.edit(label, move |c| {
                    c.set_text(text);
                });
            }
        }
    };
    surface.add_child(column, button("increment", "+", update(1)))?;
    let decrement = surface.add_child(column, button("decrement", "-", update(-1)))?;

    let mut backend = LogBackend::default();
    let mut inspector = Inspector::new();
    inspector.hud.toggle_inspector();

    let frame = surface.render();
    let inc = surface.tree().child_by_name(column, "increment");
    let at = |id: Option<ControlId>| {
        id.and_then(|id| surface.control(id))
            .map(|c| c.center())
            .unwrap_or_default()
    };
    let (inc_at, dec_at) = (at(inc), at(Some(decrement)));
    inspector.observe(&surface, &frame.stats);
    let mut scene = frame.scene;
    inspector.frame(&mut scene);
    backend.configure_surface(640, 480);
    backend.frame(&scene);

    let script = [
        PointerSample::mouse_move(inc_at.x, inc_at.y),
        PointerSample::mouse_down(inc_at.x, inc_at.y),
        PointerSample::mouse_up(inc_at.x, inc_at.y),
        PointerSample::mouse_down(inc_at.x, inc_at.y),
        PointerSample::mouse_up(inc_at.x, inc_at.y),
        PointerSample::mouse_move(dec_at.x, dec_at.y),
        PointerSample::mouse_down(dec_at.x, dec_at.y),
        PointerSample::mouse_up(dec_at.x, dec_at.y),
    ];
    for sample in script {
        let kind = sample.kind;
        let outcome = surface.pointer(sample);
        log::debug!("{kind:?} -> {:?}", outcome.target);
        if let Some(frame) = surface.render_if_dirty() {
            inspector.observe(&surface, &frame.stats);
            let mut scene = frame.scene;
            inspector.frame(&mut scene);
            backend.frame(&scene);
        }
    }
    surface.key(&KeyEvent::pressed(Key::Enter));

    log::info!(
        "final count {} after {} frame(s), focus on {:?}",
        count.get(),
        backend.frames,
        surface.focused().and_then(|id| surface.control(id)).map(|c| c.name().to_string())
    );
    anyhow::ensure!(count.get() == 1, "unexpected count {}", count.get());
    Ok(())
}
