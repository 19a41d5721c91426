#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;

    use veneer_core::{
        Font, Key, KeyEvent, MeasureError, PointerId, PointerSample, Rect, SceneNode, Size, Style,
        Value, Vec2,
    };

    use crate::*;

    type Log = Rc<RefCell<Vec<String>>>;

    fn new_log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn joined(log: &Log) -> String {
        log.borrow().join(", ")
    }

    /// Records every pointer and focus callback as `name:event`.
    fn traced(control: Control, log: &Log) -> Control {
        let entry = |event: &'static str| {
            let log = log.clone();
            let name = control.name().to_string();
            move || log.borrow_mut().push(format!("{name}:{event}"))
        };
        let enter = entry("enter");
        let out = entry("out");
        let down = entry("down");
        let up = entry("up");
        let moved = entry("move");
        let click = entry("click");
        let focus = entry("focus");
        let blur = entry("blur");
        control
            .on_pointer_enter(move |_, _| enter())
            .on_pointer_out(move |_, _| out())
            .on_pointer_down(move |_, _| down())
            .on_pointer_up(move |_, _| up())
            .on_pointer_move(move |_, _| moved())
            .on_pointer_click(move |_, _| click())
            .on_focus(move |_| focus())
            .on_blur(move |_| blur())
    }

    fn surface() -> Surface {
        Surface::new(SurfaceConfig::new(800.0, 600.0))
    }

    fn rect_of(surface: &Surface, id: ControlId) -> Rect {
        surface.control(id).unwrap().rect()
    }

    /// Two 200x200 squares, `A` on the left edge and `B` on the right edge.
    fn two_squares(surface: &mut Surface, log: &Log) -> (ControlId, ControlId) {
        let a = surface.add_control(traced(
            Control::plain("A")
                .size("200px", "200px")
                .horizontal_alignment(HorizontalAlignment::Left),
            log,
        ));
        let b = surface.add_control(traced(
            Control::plain("B")
                .size("200px", "200px")
                .horizontal_alignment(HorizontalAlignment::Right),
            log,
        ));
        surface.render();
        (a, b)
    }

    #[test]
    fn test_reachable_set_tracks_add_and_remove() {
        let mut s = surface();
        let a = s.add_control(Control::plain("a"));
        let b = s.add_control(Control::plain("b"));
        let panel = s.add_control(Control::container("panel"));
        let child = s.add_child(panel, Control::plain("child")).unwrap();
        let gone = s.add_child(panel, Control::plain("gone")).unwrap();

        assert!(s.remove_control(b));
        assert!(!s.remove_control(b));
        s.dispose(gone).unwrap();

        let reachable: HashSet<_> = s.tree().reachable().into_iter().collect();
        let expected: HashSet<_> = [s.root(), a, panel, child].into_iter().collect();
        assert_eq!(reachable, expected);

        for id in &reachable {
            for c in s.tree().children(*id) {
                assert_eq!(s.tree().parent(*c), Some(*id));
            }
        }
        // Detached but alive: can come back.
        s.attach(panel, b).unwrap();
        assert_eq!(s.tree().parent(b), Some(panel));
        assert!(s.tree().is_attached(b));
    }

    #[test]
    fn test_remove_from_wrong_parent_is_noop() {
        let mut s = surface();
        let panel = s.add_control(Control::container("panel"));
        let other = s.add_control(Control::container("other"));
        let leaf = s.add_child(panel, Control::plain("leaf")).unwrap();

        assert!(!s.remove_child(other, leaf));
        assert_eq!(s.tree().parent(leaf), Some(panel));
        assert_eq!(
            s.add_child(leaf, Control::plain("x")).unwrap_err(),
            TreeError::NotAContainer(leaf)
        );
        assert_eq!(s.dispose(s.root()), Err(TreeError::RootImmutable));
    }

    #[test]
    fn test_alignment_and_padding() {
        let mut s = surface();
        let top_left = s.add_control(
            Control::plain("top_left")
                .size("200px", "100px")
                .align(HorizontalAlignment::Left, VerticalAlignment::Top)
                .left("10px")
                .top("20px"),
        );
        let centered = s.add_control(Control::plain("centered").size("200px", "100px"));
        let padded = s.add_control(Control::plain("padded").padding("10px"));
        let corner = s.add_control(
            Control::plain("corner")
                .size("200px", "100px")
                .align(HorizontalAlignment::Right, VerticalAlignment::Bottom),
        );
        let relative = s.add_control(Control::plain("relative").width("50%").height("25%"));
        let odd = s.add_control(Control::plain("odd").size("201px", "101px"));
        s.render();

        assert_eq!(rect_of(&s, top_left), Rect::new(10.0, 20.0, 200.0, 100.0));
        assert_eq!(rect_of(&s, centered), Rect::new(300.0, 250.0, 200.0, 100.0));
        assert_eq!(rect_of(&s, padded), Rect::new(10.0, 10.0, 780.0, 580.0));
        assert_eq!(rect_of(&s, corner), Rect::new(600.0, 500.0, 200.0, 100.0));
        assert_eq!(rect_of(&s, relative), Rect::new(200.0, 225.0, 400.0, 150.0));
        // 299.5 and 249.5 truncate toward zero.
        assert_eq!(rect_of(&s, odd), Rect::new(299.0, 249.0, 201.0, 101.0));
    }

    #[test]
    fn test_invalid_size_string_keeps_layout() {
        let mut s = surface();
        let id = s.add_control(Control::plain("a").size("200px", "100px"));
        s.render();

        assert!(!s.control_mut(id).unwrap().set_width("abc"));
        assert!(!s.control_mut(id).unwrap().set_width("200px"));
        s.render();
        assert_eq!(rect_of(&s, id).width, 200.0);
        assert_eq!(s.control(id).unwrap().width_value(), Some(Value::px(200.0)));
    }

    #[test]
    fn test_layout_memoization() {
        let mut s = surface();
        let panel = s.add_control(Control::container("panel").size("400px", "300px"));
        let a = s
            .add_child(panel, Control::plain("a").size("100px", "50px"))
            .unwrap();
        s.add_child(panel, Control::plain("b").size("100px", "50px"))
            .unwrap();

        assert_eq!(s.render().stats.measured, 4);

        s.control_mut(a)
            .unwrap()
            .set_color(veneer_core::Color::WHITE);
        assert!(s.is_dirty());
        let stats = s.render().stats;
        assert_eq!(stats.measured, 0);
        assert_eq!(stats.drawn, 4);

        s.control_mut(a).unwrap().set_width("120px");
        let stats = s.render().stats;
        assert_eq!(stats.measured_ids, vec![s.root(), panel, a]);
        assert_eq!(rect_of(&s, a).width, 120.0);

        assert!(s.render_if_dirty().is_none());
    }

    #[test]
    fn test_transform_changes_skip_measure() {
        let mut s = surface();
        let a = s.add_control(Control::plain("a").size("100px", "100px"));
        s.render();

        s.control_mut(a).unwrap().set_rotation(0.3);
        let frame = s.render();
        assert_eq!(frame.stats.measured, 0);
        assert!(frame.scene.nodes.iter().any(|n| matches!(n, SceneNode::PushTransform { .. })));
        assert!(frame.scene.is_balanced());
    }

    #[test]
    fn test_z_index_wins_over_insertion_order() {
        let mut s = surface();
        let high = s.add_control(Control::plain("high").size("200px", "200px").z_index(1));
        let low = s.add_control(Control::plain("low").size("200px", "200px"));
        s.render();
        assert_eq!(s.pick(400.0, 300.0), Some(high));

        s.control_mut(high).unwrap().set_z_index(-1);
        s.render();
        assert_eq!(s.pick(400.0, 300.0), Some(low));
    }

    #[test]
    fn test_equal_z_later_insert_wins() {
        let mut s = surface();
        s.add_control(Control::plain("first").size("200px", "200px"));
        let second = s.add_control(Control::plain("second").size("200px", "200px"));
        s.render();
        assert_eq!(s.pick(400.0, 300.0), Some(second));
        assert_eq!(s.pick(10.0, 10.0), None);
    }

    #[test]
    fn test_pointer_blocker_hides_siblings_below() {
        let mut s = surface();
        let under = s.add_control(Control::plain("under"));
        let blocker = s.add_control(
            Control::container("blocker")
                .size("400px", "400px")
                .hit_test_visible(false)
                .pointer_blocker(true),
        );
        let button = s
            .add_child(blocker, Control::plain("button").size("50px", "50px"))
            .unwrap();
        s.render();

        let on_button = s.pick_detailed(400.0, 300.0);
        assert_eq!(on_button.target, Some(button));
        assert!(on_button.blocked);

        let on_blocker = s.pick_detailed(250.0, 150.0);
        assert_eq!(on_blocker.target, None);
        assert!(on_blocker.blocked);

        let outside = s.pick_detailed(20.0, 20.0);
        assert_eq!(outside.target, Some(under));
        assert!(!outside.blocked);
    }

    #[test]
    fn test_hidden_controls_are_never_hit() {
        let mut s = surface();
        let panel = s.add_control(Control::container("panel").size("300px", "300px"));
        s.add_child(panel, Control::plain("leaf").size("50px", "50px"))
            .unwrap();
        s.render();
        assert!(s.pick(400.0, 300.0).is_some());

        s.control_mut(panel).unwrap().set_visible(false);
        s.render();
        assert_eq!(s.pick(400.0, 300.0), None);
    }

    #[test]
    fn test_rotated_control_picking() {
        let mut s = surface();
        let bar = s.add_control(
            Control::plain("bar")
                .size("200px", "100px")
                .rotation(FRAC_PI_2),
        );
        s.render();

        // Rotated a quarter turn about its center, the bar now stands upright.
        assert_eq!(s.pick(400.0, 220.0), Some(bar));
        assert_eq!(s.pick(320.0, 300.0), None);
    }

    #[test]
    fn test_drag_across_controls_without_capture() {
        let log = new_log();
        let mut s = surface();
        two_squares(&mut s, &log);

        s.pointer(PointerSample::mouse_down(100.0, 300.0));
        s.pointer(PointerSample::mouse_move(700.0, 300.0));
        let up = s.pointer(PointerSample::mouse_up(700.0, 300.0));

        insta::assert_snapshot!(joined(&log), @"A:enter, A:down, A:out, B:enter, B:move, A:up");
        assert!(up.handled);
        assert!(s.interaction().down(PointerId::MOUSE).is_none());
    }

    #[test]
    fn test_click_needs_same_control() {
        let log = new_log();
        let mut s = surface();
        let (a, _) = two_squares(&mut s, &log);

        s.pointer(PointerSample::mouse_down(100.0, 300.0));
        assert_eq!(s.control(a).unwrap().pressed_by(), &[PointerId::MOUSE]);
        s.pointer(PointerSample::mouse_up(110.0, 310.0));

        insta::assert_snapshot!(joined(&log), @"A:enter, A:down, A:up, A:click");
        assert!(s.control(a).unwrap().pressed_by().is_empty());
        assert_eq!(s.control(a).unwrap().hovered_by(), &[PointerId::MOUSE]);
    }

    #[test]
    fn test_capture_routes_moves() {
        let log = new_log();
        let mut s = surface();
        let a = s.add_control(
            traced(
                Control::plain("A")
                    .size("200px", "200px")
                    .horizontal_alignment(HorizontalAlignment::Left),
                &log,
            )
            .on_pointer_down(|ctx, _| ctx.capture_pointer()),
        );
        s.add_control(traced(
            Control::plain("B")
                .size("200px", "200px")
                .horizontal_alignment(HorizontalAlignment::Right),
            &log,
        ));
        s.render();

        s.pointer(PointerSample::mouse_down(100.0, 300.0));
        assert_eq!(s.interaction().capturing(PointerId::MOUSE), Some(a));
        let moved = s.pointer(PointerSample::mouse_move(700.0, 300.0));
        assert_eq!(moved.target, Some(a));
        s.pointer(PointerSample::mouse_up(700.0, 300.0));
        insta::assert_snapshot!(joined(&log), @"A:enter, A:move, A:up");

        log.borrow_mut().clear();
        assert_eq!(s.interaction().capturing(PointerId::MOUSE), None);
        s.pointer(PointerSample::mouse_move(700.0, 300.0));
        insta::assert_snapshot!(joined(&log), @"A:out, B:enter, B:move");
    }

    #[test]
    fn test_local_coordinates_follow_transform() {
        let seen = Rc::new(RefCell::new(None));
        let mut s = surface();
        let sink = seen.clone();
        s.add_control(
            Control::plain("scaled")
                .size("100px", "100px")
                .scale(2.0, 2.0)
                .on_pointer_move(move |_, info| *sink.borrow_mut() = Some(info.local)),
        );
        s.render();

        // Scaled 2x about its center (400, 300): surface (310, 210) maps to
        // (355, 255) in layout space, 5px inside the top-left corner.
        s.pointer(PointerSample::mouse_move(310.0, 210.0));
        let local = seen.borrow().unwrap();
        assert!((local.x - 5.0).abs() < 1e-3 && (local.y - 5.0).abs() < 1e-3, "{local:?}");
    }

    #[test]
    fn test_events_bubble_until_stopped() {
        let log = new_log();
        let mut s = surface();
        let outer_log = log.clone();
        let panel = s.add_control(
            Control::container("panel")
                .size("300px", "300px")
                .on_pointer_down(move |ctx, info| {
                    assert_ne!(ctx.current(), info.target);
                    outer_log.borrow_mut().push("panel:down".into());
                }),
        );
        let inner_log = log.clone();
        let leaf = s
            .add_child(
                panel,
                Control::plain("leaf")
                    .size("50px", "50px")
                    .on_pointer_down(move |_, _| inner_log.borrow_mut().push("leaf:down".into())),
            )
            .unwrap();
        s.render();

        s.pointer(PointerSample::mouse_down(400.0, 300.0));
        assert_eq!(joined(&log), "leaf:down, panel:down");

        log.borrow_mut().clear();
        let stop_log = log.clone();
        s.control_mut(leaf).unwrap().handlers(|h| {
            h.on_pointer_down = Some(Rc::new(move |ctx: &mut EventCtx<'_>, _: &PointerInfo| {
                stop_log.borrow_mut().push("leaf:down".into());
                ctx.stop_propagation();
            }));
        });
        s.pointer(PointerSample::mouse_up(400.0, 300.0));
        s.pointer(PointerSample::mouse_down(400.0, 300.0));
        assert_eq!(joined(&log), "leaf:down");
    }

    #[test]
    fn test_detached_control_gets_no_release() {
        let log = new_log();
        let mut s = surface();
        let (a, _) = two_squares(&mut s, &log);

        s.pointer(PointerSample::mouse_down(100.0, 300.0));
        assert!(s.remove_control(a));
        log.borrow_mut().clear();

        let up = s.pointer(PointerSample::mouse_up(100.0, 300.0));
        assert!(!up.handled);
        assert!(log.borrow().is_empty());
        assert!(s.interaction().is_empty());
        assert!(s.control(a).unwrap().pressed_by().is_empty());
    }

    #[test]
    fn test_hiding_clears_hover_silently() {
        let log = new_log();
        let mut s = surface();
        let (a, _) = two_squares(&mut s, &log);

        s.pointer(PointerSample::mouse_move(100.0, 300.0));
        assert_eq!(s.interaction().over(PointerId::MOUSE), Some(a));
        log.borrow_mut().clear();

        s.control_mut(a).unwrap().set_visible(false);
        assert!(log.borrow().is_empty());
        assert_eq!(s.interaction().over(PointerId::MOUSE), None);
        assert!(s.control(a).unwrap().hovered_by().is_empty());

        s.render();
        s.pointer(PointerSample::mouse_move(100.0, 300.0));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_pointer_leave_and_cancel() {
        let log = new_log();
        let mut s = surface();
        two_squares(&mut s, &log);

        s.pointer(PointerSample::mouse_move(100.0, 300.0));
        s.pointer_leave(PointerId::MOUSE);
        s.pointer(PointerSample::mouse_down(700.0, 300.0));
        s.pointer_cancel(PointerId::MOUSE);

        insta::assert_snapshot!(joined(&log), @"A:enter, A:move, A:out, B:enter, B:down, B:out");
        assert!(s.interaction().is_empty());
    }

    #[test]
    fn test_leave_and_cancel_report_last_position() {
        let seen: Rc<RefCell<Vec<(Vec2, Vec2)>>> = Rc::new(RefCell::new(Vec::new()));
        let mut s = surface();
        let square = |name: &str, align: HorizontalAlignment| {
            let seen = seen.clone();
            Control::plain(name)
                .size("200px", "200px")
                .horizontal_alignment(align)
                .on_pointer_out(move |_, info| seen.borrow_mut().push((info.position, info.local)))
        };
        s.add_control(square("A", HorizontalAlignment::Left));
        s.add_control(square("B", HorizontalAlignment::Right));
        s.render();

        s.pointer(PointerSample::mouse_move(100.0, 300.0));
        s.pointer_leave(PointerId::MOUSE);
        s.pointer(PointerSample::mouse_down(700.0, 320.0));
        s.pointer_cancel(PointerId::MOUSE);

        assert_eq!(
            *seen.borrow(),
            [
                (Vec2::new(100.0, 300.0), Vec2::new(100.0, 100.0)),
                (Vec2::new(700.0, 320.0), Vec2::new(100.0, 120.0)),
            ]
        );
    }

    #[test]
    fn test_pointers_are_tracked_independently() {
        let log = new_log();
        let mut s = surface();
        let (a, b) = two_squares(&mut s, &log);
        let touch = PointerId(3);

        s.pointer(PointerSample::mouse_down(100.0, 300.0));
        s.pointer(PointerSample::new(touch, veneer_core::PointerKind::Down, 700.0, 300.0));
        assert_eq!(s.interaction().down(PointerId::MOUSE), Some(a));
        assert_eq!(s.interaction().down(touch), Some(b));

        s.pointer(PointerSample::new(touch, veneer_core::PointerKind::Up, 700.0, 300.0));
        assert_eq!(s.interaction().down(PointerId::MOUSE), Some(a));
        assert_eq!(s.interaction().down(touch), None);
    }

    #[test]
    fn test_focus_transfer_blurs_first() {
        let log = new_log();
        let mut s = surface();
        let x = s.add_control(traced(
            Control::plain("X")
                .size("100px", "100px")
                .horizontal_alignment(HorizontalAlignment::Left)
                .focusable(true),
            &log,
        ));
        let y = s.add_control(traced(
            Control::plain("Y")
                .size("100px", "100px")
                .horizontal_alignment(HorizontalAlignment::Right)
                .focusable(true),
            &log,
        ));
        s.render();

        s.request_focus(Some(y));
        s.request_focus(Some(x));
        insta::assert_snapshot!(joined(&log), @"Y:focus, Y:blur, X:focus");
        assert_eq!(s.focused(), Some(x));

        // Requesting the current holder again is a no-op.
        log.borrow_mut().clear();
        s.request_focus(Some(x));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_pointer_down_moves_focus() {
        let log = new_log();
        let mut s = surface();
        let field = s.add_control(traced(
            Control::plain("field")
                .size("100px", "100px")
                .horizontal_alignment(HorizontalAlignment::Left)
                .focusable(true),
            &log,
        ));
        let toolbar = s.add_control(
            Control::plain("toolbar")
                .size("100px", "100px")
                .horizontal_alignment(HorizontalAlignment::Right)
                .focus_invisible(true),
        );
        s.render();

        s.pointer(PointerSample::mouse_down(50.0, 300.0));
        s.pointer(PointerSample::mouse_up(50.0, 300.0));
        assert_eq!(s.focused(), Some(field));

        s.pointer(PointerSample::mouse_down(750.0, 300.0));
        assert_eq!(s.pick(750.0, 300.0), Some(toolbar));
        assert_eq!(s.focused(), Some(field));
        s.pointer(PointerSample::mouse_up(750.0, 300.0));

        s.pointer(PointerSample::mouse_down(400.0, 50.0));
        assert_eq!(s.focused(), None);
        assert!(log.borrow().contains(&"field:blur".to_string()));
    }

    #[test]
    fn test_pressing_plain_child_blurs_focused_parent() {
        let mut s = surface();
        let form = s.add_control(
            Control::container("form")
                .size("200px", "200px")
                .focusable(true),
        );
        let icon = s
            .add_child(form, Control::plain("icon").size("50px", "50px"))
            .unwrap();
        s.render();
        s.request_focus(Some(form));
        assert_eq!(s.focused(), Some(form));

        s.pointer(PointerSample::mouse_down(400.0, 300.0));
        assert_eq!(s.pick(400.0, 300.0), Some(icon));
        assert_eq!(s.focused(), None);
    }

    #[test]
    fn test_blur_handler_can_reclaim_focus() {
        let mut s = surface();
        let log = new_log();
        let x = s.add_control(traced(Control::plain("X").focusable(true), &log));
        let y = s.add_control(traced(Control::plain("Y").focusable(true), &log));
        let blur_log = log.clone();
        s.control_mut(y).unwrap().handlers(|h| {
            h.on_blur = Some(Rc::new(move |ctx: &mut EventCtx<'_>| {
                blur_log.borrow_mut().push("Y:blur".into());
                ctx.focus_self();
            }));
        });

        s.request_focus(Some(y));
        s.request_focus(Some(x));
        insta::assert_snapshot!(joined(&log), @"Y:focus, Y:blur, X:focus, X:blur, Y:focus");
        assert_eq!(s.focused(), Some(y));
    }

    #[test]
    fn test_keys_reach_only_the_focused_control() {
        let log = new_log();
        let mut s = surface();
        let make = |name: &'static str| {
            let log = log.clone();
            Control::plain(name)
                .focusable(true)
                .on_key(move |_, ev| {
                    log.borrow_mut().push(format!("{name}:{:?}", ev.key));
                    true
                })
        };
        let first = s.add_control(make("first"));
        s.add_control(make("second"));

        assert!(!s.key(&KeyEvent::pressed(Key::Enter)));
        s.request_focus(Some(first));
        assert!(s.key(&KeyEvent::pressed(Key::Tab)));
        assert_eq!(joined(&log), "first:Tab");
    }

    #[test]
    fn test_non_focusable_request_is_ignored() {
        let mut s = surface();
        let plain = s.add_control(Control::plain("plain"));
        s.request_focus(Some(plain));
        assert_eq!(s.focused(), None);
    }

    #[test]
    fn test_style_update_remeasures_users_only() {
        let mut s = surface();
        let style = s.create_style(Style::default());
        let t1 = s.add_control(Control::text("t1", "styled").style(style));
        let t2 = s.add_control(Control::text("t2", "plain"));
        s.render();
        assert_eq!(s.control(t1).unwrap().font().unwrap().size_px, 18.0);

        assert!(s.update_style(style, |st| st.font_size = Value::px(30.0)));
        let stats = s.render().stats;
        assert!(stats.measured_ids.contains(&t1));
        assert!(!stats.measured_ids.contains(&t2));
        assert_eq!(s.control(t1).unwrap().font().unwrap().size_px, 30.0);

        assert!(!s.update_style(style, |st| st.font_size = Value::px(30.0)));
        assert!(s.dispose_style(style));
        s.render();
        assert_eq!(s.control(t1).unwrap().style_id(), None);
        assert_eq!(s.control(t1).unwrap().font().unwrap().size_px, 18.0);
    }

    #[test]
    fn test_text_auto_size() {
        let mut s = surface();
        let label = s.add_control(
            Control::text("label", "hello")
                .font_size("20px")
                .align(HorizontalAlignment::Left, VerticalAlignment::Top),
        );
        let frame = s.render();

        // 5 glyphs x 10px, one 25px line.
        assert_eq!(rect_of(&s, label), Rect::new(0.0, 0.0, 50.0, 25.0));
        let text = frame.scene.nodes.iter().find_map(|n| match n {
            SceneNode::Text { text, font, .. } => Some((text.clone(), font.shorthand())),
            _ => None,
        });
        assert_eq!(text, Some(("hello".to_string(), "20px Arial".to_string())));
    }

    #[test]
    fn test_adaptive_scaling_doubles_pixels() {
        let mut s = Surface::new(SurfaceConfig::new(1600.0, 900.0).ideal_width(800.0));
        let id = s.add_control(
            Control::plain("a")
                .size("100px", "50px")
                .align(HorizontalAlignment::Left, VerticalAlignment::Top)
                .left("10px"),
        );
        s.render();
        assert_eq!(rect_of(&s, id), Rect::new(20.0, 0.0, 200.0, 100.0));

        s.resize(800.0, 450.0);
        let stats = s.render().stats;
        assert!(stats.measured_ids.contains(&id));
        assert_eq!(rect_of(&s, id), Rect::new(10.0, 0.0, 100.0, 50.0));
    }

    struct Fussy;

    impl ContentMeasurer for Fussy {
        fn measure_text(
            &self,
            text: &str,
            font: &Font,
            max_width: Option<f32>,
        ) -> Result<Size, MeasureError> {
            if text == "boom" {
                return Err(MeasureError::MissingFont(font.family.clone()));
            }
            FixedAdvanceMeasurer::default().measure_text(text, font, max_width)
        }
    }

    #[test]
    fn test_measure_failure_is_isolated() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut s = surface().with_measurer(Fussy);
        let broken = s.add_control(Control::text("broken", "boom"));
        let fine = s.add_control(Control::text("fine", "ok"));
        let frame = s.render();

        assert!(s.control(broken).unwrap().is_broken());
        assert_eq!(rect_of(&s, broken).size(), Size::ZERO);
        assert!(!s.control(fine).unwrap().is_broken());
        assert!(rect_of(&s, fine).width > 0.0);

        let texts: Vec<_> = frame
            .scene
            .nodes
            .iter()
            .filter_map(|n| match n {
                SceneNode::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["ok"]);

        s.control_mut(broken).unwrap().set_text("fixed");
        s.render();
        assert!(!s.control(broken).unwrap().is_broken());
    }

    #[test]
    fn test_stack_panel_lays_out_consecutively() {
        let mut s = surface();
        let stack = s.add_control(Control::stack_panel("stack", true));
        let rows: Vec<_> = (0..3)
            .map(|i| {
                s.add_child(stack, Control::plain(format!("row{i}")).size("100px", "50px"))
                    .unwrap()
            })
            .collect();
        s.render();

        assert_eq!(rect_of(&s, stack), Rect::new(0.0, 225.0, 800.0, 150.0));
        let tops: Vec<f32> = rows.iter().map(|r| rect_of(&s, *r).top).collect();
        assert_eq!(tops, [225.0, 275.0, 325.0]);
        assert!(rows.iter().all(|r| rect_of(&s, *r).left == 350.0));

        s.control_mut(rows[1]).unwrap().set_visible(false);
        s.render();
        assert_eq!(rect_of(&s, stack).height, 100.0);
        assert_eq!(rect_of(&s, rows[2]).top, 300.0);
    }

    #[test]
    fn test_z_index_change_restacks_panel() {
        let mut s = surface();
        let stack = s.add_control(Control::stack_panel("stack", true));
        let a = s
            .add_child(stack, Control::plain("a").size("100px", "50px"))
            .unwrap();
        let b = s
            .add_child(stack, Control::plain("b").size("100px", "50px"))
            .unwrap();
        s.render();
        assert_eq!((rect_of(&s, a).top, rect_of(&s, b).top), (250.0, 300.0));

        s.control_mut(a).unwrap().set_z_index(5);
        let stats = s.render().stats;

        assert_eq!(s.tree().children(stack).to_vec(), vec![b, a]);
        assert!(stats.measured_ids.contains(&stack));
        assert_eq!((rect_of(&s, b).top, rect_of(&s, a).top), (250.0, 300.0));
        assert_eq!(s.pick(400.0, 320.0), Some(a));
    }

    #[test]
    fn test_horizontal_stack_panel() {
        let mut s = surface();
        let stack = s.add_control(Control::stack_panel("row", false).height("40px"));
        let a = s
            .add_child(stack, Control::plain("a").size("100px", "20px"))
            .unwrap();
        let b = s
            .add_child(stack, Control::plain("b").size("60px", "20px"))
            .unwrap();
        s.render();

        assert_eq!(rect_of(&s, stack), Rect::new(320.0, 280.0, 160.0, 40.0));
        assert_eq!(rect_of(&s, a), Rect::new(320.0, 290.0, 100.0, 20.0));
        assert_eq!(rect_of(&s, b), Rect::new(420.0, 290.0, 60.0, 20.0));
    }

    #[test]
    fn test_rectangle_children_sit_inside_border() {
        let mut s = surface();
        let frame_id = s.add_control(
            Control::rectangle("frame")
                .size("200px", "100px")
                .thickness(4.0)
                .corner_radius(6.0),
        );
        let fill = s.add_child(frame_id, Control::plain("fill")).unwrap();
        let frame = s.render();

        assert_eq!(rect_of(&s, fill), Rect::new(304.0, 254.0, 192.0, 92.0));
        assert!(frame.scene.nodes.contains(&SceneNode::PushClip {
            rect: Rect::new(304.0, 254.0, 192.0, 92.0),
            radius: 6.0,
        }));
        assert!(frame.scene.is_balanced());
    }

    #[test]
    fn test_ellipse_clips_children_inside_border() {
        let mut s = surface();
        let oval = s.add_control(
            Control::ellipse("oval")
                .size("200px", "100px")
                .thickness(4.0)
                .background(veneer_core::Color::WHITE),
        );
        let fill = s.add_child(oval, Control::plain("fill")).unwrap();
        let frame = s.render();

        assert_eq!(s.control(oval).unwrap().type_name(), "Ellipse");
        assert_eq!(rect_of(&s, fill), Rect::new(304.0, 254.0, 192.0, 92.0));
        let nodes = &frame.scene.nodes;
        assert!(nodes.contains(&SceneNode::Ellipse {
            rect: Rect::new(300.0, 250.0, 200.0, 100.0),
            color: veneer_core::Color::WHITE,
        }));
        assert!(nodes.iter().any(|n| matches!(
            n,
            SceneNode::EllipseBorder { rect, width, .. }
                if *rect == Rect::new(302.0, 252.0, 196.0, 96.0) && *width == 4.0
        )));
        assert!(nodes.contains(&SceneNode::PushEllipseClip {
            rect: Rect::new(304.0, 254.0, 192.0, 92.0),
        }));
        assert!(frame.scene.is_balanced());

        s.control_mut(oval).unwrap().set_thickness(0.0);
        s.render();
        assert_eq!(rect_of(&s, fill), Rect::new(300.0, 250.0, 200.0, 100.0));
    }

    #[test]
    fn test_auto_sized_container_wraps_children() {
        let mut s = surface();
        let wrap = s.add_control(
            Control::container("wrap")
                .auto_width()
                .auto_height()
                .padding("5px"),
        );
        s.add_child(wrap, Control::plain("a").size("100px", "40px"))
            .unwrap();
        s.add_child(wrap, Control::plain("b").size("60px", "80px"))
            .unwrap();
        s.render();

        assert_eq!(rect_of(&s, wrap).size(), Size::new(100.0, 80.0));
    }

    #[test]
    fn test_line_geometry() {
        let mut s = surface();
        let line = s.add_control(
            Control::line("line")
                .from_point("10px", "20px")
                .to_point("110px", "70px")
                .thickness(2.0),
        );
        let frame = s.render();

        assert_eq!(rect_of(&s, line), Rect::new(9.0, 19.0, 102.0, 52.0));
        assert!(frame.scene.nodes.iter().any(|n| matches!(
            n,
            SceneNode::Polyline { points, width, .. }
                if *width == 2.0 && points == &[Vec2::new(10.0, 20.0), Vec2::new(110.0, 70.0)]
        )));
        assert_eq!(s.pick(50.0, 40.0), None);
    }

    #[test]
    fn test_connected_line_tracks_target() {
        let mut s = surface();
        let line = s.add_control(Control::line("link").from_point("0px", "0px"));
        let target = s.add_control(Control::plain("target").size("100px", "100px"));
        s.control_mut(line)
            .unwrap()
            .set_connected_control(Some(target));
        s.render();

        let ends = |s: &Surface| match s.control(line).unwrap().kind() {
            ControlKind::Line(l) => l.ends(),
            _ => unreachable!(),
        };
        assert_eq!(ends(&s)[1], Vec2::new(400.0, 300.0));

        s.control_mut(target)
            .unwrap()
            .set_alignment(HorizontalAlignment::Left, VerticalAlignment::Top);
        s.render();
        assert_eq!(ends(&s)[1], Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_multi_line_skips_detached_points() {
        let mut s = surface();
        let anchor = s.add_control(
            Control::plain("anchor")
                .size("20px", "20px")
                .align(HorizontalAlignment::Left, VerticalAlignment::Top),
        );
        let poly = s.add_control(Control::multi_line(
            "poly",
            vec![
                MultiLinePoint::fixed("100px", "100px"),
                MultiLinePoint::Attached(anchor),
                MultiLinePoint::fixed("200px", "50px"),
            ],
        ));
        s.render();

        let points = |s: &Surface| match s.control(poly).unwrap().kind() {
            ControlKind::MultiLine(m) => m.resolved().to_vec(),
            _ => unreachable!(),
        };
        assert_eq!(
            points(&s),
            vec![
                Vec2::new(100.0, 100.0),
                Vec2::new(10.0, 10.0),
                Vec2::new(200.0, 50.0)
            ]
        );

        s.remove_control(anchor);
        s.render();
        assert_eq!(
            points(&s),
            vec![Vec2::new(100.0, 100.0), Vec2::new(200.0, 50.0)]
        );
    }

    #[test]
    fn test_move_to_projected_position() {
        let mut s = surface();
        let tag = s.add_control(Control::plain("tag").size("100px", "50px"));
        s.render();

        assert!(s.move_to_projected_position(tag, 400.0, 300.0));
        s.render();
        assert_eq!(rect_of(&s, tag), Rect::new(350.0, 275.0, 100.0, 50.0));

        // Sub-half-pixel jitter is ignored.
        assert!(!s.move_to_projected_position(tag, 400.3, 300.2));
        assert!(s.move_to_projected_position(tag, 500.0, 300.0));
        s.render();
        assert_eq!(rect_of(&s, tag).left, 450.0);
    }

    #[test]
    fn test_projected_position_ignores_adaptive_scale() {
        let mut s = Surface::new(SurfaceConfig::new(1600.0, 900.0).ideal_width(800.0));
        let tag = s.add_control(Control::plain("tag").size("50px", "25px"));
        s.render();
        s.move_to_projected_position(tag, 400.0, 300.0);
        s.render();
        // 100x50 after scaling, centered on the point.
        assert_eq!(rect_of(&s, tag), Rect::new(350.0, 275.0, 100.0, 50.0));
    }

    #[test]
    fn test_handlers_edit_through_context() {
        let mut s = surface();
        let counter = Rc::new(RefCell::new(0));
        let draws = counter.clone();
        let button = s.add_control(
            Control::plain("button")
                .size("100px", "100px")
                .on_pointer_click(|ctx, _| {
                    ctx.edit_self(|c| {
                        c.set_width("150px");
                    })
                })
                .on_after_draw(move |_| *draws.borrow_mut() += 1),
        );
        s.render();
        assert_eq!(*counter.borrow(), 1);

        s.pointer(PointerSample::mouse_down(400.0, 300.0));
        s.pointer(PointerSample::mouse_up(400.0, 300.0));
        assert!(s.is_dirty());
        s.render();
        assert_eq!(rect_of(&s, button).width, 150.0);
        assert_eq!(*counter.borrow(), 2);
    }

    #[test]
    fn test_execute_on_all_controls() {
        let mut s = surface();
        let panel = s.add_control(Control::container("panel"));
        s.add_child(panel, Control::plain("a")).unwrap();
        let loose = s.insert(Control::plain("loose"));

        s.execute_on_all_controls(|c| {
            c.set_alpha(0.5);
        });
        let tree = s.tree();
        assert!(tree.reachable().iter().all(|id| tree.get(*id).unwrap().opacity() == 0.5));
        assert_eq!(s.control(loose).unwrap().opacity(), 1.0);
    }

    #[test]
    fn test_tick_only_renders_when_dirty() {
        let mut s = surface();
        s.add_control(Control::rectangle("r").size("10px", "10px"));
        let mut backend = veneer_core::RecordingBackend::default();

        assert!(s.tick(&mut backend).is_some());
        assert!(s.tick(&mut backend).is_none());
        s.mark_dirty();
        let stats = s.tick(&mut backend).unwrap();
        assert_eq!(stats.measured, 0);
        assert_eq!(backend.frames, 2);
        assert_eq!(backend.size, (800, 600));
        assert!(backend.last.unwrap().is_balanced());
    }
}
