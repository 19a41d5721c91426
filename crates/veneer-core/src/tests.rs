#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);

        assert!(rect.contains(Vec2 { x: 50.0, y: 30.0 }));
        assert!(rect.contains(Vec2 { x: 110.0, y: 60.0 }));
        assert!(!rect.contains(Vec2 { x: 5.0, y: 30.0 }));
        assert!(!rect.contains(Vec2 { x: 50.0, y: 70.0 }));
    }

    #[test]
    fn test_rect_value_equality() {
        let mut a = Rect::empty();
        let b = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_ne!(a, b);
        a.copy_from(&b);
        assert_eq!(a, b);
        assert_eq!(Rect::empty(), Rect::EMPTY);
    }

    #[test]
    fn test_rect_truncated() {
        let r = Rect::new(10.7, -3.5, 99.9, -4.0).truncated();
        assert_eq!(r, Rect::new(10.0, -3.0, 99.0, 0.0));
    }

    #[test]
    fn test_rect_bounding() {
        let pts = [Vec2::new(10.0, 40.0), Vec2::new(-5.0, 20.0), Vec2::new(30.0, 25.0)];
        assert_eq!(Rect::bounding(&pts), Some(Rect::new(-5.0, 20.0, 35.0, 20.0)));
        assert_eq!(Rect::bounding(&[]), None);
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#FF5733"), Some(Color(255, 87, 51, 255)));
        assert_eq!(Color::from_hex("#FF5733AA"), Some(Color(255, 87, 51, 170)));
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("zzzzzz"), None);
    }

    #[test]
    fn test_color_fade() {
        assert_eq!(Color::WHITE.fade(0.5), Color(255, 255, 255, 128));
        assert_eq!(Color::WHITE.fade(2.0), Color::WHITE);
    }

    #[test]
    fn test_style_resolves_percentage_font() {
        let style = Style {
            font_size: Value::percent(10.0),
            ..Style::default()
        };
        let font = style.resolve(300.0, 1.0);
        assert_eq!(font.size_px, 30.0);
        assert_eq!(font.shorthand(), "30px Arial");
    }

    #[test]
    fn test_scene_balance() {
        let mut scene = Scene::default();
        scene.push(SceneNode::PushTransform {
            transform: Affine2D::IDENTITY,
        });
        scene.push(SceneNode::PushClip {
            rect: Rect::EMPTY,
            radius: 0.0,
        });
        scene.push(SceneNode::PopClip);
        assert!(!scene.is_balanced());
        scene.push(SceneNode::PopTransform);
        assert!(scene.is_balanced());

        scene.push(SceneNode::PushAlpha(0.5));
        scene.push(SceneNode::PopClip);
        assert!(!scene.is_balanced());
    }

    #[test]
    fn test_recording_backend() {
        let mut backend = RecordingBackend::default();
        backend.configure_surface(64, 32);
        backend.frame(&Scene::new(Color::BLACK));
        assert_eq!(backend.size, (64, 32));
        assert_eq!(backend.frames, 1);
        assert_eq!(backend.last.map(|s| s.clear_color), Some(Color::BLACK));
    }
}
