use veneer_core::{Font, MeasureError, Size};

/// Text metrics provider used to size auto-sized text controls.
pub trait ContentMeasurer {
    /// Pixel size of `text` set in `font`, wrapped at `max_width` when given.
    fn measure_text(&self, text: &str, font: &Font, max_width: Option<f32>)
    -> Result<Size, MeasureError>;
}

/// Monospace approximation: every glyph is half the font size wide and lines
/// are 1.25 font sizes tall.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvanceMeasurer {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self {
            advance: 0.5,
            line_height: 1.25,
        }
    }
}

impl FixedAdvanceMeasurer {
    fn wrap_count(&self, line: &str, glyph: f32, max_width: f32) -> (usize, f32) {
        let mut lines = 1;
        let mut current = 0.0f32;
        let mut widest = 0.0f32;
        for word in line.split(' ') {
            let w = word.chars().count() as f32 * glyph;
            let with_space = if current > 0.0 { current + glyph + w } else { w };
            if current > 0.0 && with_space > max_width {
                widest = widest.max(current);
                lines += 1;
                current = w;
            } else {
                current = with_space;
            }
        }
        (lines, widest.max(current))
    }
}

impl ContentMeasurer for FixedAdvanceMeasurer {
    fn measure_text(
        &self,
        text: &str,
        font: &Font,
        max_width: Option<f32>,
    ) -> Result<Size, MeasureError> {
        if !(font.size_px.is_finite() && font.size_px >= 0.0) {
            return Err(MeasureError::Failed(format!(
                "unusable font size {}",
                font.size_px
            )));
        }
        let glyph = font.size_px * self.advance;
        let mut lines = 0usize;
        let mut width = 0.0f32;
        for line in text.split('\n') {
            match max_width {
                Some(max) => {
                    let (n, w) = self.wrap_count(line, glyph, max);
                    lines += n;
                    width = width.max(w);
                }
                None => {
                    lines += 1;
                    width = width.max(line.chars().count() as f32 * glyph);
                }
            }
        }
        Ok(Size::new(width, lines as f32 * font.size_px * self.line_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(size: f32) -> Font {
        Font {
            size_px: size,
            ..Font::default()
        }
    }

    #[test]
    fn single_and_multiple_lines() {
        let m = FixedAdvanceMeasurer::default();
        assert_eq!(m.measure_text("abcd", &font(10.0), None).unwrap(), Size::new(20.0, 12.5));
        assert_eq!(
            m.measure_text("ab\nabcdef", &font(10.0), None).unwrap(),
            Size::new(30.0, 25.0)
        );
    }

    #[test]
    fn wraps_on_spaces() {
        let m = FixedAdvanceMeasurer::default();
        // 5px glyphs: "aaa bbb" is 35px, so a 20px limit splits it.
        let size = m.measure_text("aaa bbb", &font(10.0), Some(20.0)).unwrap();
        assert_eq!(size, Size::new(15.0, 25.0));
    }

    #[test]
    fn rejects_bad_font_size() {
        let m = FixedAdvanceMeasurer::default();
        assert!(m.measure_text("x", &font(f32::NAN), None).is_err());
    }
}
