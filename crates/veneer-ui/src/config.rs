use veneer_core::Color;

/// Render-target configuration for a [`crate::Surface`].
///
/// With an ideal width or height set, pixel values are scaled by
/// `actual / ideal` so a layout authored for one resolution keeps its
/// proportions on another.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SurfaceConfig {
    pub width: f32,
    pub height: f32,
    pub ideal_width: Option<f32>,
    pub ideal_height: Option<f32>,
    /// With both ideals set, scale by the smaller side instead of width.
    pub use_smallest_ideal: bool,
    pub clear_color: Color,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 1024.0,
            ideal_width: None,
            ideal_height: None,
            use_smallest_ideal: false,
            clear_color: Color::TRANSPARENT,
        }
    }
}

impl SurfaceConfig {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn ideal_width(mut self, w: f32) -> Self {
        self.ideal_width = Some(w).filter(|w| *w > 0.0);
        self
    }

    pub fn ideal_height(mut self, h: f32) -> Self {
        self.ideal_height = Some(h).filter(|h| *h > 0.0);
        self
    }

    pub fn use_smallest_ideal(mut self, on: bool) -> Self {
        self.use_smallest_ideal = on;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn is_adaptive(&self) -> bool {
        self.ideal_width.is_some() || self.ideal_height.is_some()
    }

    /// Factor applied to pixel values; 1 without an ideal size.
    pub fn adaptive_scale(&self) -> f32 {
        let by_width = self.ideal_width.map(|w| self.width / w);
        let by_height = self.ideal_height.map(|h| self.height / h);
        match (by_width, by_height) {
            (Some(w), Some(h)) if self.use_smallest_ideal => {
                if self.width < self.height { w } else { h }
            }
            (Some(w), _) => w,
            (None, Some(h)) => h,
            (None, None) => 1.0,
        }
    }
}
