//! Font descriptors.
//!
//! A [`Style`] is shared by any number of controls; the UI crate keeps a
//! registry of them and invalidates every referencing control's font cache
//! when one changes. A [`Font`] is the resolved, pixel-sized result that the
//! content measurer and the draw list consume.

use crate::Value;

pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE_PX: f32 = 18.0;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font {
    pub family: String,
    pub size_px: f32,
    /// e.g. `"italic"` or `"bold"`; empty for normal.
    pub style: String,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: DEFAULT_FONT_FAMILY.to_string(),
            size_px: DEFAULT_FONT_SIZE_PX,
            style: String::new(),
        }
    }
}

impl Font {
    /// CSS-style shorthand, `"<style> <size>px <family>"`.
    pub fn shorthand(&self) -> String {
        if self.style.is_empty() {
            format!("{}px {}", self.size_px, self.family)
        } else {
            format!("{} {}px {}", self.style, self.size_px, self.family)
        }
    }
}

/// Shared font template.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    pub font_family: String,
    /// Percentages resolve against the parent rect height.
    pub font_size: Value,
    pub font_style: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: Value::px(DEFAULT_FONT_SIZE_PX),
            font_style: String::new(),
        }
    }
}

impl Style {
    pub fn resolve(&self, parent_height: f32, scale: f32) -> Font {
        Font {
            family: self.font_family.clone(),
            size_px: self.font_size.to_pixels_scaled(parent_height, scale),
            style: self.font_style.clone(),
        }
    }
}
