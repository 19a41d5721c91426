//! Pixel / percentage quantities used for sizes, offsets and padding.
//!
//! ```rust
//! use veneer_core::{Unit, Value};
//!
//! let mut v = Value::px(10.0);
//! assert_eq!(v.set_from_str("50%"), Ok(true));
//! assert_eq!(v.unit(), Unit::Percentage);
//! assert_eq!(v.to_pixels(200.0), 100.0);
//!
//! // Malformed input keeps the previous value.
//! assert!(v.set_from_str("abc").is_err());
//! assert_eq!(v.to_string(), "50%");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    Pixel,
    Percentage,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Value {
    raw: f32,
    unit: Unit,
    negative_allowed: bool,
    /// Pixel values normally follow the surface's adaptive scale; projected
    /// positions opt out.
    pub ignore_adaptive_scaling: bool,
}

impl Default for Value {
    fn default() -> Self {
        Self::px(0.0)
    }
}

impl Value {
    pub const fn new(raw: f32, unit: Unit) -> Self {
        Self {
            raw,
            unit,
            negative_allowed: false,
            ignore_adaptive_scaling: false,
        }
    }

    pub const fn px(raw: f32) -> Self {
        Self::new(raw, Unit::Pixel)
    }

    pub const fn percent(raw: f32) -> Self {
        Self::new(raw, Unit::Percentage)
    }

    /// Same quantity, but negative raw values are kept instead of clamped.
    pub const fn allow_negative(mut self) -> Self {
        self.negative_allowed = true;
        self
    }

    pub fn raw(&self) -> f32 {
        self.raw
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn is_pixel(&self) -> bool {
        self.unit == Unit::Pixel
    }

    pub fn is_percentage(&self) -> bool {
        self.unit == Unit::Percentage
    }

    pub fn negative_allowed(&self) -> bool {
        self.negative_allowed
    }

    pub fn to_pixels(&self, reference: f32) -> f32 {
        self.to_pixels_scaled(reference, 1.0)
    }

    /// Like [`Value::to_pixels`], with `scale` applied to pixel quantities.
    pub fn to_pixels_scaled(&self, reference: f32, scale: f32) -> f32 {
        match self.unit {
            Unit::Pixel if self.ignore_adaptive_scaling => self.raw,
            Unit::Pixel => self.raw * scale,
            Unit::Percentage => self.raw / 100.0 * reference,
        }
    }

    /// Parses `"42px"`, `"50%"` or a bare number (pixels).
    ///
    /// Returns whether the stored value changed. On error nothing is modified.
    pub fn set_from_str(&mut self, source: &str) -> Result<bool, ValueError> {
        let (raw, unit) = parse_parts(source)?;
        Ok(self.assign(raw, unit))
    }

    pub fn set_pixels(&mut self, raw: f32) -> bool {
        if !raw.is_finite() {
            return false;
        }
        self.assign(raw, Unit::Pixel)
    }

    /// Copies quantity and unit from `other`, keeping this value's sign policy.
    pub fn set(&mut self, other: Value) -> bool {
        self.assign(other.raw, other.unit)
    }

    fn assign(&mut self, raw: f32, unit: Unit) -> bool {
        let raw = if !self.negative_allowed && raw < 0.0 {
            0.0
        } else {
            raw
        };
        if raw == self.raw && unit == self.unit {
            return false;
        }
        self.raw = raw;
        self.unit = unit;
        true
    }
}

fn parse_parts(source: &str) -> Result<(f32, Unit), ValueError> {
    let s = source.trim();
    let (number, unit) = if let Some(n) = s.strip_suffix("px") {
        (n, Unit::Pixel)
    } else if let Some(n) = s.strip_suffix('%') {
        (n, Unit::Percentage)
    } else {
        (s, Unit::Pixel)
    };
    let invalid = || ValueError::InvalidFormat(source.to_string());
    if number.is_empty() || number.ends_with(char::is_whitespace) {
        return Err(invalid());
    }
    let raw: f32 = number.parse().map_err(|_| invalid())?;
    if !raw.is_finite() {
        return Err(invalid());
    }
    Ok((raw, unit))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Pixel => write!(f, "{}px", self.raw),
            Unit::Percentage => write!(f, "{}%", self.raw),
        }
    }
}

impl FromStr for Value {
    type Err = ValueError;

    /// Parsed values keep their sign; the consuming property decides on clamping.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (raw, unit) = parse_parts(s)?;
        Ok(Value::new(raw, unit).allow_negative())
    }
}

impl From<f32> for Value {
    fn from(raw: f32) -> Self {
        Value::px(raw).allow_negative()
    }
}

/// Anything a size/position property accepts: strings, pixel numbers or values.
pub trait ValueSource {
    fn apply_to(self, target: &mut Value) -> Result<bool, ValueError>;
}

impl ValueSource for &str {
    fn apply_to(self, target: &mut Value) -> Result<bool, ValueError> {
        target.set_from_str(self)
    }
}

impl ValueSource for String {
    fn apply_to(self, target: &mut Value) -> Result<bool, ValueError> {
        target.set_from_str(&self)
    }
}

impl ValueSource for &String {
    fn apply_to(self, target: &mut Value) -> Result<bool, ValueError> {
        target.set_from_str(self)
    }
}

impl ValueSource for f32 {
    fn apply_to(self, target: &mut Value) -> Result<bool, ValueError> {
        if !self.is_finite() {
            return Err(ValueError::InvalidFormat(self.to_string()));
        }
        Ok(target.set_pixels(self))
    }
}

impl ValueSource for Value {
    fn apply_to(self, target: &mut Value) -> Result<bool, ValueError> {
        Ok(target.set(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_resolves_against_reference() {
        let v: Value = "50%".parse().unwrap();
        assert_eq!(v.to_pixels(200.0), 100.0);
        assert_eq!(v.to_pixels(0.0), 0.0);
    }

    #[test]
    fn pixels_ignore_reference() {
        let v: Value = "42px".parse().unwrap();
        for reference in [0.0, 1.0, 999.0] {
            assert_eq!(v.to_pixels(reference), 42.0);
        }
        assert_eq!(v.to_pixels_scaled(10.0, 2.0), 84.0);
    }

    #[test]
    fn bare_numbers_are_pixels() {
        let mut v = Value::percent(10.0);
        assert_eq!(v.set_from_str("12.5"), Ok(true));
        assert_eq!(v, Value::px(12.5));
    }

    #[test]
    fn invalid_input_keeps_previous_value() {
        let mut v = Value::percent(25.0);
        for bad in ["abc", "", "px", "%", "12pt", "1 0px", "NaN", "inf%"] {
            assert!(v.set_from_str(bad).is_err(), "{bad:?} should fail");
        }
        assert_eq!(v.to_pixels(400.0), 100.0);
        assert_eq!(v.to_string(), "25%");
    }

    #[test]
    fn reports_unchanged_values() {
        let mut v = Value::px(5.0);
        assert_eq!(v.set_from_str("5px"), Ok(false));
        assert_eq!(v.set_from_str("5%"), Ok(true));
    }

    #[test]
    fn negative_values_clamp_unless_allowed() {
        let mut size = Value::px(10.0);
        size.set_from_str("-20px").unwrap();
        assert_eq!(size.raw(), 0.0);

        let mut offset = Value::px(0.0).allow_negative();
        offset.set_from_str("-20px").unwrap();
        assert_eq!(offset.raw(), -20.0);
    }

    #[test]
    fn display_uses_canonical_suffix() {
        for src in ["42px", "50%", "-3.5px", "0.25%"] {
            let v: Value = src.parse().unwrap();
            assert_eq!(v.to_string(), src);
        }
        let v: Value = " 7 ".parse().unwrap();
        assert_eq!(v.to_string(), "7px");
    }

    #[test]
    fn ignores_adaptive_scale_when_asked() {
        let mut v = Value::px(10.0);
        v.ignore_adaptive_scaling = true;
        assert_eq!(v.to_pixels_scaled(0.0, 3.0), 10.0);
    }
}
