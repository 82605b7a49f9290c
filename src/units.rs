//! # Unit Conversion
//!
//! Templates describe geometry in physical units; renderers want pixels.
//! This module maps millimeters and points to device pixels at a caller
//! supplied zoom factor.
//!
//! ## Conversion Constants
//!
//! | Preset | 1 mm | 1 pt | Use |
//! |--------|------|------|-----|
//! | [`UnitConfig::SCREEN`] | 3.78 px | 1.33 px | Browser preview (96 DPI, rounded) |
//! | [`UnitConfig::EXACT`] | 3.7795 px | 1.3333 px | 96 DPI, unrounded |
//! | [`UnitConfig::from_dpi`]`(203.0)` | 7.99 dots | 2.82 dots | 203 DPI thermal head |
//!
//! ## Usage
//!
//! ```
//! use deepprint::units::{Unit, UnitConfig};
//!
//! let config = UnitConfig::default();
//! assert_eq!(config.to_pixels(10.0, Unit::Mm, 1.0), 37.8);
//! ```

use serde::{Deserialize, Serialize};

/// Pixels per millimeter used by the screen preview.
pub const MM_TO_PX: f64 = 3.78;

/// Pixels per point used by the screen preview.
pub const PT_TO_PX: f64 = 1.33;

/// Millimeters per inch.
const MM_PER_INCH: f64 = 25.4;

/// Points per inch.
const PT_PER_INCH: f64 = 72.0;

/// Physical unit of a length. Unrecognized units read as millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pt,
    #[default]
    #[serde(other)]
    Mm,
}

/// Conversion constants for one render target.
///
/// Passed into the layout engine explicitly so a layout pass is a pure
/// function of its inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConfig {
    /// Pixels per millimeter
    pub mm_to_px: f64,

    /// Pixels per point
    pub pt_to_px: f64,
}

impl UnitConfig {
    /// Rounded 96 DPI constants, matching what browser previews use.
    pub const SCREEN: UnitConfig = UnitConfig {
        mm_to_px: MM_TO_PX,
        pt_to_px: PT_TO_PX,
    };

    /// Exact 96 DPI constants (96 / 25.4 and 96 / 72).
    pub const EXACT: UnitConfig = UnitConfig {
        mm_to_px: 96.0 / MM_PER_INCH,
        pt_to_px: 96.0 / PT_PER_INCH,
    };

    /// Constants for a device with the given resolution.
    ///
    /// ```text
    /// dots_per_mm = dpi / 25.4
    /// dots_per_pt = dpi / 72
    /// ```
    pub fn from_dpi(dpi: f64) -> Self {
        Self {
            mm_to_px: dpi / MM_PER_INCH,
            pt_to_px: dpi / PT_PER_INCH,
        }
    }

    /// Pixels per one unit of `unit`.
    pub fn factor(&self, unit: Unit) -> f64 {
        match unit {
            Unit::Mm => self.mm_to_px,
            Unit::Pt => self.pt_to_px,
        }
    }

    /// Convert a physical length to pixels at `scale`.
    pub fn to_pixels(&self, value: f64, unit: Unit, scale: f64) -> f64 {
        value * self.factor(unit) * scale
    }

    /// Resolve a template length (millimeters) to a [`Dimension`].
    ///
    /// Numbers convert to pixels, `"N%"` stays a relative percentage,
    /// absent or `"auto"` is [`Dimension::Auto`], and any other string is
    /// passed through verbatim.
    pub fn resolve_length(&self, length: Option<&Length>, scale: f64) -> Dimension {
        match length {
            None => Dimension::Auto,
            Some(Length::Number(mm)) => Dimension::Px(self.to_pixels(*mm, Unit::Mm, scale)),
            Some(Length::Text(raw)) => parse_dimension_text(raw),
        }
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self::SCREEN
    }
}

/// Convert a physical length to pixels using the screen preset.
pub fn to_pixels(value: f64, unit: Unit, scale: f64) -> f64 {
    UnitConfig::SCREEN.to_pixels(value, unit, scale)
}

/// A length as written in a template: a number of millimeters or a string
/// such as `"50%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    Number(f64),
    Text(String),
}

impl Length {
    /// The numeric value, if this length is a plain number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Length::Number(n) => Some(*n),
            Length::Text(_) => None,
        }
    }
}

/// A resolved width or height.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Dimension {
    /// Absolute size in pixels.
    Px(f64),
    /// Percentage of a reference box the renderer chooses. Unresolved.
    Percent(f64),
    /// Size from content.
    Auto,
    /// Stretch to fill the parent's cross axis.
    Fill,
    /// Unrecognized string, passed through for the renderer.
    Literal(String),
}

impl Dimension {
    /// Pixel size, if definite.
    pub fn px(&self) -> Option<f64> {
        match self {
            Dimension::Px(px) => Some(*px),
            _ => None,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Dimension::Auto)
    }
}

fn parse_dimension_text(raw: &str) -> Dimension {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Dimension::Auto;
    }
    if let Some(number) = trimmed.strip_suffix('%') {
        if let Ok(percent) = number.trim().parse::<f64>() {
            return Dimension::Percent(percent);
        }
    }
    Dimension::Literal(raw.to_string())
}
