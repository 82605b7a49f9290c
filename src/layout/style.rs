//! Style resolution.
//!
//! | Property | Unit in template | Output |
//! |----------|------------------|--------|
//! | `fontSize`, `strokeWidth` | pt | px |
//! | `borderRadius`, `padding`, `borderWidth` | mm | px |
//! | `top`, `left`, `right`, `bottom` | mm | px |
//! | `fontFamily` | `ref:` or literal | resolved asset |
//! | anything else | | unchanged |
//!
//! Only numeric values convert; a string such as `"2px"` passes through.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::assets::{Assets, resolve_asset};
use crate::template::Style;
use crate::units::{Unit, UnitConfig};

const PT_PROPERTIES: &[&str] = &["fontSize", "strokeWidth"];

const MM_PROPERTIES: &[&str] = &[
    "borderRadius",
    "padding",
    "borderWidth",
    "top",
    "left",
    "right",
    "bottom",
];

const ASSET_PROPERTIES: &[&str] = &["fontFamily"];

/// A style property after unit conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleValue {
    /// Converted length in px.
    Px(f64),
    /// Passed through from the template.
    Raw(Value),
}

/// Style with physical lengths converted to px.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedStyle(BTreeMap<String, StyleValue>);

impl ResolvedStyle {
    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.0.get(name)
    }

    /// A converted length, in px.
    pub fn px(&self, name: &str) -> Option<f64> {
        match self.0.get(name)? {
            StyleValue::Px(px) => Some(*px),
            StyleValue::Raw(_) => None,
        }
    }

    /// A pass-through string property.
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            StyleValue::Raw(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StyleValue)> {
        self.0.iter()
    }
}

/// Convert a template style at `scale`.
pub fn resolve_style(
    style: Option<&Style>,
    config: &UnitConfig,
    scale: f64,
    assets: &Assets,
) -> ResolvedStyle {
    let Some(style) = style else {
        return ResolvedStyle::default();
    };

    let resolved = style
        .iter()
        .map(|(name, value)| {
            let unit = if PT_PROPERTIES.contains(&name.as_str()) {
                Some(Unit::Pt)
            } else if MM_PROPERTIES.contains(&name.as_str()) {
                Some(Unit::Mm)
            } else {
                None
            };

            let out = match (unit, value) {
                (Some(unit), Value::Number(n)) => match n.as_f64() {
                    Some(v) => StyleValue::Px(config.to_pixels(v, unit, scale)),
                    None => StyleValue::Raw(value.clone()),
                },
                (None, Value::String(s)) if ASSET_PROPERTIES.contains(&name.as_str()) => {
                    StyleValue::Raw(Value::String(resolve_asset(s, assets)))
                }
                _ => StyleValue::Raw(value.clone()),
            };
            (name.clone(), out)
        })
        .collect();

    ResolvedStyle(resolved)
}
