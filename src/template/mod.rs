//! # Template Model
//!
//! A template is the declarative description of one printable document:
//! physical canvas size, an asset map, and an ordered tree of elements.
//! The same types serve the Rust API and the JSON wire format.
//!
//! ```
//! use deepprint::template::Template;
//!
//! let template = Template::from_json(r#"{
//!     "canvas": {"width": 58, "height": 100, "unit": "mm"},
//!     "elements": [
//!         {"type": "text", "x": 2, "y": 2, "content": "{{store_name}}"},
//!         {"type": "table", "dataSource": "{{items}}", "columns": [{"field": "name", "header": "Item"}]}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(template.flattened().count(), 2);
//! ```
//!
//! Elements can also be grouped into layers; layers are flattened in order
//! and their order is the paint order:
//!
//! ```json
//! {"layers": [{"name": "background", "elements": [...]}, {"name": "content", "elements": [...]}]}
//! ```

pub mod types;

pub use types::*;

use serde::{Deserialize, Serialize};

use crate::assets::Assets;
use crate::error::DeepPrintError;
use crate::units::Unit;

/// Default canvas width: A4, in mm.
pub const DEFAULT_CANVAS_WIDTH: f64 = 210.0;

/// Default canvas height: A4, in mm.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 297.0;

// ============================================================================
// ELEMENT LIST DESERIALIZATION
// ============================================================================

/// Deserialize a `Vec<Element>`, tagging failures with the element index.
///
/// Each element is first parsed as raw JSON, so an error inside a deeply
/// nested container reads `elements[2]: elements[0]: unknown variant ...`.
fn deserialize_elements<'de, D>(deserializer: D) -> Result<Vec<Element>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_optional_elements(deserializer).map(Option::unwrap_or_default)
}

/// Like [`deserialize_elements`], but keeps "absent" (or `null`) distinct
/// from "empty".
fn deserialize_optional_elements<'de, D>(deserializer: D) -> Result<Option<Vec<Element>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    let Some(values) = values else {
        return Ok(None);
    };
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            if !v.is_object() {
                return Err(serde::de::Error::custom(format!(
                    "elements[{}]: expected object, got {}",
                    i, v
                )));
            }
            serde_json::from_value(v)
                .map_err(|e| serde::de::Error::custom(format!("elements[{}]: {}", i, e)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

// ============================================================================
// TEMPLATE
// ============================================================================

/// Physical page size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CanvasSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Unit of `width`/`height`. Default: mm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

impl CanvasSpec {
    pub fn mm(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            unit: Some(Unit::Mm),
        }
    }

    /// Width in canvas units, A4 when absent or zero.
    pub fn width_or_default(&self) -> f64 {
        self.width.filter(|w| *w != 0.0).unwrap_or(DEFAULT_CANVAS_WIDTH)
    }

    /// Height in canvas units, A4 when absent or zero.
    pub fn height_or_default(&self) -> f64 {
        self.height.filter(|h| *h != 0.0).unwrap_or(DEFAULT_CANVAS_HEIGHT)
    }

    pub fn unit_or_default(&self) -> Unit {
        self.unit.unwrap_or_default()
    }
}

/// A named group of elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_elements")]
    pub elements: Vec<Element>,
}

/// A printable document template.
///
/// Immutable input to the layout engine and the mock data synthesizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasSpec>,
    /// Asset key → resource locator, referenced as `ref:<key>`.
    #[serde(default, skip_serializing_if = "Assets::is_empty")]
    pub assets: Assets,
    /// Flat element list. Ignored when `layers` is present.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_elements",
        skip_serializing_if = "Option::is_none"
    )]
    pub elements: Option<Vec<Element>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<Layer>>,
}

impl Template {
    /// Create a template from a flat element list.
    pub fn new(canvas: CanvasSpec, elements: Vec<Element>) -> Self {
        Self {
            canvas: Some(canvas),
            elements: Some(elements),
            ..Default::default()
        }
    }

    /// Parse a template from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DeepPrintError> {
        serde_json::from_str(json).map_err(|e| DeepPrintError::Template(e.to_string()))
    }

    /// Parse a template from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DeepPrintError> {
        serde_json::from_value(value).map_err(|e| DeepPrintError::Template(e.to_string()))
    }

    /// Whether the template declares any element list at all.
    ///
    /// A template with neither `elements` nor `layers` lays out to an
    /// explicitly empty render tree.
    pub fn has_content(&self) -> bool {
        self.layers.is_some() || self.elements.is_some()
    }

    /// The canvas descriptor, with defaults filled in when absent.
    pub fn canvas(&self) -> CanvasSpec {
        self.canvas.unwrap_or_default()
    }

    /// Top-level elements in paint order, each with its layer name.
    ///
    /// Layers win over `elements` when both are present.
    pub fn flattened(&self) -> impl Iterator<Item = (Option<&str>, &Element)> {
        let layered = self.layers.iter().flatten().flat_map(|layer| {
            layer
                .elements
                .iter()
                .map(move |el| (layer.name.as_deref(), el))
        });
        let flat = self
            .elements
            .iter()
            .filter(|_| self.layers.is_none())
            .flatten()
            .map(|el| (None, el));
        layered.chain(flat)
    }

    /// Every element in the template, depth-first pre-order, containers
    /// followed by their descendants.
    pub fn walk(&self) -> Vec<&Element> {
        fn visit<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
            out.push(element);
            for child in element.children() {
                visit(child, out);
            }
        }

        let mut out = Vec::new();
        for (_, element) in self.flattened() {
            visit(element, &mut out);
        }
        out
    }
}
