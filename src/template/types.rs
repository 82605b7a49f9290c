//! Element types for the template model.
//!
//! All types derive `Deserialize` so a template generated as JSON maps
//! straight onto them, and `Serialize` so a parsed template can be written
//! back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::units::Length;

/// Returns whether a JSON value counts as "set" for optional flags.
///
/// `null`, `false`, `0`, `""` are unset; everything else is set.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ============================================================================
// ELEMENT
// ============================================================================

/// One visual node of a template.
///
/// Common geometry lives here; the kind-specific part is the flattened
/// [`ElementKind`], selected by the JSON `"type"` field:
///
/// ```json
/// {"type": "text", "x": 5, "y": 10, "content": "{{store_name}}", "style": {"fontSize": 12}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Stable key; the layout engine falls back to the element's index path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Left edge in mm. Ignored inside a flow container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Top edge in mm. Ignored inside a flow container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Length>,
    /// Paint order. Default: 1.
    #[serde(default, rename = "zIndex", skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub props: Props,
    /// Text content; may contain placeholders. Takes precedence over `props.text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create an element of the given kind with no geometry.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: None,
            x: None,
            y: None,
            width: None,
            height: None,
            z_index: None,
            style: None,
            props: Props::default(),
            content: None,
            kind,
        }
    }

    /// Text element with literal (or placeholder) content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(Value::String(content.into())),
            ..Self::new(ElementKind::Text)
        }
    }

    /// Place at `(x, y)` mm.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Set width and height in mm.
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = Some(Length::Number(width));
        self.height = Some(Length::Number(height));
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The value to interpolate as text: `content`, or `props.text` when
    /// content is absent, null or empty.
    pub fn text_source(&self) -> Option<&Value> {
        match &self.content {
            Some(Value::Null) | None => self.props.get("text"),
            Some(Value::String(s)) if s.is_empty() => self.props.get("text"),
            Some(value) => Some(value),
        }
    }

    /// Child elements, for containers.
    pub fn children(&self) -> &[Element] {
        match &self.kind {
            ElementKind::Container(container) => &container.elements,
            _ => &[],
        }
    }

    /// The serialized `"type"` tag of this element.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Kind-specific payload of an [`Element`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Rect,
    Line,
    Image,
    Qrcode,
    Container(Container),
    Table(Table),
}

impl ElementKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Rect => "rect",
            ElementKind::Line => "line",
            ElementKind::Image => "image",
            ElementKind::Qrcode => "qrcode",
            ElementKind::Container(_) => "container",
            ElementKind::Table(_) => "table",
        }
    }
}

// ============================================================================
// CONTAINER
// ============================================================================

/// How a container positions its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Children stack top to bottom.
    Vertical,
    /// Children stack left to right.
    Horizontal,
    /// Children use their own `x`/`y`. Unrecognized modes fall back here.
    #[default]
    #[serde(other)]
    Absolute,
}

impl LayoutMode {
    /// Whether children flow rather than sit at explicit coordinates.
    pub fn is_flow(self) -> bool {
        !matches!(self, LayoutMode::Absolute)
    }
}

/// Container: groups child elements, optionally as a flow.
///
/// ## Example (JSON)
///
/// ```json
/// {
///   "type": "container",
///   "layout": "vertical",
///   "gap": 2,
///   "elements": [
///     {"type": "text", "content": "{{title}}", "height": 8},
///     {"type": "line", "width": 50}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Container {
    #[serde(default, deserialize_with = "super::deserialize_elements")]
    pub elements: Vec<Element>,
    /// `absolute` (default), `vertical` or `horizontal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutMode>,
    /// Spacing between flow children in mm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
}

impl Container {
    pub fn layout_mode(&self) -> LayoutMode {
        self.layout.unwrap_or_default()
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// Table column definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Column {
    /// Key looked up in each row object.
    #[serde(default)]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// "left" (default), "center" or "right".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,
}

impl Column {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: Some(header.into()),
            ..Default::default()
        }
    }
}

/// Data-bound table: one row per item of an array in the data context.
///
/// ## Example (JSON)
///
/// ```json
/// {
///   "type": "table",
///   "dataSource": "{{items}}",
///   "columns": [
///     {"field": "name", "header": "Item"},
///     {"field": "price", "header": "Price", "align": "right"}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Reference to an array in the data context, e.g. `{{items}}`.
    #[serde(default, rename = "dataSource", skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default, rename = "headerStyle", skip_serializing_if = "Option::is_none")]
    pub header_style: Option<Style>,
}

impl Table {
    /// The bare data-context key named by `dataSource`, with `{{ }}` removed.
    pub fn data_key(&self) -> Option<&str> {
        let raw = self.data_source.as_deref()?;
        let key = raw.trim_matches(|c: char| c == '{' || c == '}' || c.is_whitespace());
        if key.is_empty() { None } else { Some(key) }
    }
}

// ============================================================================
// STYLE & PROPS
// ============================================================================

/// Visual properties of an element.
///
/// Kept as an open map: the engine converts the unit-tagged fields and
/// passes everything else through to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(pub Map<String, Value>);

impl Style {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }
}

/// Kind-specific payload (`props`) of an element.
///
/// Free-form so that every string value can be scanned for placeholders;
/// typed accessors cover the keys the engine understands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(pub Map<String, Value>);

const DEFAULT_LINE_HEIGHT: f64 = 1.2;
const DEFAULT_OBJECT_FIT: &str = "cover";

impl Props {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every string-valued prop, in key order.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.0.values().filter_map(Value::as_str)
    }

    /// `props.wrap`: whether text may wrap.
    pub fn wrap(&self) -> bool {
        self.0.get("wrap").is_some_and(is_truthy)
    }

    /// `props.lineHeight`, default 1.2.
    pub fn line_height(&self) -> f64 {
        let value = match self.0.get("lineHeight") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        value
            .filter(|lh| *lh != 0.0 && lh.is_finite())
            .unwrap_or(DEFAULT_LINE_HEIGHT)
    }

    /// `props.dashArray`: dashed instead of solid line.
    pub fn dash_array(&self) -> bool {
        self.0.get("dashArray").is_some_and(is_truthy)
    }

    /// `props.src`: image locator or `ref:` asset reference.
    pub fn src(&self) -> &str {
        self.0.get("src").and_then(Value::as_str).unwrap_or("")
    }

    /// `props.objectFit`, default `cover`.
    pub fn object_fit(&self) -> &str {
        self.0
            .get("objectFit")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_OBJECT_FIT)
    }

    /// `props.value`: QR code payload.
    pub fn value(&self) -> Option<&Value> {
        self.0.get("value")
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_element() {
        let el: Element =
            serde_json::from_value(json!({"type": "text", "x": 5, "y": 10, "content": "hi"})).unwrap();
        assert!(matches!(el.kind, ElementKind::Text));
        assert_eq!(el.x, Some(5.0));
        assert_eq!(el.text_source(), Some(&json!("hi")));
    }

    #[test]
    fn test_text_source_falls_back_to_props() {
        let el: Element =
            serde_json::from_value(json!({"type": "text", "content": "", "props": {"text": "p"}}))
                .unwrap();
        assert_eq!(el.text_source(), Some(&json!("p")));

        let el: Element =
            serde_json::from_value(json!({"type": "text", "props": {"text": "p"}})).unwrap();
        assert_eq!(el.text_source(), Some(&json!("p")));
    }

    #[test]
    fn test_percent_width() {
        let el: Element =
            serde_json::from_value(json!({"type": "rect", "width": "50%", "height": 4})).unwrap();
        assert_eq!(el.width, Some(Length::Text("50%".into())));
        assert_eq!(el.height, Some(Length::Number(4.0)));
    }

    #[test]
    fn test_container_layout_modes() {
        let el: Element = serde_json::from_value(json!({
            "type": "container",
            "layout": "vertical",
            "gap": 2,
            "elements": [{"type": "rect"}, {"type": "line"}]
        }))
        .unwrap();
        let ElementKind::Container(c) = &el.kind else {
            panic!("expected container");
        };
        assert_eq!(c.layout_mode(), LayoutMode::Vertical);
        assert_eq!(c.gap, Some(2.0));
        assert_eq!(el.children().len(), 2);
    }

    #[test]
    fn test_unknown_layout_is_absolute() {
        let c: Container = serde_json::from_value(json!({"layout": "grid"})).unwrap();
        assert_eq!(c.layout_mode(), LayoutMode::Absolute);
        let c: Container = serde_json::from_value(json!({})).unwrap();
        assert_eq!(c.layout_mode(), LayoutMode::Absolute);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<Element, _> = serde_json::from_value(json!({"type": "barcode"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_table_data_key() {
        let mut table = Table {
            data_source: Some("{{items}}".into()),
            ..Default::default()
        };
        assert_eq!(table.data_key(), Some("items"));
        table.data_source = Some("{{ items }}".into());
        assert_eq!(table.data_key(), Some("items"));
        table.data_source = Some("items".into());
        assert_eq!(table.data_key(), Some("items"));
        table.data_source = Some("{{}}".into());
        assert_eq!(table.data_key(), None);
    }

    #[test]
    fn test_table_camel_case_fields() {
        let el: Element = serde_json::from_value(json!({
            "type": "table",
            "dataSource": "{{items}}",
            "headerStyle": {"fontWeight": "bold"},
            "columns": [{"field": "name", "header": "Item", "align": "right", "width": 20}]
        }))
        .unwrap();
        let ElementKind::Table(t) = &el.kind else {
            panic!("expected table");
        };
        assert_eq!(t.data_key(), Some("items"));
        assert_eq!(t.columns[0].align.as_deref(), Some("right"));
        assert!(t.header_style.is_some());
    }

    #[test]
    fn test_props_accessors() {
        let props: Props = serde_json::from_value(json!({
            "wrap": true,
            "lineHeight": "1.5",
            "dashArray": 1,
            "src": "ref:logo",
            "value": "{{qr}}"
        }))
        .unwrap();
        assert!(props.wrap());
        assert_eq!(props.line_height(), 1.5);
        assert!(props.dash_array());
        assert_eq!(props.src(), "ref:logo");
        assert_eq!(props.object_fit(), "cover");
        assert_eq!(props.strings().count(), 3);
    }

    #[test]
    fn test_props_defaults() {
        let props = Props::default();
        assert!(!props.wrap());
        assert_eq!(props.line_height(), 1.2);
        assert!(!props.dash_array());
        assert_eq!(props.src(), "");
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([])));
    }
}
