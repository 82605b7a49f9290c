//! Render tree: the fully resolved output of a layout pass.
//!
//! Every node carries pixel-space geometry, a resolved style and its
//! kind-specific content. Renderers consume it without looking back at the
//! template or the data context.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use super::style::ResolvedStyle;
use crate::template::LayoutMode;
use crate::units::Dimension;

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    /// Canvas width in px.
    pub width: f64,
    /// Canvas height in px.
    pub height: f64,
    /// Zoom factor the pass ran at.
    pub scale: f64,
    /// Set when the template declared neither `elements` nor `layers`.
    pub empty: bool,
    /// Top-level nodes in document order.
    pub nodes: Vec<RenderNode>,
}

impl RenderTree {
    /// An explicitly empty tree for a canvas of the given pixel size.
    pub fn empty(width: f64, height: f64, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
            empty: true,
            nodes: Vec::new(),
        }
    }

    /// Top-level nodes sorted by z-index. Equal z-indices keep document
    /// order.
    pub fn paint_order(&self) -> Vec<&RenderNode> {
        let mut ordered: Vec<&RenderNode> = self.nodes.iter().collect();
        ordered.sort_by_key(|node| node.z_index);
        ordered
    }

    /// Find a node anywhere in the tree by key.
    pub fn find(&self, key: &str) -> Option<&RenderNode> {
        self.walk().into_iter().find(|node| node.key == key)
    }

    /// Every node, depth-first pre-order.
    pub fn walk(&self) -> Vec<&RenderNode> {
        fn visit<'a>(node: &'a RenderNode, out: &mut Vec<&'a RenderNode>) {
            out.push(node);
            for child in node.children() {
                visit(child, out);
            }
        }

        let mut out = Vec::new();
        for node in &self.nodes {
            visit(node, &mut out);
        }
        out
    }
}

/// One resolved element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    /// Element `id`, or its index path (`"2"`, `"2.0"`).
    pub key: String,
    /// Layer the node came from (top-level nodes of layered templates).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    pub geometry: Geometry,
    pub z_index: i64,
    pub style: ResolvedStyle,
    #[serde(flatten)]
    pub content: NodeContent,
}

impl RenderNode {
    /// Child nodes, for containers.
    pub fn children(&self) -> &[RenderNode] {
        match &self.content {
            NodeContent::Container { children, .. } => children,
            _ => &[],
        }
    }

    /// Resolved text, for text nodes.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Main axis of a flow container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    /// The flow axis of a container layout mode, `None` for absolute.
    pub fn of(mode: LayoutMode) -> Option<Axis> {
        match mode {
            LayoutMode::Absolute => None,
            LayoutMode::Vertical => Some(Axis::Vertical),
            LayoutMode::Horizontal => Some(Axis::Horizontal),
        }
    }
}

/// Where a node sits relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Placement {
    /// Explicit offset in px from the parent's origin.
    Absolute { x: f64, y: f64 },
    /// Position inside a flow container.
    ///
    /// `offset` is the main-axis offset in px; `None` once a preceding
    /// sibling has no definite main-axis size.
    Flow {
        axis: Axis,
        index: usize,
        offset: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    pub placement: Placement,
    pub width: Dimension,
    pub height: Dimension,
}

impl Geometry {
    /// Size along `axis`.
    pub fn main(&self, axis: Axis) -> &Dimension {
        match axis {
            Axis::Vertical => &self.height,
            Axis::Horizontal => &self.width,
        }
    }

    /// Size across `axis`.
    pub fn cross(&self, axis: Axis) -> &Dimension {
        match axis {
            Axis::Vertical => &self.width,
            Axis::Horizontal => &self.height,
        }
    }

    pub fn main_mut(&mut self, axis: Axis) -> &mut Dimension {
        match axis {
            Axis::Vertical => &mut self.height,
            Axis::Horizontal => &mut self.width,
        }
    }

    pub fn cross_mut(&mut self, axis: Axis) -> &mut Dimension {
        match axis {
            Axis::Vertical => &mut self.width,
            Axis::Horizontal => &mut self.height,
        }
    }
}

// ============================================================================
// CONTENT
// ============================================================================

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Parse `left`/`center`/`right`; anything else is left.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            Some(a) if a.eq_ignore_ascii_case("center") => TextAlign::Center,
            Some(a) if a.eq_ignore_ascii_case("right") => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

/// Resolved table column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub field: String,
    pub header: String,
    pub align: TextAlign,
    pub width: Dimension,
}

/// One table data row: the raw value of each column's field, in column
/// order. Serializes as an object keyed by field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    cells: Vec<(String, Value)>,
}

impl TableRow {
    /// Pick each column's field out of `record`. Cells are not interpolated;
    /// missing fields and non-object records give `null`. A field named by
    /// more than one column appears once.
    pub fn from_record(columns: &[TableColumn], record: &Value) -> Self {
        let mut cells: Vec<(String, Value)> = Vec::with_capacity(columns.len());
        for col in columns {
            if cells.iter().any(|(field, _)| *field == col.field) {
                continue;
            }
            let value = record.get(&col.field).cloned().unwrap_or(Value::Null);
            cells.push((col.field.clone(), value));
        }
        Self { cells }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.cells.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    /// Cell values in column order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (field, value) in &self.cells {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

/// Kind-specific part of a [`RenderNode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum NodeContent {
    Text {
        text: String,
        wrap: bool,
        line_height: f64,
        align: TextAlign,
    },
    Rect {
        fill: String,
        border: String,
    },
    Line {
        /// Stroke thickness in px, at least 1.
        thickness: f64,
        dashed: bool,
        stroke: String,
    },
    Image {
        src: String,
        object_fit: String,
    },
    Qrcode {
        value: String,
        pixel_width: u32,
        pixel_height: u32,
        /// Modules per side of the encoded symbol; absent when the payload
        /// does not fit in a QR code.
        #[serde(skip_serializing_if = "Option::is_none")]
        modules: Option<usize>,
    },
    Container {
        layout: LayoutMode,
        /// Gap between flow children in px.
        gap: f64,
        children: Vec<RenderNode>,
    },
    Table {
        columns: Vec<TableColumn>,
        /// One entry per data row.
        rows: Vec<TableRow>,
        /// No rows: the data source was missing, not an array, or empty.
        empty: bool,
        header_style: ResolvedStyle,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rect(key: &str, z_index: i64) -> RenderNode {
        RenderNode {
            key: key.to_string(),
            layer: None,
            geometry: Geometry {
                placement: Placement::Absolute { x: 0.0, y: 0.0 },
                width: Dimension::Auto,
                height: Dimension::Auto,
            },
            z_index,
            style: ResolvedStyle::default(),
            content: NodeContent::Rect {
                fill: "transparent".into(),
                border: "1px solid #000".into(),
            },
        }
    }

    #[test]
    fn test_paint_order_is_stable() {
        let tree = RenderTree {
            nodes: vec![rect("a", 2), rect("b", 1), rect("c", 2), rect("d", 0)],
            ..RenderTree::empty(100.0, 100.0, 1.0)
        };
        let keys: Vec<_> = tree.paint_order().iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_find_nested() {
        let mut outer = rect("outer", 1);
        outer.content = NodeContent::Container {
            layout: LayoutMode::Vertical,
            gap: 0.0,
            children: vec![rect("inner", 1)],
        };
        let tree = RenderTree {
            nodes: vec![outer],
            ..RenderTree::empty(10.0, 10.0, 1.0)
        };
        assert_eq!(tree.find("inner").map(|n| n.key.as_str()), Some("inner"));
        assert!(tree.find("nope").is_none());
        assert_eq!(tree.walk().len(), 2);
    }

    #[test]
    fn test_text_align_parse() {
        assert_eq!(TextAlign::parse(Some("center")), TextAlign::Center);
        assert_eq!(TextAlign::parse(Some("RIGHT")), TextAlign::Right);
        assert_eq!(TextAlign::parse(Some("justify")), TextAlign::Left);
        assert_eq!(TextAlign::parse(None), TextAlign::Left);
    }

    #[test]
    fn test_node_serializes_flat() {
        let json = serde_json::to_value(rect("r", 3)).unwrap();
        assert_eq!(json["type"], "rect");
        assert_eq!(json["key"], "r");
        assert_eq!(json["zIndex"], 3);
        assert!(json.get("z_index").is_none());
        assert_eq!(json["fill"], "transparent");
        assert_eq!(json["geometry"]["placement"], json!({"mode": "absolute", "x": 0.0, "y": 0.0}));
        assert!(json.get("layer").is_none());
    }

    #[test]
    fn test_content_fields_are_camel_case() {
        let mut node = rect("q", 1);
        node.content = NodeContent::Qrcode {
            value: "x".into(),
            pixel_width: 75,
            pixel_height: 75,
            modules: Some(21),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["pixelWidth"], 75);
        assert_eq!(json["pixelHeight"], 75);
        assert!(json.get("pixel_width").is_none());

        node.content = NodeContent::Text {
            text: "t".into(),
            wrap: false,
            line_height: 1.2,
            align: TextAlign::Left,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["lineHeight"], 1.2);
    }

    #[test]
    fn test_table_row_follows_column_order() {
        let column = |field: &str| TableColumn {
            field: field.to_string(),
            header: String::new(),
            align: TextAlign::Left,
            width: Dimension::Auto,
        };
        let columns = vec![column("price"), column("name"), column("price")];
        let row = TableRow::from_record(&columns, &json!({"name": "Tea", "price": 3, "extra": true}));

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("name"), Some(&json!("Tea")));
        assert_eq!(row.get("extra"), None);
        assert_eq!(row.values().collect::<Vec<_>>(), vec![&json!(3), &json!("Tea")]);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"price":3,"name":"Tea"}"#);

        let row = TableRow::from_record(&columns, &json!("not an object"));
        assert_eq!(serde_json::to_value(&row).unwrap(), json!({"price": null, "name": null}));
    }
}
