//! # Layout Engine
//!
//! Turns a [`Template`] plus a [`DataContext`] into a [`RenderTree`]: every
//! element's pixel geometry, resolved style and content.
//!
//! ## Positioning
//!
//! | Parent | Child position |
//! |--------|----------------|
//! | canvas, `absolute` container | `x`/`y` mm → px |
//! | `vertical` container | stacked top to bottom, `x`/`y` ignored |
//! | `horizontal` container | stacked left to right, `x`/`y` ignored |
//!
//! Flow offsets accumulate: `offset[i+1] = offset[i] + size[i] + gap`. Once
//! a sibling has no definite main-axis size (auto, percent), later offsets
//! are left to the renderer. An `auto` cross-axis size stretches to the
//! container.
//!
//! ## Usage
//!
//! ```
//! use deepprint::{DataContext, Template, layout};
//! use serde_json::json;
//!
//! let template = Template::from_value(json!({
//!     "canvas": {"width": 58, "height": 100},
//!     "elements": [{"type": "text", "x": 2, "y": 2, "content": "{{store_name}}"}]
//! })).unwrap();
//! let ctx = DataContext::from_value(json!({"store_name": "Cafe"})).unwrap();
//!
//! let tree = layout(&template, &ctx, 1.0);
//! assert_eq!(tree.nodes[0].text(), Some("Cafe"));
//! ```

pub mod style;
pub mod tree;

pub use style::{ResolvedStyle, StyleValue, resolve_style};
pub use tree::{
    Axis, Geometry, NodeContent, Placement, RenderNode, RenderTree, TableColumn, TableRow, TextAlign,
};

use qrcode::QrCode;
use serde_json::Value;

use crate::assets::{Assets, resolve_asset};
use crate::data::DataContext;
use crate::interpolate::{display_value, interpolate_value};
use crate::template::{Container, Element, ElementKind, Table, Template};
use crate::units::{Dimension, Length, Unit, UnitConfig};

/// Default z-index of an element without `zIndex`.
pub const DEFAULT_Z_INDEX: i64 = 1;

/// Default QR code side in mm.
pub const DEFAULT_QR_SIZE: f64 = 20.0;

/// Default line stroke width in pt.
pub const DEFAULT_STROKE_WIDTH: f64 = 0.5;

/// QR payload used when the element's value resolves to nothing.
pub const DEFAULT_QR_VALUE: &str = "DP";

const DEFAULT_STROKE: &str = "#000";
const DEFAULT_FILL: &str = "transparent";
const DEFAULT_BORDER: &str = "1px solid #000";

/// Lay out `template` against `ctx` with the screen unit preset.
pub fn layout(template: &Template, ctx: &DataContext, scale: f64) -> RenderTree {
    LayoutEngine::default().layout(template, ctx, scale)
}

/// Layout engine bound to one set of conversion constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine {
    config: UnitConfig,
}

impl LayoutEngine {
    pub fn new(config: UnitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    /// Run one layout pass. Never fails; inputs are not modified.
    pub fn layout(&self, template: &Template, ctx: &DataContext, scale: f64) -> RenderTree {
        let canvas = template.canvas();
        let factor = self.config.factor(canvas.unit_or_default()) * scale;
        let width = canvas.width_or_default() * factor;
        let height = canvas.height_or_default() * factor;

        if !template.has_content() {
            tracing::debug!("template has no elements, empty render tree");
            return RenderTree::empty(width, height, scale);
        }

        let pass = Pass {
            config: self.config,
            ctx,
            assets: &template.assets,
            scale,
        };
        let nodes = pass.layout_children(template.flattened(), ParentLayout::Absolute, None);

        tracing::debug!(nodes = nodes.len(), width, height, scale, "layout pass complete");

        RenderTree {
            width,
            height,
            scale,
            empty: false,
            nodes,
        }
    }
}

// ============================================================================
// LAYOUT PASS
// ============================================================================

/// How the parent positions its children.
#[derive(Debug, Clone, Copy)]
enum ParentLayout {
    Absolute,
    Flow {
        axis: Axis,
        /// Gap between children, px.
        gap: f64,
        /// The container's cross-axis size, px, if definite.
        cross: Option<f64>,
    },
}

/// State shared by every node of one layout pass.
struct Pass<'a> {
    config: UnitConfig,
    ctx: &'a DataContext,
    assets: &'a Assets,
    scale: f64,
}

impl Pass<'_> {
    fn mm(&self, value: f64) -> f64 {
        self.config.to_pixels(value, Unit::Mm, self.scale)
    }

    fn pt(&self, value: f64) -> f64 {
        self.config.to_pixels(value, Unit::Pt, self.scale)
    }

    fn layout_children<'e>(
        &self,
        elements: impl Iterator<Item = (Option<&'e str>, &'e Element)>,
        parent: ParentLayout,
        prefix: Option<&str>,
    ) -> Vec<RenderNode> {
        let mut nodes = Vec::new();
        // Main-axis cursor for flow parents
        let mut cursor = Some(0.0);

        for (index, (layer, element)) in elements.enumerate() {
            let path = match prefix {
                Some(prefix) => format!("{}.{}", prefix, index),
                None => index.to_string(),
            };

            let placement = match parent {
                ParentLayout::Absolute => Placement::Absolute {
                    x: self.mm(element.x.unwrap_or(0.0)),
                    y: self.mm(element.y.unwrap_or(0.0)),
                },
                ParentLayout::Flow { axis, .. } => Placement::Flow {
                    axis,
                    index,
                    offset: cursor,
                },
            };

            let mut node = self.layout_node(element, &path, placement, parent);
            node.layer = layer.map(str::to_string);

            if let ParentLayout::Flow { axis, gap, .. } = parent {
                cursor = cursor
                    .zip(node.geometry.main(axis).px())
                    .map(|(offset, size)| offset + size + gap);
            }
            nodes.push(node);
        }

        nodes
    }

    fn layout_node(
        &self,
        element: &Element,
        path: &str,
        placement: Placement,
        parent: ParentLayout,
    ) -> RenderNode {
        let style = resolve_style(element.style.as_ref(), &self.config, self.scale, self.assets);

        let mut geometry = Geometry {
            placement,
            width: self.config.resolve_length(element.width.as_ref(), self.scale),
            height: self.config.resolve_length(element.height.as_ref(), self.scale),
        };

        let content = match &element.kind {
            ElementKind::Text => self.text(element, &style),
            ElementKind::Rect => NodeContent::Rect {
                fill: style_string(element, "backgroundColor", DEFAULT_FILL),
                border: style_string(element, "border", DEFAULT_BORDER),
            },
            ElementKind::Line => {
                let content = self.line(element);
                if let NodeContent::Line { thickness, .. } = &content {
                    geometry.height = Dimension::Px(*thickness);
                }
                content
            }
            ElementKind::Image => NodeContent::Image {
                src: resolve_asset(&self.interpolate_prop(element.props.get("src")), self.assets),
                object_fit: element.props.object_fit().to_string(),
            },
            ElementKind::Qrcode => {
                let content = self.qrcode(element);
                if let NodeContent::Qrcode {
                    pixel_width,
                    pixel_height,
                    ..
                } = &content
                {
                    // Percent and literal sizes stay for the renderer to resolve
                    if takes_qr_size(element.width.as_ref()) {
                        geometry.width = Dimension::Px(f64::from(*pixel_width));
                    }
                    if takes_qr_size(element.height.as_ref()) {
                        geometry.height = Dimension::Px(f64::from(*pixel_height));
                    }
                }
                content
            }
            // Children need the final geometry; filled in below
            ElementKind::Container(_) => NodeContent::Container {
                layout: Default::default(),
                gap: 0.0,
                children: Vec::new(),
            },
            ElementKind::Table(table) => self.table(table),
        };

        if let ParentLayout::Flow { axis, cross, .. } = parent {
            let dim = geometry.cross_mut(axis);
            if dim.is_auto() {
                *dim = cross.map(Dimension::Px).unwrap_or(Dimension::Fill);
            }
        }

        let content = match &element.kind {
            ElementKind::Container(container) => self.container(container, path, &mut geometry),
            _ => content,
        };

        RenderNode {
            key: element.id.clone().unwrap_or_else(|| path.to_string()),
            layer: None,
            geometry,
            z_index: element.z_index.unwrap_or(DEFAULT_Z_INDEX),
            style,
            content,
        }
    }

    // ------------------------------------------------------------------------
    // Kinds
    // ------------------------------------------------------------------------

    fn text(&self, element: &Element, style: &ResolvedStyle) -> NodeContent {
        NodeContent::Text {
            text: self.interpolate_prop(element.text_source()),
            wrap: element.props.wrap(),
            line_height: element.props.line_height(),
            align: TextAlign::parse(style.str("textAlign")),
        }
    }

    fn line(&self, element: &Element) -> NodeContent {
        let stroke_width = element
            .style
            .as_ref()
            .and_then(|s| s.number("strokeWidth"))
            .filter(|w| *w != 0.0)
            .unwrap_or(DEFAULT_STROKE_WIDTH);

        NodeContent::Line {
            thickness: self.pt(stroke_width).max(1.0),
            dashed: element.props.dash_array(),
            stroke: style_string(element, "stroke", DEFAULT_STROKE),
        }
    }

    fn qrcode(&self, element: &Element) -> NodeContent {
        let mut value = self.interpolate_prop(element.props.value());
        if value.is_empty() {
            value = DEFAULT_QR_VALUE.to_string();
        }
        let modules = QrCode::new(value.as_bytes()).ok().map(|code| code.width());

        NodeContent::Qrcode {
            pixel_width: self.qr_side(element.width.as_ref()),
            pixel_height: self.qr_side(element.height.as_ref()),
            value,
            modules,
        }
    }

    fn qr_side(&self, length: Option<&Length>) -> u32 {
        let mm = length
            .and_then(Length::as_number)
            .filter(|n| *n != 0.0)
            .unwrap_or(DEFAULT_QR_SIZE);
        self.mm(mm).floor().max(0.0) as u32
    }

    fn container(&self, container: &Container, path: &str, geometry: &mut Geometry) -> NodeContent {
        let layout = container.layout_mode();
        let gap = self.mm(container.gap.unwrap_or(0.0));
        let axis = Axis::of(layout);

        let parent = match axis {
            Some(axis) => ParentLayout::Flow {
                axis,
                gap,
                cross: geometry.cross(axis).px(),
            },
            None => ParentLayout::Absolute,
        };
        let children =
            self.layout_children(container.elements.iter().map(|el| (None, el)), parent, Some(path));

        // Intrinsic main-axis size when every child is definite
        if let Some(axis) = axis {
            if geometry.main(axis).is_auto() && !children.is_empty() {
                let sizes: Option<f64> = children.iter().map(|c| c.geometry.main(axis).px()).sum();
                if let Some(total) = sizes {
                    let gaps = gap * (children.len() - 1) as f64;
                    *geometry.main_mut(axis) = Dimension::Px(total + gaps);
                }
            }
        }

        NodeContent::Container {
            layout,
            gap,
            children,
        }
    }

    fn table(&self, table: &Table) -> NodeContent {
        let columns: Vec<TableColumn> = table
            .columns
            .iter()
            .map(|col| TableColumn {
                field: col.field.clone(),
                header: col.header.clone().unwrap_or_default(),
                align: TextAlign::parse(col.align.as_deref()),
                width: self.config.resolve_length(col.width.as_ref(), self.scale),
            })
            .collect();

        let records: &[Value] = match table.data_key().map(|key| (key, self.ctx.get(key))) {
            Some((_, Some(Value::Array(items)))) => items,
            Some((key, Some(other))) => {
                tracing::warn!(key, value = %other, "table data source is not an array");
                &[]
            }
            Some((key, None)) => {
                tracing::debug!(key, "table data source missing from context");
                &[]
            }
            None => &[],
        };

        let rows: Vec<TableRow> = records
            .iter()
            .map(|record| TableRow::from_record(&columns, record))
            .collect();

        NodeContent::Table {
            empty: rows.is_empty(),
            columns,
            rows,
            header_style: resolve_style(
                table.header_style.as_ref(),
                &self.config,
                self.scale,
                self.assets,
            ),
        }
    }

    /// Interpolate a placeholder-capable value into display text. Absent
    /// values are empty.
    fn interpolate_prop(&self, value: Option<&Value>) -> String {
        match value.map(|v| interpolate_value(v, self.ctx)) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => display_value(&other),
        }
    }
}

/// Whether a qrcode box is sized by its image: absent or numeric lengths.
fn takes_qr_size(length: Option<&Length>) -> bool {
    matches!(length, None | Some(Length::Number(_)))
}

/// A non-empty string style property, or `default`.
fn style_string(element: &Element, name: &str, default: &str) -> String {
    element
        .style
        .as_ref()
        .and_then(|s| s.string(name))
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
