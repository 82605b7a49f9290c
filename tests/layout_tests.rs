//! # Layout Tests
//!
//! End-to-end scenarios: template fixtures in `tests/fixtures/` laid out
//! against real and synthesized data.

use deepprint::layout::{Axis, NodeContent, Placement, RenderNode, TableRow, TextAlign};
use deepprint::units::{Dimension, MM_TO_PX, Unit, UnitConfig, to_pixels};
use deepprint::{DataContext, LayoutEngine, RenderTree, Template, layout, synthesize};
use pretty_assertions::assert_eq;
use serde_json::json;

const CAFE_RECEIPT: &str = include_str!("fixtures/cafe_receipt.json");
const MOVIE_TICKET: &str = include_str!("fixtures/movie_ticket.json");

const EPSILON: f64 = 1e-9;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn find<'a>(tree: &'a RenderTree, key: &str) -> &'a RenderNode {
    tree.find(key)
        .unwrap_or_else(|| panic!("no node with key {:?}", key))
}

fn px(dim: &Dimension) -> f64 {
    dim.px()
        .unwrap_or_else(|| panic!("dimension is not definite: {:?}", dim))
}

fn flow_offset(node: &RenderNode) -> f64 {
    match node.geometry.placement {
        Placement::Flow {
            offset: Some(offset),
            ..
        } => offset,
        other => panic!("{}: expected resolved flow placement, got {:?}", node.key, other),
    }
}

fn table_rows(node: &RenderNode) -> (&Vec<TableRow>, bool) {
    match &node.content {
        NodeContent::Table { rows, empty, .. } => (rows, *empty),
        other => panic!("{}: expected table, got {:?}", node.key, other),
    }
}

fn mm(value: f64) -> f64 {
    to_pixels(value, Unit::Mm, 1.0)
}

// ============================================================================
// CAFE RECEIPT
// ============================================================================

#[test]
fn test_cafe_receipt_with_data() {
    let template = Template::from_json(CAFE_RECEIPT).unwrap();
    let ctx = DataContext::from_value(json!({
        "store_name": "Cafe",
        "items": [{"name": "Tea", "price": 3}],
        "total": 3
    }))
    .unwrap();

    let tree = layout(&template, &ctx, 1.0);

    assert!(!tree.empty);
    assert!((tree.width - 58.0 * MM_TO_PX).abs() < EPSILON);
    assert!((tree.height - 100.0 * MM_TO_PX).abs() < EPSILON);

    let store = find(&tree, "store");
    assert_eq!(store.text(), Some("Cafe"));
    assert_eq!(store.style.str("fontFamily"), Some("Noto Sans SC"));
    let NodeContent::Text { align, .. } = &store.content else {
        panic!("expected text");
    };
    assert_eq!(*align, TextAlign::Center);

    let (rows, empty) = table_rows(find(&tree, "items"));
    assert!(!empty);
    assert_eq!(
        serde_json::to_value(rows).unwrap(),
        json!([{"name": "Tea", "price": 3}])
    );

    assert_eq!(find(&tree, "total").text(), Some("Total: ¥3.00"));
}

#[test]
fn test_cafe_receipt_missing_items() {
    let template = Template::from_json(CAFE_RECEIPT).unwrap();
    let ctx = DataContext::from_value(json!({"store_name": "Cafe"})).unwrap();

    let tree = layout(&template, &ctx, 1.0);

    let (rows, empty) = table_rows(find(&tree, "items"));
    assert!(rows.is_empty());
    assert!(empty);
    assert_eq!(find(&tree, "total").text(), Some("Total: [total]"));
}

#[test]
fn test_cafe_receipt_preview_with_mock_data() {
    let template = Template::from_json(CAFE_RECEIPT).unwrap();
    let mock = synthesize(&template);

    let tree = layout(&template, &mock, 1.0);

    assert_eq!(find(&tree, "store").text(), Some("Jane Doe"));
    // Unclassified keys get their marker as the sample, which is not a number
    assert_eq!(find(&tree, "total").text(), Some("Total: ¥NaN"));
    let (rows, empty) = table_rows(find(&tree, "items"));
    assert!(!empty);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("name"), Some(&json!("Jane Doe")));
    assert_eq!(rows[0].get("price"), Some(&json!(85.0)));
}

// ============================================================================
// MOVIE TICKET
// ============================================================================

#[test]
fn test_movie_ticket_mock_data() {
    let template = Template::from_json(MOVIE_TICKET).unwrap();
    let mock = synthesize(&template);

    let keys: Vec<_> = mock.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            "movie_title",
            "price",
            "qr_url",
            "row",
            "seat",
            "show_date",
            "show_time",
            "theater",
            "ticket_id"
        ]
    );
    assert_eq!(mock.get("qr_url"), Some(&json!("https://example.com")));
}

#[test]
fn test_movie_ticket_layout() {
    let template = Template::from_json(MOVIE_TICKET).unwrap();
    let tree = layout(&template, &synthesize(&template), 1.0);

    assert_eq!(find(&tree, "title").text(), Some("Avatar: The Way of Water"));
    assert_eq!(
        find(&tree, "venue").text(),
        Some("IMAX Hall 3 · 2025-12-31 19:30")
    );
    assert_eq!(find(&tree, "row").text(), Some("Row 7"));
    assert_eq!(find(&tree, "seat").text(), Some("Seat 12"));
    assert_eq!(find(&tree, "price").text(), Some("¥85.00"));
    assert_eq!(find(&tree, "ticket").text(), Some("No. T88888888"));

    let NodeContent::Qrcode {
        value,
        pixel_width,
        modules,
        ..
    } = &find(&tree, "qr").content
    else {
        panic!("expected qrcode");
    };
    assert_eq!(value, "https://example.com");
    assert_eq!(*pixel_width, 113);
    assert!(modules.is_some());
}

#[test]
fn test_movie_ticket_layers_and_paint_order() {
    let template = Template::from_json(MOVIE_TICKET).unwrap();
    let tree = layout(&template, &DataContext::new(), 1.0);

    let top: Vec<_> = tree
        .nodes
        .iter()
        .map(|n| (n.key.as_str(), n.layer.as_deref()))
        .collect();
    assert_eq!(
        top,
        vec![("frame", Some("background")), ("body", Some("content"))]
    );

    let painted: Vec<_> = tree.paint_order().iter().map(|n| n.key.as_str()).collect();
    assert_eq!(painted, vec!["frame", "body"]);
    assert_eq!(find(&tree, "ticket").z_index, 2);
}

#[test]
fn test_vertical_flow_does_not_overlap() {
    let template = Template::from_json(MOVIE_TICKET).unwrap();
    let tree = layout(&template, &DataContext::new(), 1.0);

    let body = find(&tree, "body");
    let children = body.children();
    let gap = mm(2.0);

    assert_eq!(children.len(), 6);
    assert_eq!(flow_offset(&children[0]), 0.0);
    for pair in children.windows(2) {
        let expected = flow_offset(&pair[0]) + px(&pair[0].geometry.height) + gap;
        assert!(
            (flow_offset(&pair[1]) - expected).abs() < EPSILON,
            "{} overlaps {}",
            pair[1].key,
            pair[0].key
        );
    }

    // Intrinsic height from the stacked children
    let stacked: f64 = children.iter().map(|c| px(&c.geometry.height)).sum();
    assert!((px(&body.geometry.height) - (stacked + 5.0 * gap)).abs() < EPSILON);
}

#[test]
fn test_flow_cross_axis_stretch() {
    let template = Template::from_json(MOVIE_TICKET).unwrap();
    let tree = layout(&template, &DataContext::new(), 1.0);

    // Auto-width line stretches across the vertical container
    let divider = find(&tree, "divider");
    assert_eq!(divider.geometry.width, Dimension::Px(mm(72.0)));
    assert_eq!(divider.geometry.height, Dimension::Px(1.0));

    // Auto-height cells stretch to the horizontal row
    let row = find(&tree, "seat_row");
    for cell in row.children() {
        assert_eq!(cell.geometry.height, Dimension::Px(mm(6.0)));
        let Placement::Flow { axis, .. } = cell.geometry.placement else {
            panic!("expected flow placement");
        };
        assert_eq!(axis, Axis::Horizontal);
    }
    let offsets: Vec<f64> = row.children().iter().map(flow_offset).collect();
    assert!((offsets[1] - mm(24.0)).abs() < EPSILON);
    assert!((offsets[2] - (mm(24.0) + mm(24.0))).abs() < 1e-6);
}

// ============================================================================
// ENGINE PROPERTIES
// ============================================================================

#[test]
fn test_layout_is_deterministic() {
    let template = Template::from_json(MOVIE_TICKET).unwrap();
    let mock = synthesize(&template);
    let first = serde_json::to_string(&layout(&template, &mock, 1.25)).unwrap();
    let second = serde_json::to_string(&layout(&template, &mock, 1.25)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_scale_multiplies_geometry() {
    let template = Template::from_json(CAFE_RECEIPT).unwrap();
    let ctx = DataContext::new();
    let one = layout(&template, &ctx, 1.0);
    let two = layout(&template, &ctx, 2.0);

    assert!((two.width - 2.0 * one.width).abs() < EPSILON);
    let (Placement::Absolute { y: y1, .. }, Placement::Absolute { y: y2, .. }) = (
        find(&one, "total").geometry.placement,
        find(&two, "total").geometry.placement,
    ) else {
        panic!("expected absolute placement");
    };
    assert!((y2 - 2.0 * y1).abs() < EPSILON);
}

#[test]
fn test_printer_dots_preset() {
    let template = Template::from_json(CAFE_RECEIPT).unwrap();
    let engine = LayoutEngine::new(UnitConfig::from_dpi(203.0));
    let tree = engine.layout(&template, &DataContext::new(), 1.0);

    // 58mm paper at 203 DPI
    assert!((tree.width - 463.54).abs() < 0.01);
}

#[test]
fn test_render_tree_json_shape() {
    let template = Template::from_json(CAFE_RECEIPT).unwrap();
    let ctx = DataContext::from_value(json!({"store_name": "Cafe", "items": []})).unwrap();
    let json = serde_json::to_value(layout(&template, &ctx, 1.0)).unwrap();

    let store = &json["nodes"][0];
    assert_eq!(store["type"], "text");
    assert_eq!(store["key"], "store");
    assert_eq!(store["text"], "Cafe");
    assert_eq!(store["geometry"]["placement"]["mode"], "absolute");
    assert_eq!(store["geometry"]["width"], json!({"kind": "auto"}));

    let items = &json["nodes"][2];
    assert_eq!(items["type"], "table");
    assert_eq!(items["empty"], true);
    assert_eq!(items["columns"][1]["align"], "right");
    assert!(items["headerStyle"].is_object());
    assert_eq!(store["zIndex"], 1);
}
