//! # DeepPrint - Template Layout Engine
//!
//! DeepPrint turns declarative JSON print templates (receipts, tickets,
//! labels) plus a JSON data context into a fully resolved render tree:
//! every element's pixel position, size, style and content, ready for a
//! renderer. It provides:
//!
//! - **Unit conversion**: millimeters and points to pixels or printer dots
//! - **Interpolation**: `{{key}}` and `{{key|formatter}}` placeholders
//! - **Mock data**: plausible sample values for every placeholder in a template
//! - **Layout**: absolute and flow containers, tables, QR codes, assets
//!
//! ## Quick Start
//!
//! ```
//! use deepprint::{DataContext, Template, layout, synthesize};
//!
//! let template = Template::from_json(r#"{
//!     "canvas": {"width": 58, "height": 100, "unit": "mm"},
//!     "elements": [
//!         {"type": "text", "x": 2, "y": 2, "content": "{{store_name}}"},
//!         {"type": "table", "y": 10, "dataSource": "{{items}}",
//!          "columns": [{"field": "name", "header": "Item"}, {"field": "price", "header": "Price"}]}
//!     ]
//! }"#)?;
//!
//! // Real data
//! let ctx = DataContext::from_json(r#"{"store_name": "Cafe", "items": [{"name": "Tea", "price": 3}]}"#)?;
//! let tree = layout(&template, &ctx, 1.0);
//! assert_eq!(tree.nodes[0].text(), Some("Cafe"));
//!
//! // Preview before any data exists
//! let preview = layout(&template, &synthesize(&template), 1.0);
//! assert!(!preview.empty);
//! # Ok::<(), deepprint::DeepPrintError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Template and element model (JSON wire format) |
//! | [`data`] | Data context |
//! | [`units`] | Physical units to pixels |
//! | [`interpolate`] | Placeholder resolution and formatters |
//! | [`mock`] | Sample data synthesis |
//! | [`assets`] | `ref:` asset resolution |
//! | [`layout`] | Layout engine and render tree |
//! | [`server`] | HTTP JSON API |
//! | [`error`] | Error types |

pub mod assets;
pub mod data;
pub mod error;
pub mod interpolate;
pub mod layout;
pub mod mock;
pub mod server;
pub mod template;
pub mod units;

pub use data::DataContext;
pub use error::DeepPrintError;
pub use layout::{LayoutEngine, RenderNode, RenderTree, layout};
pub use mock::synthesize;
pub use template::Template;
pub use units::UnitConfig;
