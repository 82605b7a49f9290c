//! # Mock Data Synthesis
//!
//! Builds a plausible sample [`DataContext`] for a template before any real
//! data exists, so a freshly generated layout previews with content instead
//! of `[key]` markers.
//!
//! The synthesizer scans every element (layers flattened, containers
//! recursed) for placeholders in `content` and in string-valued `props`,
//! then guesses a value per key from keywords in its name:
//!
//! | Key contains | Sample |
//! |--------------|--------|
//! | `title`, `movie` | `Avatar: The Way of Water` |
//! | `theater`, `screen` | `IMAX Hall 3` |
//! | `row` | `"7"` |
//! | `seat` | `"12"` |
//! | `date` | `"2025-12-31"` |
//! | `time` | `"19:30"` |
//! | `price`, `amount` | `85.00` |
//! | `ticket`, `id` | `"T88888888"` |
//! | `qr` | `"https://example.com"` |
//! | `name` | `"Jane Doe"` |
//! | anything else | `"[key]"` |
//!
//! Rules are checked top to bottom; the first match wins. The first
//! occurrence of a key fixes its value.
//!
//! Tables get sample rows: each `dataSource` key that no placeholder
//! claimed maps to two rows built from the table's column fields.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value, json};

use crate::data::DataContext;
use crate::interpolate::{missing_marker, placeholders};
use crate::template::{Element, ElementKind, Table, Template};

/// Rows synthesized per table data source.
pub const SAMPLE_ROWS: usize = 2;

const SAMPLE_TITLE: &str = "Avatar: The Way of Water";
const SAMPLE_VENUE: &str = "IMAX Hall 3";
const SAMPLE_ROW: &str = "7";
const SAMPLE_SEAT: &str = "12";
const SAMPLE_PRICE: f64 = 85.00;
const SAMPLE_TICKET: &str = "T88888888";
const SAMPLE_URL: &str = "https://example.com";
const SAMPLE_PERSON: &str = "Jane Doe";

/// Synthesize a data context covering every placeholder in `template`.
///
/// Deterministic: the same template always yields the same context.
pub fn synthesize(template: &Template) -> DataContext {
    let elements = template.walk();
    let mut mock = DataContext::new();

    for element in &elements {
        for text in scanned_strings(element) {
            for placeholder in placeholders(text) {
                mock.insert_if_absent(placeholder.key, || sample_value(placeholder.key));
            }
        }
    }

    for element in &elements {
        if let ElementKind::Table(table) = &element.kind {
            if let Some(key) = table.data_key() {
                mock.insert_if_absent(key, || sample_rows(table));
            }
        }
    }

    tracing::debug!(keys = mock.len(), "synthesized mock data");
    mock
}

/// The strings of one element that may hold placeholders: `content` and
/// every string-valued prop.
fn scanned_strings(element: &Element) -> impl Iterator<Item = &str> {
    element
        .content
        .as_ref()
        .and_then(Value::as_str)
        .into_iter()
        .chain(element.props.strings())
}

/// Guess a plausible value for a placeholder key.
pub fn sample_value(key: &str) -> Value {
    let k = key.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| k.contains(w));

    if has(&["title", "movie"]) {
        json!(SAMPLE_TITLE)
    } else if has(&["theater", "screen"]) {
        json!(SAMPLE_VENUE)
    } else if has(&["row"]) {
        json!(SAMPLE_ROW)
    } else if has(&["seat"]) {
        json!(SAMPLE_SEAT)
    } else if has(&["date"]) {
        json!(sample_date())
    } else if has(&["time"]) {
        json!(sample_time())
    } else if has(&["price", "amount"]) {
        json!(SAMPLE_PRICE)
    } else if has(&["ticket", "id"]) {
        json!(SAMPLE_TICKET)
    } else if has(&["qr"]) {
        json!(SAMPLE_URL)
    } else if has(&["name"]) {
        json!(SAMPLE_PERSON)
    } else {
        json!(missing_marker(key))
    }
}

fn sample_date() -> String {
    NaiveDate::from_ymd_opt(2025, 12, 31)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn sample_time() -> String {
    NaiveTime::from_hms_opt(19, 30, 0)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

fn sample_rows(table: &Table) -> Value {
    let row: Map<String, Value> = table
        .columns
        .iter()
        .filter(|col| !col.field.is_empty())
        .map(|col| (col.field.clone(), sample_value(&col.field)))
        .collect();
    Value::Array(vec![Value::Object(row); SAMPLE_ROWS])
}
