//! # Placeholder Interpolation
//!
//! Resolves `{{key}}` and `{{key|formatter}}` placeholders in template text
//! against a [`DataContext`].
//!
//! | Formatter | Output for `5` |
//! |-----------|----------------|
//! | `currency` | `¥5.00` |
//! | `percent` | `5%` |
//! | `date` | `5` (passthrough) |
//!
//! A key missing from the context renders as `[key]`, so unresolved fields
//! stay visible on the printout. Interpolation never fails.
//!
//! ```
//! use deepprint::data::DataContext;
//! use deepprint::interpolate::interpolate;
//! use serde_json::json;
//!
//! let ctx = DataContext::from_value(json!({"total": 12.5})).unwrap();
//! assert_eq!(interpolate("Total: {{ total | currency }}", &ctx), "Total: ¥12.50");
//! assert_eq!(interpolate("Hi {{name}}", &ctx), "Hi [name]");
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::data::DataContext;

/// `{{` + at least one character (shortest match, no newline) + `}}`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.+?)\}\}").expect("placeholder pattern is valid"));

/// A parsed `{{ key | formatter }}` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub key: &'a str,
    pub formatter: Option<&'a str>,
}

impl<'a> Placeholder<'a> {
    /// Parse the text between `{{` and `}}`.
    ///
    /// Key and formatter are trimmed; an empty formatter counts as none.
    pub fn parse(inner: &'a str) -> Self {
        let mut parts = inner.split('|');
        let key = parts.next().unwrap_or_default().trim();
        let formatter = parts.next().map(str::trim).filter(|f| !f.is_empty());
        Self { key, formatter }
    }

    /// The visible marker for an unresolved key: `[key]`.
    pub fn missing_marker(&self) -> String {
        missing_marker(self.key)
    }
}

/// The visible marker for an unresolved key: `[key]`.
pub fn missing_marker(key: &str) -> String {
    format!("[{}]", key)
}

/// Every placeholder in `text`, in order of appearance.
pub fn placeholders(text: &str) -> impl Iterator<Item = Placeholder<'_>> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|inner| Placeholder::parse(inner.as_str()))
}

/// Whether `text` contains any placeholder.
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Value formatters selectable with `{{key|formatter}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// `¥` + two decimals.
    Currency,
    /// Passthrough.
    Date,
    /// Value + `%`.
    Percent,
}

impl Formatter {
    /// Look up a formatter by name. Names match by prefix, so
    /// `currency:CNY` selects [`Formatter::Currency`].
    pub fn parse(name: &str) -> Option<Self> {
        if name.starts_with("currency") {
            Some(Formatter::Currency)
        } else if name.starts_with("date") {
            Some(Formatter::Date)
        } else if name.starts_with("percent") {
            Some(Formatter::Percent)
        } else {
            None
        }
    }

    pub fn apply(&self, value: &Value) -> String {
        match self {
            Formatter::Currency => format!("¥{}", to_fixed(to_number(value), 2)),
            Formatter::Date => display_value(value),
            Formatter::Percent => format!("{}%", display_value(value)),
        }
    }
}

/// Resolve every placeholder in `text` against `ctx`.
pub fn interpolate(text: &str, ctx: &DataContext) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            let placeholder = Placeholder::parse(&caps[1]);
            resolve_placeholder(&placeholder, ctx)
        })
        .into_owned()
}

/// Interpolate a JSON value: strings are resolved, any other value is
/// returned unchanged.
pub fn interpolate_value(value: &Value, ctx: &DataContext) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate(s, ctx)),
        other => other.clone(),
    }
}

fn resolve_placeholder(placeholder: &Placeholder, ctx: &DataContext) -> String {
    let Some(value) = ctx.get(placeholder.key) else {
        return placeholder.missing_marker();
    };
    match placeholder.formatter.and_then(Formatter::parse) {
        Some(formatter) => formatter.apply(value),
        None => display_value(value),
    }
}

/// Render a JSON value as display text.
///
/// Strings verbatim, integral numbers without a fraction, arrays
/// comma-joined (null items empty), objects as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format_number(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Shortest round-trip form; `-0` prints as `0`. Magnitudes from `1e21`
/// up and below `1e-6` use exponent form (`1e+21`, `1.5e-7`).
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let word = if n > 0.0 { "Infinity" } else { "-Infinity" };
        word.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exp = format!("{:e}", n);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
            _ => exp,
        }
    } else {
        n.to_string()
    }
}

/// Extra decimals printed to tell an exact tie from a near one.
const TIE_DIGITS: usize = 30;

/// Fixed-point with `digits` decimals. An exact tie rounds away from zero,
/// judged on the exact binary value: `0.125` gives `0.13`, `2.675` (stored
/// as 2.67499...) gives `2.67`. Non-finite values and magnitudes from
/// `1e21` up print as [`format_number`] does.
fn to_fixed(n: f64, digits: usize) -> String {
    if !n.is_finite() || n.abs() >= 1e21 {
        return format_number(n);
    }

    let wide = format!("{:.*}", digits + TIE_DIGITS, n.abs());
    let (kept, dropped) = wide.split_at(wide.len() - TIE_DIGITS);
    let is_tie = dropped.starts_with('5') && dropped[1..].bytes().all(|b| b == b'0');

    let magnitude = if is_tie {
        round_up(kept.trim_end_matches('.'))
    } else {
        format!("{:.*}", digits, n.abs())
    };
    // `-0` is not negative; small negatives keep their sign ("-0.00")
    if n < 0.0 {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Add one unit in the last place of a decimal string, carrying left.
fn round_up(decimal: &str) -> String {
    let mut digits: Vec<char> = decimal.chars().collect();
    let mut i = digits.len();
    loop {
        if i == 0 {
            digits.insert(0, '1');
            break;
        }
        i -= 1;
        match digits[i] {
            '.' => continue,
            '9' => digits[i] = '0',
            d => {
                digits[i] = char::from_digit(d.to_digit(10).unwrap_or(0) + 1, 10).unwrap_or(d);
                break;
            }
        }
    }
    digits.into_iter().collect()
}

/// Numeric coercion used by the `currency` formatter.
///
/// Strings are parsed after trimming (empty is 0), booleans are 1/0, null
/// is 0; anything unparsable is NaN.
fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}
