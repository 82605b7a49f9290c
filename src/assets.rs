//! Asset resolution: maps `ref:<key>` references to resource locators.
//!
//! Templates refer to fonts and images indirectly so the same layout can be
//! re-pointed at different resources. Resolution never fails: a missing
//! asset resolves to an empty string and the renderer shows a fallback.

use std::collections::HashMap;

/// Asset key → resource locator (URL, data URI, font family name).
pub type Assets = HashMap<String, String>;

/// Prefix marking an indirect asset reference.
pub const ASSET_REF_PREFIX: &str = "ref:";

/// Whether `reference` is an indirect `ref:` reference.
pub fn is_asset_ref(reference: &str) -> bool {
    reference.starts_with(ASSET_REF_PREFIX)
}

/// Resolve a reference against the asset map.
///
/// - empty → `""`
/// - `ref:<key>` → `assets[key]`, or `""` when missing
/// - anything else → returned unchanged (a literal locator)
pub fn resolve_asset(reference: &str, assets: &Assets) -> String {
    if reference.is_empty() {
        return String::new();
    }
    match reference.strip_prefix(ASSET_REF_PREFIX) {
        Some(key) => match assets.get(key) {
            Some(locator) => locator.clone(),
            None => {
                tracing::warn!(key, "asset reference not found");
                String::new()
            }
        },
        None => reference.to_string(),
    }
}
