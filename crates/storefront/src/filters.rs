//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Decorative emoji for a product category.
///
/// Usage in templates: `{{ product.category|category_icon }}`
#[askama::filter_fn]
pub fn category_icon(category: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(icon_for(&category.to_string()))
}

fn icon_for(category: &str) -> &'static str {
    let category = category.to_lowercase();
    if category.contains("toy") {
        "🧸"
    } else if category.contains("headband") {
        "🎀"
    } else if category.contains("accessor") || category.contains("scarf") {
        "🧣"
    } else {
        "🧶"
    }
}
