//! Size extraction from free-text variant labels.
//!
//! Variant titles from the catalog look like `"42 / Black"`,
//! `"Size 42 / Black"`, `"One Size"` or the catalog's placeholder
//! `"Default Title"` for products without options.

use std::sync::LazyLock;

use regex::Regex;

/// Placeholder title the catalog gives variants of option-less products.
pub const DEFAULT_VARIANT_TITLE: &str = "Default Title";

/// EU shoe sizes shown on the document size bar.
pub const SIZE_BAR: [u8; 12] = [36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47];

/// A whole-token number between 35 and 50 inclusive.
///
/// Token edges are ASCII word boundaries: accented letters next to the
/// number do not join it into a longer word.
static SIZE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9A-Za-z_])(3[5-9]|4[0-9]|50)(?:$|[^0-9A-Za-z_])")
        .expect("Invalid regex")
});

/// Extract a normalized size key from a variant label.
///
/// Returns `None` for a missing label or the catalog placeholder. A number in
/// the shoe-size range found as a whole token wins; otherwise the label is
/// returned verbatim so non-numeric sizes (`"One Size"`, `"M"`) still group.
///
/// ```rust
/// # use wholesale_core::size::extract_size;
/// assert_eq!(extract_size(Some("Size 42 / Black")).as_deref(), Some("42"));
/// assert_eq!(extract_size(Some("One Size")).as_deref(), Some("One Size"));
/// assert_eq!(extract_size(Some("Default Title")), None);
/// ```
#[must_use]
pub fn extract_size(label: Option<&str>) -> Option<String> {
    let label = label?;
    if label == DEFAULT_VARIANT_TITLE {
        return None;
    }
    SIZE_TOKEN
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| Some(label.to_owned()), |m| Some(m.as_str().to_owned()))
}

/// Whether an option name denotes a size dimension.
#[must_use]
pub fn is_size_option(name: &str) -> bool {
    matches!(
        name.trim().to_lowercase().as_str(),
        "size" | "maat" | "größe" | "grösse" | "shoe size" | "eu size"
    )
}
