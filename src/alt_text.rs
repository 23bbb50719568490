//! Alt text generation from product names
//!
//! The alt text is the product name with runs of whitespace collapsed to a
//! single space, trimmed, and lowercased. Names that normalize to nothing fall
//! back to a configured generic label.

/// Normalizes a product name for use as image alt text
///
/// # Example
///
/// ```
/// use catalog_alt::alt_text::normalize_product_name;
///
/// assert_eq!(normalize_product_name("  Paracetamol   500MG "), "paracetamol 500mg");
/// ```
pub fn normalize_product_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Builds the target alt text for every image of a product
///
/// Returns `fallback` when the normalized name is empty.
pub fn generate_alt_text(product_name: &str, fallback: &str) -> String {
    let normalized = normalize_product_name(product_name);
    if normalized.is_empty() {
        fallback.to_string()
    } else {
        normalized
    }
}
