//! Alert text, formatted for Telegram's legacy `Markdown` parse mode.

use restock_core::Product;

/// Compose the restock alert for `product`.
///
/// The product name is escaped; the URL sits inside an inline link, where
/// legacy Markdown does not parse entities.
#[must_use]
pub fn restock_message(product: &Product) -> String {
    format!(
        "🎉 *IN STOCK!* 🎉\n\n{} is now available!\n\n[Buy it here]({})",
        escape_markdown(&product.name),
        product.url
    )
}

/// Backslash-escape the characters legacy Markdown treats as entity markers.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
