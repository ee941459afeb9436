//! JavaScript snippets evaluated in the page for scoped element access.
//!
//! Selectors and text are embedded as JSON string literals so quoting in
//! user-supplied selectors cannot break out of the script.

use super::Scope;

fn js_string(value: &str) -> String {
    // Serializing a &str to JSON cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Expression evaluating to the `Document` for `scope`, or `null` when the
/// frame is missing or cross-origin.
fn root_expr(scope: &Scope) -> String {
    match scope {
        Scope::Document => "document".to_string(),
        Scope::Frame(selector) => format!(
            "(() => {{ const f = document.querySelector({sel}); \
             try {{ return f ? f.contentDocument : null; }} catch (_) {{ return null; }} }})()",
            sel = js_string(selector)
        ),
    }
}

/// `true` when some match is rendered. A prompt hidden with `display: none`
/// is still in the DOM but has no client rects.
pub(super) fn exists(scope: &Scope, selector: &str) -> String {
    format!(
        "(() => {{ const root = {root}; if (!root) return false; \
         return Array.from(root.querySelectorAll({sel})).some((el) => \
           el.getClientRects().length > 0); }})()",
        root = root_expr(scope),
        sel = js_string(selector)
    )
}

/// Clears and focuses the input. Returns `false` if it is not present.
pub(super) fn focus_and_clear(scope: &Scope, selector: &str) -> String {
    format!(
        "(() => {{ const root = {root}; const el = root && root.querySelector({sel}); \
         if (!el) return false; \
         el.scrollIntoView({{ block: 'center' }}); \
         el.focus(); \
         if ('value' in el) {{ el.value = ''; }} \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         return true; }})()",
        root = root_expr(scope),
        sel = js_string(selector)
    )
}

/// Fires the key events some sites listen on before showing suggestions.
pub(super) fn after_typing(scope: &Scope, selector: &str) -> String {
    format!(
        "(() => {{ const root = {root}; const el = root && root.querySelector({sel}); \
         if (!el) return false; \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         el.dispatchEvent(new KeyboardEvent('keyup', {{ bubbles: true }})); \
         return true; }})()",
        root = root_expr(scope),
        sel = js_string(selector)
    )
}

pub(super) fn click(scope: &Scope, selector: &str) -> String {
    format!(
        "(() => {{ const root = {root}; const el = root && root.querySelector({sel}); \
         if (!el) return false; \
         el.scrollIntoView({{ block: 'center' }}); \
         el.click(); \
         return true; }})()",
        root = root_expr(scope),
        sel = js_string(selector)
    )
}

/// Clicks the first visible match whose trimmed text equals `text`.
pub(super) fn click_exact_text(scope: &Scope, selector: &str, text: &str) -> String {
    format!(
        "(() => {{ const root = {root}; if (!root) return false; \
         const want = {text}; \
         const el = Array.from(root.querySelectorAll({sel})).find((node) => \
           (node.textContent || '').trim() === want && \
           !node.hasAttribute('disabled') && \
           node.getClientRects().length > 0); \
         if (!el) return false; \
         el.scrollIntoView({{ block: 'center' }}); \
         el.click(); \
         return true; }})()",
        root = root_expr(scope),
        sel = js_string(selector),
        text = js_string(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_scope_uses_document_root() {
        let js = exists(&Scope::Document, "input#search");
        assert!(js.contains("const root = document;"), "{js}");
        assert!(js.contains("querySelectorAll(\"input#search\")"), "{js}");
    }

    #[test]
    fn exists_only_counts_rendered_elements() {
        let js = exists(&Scope::Document, "input#search");
        assert!(js.contains(".some((el) =>"), "{js}");
        assert!(js.contains("getClientRects().length > 0"), "{js}");
        assert!(!js.contains("!!(root && root.querySelector"), "{js}");
    }

    #[test]
    fn frame_scope_reads_frame_content_document() {
        let js = exists(&Scope::Frame("iframe#pin".to_string()), "input");
        assert!(js.contains("document.querySelector(\"iframe#pin\")"), "{js}");
        assert!(js.contains("contentDocument"), "{js}");
    }

    #[test]
    fn selectors_with_quotes_are_escaped() {
        let js = click(&Scope::Document, r#"a[title="Apply"]"#);
        assert!(js.contains(r#"querySelector("a[title=\"Apply\"]")"#), "{js}");
    }

    #[test]
    fn exact_text_match_compares_trimmed_text_for_equality() {
        let js = click_exact_text(&Scope::Document, ".suggestion", "110001");
        assert!(js.contains("const want = \"110001\";"), "{js}");
        assert!(js.contains(".trim() === want"), "{js}");
    }
}
