use super::*;

fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>Shop</title></head><body>{body}</body></html>")
}

#[test]
fn enabled_purchase_control_is_available() {
    let rule = PurchaseButtonRule::new("a.add-to-cart").unwrap();
    let html = page(r##"<a class="btn add-to-cart" href="#">Add to Cart</a>"##);
    assert_eq!(rule.inspect(&html), Signal::Available);
}

#[test]
fn disabled_attribute_is_unavailable() {
    let rule = PurchaseButtonRule::new("button.add-to-cart").unwrap();
    let html = page(r#"<button class="add-to-cart" disabled>Sold Out</button>"#);
    assert_eq!(rule.inspect(&html), Signal::Unavailable);
}

#[test]
fn aria_disabled_is_unavailable() {
    let rule = PurchaseButtonRule::new("a.add-to-cart").unwrap();
    let html = page(r#"<a class="add-to-cart" aria-disabled="TRUE">Add to Cart</a>"#);
    assert_eq!(rule.inspect(&html), Signal::Unavailable);
}

#[test]
fn disabled_or_inactive_class_is_unavailable() {
    let rule = PurchaseButtonRule::new(".add-to-cart").unwrap();
    for class in ["add-to-cart disabled", "add-to-cart inactive"] {
        let html = page(&format!(r#"<a class="{class}">Add to Cart</a>"#));
        assert_eq!(rule.inspect(&html), Signal::Unavailable, "class: {class}");
    }
}

#[test]
fn class_containing_disabled_as_substring_is_not_disabled() {
    let rule = PurchaseButtonRule::new(".add-to-cart").unwrap();
    let html = page(r#"<a class="add-to-cart not-disabled-style">Add to Cart</a>"#);
    assert_eq!(rule.inspect(&html), Signal::Available);
}

#[test]
fn any_enabled_match_wins_over_disabled_ones() {
    let rule = PurchaseButtonRule::new(".add-to-cart").unwrap();
    let html = page(
        r#"<a class="add-to-cart disabled">Sticky</a><a class="add-to-cart">Add to Cart</a>"#,
    );
    assert_eq!(rule.inspect(&html), Signal::Available);
}

#[test]
fn missing_purchase_control_is_absent_and_not_available() {
    let rule = PurchaseButtonRule::new("a.add-to-cart").unwrap();
    let html = page("<h1>Something went wrong</h1>");
    assert_eq!(rule.inspect(&html), Signal::Absent);
}

#[test]
fn empty_document_is_absent() {
    let rule = PurchaseButtonRule::new("a.add-to-cart").unwrap();
    assert_eq!(rule.inspect(""), Signal::Absent);
}

#[test]
fn invalid_selector_is_rejected() {
    let err = PurchaseButtonRule::new("a[").unwrap_err();
    assert!(
        matches!(err, ScraperError::InvalidSelector { ref selector, .. } if selector == "a["),
        "got: {err:?}"
    );
}

#[test]
fn text_marker_found_in_visible_text() {
    let rule = TextMarkerRule::new("Product Information");
    let html = page("<section><h2>Product\n   Information</h2></section>");
    assert_eq!(rule.inspect(&html), Signal::Available);
}

#[test]
fn text_marker_ignores_script_and_style_contents() {
    let rule = TextMarkerRule::new("Product Information");
    let html = page(
        r#"<script>window.labels = {"h": "Product Information"};</script>
           <style>/* Product Information */</style>
           <p>Currently sold out</p>"#,
    );
    assert_eq!(rule.inspect(&html), Signal::Unavailable);
}

#[test]
fn text_marker_ignores_head_title() {
    let rule = TextMarkerRule::new("Shop");
    assert_eq!(rule.inspect(&page("<p>nothing</p>")), Signal::Unavailable);
}

#[test]
fn blank_text_marker_is_absent() {
    let rule = TextMarkerRule::new("   ");
    assert_eq!(rule.inspect(&page("<p>anything</p>")), Signal::Absent);
}

#[test]
fn describe_names_the_rule() {
    assert_eq!(
        PurchaseButtonRule::new("a.add-to-cart").unwrap().describe(),
        "purchase control \"a.add-to-cart\""
    );
    assert_eq!(
        TextMarkerRule::new("In Stock").describe(),
        "text marker \"In Stock\""
    );
}
