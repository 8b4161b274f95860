//! Selector matching and specificity.

use halftone_css::selector::{PseudoElement, parse_selector, parse_selector_list, specificity};
use halftone_dom::DomTree;

/// Build a DOM from markup and return the tree plus the first element
/// with the given tag name.
fn tree_with(html: &str, tag: &str) -> (DomTree, halftone_dom::NodeId) {
    let tree = halftone_html::parse(html);
    let id = tree
        .descendants(tree.root())
        .find(|&id| tree.as_element(id).is_some_and(|e| e.name == tag))
        .unwrap_or_else(|| panic!("no <{tag}> in {html}"));
    (tree, id)
}

fn matches(selector: &str, html: &str, tag: &str) -> bool {
    let (tree, id) = tree_with(html, tag);
    parse_selector(selector)
        .unwrap_or_else(|| panic!("selector '{selector}' failed to parse"))
        .matches(&tree, id)
}

#[test]
fn type_class_id_and_universal() {
    let html = r#"<div id="main" class="wide box">x</div>"#;
    assert!(matches("div", html, "div"));
    assert!(matches("*", html, "div"));
    assert!(matches(".wide", html, "div"));
    assert!(matches(".box", html, "div"));
    assert!(matches("#main", html, "div"));
    assert!(matches("div.wide#main", html, "div"));
    assert!(!matches("span", html, "div"));
    assert!(!matches(".narrow", html, "div"));
    assert!(!matches("#other", html, "div"));
}

#[test]
fn tag_names_match_case_insensitively() {
    assert!(matches("DIV", "<div>x</div>", "div"));
}

#[test]
fn attribute_operators() {
    let html = r#"<a href="https://example.com/page.html" rel="nofollow external" lang="en-US">x</a>"#;
    assert!(matches("[href]", html, "a"));
    assert!(matches(r#"[rel~="external"]"#, html, "a"));
    assert!(matches(r#"[lang|="en"]"#, html, "a"));
    assert!(matches(r#"[href^="https"]"#, html, "a"));
    assert!(matches(r#"[href$=".html"]"#, html, "a"));
    assert!(matches(r#"[href*="example"]"#, html, "a"));
    assert!(matches(r#"[lang="en-US"]"#, html, "a"));

    assert!(!matches("[title]", html, "a"));
    assert!(!matches(r#"[rel~="exter"]"#, html, "a"));
    assert!(!matches(r#"[lang|="e"]"#, html, "a"));
    assert!(!matches(r#"[href$=".css"]"#, html, "a"));
}

#[test]
fn combinators_walk_the_tree() {
    let html = r#"<div class="outer"><ul><li>a</li><li id="second">b</li></ul></div><p>after</p>"#;

    // Descendant: any ancestor matches.
    assert!(matches("div li", html, "li"));
    assert!(matches(".outer ul li", html, "li"));
    assert!(!matches("p li", html, "li"));

    // Child: the parent specifically.
    assert!(matches("ul > li", html, "li"));
    assert!(!matches("div > li", html, "li"));

    // Adjacent sibling.
    let tree = halftone_html::parse(html);
    let mut items = tree
        .descendants(tree.root())
        .filter(|&id| tree.as_element(id).is_some_and(|e| e.name == "li"));
    let first = items.next().expect("first li");
    let second = items.next().expect("second li");
    assert!(parse_selector("li + li").unwrap().matches(&tree, second));
    assert!(!parse_selector("li + li").unwrap().matches(&tree, first));

    // General sibling: the <p> follows the <div>.
    assert!(matches("div ~ p", html, "p"));
    assert!(!matches("ul ~ p", html, "p"));
}

#[test]
fn interactive_pseudo_classes_parse_but_never_match() {
    let html = r#"<a href="index.html">x</a>"#;
    // The selector parses (the rule survives) but matches nothing.
    assert!(!matches("a:hover", html, "a"));
    assert!(!matches("a:visited", html, "a"));
    assert!(!matches(":focus", html, "a"));
    // Unknown pseudo-classes behave identically.
    assert!(!matches("a:first-child", html, "a"));
    assert!(!matches("a:nth-child(2)", html, "a"));
}

#[test]
fn pseudo_elements_become_side_labels() {
    let sel = parse_selector("p::before").expect("parses");
    assert_eq!(sel.pseudo_element, Some(PseudoElement::Before));
    let sel = parse_selector("p:after").expect("single-colon spelling parses");
    assert_eq!(sel.pseudo_element, Some(PseudoElement::After));
    let sel = parse_selector("p::first-letter").expect("parses");
    assert_eq!(sel.pseudo_element, Some(PseudoElement::FirstLetter));

    // The element part still matches the element itself.
    let (tree, p) = tree_with("<p>x</p>", "p");
    assert!(parse_selector("p::before").unwrap().matches(&tree, p));
}

#[test]
fn specificity_arithmetic() {
    assert_eq!(specificity("*"), Some(0));
    assert_eq!(specificity("div"), Some(1));
    assert_eq!(specificity(".c"), Some(10));
    assert_eq!(specificity("[href]"), Some(10));
    assert_eq!(specificity(":hover"), Some(10));
    assert_eq!(specificity("#i"), Some(100));
    assert_eq!(specificity("div.c#i"), Some(111));
    assert_eq!(specificity("div > p + a"), Some(3));
    assert_eq!(specificity("ul li .item a:hover"), Some(23));
}

#[test]
fn selector_lists_keep_the_parseable_parts() {
    let selectors = parse_selector_list("div, $$garbage, .ok");
    assert_eq!(selectors.len(), 2);
}

#[test]
fn malformed_selectors_are_rejected() {
    assert!(parse_selector("").is_none());
    assert!(parse_selector("> div").is_none());
    assert!(parse_selector("div >").is_none());
    assert!(parse_selector("[unclosed").is_none());
    assert!(parse_selector("div > > p").is_none());
}
