//! Cascade resolution: origins, specificity, importance, inheritance.

use std::rc::Rc;

use halftone_css::selector::PseudoElement;
use halftone_css::style::{Color, ComputedStyle, Display};
use halftone_css::{StyleRegistry, compute_styles, parse_stylesheet};
use halftone_dom::{DomTree, NodeId};

const VIEWPORT: (f64, f64) = (800.0, 600.0);

fn styled(html: &str) -> (DomTree, StyleRegistry) {
    let tree = halftone_html::parse(html);
    let css = halftone_css::collect_document_css(&tree, &|_| None);
    let sheets: Vec<_> = css.iter().map(|s| parse_stylesheet(s)).collect();
    let styles = compute_styles(&tree, &sheets, VIEWPORT.0, VIEWPORT.1);
    (tree, styles)
}

fn element(tree: &DomTree, tag: &str) -> NodeId {
    tree.descendants(tree.root())
        .find(|&id| tree.as_element(id).is_some_and(|e| e.name == tag))
        .unwrap_or_else(|| panic!("no <{tag}>"))
}

fn style_of<'a>(
    tree: &DomTree,
    styles: &'a StyleRegistry,
    tag: &str,
) -> &'a Rc<ComputedStyle> {
    styles.style(element(tree, tag)).expect("style computed")
}

#[test]
fn ua_defaults_apply() {
    let (tree, styles) = styled("<p>x</p><span>s</span><a href='#'>link</a>");
    assert_eq!(style_of(&tree, &styles, "p").display(), Display::Block);
    assert_eq!(style_of(&tree, &styles, "head").display(), Display::None);
    assert_eq!(style_of(&tree, &styles, "span").display(), Display::Inline);
    // spec UA color for links.
    assert_eq!(
        style_of(&tree, &styles, "a").color(),
        Color::rgb(0x06, 0x45, 0xad)
    );
    assert!(style_of(&tree, &styles, "a").text_decoration().underline);
    // Test-suite profile: body margin zero.
    let body = style_of(&tree, &styles, "body");
    assert_eq!(
        body.margin(halftone_css::style::Side::Top),
        halftone_css::style::StyleValue::Length(0.0)
    );
}

#[test]
fn specificity_orders_the_cascade() {
    // spec scenario: element < class < id < inline style.
    let (tree, styles) = styled(
        r#"<style>div{color:red}.c{color:blue}#i{color:green}</style>
           <div class="c" id="i" style="color:purple">x</div>"#,
    );
    assert_eq!(
        style_of(&tree, &styles, "div").color(),
        Color::rgb(128, 0, 128)
    );
}

#[test]
fn later_rule_wins_at_equal_specificity() {
    let (tree, styles) = styled("<style>p{color:red} p{color:blue}</style><p>x</p>");
    assert_eq!(style_of(&tree, &styles, "p").color(), Color::rgb(0, 0, 255));
}

#[test]
fn important_defeats_inline_style() {
    let (tree, styles) = styled(
        r#"<style>div{color:red !important}</style><div style="color:blue">x</div>"#,
    );
    assert_eq!(style_of(&tree, &styles, "div").color(), Color::rgb(255, 0, 0));
}

#[test]
fn important_defeats_higher_specificity_normal() {
    let (tree, styles) = styled(
        r#"<style>div{color:red !important} #i.c{color:blue}</style><div id="i" class="c">x</div>"#,
    );
    assert_eq!(style_of(&tree, &styles, "div").color(), Color::rgb(255, 0, 0));
}

#[test]
fn inheritable_properties_flow_down() {
    let (tree, styles) = styled(
        r#"<style>body{color:#333;font-size:20px;background-color:white}</style>
           <body><p><span>deep</span></p></body>"#,
    );
    let span = style_of(&tree, &styles, "span");
    assert_eq!(span.color(), Color::rgb(0x33, 0x33, 0x33));
    assert_eq!(span.font_size(), 20.0);
    // background-color is not inherited.
    assert_eq!(span.background_color(), Color::TRANSPARENT);
}

#[test]
fn inherit_keyword_copies_the_parent_value() {
    let (tree, styles) = styled(
        r#"<style>div{background-color:red} p{background-color:inherit}</style>
           <div><p>x</p></div>"#,
    );
    assert_eq!(
        style_of(&tree, &styles, "p").background_color(),
        Color::rgb(255, 0, 0)
    );
}

#[test]
fn inherit_without_parent_value_falls_to_initial() {
    let (tree, styles) = styled(
        "<style>p{background-color:inherit}</style><div><p>x</p></div>",
    );
    assert_eq!(
        style_of(&tree, &styles, "p").background_color(),
        Color::TRANSPARENT
    );
}

#[test]
fn em_resolves_against_parent_font_size() {
    let (tree, styles) = styled(
        r#"<style>body{font-size:20px} div{font-size:1.5em; padding-left:2em}</style>
           <div>x</div>"#,
    );
    let div = style_of(&tree, &styles, "div");
    // font-size: 1.5em of the parent's 20px.
    assert_eq!(div.font_size(), 30.0);
    // other em lengths resolve against the element's own font size.
    assert_eq!(div.padding(halftone_css::style::Side::Left, 0.0), 60.0);
}

#[test]
fn media_queries_filter_against_the_viewport() {
    let html = r#"<style>
        p { color: red }
        @media (min-width: 1000px) { p { color: blue } }
        @media (max-width: 1000px) { p { font-size: 20px } }
    </style><p>x</p>"#;

    let (tree, styles) = styled(html);
    let p = style_of(&tree, &styles, "p");
    // Viewport is 800 wide: min-width 1000 fails, max-width 1000 holds.
    assert_eq!(p.color(), Color::rgb(255, 0, 0));
    assert_eq!(p.font_size(), 20.0);

    // At a wider viewport the min-width rule applies.
    let tree = halftone_html::parse(html);
    let css = halftone_css::collect_document_css(&tree, &|_| None);
    let sheets: Vec<_> = css.iter().map(|s| parse_stylesheet(s)).collect();
    let styles = compute_styles(&tree, &sheets, 1200.0, 600.0);
    let p = styles.style(element(&tree, "p")).unwrap();
    assert_eq!(p.color(), Color::rgb(0, 0, 255));
    assert_eq!(p.font_size(), 16.0);
}

#[test]
fn cascade_is_idempotent() {
    let html = r#"<style>div{color:red;margin:1em} .c{font-size:18px}</style>
        <div class="c"><p>x</p></div>"#;
    let tree = halftone_html::parse(html);
    let css = halftone_css::collect_document_css(&tree, &|_| None);
    let sheets: Vec<_> = css.iter().map(|s| parse_stylesheet(s)).collect();

    let first = compute_styles(&tree, &sheets, 800.0, 600.0);
    let second = compute_styles(&tree, &sheets, 800.0, 600.0);

    for id in tree.descendants(tree.root()) {
        if tree.as_element(id).is_none() {
            continue;
        }
        let a = first.style(id).expect("styled once");
        let b = second.style(id).expect("styled twice");
        assert_eq!(a.color(), b.color());
        assert_eq!(a.font_size(), b.font_size());
        assert_eq!(a.display(), b.display());
        assert_eq!(a.len(), b.len());
    }
}

#[test]
fn pseudo_element_slots_get_styles() {
    let (tree, styles) = styled(
        r#"<style>p::before{content:"hi"; color:red}</style><p>x</p>"#,
    );
    let p = element(&tree, "p");
    let before = styles
        .pseudo_style(p, PseudoElement::Before)
        .expect("::before computed");
    assert_eq!(before.color(), Color::rgb(255, 0, 0));
    assert!(before.content().is_some());
    assert!(styles.pseudo_style(p, PseudoElement::After).is_none());
}

#[test]
fn pseudo_elements_inherit_from_their_element() {
    let (tree, styles) = styled(
        r#"<style>p{color:green; font-size:24px} p::after{content:"!"}</style><p>x</p>"#,
    );
    let after = styles
        .pseudo_style(element(&tree, "p"), PseudoElement::After)
        .expect("::after computed");
    assert_eq!(after.color(), Color::rgb(0, 128, 0));
    assert_eq!(after.font_size(), 24.0);
}

#[test]
fn content_none_suppresses_the_pseudo_element() {
    let (tree, styles) = styled(
        r#"<style>p::before{content:none; color:red}</style><p>x</p>"#,
    );
    let before = styles.pseudo_style(element(&tree, "p"), PseudoElement::Before);
    // The slot may exist, but it carries no content items.
    assert!(before.is_none_or(|s| s.content().is_none()));
}

#[test]
fn dialog_hidden_unless_open() {
    let (tree, styles) = styled("<dialog>closed</dialog><div>x</div>");
    assert_eq!(style_of(&tree, &styles, "dialog").display(), Display::None);

    let (tree, styles) = styled("<dialog open>shown</dialog>");
    assert_eq!(style_of(&tree, &styles, "dialog").display(), Display::Block);
}

#[test]
fn unknown_declarations_do_not_poison_the_rule() {
    let (tree, styles) = styled(
        "<style>p { colr: red; color: blue; width: bogus }</style><p>x</p>",
    );
    let p = style_of(&tree, &styles, "p");
    assert_eq!(p.color(), Color::rgb(0, 0, 255));
    assert_eq!(p.width(), halftone_css::style::StyleValue::Auto);
}
