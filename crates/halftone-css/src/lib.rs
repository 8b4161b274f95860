//! CSS parsing, selector matching, cascade, layout, and paint-order for
//! the Halftone renderer.
//!
//! # Scope
//!
//! This crate owns the visual-formatting pipeline:
//!
//! - **Style value model** — typed CSS values, unit conversion, shorthand
//!   expansion ([CSS Values](https://www.w3.org/TR/css-values-3/))
//! - **Selectors** — compound/complex selector matching with specificity
//!   ([Selectors Level 3](https://www.w3.org/TR/selectors-3/))
//! - **Cascade** — UA + author origins, `!important`, inline style,
//!   inheritance and the `inherit` keyword
//!   ([CSS Cascading](https://www.w3.org/TR/css-cascade-4/))
//! - **Layout** — block flow, the multi-pass inline formatting algorithm,
//!   floats, positioning, and tables under
//!   [CSS 2.1 visual formatting](https://www.w3.org/TR/CSS2/visuren.html)
//! - **Paint order** — stacking contexts and back-to-front paint-list
//!   emission per [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! The raster back-end, fonts, and resource loading live in
//! `halftone-browser`; this crate talks to them only through the
//! [`layout::FontMetrics`] and [`layout::ImageSizes`] traits and the
//! [`paint::PaintList`] it emits.

pub mod cascade;
pub mod layout;
pub mod paint;
pub mod parser;
pub mod selector;
pub mod style;
pub mod ua;

pub use cascade::{StyleRegistry, compute_styles};
pub use layout::{FontMetrics, LayoutBox, LayoutOptions, layout_document};
pub use paint::{PaintList, PaintOp, paint_tree};
pub use parser::{Declaration, MediaQuery, StyleRule, Stylesheet, parse_stylesheet};
pub use selector::{ParsedSelector, parse_selector_list, specificity};
pub use style::{Color, ComputedStyle, StyleValue};

use halftone_dom::{DomTree, NodeId};

/// Collect the CSS sources a document references, in document order.
///
/// Returns the text of every `<style>` element, plus every
/// `<link rel="stylesheet" href=…>` resolved through `fetch`. A fetch
/// failure degrades to an empty stylesheet (the sheet is simply absent).
pub fn collect_document_css(
    tree: &DomTree,
    fetch: &dyn Fn(&str) -> Option<String>,
) -> Vec<String> {
    let mut sheets = Vec::new();
    collect_css_from(tree, tree.root(), fetch, &mut sheets);
    sheets
}

fn collect_css_from(
    tree: &DomTree,
    id: NodeId,
    fetch: &dyn Fn(&str) -> Option<String>,
    sheets: &mut Vec<String>,
) {
    if let Some(element) = tree.as_element(id) {
        match element.name.as_str() {
            "style" => {
                sheets.push(tree.text_content(id));
                return;
            }
            "link" => {
                let is_stylesheet = element
                    .get_attribute("rel")
                    .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"));
                if is_stylesheet
                    && let Some(href) = element.get_attribute("href")
                {
                    match fetch(href) {
                        Some(css) => sheets.push(css),
                        None => halftone_common::warn_once(
                            "css",
                            &format!("stylesheet '{href}' could not be fetched; treating as empty"),
                        ),
                    }
                }
                return;
            }
            _ => {}
        }
    }
    for &child in tree.children(id) {
        collect_css_from(tree, child, fetch, sheets);
    }
}
