//! User-agent stylesheet.
//!
//! [HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! UA rules sit below every author rule in the cascade, regardless of
//! specificity. The sheet is parsed once and cached.
//!
//! The `body { margin: 0 }` rule is deliberate: this renderer's output
//! is compared pixel-for-pixel against reference images, and a zero body
//! margin keeps coordinates aligned with the test corpus.

use std::sync::OnceLock;

use crate::parser::{Stylesheet, parse_stylesheet};

const UA_CSS: &str = r"
/* Non-rendered elements */
head, style, script, meta, title, link, base, template, datalist {
    display: none;
}
dialog {
    display: none;
}
dialog[open] {
    display: block;
}

/* Flow content */
html, body, div, p, address, article, aside, blockquote, dd, details,
dl, dt, fieldset, figcaption, figure, footer, form, h1, h2, h3, h4, h5,
h6, header, hgroup, hr, main, menu, nav, pre, search, section, summary {
    display: block;
}

body {
    margin: 0;
}

p, blockquote, figure, pre {
    margin-block: 1em;
}

blockquote, figure {
    margin-inline-start: 40px;
    margin-inline-end: 40px;
}

pre {
    white-space: pre;
    font-family: monospace;
}

/* Headings */
h1 {
    font-size: 2em;
    font-weight: bold;
    margin-block: 0.67em;
}
h2 {
    font-size: 1.5em;
    font-weight: bold;
    margin-block: 0.83em;
}
h3 {
    font-size: 1.17em;
    font-weight: bold;
    margin-block: 1em;
}
h4 {
    font-weight: bold;
    margin-block: 1.33em;
}
h5 {
    font-size: 0.83em;
    font-weight: bold;
    margin-block: 1.67em;
}
h6 {
    font-size: 0.67em;
    font-weight: bold;
    margin-block: 2.33em;
}

/* Text-level semantics */
a {
    color: #0645ad;
    text-decoration: underline;
}
em, i, cite, dfn, var {
    font-style: italic;
}
strong, b {
    font-weight: bold;
}
code, kbd, samp, tt {
    font-family: monospace;
}
s, strike, del {
    text-decoration: line-through;
}
u, ins {
    text-decoration: underline;
}
sub {
    vertical-align: sub;
    font-size: smaller;
}
sup {
    vertical-align: super;
    font-size: smaller;
}
center {
    display: block;
    text-align: center;
}

/* Lists */
ul, ol, dir {
    display: block;
    margin-block: 1em;
    padding-inline-start: 40px;
}
ul, dir {
    list-style-type: disc;
}
ol {
    list-style-type: decimal;
}
li {
    display: list-item;
}

/* Tables */
table {
    display: table;
    border-spacing: 2px;
    border-collapse: separate;
}
thead {
    display: table-header-group;
}
tbody {
    display: table-row-group;
}
tfoot {
    display: table-footer-group;
}
tr {
    display: table-row;
}
td, th {
    display: table-cell;
    padding: 1px;
}
th {
    font-weight: bold;
    text-align: center;
}
caption {
    display: table-caption;
    text-align: center;
}
";

/// The parsed UA stylesheet, parsed on first use.
pub fn ua_stylesheet() -> &'static Stylesheet {
    static SHEET: OnceLock<Stylesheet> = OnceLock::new();
    SHEET.get_or_init(|| parse_stylesheet(UA_CSS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ua_sheet_parses_to_rules() {
        let sheet = ua_stylesheet();
        assert!(sheet.rules.len() > 20);
        // Every rule must have at least one selector and one declaration.
        for rule in &sheet.rules {
            assert!(!rule.selectors.is_empty());
            assert!(!rule.declarations.is_empty());
        }
    }
}
