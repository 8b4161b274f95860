//! Tolerant CSS parser.
//!
//! The error-recovery posture follows CSS itself: nothing the author
//! writes can make parsing fail. Unterminated comments and strings are
//! consumed to end of input, unknown at-rules are skipped with brace
//! balancing, unknown declarations are dropped one at a time, and a rule
//! whose every selector fails to parse simply matches nothing.
//!
//! The only at-rule acted on is `@media`, restricted to the `all` and
//! `screen` types and the `min-width` / `max-width` / `min-height` /
//! `max-height` features in px, combined with `and`.

use crate::selector::{ParsedSelector, parse_selector_list};

/// A parsed stylesheet: a flat rule list, `@media`-nested rules carrying
/// their query.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    /// Style rules in source order.
    pub rules: Vec<StyleRule>,
}

/// One style rule (`selectors { declarations }`).
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// The comma-separated selectors that parsed successfully.
    pub selectors: Vec<ParsedSelector>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
    /// The enclosing `@media` query, if the rule was nested in one.
    pub media: Option<MediaQuery>,
    /// Position of this rule within its stylesheet; the cascade uses it
    /// to break specificity ties by source order.
    pub source_order: u32,
}

/// One `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// The raw value text, `!important` stripped.
    pub value: String,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

/// A parsed `@media` prelude.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQuery {
    /// Whether the media type applies to screen rendering.
    type_matches: bool,
    /// `and`-combined feature tests; all must pass.
    features: Vec<MediaFeature>,
    /// Set when the prelude contained something unsupported; such a
    /// query never matches (CSS "not all" behavior).
    unsupported: bool,
}

/// A single supported media feature test, in px.
#[derive(Debug, Clone, Copy, PartialEq)]
enum MediaFeature {
    MinWidth(f64),
    MaxWidth(f64),
    MinHeight(f64),
    MaxHeight(f64),
}

impl MediaQuery {
    /// Evaluate the query against a viewport size.
    #[must_use]
    pub fn matches(&self, viewport_w: f64, viewport_h: f64) -> bool {
        if self.unsupported || !self.type_matches {
            return false;
        }
        self.features.iter().all(|feature| match feature {
            MediaFeature::MinWidth(px) => viewport_w >= *px,
            MediaFeature::MaxWidth(px) => viewport_w <= *px,
            MediaFeature::MinHeight(px) => viewport_h >= *px,
            MediaFeature::MaxHeight(px) => viewport_h <= *px,
        })
    }
}

/// Parse one stylesheet text.
#[must_use]
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let css = strip_comments(css);
    let mut parser = Parser {
        input: &css,
        pos: 0,
        next_order: 0,
    };
    let mut stylesheet = Stylesheet::default();
    parser.parse_rules(None, false, &mut stylesheet.rules);
    stylesheet
}

/// Remove `/* … */` comments, preserving string contents. An
/// unterminated comment consumes the rest of the input.
fn strip_comments(css: &str) -> String {
    let bytes = css.as_bytes();
    let mut out = String::with_capacity(css.len());
    let mut i = 0;
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        match quote {
            Some(q) => {
                let ch_len = utf8_len(bytes[i]);
                out.push_str(&css[i..i + ch_len]);
                if bytes[i] == q {
                    quote = None;
                }
                i += ch_len;
            }
            None => {
                if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                    i = css[i + 2..].find("*/").map_or(bytes.len(), |j| i + 2 + j + 2);
                } else {
                    if bytes[i] == b'"' || bytes[i] == b'\'' {
                        quote = Some(bytes[i]);
                    }
                    // Comments only nest ASCII-safe scanning; push the
                    // original char boundaries intact.
                    let ch_len = utf8_len(bytes[i]);
                    out.push_str(&css[i..i + ch_len]);
                    i += ch_len;
                }
            }
        }
    }
    out
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    next_order: u32,
}

impl Parser<'_> {
    fn parse_rules(&mut self, media: Option<&MediaQuery>, nested: bool, out: &mut Vec<StyleRule>) {
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                return;
            }
            if self.peek() == Some('}') {
                self.pos += 1;
                if nested {
                    // End of the enclosing at-rule block.
                    return;
                }
                // A stray `}` at the top level is junk; keep going.
                continue;
            }
            if self.peek() == Some('@') {
                self.parse_at_rule(out);
            } else {
                self.parse_style_rule(media, out);
            }
        }
    }

    fn parse_at_rule(&mut self, out: &mut Vec<StyleRule>) {
        let prelude_start = self.pos;
        // Scan the prelude up to `{` or `;`.
        while let Some(ch) = self.peek() {
            if ch == '{' || ch == ';' {
                break;
            }
            self.pos += ch.len_utf8();
        }
        let prelude = self.input[prelude_start..self.pos].trim();

        match self.peek() {
            None => {}
            Some(';') => {
                // Block-less at-rule (@import, @charset, …): skipped.
                self.pos += 1;
            }
            Some('{') => {
                self.pos += 1;
                if let Some(condition) = prelude.strip_prefix("@media") {
                    let query = parse_media_query(condition);
                    self.parse_rules(Some(&query), true, out);
                } else {
                    // Unknown at-rule with a block: skip it balanced.
                    let _ = self.skip_block();
                }
            }
            _ => unreachable!("scan stopped on `{{` or `;`"),
        }
    }

    /// Skip a `{ … }` body whose opening brace is already consumed,
    /// honoring nesting and strings. Returns whether the closing brace
    /// was found (unterminated input just ends).
    fn skip_block(&mut self) -> bool {
        let mut depth = 1_u32;
        let mut quote: Option<char> = None;
        while let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
            match quote {
                Some(q) => {
                    if ch == q {
                        quote = None;
                    }
                }
                None => match ch {
                    '"' | '\'' => quote = Some(ch),
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return true;
                        }
                    }
                    _ => {}
                },
            }
        }
        false
    }

    fn parse_style_rule(&mut self, media: Option<&MediaQuery>, out: &mut Vec<StyleRule>) {
        let selector_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '{' {
                break;
            }
            self.pos += ch.len_utf8();
        }
        if self.peek().is_none() {
            // Trailing selector junk with no block.
            return;
        }
        let selector_text = self.input[selector_start..self.pos].trim().to_string();
        self.pos += 1; // consume `{`

        let body_start = self.pos;
        let closed = self.skip_block();
        let body_end = if closed { self.pos - 1 } else { self.pos };
        let body = &self.input[body_start..body_end];

        let selectors = parse_selector_list(&selector_text);
        if selectors.is_empty() {
            if !selector_text.is_empty() {
                halftone_common::warn_once(
                    "css",
                    &format!("no selector in '{selector_text}' could be parsed; rule dropped"),
                );
            }
            return;
        }

        let declarations = parse_declarations(body);
        let source_order = self.next_order;
        self.next_order += 1;
        out.push(StyleRule {
            selectors,
            declarations,
            media: media.cloned(),
            source_order,
        });
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                return;
            }
            self.pos += ch.len_utf8();
        }
    }
}

/// Parse a declaration block body into its surviving declarations.
#[must_use]
pub fn parse_declarations(body: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    for piece in split_respecting_groups(body, ';') {
        let Some((name, value)) = piece.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        // Property names must start with a letter or hyphen.
        if !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '-')
        {
            continue;
        }
        let mut value = value.trim();
        let mut important = false;
        // `!important` is recognized only in its canonical spelling.
        if let Some(stripped) = value.strip_suffix("!important") {
            value = stripped.trim_end();
            important = true;
        }
        if value.is_empty() {
            continue;
        }
        declarations.push(Declaration {
            name,
            value: value.to_string(),
            important,
        });
    }
    declarations
}

/// Split on `separator` at nesting depth zero, honoring parentheses and
/// quotes (so `url(a;b)` and `"x;y"` survive intact).
fn split_respecting_groups(input: &str, separator: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0_u32;
    let mut quote: Option<char> = None;
    for ch in input.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                c if c == separator && depth == 0 => {
                    pieces.push(std::mem::take(&mut current));
                }
                c => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Parse the condition text of an `@media` prelude.
fn parse_media_query(condition: &str) -> MediaQuery {
    let mut query = MediaQuery {
        type_matches: true,
        features: Vec::new(),
        unsupported: false,
    };

    for part in condition.split(" and ") {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(inner) = part.strip_prefix('(').and_then(|p| p.strip_suffix(')')) {
            match parse_media_feature(inner) {
                Some(feature) => query.features.push(feature),
                None => query.unsupported = true,
            }
        } else {
            // A media type: this engine renders for `screen`.
            match part.to_ascii_lowercase().as_str() {
                "all" | "screen" => {}
                _ => query.type_matches = false,
            }
        }
    }
    query
}

/// Parse one `(feature: Npx)` test.
fn parse_media_feature(inner: &str) -> Option<MediaFeature> {
    let (name, value) = inner.split_once(':')?;
    let px: f64 = value.trim().strip_suffix("px")?.trim().parse().ok()?;
    match name.trim().to_ascii_lowercase().as_str() {
        "min-width" => Some(MediaFeature::MinWidth(px)),
        "max-width" => Some(MediaFeature::MaxWidth(px)),
        "min-height" => Some(MediaFeature::MinHeight(px)),
        "max-height" => Some(MediaFeature::MaxHeight(px)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_rule() {
        let sheet = parse_stylesheet("p { color: red; margin: 0 }");
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].name, "color");
        assert_eq!(rule.declarations[0].value, "red");
    }

    #[test]
    fn important_canonical_form_only() {
        let sheet = parse_stylesheet("p { color: red !important; width: 3px ! important }");
        let decls = &sheet.rules[0].declarations;
        assert!(decls[0].important);
        assert_eq!(decls[0].value, "red");
        // `! important` (with a space) is not the canonical form.
        assert!(!decls[1].important);
    }

    #[test]
    fn unknown_at_rules_are_skipped() {
        let sheet = parse_stylesheet(
            "@charset \"utf-8\"; @font-face { src: url(x) } p { color: blue } @keyframes k { 0% { left: 0 } }",
        );
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].value, "blue");
    }

    #[test]
    fn media_query_attaches_and_evaluates() {
        let sheet =
            parse_stylesheet("@media screen and (min-width: 600px) { p { color: red } } div { }");
        assert_eq!(sheet.rules.len(), 2);
        let media = sheet.rules[0].media.as_ref().unwrap();
        assert!(media.matches(800.0, 600.0));
        assert!(!media.matches(500.0, 600.0));
        assert!(sheet.rules[1].media.is_none());
    }

    #[test]
    fn unsupported_media_feature_never_matches() {
        let sheet = parse_stylesheet("@media (orientation: landscape) { p { color: red } }");
        let media = sheet.rules[0].media.as_ref().unwrap();
        assert!(!media.matches(1000.0, 100.0));
    }

    #[test]
    fn print_media_type_never_matches() {
        let sheet = parse_stylesheet("@media print { p { color: red } }");
        assert!(!sheet.rules[0].media.as_ref().unwrap().matches(800.0, 600.0));
    }

    #[test]
    fn unterminated_comment_swallows_rest() {
        let sheet = parse_stylesheet("p { color: red } /* open comment div { color: blue }");
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn bad_property_names_are_dropped() {
        let decls = parse_declarations("1width: 10px; color: red; *zoom: 1");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "color");
    }

    #[test]
    fn declarations_split_outside_groups_only() {
        let decls = parse_declarations("background-image: url(\"a;b.png\"); color: red");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, "url(\"a;b.png\")");
    }
}
