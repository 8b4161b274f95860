//! The cascade: from matched rules to computed styles.
//!
//! [CSS Cascading and Inheritance](https://www.w3.org/TR/css-cascade-4/)
//!
//! Per element, in order:
//!
//! 1. seed the inheritable properties from the parent's computed style,
//! 2. collect every matching rule (UA origin below author origin),
//!    dropping rules whose `@media` query fails against the viewport,
//! 3. apply normal declarations in (origin, specificity, source order)
//!    order so the highest-precedence declaration lands last,
//! 4. apply the inline `style` attribute (specificity 1000, normal),
//! 5. apply `!important` declarations in the same order — these defeat
//!    any non-important declaration, inline style included,
//! 6. resolve `inherit` against the parent's computed style,
//! 7. resolve the element's `em` base: `font-size` computes against the
//!    parent's font size first, every other length against the result.
//!
//! Pseudo-element slots (`::before`, `::after`, `::first-letter`) run
//! the same procedure with the originating element as the inheritance
//! parent and no inline style.

use std::collections::HashMap;
use std::rc::Rc;

use halftone_dom::{DomTree, NodeId, NodeKind};

use crate::parser::{Declaration, StyleRule, Stylesheet, parse_declarations};
use crate::selector::PseudoElement;
use crate::style::{ComputedStyle, StyleValue, expand_shorthand, parse_value};
use crate::ua::ua_stylesheet;

/// Computed styles for a whole document: one slot per element plus the
/// pseudo-element slots that had matching rules.
///
/// Styles are reference-counted so every box an element generates can
/// share one immutable instance.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    styles: HashMap<NodeId, Rc<ComputedStyle>>,
    pseudo: HashMap<(NodeId, PseudoElement), Rc<ComputedStyle>>,
}

impl StyleRegistry {
    /// The computed style of an element.
    #[must_use]
    pub fn style(&self, id: NodeId) -> Option<&Rc<ComputedStyle>> {
        self.styles.get(&id)
    }

    /// The computed style of one of an element's pseudo slots.
    #[must_use]
    pub fn pseudo_style(&self, id: NodeId, which: PseudoElement) -> Option<&Rc<ComputedStyle>> {
        self.pseudo.get(&(id, which))
    }

    /// Number of element styles computed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether no styles were computed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// A rule reference tagged with its cascade sort key.
struct CandidateRule<'a> {
    /// 0 = user agent, 1 = author. UA loses to author at equal
    /// importance regardless of specificity.
    origin: u8,
    /// Index of the stylesheet within its origin.
    sheet_index: usize,
    rule: &'a StyleRule,
}

/// One matched selector occurrence, ready for sorting.
struct Match<'a> {
    origin: u8,
    specificity: u32,
    sheet_index: usize,
    source_order: u32,
    declarations: &'a [Declaration],
}

/// Compute styles for every element of `tree`.
///
/// `author_sheets` are the document's stylesheets in document order; the
/// UA sheet is supplied internally. The viewport size drives `@media`
/// evaluation.
#[must_use]
pub fn compute_styles(
    tree: &DomTree,
    author_sheets: &[Stylesheet],
    viewport_w: f64,
    viewport_h: f64,
) -> StyleRegistry {
    // Media filtering happens once up front; a rule whose query fails
    // simply never becomes a candidate.
    let mut candidates: Vec<CandidateRule> = Vec::new();
    let ua = ua_stylesheet();
    for rule in &ua.rules {
        candidates.push(CandidateRule { origin: 0, sheet_index: 0, rule });
    }
    for (sheet_index, sheet) in author_sheets.iter().enumerate() {
        for rule in &sheet.rules {
            let media_ok = rule
                .media
                .as_ref()
                .is_none_or(|m| m.matches(viewport_w, viewport_h));
            if media_ok {
                candidates.push(CandidateRule { origin: 1, sheet_index, rule });
            }
        }
    }

    let mut registry = StyleRegistry::default();
    compute_subtree(tree, tree.root(), &candidates, None, &mut registry);
    registry
}

fn compute_subtree(
    tree: &DomTree,
    id: NodeId,
    candidates: &[CandidateRule],
    parent: Option<&Rc<ComputedStyle>>,
    registry: &mut StyleRegistry,
) {
    match tree.get(id).map(|n| &n.kind) {
        Some(NodeKind::Element(element)) => {
            let mut element_matches: Vec<Match> = Vec::new();
            let mut pseudo_matches: HashMap<PseudoElement, Vec<Match>> = HashMap::new();

            for candidate in candidates {
                for selector in &candidate.rule.selectors {
                    if !selector.matches(tree, id) {
                        continue;
                    }
                    let entry = Match {
                        origin: candidate.origin,
                        specificity: selector.specificity,
                        sheet_index: candidate.sheet_index,
                        source_order: candidate.rule.source_order,
                        declarations: &candidate.rule.declarations,
                    };
                    match selector.pseudo_element {
                        None => element_matches.push(entry),
                        Some(which) => pseudo_matches.entry(which).or_default().push(entry),
                    }
                }
            }

            let inline = element
                .get_attribute("style")
                .map(parse_declarations)
                .unwrap_or_default();

            let computed = Rc::new(cascade_one(
                parent.map(Rc::as_ref),
                element_matches,
                &inline,
            ));

            for (which, matches) in pseudo_matches {
                let pseudo_style = cascade_one(Some(computed.as_ref()), matches, &[]);
                let _ = registry
                    .pseudo
                    .insert((id, which), Rc::new(pseudo_style));
            }

            let _ = registry.styles.insert(id, Rc::clone(&computed));

            for &child in tree.children(id) {
                compute_subtree(tree, child, candidates, Some(&computed), registry);
            }
        }
        Some(NodeKind::Document) => {
            for &child in tree.children(id) {
                compute_subtree(tree, child, candidates, parent, registry);
            }
        }
        // Text nodes take their parent's style at box-building time.
        _ => {}
    }
}

/// Run the cascade for one element (or pseudo slot).
fn cascade_one(
    parent: Option<&ComputedStyle>,
    mut matches: Vec<Match>,
    inline: &[Declaration],
) -> ComputedStyle {
    // Lowest precedence first, so the later application wins.
    matches.sort_by_key(|m| (m.origin, m.specificity, m.sheet_index, m.source_order));

    // Flatten to the final application sequence:
    // normal (sorted) → inline → important (sorted).
    let mut sequence: Vec<&Declaration> = Vec::new();
    for m in &matches {
        sequence.extend(m.declarations.iter().filter(|d| !d.important));
    }
    sequence.extend(inline.iter());
    for m in &matches {
        sequence.extend(m.declarations.iter().filter(|d| d.important));
    }

    let mut style = match parent {
        Some(p) => ComputedStyle::inheriting_from(p),
        None => ComputedStyle::new(),
    };

    let parent_font_size = parent.map_or(crate::style::DEFAULT_FONT_SIZE, ComputedStyle::font_size);

    // Pass 1: settle the element's own font size so the `em` unit in
    // every other declaration has its base. The last font-size in the
    // sequence is the cascade winner.
    let mut font_size = style.get("font-size").and_then(StyleValue::as_px).unwrap_or(parent_font_size);
    for declaration in &sequence {
        for (property, raw) in expanded(declaration) {
            if property != "font-size" {
                continue;
            }
            match raw {
                None => font_size = crate::style::DEFAULT_FONT_SIZE,
                Some(raw) if raw.eq_ignore_ascii_case("inherit") => font_size = parent_font_size,
                Some(raw) => {
                    if let Some(StyleValue::Length(px)) =
                        parse_value("font-size", &raw, parent_font_size)
                    {
                        font_size = px;
                    }
                }
            }
        }
    }
    style.set("font-size", StyleValue::Length(font_size));

    // Pass 2: everything else, `em` resolved against the element's own
    // font size.
    for declaration in &sequence {
        for (property, raw) in expanded(declaration) {
            if property == "font-size" {
                continue;
            }
            match raw {
                None => style.reset(&property),
                Some(raw) if raw.eq_ignore_ascii_case("inherit") => {
                    // Take the parent's computed value; a parent without
                    // one drops the declaration so the initial applies.
                    match parent.and_then(|p| p.get(&property)) {
                        Some(value) => style.set(&property, value.clone()),
                        None => style.reset(&property),
                    }
                }
                Some(raw) => {
                    if let Some(value) = parse_value(&property, &raw, font_size) {
                        style.set(&property, value);
                    }
                    // Unknown value: declaration dropped, previous value
                    // (or the initial) stays in effect.
                }
            }
        }
    }

    style
}

/// Expand a declaration into `(longhand, value)` pairs. A `None` value
/// resets the longhand to its initial value (shorthand reset rule).
fn expanded(declaration: &Declaration) -> Vec<(String, Option<String>)> {
    match expand_shorthand(&declaration.name, &declaration.value) {
        Some(pairs) => pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        None => vec![(declaration.name.clone(), Some(declaration.value.clone()))],
    }
}
