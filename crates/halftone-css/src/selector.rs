//! Selector parsing and matching.
//!
//! [Selectors Level 3](https://www.w3.org/TR/selectors-3/)
//!
//! Matching runs right-to-left: the rightmost compound is tested against
//! the candidate element, then each combinator walks the DOM leftward
//! (ancestors for descendant, the parent for `>`, the previous element
//! sibling for `+`, any earlier element sibling for `~`).
//!
//! Interactive pseudo-classes (`:hover`, `:focus`, `:active`,
//! `:visited`) parse and count toward specificity but never match — this
//! is a static renderer. Unknown pseudo-classes behave the same way, so
//! their presence doesn't drop the whole rule. `::before` / `::after` /
//! `::first-letter` are extracted as a side label; the cascade pairs
//! them with the element's pseudo slot.

use halftone_dom::{DomTree, ElementData, NodeId};

/// A single condition on one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimplePart {
    /// `*` — matches any element, contributes no specificity.
    Universal,
    /// A tag name (`div`, `p`), matched case-insensitively.
    Type(String),
    /// `#id`.
    Id(String),
    /// `.class`.
    Class(String),
    /// `[attr]` and its operator forms.
    Attribute(AttrSelector),
    /// A pseudo-class that can never match in static rendering.
    NeverMatch,
}

/// `[attr]`, `[attr=v]`, `[attr~=v]`, `[attr|=v]`, `[attr^=v]`,
/// `[attr$=v]`, `[attr*=v]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    /// Attribute name (matched case-insensitively).
    pub name: String,
    /// Which comparison to perform.
    pub op: AttrOp,
    /// The comparison value (empty for `Exists`).
    pub value: String,
}

/// Attribute selector operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]` — the attribute is present.
    Exists,
    /// `[attr=v]` — exact value.
    Equals,
    /// `[attr~=v]` — `v` is one of the space-separated words.
    Includes,
    /// `[attr|=v]` — exactly `v` or `v-` prefixed.
    DashMatch,
    /// `[attr^=v]` — value starts with `v`.
    Prefix,
    /// `[attr$=v]` — value ends with `v`.
    Suffix,
    /// `[attr*=v]` — value contains `v`.
    Substring,
}

/// A sequence of simple parts applying to one element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    /// The conditions; all must hold.
    pub parts: Vec<SimplePart>,
}

/// How a compound relates to the one on its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace — any ancestor.
    Descendant,
    /// `>` — the parent.
    Child,
    /// `+` — the immediately preceding element sibling.
    NextSibling,
    /// `~` — any preceding element sibling.
    SubsequentSibling,
}

/// The pseudo-element label a selector may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    /// `::before`.
    Before,
    /// `::after`.
    After,
    /// `::first-letter`.
    FirstLetter,
}

/// A parsed selector ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// The rightmost compound (the subject).
    pub subject: Compound,
    /// `(combinator, compound)` pairs leftward from the subject.
    pub leftward: Vec<(Combinator, Compound)>,
    /// Pseudo-element label, if the selector targets one.
    pub pseudo_element: Option<PseudoElement>,
    /// `100·ids + 10·(classes+attributes+pseudo-classes) + 1·types`.
    pub specificity: u32,
}

impl ParsedSelector {
    /// Match this selector's element part against `node`.
    ///
    /// The pseudo-element label does not participate here; the cascade
    /// routes pseudo-labeled rules to the element's pseudo slot instead
    /// of the element itself.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        if !compound_matches(&self.subject, tree, node) {
            return false;
        }

        let mut current = node;
        for (combinator, compound) in &self.leftward {
            match combinator {
                Combinator::Descendant => {
                    let Some(found) = tree
                        .ancestors(current)
                        .find(|&a| compound_matches(compound, tree, a))
                    else {
                        return false;
                    };
                    current = found;
                }
                Combinator::Child => {
                    let Some(parent) = tree.parent(current) else {
                        return false;
                    };
                    if !compound_matches(compound, tree, parent) {
                        return false;
                    }
                    current = parent;
                }
                Combinator::NextSibling => {
                    let Some(prev) = previous_element_sibling(tree, current) else {
                        return false;
                    };
                    if !compound_matches(compound, tree, prev) {
                        return false;
                    }
                    current = prev;
                }
                Combinator::SubsequentSibling => {
                    let Some(found) = tree
                        .preceding_siblings(current)
                        .filter(|&s| tree.as_element(s).is_some())
                        .find(|&s| compound_matches(compound, tree, s))
                    else {
                        return false;
                    };
                    current = found;
                }
            }
        }
        true
    }
}

/// The nearest preceding sibling that is an element (text nodes between
/// elements do not break `+`).
fn previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node)
        .find(|&s| tree.as_element(s).is_some())
}

fn compound_matches(compound: &Compound, tree: &DomTree, node: NodeId) -> bool {
    let Some(element) = tree.as_element(node) else {
        return false;
    };
    compound.parts.iter().all(|part| part_matches(part, element))
}

fn part_matches(part: &SimplePart, element: &ElementData) -> bool {
    match part {
        SimplePart::Universal => true,
        SimplePart::Type(name) => element.name.eq_ignore_ascii_case(name),
        SimplePart::Id(id) => element.id() == Some(id.as_str()),
        SimplePart::Class(class) => element.has_class(class),
        SimplePart::Attribute(attr) => attr_matches(attr, element),
        SimplePart::NeverMatch => false,
    }
}

fn attr_matches(attr: &AttrSelector, element: &ElementData) -> bool {
    let Some(actual) = element.get_attribute(&attr.name) else {
        return false;
    };
    let expected = attr.value.as_str();
    match attr.op {
        AttrOp::Exists => true,
        AttrOp::Equals => actual == expected,
        AttrOp::Includes => actual.split_ascii_whitespace().any(|w| w == expected),
        AttrOp::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

/// Parse a comma-separated selector list, keeping the selectors that
/// parse successfully.
#[must_use]
pub fn parse_selector_list(input: &str) -> Vec<ParsedSelector> {
    input
        .split(',')
        .filter_map(|s| parse_selector(s.trim()))
        .collect()
}

/// Compute the specificity of a selector string, if it parses.
///
/// `100·ids + 10·(classes + attributes + pseudo-classes) + 1·types`;
/// `*` contributes nothing.
#[must_use]
pub fn specificity(input: &str) -> Option<u32> {
    parse_selector(input).map(|s| s.specificity)
}

/// Parse one complex selector.
#[must_use]
pub fn parse_selector(input: &str) -> Option<ParsedSelector> {
    let tokens = tokenize_selector(input)?;
    if tokens.is_empty() {
        return None;
    }

    // The token stream alternates compound / combinator; fold it into
    // the subject plus a right-to-left combinator chain.
    let mut compounds: Vec<(Option<Combinator>, String)> = Vec::new();
    let mut pending: Option<Combinator> = None;
    for token in tokens {
        match token {
            SelectorToken::Compound(text) => {
                compounds.push((pending.take(), text));
            }
            SelectorToken::Combinator(c) => {
                if compounds.is_empty() || pending.is_some() {
                    return None; // leading or doubled combinator
                }
                pending = Some(c);
            }
        }
    }
    if pending.is_some() {
        return None; // trailing combinator
    }

    let mut specificity = 0_u32;
    let mut pseudo_element = None;

    // Each compound carries the combinator on its left; walking from the
    // subject leftward pairs compound `i` with the combinator stored on
    // compound `i + 1`.
    let last = compounds.len() - 1;
    let mut subject = Compound::default();
    let mut leftward = Vec::new();

    for (i, (_, text)) in compounds.iter().enumerate().rev() {
        let is_subject = i == last;
        let (compound, pseudo) = parse_compound(text, &mut specificity)?;
        if let Some(p) = pseudo {
            // Pseudo-elements are only valid on the subject compound.
            if !is_subject || pseudo_element.is_some() {
                return None;
            }
            pseudo_element = Some(p);
        }
        if is_subject {
            subject = compound;
        } else {
            leftward.push((compounds[i + 1].0?, compound));
        }
    }

    Some(ParsedSelector {
        subject,
        leftward,
        pseudo_element,
        specificity,
    })
}

/// One token of the selector stream.
enum SelectorToken {
    Compound(String),
    Combinator(Combinator),
}

/// Split a selector into compound texts and combinators. Whitespace
/// around `>`/`+`/`~` belongs to that combinator, not to a descendant
/// combinator. Brackets may contain spaces.
fn tokenize_selector(input: &str) -> Option<Vec<SelectorToken>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut in_parens = 0_u32;
    let mut saw_space = false;

    let flush = |current: &mut String, saw_space: &mut bool, tokens: &mut Vec<SelectorToken>| {
        if !current.is_empty() {
            // A space only means "descendant" between two compounds;
            // around an explicit combinator it is just formatting.
            if *saw_space && matches!(tokens.last(), Some(SelectorToken::Compound(_))) {
                tokens.push(SelectorToken::Combinator(Combinator::Descendant));
            }
            tokens.push(SelectorToken::Compound(std::mem::take(current)));
            *saw_space = false;
        }
    };

    for ch in input.chars() {
        if in_brackets {
            current.push(ch);
            if ch == ']' {
                in_brackets = false;
            }
            continue;
        }
        if in_parens > 0 {
            current.push(ch);
            match ch {
                '(' => in_parens += 1,
                ')' => in_parens -= 1,
                _ => {}
            }
            continue;
        }
        match ch {
            '[' => {
                in_brackets = true;
                current.push(ch);
            }
            '(' => {
                in_parens = 1;
                current.push(ch);
            }
            '>' | '+' | '~' => {
                flush(&mut current, &mut saw_space, &mut tokens);
                saw_space = false;
                let combinator = match ch {
                    '>' => Combinator::Child,
                    '+' => Combinator::NextSibling,
                    _ => Combinator::SubsequentSibling,
                };
                tokens.push(SelectorToken::Combinator(combinator));
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    flush(&mut current, &mut saw_space, &mut tokens);
                    saw_space = true;
                } else if !tokens.is_empty() {
                    saw_space = true;
                }
            }
            c => current.push(c),
        }
    }
    if in_brackets || in_parens > 0 {
        return None; // unterminated bracket/parens: drop the selector
    }
    flush(&mut current, &mut saw_space, &mut tokens);
    Some(tokens)
}

/// Parse one compound selector text, accumulating specificity.
fn parse_compound(text: &str, specificity: &mut u32) -> Option<(Compound, Option<PseudoElement>)> {
    let mut parts = Vec::new();
    let mut pseudo_element = None;
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    // Optional leading type selector or universal.
    if i < chars.len() && (chars[i].is_ascii_alphabetic() || chars[i] == '*') {
        if chars[i] == '*' {
            parts.push(SimplePart::Universal);
            i += 1;
        } else {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '-') {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            *specificity += 1;
            parts.push(SimplePart::Type(name.to_ascii_lowercase()));
        }
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (name, next) = read_identifier(&chars, i + 1);
                if name.is_empty() {
                    return None;
                }
                *specificity += 100;
                parts.push(SimplePart::Id(name));
                i = next;
            }
            '.' => {
                let (name, next) = read_identifier(&chars, i + 1);
                if name.is_empty() {
                    return None;
                }
                *specificity += 10;
                parts.push(SimplePart::Class(name));
                i = next;
            }
            '[' => {
                let close = chars[i..].iter().position(|&c| c == ']')? + i;
                let inner: String = chars[i + 1..close].iter().collect();
                let attr = parse_attribute_selector(&inner)?;
                *specificity += 10;
                parts.push(SimplePart::Attribute(attr));
                i = close + 1;
            }
            ':' => {
                let double = chars.get(i + 1) == Some(&':');
                let name_start = if double { i + 2 } else { i + 1 };
                let (name, mut next) = read_identifier(&chars, name_start);
                if name.is_empty() {
                    return None;
                }
                // Swallow functional arguments (`:nth-child(2)`).
                if chars.get(next) == Some(&'(') {
                    let close = chars[next..].iter().position(|&c| c == ')')? + next;
                    next = close + 1;
                }
                match name.as_str() {
                    // Pseudo-elements, in both spellings.
                    "before" => {
                        pseudo_element = Some(PseudoElement::Before);
                        *specificity += 1;
                    }
                    "after" => {
                        pseudo_element = Some(PseudoElement::After);
                        *specificity += 1;
                    }
                    "first-letter" => {
                        pseudo_element = Some(PseudoElement::FirstLetter);
                        *specificity += 1;
                    }
                    // Every pseudo-class counts toward specificity and
                    // never matches in a static rendering.
                    _ => {
                        *specificity += 10;
                        parts.push(SimplePart::NeverMatch);
                    }
                }
                i = next;
            }
            _ => return None,
        }
    }

    if parts.is_empty() && pseudo_element.is_none() {
        return None;
    }
    Some((Compound { parts }, pseudo_element))
}

/// Read an identifier (letters, digits, `-`, `_`) starting at `start`.
fn read_identifier(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    while i < chars.len()
        && (chars[i].is_ascii_alphanumeric() || chars[i] == '-' || chars[i] == '_')
    {
        i += 1;
    }
    (chars[start..i].iter().collect(), i)
}

/// Parse the inside of `[ … ]`.
fn parse_attribute_selector(inner: &str) -> Option<AttrSelector> {
    let inner = inner.trim();
    for (symbol, op) in [
        ("~=", AttrOp::Includes),
        ("|=", AttrOp::DashMatch),
        ("^=", AttrOp::Prefix),
        ("$=", AttrOp::Suffix),
        ("*=", AttrOp::Substring),
        ("=", AttrOp::Equals),
    ] {
        if let Some((name, value)) = inner.split_once(symbol) {
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches(['"', '\'']).to_string();
            return Some(AttrSelector {
                name: name.to_ascii_lowercase(),
                op,
                value,
            });
        }
    }
    if inner.is_empty() {
        return None;
    }
    Some(AttrSelector {
        name: inner.to_ascii_lowercase(),
        op: AttrOp::Exists,
        value: String::new(),
    })
}
