//! CSS value types and string→value conversion.
//!
//! [CSS Values and Units Level 3](https://www.w3.org/TR/css-values-3/)
//!
//! Lengths are converted to CSS pixels at parse time
//! ([§ 5.2 Absolute lengths](https://www.w3.org/TR/css-values-3/#absolute-lengths)):
//! `1in = 96px`, `1cm = 96/2.54`, `1mm = 1cm/10`, `1pt = 96/72`,
//! `1pc = 16px`, `1em = font-size of the element`. Percentages stay
//! symbolic because their reference depends on the property and the
//! containing block.

use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Pixels per CSS inch.
const PX_PER_IN: f64 = 96.0;
/// Pixels per centimeter.
const PX_PER_CM: f64 = PX_PER_IN / 2.54;
/// Pixels per millimeter.
const PX_PER_MM: f64 = PX_PER_CM / 10.0;
/// Pixels per point (1pt = 1/72in).
const PX_PER_PT: f64 = PX_PER_IN / 72.0;
/// Pixels per pica (1pc = 12pt).
const PX_PER_PC: f64 = PX_PER_PT * 12.0;

/// A parsed CSS property value.
///
/// The tagged union every computed property resolves to. `Length` is
/// always CSS pixels; `Percentage` is a fraction (`50%` → `0.5`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StyleValue {
    /// An identifier from the supported keyword set.
    Keyword(Keyword),
    /// An absolute length in CSS pixels.
    Length(f64),
    /// A fraction of some context-dependent reference (`0.5` = 50%).
    Percentage(f64),
    /// The `auto` keyword (margins, width, height, offsets, z-index).
    Auto,
    /// A unitless number (`line-height: 1.4`, `opacity: 0.5`).
    Number(f64),
    /// An sRGB color.
    Color(Color),
    /// A whitespace-separated list (font families, multi-part values).
    List(Vec<StyleValue>),
    /// A quoted string (font family names, content fallbacks).
    Str(String),
    /// A `url(…)` reference.
    Url(String),
    /// The ordered item list of a pseudo-element `content` property.
    ContentList(Vec<ContentItem>),
    /// One or more `box-shadow` layers.
    BoxShadows(Vec<BoxShadow>),
    /// The function list of a `transform` property.
    Transforms(Vec<TransformFn>),
}

impl StyleValue {
    /// The pixel value if this is a `Length`.
    #[must_use]
    pub fn as_px(&self) -> Option<f64> {
        match self {
            Self::Length(px) => Some(*px),
            _ => None,
        }
    }

    /// Resolve against a percentage reference: lengths pass through,
    /// percentages multiply `reference`, anything else is `None`.
    #[must_use]
    pub fn resolve(&self, reference: f64) -> Option<f64> {
        match self {
            Self::Length(px) => Some(*px),
            Self::Percentage(f) => Some(f * reference),
            _ => None,
        }
    }

    /// Whether this value is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self, Self::Keyword(k) if *k == kw)
    }
}

/// The CSS keywords the renderer acts on.
///
/// Parsed case-insensitively from their kebab-case spellings. Unknown
/// identifiers fail the conversion and the declaration carrying them is
/// dropped, per the tolerant-parsing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Keyword {
    // display
    Block,
    Inline,
    InlineBlock,
    ListItem,
    Table,
    InlineTable,
    TableRow,
    TableCell,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableCaption,
    None,
    // alignment / sides
    Left,
    Right,
    Center,
    Justify,
    Both,
    Top,
    Bottom,
    // font & text
    Normal,
    Bold,
    Bolder,
    Lighter,
    Italic,
    Oblique,
    Underline,
    Overline,
    LineThrough,
    Capitalize,
    Uppercase,
    Lowercase,
    // white-space
    Nowrap,
    Pre,
    PreWrap,
    PreLine,
    // position
    Static,
    Relative,
    Absolute,
    Fixed,
    // vertical-align
    Baseline,
    Middle,
    Sub,
    Super,
    TextTop,
    TextBottom,
    // border styles
    Solid,
    Dashed,
    Dotted,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
    // overflow / visibility
    Visible,
    Hidden,
    Scroll,
    // list markers
    Disc,
    Circle,
    Square,
    Decimal,
    // border model
    Collapse,
    Separate,
    // border-width keywords
    Thin,
    Medium,
    Thick,
    // background shorthand components
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

/// sRGB color with alpha, 0–255 per channel.
///
/// [CSS Color](https://www.w3.org/TR/css-color-3/)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel; 255 = opaque.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    /// An opaque color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Whether the color contributes nothing when painted.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

/// One item of a pseudo-element `content` value.
///
/// [CSS 2.1 § 12.2](https://www.w3.org/TR/CSS2/generate.html#content)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ContentItem {
    /// A quoted string.
    Text(String),
    /// `url(…)` — an image reference.
    Url(String),
    /// `counter(name, style)`.
    Counter {
        /// Counter name.
        name: String,
        /// Marker style (`decimal` when unspecified).
        style: Keyword,
    },
    /// `attr(name)` — the value of an attribute on the originating element.
    Attr(String),
    /// `open-quote`.
    OpenQuote,
    /// `close-quote`.
    CloseQuote,
}

/// One `box-shadow` layer.
///
/// [CSS Backgrounds § 6.1](https://www.w3.org/TR/css-backgrounds-3/#box-shadow)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxShadow {
    /// Horizontal offset in px.
    pub offset_x: f64,
    /// Vertical offset in px.
    pub offset_y: f64,
    /// Blur radius in px (≥ 0).
    pub blur: f64,
    /// Spread distance in px.
    pub spread: f64,
    /// Shadow color.
    pub color: Color,
    /// Inner shadow when true.
    pub inset: bool,
}

/// One function of a `transform` list.
///
/// [CSS Transforms § 8](https://www.w3.org/TR/css-transforms-1/#transform-functions)
///
/// Translation components may be percentages of the border box, so they
/// stay symbolic until paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TransformFn {
    /// `translate(tx, ty)`; components are `Length` or `Percentage`.
    Translate(StyleValue, StyleValue),
    /// `scale(sx, sy)`.
    Scale(f64, f64),
    /// `rotate(angle)` in degrees.
    Rotate(f64),
    /// `matrix(a, b, c, d, e, f)`.
    Matrix(f64, f64, f64, f64, f64, f64),
}

/// Parse a `<length>`, `<percentage>`, or `auto` component.
///
/// `em_base` is the font size the `em` unit resolves against. Bare
/// nonzero numbers are invalid for length-typed properties (CSS 2.1
/// § 4.3.2); a bare `0` is accepted.
#[must_use]
pub fn parse_length(input: &str, em_base: f64) -> Option<StyleValue> {
    let s = input.trim();
    if s.eq_ignore_ascii_case("auto") {
        return Some(StyleValue::Auto);
    }

    let (number_part, unit) = split_unit(s)?;
    let value: f64 = number_part.parse().ok()?;

    match unit {
        "px" => Some(StyleValue::Length(value)),
        "em" => Some(StyleValue::Length(value * em_base)),
        "in" => Some(StyleValue::Length(value * PX_PER_IN)),
        "cm" => Some(StyleValue::Length(value * PX_PER_CM)),
        "mm" => Some(StyleValue::Length(value * PX_PER_MM)),
        "pt" => Some(StyleValue::Length(value * PX_PER_PT)),
        "pc" => Some(StyleValue::Length(value * PX_PER_PC)),
        "%" => Some(StyleValue::Percentage(value / 100.0)),
        // "a bare 0 is a valid length; any other bare number is not"
        "" if value == 0.0 => Some(StyleValue::Length(0.0)),
        _ => None,
    }
}

/// Split a dimension token into its numeric text and unit suffix.
fn split_unit(s: &str) -> Option<(&str, &str)> {
    let split = s
        .char_indices()
        .find(|(_, c)| !matches!(c, '0'..='9' | '.' | '+' | '-'))
        .map_or(s.len(), |(i, _)| i);
    if split == 0 {
        return None;
    }
    Some((&s[..split], s[split..].trim()))
}

/// The CSS 2.1 basic named colors plus `orange` (17 total) and a few
/// extended names common in test documents.
fn named_color(name: &str) -> Option<Color> {
    let c = match name.to_ascii_lowercase().as_str() {
        "black" => Color::rgb(0, 0, 0),
        "silver" => Color::rgb(192, 192, 192),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "white" => Color::rgb(255, 255, 255),
        "maroon" => Color::rgb(128, 0, 0),
        "red" => Color::rgb(255, 0, 0),
        "purple" => Color::rgb(128, 0, 128),
        "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "olive" => Color::rgb(128, 128, 0),
        "yellow" => Color::rgb(255, 255, 0),
        "navy" => Color::rgb(0, 0, 128),
        "blue" => Color::rgb(0, 0, 255),
        "teal" => Color::rgb(0, 128, 128),
        "aqua" | "cyan" => Color::rgb(0, 255, 255),
        "orange" => Color::rgb(255, 165, 0),
        "pink" => Color::rgb(255, 192, 203),
        "brown" => Color::rgb(165, 42, 42),
        "gold" => Color::rgb(255, 215, 0),
        "lightgray" | "lightgrey" => Color::rgb(211, 211, 211),
        "darkgray" | "darkgrey" => Color::rgb(169, 169, 169),
        "transparent" => Color::TRANSPARENT,
        _ => return None,
    };
    Some(c)
}

/// Parse a `<color>`: named, `#rgb`/`#rrggbb` (plus the 4/8-digit alpha
/// forms), `rgb()`, `rgba()`, or `transparent`.
#[must_use]
pub fn parse_color(input: &str) -> Option<Color> {
    let s = input.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    if let Some(args) = function_args(s, &["rgb", "rgba"]) {
        return parse_rgb_args(&args);
    }
    named_color(s)
}

/// Hex color notations: 3, 4, 6, or 8 digits. Three-digit form expands
/// by replicating digits, not by appending zeros.
fn parse_hex_color(hex: &str) -> Option<Color> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..=i)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Color {
            r: digit(0)? * 17,
            g: digit(1)? * 17,
            b: digit(2)? * 17,
            a: 255,
        }),
        4 => Some(Color {
            r: digit(0)? * 17,
            g: digit(1)? * 17,
            b: digit(2)? * 17,
            a: digit(3)? * 17,
        }),
        6 => Some(Color {
            r: pair(0)?,
            g: pair(2)?,
            b: pair(4)?,
            a: 255,
        }),
        8 => Some(Color {
            r: pair(0)?,
            g: pair(2)?,
            b: pair(4)?,
            a: pair(6)?,
        }),
        _ => None,
    }
}

/// If `s` is `name(args)` for one of `names`, return the comma-separated
/// argument strings.
fn function_args(s: &str, names: &[&str]) -> Option<Vec<String>> {
    let open = s.find('(')?;
    let name = s[..open].trim().to_ascii_lowercase();
    if !names.contains(&name.as_str()) {
        return None;
    }
    let inner = s[open + 1..].strip_suffix(')')?;
    Some(inner.split(',').map(|a| a.trim().to_string()).collect())
}

/// `rgb(r, g, b)` / `rgba(r, g, b, a)`; channels are numbers 0–255 or
/// percentages, alpha a number 0–1 or percentage. Out-of-range values
/// clamp.
fn parse_rgb_args(args: &[String]) -> Option<Color> {
    if args.len() < 3 {
        return None;
    }
    let channel = |arg: &str| -> Option<u8> {
        let v = if let Some(pct) = arg.strip_suffix('%') {
            pct.trim().parse::<f64>().ok()? * 255.0 / 100.0
        } else {
            arg.parse::<f64>().ok()?
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    let r = channel(&args[0])?;
    let g = channel(&args[1])?;
    let b = channel(&args[2])?;
    let a = match args.get(3) {
        Some(arg) => {
            let v = if let Some(pct) = arg.strip_suffix('%') {
                pct.trim().parse::<f64>().ok()? / 100.0
            } else {
                arg.parse::<f64>().ok()?
            };
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        }
        None => 255,
    };
    Some(Color { r, g, b, a })
}

/// Split a value string into top-level components.
///
/// Components separate on whitespace, but parenthesized groups and
/// quoted strings travel as single components — `rgb(1, 2, 3)` is one
/// component, `"a b"` is one component. An unterminated string or group
/// is consumed to the end of input (tolerant parsing).
#[must_use]
pub fn split_components(value: &str) -> Vec<String> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut depth = 0_u32;
    let mut quote: Option<char> = None;

    for ch in value.chars() {
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
                c if c.is_whitespace() && depth == 0 => {
                    if !current.is_empty() {
                        components.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            },
        }
    }
    if !current.is_empty() {
        components.push(current);
    }
    components
}

/// Parse a declaration value for a given property into a [`StyleValue`].
///
/// Returns `None` for values the renderer does not understand; the
/// cascade drops such declarations silently, which is the CSS error
/// recovery rule.
#[must_use]
pub fn parse_value(property: &str, raw: &str, em_base: f64) -> Option<StyleValue> {
    let raw = raw.trim();
    match property {
        "color"
        | "background-color"
        | "border-top-color"
        | "border-right-color"
        | "border-bottom-color"
        | "border-left-color" => parse_color(raw).map(StyleValue::Color),

        "width" | "height" | "min-width" | "max-width" | "min-height" | "max-height"
        | "margin-top" | "margin-right" | "margin-bottom" | "margin-left" | "padding-top"
        | "padding-right" | "padding-bottom" | "padding-left" | "top" | "right" | "bottom"
        | "left" | "text-indent" | "letter-spacing" | "word-spacing" | "border-spacing" => {
            parse_length(raw, em_base)
        }

        "font-size" => parse_font_size(raw, em_base),

        "border-top-width" | "border-right-width" | "border-bottom-width"
        | "border-left-width" => parse_border_width(raw, em_base),

        "line-height" => parse_line_height(raw, em_base),

        "font-weight" => parse_font_weight(raw),

        "z-index" => parse_z_index(raw),

        "opacity" => {
            let v: f64 = raw.parse().ok()?;
            Some(StyleValue::Number(v.clamp(0.0, 1.0)))
        }

        "font-family" => Some(parse_font_family(raw)),

        "content" => parse_content(raw),

        "box-shadow" => parse_box_shadow(raw, em_base),

        "transform" => parse_transform(raw, em_base),

        "transform-origin" => parse_transform_origin(raw, em_base),

        "border-radius" => parse_length(raw, em_base),

        "background-image" => parse_url(raw).map(StyleValue::Url),

        "counter-reset" | "counter-increment" => parse_counter_list(raw),

        "vertical-align" => {
            // Keyword or a length/percentage baseline shift.
            if let Ok(kw) = raw.parse::<Keyword>() {
                Some(StyleValue::Keyword(kw))
            } else {
                parse_length(raw, em_base)
            }
        }

        "text-decoration" | "text-decoration-line" => {
            let kws: Vec<StyleValue> = split_components(raw)
                .iter()
                .filter_map(|c| c.parse::<Keyword>().ok().map(StyleValue::Keyword))
                .collect();
            if kws.is_empty() { None } else { Some(StyleValue::List(kws)) }
        }

        // Everything else: a single keyword from the supported set.
        _ => raw.parse::<Keyword>().ok().map(StyleValue::Keyword),
    }
}

/// `font-size`: length, percentage of the parent size, or the absolute
/// keywords mapped to their conventional pixel values.
fn parse_font_size(raw: &str, em_base: f64) -> Option<StyleValue> {
    let px = match raw.to_ascii_lowercase().as_str() {
        "xx-small" => Some(16.0 * 3.0 / 5.0),
        "x-small" => Some(16.0 * 3.0 / 4.0),
        "small" => Some(16.0 * 8.0 / 9.0),
        "medium" => Some(16.0),
        "large" => Some(16.0 * 6.0 / 5.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(em_base / 1.2),
        "larger" => Some(em_base * 1.2),
        _ => None,
    };
    if let Some(px) = px {
        return Some(StyleValue::Length(px));
    }
    // em and % both resolve against the parent font size here.
    match parse_length(raw, em_base)? {
        StyleValue::Percentage(f) => Some(StyleValue::Length(f * em_base)),
        other => Some(other),
    }
}

/// Border width: length or `thin | medium | thick` (1/3/5 px).
fn parse_border_width(raw: &str, em_base: f64) -> Option<StyleValue> {
    match raw.to_ascii_lowercase().as_str() {
        "thin" => Some(StyleValue::Length(1.0)),
        "medium" => Some(StyleValue::Length(3.0)),
        "thick" => Some(StyleValue::Length(5.0)),
        _ => match parse_length(raw, em_base)? {
            v @ StyleValue::Length(_) => Some(v),
            _ => None,
        },
    }
}

/// `line-height`: `normal`, a unitless multiplier, a length, or a
/// percentage of the font size.
fn parse_line_height(raw: &str, em_base: f64) -> Option<StyleValue> {
    if raw.eq_ignore_ascii_case("normal") {
        return Some(StyleValue::Keyword(Keyword::Normal));
    }
    if let Ok(n) = raw.parse::<f64>() {
        return Some(StyleValue::Number(n));
    }
    parse_length(raw, em_base)
}

/// `font-weight`: keywords or the numeric scale, stored as a number.
fn parse_font_weight(raw: &str) -> Option<StyleValue> {
    match raw.to_ascii_lowercase().as_str() {
        "normal" => Some(StyleValue::Number(400.0)),
        "bold" => Some(StyleValue::Number(700.0)),
        // Relative keywords approximated against the usual 400 base.
        "bolder" => Some(StyleValue::Number(700.0)),
        "lighter" => Some(StyleValue::Number(300.0)),
        _ => {
            let n: f64 = raw.parse().ok()?;
            (100.0..=900.0).contains(&n).then_some(StyleValue::Number(n))
        }
    }
}

/// `z-index`: `auto` or an integer.
fn parse_z_index(raw: &str) -> Option<StyleValue> {
    if raw.eq_ignore_ascii_case("auto") {
        return Some(StyleValue::Auto);
    }
    raw.parse::<i32>().ok().map(|n| StyleValue::Number(f64::from(n)))
}

/// `font-family`: a comma-separated list kept as strings, quotes
/// stripped.
fn parse_font_family(raw: &str) -> StyleValue {
    let families = raw
        .split(',')
        .map(|f| f.trim().trim_matches(['"', '\'']).to_string())
        .filter(|f| !f.is_empty())
        .map(StyleValue::Str)
        .collect();
    StyleValue::List(families)
}

/// Strip `url( … )` with optional quotes.
fn parse_url(raw: &str) -> Option<String> {
    let inner = raw
        .trim()
        .strip_prefix("url(")
        .and_then(|s| s.strip_suffix(')'))?;
    Some(inner.trim().trim_matches(['"', '\'']).to_string())
}

/// The `content` property grammar: quoted strings, `url()`, `counter()`,
/// `attr()`, `open-quote`, `close-quote`. `normal` and `none` suppress
/// the pseudo-element and parse to an empty list.
fn parse_content(raw: &str) -> Option<StyleValue> {
    if raw.eq_ignore_ascii_case("normal") || raw.eq_ignore_ascii_case("none") {
        return Some(StyleValue::ContentList(Vec::new()));
    }

    let mut items = Vec::new();
    for component in split_components(raw) {
        let c = component.as_str();
        if (c.starts_with('"') && c.len() >= 2 && c.ends_with('"'))
            || (c.starts_with('\'') && c.len() >= 2 && c.ends_with('\''))
        {
            items.push(ContentItem::Text(c[1..c.len() - 1].to_string()));
        } else if let Some(url) = parse_url(c) {
            items.push(ContentItem::Url(url));
        } else if let Some(args) = function_args(c, &["counter"]) {
            let name = args.first()?.clone();
            let style = args
                .get(1)
                .and_then(|s| s.parse::<Keyword>().ok())
                .unwrap_or(Keyword::Decimal);
            items.push(ContentItem::Counter { name, style });
        } else if let Some(args) = function_args(c, &["attr"]) {
            items.push(ContentItem::Attr(args.first()?.clone()));
        } else if c.eq_ignore_ascii_case("open-quote") {
            items.push(ContentItem::OpenQuote);
        } else if c.eq_ignore_ascii_case("close-quote") {
            items.push(ContentItem::CloseQuote);
        } else {
            // Unknown item invalidates the whole declaration.
            return None;
        }
    }
    Some(StyleValue::ContentList(items))
}

/// `box-shadow`: comma-separated layers of
/// `[inset]? <x> <y> <blur>? <spread>? <color>?`.
fn parse_box_shadow(raw: &str, em_base: f64) -> Option<StyleValue> {
    if raw.eq_ignore_ascii_case("none") {
        return Some(StyleValue::BoxShadows(Vec::new()));
    }

    let mut shadows = Vec::new();
    for layer in raw.split(',') {
        let mut lengths = Vec::new();
        let mut color = None;
        let mut inset = false;
        for component in split_components(layer) {
            if component.eq_ignore_ascii_case("inset") {
                inset = true;
            } else if let Some(StyleValue::Length(px)) = parse_length(&component, em_base) {
                lengths.push(px);
            } else if let Some(c) = parse_color(&component) {
                color = Some(c);
            } else {
                return None;
            }
        }
        if lengths.len() < 2 {
            return None;
        }
        shadows.push(BoxShadow {
            offset_x: lengths[0],
            offset_y: lengths[1],
            blur: lengths.get(2).copied().unwrap_or(0.0).max(0.0),
            spread: lengths.get(3).copied().unwrap_or(0.0),
            color: color.unwrap_or(Color::BLACK),
            inset,
        });
    }
    Some(StyleValue::BoxShadows(shadows))
}

/// `transform`: a whitespace-separated list of transform functions, or
/// `none` (empty list).
fn parse_transform(raw: &str, em_base: f64) -> Option<StyleValue> {
    if raw.eq_ignore_ascii_case("none") {
        return Some(StyleValue::Transforms(Vec::new()));
    }

    let mut fns = Vec::new();
    for component in split_components(raw) {
        let open = component.find('(')?;
        let name = component[..open].to_ascii_lowercase();
        let args: Vec<String> = component[open + 1..]
            .strip_suffix(')')?
            .split(',')
            .map(|a| a.trim().to_string())
            .collect();

        let length_arg = |i: usize| -> Option<StyleValue> {
            args.get(i).and_then(|a| parse_length(a, em_base))
        };
        let number_arg = |i: usize| -> Option<f64> { args.get(i).and_then(|a| a.parse().ok()) };

        let f = match name.as_str() {
            "translate" => TransformFn::Translate(
                length_arg(0)?,
                length_arg(1).unwrap_or(StyleValue::Length(0.0)),
            ),
            "translatex" => TransformFn::Translate(length_arg(0)?, StyleValue::Length(0.0)),
            "translatey" => TransformFn::Translate(StyleValue::Length(0.0), length_arg(0)?),
            "scale" => {
                let sx = number_arg(0)?;
                TransformFn::Scale(sx, number_arg(1).unwrap_or(sx))
            }
            "scalex" => TransformFn::Scale(number_arg(0)?, 1.0),
            "scaley" => TransformFn::Scale(1.0, number_arg(0)?),
            "rotate" => TransformFn::Rotate(parse_angle_deg(args.first()?)?),
            "matrix" => {
                if args.len() != 6 {
                    return None;
                }
                TransformFn::Matrix(
                    number_arg(0)?,
                    number_arg(1)?,
                    number_arg(2)?,
                    number_arg(3)?,
                    number_arg(4)?,
                    number_arg(5)?,
                )
            }
            _ => return None,
        };
        fns.push(f);
    }
    Some(StyleValue::Transforms(fns))
}

/// An `<angle>` in degrees; `deg`, `rad`, and `turn` accepted.
fn parse_angle_deg(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if let Some(deg) = s.strip_suffix("deg") {
        deg.trim().parse().ok()
    } else if let Some(rad) = s.strip_suffix("rad") {
        rad.trim().parse::<f64>().ok().map(f64::to_degrees)
    } else if let Some(turn) = s.strip_suffix("turn") {
        turn.trim().parse::<f64>().ok().map(|t| t * 360.0)
    } else {
        None
    }
}

/// `transform-origin`: one or two components, keywords or
/// lengths/percentages, stored as a two-element list `[x, y]`.
fn parse_transform_origin(raw: &str, em_base: f64) -> Option<StyleValue> {
    let component = |c: &str| -> Option<StyleValue> {
        match c.to_ascii_lowercase().as_str() {
            "left" | "top" => Some(StyleValue::Percentage(0.0)),
            "center" => Some(StyleValue::Percentage(0.5)),
            "right" | "bottom" => Some(StyleValue::Percentage(1.0)),
            _ => parse_length(c, em_base),
        }
    };
    let parts = split_components(raw);
    let x = component(parts.first()?)?;
    let y = parts
        .get(1)
        .and_then(|c| component(c))
        .unwrap_or(StyleValue::Percentage(0.5));
    Some(StyleValue::List(vec![x, y]))
}

/// `counter-reset` / `counter-increment`: pairs of `name <integer>?`,
/// stored as a flat list of `Str`/`Number` values.
fn parse_counter_list(raw: &str) -> Option<StyleValue> {
    if raw.eq_ignore_ascii_case("none") {
        return Some(StyleValue::List(Vec::new()));
    }
    let mut out = Vec::new();
    let parts = split_components(raw);
    let mut i = 0;
    while i < parts.len() {
        let name = parts[i].clone();
        if name.parse::<f64>().is_ok() {
            return None; // a number where a name belongs
        }
        let value = parts
            .get(i + 1)
            .and_then(|p| p.parse::<f64>().ok());
        out.push(StyleValue::Str(name));
        if let Some(v) = value {
            out.push(StyleValue::Number(v));
            i += 2;
        } else {
            i += 1;
        }
    }
    Some(StyleValue::List(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_units_convert_to_px() {
        assert_eq!(parse_length("1in", 16.0), Some(StyleValue::Length(96.0)));
        assert_eq!(parse_length("72pt", 16.0), Some(StyleValue::Length(96.0)));
        assert_eq!(parse_length("1pc", 16.0), Some(StyleValue::Length(16.0)));
        assert_eq!(parse_length("2em", 20.0), Some(StyleValue::Length(40.0)));
        assert_eq!(parse_length("50%", 16.0), Some(StyleValue::Percentage(0.5)));
    }

    #[test]
    fn bare_numbers_are_invalid_lengths_except_zero() {
        assert_eq!(parse_length("0", 16.0), Some(StyleValue::Length(0.0)));
        assert_eq!(parse_length("5", 16.0), None);
        assert_eq!(parse_length("12quux", 16.0), None);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_color("#fff"), Some(Color::WHITE));
        assert_eq!(parse_color("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(
            parse_color("#00000080"),
            Some(Color { r: 0, g: 0, b: 0, a: 128 })
        );
        assert_eq!(parse_color("#12345"), None);
    }

    #[test]
    fn rgb_functions_clamp() {
        assert_eq!(parse_color("rgb(255, 0, 300)"), Some(Color::rgb(255, 0, 255)));
        assert_eq!(
            parse_color("rgba(0, 0, 0, 0.5)"),
            Some(Color { r: 0, g: 0, b: 0, a: 128 })
        );
        assert_eq!(parse_color("rgb(50%, 0%, 100%)"), Some(Color::rgb(128, 0, 255)));
    }

    #[test]
    fn named_colors_cover_the_css21_set() {
        for name in [
            "black", "silver", "gray", "white", "maroon", "red", "purple", "fuchsia", "green",
            "lime", "olive", "yellow", "navy", "blue", "teal", "aqua", "orange",
        ] {
            assert!(parse_color(name).is_some(), "missing named color {name}");
        }
        assert_eq!(parse_color("transparent"), Some(Color::TRANSPARENT));
    }

    #[test]
    fn component_splitting_respects_groups() {
        let parts = split_components("1px solid rgb(1, 2, 3)");
        assert_eq!(parts, vec!["1px", "solid", "rgb(1, 2, 3)"]);
        let parts = split_components(r#""a b" c"#);
        assert_eq!(parts, vec![r#""a b""#, "c"]);
    }

    #[test]
    fn content_grammar() {
        let StyleValue::ContentList(items) =
            parse_value("content", r#"counter(item) ". " attr(title) open-quote"#, 16.0).unwrap()
        else {
            panic!("expected content list");
        };
        assert_eq!(items.len(), 4);
        assert_eq!(
            items[0],
            ContentItem::Counter { name: "item".into(), style: Keyword::Decimal }
        );
        assert_eq!(items[1], ContentItem::Text(". ".into()));
        assert_eq!(items[2], ContentItem::Attr("title".into()));
        assert_eq!(items[3], ContentItem::OpenQuote);
    }

    #[test]
    fn box_shadow_layers() {
        let StyleValue::BoxShadows(shadows) =
            parse_value("box-shadow", "2px 3px 4px red, inset 0 0 1px", 16.0).unwrap()
        else {
            panic!("expected shadows");
        };
        assert_eq!(shadows.len(), 2);
        assert_eq!(shadows[0].blur, 4.0);
        assert_eq!(shadows[0].color, Color::rgb(255, 0, 0));
        assert!(shadows[1].inset);
    }

    #[test]
    fn transform_functions() {
        let StyleValue::Transforms(fns) =
            parse_value("transform", "translate(10px, 50%) rotate(90deg) scale(2)", 16.0).unwrap()
        else {
            panic!("expected transforms");
        };
        assert_eq!(fns.len(), 3);
        assert_eq!(
            fns[0],
            TransformFn::Translate(StyleValue::Length(10.0), StyleValue::Percentage(0.5))
        );
        assert_eq!(fns[1], TransformFn::Rotate(90.0));
        assert_eq!(fns[2], TransformFn::Scale(2.0, 2.0));
    }

    #[test]
    fn unknown_keywords_are_rejected() {
        assert_eq!(parse_value("float", "sideways", 16.0), None);
        assert!(parse_value("float", "left", 16.0).is_some());
    }
}
