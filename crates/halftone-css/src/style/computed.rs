//! The computed style of one element.
//!
//! [CSS Cascading § 4.4](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! A [`ComputedStyle`] is a property-name → [`StyleValue`] map produced
//! by the cascade, immutable afterwards and shared by every box the
//! element generates. Accessors cover the fixed set of properties layout
//! and paint read; each returns the CSS 2.1 initial value when the map
//! has no entry, so callers never see "unset". The `inherit` keyword is
//! resolved during the cascade and never appears here.

use std::collections::HashMap;

use serde::Serialize;

use super::value::{BoxShadow, Color, ContentItem, Keyword, StyleValue, TransformFn};

/// Properties that inherit from parent to child by default.
///
/// [CSS 2.1 full property table](https://www.w3.org/TR/CSS2/propidx.html),
/// restricted to the set this engine implements.
pub const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "font-variant",
    "line-height",
    "text-align",
    "text-decoration",
    "text-transform",
    "text-indent",
    "white-space",
    "visibility",
    "letter-spacing",
    "word-spacing",
    "list-style-type",
    "list-style-position",
    "list-style-image",
    "direction",
    "cursor",
];

/// The initial value of a property, for the handful of cases callers
/// need it as a value rather than through an accessor default.
#[must_use]
pub fn initial_value(property: &str) -> StyleValue {
    match property {
        "display" => StyleValue::Keyword(Keyword::Inline),
        "color" => StyleValue::Color(Color::BLACK),
        "background-color" => StyleValue::Color(Color::TRANSPARENT),
        "font-size" => StyleValue::Length(DEFAULT_FONT_SIZE),
        "font-weight" => StyleValue::Number(400.0),
        "line-height" => StyleValue::Keyword(Keyword::Normal),
        "width" | "height" | "z-index" => StyleValue::Auto,
        "opacity" => StyleValue::Number(1.0),
        _ => StyleValue::Length(0.0),
    }
}

/// The CSS `medium` font size in pixels.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Ratio applied to the font size for `line-height: normal`.
pub const NORMAL_LINE_HEIGHT: f64 = 1.2;

/// Outer display classification used throughout layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Display {
    /// `display: none` — no boxes at all.
    None,
    /// Inline-level, contents participate in the IFC.
    Inline,
    /// Block-level block container.
    Block,
    /// Atomic inline-level block container.
    InlineBlock,
    /// Block box plus a marker.
    ListItem,
    /// Table wrapper box.
    Table,
    /// Atomic inline table wrapper.
    InlineTable,
    /// Table row.
    TableRow,
    /// Table cell.
    TableCell,
    /// Row group (treated as a transparent row container).
    TableRowGroup,
}

impl Display {
    /// Whether boxes of this display type are inline-level.
    #[must_use]
    pub fn is_inline_level(self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock | Self::InlineTable)
    }
}

/// `position` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Position {
    /// Normal flow.
    #[default]
    Static,
    /// Normal flow, then offset.
    Relative,
    /// Out of flow, positioned against the nearest positioned ancestor.
    Absolute,
    /// Out of flow, positioned against the viewport.
    Fixed,
}

impl Position {
    /// Whether the box is positioned at all (anything but `static`).
    #[must_use]
    pub fn is_positioned(self) -> bool {
        self != Self::Static
    }

    /// Whether the box is out of the normal flow.
    #[must_use]
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// `float` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FloatSide {
    /// Not floated.
    #[default]
    None,
    /// Floated against the left edge.
    Left,
    /// Floated against the right edge.
    Right,
}

/// `clear` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ClearSide {
    /// No clearance.
    #[default]
    None,
    /// Below prior left floats.
    Left,
    /// Below prior right floats.
    Right,
    /// Below all prior floats.
    Both,
}

/// `text-align` values (no `justify`; it renders as `left`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextAlign {
    /// Align line contents to the left band edge.
    #[default]
    Left,
    /// Align to the right band edge.
    Right,
    /// Center within the band.
    Center,
}

/// `white-space` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WhiteSpace {
    /// Collapse whitespace, allow wrapping.
    #[default]
    Normal,
    /// Collapse whitespace, forbid wrapping.
    Nowrap,
    /// Preserve whitespace and newlines, forbid wrapping.
    Pre,
    /// Preserve whitespace and newlines, allow wrapping.
    PreWrap,
    /// Collapse spaces, preserve newlines, allow wrapping.
    PreLine,
}

impl WhiteSpace {
    /// Whether runs of whitespace collapse to a single space.
    #[must_use]
    pub fn collapses(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Whether soft wrapping is allowed.
    #[must_use]
    pub fn wraps(self) -> bool {
        !matches!(self, Self::Nowrap | Self::Pre)
    }

    /// Whether newlines in the source force line breaks.
    #[must_use]
    pub fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }
}

/// `overflow` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Overflow {
    /// Content may paint outside the box.
    #[default]
    Visible,
    /// Content clips to the padding box.
    Hidden,
    /// Clipped (this engine does not scroll).
    Scroll,
}

/// `vertical-align` values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum VerticalAlign {
    /// Fragment baseline on the line baseline.
    Baseline,
    /// Centered on baseline + half x-height.
    Middle,
    /// Lowered baseline (subscript).
    Sub,
    /// Raised baseline (superscript).
    Super,
    /// Top of fragment at top of the parent's content area.
    TextTop,
    /// Bottom of fragment at bottom of the parent's content area.
    TextBottom,
    /// Top of fragment at the line-box top.
    Top,
    /// Bottom of fragment at the line-box bottom.
    Bottom,
    /// Baseline raised by this many pixels (negative lowers).
    Length(f64),
    /// Baseline raised by this fraction of the line-height.
    Percentage(f64),
}

/// Text decoration flags; several may combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextDecoration {
    /// Line under the text.
    pub underline: bool,
    /// Line over the text.
    pub overline: bool,
    /// Line through the middle.
    pub line_through: bool,
}

impl TextDecoration {
    /// Whether any decoration line is set.
    #[must_use]
    pub fn any(self) -> bool {
        self.underline || self.overline || self.line_through
    }
}

/// `border-style` per side, reduced to what the painter distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BorderStyle {
    /// No border (width computes to 0).
    #[default]
    None,
    /// `hidden`: like none, but wins in border-collapse conflicts.
    Hidden,
    /// Continuous line.
    Solid,
    /// Dash pattern.
    Dashed,
    /// Dot pattern.
    Dotted,
    /// Two parallel lines.
    Double,
}

impl BorderStyle {
    /// Conflict priority for collapsed table borders: higher wins.
    #[must_use]
    pub fn collapse_priority(self) -> u8 {
        match self {
            Self::Hidden => 5,
            Self::Double => 4,
            Self::Solid => 3,
            Self::Dashed => 2,
            Self::Dotted => 1,
            Self::None => 0,
        }
    }

    /// Whether a border of this style paints anything.
    #[must_use]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

/// A box side, used to index the edge-valued accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

impl Side {
    /// All four sides in top/right/bottom/left order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The side's name as it appears in property names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// The resolved style of one element (or pseudo-element).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComputedStyle {
    values: HashMap<String, StyleValue>,
}

impl ComputedStyle {
    /// An empty style: every accessor returns its initial value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw lookup.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&StyleValue> {
        self.values.get(property)
    }

    /// Set a property value (cascade only; styles are immutable after).
    pub fn set(&mut self, property: &str, value: StyleValue) {
        let _ = self.values.insert(property.to_string(), value);
    }

    /// Remove a property so its initial value applies (shorthand reset).
    pub fn reset(&mut self, property: &str) {
        let _ = self.values.remove(property);
    }

    /// Copy the inheritable properties of `parent` into a fresh style.
    #[must_use]
    pub fn inheriting_from(parent: &Self) -> Self {
        let mut style = Self::new();
        for &property in INHERITED_PROPERTIES {
            if let Some(value) = parent.get(property) {
                style.set(property, value.clone());
            }
        }
        style
    }

    /// Number of explicitly set properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no properties are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // ── Typed accessors ────────────────────────────────────────────────

    /// `display`, initial `inline`.
    #[must_use]
    pub fn display(&self) -> Display {
        match self.get("display") {
            Some(StyleValue::Keyword(kw)) => match kw {
                Keyword::None => Display::None,
                Keyword::Block => Display::Block,
                Keyword::Inline => Display::Inline,
                Keyword::InlineBlock => Display::InlineBlock,
                Keyword::ListItem => Display::ListItem,
                Keyword::Table => Display::Table,
                Keyword::InlineTable => Display::InlineTable,
                Keyword::TableRow => Display::TableRow,
                Keyword::TableCell => Display::TableCell,
                Keyword::TableRowGroup
                | Keyword::TableHeaderGroup
                | Keyword::TableFooterGroup => Display::TableRowGroup,
                Keyword::TableCaption => Display::Block,
                _ => Display::Inline,
            },
            _ => Display::Inline,
        }
    }

    /// `position`, initial `static`.
    #[must_use]
    pub fn position(&self) -> Position {
        match self.get("position") {
            Some(StyleValue::Keyword(Keyword::Relative)) => Position::Relative,
            Some(StyleValue::Keyword(Keyword::Absolute)) => Position::Absolute,
            Some(StyleValue::Keyword(Keyword::Fixed)) => Position::Fixed,
            _ => Position::Static,
        }
    }

    /// `float`, initial `none`.
    #[must_use]
    pub fn float_side(&self) -> FloatSide {
        match self.get("float") {
            Some(StyleValue::Keyword(Keyword::Left)) => FloatSide::Left,
            Some(StyleValue::Keyword(Keyword::Right)) => FloatSide::Right,
            _ => FloatSide::None,
        }
    }

    /// `clear`, initial `none`.
    #[must_use]
    pub fn clear(&self) -> ClearSide {
        match self.get("clear") {
            Some(StyleValue::Keyword(Keyword::Left)) => ClearSide::Left,
            Some(StyleValue::Keyword(Keyword::Right)) => ClearSide::Right,
            Some(StyleValue::Keyword(Keyword::Both)) => ClearSide::Both,
            _ => ClearSide::None,
        }
    }

    /// `font-size` in px, initial 16.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.get("font-size")
            .and_then(StyleValue::as_px)
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// `font-weight` as a numeric weight, initial 400.
    #[must_use]
    pub fn font_weight(&self) -> u16 {
        match self.get("font-weight") {
            Some(StyleValue::Number(n)) => *n as u16,
            _ => 400,
        }
    }

    /// Whether `font-style` selects an italic or oblique face.
    #[must_use]
    pub fn is_italic(&self) -> bool {
        matches!(
            self.get("font-style"),
            Some(StyleValue::Keyword(Keyword::Italic | Keyword::Oblique))
        )
    }

    /// First `font-family` entry, if any was specified.
    #[must_use]
    pub fn font_family(&self) -> Option<&str> {
        match self.get("font-family") {
            Some(StyleValue::List(families)) => families.iter().find_map(|f| match f {
                StyleValue::Str(s) => Some(s.as_str()),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Whether the font stack asks for a monospace face.
    #[must_use]
    pub fn is_monospace(&self) -> bool {
        match self.get("font-family") {
            Some(StyleValue::List(families)) => families.iter().any(
                |f| matches!(f, StyleValue::Str(s) if s.eq_ignore_ascii_case("monospace")),
            ),
            _ => false,
        }
    }

    /// Used `line-height` in px for this element's font size.
    ///
    /// `normal` → 1.2 × font-size; a number multiplies the font size; a
    /// length is used as-is; a percentage resolves against the font size.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        let font_size = self.font_size();
        match self.get("line-height") {
            Some(StyleValue::Number(n)) => n * font_size,
            Some(StyleValue::Length(px)) => *px,
            Some(StyleValue::Percentage(f)) => f * font_size,
            _ => NORMAL_LINE_HEIGHT * font_size,
        }
    }

    /// `color`, initial black.
    #[must_use]
    pub fn color(&self) -> Color {
        match self.get("color") {
            Some(StyleValue::Color(c)) => *c,
            _ => Color::BLACK,
        }
    }

    /// `background-color`, initial transparent.
    #[must_use]
    pub fn background_color(&self) -> Color {
        match self.get("background-color") {
            Some(StyleValue::Color(c)) => *c,
            _ => Color::TRANSPARENT,
        }
    }

    /// `background-image` URL, if any.
    #[must_use]
    pub fn background_image(&self) -> Option<&str> {
        match self.get("background-image") {
            Some(StyleValue::Url(url)) => Some(url.as_str()),
            _ => None,
        }
    }

    /// The margin value of one side: `Auto`, `Length`, or `Percentage`.
    /// Initial 0.
    #[must_use]
    pub fn margin(&self, side: Side) -> StyleValue {
        self.get(&format!("margin-{}", side.name()))
            .cloned()
            .unwrap_or(StyleValue::Length(0.0))
    }

    /// Used padding of one side in px, percentages against `cb_width`.
    /// Negative values clamp to 0 (padding cannot be negative).
    #[must_use]
    pub fn padding(&self, side: Side, cb_width: f64) -> f64 {
        self.get(&format!("padding-{}", side.name()))
            .and_then(|v| v.resolve(cb_width))
            .unwrap_or(0.0)
            .max(0.0)
    }

    /// `border-<side>-style`, initial `none`.
    #[must_use]
    pub fn border_style(&self, side: Side) -> BorderStyle {
        match self.get(&format!("border-{}-style", side.name())) {
            Some(StyleValue::Keyword(kw)) => match kw {
                Keyword::Solid => BorderStyle::Solid,
                Keyword::Dashed => BorderStyle::Dashed,
                Keyword::Dotted => BorderStyle::Dotted,
                Keyword::Double => BorderStyle::Double,
                Keyword::Hidden => BorderStyle::Hidden,
                // The 3-D styles render as solid in this engine.
                Keyword::Groove | Keyword::Ridge | Keyword::Inset | Keyword::Outset => {
                    BorderStyle::Solid
                }
                _ => BorderStyle::None,
            },
            _ => BorderStyle::None,
        }
    }

    /// Used border width of one side in px. A side whose style is `none`
    /// or `hidden` computes to width 0 (CSS 2.1 § 8.5.3). Unspecified
    /// width with a visible style takes `medium` (3px).
    #[must_use]
    pub fn border_width(&self, side: Side) -> f64 {
        if !self.border_style(side).is_visible() {
            return 0.0;
        }
        self.get(&format!("border-{}-width", side.name()))
            .and_then(StyleValue::as_px)
            .unwrap_or(3.0)
            .max(0.0)
    }

    /// `border-<side>-color`; the initial value is the element's `color`.
    #[must_use]
    pub fn border_color(&self, side: Side) -> Color {
        match self.get(&format!("border-{}-color", side.name())) {
            Some(StyleValue::Color(c)) => *c,
            _ => self.color(),
        }
    }

    /// `width`, initial `auto`.
    #[must_use]
    pub fn width(&self) -> StyleValue {
        self.get("width").cloned().unwrap_or(StyleValue::Auto)
    }

    /// `height`, initial `auto`.
    #[must_use]
    pub fn height(&self) -> StyleValue {
        self.get("height").cloned().unwrap_or(StyleValue::Auto)
    }

    /// `min-width` resolved against `cb_width`, initial 0.
    #[must_use]
    pub fn min_width(&self, cb_width: f64) -> f64 {
        self.get("min-width")
            .and_then(|v| v.resolve(cb_width))
            .unwrap_or(0.0)
    }

    /// `max-width` resolved against `cb_width`; `None` = no limit.
    #[must_use]
    pub fn max_width(&self, cb_width: f64) -> Option<f64> {
        self.get("max-width").and_then(|v| v.resolve(cb_width))
    }

    /// `min-height` resolved against `cb_height`, initial 0.
    #[must_use]
    pub fn min_height(&self, cb_height: f64) -> f64 {
        self.get("min-height")
            .and_then(|v| v.resolve(cb_height))
            .unwrap_or(0.0)
    }

    /// `max-height` resolved against `cb_height`; `None` = no limit.
    #[must_use]
    pub fn max_height(&self, cb_height: f64) -> Option<f64> {
        self.get("max-height").and_then(|v| v.resolve(cb_height))
    }

    /// One of the `top`/`right`/`bottom`/`left` offsets, initial `auto`.
    #[must_use]
    pub fn offset(&self, side: Side) -> StyleValue {
        self.get(side.name()).cloned().unwrap_or(StyleValue::Auto)
    }

    /// `text-align`, initial `left` (`justify` renders as left).
    #[must_use]
    pub fn text_align(&self) -> TextAlign {
        match self.get("text-align") {
            Some(StyleValue::Keyword(Keyword::Right)) => TextAlign::Right,
            Some(StyleValue::Keyword(Keyword::Center)) => TextAlign::Center,
            _ => TextAlign::Left,
        }
    }

    /// `white-space`, initial `normal`.
    #[must_use]
    pub fn white_space(&self) -> WhiteSpace {
        match self.get("white-space") {
            Some(StyleValue::Keyword(Keyword::Nowrap)) => WhiteSpace::Nowrap,
            Some(StyleValue::Keyword(Keyword::Pre)) => WhiteSpace::Pre,
            Some(StyleValue::Keyword(Keyword::PreWrap)) => WhiteSpace::PreWrap,
            Some(StyleValue::Keyword(Keyword::PreLine)) => WhiteSpace::PreLine,
            _ => WhiteSpace::Normal,
        }
    }

    /// `vertical-align`, initial `baseline`.
    #[must_use]
    pub fn vertical_align(&self) -> VerticalAlign {
        match self.get("vertical-align") {
            Some(StyleValue::Keyword(kw)) => match kw {
                Keyword::Middle => VerticalAlign::Middle,
                Keyword::Sub => VerticalAlign::Sub,
                Keyword::Super => VerticalAlign::Super,
                Keyword::TextTop => VerticalAlign::TextTop,
                Keyword::TextBottom => VerticalAlign::TextBottom,
                Keyword::Top => VerticalAlign::Top,
                Keyword::Bottom => VerticalAlign::Bottom,
                _ => VerticalAlign::Baseline,
            },
            Some(StyleValue::Length(px)) => VerticalAlign::Length(*px),
            Some(StyleValue::Percentage(f)) => VerticalAlign::Percentage(*f),
            _ => VerticalAlign::Baseline,
        }
    }

    /// `overflow`, initial `visible`.
    #[must_use]
    pub fn overflow(&self) -> Overflow {
        match self.get("overflow") {
            Some(StyleValue::Keyword(Keyword::Hidden)) => Overflow::Hidden,
            Some(StyleValue::Keyword(Keyword::Scroll)) => Overflow::Scroll,
            _ => Overflow::Visible,
        }
    }

    /// Whether `visibility` leaves the boxes visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !matches!(
            self.get("visibility"),
            Some(StyleValue::Keyword(Keyword::Hidden))
        )
    }

    /// `z-index`: `None` means `auto`.
    #[must_use]
    pub fn z_index(&self) -> Option<i32> {
        match self.get("z-index") {
            Some(StyleValue::Number(n)) => Some(*n as i32),
            _ => None,
        }
    }

    /// `opacity`, initial 1.0.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        match self.get("opacity") {
            Some(StyleValue::Number(n)) => n.clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    /// `box-shadow` layers, outermost first; empty = none.
    #[must_use]
    pub fn box_shadow(&self) -> &[BoxShadow] {
        match self.get("box-shadow") {
            Some(StyleValue::BoxShadows(shadows)) => shadows,
            _ => &[],
        }
    }

    /// `transform` function list; empty = none.
    #[must_use]
    pub fn transform(&self) -> &[TransformFn] {
        match self.get("transform") {
            Some(StyleValue::Transforms(fns)) => fns,
            _ => &[],
        }
    }

    /// `transform-origin` as `(x, y)`; initial `50% 50%`.
    #[must_use]
    pub fn transform_origin(&self) -> (StyleValue, StyleValue) {
        match self.get("transform-origin") {
            Some(StyleValue::List(parts)) if parts.len() == 2 => {
                (parts[0].clone(), parts[1].clone())
            }
            _ => (StyleValue::Percentage(0.5), StyleValue::Percentage(0.5)),
        }
    }

    /// `border-radius` in px, initial 0 (one radius for all corners).
    #[must_use]
    pub fn border_radius(&self) -> f64 {
        self.get("border-radius")
            .and_then(StyleValue::as_px)
            .unwrap_or(0.0)
            .max(0.0)
    }

    /// `list-style-type`, initial `disc`.
    #[must_use]
    pub fn list_style_type(&self) -> Keyword {
        match self.get("list-style-type") {
            Some(StyleValue::Keyword(
                kw @ (Keyword::Disc | Keyword::Circle | Keyword::Square | Keyword::Decimal
                | Keyword::None),
            )) => *kw,
            _ => Keyword::Disc,
        }
    }

    /// Whether `border-collapse: collapse` applies to this table.
    #[must_use]
    pub fn border_collapse(&self) -> bool {
        matches!(
            self.get("border-collapse"),
            Some(StyleValue::Keyword(Keyword::Collapse))
        )
    }

    /// `border-spacing` in px, initial 0.
    #[must_use]
    pub fn border_spacing(&self) -> f64 {
        self.get("border-spacing")
            .and_then(StyleValue::as_px)
            .unwrap_or(0.0)
            .max(0.0)
    }

    /// Combined `text-decoration` flags.
    #[must_use]
    pub fn text_decoration(&self) -> TextDecoration {
        let mut deco = TextDecoration::default();
        let mut apply = |kw: &Keyword| match kw {
            Keyword::Underline => deco.underline = true,
            Keyword::Overline => deco.overline = true,
            Keyword::LineThrough => deco.line_through = true,
            _ => {}
        };
        match self.get("text-decoration") {
            Some(StyleValue::List(items)) => {
                for item in items {
                    if let StyleValue::Keyword(kw) = item {
                        apply(kw);
                    }
                }
            }
            Some(StyleValue::Keyword(kw)) => apply(kw),
            _ => {}
        }
        deco
    }

    /// `text-transform`, initial none (`Normal`).
    #[must_use]
    pub fn text_transform(&self) -> Keyword {
        match self.get("text-transform") {
            Some(StyleValue::Keyword(
                kw @ (Keyword::Uppercase | Keyword::Lowercase | Keyword::Capitalize),
            )) => *kw,
            _ => Keyword::Normal,
        }
    }

    /// `text-indent` resolved against `cb_width`, initial 0.
    #[must_use]
    pub fn text_indent(&self, cb_width: f64) -> f64 {
        self.get("text-indent")
            .and_then(|v| v.resolve(cb_width))
            .unwrap_or(0.0)
    }

    /// `letter-spacing` in px, initial 0.
    #[must_use]
    pub fn letter_spacing(&self) -> f64 {
        self.get("letter-spacing")
            .and_then(StyleValue::as_px)
            .unwrap_or(0.0)
    }

    /// `word-spacing` in px, initial 0 (added to every inter-word space).
    #[must_use]
    pub fn word_spacing(&self) -> f64 {
        self.get("word-spacing")
            .and_then(StyleValue::as_px)
            .unwrap_or(0.0)
    }

    /// The `content` item list of a pseudo-element; `None` when absent
    /// or `normal`/`none` (which suppress the pseudo-element).
    #[must_use]
    pub fn content(&self) -> Option<&[ContentItem]> {
        match self.get("content") {
            Some(StyleValue::ContentList(items)) if !items.is_empty() => Some(items),
            _ => None,
        }
    }

    /// `counter-reset` as `(name, initial)` pairs.
    #[must_use]
    pub fn counter_reset(&self) -> Vec<(String, i64)> {
        self.counter_pairs("counter-reset", 0)
    }

    /// `counter-increment` as `(name, delta)` pairs.
    #[must_use]
    pub fn counter_increment(&self) -> Vec<(String, i64)> {
        self.counter_pairs("counter-increment", 1)
    }

    fn counter_pairs(&self, property: &str, default: i64) -> Vec<(String, i64)> {
        let Some(StyleValue::List(items)) = self.get(property) else {
            return Vec::new();
        };
        let mut pairs = Vec::new();
        let mut iter = items.iter().peekable();
        while let Some(item) = iter.next() {
            if let StyleValue::Str(name) = item {
                let value = match iter.peek() {
                    Some(StyleValue::Number(n)) => {
                        let v = *n as i64;
                        let _ = iter.next();
                        v
                    }
                    _ => default,
                };
                pairs.push((name.clone(), value));
            }
        }
        pairs
    }

    /// Whether any property of this style establishes a stacking context
    /// on a positioned box (`z-index` other than `auto`), or forces one
    /// regardless of positioning (`opacity < 1`, a transform).
    #[must_use]
    pub fn forces_stacking_context(&self) -> bool {
        self.opacity() < 1.0 || !self.transform().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_return_initial_values_when_unset() {
        let style = ComputedStyle::new();
        assert_eq!(style.display(), Display::Inline);
        assert_eq!(style.font_size(), 16.0);
        assert_eq!(style.color(), Color::BLACK);
        assert_eq!(style.background_color(), Color::TRANSPARENT);
        assert_eq!(style.width(), StyleValue::Auto);
        assert_eq!(style.z_index(), None);
        assert_eq!(style.opacity(), 1.0);
        assert_eq!(style.line_height(), 16.0 * NORMAL_LINE_HEIGHT);
    }

    #[test]
    fn border_width_is_zero_without_style() {
        let mut style = ComputedStyle::new();
        style.set("border-top-width", StyleValue::Length(4.0));
        assert_eq!(style.border_width(Side::Top), 0.0);

        style.set("border-top-style", StyleValue::Keyword(Keyword::Solid));
        assert_eq!(style.border_width(Side::Top), 4.0);
    }

    #[test]
    fn border_color_falls_back_to_color() {
        let mut style = ComputedStyle::new();
        style.set("color", StyleValue::Color(Color::rgb(1, 2, 3)));
        assert_eq!(style.border_color(Side::Left), Color::rgb(1, 2, 3));
    }

    #[test]
    fn inheriting_copies_only_the_inherited_set() {
        let mut parent = ComputedStyle::new();
        parent.set("color", StyleValue::Color(Color::rgb(9, 9, 9)));
        parent.set("background-color", StyleValue::Color(Color::WHITE));
        parent.set("font-size", StyleValue::Length(20.0));

        let child = ComputedStyle::inheriting_from(&parent);
        assert_eq!(child.color(), Color::rgb(9, 9, 9));
        assert_eq!(child.font_size(), 20.0);
        assert_eq!(child.background_color(), Color::TRANSPARENT);
    }

    #[test]
    fn line_height_number_scales_font_size() {
        let mut style = ComputedStyle::new();
        style.set("font-size", StyleValue::Length(10.0));
        style.set("line-height", StyleValue::Number(1.5));
        assert_eq!(style.line_height(), 15.0);
    }
}
