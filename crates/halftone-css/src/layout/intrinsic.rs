//! Intrinsic (content-based) width measurement.
//!
//! [CSS 2.1 § 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width):
//! shrink-to-fit width is
//! `min(max(preferred minimum, available), preferred)`. Floats,
//! inline-blocks, absolutely positioned boxes with `auto` width, and
//! table columns all need the two content measurements this module
//! computes.
//!
//! Both functions return **border-box** widths (content plus padding
//! and border); margins are the caller's concern. Percentage padding is
//! treated as zero here, since there is no containing block to resolve
//! it against during measurement.
//!
//! These are read-only measurements: no positions or sizes are stored.
//! Recursion is depth-capped so a pathological document cannot blow the
//! stack through measure-inside-layout nesting.

use crate::style::{Side, StyleValue};

use super::box_tree::{BoxKind, LayoutBox};
use super::fonts::{FontMetrics, measure_text};

/// Depth cap for measurement recursion. Boxes deeper than this measure
/// as zero width, which only softens shrink-to-fit for absurd nesting.
const MAX_MEASURE_DEPTH: usize = 64;

/// The max-content ("preferred") border-box width: wide enough that no
/// optional line break is taken.
#[must_use]
pub fn preferred_width(bx: &LayoutBox, fonts: &dyn FontMetrics) -> f64 {
    measure(bx, fonts, Mode::MaxContent, 0)
}

/// The min-content ("preferred minimum") border-box width: every break
/// opportunity taken, so the widest unbreakable unit wins.
#[must_use]
pub fn minimum_width(bx: &LayoutBox, fonts: &dyn FontMetrics) -> f64 {
    measure(bx, fonts, Mode::MinContent, 0)
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    MaxContent,
    MinContent,
}

fn measure(bx: &LayoutBox, fonts: &dyn FontMetrics, mode: Mode, depth: usize) -> f64 {
    if depth >= MAX_MEASURE_DEPTH {
        return 0.0;
    }

    // Text runs measure through the font.
    if let Some(text) = &bx.text {
        return match mode {
            Mode::MaxContent => measure_text(text, &bx.style, fonts),
            Mode::MinContent => widest_unbreakable(text, bx, fonts),
        };
    }

    let edges = horizontal_edges(bx);

    // Replaced content: the used or natural width.
    if bx.image_src.is_some() {
        let natural = bx.intrinsic_size.map_or(0.0, |(w, _)| w);
        let content = match bx.style.width() {
            StyleValue::Length(px) => px,
            _ => natural,
        };
        return content + edges;
    }

    // An explicit pixel width short-circuits content measurement.
    if let StyleValue::Length(px) = bx.style.width() {
        return px + edges;
    }

    let content = if bx.establishes_ifc() {
        match mode {
            // Max-content of inline content: everything on one line.
            Mode::MaxContent => bx
                .children
                .iter()
                .filter(|c| c.is_in_flow())
                .map(|c| measure(c, fonts, mode, depth + 1))
                .sum(),
            // Min-content: the widest single unbreakable piece.
            Mode::MinContent => bx
                .children
                .iter()
                .filter(|c| c.is_in_flow())
                .map(|c| measure(c, fonts, mode, depth + 1))
                .fold(0.0, f64::max),
        }
    } else {
        // Block-level children (floats included: they need room too).
        bx.children
            .iter()
            .filter(|c| !matches!(c.kind, BoxKind::Positioned))
            .map(|c| measure(c, fonts, mode, depth + 1) + margin_allowance(c))
            .fold(0.0, f64::max)
    };

    content + edges
}

/// The widest word of a text run (its min-content contribution), unless
/// the style forbids wrapping, in which case the whole run is one unit.
fn widest_unbreakable(text: &str, bx: &LayoutBox, fonts: &dyn FontMetrics) -> f64 {
    if !bx.style.white_space().wraps() {
        return measure_text(text, &bx.style, fonts);
    }
    text.split_whitespace()
        .map(|word| measure_text(word, &bx.style, fonts))
        .fold(0.0, f64::max)
}

/// Padding + border of the left and right sides, percentages as zero.
fn horizontal_edges(bx: &LayoutBox) -> f64 {
    let style = &bx.style;
    let padding = style.padding(Side::Left, 0.0) + style.padding(Side::Right, 0.0);
    let border = style.border_width(Side::Left) + style.border_width(Side::Right);
    padding + border
}

/// Fixed margins of a block-level contributor (auto and percentage
/// margins contribute nothing to intrinsic size).
fn margin_allowance(bx: &LayoutBox) -> f64 {
    let px = |side| match bx.style.margin(side) {
        StyleValue::Length(v) => v.max(0.0),
        _ => 0.0,
    };
    px(Side::Left) + px(Side::Right)
}
