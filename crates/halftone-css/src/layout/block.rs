//! Block-level layout: normal flow of block boxes.
//!
//! [CSS 2.1 § 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! Boxes stack vertically from the top of their containing block.
//! Horizontal geometry follows the § 10.3.3 constraint equation
//! (`margin-left + border-left + padding-left + width + padding-right +
//! border-right + margin-right = cb width`); vertical stacking applies
//! the § 8.3.1 margin-collapsing rules: adjacent sibling margins
//! collapse sign-aware, a parent's margins collapse with its first/last
//! child's when nothing separates them, and margins meet straight
//! through empty blocks.

use crate::style::{ClearSide, ComputedStyle, Position, Side, StyleValue};

use super::LayoutContext;
use super::box_tree::{BoxKind, LayoutBox};
use super::float::FloatRegistry;
use super::fonts::measure_text;
use super::geometry::{EdgeSizes, Rect};
use super::inline;
use super::intrinsic;
use super::positioned;
use super::table;

/// [§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "The resulting margin width is the maximum of the collapsing
/// margins' widths"; negative margins take the most negative, and mixed
/// signs sum the two extremes.
#[must_use]
pub fn collapse_margins(a: f64, b: f64) -> f64 {
    if a >= 0.0 && b >= 0.0 {
        a.max(b)
    } else if a < 0.0 && b < 0.0 {
        a.min(b)
    } else {
        a + b
    }
}

/// Lay out the document: the viewport box's children fill the initial
/// containing block.
///
/// The initial containing block is a BFC root, so the root element's
/// collapsed top margin (its own plus anything that escaped through
/// `<body>`) offsets it from the canvas top instead of vanishing.
pub fn layout_root(root: &mut LayoutBox, ctx: &LayoutContext) {
    let viewport = root.rect;
    let mut floats = FloatRegistry::new(viewport);
    let children = std::mem::take(&mut root.children);
    let mut cursor = viewport.y;
    let mut out = Vec::with_capacity(children.len());
    for mut child in children {
        let top = effective_top_margin(&child, viewport.width);
        layout_in_flow_block(&mut child, viewport, cursor + top, ctx, &mut floats, viewport);
        cursor = child.border_box().bottom();
        if child.effective_position() == Position::Relative {
            positioned::apply_relative_offset(&mut child, viewport);
        }
        out.push(child);
    }
    root.children = out;
}

/// Resolve one margin side to px (`auto` counts as 0 here; the § 10.3.3
/// algebra in [`resolve_horizontal`] is where auto margins get values).
fn resolve_margin(style: &ComputedStyle, side: Side, cb_width: f64) -> f64 {
    style.margin(side).resolve(cb_width).unwrap_or(0.0)
}

/// Used padding for all four sides.
fn resolve_padding(style: &ComputedStyle, cb_width: f64) -> EdgeSizes {
    EdgeSizes {
        top: style.padding(Side::Top, cb_width),
        right: style.padding(Side::Right, cb_width),
        bottom: style.padding(Side::Bottom, cb_width),
        left: style.padding(Side::Left, cb_width),
    }
}

/// Used border widths for all four sides.
fn resolve_border(style: &ComputedStyle) -> EdgeSizes {
    EdgeSizes {
        top: style.border_width(Side::Top),
        right: style.border_width(Side::Right),
        bottom: style.border_width(Side::Bottom),
        left: style.border_width(Side::Left),
    }
}

/// Solve the horizontal constraint equation for a block-level box in
/// normal flow and fill in `margin`, `border`, `padding`, `rect.width`,
/// and `rect.x` (from `cb.x`).
///
/// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth):
/// at most one of `width`, `margin-left`, `margin-right` gives way when
/// the equation is over- or under-constrained; `margin: 0 auto`
/// centers.
pub fn resolve_horizontal(bx: &mut LayoutBox, cb: Rect) {
    let style = bx.style.clone();
    let cb_w = cb.width;

    let padding = resolve_padding(&style, cb_w);
    let border = resolve_border(&style);
    let edges = padding.horizontal() + border.horizontal();

    let margin_left_value = style.margin(Side::Left);
    let margin_right_value = style.margin(Side::Right);
    let left_auto = margin_left_value == StyleValue::Auto;
    let right_auto = margin_right_value == StyleValue::Auto;
    let mut margin_left = margin_left_value.resolve(cb_w).unwrap_or(0.0);
    let mut margin_right = margin_right_value.resolve(cb_w).unwrap_or(0.0);

    let width_value = style.width();
    // Replaced boxes with auto width use their intrinsic width and then
    // behave as if the width were specified.
    let intrinsic = (matches!(width_value, StyleValue::Auto) && bx.image_src.is_some())
        .then(|| bx.intrinsic_size.map_or(0.0, |(w, _)| w));

    let (mut width, width_is_auto) = match (&width_value, intrinsic) {
        (_, Some(natural)) => (natural, false),
        (StyleValue::Auto, None) => (
            (cb_w - margin_left - margin_right - edges).max(0.0),
            true,
        ),
        (value, None) => (value.resolve(cb_w).unwrap_or(0.0), false),
    };

    width = clamp_width(&style, width, cb_w);

    if !width_is_auto {
        let free = cb_w - width - edges;
        match (left_auto, right_auto) {
            // "If both 'margin-left' and 'margin-right' are 'auto',
            // their used values are equal" — this centers the box.
            (true, true) => {
                let half = (free / 2.0).max(0.0);
                margin_left = half;
                margin_right = half;
            }
            (true, false) => margin_left = free - margin_right,
            (false, true) => margin_right = free - margin_left,
            // Over-constrained: the right margin gives way (ltr).
            (false, false) => margin_right = free - margin_left,
        }
    }

    bx.padding = padding;
    bx.border = border;
    bx.margin.left = margin_left;
    bx.margin.right = margin_right;
    bx.margin.top = resolve_margin(&style, Side::Top, cb_w);
    bx.margin.bottom = resolve_margin(&style, Side::Bottom, cb_w);
    bx.rect.width = width;
    bx.rect.x = cb.x + margin_left + border.left + padding.left;
}

fn clamp_width(style: &ComputedStyle, width: f64, cb_w: f64) -> f64 {
    let mut w = width;
    if let Some(max) = style.max_width(cb_w) {
        w = w.min(max);
    }
    w.max(style.min_width(cb_w))
}

/// Lay out an in-flow block-level box whose border-box top edge sits at
/// `border_top_y`. The caller has already settled the margin above it.
pub fn layout_in_flow_block(
    bx: &mut LayoutBox,
    cb: Rect,
    border_top_y: f64,
    ctx: &LayoutContext,
    floats: &mut FloatRegistry,
    abs_cb: Rect,
) {
    resolve_horizontal(bx, cb);
    bx.rect.y = border_top_y + bx.border.top + bx.padding.top;

    // Blocks with inline content never let child margins escape; the
    // block-children path refines these when it applies.
    bx.collapsed_margin_top = bx.margin.top;
    bx.collapsed_margin_bottom = bx.margin.bottom;

    let content_height = layout_contents(bx, ctx, floats, abs_cb, cb);
    apply_height(bx, content_height, cb);
    // Relative offsets apply in the caller AFTER it has read this box's
    // flow position: the offset must not move later siblings.
}

/// Lay out a box whose content width and x position were decided by the
/// caller (floats, atomic inlines, table cells, absolutes): set edges,
/// run contents, resolve height. Auto margins are zero in these
/// contexts.
pub(crate) fn layout_sized_block(
    bx: &mut LayoutBox,
    content_width: f64,
    cb: Rect,
    border_left_x: f64,
    border_top_y: f64,
    ctx: &LayoutContext,
    abs_cb: Rect,
) {
    let style = bx.style.clone();
    bx.padding = resolve_padding(&style, cb.width);
    bx.border = resolve_border(&style);
    bx.margin = EdgeSizes {
        top: resolve_margin(&style, Side::Top, cb.width),
        right: resolve_margin(&style, Side::Right, cb.width),
        bottom: resolve_margin(&style, Side::Bottom, cb.width),
        left: resolve_margin(&style, Side::Left, cb.width),
    };
    bx.rect.width = content_width.max(0.0);
    bx.rect.x = border_left_x + bx.border.left + bx.padding.left;
    bx.rect.y = border_top_y + bx.border.top + bx.padding.top;
    bx.collapsed_margin_top = bx.margin.top;
    bx.collapsed_margin_bottom = bx.margin.bottom;

    // These boxes all establish their own formatting context; the
    // registry handed to contents is theirs.
    let mut own_floats = FloatRegistry::new(Rect::new(
        bx.rect.x,
        bx.rect.y,
        bx.rect.width,
        f64::INFINITY,
    ));
    let content_height = layout_contents(bx, ctx, &mut own_floats, abs_cb, cb);
    apply_height(bx, content_height, cb);

    if bx.effective_position() == Position::Relative {
        // Atomic boxes are flow roots of their own; the offset cannot
        // disturb siblings, so it applies here directly.
        positioned::apply_relative_offset(bx, cb);
    }
}

/// Resolve the used height: content height for `auto`, otherwise the
/// specified value, min/max clamped.
fn apply_height(bx: &mut LayoutBox, content_height: f64, cb: Rect) {
    let cb_height = if cb.height.is_finite() { cb.height } else { 0.0 };
    let mut height = match bx.style.height() {
        StyleValue::Length(px) => px,
        StyleValue::Percentage(f) if cb.height.is_finite() => f * cb_height,
        _ => {
            if bx.image_src.is_some() {
                replaced_auto_height(bx)
            } else {
                content_height
            }
        }
    };
    if let Some(max) = bx.style.max_height(cb_height) {
        height = height.min(max);
    }
    height = height.max(bx.style.min_height(cb_height));
    bx.rect.height = height.max(0.0);
}

/// Auto height of a replaced box: keep the intrinsic ratio against the
/// used width when both natural dimensions are known.
fn replaced_auto_height(bx: &LayoutBox) -> f64 {
    match bx.intrinsic_size {
        Some((w, h)) if w > 0.0 => bx.rect.width * h / w,
        Some((_, h)) => h,
        None => 0.0,
    }
}

/// Lay out a box's contents and return the content height. Dispatches
/// on what the box contains: a table grid, an inline formatting
/// context, or block flow.
pub(crate) fn layout_contents(
    bx: &mut LayoutBox,
    ctx: &LayoutContext,
    floats: &mut FloatRegistry,
    abs_cb: Rect,
    cb: Rect,
) -> f64 {
    // Positioned boxes are containing blocks for their positioned
    // descendants (the padding box).
    let abs_cb_for_children = if bx.effective_position().is_positioned() {
        padding_box_estimate(bx, cb)
    } else {
        abs_cb
    };

    if matches!(bx.kind, BoxKind::TableWrapper) {
        return table::layout_table_contents(bx, ctx, abs_cb_for_children);
    }

    // A marker never participates in its item's content flow; it is
    // positioned against the first line afterwards.
    let marker = extract_marker(bx);

    let mut own_floats;
    let (registry, is_own_bfc) = if bx.establishes_bfc() {
        own_floats = FloatRegistry::new(Rect::new(
            bx.rect.x,
            bx.rect.y,
            bx.rect.width,
            f64::INFINITY,
        ));
        (&mut own_floats, true)
    } else {
        (floats, false)
    };

    let mut content_height = if bx.establishes_ifc() {
        inline::layout_inline_content(bx, ctx, registry, abs_cb_for_children)
    } else {
        layout_block_children(bx, ctx, registry, abs_cb_for_children)
    };

    // A BFC root grows to contain its floated descendants.
    if is_own_bfc
        && let Some(bottom) = registry.max_bottom()
    {
        content_height = content_height.max(bottom - bx.rect.y);
    }

    if let Some(marker) = marker {
        place_marker(bx, marker, ctx);
    }

    content_height
}

/// The padding box with the best height estimate available mid-layout.
fn padding_box_estimate(bx: &LayoutBox, cb: Rect) -> Rect {
    let mut rect = bx.rect.expanded(&bx.padding);
    if rect.height <= 0.0 {
        rect.height = match bx.style.height() {
            StyleValue::Length(px) => px,
            StyleValue::Percentage(f) if cb.height.is_finite() => f * cb.height,
            _ => cb.height,
        };
    }
    rect
}

/// Normal block flow over the in-flow children, with margin collapsing.
/// Returns the content height.
fn layout_block_children(
    bx: &mut LayoutBox,
    ctx: &LayoutContext,
    floats: &mut FloatRegistry,
    abs_cb: Rect,
) -> f64 {
    let content = Rect::new(bx.rect.x, bx.rect.y, bx.rect.width, child_cb_height(bx));
    let cb = content;

    let parent_collapses_top =
        bx.padding.top == 0.0 && bx.border.top == 0.0 && !bx.establishes_bfc();
    let parent_collapses_bottom = bx.padding.bottom == 0.0
        && bx.border.bottom == 0.0
        && !bx.establishes_bfc()
        && matches!(bx.style.height(), StyleValue::Auto);

    bx.collapsed_margin_top = bx.margin.top;
    bx.collapsed_margin_bottom = bx.margin.bottom;

    let children = std::mem::take(&mut bx.children);
    let mut out: Vec<LayoutBox> = Vec::with_capacity(children.len());

    let mut cursor = content.y;
    // Margin accumulated since the last placed border edge. `None`
    // while still adjoining the parent's own top margin.
    let mut pending: Option<f64> = if parent_collapses_top { None } else { Some(0.0) };
    let mut last_bottom_margin = 0.0;
    let mut placed_any = false;

    for mut child in children {
        match child.kind {
            BoxKind::Positioned => {
                let static_pos = (content.x, cursor + pending.unwrap_or(0.0));
                positioned::layout_out_of_flow(&mut child, ctx, abs_cb, static_pos);
                out.push(child);
                continue;
            }
            BoxKind::Float => {
                let min_y = cursor + pending.unwrap_or(0.0);
                layout_float_box(&mut child, ctx, floats, abs_cb, min_y);
                out.push(child);
                continue;
            }
            _ => {}
        }

        let child_top = effective_top_margin(&child, content.width);

        // Clearance forces the box below prior floats and suppresses
        // the margin collapse that would otherwise apply.
        let clear = child.style.clear();
        let natural_y = match pending {
            Some(p) => cursor + collapse_margins(p, child_top),
            None => cursor,
        };
        let cleared_y = if clear == ClearSide::None {
            natural_y
        } else {
            floats.clearance_y(clear, natural_y)
        };
        let has_clearance = cleared_y > natural_y;

        if pending.is_none() && !has_clearance {
            // Still adjoining the parent's top margin: the child's top
            // margin escapes through the parent.
            bx.collapsed_margin_top = collapse_margins(bx.collapsed_margin_top, child_top);
            layout_in_flow_block(&mut child, cb, cursor, ctx, floats, abs_cb);
        } else {
            layout_in_flow_block(&mut child, cb, cleared_y, ctx, floats, abs_cb);
        }

        if is_empty_collapsible(&child) {
            // Margins meet straight through an empty block.
            let through =
                collapse_margins(child.collapsed_margin_top, child.collapsed_margin_bottom);
            match pending {
                Some(p) => pending = Some(collapse_margins(p, through)),
                None => {
                    bx.collapsed_margin_top =
                        collapse_margins(bx.collapsed_margin_top, child.collapsed_margin_bottom);
                }
            }
            out.push(child);
            continue;
        }

        cursor = child.border_box().bottom();
        last_bottom_margin = child.collapsed_margin_bottom;
        pending = Some(last_bottom_margin);
        placed_any = true;
        if child.effective_position() == Position::Relative {
            // Applied after the cursor advanced: siblings are placed as
            // if the box had not moved (CSS 2.1 § 9.4.3).
            positioned::apply_relative_offset(&mut child, cb);
        }
        out.push(child);
    }

    bx.children = out;

    let mut content_height = (cursor - content.y).max(0.0);
    if placed_any {
        if parent_collapses_bottom {
            bx.collapsed_margin_bottom =
                collapse_margins(bx.collapsed_margin_bottom, last_bottom_margin);
        } else {
            // The last child's margin stays inside the parent.
            content_height += last_bottom_margin.max(0.0);
        }
    }
    content_height
}

/// The height children should resolve percentage heights against.
fn child_cb_height(bx: &LayoutBox) -> f64 {
    match bx.style.height() {
        StyleValue::Length(px) => px,
        _ => f64::INFINITY,
    }
}

/// A block's effective top margin: its own, collapsed with whatever
/// pokes through from its first in-flow child (and through its own
/// empty self). Computable from styles alone, before layout.
pub(crate) fn effective_top_margin(bx: &LayoutBox, cb_width: f64) -> f64 {
    let mut margin = resolve_margin(&bx.style, Side::Top, cb_width);
    let collapses_into_first = bx.style.padding(Side::Top, cb_width) == 0.0
        && bx.style.border_width(Side::Top) == 0.0
        && !bx.establishes_bfc()
        && !bx.establishes_ifc();
    if collapses_into_first
        && let Some(first) = bx
            .children
            .iter()
            .find(|c| c.is_in_flow() && !matches!(c.kind, BoxKind::ListItemMarker))
        && !first.is_inline_level()
    {
        margin = collapse_margins(margin, effective_top_margin(first, cb_width));
    }
    margin
}

/// [§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins):
/// a box collapses through itself when it has no border, padding,
/// content, or height.
fn is_empty_collapsible(bx: &LayoutBox) -> bool {
    bx.rect.height == 0.0
        && bx.border.vertical() == 0.0
        && bx.padding.vertical() == 0.0
        && bx.children.is_empty()
        && matches!(bx.style.height(), StyleValue::Auto)
        && bx.style.min_height(0.0) == 0.0
}

/// Size and place one floated box against the registry.
///
/// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width):
/// floats with `width: auto` shrink to fit:
/// `min(max(preferred minimum, available), preferred)`.
pub(crate) fn layout_float_box(
    bx: &mut LayoutBox,
    ctx: &LayoutContext,
    floats: &mut FloatRegistry,
    abs_cb: Rect,
    min_y: f64,
) {
    size_float_box(bx, ctx, floats.content(), abs_cb);
    place_sized_float(bx, floats, min_y);
}

/// Resolve a float's size (shrink-to-fit for `width: auto`) and lay out
/// its contents at a provisional origin; [`place_sized_float`] moves it
/// to its real position once one is chosen.
pub(crate) fn size_float_box(bx: &mut LayoutBox, ctx: &LayoutContext, cb: Rect, abs_cb: Rect) {
    let style = bx.style.clone();

    let padding_and_border = style.padding(Side::Left, cb.width)
        + style.padding(Side::Right, cb.width)
        + style.border_width(Side::Left)
        + style.border_width(Side::Right);

    let content_width = match style.width() {
        StyleValue::Auto => {
            if let Some((natural_w, _)) = bx.intrinsic_size.filter(|_| bx.image_src.is_some()) {
                natural_w
            } else {
                let preferred = intrinsic::preferred_width(bx, ctx.fonts);
                let minimum = intrinsic::minimum_width(bx, ctx.fonts);
                let available = cb.width;
                (minimum.max(available.min(preferred)) - padding_and_border).max(0.0)
            }
        }
        value => value.resolve(cb.width).unwrap_or(0.0),
    };
    let content_width = clamp_width(&style, content_width, cb.width);

    layout_sized_block(bx, content_width, cb, cb.x, cb.y, ctx, abs_cb);
}

/// Place an already-sized float into the registry, honoring its own
/// `clear`, and move its subtree to the placed position.
pub(crate) fn place_sized_float(bx: &mut LayoutBox, floats: &mut FloatRegistry, min_y: f64) {
    let clear_min_y = floats.clearance_y(bx.style.clear(), min_y);
    let outer = bx.margin_box();
    let placed = floats.place(
        bx.style.float_side(),
        outer.width,
        outer.height,
        clear_min_y,
    );
    bx.translate(placed.x - outer.x, placed.y - outer.y);
}

/// Take the marker child out of a list item's children, if present.
fn extract_marker(bx: &mut LayoutBox) -> Option<LayoutBox> {
    let index = bx
        .children
        .iter()
        .position(|c| matches!(c.kind, BoxKind::ListItemMarker))?;
    Some(bx.children.remove(index))
}

/// Position a list marker in the item's left padding area, level with
/// the first line of content.
///
/// [CSS 2.1 § 12.5](https://www.w3.org/TR/CSS2/generate.html#lists)
fn place_marker(bx: &mut LayoutBox, mut marker: LayoutBox, ctx: &LayoutContext) {
    const MARKER_GAP: f64 = 8.0;

    let text = marker.text.clone().unwrap_or_default();
    if text.is_empty() {
        return;
    }
    let width = measure_text(&text, &marker.style, ctx.fonts);
    let line_height = marker.style.line_height();

    let first_line_y = first_line_top(bx).unwrap_or(bx.rect.y);
    marker.rect = Rect::new(
        bx.rect.x - width - MARKER_GAP,
        first_line_y,
        width,
        line_height,
    );
    let request = super::fonts::request_for(&marker.style);
    let content_height = ctx.fonts.ascent(&request) + ctx.fonts.descent(&request);
    marker.baseline_offset =
        Some((line_height - content_height) / 2.0 + ctx.fonts.ascent(&request));
    bx.children.insert(0, marker);
}

/// The top of the first line box in this subtree, if inline content
/// exists.
fn first_line_top(bx: &LayoutBox) -> Option<f64> {
    for child in &bx.children {
        match child.kind {
            BoxKind::LineBox { .. } => return Some(child.rect.y),
            BoxKind::Block | BoxKind::AnonymousBlock => {
                if let Some(y) = first_line_top(child) {
                    return Some(y);
                }
            }
            _ => {}
        }
    }
    None
}
