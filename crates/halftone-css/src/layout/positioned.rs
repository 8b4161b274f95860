//! Relative, absolute, and fixed positioning.
//!
//! [CSS 2.1 § 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
//!
//! Relative boxes lay out in normal flow and then shift; absolute and
//! fixed boxes leave the flow entirely and resolve their geometry from
//! the § 10.3.7 / § 10.6.4 constraint equations against their
//! containing block: the nearest positioned ancestor's padding box for
//! `absolute`, the viewport for `fixed`. An `auto` offset falls back to
//! the static position — where the box would have sat in normal flow.

use crate::style::{Side, StyleValue};

use super::LayoutContext;
use super::block;
use super::box_tree::LayoutBox;
use super::geometry::Rect;
use super::intrinsic;

/// Shift a relatively positioned box after normal-flow layout.
///
/// [§ 9.4.3](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning):
/// offsetting has no effect on following siblings; with both `left` and
/// `right` set, `left` wins (ltr), and symmetrically `top` beats
/// `bottom`.
pub fn apply_relative_offset(bx: &mut LayoutBox, cb: Rect) {
    let offset = |a: StyleValue, b: StyleValue, reference: f64| -> f64 {
        match (a.resolve(reference), b.resolve(reference)) {
            (Some(primary), _) => primary,
            (None, Some(secondary)) => -secondary,
            (None, None) => 0.0,
        }
    };
    let cb_height = if cb.height.is_finite() { cb.height } else { 0.0 };
    let dx = offset(
        bx.style.offset(Side::Left),
        bx.style.offset(Side::Right),
        cb.width,
    );
    let dy = offset(
        bx.style.offset(Side::Top),
        bx.style.offset(Side::Bottom),
        cb_height,
    );
    bx.translate(dx, dy);
}

/// Lay out an absolutely or fixed positioned box.
///
/// `cb` is the containing block (a padding box or the viewport);
/// `static_pos` is the border-box position the box would have had in
/// normal flow, used when offsets are `auto`.
pub fn layout_out_of_flow(
    bx: &mut LayoutBox,
    ctx: &LayoutContext,
    cb: Rect,
    static_pos: (f64, f64),
) {
    let cb = if bx.style.position() == crate::style::Position::Fixed {
        ctx.viewport
    } else {
        cb
    };

    let style = bx.style.clone();
    let cb_height = if cb.height.is_finite() { cb.height } else { ctx.viewport.height };

    // ── Horizontal: § 10.3.7 ─────────────────────────────────────────
    // 'left' + 'margin-left' + 'border-left-width' + 'padding-left'
    // + 'width' + … + 'right' = width of containing block
    let left = style.offset(Side::Left).resolve(cb.width);
    let right = style.offset(Side::Right).resolve(cb.width);
    let margin_left = style.margin(Side::Left).resolve(cb.width).unwrap_or(0.0);
    let margin_right = style.margin(Side::Right).resolve(cb.width).unwrap_or(0.0);
    let h_edges = style.padding(Side::Left, cb.width)
        + style.padding(Side::Right, cb.width)
        + style.border_width(Side::Left)
        + style.border_width(Side::Right);

    let specified_width = match style.width() {
        StyleValue::Auto => {
            if let Some((natural_w, _)) = bx.intrinsic_size.filter(|_| bx.image_src.is_some()) {
                Some(natural_w)
            } else {
                None
            }
        }
        value => value.resolve(cb.width),
    };

    let static_left = static_pos.0 - cb.x;

    let (content_width, border_left) = match (left, specified_width, right) {
        // All three auto: static position, shrink-to-fit width.
        (None, None, None) => {
            let width = shrink_to_fit(bx, ctx, cb.width, h_edges);
            (width, static_left)
        }
        // Width solved from both offsets.
        (Some(l), None, Some(r)) => {
            let width = (cb.width - l - r - margin_left - margin_right - h_edges).max(0.0);
            (width, l + margin_left)
        }
        // Left + width: right over-constrains and is ignored (ltr).
        (Some(l), Some(w), _) => (w, l + margin_left),
        // Right + width: solve left.
        (None, Some(w), Some(r)) => {
            let l = cb.width - r - w - margin_left - margin_right - h_edges;
            (w, l + margin_left)
        }
        // Width alone: static left.
        (None, Some(w), None) => (w, static_left),
        // Left alone: shrink-to-fit from the left offset.
        (Some(l), None, None) => {
            let width = shrink_to_fit(bx, ctx, (cb.width - l).max(0.0), h_edges);
            (width, l + margin_left)
        }
        // Right alone: shrink-to-fit, anchored to the right edge.
        (None, None, Some(r)) => {
            let width = shrink_to_fit(bx, ctx, (cb.width - r).max(0.0), h_edges);
            let l = cb.width - r - width - margin_left - margin_right - h_edges;
            (width, l + margin_left)
        }
    };

    // ── Vertical: § 10.6.4 ───────────────────────────────────────────
    let top = style.offset(Side::Top).resolve(cb_height);
    let bottom = style.offset(Side::Bottom).resolve(cb_height);
    let margin_top = style.margin(Side::Top).resolve(cb.width).unwrap_or(0.0);
    let margin_bottom = style.margin(Side::Bottom).resolve(cb.width).unwrap_or(0.0);
    let v_edges = style.padding(Side::Top, cb.width)
        + style.padding(Side::Bottom, cb.width)
        + style.border_width(Side::Top)
        + style.border_width(Side::Bottom);

    let specified_height = match style.height() {
        StyleValue::Length(px) => Some(px),
        StyleValue::Percentage(f) => Some(f * cb_height),
        _ => None,
    };

    let static_top = static_pos.1 - cb.y;
    let border_top = match (top, specified_height, bottom) {
        (Some(t), _, _) => t + margin_top,
        (None, Some(h), Some(b)) => cb_height - b - h - margin_top - margin_bottom - v_edges + margin_top,
        (None, None, Some(_)) => {
            // Height unknown until contents lay out; resolved below.
            f64::NAN
        }
        (None, _, None) => static_top,
    };

    // Lay out contents with the resolved width at a provisional
    // vertical position, then settle the final y.
    let provisional_top = if border_top.is_nan() { static_top } else { border_top };
    block::layout_sized_block(
        bx,
        content_width.max(0.0),
        cb,
        cb.x + border_left,
        cb.y + provisional_top,
        ctx,
        cb,
    );

    if let Some(h) = specified_height {
        bx.rect.height = h.max(0.0);
    }

    if border_top.is_nan() {
        // `bottom` anchored with auto top and auto height: place so the
        // bottom margin edge meets the offset.
        let b = bottom.unwrap_or(0.0);
        let outer_height = bx.border_box().height + margin_top + margin_bottom;
        let final_top = cb_height - b - outer_height + margin_top;
        let delta = (cb.y + final_top) - bx.border_box().y;
        bx.translate(0.0, delta);
    }
}

/// Shrink-to-fit content width for out-of-flow boxes.
///
/// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width):
/// `min(max(preferred minimum, available), preferred)`, measured on the
/// border box and converted back to a content width.
fn shrink_to_fit(bx: &LayoutBox, ctx: &LayoutContext, available: f64, h_edges: f64) -> f64 {
    let preferred = intrinsic::preferred_width(bx, ctx.fonts);
    let minimum = intrinsic::minimum_width(bx, ctx.fonts);
    (minimum.max(available.min(preferred)) - h_edges).max(0.0)
}
