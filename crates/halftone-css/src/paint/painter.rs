//! The painter: positioned box tree → paint list.
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! Within each stacking context, layers emit back to front:
//!
//! 1. background and borders of the establishing box,
//! 2. child contexts with negative stack levels, ascending,
//! 3. in-flow, non-inline, non-positioned descendants' backgrounds and
//!    borders,
//! 4. non-positioned floats (each with its whole subtree),
//! 5. in-flow inline content: wrapper backgrounds, text, decorations,
//!    atomic inline boxes,
//! 6. positioned descendants with `z-index: auto`/`0`, document order,
//! 7. child contexts with positive stack levels, ascending.
//!
//! The walk never mutates boxes. Opacity and transforms wrap their
//! context in `Push…`/`Pop` scopes; non-`visible` overflow clips the
//! descendant layers to the padding box.

use crate::layout::{BoxKind, LayoutBox, Rect};
use crate::style::{Color, Overflow, Side};

use super::display_list::{BorderSide, FontStyleSpec, Matrix, PaintList, PaintOp};
use super::stacking::{AutoLevelEntry, StackingContext, build_stacking_tree, establishes_context};

/// Flatten a laid-out box tree into a paint list.
#[must_use]
pub fn paint_tree(root: &LayoutBox) -> PaintList {
    let mut list = PaintList::new();
    let tree = build_stacking_tree(root);
    paint_context(&tree, &mut list);
    list
}

/// Paint one stacking context per the Appendix E layer order.
fn paint_context(ctx: &StackingContext<'_>, list: &mut PaintList) {
    let bx = ctx.root;

    let transforms = bx.style.transform();
    let has_transform = !transforms.is_empty();
    if has_transform {
        let border_box = bx.border_box();
        let (ox, oy) = bx.style.transform_origin();
        let origin = (
            border_box.x + ox.resolve(border_box.width).unwrap_or(0.0),
            border_box.y + oy.resolve(border_box.height).unwrap_or(0.0),
        );
        list.push(PaintOp::PushTransform(Matrix::from_transform_list(
            transforms, origin, border_box,
        )));
    }
    let opacity = bx.style.opacity();
    let has_opacity = opacity < 1.0;
    if has_opacity {
        list.push(PaintOp::PushOpacity(opacity));
    }

    // Layer 1: the establishing box itself.
    paint_box_decoration(bx, list);

    let clips = bx.style.overflow() != Overflow::Visible;
    if clips {
        list.push(PaintOp::PushClip {
            rect: bx.padding_box(),
            radius: bx.style.border_radius(),
        });
    }

    // Layer 2.
    for child in &ctx.negative {
        paint_context(child, list);
    }
    // Layers 3–5.
    walk_block_level(bx, list);
    walk_floats(bx, list);
    walk_inline(bx, list);
    // Layer 6.
    for entry in &ctx.auto_level {
        match entry {
            AutoLevelEntry::Positioned(positioned) => paint_as_unit(positioned, list),
            AutoLevelEntry::Context(child) => paint_context(child, list),
        }
    }
    // Layer 7.
    for child in &ctx.positive {
        paint_context(child, list);
    }

    if clips {
        list.push(PaintOp::Pop);
    }
    if has_opacity {
        list.push(PaintOp::Pop);
    }
    if has_transform {
        list.push(PaintOp::Pop);
    }
}

/// Paint a subtree atomically (floats, atomic inlines, positioned boxes
/// with `z-index: auto`): it behaves as a stacking context of its own.
fn paint_as_unit(bx: &LayoutBox, list: &mut PaintList) {
    let tree = build_stacking_tree(bx);
    paint_context(&tree, list);
}

/// Whether the painter's in-context walks may enter this child at all.
fn stays_in_context(child: &LayoutBox) -> bool {
    !establishes_context(child)
        && !matches!(child.kind, BoxKind::Positioned)
        && !child.effective_position().is_positioned()
}

/// Run `walk` over a child's subtree inside its overflow clip, when it
/// has one. Context-establishing boxes handle their clip in
/// [`paint_context`]; this covers plain block containers.
fn walk_clipped(
    child: &LayoutBox,
    list: &mut PaintList,
    walk: fn(&LayoutBox, &mut PaintList),
) {
    let clips = child.style.overflow() != Overflow::Visible;
    if clips {
        list.push(PaintOp::PushClip {
            rect: child.padding_box(),
            radius: child.style.border_radius(),
        });
    }
    walk(child, list);
    if clips {
        list.push(PaintOp::Pop);
    }
}

/// Layer 3: backgrounds and borders of in-flow block-level descendants.
fn walk_block_level(bx: &LayoutBox, list: &mut PaintList) {
    for child in &bx.children {
        if !stays_in_context(child) || matches!(child.kind, BoxKind::Float) {
            continue;
        }
        match child.kind {
            BoxKind::Block
            | BoxKind::TableWrapper
            | BoxKind::TableRow
            | BoxKind::TableCell { .. } => {
                paint_box_decoration(child, list);
                walk_clipped(child, list, walk_block_level);
            }
            BoxKind::AnonymousBlock => {
                // Engine-generated: nothing of its own to paint.
                walk_block_level(child, list);
            }
            _ => {}
        }
    }
}

/// Layer 4: floats, each painted with its whole subtree.
fn walk_floats(bx: &LayoutBox, list: &mut PaintList) {
    for child in &bx.children {
        if child.effective_position().is_positioned() || establishes_context(child) {
            continue;
        }
        match child.kind {
            BoxKind::Float => paint_as_unit(child, list),
            // Anonymous boxes borrow their parent's style; overflow on
            // it belongs to the parent, so they never clip.
            BoxKind::AnonymousBlock => walk_floats(child, list),
            BoxKind::Block
            | BoxKind::TableWrapper
            | BoxKind::TableRow
            | BoxKind::TableCell { .. } => walk_clipped(child, list, walk_floats),
            _ => {}
        }
    }
}

/// Layer 5: inline content — line boxes and list markers.
fn walk_inline(bx: &LayoutBox, list: &mut PaintList) {
    for child in &bx.children {
        if !stays_in_context(child) || matches!(child.kind, BoxKind::Float) {
            continue;
        }
        match &child.kind {
            BoxKind::LineBox { .. } => paint_line(child, list),
            BoxKind::ListItemMarker => paint_text_fragment(child, list),
            BoxKind::AnonymousBlock => walk_inline(child, list),
            BoxKind::Block
            | BoxKind::TableWrapper
            | BoxKind::TableRow
            | BoxKind::TableCell { .. } => walk_clipped(child, list, walk_inline),
            _ => {}
        }
    }
}

/// Paint the fragments of one line box, in document order: each inline
/// wrapper precedes its content, so backgrounds land under text.
fn paint_line(line: &LayoutBox, list: &mut PaintList) {
    for fragment in &line.children {
        match &fragment.kind {
            BoxKind::Inline => {
                // Wrapper fragment: the inline element's paintable body.
                paint_box_decoration(fragment, list);
            }
            BoxKind::AnonymousInline => paint_text_fragment(fragment, list),
            BoxKind::AtomicInline | BoxKind::TableWrapper | BoxKind::PseudoContent => {
                paint_as_unit(fragment, list);
            }
            _ => {}
        }
    }
}

/// Shadows, background, and border of one box.
///
/// Backgrounds fill the padding box (`background-origin: padding-box`);
/// outer shadows paint below the background, inner shadows above it.
fn paint_box_decoration(bx: &LayoutBox, list: &mut PaintList) {
    if !bx.style.is_visible() {
        return;
    }
    // Anonymous and text boxes carry a borrowed style whose backgrounds
    // belong to the original element, not to them.
    if matches!(
        bx.kind,
        BoxKind::AnonymousBlock | BoxKind::AnonymousInline | BoxKind::LineBox { .. }
    ) {
        return;
    }

    let padding_box = bx.padding_box();
    let border_box = bx.border_box();
    let radius = bx.style.border_radius();

    for shadow in bx.style.box_shadow().iter().rev().filter(|s| !s.inset) {
        paint_shadow(shadow, border_box, radius, list);
    }

    let background = bx.style.background_color();
    if !background.is_transparent() {
        list.push(PaintOp::FillRect {
            rect: padding_box,
            color: background,
            radius,
        });
    }
    if let Some(src) = bx.style.background_image() {
        list.push(PaintOp::DrawImage {
            rect: padding_box,
            src: src.to_string(),
        });
    }

    for shadow in bx.style.box_shadow().iter().rev().filter(|s| s.inset) {
        paint_shadow(shadow, border_box, radius, list);
    }

    paint_borders(bx, border_box, radius, list);

    // Replaced content fills the content box.
    if let Some(src) = &bx.image_src {
        list.push(PaintOp::DrawImage {
            rect: bx.rect,
            src: src.clone(),
        });
    }
}

/// A blur approximation: the shadow paints as stacked translucent
/// layers stepping outward across the blur radius, alpha falling off
/// linearly. Not a Gaussian.
fn paint_shadow(
    shadow: &crate::style::BoxShadow,
    border_box: Rect,
    radius: f64,
    list: &mut PaintList,
) {
    const LAYERS: usize = 4;

    let base = Rect {
        x: border_box.x + shadow.offset_x - shadow.spread,
        y: border_box.y + shadow.offset_y - shadow.spread,
        width: border_box.width + 2.0 * shadow.spread,
        height: border_box.height + 2.0 * shadow.spread,
    };

    if shadow.blur <= 0.0 {
        list.push(PaintOp::FillRect {
            rect: base,
            color: shadow.color,
            radius,
        });
        return;
    }

    let step = shadow.blur / LAYERS as f64;
    for layer in 0..LAYERS {
        let inset = shadow.blur / 2.0 - step * layer as f64;
        let alpha = f64::from(shadow.color.a) / LAYERS as f64 * (1.0 - layer as f64 / LAYERS as f64 + 0.5);
        let color = Color {
            a: alpha.clamp(0.0, 255.0) as u8,
            ..shadow.color
        };
        list.push(PaintOp::FillRect {
            rect: Rect {
                x: base.x - inset,
                y: base.y - inset,
                width: base.width + 2.0 * inset,
                height: base.height + 2.0 * inset,
            },
            color,
            radius: radius + inset.max(0.0),
        });
    }
}

/// Emit the border ring when any side paints.
fn paint_borders(bx: &LayoutBox, border_box: Rect, radius: f64, list: &mut PaintList) {
    let side = |s: Side, width: f64| BorderSide {
        width,
        style: bx.style.border_style(s),
        color: bx.style.border_color(s),
    };
    let sides = [
        side(Side::Top, bx.border.top),
        side(Side::Right, bx.border.right),
        side(Side::Bottom, bx.border.bottom),
        side(Side::Left, bx.border.left),
    ];
    let any_visible = sides
        .iter()
        .any(|s| s.width > 0.0 && s.style.is_visible() && !s.color.is_transparent());
    if any_visible {
        list.push(PaintOp::StrokeBorder {
            rect: border_box,
            sides,
            radius,
        });
    }
}

/// Glyphs plus text-decoration lines for a text-carrying fragment.
fn paint_text_fragment(fragment: &LayoutBox, list: &mut PaintList) {
    if !fragment.style.is_visible() {
        return;
    }
    let Some(text) = &fragment.text else {
        return;
    };
    if text.is_empty() {
        return;
    }

    let style = &fragment.style;
    let size = style.font_size();
    let color = style.color();
    let baseline = fragment.rect.y + fragment.baseline_offset.unwrap_or(size * 0.8);

    let decoration = style.text_decoration();
    if decoration.any() {
        let thickness = (size / 14.0).max(1.0);
        let mut line_at = |y: f64| {
            list.push(PaintOp::FillRect {
                rect: Rect::new(fragment.rect.x, y, fragment.rect.width, thickness),
                color,
                radius: 0.0,
            });
        };
        if decoration.underline {
            line_at(baseline + size * 0.12);
        }
        if decoration.overline {
            line_at(baseline - size * 0.85);
        }
        if decoration.line_through {
            line_at(baseline - size * 0.3);
        }
    }

    list.push(PaintOp::DrawGlyphs {
        origin: (fragment.rect.x, baseline),
        font: FontStyleSpec {
            weight: style.font_weight(),
            italic: style.is_italic(),
            monospace: style.is_monospace(),
        },
        size,
        color,
        text: text.clone(),
    });
}

/// The canvas background: white, plus the root element's background
/// color when it sets one (the nearest thing to background propagation
/// this renderer does).
#[must_use]
pub fn canvas_background(root: &LayoutBox) -> Color {
    let html_background = root
        .children
        .first()
        .map(|html| html.style.background_color())
        .filter(|c| !c.is_transparent());
    html_background.unwrap_or(Color::WHITE)
}
