//! Inline formatting: the multi-pass line layout engine.
//!
//! [CSS 2.1 § 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! Three phases per IFC root:
//!
//! - **Phase A** flattens the inline subtree, in document order, to a
//!   list of atoms: open/close markers for inline elements, measured
//!   words and spaces, atomic inline boxes, floats, block-in-inline
//!   interruptions, and forced breaks.
//! - **Phase B** breaks atoms into lines. Each line queries the float
//!   registry for the available band at its y; a float committed
//!   mid-line updates the band immediately, and a float that no longer
//!   fits is deferred below the line. The decision for a line depends
//!   only on the band at its starting y — a line that later grows
//!   taller does not move; only the next line sees the new band.
//! - **Phase C** turns each broken line into a [`BoxKind::LineBox`]
//!   child holding positioned fragments: text runs, atomic boxes, and
//!   inline wrapper fragments carrying backgrounds/borders, with
//!   `vertical-align` and `text-align` applied.
//!
//! The single-pass diagnostic mode skips the band queries (every line
//! spans the full content width); everything else is shared.

use std::rc::Rc;

use halftone_dom::NodeId;

use crate::style::{ComputedStyle, Keyword, Side, StyleValue, TextAlign, VerticalAlign};

use super::LayoutContext;
use super::box_tree::{BoxKind, LayoutBox};
use super::float::FloatRegistry;
use super::fonts::{FontMetrics, FontRequest, measure_text, request_for};
use super::geometry::{EdgeSizes, Rect};
use super::intrinsic;
use super::positioned;
use super::{InlineMode, block};

/// One unit of inline content after Phase A flattening.
enum Atom {
    /// An inline element opens; advances by its left margin+border+
    /// padding on the line where it opens.
    Open {
        style: Rc<ComputedStyle>,
        node: Option<NodeId>,
    },
    /// The matching close; advances by the right edge.
    Close,
    /// A measured word (no break opportunities inside).
    Word {
        text: String,
        style: Rc<ComputedStyle>,
        width: f64,
    },
    /// A breakable space (collapsed to a single advance).
    Space {
        style: Rc<ComputedStyle>,
        width: f64,
    },
    /// An atomic inline-level box (inline-block, image, inline-table).
    Atomic(LayoutBox),
    /// A float encountered in inline content.
    Float(LayoutBox),
    /// A block-level box inside the inline flow: terminates the current
    /// line, lays out as a sibling block, and inline flow resumes below.
    BlockInInline(LayoutBox),
    /// An absolutely positioned box; takes its static position from the
    /// current line cursor.
    OutOfFlow(LayoutBox),
    /// A forced line break (`<br>` or a preserved newline).
    Break,
    /// A slot whose box has been consumed.
    Taken,
}

impl Atom {
    /// Move the contained box out, leaving a `Taken` marker.
    fn take_box(&mut self) -> Option<LayoutBox> {
        let taken = std::mem::replace(self, Atom::Taken);
        match taken {
            Atom::Atomic(bx) | Atom::Float(bx) | Atom::BlockInInline(bx) | Atom::OutOfFlow(bx) => {
                Some(bx)
            }
            other => {
                *self = other;
                None
            }
        }
    }
}

/// One accepted item on a line being assembled, with its x-advance
/// relative to the line's left edge.
struct LineItem {
    rel_x: f64,
    width: f64,
    data: ItemData,
}

enum ItemData {
    Text {
        text: String,
        style: Rc<ComputedStyle>,
    },
    Atomic(LayoutBox),
    Open {
        style: Rc<ComputedStyle>,
        node: Option<NodeId>,
        /// First fragment of the element: paints the left border edge.
        has_left_edge: bool,
    },
    Close {
        has_right_edge: bool,
    },
}

/// Lay out the inline content of `root` (whose in-flow children are all
/// inline-level). Replaces the children with line boxes plus any
/// interleaved blocks, floats, and positioned boxes. Returns the
/// content height.
pub fn layout_inline_content(
    root: &mut LayoutBox,
    ctx: &LayoutContext,
    floats: &mut FloatRegistry,
    abs_cb: Rect,
) -> f64 {
    let content = root.rect;
    let root_style = Rc::clone(&root.style);
    let children = std::mem::take(&mut root.children);

    let mut atoms = Vec::new();
    flatten_children(children, &mut atoms, ctx);

    let multipass = ctx.options.inline_mode == InlineMode::MultiPass;
    let strut_height = root_style.line_height();
    let text_align = root_style.text_align();
    let text_indent = root_style.text_indent(content.width);

    let mut out: Vec<LayoutBox> = Vec::new();
    let mut deferred_floats: Vec<LayoutBox> = Vec::new();
    // Elements opened on an earlier line continue as fresh fragments on
    // each following line.
    let mut open_elements: Vec<(Rc<ComputedStyle>, Option<NodeId>)> = Vec::new();
    let mut emitted_first_line = false;

    let mut y = content.y;
    let mut i = 0;

    while i < atoms.len() || !deferred_floats.is_empty() {
        // Floats deferred past the previous line place first; they
        // shape this line's band.
        for mut float_box in deferred_floats.drain(..) {
            block::place_sized_float(&mut float_box, floats, y);
            out.push(float_box);
        }
        if i >= atoms.len() {
            break;
        }

        let (band_left, band_right) = if multipass {
            floats.band(y, strut_height)
        } else {
            (content.x, content.right())
        };
        let indent = if emitted_first_line { 0.0 } else { text_indent };
        // `left`/`available` adopt the updated band when a float commits
        // mid-line ("retry step 1"): rel positions shift as one.
        let mut left = band_left + indent;
        let mut available = (band_right - left).max(0.0);
        let band_is_narrowed = band_left > content.x || band_right < content.right();

        let mut items: Vec<LineItem> = Vec::new();
        let mut cursor = 0.0;
        let mut has_content = false;
        let mut forced_break = false;
        let mut restart_line = false;

        // Continuation fragments for elements still open.
        for (style, node) in &open_elements {
            items.push(LineItem {
                rel_x: cursor,
                width: 0.0,
                data: ItemData::Open {
                    style: Rc::clone(style),
                    node: *node,
                    has_left_edge: false,
                },
            });
        }

        while i < atoms.len() {
            match &mut atoms[i] {
                Atom::Taken => {
                    i += 1;
                }
                Atom::Open { style, node } => {
                    let edge = left_edge(style, content.width);
                    items.push(LineItem {
                        rel_x: cursor,
                        width: edge,
                        data: ItemData::Open {
                            style: Rc::clone(style),
                            node: *node,
                            has_left_edge: true,
                        },
                    });
                    open_elements.push((Rc::clone(style), *node));
                    cursor += edge;
                    i += 1;
                }
                Atom::Close => {
                    let edge = open_elements
                        .last()
                        .map_or(0.0, |(style, _)| right_edge(style, content.width));
                    let _ = open_elements.pop();
                    items.push(LineItem {
                        rel_x: cursor,
                        width: edge,
                        data: ItemData::Close {
                            has_right_edge: true,
                        },
                    });
                    cursor += edge;
                    i += 1;
                }
                Atom::Word { text, style, width } => {
                    let fits = cursor + *width <= available;
                    let wraps = style.white_space().wraps();
                    if !fits && wraps && has_content {
                        break; // soft break before this word
                    }
                    if !fits && wraps && !has_content && multipass && band_is_narrowed {
                        if let Some(next) = floats.next_edge_below(y) {
                            // Shift the whole (empty) line below the
                            // floats and retry with a wider band.
                            y = next;
                            restart_line = true;
                            break;
                        }
                    }
                    // Fits, or an unbreakable overflow on its own line.
                    items.push(LineItem {
                        rel_x: cursor,
                        width: *width,
                        data: ItemData::Text {
                            text: std::mem::take(text),
                            style: Rc::clone(style),
                        },
                    });
                    cursor += *width;
                    has_content = true;
                    i += 1;
                }
                Atom::Space { style, width } => {
                    if !has_content {
                        // Collapsible space at the start of a line is
                        // removed.
                        i += 1;
                        continue;
                    }
                    items.push(LineItem {
                        rel_x: cursor,
                        width: *width,
                        data: ItemData::Text {
                            text: " ".to_string(),
                            style: Rc::clone(style),
                        },
                    });
                    cursor += *width;
                    i += 1;
                }
                slot @ Atom::Atomic(_) => {
                    let mut atomic = slot.take_box().expect("atomic slot holds a box");
                    size_atomic(&mut atomic, ctx, content, abs_cb);
                    let outer = atomic.margin_box();
                    let fits = cursor + outer.width <= available;
                    if !fits && has_content {
                        // Atomics never split; the whole box wraps.
                        atoms[i] = Atom::Atomic(atomic);
                        break;
                    }
                    if !fits && !has_content && multipass && band_is_narrowed {
                        if let Some(next) = floats.next_edge_below(y) {
                            atoms[i] = Atom::Atomic(atomic);
                            y = next;
                            restart_line = true;
                            break;
                        }
                    }
                    items.push(LineItem {
                        rel_x: cursor,
                        width: outer.width,
                        data: ItemData::Atomic(atomic),
                    });
                    cursor += outer.width;
                    has_content = true;
                    i += 1;
                }
                slot @ Atom::Float(_) => {
                    let mut float_box = slot.take_box().expect("float slot holds a box");
                    i += 1;
                    block::size_float_box(&mut float_box, ctx, floats.content(), abs_cb);
                    let outer = float_box.margin_box();
                    if !has_content {
                        // Empty line: place now (the registry walks down
                        // on its own if nothing fits at y) and restart
                        // against the new band.
                        block::place_sized_float(&mut float_box, floats, y);
                        out.push(float_box);
                        restart_line = true;
                        break;
                    }
                    if cursor + outer.width <= available {
                        // Fits beside the current line: commit it and
                        // retry against the updated band — the accepted
                        // items shift as a group to the new left edge.
                        block::place_sized_float(&mut float_box, floats, y);
                        out.push(float_box);
                        let (new_left, new_right) = floats.band(y, strut_height);
                        if new_left + indent + cursor <= new_right {
                            left = new_left + indent;
                            available = (new_right - left).max(0.0);
                            continue;
                        }
                        // The committed float displaced this line's
                        // content; close the line here.
                        break;
                    }
                    // Too wide to share the line: defer below it.
                    deferred_floats.push(float_box);
                }
                slot @ Atom::BlockInInline(_) => {
                    if has_content {
                        break; // emit the current line first
                    }
                    let mut block_box = slot.take_box().expect("block slot holds a box");
                    i += 1;
                    // The block interrupts the inline flow at full
                    // content width.
                    let cb = Rect::new(content.x, y, content.width, f64::INFINITY);
                    let top = block::effective_top_margin(&block_box, content.width);
                    block::layout_in_flow_block(&mut block_box, cb, y + top, ctx, floats, abs_cb);
                    y = block_box.border_box().bottom() + block_box.collapsed_margin_bottom;
                    if block_box.effective_position() == crate::style::Position::Relative {
                        positioned::apply_relative_offset(&mut block_box, cb);
                    }
                    out.push(block_box);
                    restart_line = true;
                    break;
                }
                slot @ Atom::OutOfFlow(_) => {
                    let mut positioned_box = slot.take_box().expect("positioned slot holds a box");
                    i += 1;
                    positioned::layout_out_of_flow(
                        &mut positioned_box,
                        ctx,
                        abs_cb,
                        (left + cursor, y),
                    );
                    out.push(positioned_box);
                }
                Atom::Break => {
                    i += 1;
                    forced_break = true;
                    break;
                }
            }
        }

        if restart_line {
            continue;
        }

        let line_is_empty = !has_content && items.iter().all(|item| item.width == 0.0);
        if line_is_empty && !forced_break {
            continue;
        }

        let line = build_line(
            items,
            left,
            available,
            y,
            &root_style,
            text_align,
            strut_height,
            ctx.fonts,
        );
        y += line.rect.height;
        emitted_first_line = true;
        out.push(line);
    }

    root.children = out;
    (y - content.y).max(0.0)
}

/// Left margin+border+padding advance of an inline element.
fn left_edge(style: &ComputedStyle, cb_width: f64) -> f64 {
    style.margin(Side::Left).resolve(cb_width).unwrap_or(0.0)
        + style.border_width(Side::Left)
        + style.padding(Side::Left, cb_width)
}

/// Right margin+border+padding advance of an inline element.
fn right_edge(style: &ComputedStyle, cb_width: f64) -> f64 {
    style.margin(Side::Right).resolve(cb_width).unwrap_or(0.0)
        + style.border_width(Side::Right)
        + style.padding(Side::Right, cb_width)
}

/// Size an atomic inline box: explicit width, intrinsic for replaced
/// content, shrink-to-fit otherwise.
///
/// [§ 10.3.9](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width)
fn size_atomic(bx: &mut LayoutBox, ctx: &LayoutContext, content: Rect, abs_cb: Rect) {
    let style = bx.style.clone();
    let padding_and_border = style.padding(Side::Left, content.width)
        + style.padding(Side::Right, content.width)
        + style.border_width(Side::Left)
        + style.border_width(Side::Right);

    let content_width = match style.width() {
        StyleValue::Auto => {
            if let Some((natural_w, _)) = bx.intrinsic_size.filter(|_| bx.image_src.is_some()) {
                natural_w
            } else {
                let preferred = intrinsic::preferred_width(bx, ctx.fonts);
                let minimum = intrinsic::minimum_width(bx, ctx.fonts);
                (minimum.max(content.width.min(preferred)) - padding_and_border).max(0.0)
            }
        }
        value => value.resolve(content.width).unwrap_or(0.0),
    };

    // Provisional origin: Phase C translates the subtree into place.
    block::layout_sized_block(bx, content_width, content, 0.0, 0.0, ctx, abs_cb);
}

/// Phase A: flatten the inline box subtree to atoms.
fn flatten_children(children: Vec<LayoutBox>, atoms: &mut Vec<Atom>, ctx: &LayoutContext) {
    for child in children {
        flatten_box(child, atoms, ctx);
    }
}

fn flatten_box(child: LayoutBox, atoms: &mut Vec<Atom>, ctx: &LayoutContext) {
    match child.kind {
        BoxKind::AnonymousInline => {
            if let Some(text) = child.text.clone() {
                flatten_text(&text, &child.style, atoms, ctx);
            }
        }
        BoxKind::PseudoContent => {
            if child.image_src.is_some() {
                atoms.push(Atom::Atomic(child));
            } else if let Some(text) = child.text.clone() {
                // The pseudo box's background/decoration paints via a
                // wrapper span around its text.
                atoms.push(Atom::Open {
                    style: Rc::clone(&child.style),
                    node: child.node,
                });
                flatten_text(&text, &child.style, atoms, ctx);
                atoms.push(Atom::Close);
            }
        }
        BoxKind::Inline => {
            // The builder marks `<br>` with a newline sentinel.
            if child.text.as_deref() == Some("\n") && child.children.is_empty() {
                atoms.push(Atom::Break);
                return;
            }
            atoms.push(Atom::Open {
                style: Rc::clone(&child.style),
                node: child.node,
            });
            flatten_children(child.children, atoms, ctx);
            atoms.push(Atom::Close);
        }
        BoxKind::AtomicInline | BoxKind::TableWrapper if child.is_inline_level() => {
            atoms.push(Atom::Atomic(child));
        }
        BoxKind::Float => atoms.push(Atom::Float(child)),
        BoxKind::Positioned => atoms.push(Atom::OutOfFlow(child)),
        BoxKind::ListItemMarker => {
            // Markers are positioned by the list item, never inline.
        }
        _ => {
            // Block-level content inside the inline flow.
            atoms.push(Atom::BlockInInline(child));
        }
    }
}

/// Split a text run into word and space atoms, honoring `white-space`.
fn flatten_text(
    text: &str,
    style: &Rc<ComputedStyle>,
    atoms: &mut Vec<Atom>,
    ctx: &LayoutContext,
) {
    let ws = style.white_space();
    let transformed = apply_text_transform(text, style);
    let space_width =
        measure_text(" ", style, ctx.fonts) + style.letter_spacing() + style.word_spacing();

    let push_segment = |segment: &str, atoms: &mut Vec<Atom>| {
        let mut rest = segment;
        while !rest.is_empty() {
            if let Some(stripped) = rest.strip_prefix(' ') {
                atoms.push(Atom::Space {
                    style: Rc::clone(style),
                    width: space_width,
                });
                rest = stripped;
                continue;
            }
            let word_end = rest.find(' ').unwrap_or(rest.len());
            let word = &rest[..word_end];
            atoms.push(Atom::Word {
                text: word.to_string(),
                style: Rc::clone(style),
                width: measure_text(word, style, ctx.fonts),
            });
            rest = &rest[word_end..];
        }
    };

    if ws.preserves_newlines() {
        for (index, segment) in transformed.split('\n').enumerate() {
            if index > 0 {
                atoms.push(Atom::Break);
            }
            push_segment(segment, atoms);
        }
    } else {
        push_segment(&transformed, atoms);
    }
}

fn apply_text_transform(text: &str, style: &ComputedStyle) -> String {
    match style.text_transform() {
        Keyword::Uppercase => text.to_uppercase(),
        Keyword::Lowercase => text.to_lowercase(),
        Keyword::Capitalize => {
            let mut out = String::with_capacity(text.len());
            let mut at_word_start = true;
            for ch in text.chars() {
                if at_word_start && ch.is_alphabetic() {
                    out.extend(ch.to_uppercase());
                } else {
                    out.push(ch);
                }
                at_word_start = !ch.is_alphanumeric();
            }
            out
        }
        _ => text.to_string(),
    }
}

/// Vertical metrics of one line participant.
struct FragMetrics {
    ascent: f64,
    descent: f64,
    /// Top/Bottom-aligned fragments size the line but sit outside the
    /// baseline arithmetic.
    edge_aligned: Option<VerticalAlign>,
    height: f64,
}

/// Phase C: construct the line box from accepted items.
///
/// Line-height invariant
/// ([§ 10.8](https://www.w3.org/TR/CSS2/visudet.html#line-height)): the
/// strut — an invisible fragment with the IFC root's own line-height —
/// always contributes, so even an empty (forced-break) line has height.
#[allow(clippy::too_many_arguments)]
fn build_line(
    mut items: Vec<LineItem>,
    left: f64,
    available: f64,
    y: f64,
    root_style: &Rc<ComputedStyle>,
    text_align: TextAlign,
    strut_height: f64,
    fonts: &dyn FontMetrics,
) -> LayoutBox {
    // "A sequence of collapsible spaces at the end of a line is
    // removed."
    while let Some(last) = items.last() {
        if matches!(&last.data, ItemData::Text { text, .. } if text == " ") {
            let _ = items.pop();
        } else {
            break;
        }
    }

    // ── Vertical metrics; the strut seeds the maxima ─────────────────
    let strut_request = request_for(root_style);
    let strut_content = fonts.ascent(&strut_request) + fonts.descent(&strut_request);
    let strut_leading = (strut_height - strut_content) / 2.0;
    let mut max_ascent = strut_leading + fonts.ascent(&strut_request);
    let mut max_descent = strut_height - max_ascent;

    let metrics: Vec<Option<FragMetrics>> = items
        .iter()
        .map(|item| match &item.data {
            ItemData::Text { style, .. } => Some(text_metrics(style, fonts)),
            ItemData::Atomic(bx) => Some(atomic_metrics(bx, root_style, fonts)),
            ItemData::Open { style, .. } => Some(text_metrics(style, fonts)),
            ItemData::Close { .. } => None,
        })
        .collect();

    for m in metrics.iter().flatten() {
        if m.edge_aligned.is_none() {
            max_ascent = max_ascent.max(m.ascent);
            max_descent = max_descent.max(m.descent);
        }
    }
    let mut line_height = max_ascent + max_descent;
    for m in metrics.iter().flatten() {
        if m.edge_aligned.is_some() {
            line_height = line_height.max(m.height);
        }
    }
    let baseline_y = y + max_ascent;

    // ── Horizontal alignment over the whole line ─────────────────────
    let content_width = items.last().map_or(0.0, |item| item.rel_x + item.width);
    let slack = (available - content_width).max(0.0);
    let align_shift = match text_align {
        TextAlign::Left => 0.0,
        TextAlign::Right => slack,
        TextAlign::Center => slack / 2.0,
    };

    // ── Fragment construction ────────────────────────────────────────
    let mut line = LayoutBox::new(
        BoxKind::LineBox {
            baseline: max_ascent,
        },
        None,
        Rc::clone(root_style),
    );
    line.rect = Rect::new(left, y, available, line_height);

    struct Span {
        insert_at: usize,
        start_x: f64,
        style: Rc<ComputedStyle>,
        node: Option<NodeId>,
        has_left_edge: bool,
    }
    let mut spans: Vec<Span> = Vec::new();
    let mut children: Vec<LayoutBox> = Vec::new();

    for (item, metric) in items.into_iter().zip(metrics) {
        let x = left + align_shift + item.rel_x;
        match item.data {
            ItemData::Open {
                style,
                node,
                has_left_edge,
            } => {
                spans.push(Span {
                    insert_at: children.len(),
                    // Content starts after margin+border+padding.
                    start_x: x + item.width,
                    style,
                    node,
                    has_left_edge,
                });
            }
            ItemData::Close { has_right_edge } => {
                if let Some(span) = spans.pop() {
                    let wrapper = make_wrapper(
                        &span.style,
                        span.node,
                        span.start_x,
                        x,
                        baseline_y,
                        span.has_left_edge,
                        has_right_edge,
                        fonts,
                    );
                    children.insert(span.insert_at, wrapper);
                }
            }
            ItemData::Text { text, style } => {
                let metric = metric.expect("text items carry metrics");
                let request = request_for(&style);
                let lh = style.line_height();
                let content_height = fonts.ascent(&request) + fonts.descent(&request);
                let half_leading = (lh - content_height) / 2.0;
                let mut frag = LayoutBox::new(BoxKind::AnonymousInline, None, Rc::clone(&style));
                frag.rect = Rect::new(x, baseline_y - metric.ascent, item.width, lh);
                frag.baseline_offset = Some(half_leading + fonts.ascent(&request));
                frag.text = Some(text);
                children.push(frag);
            }
            ItemData::Atomic(mut bx) => {
                let metric = metric.expect("atomic items carry metrics");
                let outer = bx.margin_box();
                let top = match metric.edge_aligned {
                    Some(VerticalAlign::Top | VerticalAlign::TextTop) => y,
                    Some(_) => y + line_height - outer.height,
                    None => baseline_y - metric.ascent,
                };
                bx.translate(x - outer.x, top - outer.y);
                children.push(bx);
            }
        }
    }

    // Elements continuing past the line end close their fragments at
    // the line's content edge, without a right border edge.
    let line_end_x = left + align_shift + content_width;
    while let Some(span) = spans.pop() {
        let wrapper = make_wrapper(
            &span.style,
            span.node,
            span.start_x,
            line_end_x,
            baseline_y,
            span.has_left_edge,
            false,
            fonts,
        );
        children.insert(span.insert_at, wrapper);
    }

    line.children = children;
    line
}

/// Metrics of a text fragment, including its `vertical-align` shift.
///
/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading):
/// half of the leading goes above the content area, half below; the
/// fragment's height is exactly the line-height of its style.
fn text_metrics(style: &Rc<ComputedStyle>, fonts: &dyn FontMetrics) -> FragMetrics {
    let request = request_for(style);
    let content = fonts.ascent(&request) + fonts.descent(&request);
    let lh = style.line_height();
    let half_leading = (lh - content) / 2.0;
    let ascent = half_leading + fonts.ascent(&request);
    let descent = lh - ascent;
    let (shift, edge_aligned) = vertical_shift(style, lh, fonts, &request);
    FragMetrics {
        ascent: ascent + shift,
        descent: descent - shift,
        edge_aligned,
        height: lh,
    }
}

/// Metrics of an atomic fragment: its baseline sits at its bottom
/// margin edge (the CSS simplification for non-visible-overflow
/// inline-blocks, applied to all atomics here).
fn atomic_metrics(
    bx: &LayoutBox,
    root_style: &Rc<ComputedStyle>,
    fonts: &dyn FontMetrics,
) -> FragMetrics {
    let height = bx.margin_box().height;
    let root_request = request_for(root_style);
    match bx.style.vertical_align() {
        VerticalAlign::Top | VerticalAlign::TextTop => FragMetrics {
            ascent: 0.0,
            descent: 0.0,
            edge_aligned: Some(VerticalAlign::Top),
            height,
        },
        VerticalAlign::Bottom | VerticalAlign::TextBottom => FragMetrics {
            ascent: 0.0,
            descent: 0.0,
            edge_aligned: Some(VerticalAlign::Bottom),
            height,
        },
        VerticalAlign::Middle => {
            let half = height / 2.0 + fonts.x_height(&root_request) / 2.0;
            FragMetrics {
                ascent: half,
                descent: height - half,
                edge_aligned: None,
                height,
            }
        }
        VerticalAlign::Length(px) => FragMetrics {
            ascent: height + px,
            descent: -px,
            edge_aligned: None,
            height,
        },
        VerticalAlign::Percentage(f) => {
            let shift = f * bx.style.line_height();
            FragMetrics {
                ascent: height + shift,
                descent: -shift,
                edge_aligned: None,
                height,
            }
        }
        _ => FragMetrics {
            ascent: height,
            descent: 0.0,
            edge_aligned: None,
            height,
        },
    }
}

/// The baseline shift a `vertical-align` value produces for text
/// (positive raises).
fn vertical_shift(
    style: &ComputedStyle,
    line_height: f64,
    fonts: &dyn FontMetrics,
    request: &FontRequest,
) -> (f64, Option<VerticalAlign>) {
    match style.vertical_align() {
        VerticalAlign::Baseline => (0.0, None),
        VerticalAlign::Sub => (-0.2 * request.size, None),
        VerticalAlign::Super => (0.33 * request.size, None),
        VerticalAlign::Middle => {
            // Center on baseline + half x-height: a small shift for text.
            (fonts.x_height(request) / 2.0 - request.size * 0.25, None)
        }
        VerticalAlign::Length(px) => (px, None),
        VerticalAlign::Percentage(f) => (f * line_height, None),
        VerticalAlign::Top | VerticalAlign::TextTop => (0.0, Some(VerticalAlign::Top)),
        VerticalAlign::Bottom | VerticalAlign::TextBottom => (0.0, Some(VerticalAlign::Bottom)),
    }
}

/// An inline wrapper fragment: the painted body of an inline element on
/// one line, spanning `[start_x, end_x)` of content with the element's
/// padding and border edges attached.
///
/// An empty inline element (open immediately followed by close) yields
/// a zero-content-width wrapper that still carries its horizontal edges
/// and its line-height vertical extent
/// ([§ 10.8](https://www.w3.org/TR/CSS2/visudet.html#line-height)).
#[allow(clippy::too_many_arguments)]
fn make_wrapper(
    style: &Rc<ComputedStyle>,
    node: Option<NodeId>,
    start_x: f64,
    end_x: f64,
    baseline_y: f64,
    has_left_edge: bool,
    has_right_edge: bool,
    fonts: &dyn FontMetrics,
) -> LayoutBox {
    let request = request_for(style);
    let content_height = fonts.ascent(&request) + fonts.descent(&request);
    let lh = style.line_height();
    let half_leading = (lh - content_height) / 2.0;
    let ascent = half_leading + fonts.ascent(&request);

    let mut wrapper = LayoutBox::new(BoxKind::Inline, node, Rc::clone(style));
    wrapper.rect = Rect::new(start_x, baseline_y - ascent, (end_x - start_x).max(0.0), lh);
    wrapper.padding = EdgeSizes {
        top: style.padding(Side::Top, 0.0),
        bottom: style.padding(Side::Bottom, 0.0),
        left: if has_left_edge {
            style.padding(Side::Left, 0.0)
        } else {
            0.0
        },
        right: if has_right_edge {
            style.padding(Side::Right, 0.0)
        } else {
            0.0
        },
    };
    wrapper.border = EdgeSizes {
        top: style.border_width(Side::Top),
        bottom: style.border_width(Side::Bottom),
        left: if has_left_edge {
            style.border_width(Side::Left)
        } else {
            0.0
        },
        right: if has_right_edge {
            style.border_width(Side::Right)
        } else {
            0.0
        },
    };
    wrapper.baseline_offset = Some(ascent);
    wrapper
}
