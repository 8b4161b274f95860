//! The layout box tree and its construction from the styled DOM.
//!
//! [CSS 2.1 § 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! Each element generates zero or more boxes according to its computed
//! `display`, `position`, and `float`. The builder also performs the
//! tree fix-ups CSS requires before layout can run:
//!
//! - `display: none` subtrees generate nothing,
//! - anonymous block wrapping when a block container mixes block and
//!   inline children ([§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)),
//! - pseudo-element boxes for `::before` / `::after` with content,
//!   including counter and `attr()` resolution,
//! - `::first-letter` splitting on block containers,
//! - list-item markers,
//! - whitespace collapsing per `white-space`.
//!
//! Sizing and positioning are all zero here; the layout passes fill
//! them in.

use std::rc::Rc;

use halftone_dom::{DomTree, ElementData, NodeId, NodeKind};

use crate::cascade::StyleRegistry;
use crate::selector::PseudoElement;
use crate::style::{ComputedStyle, ContentItem, Display, FloatSide, Keyword};

use super::fonts::ImageSizes;
use super::geometry::{EdgeSizes, Rect};

/// What kind of box this is.
///
/// [§ 9.2](https://www.w3.org/TR/CSS2/visuren.html#box-gen): "A box's
/// type affects, in part, its behavior in the visual formatting model."
#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    /// Block-level block container.
    Block,
    /// Non-replaced inline box (also the inline wrapper fragments that
    /// line construction emits).
    Inline,
    /// Atomic inline: inline-block, replaced element, inline-table.
    AtomicInline,
    /// One line of an inline formatting context; `baseline` is the
    /// distance from the line-box top to the baseline.
    LineBox {
        /// Baseline offset from the top of the line box.
        baseline: f64,
    },
    /// Engine-generated block wrapper around inline runs.
    AnonymousBlock,
    /// A text run (engine-generated inline box around character data).
    AnonymousInline,
    /// A floated box, out of normal flow.
    Float,
    /// An absolutely or fixed positioned box, out of normal flow.
    Positioned,
    /// `display: table` (or `inline-table`) wrapper.
    TableWrapper,
    /// `display: table-row`.
    TableRow,
    /// `display: table-cell`; `colspan` comes from the cell's attribute.
    TableCell {
        /// Number of columns the cell spans (≥ 1).
        colspan: usize,
    },
    /// The generated marker of a `display: list-item` box.
    ListItemMarker,
    /// A `::before`/`::after`/`::first-letter` generated box.
    PseudoContent,
}

/// One box of the layout tree.
///
/// Geometry fields hold the **content box** in document coordinates;
/// padding, border, and margin expand outward from it. The containing
/// block invariant: an in-flow box's position is measured from its
/// containing block's content edge (positioned boxes measure from the
/// relevant padding edge).
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// The box type.
    pub kind: BoxKind,
    /// Generating DOM node, if any (anonymous boxes have none).
    pub node: Option<NodeId>,
    /// Shared computed style. Anonymous boxes borrow their parent's
    /// style for the inherited properties; their non-inherited
    /// properties (backgrounds, borders) are never painted.
    pub style: Rc<ComputedStyle>,
    /// Content-box rectangle in document coordinates.
    pub rect: Rect,
    /// Used padding.
    pub padding: EdgeSizes,
    /// Used border widths.
    pub border: EdgeSizes,
    /// Used margins (negative values allowed).
    pub margin: EdgeSizes,
    /// Child boxes, owned, in document/paint order.
    pub children: Vec<LayoutBox>,
    /// `z-index` snapshot for the stacking pass (`None` = auto).
    pub z_index: Option<i32>,
    /// Text payload of text-run, marker, and pseudo text boxes.
    pub text: Option<String>,
    /// `src` of a replaced image box.
    pub image_src: Option<String>,
    /// Resolved content string of a pseudo-element box.
    pub pseudo_content: Option<String>,
    /// Marker text of a [`BoxKind::ListItemMarker`] box.
    pub list_marker_text: Option<String>,
    /// Natural size of replaced content, when known.
    pub intrinsic_size: Option<(f64, f64)>,
    /// Distance from `rect.y` to the text baseline for glyph-carrying
    /// fragments (set during line construction).
    pub baseline_offset: Option<f64>,
    /// Effective top margin after collapsing (set during block layout).
    pub collapsed_margin_top: f64,
    /// Effective bottom margin after collapsing (set during block layout).
    pub collapsed_margin_bottom: f64,
}

impl LayoutBox {
    /// A zero-sized box of the given kind.
    #[must_use]
    pub fn new(kind: BoxKind, node: Option<NodeId>, style: Rc<ComputedStyle>) -> Self {
        let z_index = style.z_index();
        Self {
            kind,
            node,
            style,
            rect: Rect::default(),
            padding: EdgeSizes::default(),
            border: EdgeSizes::default(),
            margin: EdgeSizes::default(),
            children: Vec::new(),
            z_index,
            text: None,
            image_src: None,
            pseudo_content: None,
            list_marker_text: None,
            intrinsic_size: None,
            baseline_offset: None,
            collapsed_margin_top: 0.0,
            collapsed_margin_bottom: 0.0,
        }
    }

    /// The padding box (content + padding).
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        self.rect.expanded(&self.padding)
    }

    /// The border box (content + padding + border).
    #[must_use]
    pub fn border_box(&self) -> Rect {
        self.padding_box().expanded(&self.border)
    }

    /// The margin box (border box + margins).
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        self.border_box().expanded(&self.margin)
    }

    /// Shift this box and its whole subtree.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.rect = self.rect.translated(dx, dy);
        for child in &mut self.children {
            child.translate(dx, dy);
        }
    }

    /// Whether this box participates in inline layout as inline-level
    /// content.
    #[must_use]
    pub fn is_inline_level(&self) -> bool {
        match self.kind {
            BoxKind::Inline
            | BoxKind::AnonymousInline
            | BoxKind::AtomicInline
            | BoxKind::PseudoContent => true,
            BoxKind::TableWrapper => self.style.display() == Display::InlineTable,
            _ => false,
        }
    }

    /// Whether this box stays in the normal flow.
    #[must_use]
    pub fn is_in_flow(&self) -> bool {
        !matches!(self.kind, BoxKind::Float | BoxKind::Positioned)
    }

    /// Engine-generated boxes borrow their parent's style for the
    /// inherited properties only; every non-inherited property read off
    /// them (position, overflow, opacity, backgrounds) belongs to the
    /// parent and must be ignored.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(
            self.kind,
            BoxKind::AnonymousBlock | BoxKind::AnonymousInline | BoxKind::LineBox { .. }
        )
    }

    /// The box's own `position`, `static` for anonymous boxes.
    #[must_use]
    pub fn effective_position(&self) -> crate::style::Position {
        if self.is_anonymous() {
            crate::style::Position::Static
        } else {
            self.style.position()
        }
    }

    /// Whether this box establishes a new block formatting context:
    /// floats, out-of-flow boxes, atomic inlines, table cells, and
    /// block containers with non-`visible` overflow.
    ///
    /// [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    #[must_use]
    pub fn establishes_bfc(&self) -> bool {
        match self.kind {
            BoxKind::Float
            | BoxKind::Positioned
            | BoxKind::AtomicInline
            | BoxKind::TableCell { .. } => true,
            BoxKind::Block => self.style.overflow() != crate::style::Overflow::Visible,
            _ => false,
        }
    }

    /// Whether every in-flow child is inline-level, making this box the
    /// root of an inline formatting context.
    #[must_use]
    pub fn establishes_ifc(&self) -> bool {
        let mut saw_any = false;
        for child in &self.children {
            if matches!(child.kind, BoxKind::ListItemMarker) || !child.is_in_flow() {
                continue;
            }
            if !child.is_inline_level() {
                return false;
            }
            saw_any = true;
        }
        saw_any
    }

    /// Abort with a diagnostic on a tree-shape violation. Programming
    /// errors only; document content can never trigger this.
    pub(crate) fn assert_tree_invariant(&self, depth: usize) {
        assert!(
            depth < 4096,
            "fatal invariant: box tree depth exceeds any possible document nesting \
             (cycle through {:?} node {:?})",
            self.kind,
            self.node,
        );
        for child in &self.children {
            child.assert_tree_invariant(depth + 1);
        }
    }
}

/// Counter scopes, one frame per open element.
///
/// [CSS 2.1 § 12.4](https://www.w3.org/TR/CSS2/generate.html#counters)
#[derive(Debug, Default)]
struct Counters {
    frames: Vec<std::collections::HashMap<String, i64>>,
}

impl Counters {
    fn push_frame(&mut self) {
        self.frames.push(std::collections::HashMap::new());
    }

    fn pop_frame(&mut self) {
        let _ = self.frames.pop();
    }

    fn reset(&mut self, name: &str, value: i64) {
        if let Some(frame) = self.frames.last_mut() {
            let _ = frame.insert(name.to_string(), value);
        }
    }

    fn increment(&mut self, name: &str, delta: i64) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(value) = frame.get_mut(name) {
                *value += delta;
                return;
            }
        }
        // No open scope: the increment creates one in the current frame.
        self.reset(name, delta);
    }

    fn value(&self, name: &str) -> i64 {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
            .unwrap_or(0)
    }
}

/// Build the box tree for a styled document.
///
/// Returns the viewport box: a block box sized to the viewport whose
/// single child (if any) is the root element's box.
#[must_use]
pub fn build_box_tree(
    tree: &DomTree,
    styles: &StyleRegistry,
    viewport_w: f64,
    viewport_h: f64,
    images: &dyn ImageSizes,
) -> LayoutBox {
    let mut builder = Builder {
        tree,
        styles,
        images,
        counters: Counters::default(),
    };

    let mut viewport = LayoutBox::new(BoxKind::Block, None, Rc::new(ComputedStyle::new()));
    viewport.rect = Rect::new(0.0, 0.0, viewport_w, viewport_h);

    if let Some(html) = tree.document_element()
        && let Some(root_box) = builder.build_element(html)
    {
        viewport.children.push(root_box);
    }
    viewport.assert_tree_invariant(0);
    viewport
}

struct Builder<'a> {
    tree: &'a DomTree,
    styles: &'a StyleRegistry,
    images: &'a dyn ImageSizes,
    counters: Counters,
}

impl Builder<'_> {
    /// Build the principal box (and generated children) for an element.
    /// Returns `None` for `display: none` and for unstyled elements.
    fn build_element(&mut self, id: NodeId) -> Option<LayoutBox> {
        let element = self.tree.as_element(id)?;
        let style = Rc::clone(self.styles.style(id)?);

        let display = style.display();
        if display == Display::None {
            return None;
        }

        self.counters.push_frame();
        for (name, value) in style.counter_reset() {
            self.counters.reset(&name, value);
        }
        for (name, delta) in style.counter_increment() {
            self.counters.increment(&name, delta);
        }

        // Lists maintain the implicit marker counter.
        if matches!(element.name.as_str(), "ol" | "ul" | "menu" | "dir") {
            self.counters.reset("list-item", 0);
        }
        if display == Display::ListItem {
            self.counters.increment("list-item", 1);
        }

        let kind = box_kind_for(&style, element);
        let mut bx = LayoutBox::new(kind, Some(id), Rc::clone(&style));

        if element.name == "img" {
            self.fill_image_box(&mut bx, element);
        }

        // `<br>` is an empty inline whose entire meaning is a forced
        // line break; the newline sentinel is what inline layout keys on.
        if element.name == "br" {
            bx.text = Some("\n".to_string());
            self.counters.pop_frame();
            return Some(bx);
        }

        // ::before runs ahead of the children, ::after behind them, so
        // counter updates land in document order.
        let mut children = Vec::new();
        if let Some(pseudo) = self.build_pseudo(id, PseudoElement::Before) {
            children.push(pseudo);
        }

        if display == Display::ListItem {
            children.push(self.build_marker(&style));
        }

        for &child_id in self.tree.children(id) {
            match self.tree.get(child_id).map(|n| &n.kind) {
                Some(NodeKind::Element(_)) => {
                    if let Some(child_box) = self.build_element(child_id) {
                        // Table row groups are transparent: their rows
                        // hoist into the table wrapper.
                        if child_box.node.is_some()
                            && child_box.style.display() == Display::TableRowGroup
                        {
                            children.extend(child_box.children);
                        } else {
                            children.push(child_box);
                        }
                    }
                }
                Some(NodeKind::Text(text)) => {
                    if let Some(text_box) = self.build_text(text, &style) {
                        children.push(text_box);
                    }
                }
                _ => {}
            }
        }

        if let Some(pseudo) = self.build_pseudo(id, PseudoElement::After) {
            children.push(pseudo);
        }

        self.counters.pop_frame();

        bx.children = children;

        // A row-group element is itself transparent; build_element of
        // the parent hoists our children.
        if display == Display::TableRowGroup {
            return Some(bx);
        }

        self.split_first_letter(id, &mut bx);
        wrap_anonymous_children(&mut bx);
        Some(bx)
    }

    /// Whitespace handling for a text node under `parent_style`.
    ///
    /// [CSS 2.1 § 16.6.1](https://www.w3.org/TR/CSS2/text.html#white-space-model)
    fn build_text(&mut self, text: &str, parent_style: &Rc<ComputedStyle>) -> Option<LayoutBox> {
        let ws = parent_style.white_space();
        let content = if ws.collapses() {
            collapse_whitespace(text, ws.preserves_newlines())
        } else {
            text.to_string()
        };
        if content.is_empty() {
            return None;
        }
        let mut bx = LayoutBox::new(BoxKind::AnonymousInline, None, Rc::clone(parent_style));
        bx.text = Some(content);
        Some(bx)
    }

    /// Generated content for one pseudo slot, resolved to boxes.
    ///
    /// [CSS 2.1 § 12.1](https://www.w3.org/TR/CSS2/generate.html)
    fn build_pseudo(&mut self, id: NodeId, which: PseudoElement) -> Option<LayoutBox> {
        let style = Rc::clone(self.styles.pseudo_style(id, which)?);
        let items = style.content()?.to_vec();

        for (name, value) in style.counter_reset() {
            self.counters.reset(&name, value);
        }
        for (name, delta) in style.counter_increment() {
            self.counters.increment(&name, delta);
        }

        let element = self.tree.as_element(id)?;
        let mut text = String::new();
        let mut image = None;
        for item in &items {
            match item {
                ContentItem::Text(s) => text.push_str(s),
                ContentItem::Counter { name, style: marker } => {
                    text.push_str(&format_counter(self.counters.value(name), *marker));
                }
                ContentItem::Attr(name) => {
                    if let Some(value) = element.get_attribute(name) {
                        text.push_str(value);
                    }
                }
                ContentItem::OpenQuote => text.push('\u{201c}'),
                ContentItem::CloseQuote => text.push('\u{201d}'),
                ContentItem::Url(src) => image = Some(src.clone()),
            }
        }

        let mut bx = LayoutBox::new(BoxKind::PseudoContent, Some(id), style);
        if let Some(src) = image {
            bx.intrinsic_size = self.images.intrinsic_size(&src);
            bx.image_src = Some(src);
        }
        bx.pseudo_content = Some(text.clone());
        bx.text = Some(text);
        Some(bx)
    }

    /// The marker box of a list item.
    ///
    /// [CSS 2.1 § 12.5.1](https://www.w3.org/TR/CSS2/generate.html#lists)
    fn build_marker(&mut self, item_style: &Rc<ComputedStyle>) -> LayoutBox {
        let text = match item_style.list_style_type() {
            Keyword::Circle => "\u{25cb}".to_string(),
            Keyword::Square => "\u{25aa}".to_string(),
            Keyword::Decimal => format!("{}.", self.counters.value("list-item")),
            Keyword::None => String::new(),
            _ => "\u{2022}".to_string(),
        };
        let mut marker = LayoutBox::new(
            BoxKind::ListItemMarker,
            None,
            Rc::clone(item_style),
        );
        marker.list_marker_text = Some(text.clone());
        marker.text = Some(text);
        marker
    }

    /// Replaced `<img>` setup: intrinsic size from the loader, `width`/
    /// `height` attributes override.
    fn fill_image_box(&self, bx: &mut LayoutBox, element: &ElementData) {
        let src = element.get_attribute("src").map(str::to_string);
        let mut size = src
            .as_deref()
            .and_then(|s| self.images.intrinsic_size(s));

        let attr_px = |name: &str| -> Option<f64> {
            element
                .get_attribute(name)
                .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
        };
        let attr_w = attr_px("width");
        let attr_h = attr_px("height");
        if attr_w.is_some() || attr_h.is_some() {
            let (natural_w, natural_h) = size.unwrap_or((0.0, 0.0));
            let w = attr_w.unwrap_or(natural_w);
            let h = attr_h.unwrap_or(natural_h);
            size = Some((w, h));
        }

        bx.image_src = src;
        bx.intrinsic_size = size;
    }

    /// Split the first letter of a block's first text run into a styled
    /// pseudo box when `::first-letter` applies.
    ///
    /// [CSS 2.1 § 12.5.1 first-letter](https://www.w3.org/TR/CSS2/selector.html#first-letter)
    fn split_first_letter(&mut self, id: NodeId, bx: &mut LayoutBox) {
        if !matches!(bx.kind, BoxKind::Block) {
            return;
        }
        let Some(fl_style) = self.styles.pseudo_style(id, PseudoElement::FirstLetter) else {
            return;
        };
        let fl_style = Rc::clone(fl_style);

        // The first text run in document order, not descending into
        // atomic or block children.
        let Some(index) = bx
            .children
            .iter()
            .position(|c| matches!(c.kind, BoxKind::AnonymousInline) && c.text.is_some())
        else {
            return;
        };
        let Some(full) = bx.children[index].text.clone() else {
            return;
        };

        // Leading whitespace stays with the remainder's line handling;
        // the styled letter is the first non-space character plus any
        // directly preceding punctuation.
        let trimmed_start = full.len() - full.trim_start().len();
        let Some(first) = full[trimmed_start..].chars().next() else {
            return;
        };
        let letter_end = trimmed_start + first.len_utf8();

        let mut letter = LayoutBox::new(BoxKind::PseudoContent, Some(id), fl_style);
        let letter_text = full[..letter_end].to_string();
        letter.pseudo_content = Some(letter_text.clone());
        letter.text = Some(letter_text);

        bx.children[index].text = Some(full[letter_end..].to_string());
        bx.children.insert(index, letter);
    }
}

/// Derive the box kind from the style, honoring the CSS 2.1 § 9.7
/// interactions: absolute/fixed positioning wins over float, float wins
/// over inline display, and both blockify the display type.
fn box_kind_for(style: &ComputedStyle, element: &ElementData) -> BoxKind {
    if style.position().is_out_of_flow() {
        return BoxKind::Positioned;
    }
    if style.float_side() != FloatSide::None {
        return BoxKind::Float;
    }
    if element.name == "img" {
        return BoxKind::AtomicInline;
    }
    match style.display() {
        Display::Block | Display::ListItem | Display::TableRowGroup => BoxKind::Block,
        Display::Inline => BoxKind::Inline,
        Display::InlineBlock => BoxKind::AtomicInline,
        Display::Table | Display::InlineTable => BoxKind::TableWrapper,
        Display::TableRow => BoxKind::TableRow,
        Display::TableCell => BoxKind::TableCell {
            colspan: element
                .get_attribute("colspan")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n >= 1)
                .unwrap_or(1),
        },
        Display::None => unreachable!("display:none filtered before box generation"),
    }
}

/// Collapse whitespace runs to single spaces; `preserve_newlines` keeps
/// `\n` (the `pre-line` behavior).
fn collapse_whitespace(text: &str, preserve_newlines: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        let is_space = ch.is_whitespace();
        if is_space {
            if preserve_newlines && ch == '\n' {
                // Trim the space a collapsed run left before the break.
                if out.ends_with(' ') {
                    let _ = out.pop();
                }
                out.push('\n');
                in_space = true;
                continue;
            }
            if !in_space && !out.ends_with('\n') {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// When a block container holds both block-level and inline-level
/// children, contiguous inline runs (with any floats and positioned
/// boxes interleaved among them) are wrapped in anonymous block boxes
/// that establish inline formatting contexts. Runs consisting solely of
/// collapsible whitespace generate no box at all.
fn wrap_anonymous_children(bx: &mut LayoutBox) {
    let is_block_container = matches!(
        bx.kind,
        BoxKind::Block
            | BoxKind::AnonymousBlock
            | BoxKind::Float
            | BoxKind::Positioned
            | BoxKind::TableCell { .. }
    );
    if !is_block_container {
        return;
    }

    let has_block_child = bx
        .children
        .iter()
        .any(|c| c.is_in_flow() && !c.is_inline_level() && !matches!(c.kind, BoxKind::ListItemMarker));
    if !has_block_child {
        // All-inline content: drop pure-formatting whitespace runs that
        // would otherwise force an empty line (e.g. newline between a
        // block container's tags), but keep them when real inline
        // content exists.
        let has_real_inline = bx.children.iter().any(|c| {
            c.is_inline_level()
                && !matches!(&c.text, Some(t) if t.trim().is_empty())
        });
        if !has_real_inline {
            bx.children
                .retain(|c| !matches!(&c.text, Some(t) if t.trim().is_empty()));
        }
        return;
    }

    let children = std::mem::take(&mut bx.children);
    let mut wrapped: Vec<LayoutBox> = Vec::with_capacity(children.len());
    let mut run: Vec<LayoutBox> = Vec::new();

    let mut flush_run = |run: &mut Vec<LayoutBox>, wrapped: &mut Vec<LayoutBox>, style: &Rc<ComputedStyle>| {
        if run.is_empty() {
            return;
        }
        // A run of nothing but whitespace text (plus out-of-flow boxes)
        // gets no anonymous box; the out-of-flow boxes float up to the
        // parent directly.
        let has_content = run.iter().any(|c| {
            c.is_in_flow() && !matches!(&c.text, Some(t) if t.trim().is_empty())
        });
        if !has_content {
            for c in run.drain(..) {
                if !c.is_in_flow() {
                    wrapped.push(c);
                }
            }
            return;
        }
        let mut anon = LayoutBox::new(BoxKind::AnonymousBlock, None, Rc::clone(style));
        anon.children = std::mem::take(run);
        wrapped.push(anon);
    };

    for child in children {
        let inline_ish = child.is_inline_level() || !child.is_in_flow();
        if inline_ish && !matches!(child.kind, BoxKind::ListItemMarker) {
            run.push(child);
        } else {
            flush_run(&mut run, &mut wrapped, &bx.style);
            wrapped.push(child);
        }
    }
    flush_run(&mut run, &mut wrapped, &bx.style);
    bx.children = wrapped;
}

/// Render a counter value in a marker style.
fn format_counter(value: i64, style: Keyword) -> String {
    match style {
        Keyword::Disc => "\u{2022}".to_string(),
        Keyword::Circle => "\u{25cb}".to_string(),
        Keyword::Square => "\u{25aa}".to_string(),
        _ => value.to_string(),
    }
}
