//! The layout engine: styled DOM → positioned box tree.
//!
//! [CSS 2.1 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! # Module structure
//!
//! - [`geometry`] — rectangles and edge sizes
//! - [`box_tree`] — box kinds, the box struct, and tree construction
//! - [`block`] — block flow and margin collapsing
//! - [`inline`] — the multi-pass inline formatting engine
//! - [`float`] — the per-BFC float registry
//! - [`positioned`] — relative/absolute/fixed positioning
//! - [`table`] — the fixed-profile table algorithm
//! - [`intrinsic`] — min-/max-content measurement
//! - [`fonts`] — the measurement traits layout depends on
//!
//! Everything runs single-threaded and synchronously; layout functions
//! mutate the boxes they are given and recurse into children, with the
//! float registry of the enclosing block formatting context threaded
//! through as an explicit parameter.

pub mod block;
pub mod box_tree;
pub mod float;
pub mod fonts;
pub mod geometry;
pub mod inline;
pub mod intrinsic;
pub mod positioned;
pub mod table;

pub use box_tree::{BoxKind, LayoutBox, build_box_tree};
pub use float::FloatRegistry;
pub use fonts::{ApproximateFontMetrics, FontMetrics, FontRequest, ImageSizes, NoImages};
pub use geometry::{EdgeSizes, Rect};

use halftone_dom::DomTree;

use crate::cascade::StyleRegistry;

/// Which inline algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InlineMode {
    /// The canonical multi-pass engine: line bands re-query the float
    /// registry, floats commit mid-line.
    #[default]
    MultiPass,
    /// Diagnostic fallback: one greedy pass at full content width, for
    /// A/B comparison against the multi-pass engine.
    SinglePass,
}

/// Knobs for a layout run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOptions {
    /// Inline engine selection.
    pub inline_mode: InlineMode,
}

/// Everything the layout functions need besides the boxes themselves.
pub struct LayoutContext<'a> {
    /// The initial containing block (also the `fixed` containing block).
    pub viewport: Rect,
    /// Font measurement.
    pub fonts: &'a dyn FontMetrics,
    /// Run options.
    pub options: LayoutOptions,
}

/// Build and lay out the box tree for a styled document.
///
/// Returns the viewport box, fully positioned, ready for the paint
/// pass.
#[must_use]
pub fn layout_document(
    tree: &DomTree,
    styles: &StyleRegistry,
    viewport_w: f64,
    viewport_h: f64,
    fonts: &dyn FontMetrics,
    images: &dyn ImageSizes,
    options: LayoutOptions,
) -> LayoutBox {
    let mut root = build_box_tree(tree, styles, viewport_w, viewport_h, images);
    let ctx = LayoutContext {
        viewport: root.rect,
        fonts,
        options,
    };
    block::layout_root(&mut root, &ctx);
    root
}
