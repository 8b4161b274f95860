//! Stacking contexts: the tree over the box tree.
//!
//! [CSS 2.1 § 9.9](https://www.w3.org/TR/CSS2/visuren.html#layers) /
//! [Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! A stacking context is created by the root box, any positioned box
//! with a non-`auto` `z-index`, any box with `opacity < 1`, and any box
//! with a transform. The context tree does not coincide with the box
//! tree, so a post-order pass builds it separately, borrowing boxes by
//! reference; the painter then walks this auxiliary tree.
//!
//! Positioned boxes with `z-index: auto` paint atomically at the
//! auto/zero layer of their enclosing context but do not form contexts
//! of their own.

use crate::layout::{BoxKind, LayoutBox};
use crate::style::Position;

/// One stacking context, borrowing its establishing box.
pub struct StackingContext<'a> {
    /// The box that establishes this context.
    pub root: &'a LayoutBox,
    /// The context's stack level within its parent.
    pub z_index: i32,
    /// Sequence number for stable document-order tie-breaks.
    pub order: usize,
    /// Child contexts with negative stack levels, sorted ascending
    /// (most negative paints first).
    pub negative: Vec<StackingContext<'a>>,
    /// The auto/zero layer: positioned descendants with `z-index: auto`
    /// and child contexts at level 0, interleaved in document order.
    pub auto_level: Vec<AutoLevelEntry<'a>>,
    /// Child contexts with positive stack levels, sorted ascending.
    pub positive: Vec<StackingContext<'a>>,
}

/// An entry of the auto/zero layer.
pub enum AutoLevelEntry<'a> {
    /// A positioned box with `z-index: auto`: painted atomically, no
    /// context of its own.
    Positioned(&'a LayoutBox),
    /// A real child context with `z-index: 0`.
    Context(StackingContext<'a>),
}

/// Whether a box establishes a stacking context (other than the root,
/// which always does).
#[must_use]
pub fn establishes_context(bx: &LayoutBox) -> bool {
    if bx.is_anonymous() {
        return false;
    }
    let positioned_with_z = bx.effective_position().is_positioned() && bx.z_index.is_some();
    positioned_with_z || bx.style.forces_stacking_context()
}

/// Build the stacking-context tree rooted at the viewport box.
#[must_use]
pub fn build_stacking_tree(root: &LayoutBox) -> StackingContext<'_> {
    let mut counter = 0;
    build_context(root, 0, &mut counter)
}

fn build_context<'a>(root: &'a LayoutBox, z: i32, counter: &mut usize) -> StackingContext<'a> {
    let order = *counter;
    *counter += 1;

    let mut ctx = StackingContext {
        root,
        z_index: z,
        order,
        negative: Vec::new(),
        auto_level: Vec::new(),
        positive: Vec::new(),
    };
    for child in &root.children {
        collect(child, &mut ctx, counter);
    }
    ctx.negative.sort_by_key(|c| (c.z_index, c.order));
    ctx.positive.sort_by_key(|c| (c.z_index, c.order));
    ctx
}

/// Assign `bx` (and recursively its subtree) to the layers of `ctx`.
fn collect<'a>(bx: &'a LayoutBox, ctx: &mut StackingContext<'a>, counter: &mut usize) {
    if establishes_context(bx) {
        let z = bx.z_index.unwrap_or(0);
        let child_ctx = build_context(bx, z, counter);
        if z < 0 {
            ctx.negative.push(child_ctx);
        } else if z > 0 {
            ctx.positive.push(child_ctx);
        } else {
            ctx.auto_level.push(AutoLevelEntry::Context(child_ctx));
        }
        return;
    }

    let positioned_auto = bx.effective_position() != Position::Static
        || matches!(bx.kind, BoxKind::Positioned);
    if positioned_auto {
        ctx.auto_level.push(AutoLevelEntry::Positioned(bx));
        return;
    }

    // Floats and atomic inlines paint atomically at their own Appendix E
    // steps (4 and 5); the painter reaches them during its walks, so
    // nothing inside them registers here.
    if matches!(bx.kind, BoxKind::Float | BoxKind::AtomicInline) {
        return;
    }

    for child in &bx.children {
        collect(child, ctx, counter);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::style::{ComputedStyle, Keyword, StyleValue};

    use super::*;

    fn styled(kind: BoxKind, entries: &[(&str, StyleValue)]) -> LayoutBox {
        let mut style = ComputedStyle::new();
        for (name, value) in entries {
            style.set(name, value.clone());
        }
        LayoutBox::new(kind, None, Rc::new(style))
    }

    #[test]
    fn z_indexed_children_sort_into_layers() {
        let mut root = styled(BoxKind::Block, &[]);
        for z in [2.0, -1.0, 1.0] {
            root.children.push(styled(
                BoxKind::Positioned,
                &[
                    ("position", StyleValue::Keyword(Keyword::Absolute)),
                    ("z-index", StyleValue::Number(z)),
                ],
            ));
        }
        let tree = build_stacking_tree(&root);
        assert_eq!(tree.negative.len(), 1);
        assert_eq!(tree.negative[0].z_index, -1);
        assert_eq!(tree.positive.len(), 2);
        assert_eq!(tree.positive[0].z_index, 1);
        assert_eq!(tree.positive[1].z_index, 2);
    }

    #[test]
    fn opacity_forces_a_context() {
        let bx = styled(BoxKind::Block, &[("opacity", StyleValue::Number(0.5))]);
        assert!(establishes_context(&bx));
        let plain = styled(BoxKind::Block, &[]);
        assert!(!establishes_context(&plain));
    }

    #[test]
    fn positioned_auto_stays_in_auto_level() {
        let mut root = styled(BoxKind::Block, &[]);
        root.children.push(styled(
            BoxKind::Positioned,
            &[("position", StyleValue::Keyword(Keyword::Absolute))],
        ));
        let tree = build_stacking_tree(&root);
        assert_eq!(tree.auto_level.len(), 1);
        assert!(matches!(tree.auto_level[0], AutoLevelEntry::Positioned(_)));
    }

    #[test]
    fn equal_z_breaks_ties_by_document_order(){
        let mut root = styled(BoxKind::Block, &[]);
        for _ in 0..2 {
            root.children.push(styled(
                BoxKind::Positioned,
                &[
                    ("position", StyleValue::Keyword(Keyword::Absolute)),
                    ("z-index", StyleValue::Number(5.0)),
                ],
            ));
        }
        let tree = build_stacking_tree(&root);
        assert_eq!(tree.positive.len(), 2);
        assert!(tree.positive[0].order < tree.positive[1].order);
    }
}
