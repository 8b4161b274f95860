//! Paint order: box tree → back-to-front paint list.
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! - [`stacking`] — the stacking-context tree over the box tree
//! - [`painter`] — the Appendix E walk emitting draw commands
//! - [`display_list`] — the command vocabulary the rasterizer executes

pub mod display_list;
pub mod painter;
pub mod stacking;

pub use display_list::{BorderSide, FontStyleSpec, Matrix, PaintList, PaintOp};
pub use painter::{canvas_background, paint_tree};
pub use stacking::{StackingContext, build_stacking_tree};
