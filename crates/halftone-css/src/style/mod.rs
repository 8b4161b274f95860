//! The style value model.
//!
//! Typed representation of every CSS property value the renderer
//! understands, string→value conversion, shorthand expansion, and the
//! per-element [`ComputedStyle`] map the cascade produces.

mod computed;
mod shorthand;
mod value;

pub use computed::{
    BorderStyle, ClearSide, ComputedStyle, DEFAULT_FONT_SIZE, Display, FloatSide,
    INHERITED_PROPERTIES, NORMAL_LINE_HEIGHT, Overflow, Position, Side, TextAlign, TextDecoration,
    VerticalAlign, WhiteSpace, initial_value,
};
pub use shorthand::expand_shorthand;
pub use value::{
    BoxShadow, Color, ContentItem, Keyword, StyleValue, TransformFn, parse_color, parse_length,
    parse_value, split_components,
};
