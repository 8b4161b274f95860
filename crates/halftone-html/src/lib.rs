//! Tolerant HTML parsing for the Halftone renderer.
//!
//! This is deliberately not a WHATWG state machine. The rendering
//! pipeline needs a document tree, not a conformance checker, so the
//! front end here accepts whatever markup it is given and never fails:
//! unknown tags become elements, stray end tags are dropped, comments
//! and doctypes disappear, and unterminated constructs run to end of
//! input.
//!
//! What it does handle, because layout depends on it:
//! - attributes in all three quoting styles, preserved in source order
//! - void elements (`<br>`, `<img>`, …) that never take children
//! - rawtext elements (`<style>`, `<script>`) whose contents are kept
//!   verbatim for the CSS front end
//! - character references, named basics plus numeric forms
//! - implied `<html>`/`<head>`/`<body>` and the common auto-closing
//!   pairs (`p`, `li`, `tr`, `td`/`th`)

mod parser;
mod tokenizer;

pub use parser::parse;
pub use tokenizer::{Token, tokenize};
