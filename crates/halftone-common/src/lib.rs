//! Shared utilities for the Halftone renderer.
//!
//! Holds the pieces every other crate leans on: deduplicated terminal
//! warnings, `data:` URI decoding, and blocking HTTP fetches for linked
//! stylesheets and images.

pub mod fetch;
pub mod warning;

pub use fetch::{FetchError, fetch_bytes, fetch_data_uri, fetch_text};
pub use warning::{clear_warnings, warn_once};
