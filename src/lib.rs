//! Normalizes word-processor HTML exports (Google Docs style) into
//! semantically clean HTML for a pandoc-style conversion pipeline.
//!
//! The export format wraps everything in generic spans and divs, encodes
//! bold/italic/underline through generated CSS classes, marks page breaks
//! with a styled `<hr>`, references images by absolute URL, and emits
//! nested lists as flat runs of sibling lists whose depth hides in a class
//! name. [`preprocess`] runs the eight rewrite stages that undo all of
//! that over a single parsed document and returns the serialized result.

pub mod dom;
pub mod error;
pub mod fetch;
pub mod headings;
pub mod images;
pub mod lists;
pub mod pipeline;
pub mod styles;

pub use error::PreprocessError;
pub use fetch::{HttpFetcher, ImageFetcher};
pub use pipeline::preprocess;
