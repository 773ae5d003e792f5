use thiserror::Error;

/// Errors that abort a preprocessing run. None of these are recoverable
/// from inside the pipeline; callers wanting resilience retry the whole
/// invocation.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// Network or filesystem failure while localizing an image.
    #[error("failed to fetch image {uri}: {reason}")]
    Fetch { uri: String, reason: String },

    /// A nested list needs to merge into the last item of its shallower
    /// neighbour, but that neighbour has no items at all.
    #[error("list at depth {depth} has a preceding list with no items to nest under")]
    MalformedListStructure { depth: usize },

    /// Input could not be decoded into a document.
    #[error("failed to parse input: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
