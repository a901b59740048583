use thiserror::Error;

/// Errors surfaced by the reconciliation core.
///
/// Everything else in the core is a total function over well-formed strings:
/// scanning, alignment, and reconciliation have no failure modes of their own.
#[derive(Debug, Error)]
pub enum CorrectError {
    /// A model returned a result the normalizer cannot make sense of
    /// (missing required fields, or a source that does not match the text
    /// being corrected). Callers should drop that model and carry on.
    #[error("invalid model output: {0}")]
    InvalidModelOutput(String),

    /// `merge` was called with zero results. Programmer error, fails fast.
    #[error("merge called with no results")]
    EmptyMergeInput,

    /// Every participating corrector failed for this request. The caller
    /// should surface this as service-unavailable rather than an empty result.
    #[error("no corrector produced a usable result")]
    NoUsableResult,
}
