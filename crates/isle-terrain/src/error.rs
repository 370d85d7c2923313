//! Generation error types.

/// Errors that can abort a generation run before results are published.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Another generation is already running; the request was dropped.
    #[error("a generation run is already in progress")]
    Busy,

    /// The grid was not fully assigned. Never exposed as a partial result.
    #[error("incomplete assignment: {actual} of {expected} cells labeled")]
    IncompleteAssignment { expected: usize, actual: usize },

    /// Placement targets do not add up to the tile count.
    #[error("quota total {actual} does not match tile count {expected}")]
    QuotaMismatch { expected: u64, actual: u64 },

    /// Preference hints do not cover the grid.
    #[error("expected {expected} preference hints, got {actual}")]
    PreferenceLength { expected: usize, actual: usize },

    /// The background worker thread could not be started.
    #[error("failed to spawn generation worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The background worker is gone.
    #[error("generation worker disconnected")]
    WorkerDisconnected,

    /// Failed to encode a debug image.
    #[error("failed to encode image: {0}")]
    Encode(#[from] png::EncodingError),
}
