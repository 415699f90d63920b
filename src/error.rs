//! Error types for the experiment harness.

use thiserror::Error;

/// Errors surfaced by validation and figure output.
#[derive(Debug, Error)]
pub enum ExperimentError {
    /// `validate` was called before both registries were populated.
    #[error("instances and algorithms must be non-empty")]
    EmptyRegistry,

    /// An algorithm disagreed with the reference algorithm on the first
    /// registered instance.
    #[error("algorithm '{algorithm}' produced a different result than the reference algorithm '{reference}'")]
    Mismatch {
        algorithm: String,
        reference: String,
    },

    /// `write_figure` was asked for an image format it does not know.
    #[error("unsupported image format '{extension}' (expected svg or png)")]
    UnsupportedFormat { extension: String },

    /// SVG parsing or rasterization failed.
    #[error("failed to render figure: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
