//! Error types shared across Framecast crates.

/// Top-level error type for Framecast operations.
#[derive(Debug, thiserror::Error)]
pub enum FramecastError {
    /// The submitted timeline is structurally inconsistent. Never reaches
    /// the render engine.
    #[error("Invalid timeline: {message}")]
    InvalidTimeline { message: String },

    /// The external render engine failed: non-zero exit, or a zero exit
    /// with a missing/empty output artifact. `diagnostics` is already
    /// truncated to a bounded length by the engine.
    #[error("Render failure{}: {diagnostics}", exit_code.map(|c| format!(" (exit code {c})")).unwrap_or_default())]
    RenderFailure {
        exit_code: Option<i32>,
        diagnostics: String,
    },

    /// Unknown job id on query, delete, or download.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Operation attempted before the job reached the required state
    /// (download before completion).
    #[error("Precondition failed: {message}")]
    PreconditionFailed { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FramecastError.
pub type FramecastResult<T> = Result<T, FramecastError>;

impl FramecastError {
    pub fn invalid_timeline(msg: impl Into<String>) -> Self {
        Self::InvalidTimeline {
            message: msg.into(),
        }
    }

    pub fn render_failure(exit_code: Option<i32>, diagnostics: impl Into<String>) -> Self {
        Self::RenderFailure {
            exit_code,
            diagnostics: diagnostics.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failure_display_includes_exit_code() {
        let err = FramecastError::render_failure(Some(1), "broken filter graph");
        let text = err.to_string();
        assert!(text.contains("exit code 1"));
        assert!(text.contains("broken filter graph"));
    }

    #[test]
    fn render_failure_display_without_exit_code() {
        let err = FramecastError::render_failure(None, "no output produced");
        assert_eq!(err.to_string(), "Render failure: no output produced");
    }
}
