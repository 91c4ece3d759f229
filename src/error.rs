//! Error handling for the point cloud engine
//!
//! One error enum for the whole crate. Subsystems add type aliases and
//! helper constructors on top of it (see `renderer::error`).

/// Main error type for the point cloud engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("GPU buffer allocation failed: {buffer} ({size} bytes): {reason}")]
    AllocationFailed {
        buffer: String,
        size: u64,
        reason: String,
    },

    #[error("GPU pipeline fault: {message}")]
    PipelineFault { message: String },

    #[error("Renderer is not accepting frames: {state}")]
    NotRunning { state: String },

    #[error("Diagnostic readback failed: {message}")]
    ReadbackFailed { message: String },

    #[error("Illegal frame transition: {from} -> {to}")]
    FrameOrder { from: String, to: String },

    #[error("No compatible GPU adapter found")]
    DeviceNotFound,

    #[error("GPU device request failed: {0}")]
    DeviceRequest(String),

    #[error("Failed to read config {path}: {error}")]
    ConfigIo { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    ConfigParse(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Shorthand for configuration errors
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Extension trait for converting options to engine results
pub trait OptionExt<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError,
    {
        self.ok_or_else(f)
    }
}
