//! Renderer subsystem error handling
//!
//! Type aliases and helper constructors for the point cloud renderer so call
//! sites stay short and no GPU path needs unwrap().

use crate::error::{EngineError, EngineResult};

/// Type alias for renderer operation results
pub type RendererResult<T> = EngineResult<T>;

/// Helper trait for renderer error contexts
pub trait RendererErrorContext<T> {
    /// Map any displayable error into a readback failure
    fn readback_context(self, context: &str) -> RendererResult<T>;
}

impl<T, E> RendererErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn readback_context(self, context: &str) -> RendererResult<T> {
        self.map_err(|e| readback_error(context, e))
    }
}

/// Create a pipeline fault error
pub fn pipeline_fault(operation: &str, error: impl std::fmt::Display) -> EngineError {
    EngineError::PipelineFault {
        message: format!("{}: {}", operation, error),
    }
}

/// Create a diagnostic readback error
pub fn readback_error(operation: &str, error: impl std::fmt::Display) -> EngineError {
    EngineError::ReadbackFailed {
        message: format!("{}: {}", operation, error),
    }
}

/// Create an error for an asset reference that was never set
pub fn missing_asset(asset: &str) -> EngineError {
    EngineError::invalid_config(asset, "asset reference is not set")
}
