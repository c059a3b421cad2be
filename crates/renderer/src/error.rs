//! Error taxonomy for the frame pipeline.

use swapframe_rhi::RhiError;
use thiserror::Error;

use crate::driver::PipelineState;

#[derive(Error, Debug)]
pub enum RenderError {
    /// The surface went out of date or suboptimal. Handled by a rebuild inside
    /// [`crate::FramePipeline::run_frame`] and never returned from it.
    #[error("Surface invalidated: {0}")]
    TransientSurfaceInvalidation(String),

    /// A GPU call failed in a way a rebuild cannot recover from.
    #[error("Device error while {stage:?}: {source}")]
    DeviceError {
        stage: PipelineState,
        #[source]
        source: RhiError,
    },

    /// The device or surface cannot satisfy the renderer's requirements.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Frame pipeline has been shut down")]
    ShutDown,
}

impl RenderError {
    /// Returns a closure that tags an [`RhiError`] with the stage it occurred in.
    pub(crate) fn at(stage: PipelineState) -> impl FnOnce(RhiError) -> RenderError {
        move |source| RenderError::DeviceError { stage, source }
    }

    pub fn is_fatal(&self) -> bool {
        !matches!(self, RenderError::TransientSurfaceInvalidation(_))
    }
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
