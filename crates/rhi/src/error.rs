//! RHI-specific error types.

use ash::vk;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RhiError {
    #[error("Vulkan error: {0}")]
    VulkanError(#[from] vk::Result),

    #[error("Failed to load Vulkan: {0}")]
    LoadingError(#[from] ash::LoadingError),

    #[error("Allocator error: {0}")]
    AllocatorError(#[from] gpu_allocator::AllocationError),

    #[error("Allocator mutex poisoned")]
    AllocatorLock,

    #[error("No suitable GPU found")]
    NoSuitableGpu,

    #[error("Shader error: {0}")]
    ShaderError(String),

    #[error("Surface error: {0}")]
    SurfaceError(String),

    #[error("Swapchain error: {0}")]
    SwapchainError(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

impl RhiError {
    /// The raw Vulkan result, when this error wraps one.
    pub fn vk_result(&self) -> Option<vk::Result> {
        match self {
            RhiError::VulkanError(result) => Some(*result),
            _ => None,
        }
    }

    /// True for results a swapchain rebuild recovers from.
    pub fn is_surface_invalidation(&self) -> bool {
        matches!(
            self.vk_result(),
            Some(vk::Result::ERROR_OUT_OF_DATE_KHR | vk::Result::SUBOPTIMAL_KHR)
        )
    }
}

pub type RhiResult<T> = std::result::Result<T, RhiError>;
