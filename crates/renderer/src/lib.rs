//! Frame pipeline and swap surface lifecycle.
//!
//! This crate paces CPU submission against the GPU and keeps the swapchain
//! usable:
//! - Frame slot ring and per-image fence tracking
//! - Acquire, submit and present with out-of-date handling
//! - Swap surface rebuilds on resize, suboptimal or lost surfaces
//! - A Vulkan backend drawing one indexed mesh with MSAA and depth

mod attachments;
mod command_recorder;
mod driver;
mod error;
mod frame_slots;
mod gpu;
mod image_tracker;
mod swap_surface;
mod ubo;
mod vulkan;

pub use command_recorder::CommandRecorder;
pub use driver::{FrameOutcome, FramePipeline, PipelineState};
pub use error::{RenderError, RenderResult};
pub use frame_slots::{FRAMES_IN_FLIGHT, FramePool, FrameSlot};
pub use gpu::{
    AcquireOutcome, CommandListId, DeviceCapabilities, FenceId, Gpu, PresentOutcome,
    SemaphoreId, Submission,
};
pub use image_tracker::ImageTracker;
pub use swap_surface::SwapSurface;
pub use ubo::{FramePayload, MvpUbo, SpinningModel};
pub use vulkan::VulkanGpu;
