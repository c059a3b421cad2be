//! The GPU operations the frame pipeline drives.
//!
//! [`FramePipeline`](crate::FramePipeline) never touches Vulkan handles directly.
//! It owns opaque generational ids and asks a [`Gpu`] backend to act on them, so
//! the whole acquire/submit/present/rebuild state machine runs unchanged over
//! [`VulkanGpu`](crate::VulkanGpu) or a scripted in-memory device.

use ash::vk;
use swapframe_rhi::RhiResult;
use swapframe_rhi::swapchain::{SwapchainDesc, SwapchainSupportDetails};

slotmap::new_key_type! {
    /// A frame-complete fence.
    pub struct FenceId;
    /// A binary semaphore used between acquire, submit and present.
    pub struct SemaphoreId;
    /// A recorded command list for one swapchain image.
    pub struct CommandListId;
}

/// Fixed properties of the logical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Sample count used for the color and depth attachments.
    pub max_samples: vk::SampleCountFlags,
    pub depth_format: vk::Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    Acquired { image_index: u32, suboptimal: bool },
    OutOfDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    Suboptimal,
    OutOfDate,
}

impl PresentOutcome {
    /// Whether the surface must be rebuilt after this present.
    #[inline]
    pub fn needs_rebuild(self) -> bool {
        !matches!(self, PresentOutcome::Presented)
    }
}

/// One graphics-queue submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub command_list: CommandListId,
    /// Waited on at the color-attachment-output stage.
    pub wait: SemaphoreId,
    pub signal: SemaphoreId,
    pub fence: FenceId,
}

/// Backend for [`FramePipeline`](crate::FramePipeline).
///
/// Surface-scoped objects (swapchain, attachments, command lists) are created
/// and destroyed in strict order by the pipeline: a swapchain exists before its
/// attachments, attachments before command lists, and teardown runs in reverse.
pub trait Gpu {
    fn capabilities(&self) -> DeviceCapabilities;

    /// Queries what the native surface currently supports.
    fn surface_support(&self) -> RhiResult<SwapchainSupportDetails>;

    fn create_fence(&mut self, signaled: bool) -> RhiResult<FenceId>;
    fn destroy_fence(&mut self, fence: FenceId);
    fn create_semaphore(&mut self) -> RhiResult<SemaphoreId>;
    fn destroy_semaphore(&mut self, semaphore: SemaphoreId);

    /// Blocks until `fence` is signaled.
    fn wait_fence(&mut self, fence: FenceId) -> RhiResult<()>;
    fn reset_fence(&mut self, fence: FenceId) -> RhiResult<()>;
    fn wait_idle(&mut self) -> RhiResult<()>;

    /// Creates the swapchain and returns how many images it actually has.
    fn create_swapchain(&mut self, desc: &SwapchainDesc) -> RhiResult<u32>;
    fn destroy_swapchain(&mut self);

    /// Creates the per-image attachment sets and uniform memory for the current
    /// swapchain.
    fn create_attachments(&mut self, extent: vk::Extent2D) -> RhiResult<()>;
    fn destroy_attachments(&mut self);

    /// Records the replayable draw for `image_index`.
    fn record_command_list(&mut self, image_index: u32) -> RhiResult<CommandListId>;
    fn free_command_list(&mut self, list: CommandListId);

    fn acquire_next_image(&mut self, signal: SemaphoreId) -> RhiResult<AcquireOutcome>;

    /// Copies the per-frame payload into `image_index`'s uniform memory.
    fn write_frame_data(&mut self, image_index: u32, data: &[u8]) -> RhiResult<()>;

    fn submit(&mut self, submission: &Submission) -> RhiResult<()>;
    fn present(&mut self, image_index: u32, wait: SemaphoreId) -> RhiResult<PresentOutcome>;
}
