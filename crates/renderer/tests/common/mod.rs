//! Scripted in-memory GPU for driving `FramePipeline` without a device.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use slotmap::SlotMap;
use swapframe_platform::ExtentSource;
use swapframe_renderer::{
    AcquireOutcome, CommandListId, DeviceCapabilities, FenceId, FramePayload, Gpu,
    PresentOutcome, SemaphoreId, Submission,
};
use swapframe_rhi::swapchain::{SwapchainDesc, SwapchainSupportDetails};
use swapframe_rhi::{RhiError, RhiResult, vk};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceState {
    Signaled,
    Unsignaled,
    /// Submitted and not yet observed complete.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    WaitFence { fence: FenceId, blocked: bool },
    ResetFence(FenceId),
    WaitIdle,
    CreateSwapchain { extent: vk::Extent2D, image_count: u32 },
    DestroySwapchain,
    CreateAttachments(vk::Extent2D),
    DestroyAttachments,
    RecordCommandList { image: u32, list: CommandListId },
    FreeCommandList(CommandListId),
    Acquire { image: u32 },
    AcquireOutOfDate,
    WriteFrameData { image: u32 },
    Submit(Submission),
    Present { image: u32, outcome: PresentOutcome },
}

/// A result to force from a scripted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    OutOfDate,
    Suboptimal,
    DeviceLost,
}

pub struct MockGpu {
    pub log: Vec<Event>,
    /// Submitted fences complete immediately instead of on the next wait.
    pub auto_complete: bool,
    pub support: SwapchainSupportDetails,
    /// Images the driver reports beyond `min_image_count`.
    pub extra_images: u32,

    fences: SlotMap<FenceId, FenceState>,
    semaphores: SlotMap<SemaphoreId, ()>,
    lists: SlotMap<CommandListId, u32>,

    swapchain_images: Option<u32>,
    attachments: bool,
    next_image: u32,
    acquire_order: VecDeque<u32>,

    acquire_calls: usize,
    present_calls: usize,
    submit_calls: usize,
    acquire_injections: HashMap<usize, Injection>,
    present_injections: HashMap<usize, Injection>,
    submit_injections: HashMap<usize, Injection>,
}

impl MockGpu {
    /// A surface that leaves the extent to the swapchain, clamped to
    /// 1x1..=4096x4096, with `min_images` minimum images and no maximum.
    pub fn new(min_images: u32) -> Self {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: min_images,
            max_image_count: 0,
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 1,
                height: 1,
            },
            max_image_extent: vk::Extent2D {
                width: 4096,
                height: 4096,
            },
            ..Default::default()
        };

        Self {
            log: Vec::new(),
            auto_complete: false,
            support: SwapchainSupportDetails {
                capabilities,
                formats: vec![vk::SurfaceFormatKHR {
                    format: vk::Format::B8G8R8A8_SRGB,
                    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                }],
                present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
            },
            extra_images: 0,
            fences: SlotMap::with_key(),
            semaphores: SlotMap::with_key(),
            lists: SlotMap::with_key(),
            swapchain_images: None,
            attachments: false,
            next_image: 0,
            acquire_order: VecDeque::new(),
            acquire_calls: 0,
            present_calls: 0,
            submit_calls: 0,
            acquire_injections: HashMap::new(),
            present_injections: HashMap::new(),
            submit_injections: HashMap::new(),
        }
    }

    /// Images returned by the next acquires, in order. Round robin afterwards.
    pub fn script_acquires(&mut self, images: &[u32]) {
        self.acquire_order.extend(images);
    }

    /// Forces the `call`-th acquire (1-based) to return `injection`.
    pub fn inject_acquire(&mut self, call: usize, injection: Injection) {
        self.acquire_injections.insert(call, injection);
    }

    pub fn inject_present(&mut self, call: usize, injection: Injection) {
        self.present_injections.insert(call, injection);
    }

    pub fn inject_submit(&mut self, call: usize, injection: Injection) {
        self.submit_injections.insert(call, injection);
    }

    pub fn fence_state(&self, fence: FenceId) -> Option<FenceState> {
        self.fences.get(fence).copied()
    }

    pub fn live_fences(&self) -> usize {
        self.fences.len()
    }

    pub fn live_semaphores(&self) -> usize {
        self.semaphores.len()
    }

    pub fn live_command_lists(&self) -> usize {
        self.lists.len()
    }

    pub fn has_swapchain(&self) -> bool {
        self.swapchain_images.is_some()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.log.iter().filter(|e| predicate(e)).count()
    }

    pub fn submits(&self) -> Vec<Submission> {
        self.log
            .iter()
            .filter_map(|e| match e {
                Event::Submit(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn successful_presents(&self) -> usize {
        self.count(|e| {
            matches!(
                e,
                Event::Present {
                    outcome: PresentOutcome::Presented | PresentOutcome::Suboptimal,
                    ..
                }
            )
        })
    }

    pub fn swapchains_created(&self) -> usize {
        self.count(|e| matches!(e, Event::CreateSwapchain { .. }))
    }

    fn device_lost() -> RhiError {
        RhiError::VulkanError(vk::Result::ERROR_DEVICE_LOST)
    }
}

impl Gpu for MockGpu {
    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities {
            max_samples: vk::SampleCountFlags::TYPE_4,
            depth_format: vk::Format::D32_SFLOAT,
        }
    }

    fn surface_support(&self) -> RhiResult<SwapchainSupportDetails> {
        Ok(self.support.clone())
    }

    fn create_fence(&mut self, signaled: bool) -> RhiResult<FenceId> {
        let state = if signaled {
            FenceState::Signaled
        } else {
            FenceState::Unsignaled
        };
        Ok(self.fences.insert(state))
    }

    fn destroy_fence(&mut self, fence: FenceId) {
        let state = self.fences.remove(fence).expect("destroying unknown fence");
        assert_ne!(state, FenceState::Pending, "destroyed a fence still in use");
    }

    fn create_semaphore(&mut self) -> RhiResult<SemaphoreId> {
        Ok(self.semaphores.insert(()))
    }

    fn destroy_semaphore(&mut self, semaphore: SemaphoreId) {
        self.semaphores
            .remove(semaphore)
            .expect("destroying unknown semaphore");
    }

    fn wait_fence(&mut self, fence: FenceId) -> RhiResult<()> {
        let state = self
            .fences
            .get_mut(fence)
            .ok_or_else(|| RhiError::InvalidHandle("unknown fence".to_string()))?;
        let blocked = match *state {
            FenceState::Signaled => false,
            FenceState::Pending => {
                *state = FenceState::Signaled;
                true
            }
            FenceState::Unsignaled => panic!("waiting on a fence that was never submitted"),
        };
        self.log.push(Event::WaitFence { fence, blocked });
        Ok(())
    }

    fn reset_fence(&mut self, fence: FenceId) -> RhiResult<()> {
        let state = self
            .fences
            .get_mut(fence)
            .ok_or_else(|| RhiError::InvalidHandle("unknown fence".to_string()))?;
        assert_ne!(*state, FenceState::Pending, "reset a fence still in use");
        *state = FenceState::Unsignaled;
        self.log.push(Event::ResetFence(fence));
        Ok(())
    }

    fn wait_idle(&mut self) -> RhiResult<()> {
        for state in self.fences.values_mut() {
            if *state == FenceState::Pending {
                *state = FenceState::Signaled;
            }
        }
        self.log.push(Event::WaitIdle);
        Ok(())
    }

    fn create_swapchain(&mut self, desc: &SwapchainDesc) -> RhiResult<u32> {
        assert!(self.swapchain_images.is_none(), "swapchain created twice");
        let image_count = desc.min_image_count + self.extra_images;
        self.swapchain_images = Some(image_count);
        self.next_image = 0;
        self.log.push(Event::CreateSwapchain {
            extent: desc.extent,
            image_count,
        });
        Ok(image_count)
    }

    fn destroy_swapchain(&mut self) {
        assert!(!self.attachments, "swapchain destroyed before its attachments");
        assert!(self.swapchain_images.take().is_some(), "no swapchain to destroy");
        self.log.push(Event::DestroySwapchain);
    }

    fn create_attachments(&mut self, extent: vk::Extent2D) -> RhiResult<()> {
        assert!(self.swapchain_images.is_some(), "attachments need a swapchain");
        self.attachments = true;
        self.log.push(Event::CreateAttachments(extent));
        Ok(())
    }

    fn destroy_attachments(&mut self) {
        assert!(self.lists.is_empty(), "attachments destroyed before command lists");
        self.attachments = false;
        self.log.push(Event::DestroyAttachments);
    }

    fn record_command_list(&mut self, image_index: u32) -> RhiResult<CommandListId> {
        assert!(self.attachments, "recording without attachments");
        let list = self.lists.insert(image_index);
        self.log.push(Event::RecordCommandList {
            image: image_index,
            list,
        });
        Ok(list)
    }

    fn free_command_list(&mut self, list: CommandListId) {
        self.lists.remove(list).expect("freeing unknown command list");
        self.log.push(Event::FreeCommandList(list));
    }

    fn acquire_next_image(&mut self, _signal: SemaphoreId) -> RhiResult<AcquireOutcome> {
        self.acquire_calls += 1;
        let image_count = self
            .swapchain_images
            .ok_or_else(|| RhiError::SwapchainError("acquire without swapchain".to_string()))?;

        let suboptimal = match self.acquire_injections.get(&self.acquire_calls) {
            Some(Injection::OutOfDate) => {
                self.log.push(Event::AcquireOutOfDate);
                return Ok(AcquireOutcome::OutOfDate);
            }
            Some(Injection::DeviceLost) => return Err(Self::device_lost()),
            Some(Injection::Suboptimal) => true,
            None => false,
        };

        let image = match self.acquire_order.pop_front() {
            Some(image) => image,
            None => {
                let image = self.next_image % image_count;
                self.next_image += 1;
                image
            }
        };
        self.log.push(Event::Acquire { image });
        Ok(AcquireOutcome::Acquired {
            image_index: image,
            suboptimal,
        })
    }

    fn write_frame_data(&mut self, image_index: u32, data: &[u8]) -> RhiResult<()> {
        assert!(!data.is_empty());
        self.log.push(Event::WriteFrameData { image: image_index });
        Ok(())
    }

    fn submit(&mut self, submission: &Submission) -> RhiResult<()> {
        self.submit_calls += 1;
        if let Some(Injection::DeviceLost) = self.submit_injections.get(&self.submit_calls) {
            return Err(Self::device_lost());
        }
        if !self.lists.contains_key(submission.command_list) {
            return Err(RhiError::InvalidHandle("stale command list".to_string()));
        }

        let auto_complete = self.auto_complete;
        let state = self
            .fences
            .get_mut(submission.fence)
            .ok_or_else(|| RhiError::InvalidHandle("unknown fence".to_string()))?;
        assert_eq!(*state, FenceState::Unsignaled, "submitted with an unreset fence");
        *state = if auto_complete {
            FenceState::Signaled
        } else {
            FenceState::Pending
        };

        self.log.push(Event::Submit(*submission));
        Ok(())
    }

    fn present(&mut self, image_index: u32, _wait: SemaphoreId) -> RhiResult<PresentOutcome> {
        self.present_calls += 1;
        let outcome = match self.present_injections.get(&self.present_calls) {
            Some(Injection::OutOfDate) => PresentOutcome::OutOfDate,
            Some(Injection::Suboptimal) => PresentOutcome::Suboptimal,
            Some(Injection::DeviceLost) => return Err(Self::device_lost()),
            None => PresentOutcome::Presented,
        };
        self.log.push(Event::Present {
            image: image_index,
            outcome,
        });
        Ok(outcome)
    }
}

/// An extent the test can change between frames.
#[derive(Clone)]
pub struct SharedExtent(pub Rc<Cell<vk::Extent2D>>);

impl SharedExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self(Rc::new(Cell::new(vk::Extent2D { width, height })))
    }

    pub fn set(&self, width: u32, height: u32) {
        self.0.set(vk::Extent2D { width, height });
    }
}

impl ExtentSource for SharedExtent {
    fn current_extent(&self) -> vk::Extent2D {
        self.0.get()
    }
}

/// A fixed 16-byte payload.
pub struct StaticPayload([u8; 16]);

impl StaticPayload {
    pub fn new() -> Self {
        Self([7; 16])
    }
}

impl FramePayload for StaticPayload {
    fn update(&mut self, _extent: vk::Extent2D) -> &[u8] {
        &self.0
    }
}
