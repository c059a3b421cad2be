//! Ring of per-frame synchronization objects.
//!
//! Each slot pairs the semaphores that chain acquire -> submit -> present with
//! the fence that tells the CPU when the slot's last submission has finished.
//! Slots live for the whole pipeline; rebuilding the surface leaves them alone.

use tracing::{debug, info};

use swapframe_rhi::RhiResult;

use crate::gpu::{FenceId, Gpu, SemaphoreId};

/// Number of frames the CPU may record ahead of the GPU.
pub const FRAMES_IN_FLIGHT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSlot {
    /// Signaled by acquire once the image can be rendered to.
    pub image_available: SemaphoreId,
    /// Signaled by the submission, waited on by present.
    pub render_finished: SemaphoreId,
    /// Signaled when the submission completes. Created signaled.
    pub in_flight: FenceId,
}

#[derive(Debug)]
pub struct FramePool {
    slots: Vec<FrameSlot>,
}

impl FramePool {
    pub fn new<G: Gpu + ?Sized>(gpu: &mut G) -> RhiResult<Self> {
        let mut slots = Vec::with_capacity(FRAMES_IN_FLIGHT);

        for i in 0..FRAMES_IN_FLIGHT {
            let image_available = gpu.create_semaphore()?;
            let render_finished = gpu.create_semaphore()?;
            // Signaled so the first wait on this slot returns immediately
            let in_flight = gpu.create_fence(true)?;

            debug!("Created frame slot {}", i);

            slots.push(FrameSlot {
                image_available,
                render_finished,
                in_flight,
            });
        }

        info!("Frame slot pool created with {} slots", FRAMES_IN_FLIGHT);
        Ok(Self { slots })
    }

    /// Slot used by frame `frame_index`.
    #[inline]
    pub fn slot_index(frame_index: u64) -> usize {
        (frame_index % FRAMES_IN_FLIGHT as u64) as usize
    }

    #[inline]
    pub fn slot(&self, frame_index: u64) -> &FrameSlot {
        &self.slots[Self::slot_index(frame_index)]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Releases every slot. The device must be idle.
    pub fn destroy<G: Gpu + ?Sized>(&mut self, gpu: &mut G) {
        for slot in self.slots.drain(..) {
            gpu.destroy_fence(slot.in_flight);
            gpu.destroy_semaphore(slot.render_finished);
            gpu.destroy_semaphore(slot.image_available);
        }
        debug!("Frame slot pool destroyed");
    }
}
