//! Which frame-complete fence last claimed each swapchain image.
//!
//! With more swapchain images than frame slots, acquire can hand back an image
//! whose previous submission came from a different slot and may still be
//! running. Waiting on that fence before touching the image's uniform memory
//! keeps the CPU from overwriting data the GPU is reading.

use tracing::trace;

use swapframe_rhi::RhiResult;

use crate::gpu::{FenceId, Gpu};

/// Per-image claims. Entries are borrowed ids; the fences belong to the frame
/// slot pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTracker {
    claims: Vec<Option<FenceId>>,
}

impl ImageTracker {
    pub fn new(image_count: u32) -> Self {
        Self {
            claims: vec![None; image_count as usize],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// The fence that last claimed `image`, if any.
    #[inline]
    pub fn claim(&self, image: u32) -> Option<FenceId> {
        self.claims.get(image as usize).copied().flatten()
    }

    /// Overwrites the claim for `image`. Out-of-range images are ignored.
    pub fn record_claim(&mut self, image: u32, fence: FenceId) {
        if let Some(entry) = self.claims.get_mut(image as usize) {
            *entry = Some(fence);
        }
    }

    /// Blocks on the fence that last claimed `image`. Returns whether there was
    /// one. The claim itself stays in place.
    pub fn wait_if_claimed<G: Gpu + ?Sized>(&self, image: u32, gpu: &mut G) -> RhiResult<bool> {
        match self.claim(image) {
            Some(fence) => {
                trace!("Image {} claimed by {:?}, waiting", image, fence);
                gpu.wait_fence(fence)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Forgets every claim and resizes to `image_count` entries.
    pub fn reset(&mut self, image_count: u32) {
        self.claims.clear();
        self.claims.resize(image_count as usize, None);
    }
}
