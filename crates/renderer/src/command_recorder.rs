//! One pre-recorded command list per swapchain image.

use tracing::debug;

use swapframe_rhi::{RhiError, RhiResult};

use crate::gpu::{CommandListId, Gpu};
use crate::swap_surface::SwapSurface;

/// Lists recorded against a single surface generation.
///
/// Asking for a list with any other generation fails, so a list recorded
/// against a destroyed swapchain is never replayed.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    generation: Option<u64>,
    lists: Vec<CommandListId>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one list per image of `surface`, replacing nothing: any previous
    /// lists must already have been freed.
    pub fn record_all<G: Gpu + ?Sized>(&mut self, gpu: &mut G, surface: &SwapSurface) -> RhiResult<()> {
        debug_assert!(self.lists.is_empty(), "previous command lists were not freed");

        self.lists.reserve(surface.image_count() as usize);
        for image in 0..surface.image_count() {
            let list = gpu.record_command_list(image)?;
            self.lists.push(list);
        }
        self.generation = Some(surface.generation());

        debug!(
            "Recorded {} command lists for generation {}",
            self.lists.len(),
            surface.generation()
        );
        Ok(())
    }

    /// The list for `image`, provided it was recorded for `generation`.
    pub fn list(&self, image: u32, generation: u64) -> RhiResult<CommandListId> {
        if self.generation != Some(generation) {
            return Err(RhiError::InvalidHandle(format!(
                "command lists belong to generation {:?}, surface is at {}",
                self.generation, generation
            )));
        }
        self.lists.get(image as usize).copied().ok_or_else(|| {
            RhiError::InvalidHandle(format!("no command list for image {}", image))
        })
    }

    #[inline]
    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Frees every list. The device must be idle.
    pub fn free_all<G: Gpu + ?Sized>(&mut self, gpu: &mut G) {
        let count = self.lists.len();
        for list in self.lists.drain(..) {
            gpu.free_command_list(list);
        }
        if let Some(generation) = self.generation.take() {
            debug!("Freed {} command lists of generation {}", count, generation);
        }
    }
}
