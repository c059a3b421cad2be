//! Swap surface selection and lifetime.
//!
//! A [`SwapSurface`] is plain data describing one generation of the swapchain.
//! The objects themselves live in the [`Gpu`] backend; this type decides what
//! to ask for and remembers what was created.

use ash::vk;
use tracing::{debug, info};

use swapframe_rhi::swapchain::{
    SwapchainDesc, choose_extent, choose_present_mode, choose_surface_format,
    determine_image_count,
};

use crate::driver::PipelineState;
use crate::error::{RenderError, RenderResult};
use crate::gpu::Gpu;

/// Not `Clone`: [`SwapSurface::destroy`] consumes the one record of a
/// generation.
#[derive(Debug, PartialEq, Eq)]
pub struct SwapSurface {
    generation: u64,
    format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    extent: vk::Extent2D,
    image_count: u32,
}

impl SwapSurface {
    /// Selects surface properties, then creates the swapchain and its attachments.
    ///
    /// An out-of-date result from swapchain creation means the surface changed
    /// under us and is reported as [`RenderError::TransientSurfaceInvalidation`].
    pub fn create<G: Gpu + ?Sized>(
        gpu: &mut G,
        requested: vk::Extent2D,
        generation: u64,
    ) -> RenderResult<Self> {
        let support = gpu
            .surface_support()
            .map_err(RenderError::at(PipelineState::Rebuilding))?;

        let format = choose_surface_format(&support.formats).ok_or_else(|| {
            RenderError::ConfigurationError("surface reports no supported formats".to_string())
        })?;
        let present_mode = choose_present_mode(&support.present_modes).ok_or_else(|| {
            RenderError::ConfigurationError("surface reports no present modes".to_string())
        })?;
        let extent = choose_extent(&support.capabilities, requested);
        // A minimized window can report a defined zero extent even after a
        // non-zero poll
        if extent.width == 0 || extent.height == 0 {
            return Err(RenderError::TransientSurfaceInvalidation(format!(
                "surface reports a {}x{} extent",
                extent.width, extent.height
            )));
        }
        let min_image_count = determine_image_count(&support.capabilities);

        debug!(
            "Surface selection: {:?}/{:?}, {:?}, {}x{}, {} images",
            format.format,
            format.color_space,
            present_mode,
            extent.width,
            extent.height,
            min_image_count
        );

        let desc = SwapchainDesc {
            surface_format: format,
            present_mode,
            extent,
            min_image_count,
            pre_transform: support.capabilities.current_transform,
        };

        let image_count = match gpu.create_swapchain(&desc) {
            Ok(count) => count,
            Err(e) if e.is_surface_invalidation() => {
                return Err(RenderError::TransientSurfaceInvalidation(e.to_string()));
            }
            Err(e) => return Err(RenderError::at(PipelineState::Rebuilding)(e)),
        };

        if let Err(e) = gpu.create_attachments(extent) {
            gpu.destroy_swapchain();
            return Err(RenderError::at(PipelineState::Rebuilding)(e));
        }

        info!(
            "Swap surface generation {} ready: {}x{}, {} images",
            generation, extent.width, extent.height, image_count
        );

        Ok(Self {
            generation,
            format,
            present_mode,
            extent,
            image_count,
        })
    }

    /// Releases the attachments, then the swapchain. The device must be idle.
    pub fn destroy<G: Gpu + ?Sized>(self, gpu: &mut G) {
        gpu.destroy_attachments();
        gpu.destroy_swapchain();
        debug!("Swap surface generation {} destroyed", self.generation);
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn format(&self) -> vk::Format {
        self.format.format
    }

    #[inline]
    pub fn color_space(&self) -> vk::ColorSpaceKHR {
        self.format.color_space
    }

    #[inline]
    pub fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    #[inline]
    pub fn image_count(&self) -> u32 {
        self.image_count
    }
}
