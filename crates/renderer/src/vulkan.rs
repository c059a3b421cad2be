//! [`Gpu`] backend over the RHI.
//!
//! Synchronization objects and command lists live in slot maps keyed by the
//! ids the frame pipeline holds. Everything tied to one swapchain generation
//! (attachments, uniform buffers, descriptor sets and the graphics pipeline)
//! is grouped in [`SurfaceResources`] and replaced wholesale on rebuild. The
//! pipeline is rebuilt from the SPIR-V files on disk each time, so edited
//! shaders are picked up by resizing the window.

use std::sync::Arc;

use ash::vk;
use slotmap::SlotMap;
use tracing::{debug, error, info, warn};

use swapframe_core::config::RendererConfig;
use swapframe_platform::{Surface, Window};
use swapframe_resources::MeshData;
use swapframe_rhi::buffer::{Buffer, BufferUsage};
use swapframe_rhi::command::{CommandBuffer, CommandPool};
use swapframe_rhi::descriptor::{
    DescriptorPool, DescriptorSetLayout, uniform_buffer_binding, uniform_pool_sizes,
    write_uniform_buffer,
};
use swapframe_rhi::device::Device;
use swapframe_rhi::instance::Instance;
use swapframe_rhi::physical_device::select_physical_device;
use swapframe_rhi::pipeline::{CullMode, FrontFace, GraphicsPipelineBuilder, Pipeline, PipelineLayout};
use swapframe_rhi::shader::{Shader, ShaderStage};
use swapframe_rhi::swapchain::{Swapchain, SwapchainDesc, SwapchainSupportDetails};
use swapframe_rhi::sync::{Fence, Semaphore};
use swapframe_rhi::vertex::MeshVertex;
use swapframe_rhi::{RhiError, RhiResult};

use crate::attachments::{AttachmentImage, has_stencil_component};
use crate::driver::PipelineState;
use crate::error::{RenderError, RenderResult};
use crate::gpu::{
    AcquireOutcome, CommandListId, DeviceCapabilities, FenceId, Gpu, PresentOutcome,
    SemaphoreId, Submission,
};
use crate::ubo::MvpUbo;

const APPLICATION_NAME: &str = "swapframe";

struct GpuMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
}

/// Render targets and uniform memory for one swapchain image.
struct ImageTargets {
    uniform: Buffer,
    descriptor_set: vk::DescriptorSet,
    color: Option<AttachmentImage>,
    depth: AttachmentImage,
}

/// Everything that depends on the swapchain's format, extent or image count.
struct SurfaceResources {
    targets: Vec<ImageTargets>,
    pipeline: Pipeline,
    // Frees the descriptor sets above
    _descriptor_pool: DescriptorPool,
    extent: vk::Extent2D,
}

/// Vulkan implementation of [`Gpu`] drawing one indexed mesh.
pub struct VulkanGpu {
    // Fields drop in declaration order: per-generation objects first, then the
    // long-lived ones, then the surface, device and instance.
    command_lists: SlotMap<CommandListId, CommandBuffer>,
    resources: Option<SurfaceResources>,
    swapchain: Option<Swapchain>,
    fences: SlotMap<FenceId, Fence>,
    semaphores: SlotMap<SemaphoreId, Semaphore>,
    mesh: GpuMesh,
    pipeline_layout: PipelineLayout,
    descriptor_set_layout: DescriptorSetLayout,
    command_pool: CommandPool,
    surface: Surface,
    device: Arc<Device>,
    instance: Instance,

    capabilities: DeviceCapabilities,
    config: RendererConfig,
}

impl VulkanGpu {
    /// Brings up the device for `window` and uploads `mesh`.
    ///
    /// A missing GPU or depth format is a [`RenderError::ConfigurationError`].
    pub fn new(window: &Window, config: &RendererConfig, mesh: &MeshData) -> RenderResult<Self> {
        let extensions = window
            .required_extensions()
            .map_err(|e| RenderError::ConfigurationError(e.to_string()))?;

        let instance =
            Instance::new(APPLICATION_NAME, &extensions, config.validation).map_err(startup_error)?;

        let surface = window
            .create_surface(instance.entry(), instance.handle())
            .map_err(|e| startup_error(RhiError::SurfaceError(e.to_string())))?;

        let physical_device =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())
                .map_err(startup_error)?;

        let depth_format = physical_device.depth_format.ok_or_else(|| {
            RenderError::ConfigurationError(format!(
                "{} supports none of the depth attachment formats",
                physical_device.device_name()
            ))
        })?;
        let max_samples = if config.msaa {
            physical_device.max_sample_count
        } else {
            vk::SampleCountFlags::TYPE_1
        };

        let device = Device::new(&instance, &physical_device).map_err(startup_error)?;

        let graphics_family = device.queue_families().graphics_family.ok_or_else(|| {
            RenderError::ConfigurationError("device has no graphics queue".to_string())
        })?;
        let command_pool =
            CommandPool::new(device.clone(), graphics_family).map_err(startup_error)?;

        let descriptor_set_layout = DescriptorSetLayout::new(
            device.clone(),
            &[uniform_buffer_binding(0, vk::ShaderStageFlags::VERTEX)],
        )
        .map_err(startup_error)?;
        let pipeline_layout =
            PipelineLayout::new(device.clone(), &[descriptor_set_layout.handle()])
                .map_err(startup_error)?;

        let mesh = upload_mesh(&device, mesh).map_err(startup_error)?;

        info!(
            "Vulkan backend ready on {}: depth {:?}, {:?}, {} indices",
            physical_device.device_name(),
            depth_format,
            max_samples,
            mesh.index_count
        );

        Ok(Self {
            command_lists: SlotMap::with_key(),
            resources: None,
            swapchain: None,
            fences: SlotMap::with_key(),
            semaphores: SlotMap::with_key(),
            mesh,
            pipeline_layout,
            descriptor_set_layout,
            command_pool,
            surface,
            device,
            instance,
            capabilities: DeviceCapabilities {
                max_samples,
                depth_format,
            },
            config: config.clone(),
        })
    }

    fn swapchain(&self) -> RhiResult<&Swapchain> {
        self.swapchain
            .as_ref()
            .ok_or_else(|| RhiError::SwapchainError("no swapchain exists".to_string()))
    }

    fn resources(&self) -> RhiResult<&SurfaceResources> {
        self.resources
            .as_ref()
            .ok_or_else(|| RhiError::InvalidHandle("surface resources not created".to_string()))
    }

    fn semaphore(&self, id: SemaphoreId) -> RhiResult<vk::Semaphore> {
        self.semaphores
            .get(id)
            .map(Semaphore::handle)
            .ok_or_else(|| RhiError::InvalidHandle(format!("stale semaphore {:?}", id)))
    }

    fn fence(&self, id: FenceId) -> RhiResult<&Fence> {
        self.fences
            .get(id)
            .ok_or_else(|| RhiError::InvalidHandle(format!("stale fence {:?}", id)))
    }

    fn multisampled(&self) -> bool {
        self.capabilities.max_samples != vk::SampleCountFlags::TYPE_1
    }

    fn create_graphics_pipeline(&self, color_format: vk::Format) -> RhiResult<Pipeline> {
        let vertex_shader = Shader::from_spirv_file(
            self.device.clone(),
            &self.config.vertex_shader,
            ShaderStage::Vertex,
            "main",
        )?;
        let fragment_shader = Shader::from_spirv_file(
            self.device.clone(),
            &self.config.fragment_shader,
            ShaderStage::Fragment,
            "main",
        )?;

        GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(MeshVertex::binding_description())
            .vertex_attributes(&MeshVertex::attribute_descriptions())
            .cull_mode(CullMode::None)
            .front_face(FrontFace::CounterClockwise)
            .rasterization_samples(self.capabilities.max_samples)
            .color_attachment_format(color_format)
            .depth_attachment_format(self.capabilities.depth_format)
            .build(self.device.clone(), &self.pipeline_layout)
    }

    fn create_image_targets(
        &self,
        extent: vk::Extent2D,
        color_format: vk::Format,
        descriptor_set: vk::DescriptorSet,
    ) -> RhiResult<ImageTargets> {
        let samples = self.capabilities.max_samples;

        let uniform = Buffer::new(
            self.device.clone(),
            BufferUsage::Uniform,
            MvpUbo::SIZE as vk::DeviceSize,
        )?;
        write_uniform_buffer(
            &self.device,
            descriptor_set,
            0,
            uniform.handle(),
            MvpUbo::SIZE as vk::DeviceSize,
        );

        let color = if self.multisampled() {
            Some(AttachmentImage::multisampled_color(
                self.device.clone(),
                extent,
                color_format,
                samples,
            )?)
        } else {
            None
        };
        let depth = AttachmentImage::depth(
            self.device.clone(),
            extent,
            self.capabilities.depth_format,
            samples,
        )?;

        Ok(ImageTargets {
            uniform,
            descriptor_set,
            color,
            depth,
        })
    }

    fn record_draw(&self, cmd: &CommandBuffer, image_index: usize) -> RhiResult<()> {
        let swapchain = self.swapchain()?;
        let resources = self.resources()?;
        let targets = resources.targets.get(image_index).ok_or_else(|| {
            RhiError::InvalidHandle(format!("no render targets for image {}", image_index))
        })?;
        let extent = resources.extent;
        let present_image = swapchain.image(image_index);

        cmd.begin_reusable()?;

        transition_image(
            cmd,
            present_image,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageAspectFlags::COLOR,
        );
        if let Some(color) = &targets.color {
            transition_image(
                cmd,
                color.image(),
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::ImageAspectFlags::COLOR,
            );
        }
        let depth_aspect = if has_stencil_component(targets.depth.format()) {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        } else {
            vk::ImageAspectFlags::DEPTH
        };
        transition_image(
            cmd,
            targets.depth.image(),
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            depth_aspect,
        );

        let clear_color = vk::ClearValue {
            color: vk::ClearColorValue {
                float32: self.config.clear_color,
            },
        };

        // With MSAA the multisampled target is rendered and resolved into the
        // swapchain image, which is then the only thing stored
        let color_attachment = match &targets.color {
            Some(color) => vk::RenderingAttachmentInfo::default()
                .image_view(color.image_view())
                .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                .resolve_mode(vk::ResolveModeFlags::AVERAGE)
                .resolve_image_view(swapchain.image_view(image_index))
                .resolve_image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::DONT_CARE)
                .clear_value(clear_color),
            None => vk::RenderingAttachmentInfo::default()
                .image_view(swapchain.image_view(image_index))
                .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::STORE)
                .clear_value(clear_color),
        };

        let depth_attachment = vk::RenderingAttachmentInfo::default()
            .image_view(targets.depth.image_view())
            .image_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .clear_value(vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            });

        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };
        let rendering_info = vk::RenderingInfo::default()
            .render_area(render_area)
            .layer_count(1)
            .color_attachments(std::slice::from_ref(&color_attachment))
            .depth_attachment(&depth_attachment);

        cmd.begin_rendering(&rendering_info);
        cmd.set_viewport(&vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        });
        cmd.set_scissor(&render_area);
        cmd.bind_pipeline(vk::PipelineBindPoint::GRAPHICS, resources.pipeline.handle());
        cmd.bind_vertex_buffers(0, &[self.mesh.vertex_buffer.handle()], &[0]);
        cmd.bind_index_buffer(self.mesh.index_buffer.handle(), 0, vk::IndexType::UINT32);
        cmd.bind_descriptor_sets(
            vk::PipelineBindPoint::GRAPHICS,
            self.pipeline_layout.handle(),
            &[targets.descriptor_set],
        );
        cmd.draw_indexed(self.mesh.index_count, 1);
        cmd.end_rendering();

        transition_image(
            cmd,
            present_image,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::PRESENT_SRC_KHR,
            vk::ImageAspectFlags::COLOR,
        );

        cmd.end()
    }
}

impl Gpu for VulkanGpu {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn surface_support(&self) -> RhiResult<SwapchainSupportDetails> {
        SwapchainSupportDetails::query(
            self.device.physical_device(),
            self.surface.handle(),
            self.surface.loader(),
        )
    }

    fn create_fence(&mut self, signaled: bool) -> RhiResult<FenceId> {
        let fence = Fence::new(self.device.clone(), signaled)?;
        Ok(self.fences.insert(fence))
    }

    fn destroy_fence(&mut self, fence: FenceId) {
        if self.fences.remove(fence).is_none() {
            warn!("Destroying unknown fence {:?}", fence);
        }
    }

    fn create_semaphore(&mut self) -> RhiResult<SemaphoreId> {
        let semaphore = Semaphore::new(self.device.clone())?;
        Ok(self.semaphores.insert(semaphore))
    }

    fn destroy_semaphore(&mut self, semaphore: SemaphoreId) {
        if self.semaphores.remove(semaphore).is_none() {
            warn!("Destroying unknown semaphore {:?}", semaphore);
        }
    }

    fn wait_fence(&mut self, fence: FenceId) -> RhiResult<()> {
        self.fence(fence)?.wait(u64::MAX)
    }

    fn reset_fence(&mut self, fence: FenceId) -> RhiResult<()> {
        self.fence(fence)?.reset()
    }

    fn wait_idle(&mut self) -> RhiResult<()> {
        self.device.wait_idle()
    }

    fn create_swapchain(&mut self, desc: &SwapchainDesc) -> RhiResult<u32> {
        if self.swapchain.is_some() {
            return Err(RhiError::SwapchainError(
                "previous swapchain must be destroyed first".to_string(),
            ));
        }
        let swapchain = Swapchain::new(
            &self.instance,
            self.device.clone(),
            self.surface.handle(),
            desc,
        )?;
        let image_count = swapchain.image_count();
        self.swapchain = Some(swapchain);
        Ok(image_count)
    }

    fn destroy_swapchain(&mut self) {
        self.swapchain = None;
    }

    fn create_attachments(&mut self, extent: vk::Extent2D) -> RhiResult<()> {
        let (color_format, image_count) = {
            let swapchain = self.swapchain()?;
            (swapchain.format(), swapchain.image_count())
        };

        let pipeline = self.create_graphics_pipeline(color_format)?;

        let descriptor_pool = DescriptorPool::new(
            self.device.clone(),
            image_count,
            &uniform_pool_sizes(image_count),
        )?;
        let layouts = vec![self.descriptor_set_layout.handle(); image_count as usize];
        let descriptor_sets = descriptor_pool.allocate(&layouts)?;

        let targets = descriptor_sets
            .into_iter()
            .map(|set| self.create_image_targets(extent, color_format, set))
            .collect::<RhiResult<Vec<_>>>()?;

        debug!(
            "Created render targets for {} images ({}x{})",
            targets.len(),
            extent.width,
            extent.height
        );

        self.resources = Some(SurfaceResources {
            targets,
            pipeline,
            _descriptor_pool: descriptor_pool,
            extent,
        });
        Ok(())
    }

    fn destroy_attachments(&mut self) {
        if let Some(resources) = self.resources.take() {
            debug!("Destroying render targets for {} images", resources.targets.len());
        }
    }

    fn record_command_list(&mut self, image_index: u32) -> RhiResult<CommandListId> {
        let cmd = self.command_pool.allocate()?;
        if let Err(e) = self.record_draw(&cmd, image_index as usize) {
            self.command_pool.free(std::slice::from_ref(&cmd));
            return Err(e);
        }
        Ok(self.command_lists.insert(cmd))
    }

    fn free_command_list(&mut self, list: CommandListId) {
        match self.command_lists.remove(list) {
            Some(cmd) => self.command_pool.free(std::slice::from_ref(&cmd)),
            None => warn!("Freeing unknown command list {:?}", list),
        }
    }

    fn acquire_next_image(&mut self, signal: SemaphoreId) -> RhiResult<AcquireOutcome> {
        let semaphore = self.semaphore(signal)?;
        match self.swapchain()?.acquire_next_image(semaphore) {
            Ok((image_index, suboptimal)) => Ok(AcquireOutcome::Acquired {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(RhiError::VulkanError(e)),
        }
    }

    fn write_frame_data(&mut self, image_index: u32, data: &[u8]) -> RhiResult<()> {
        let targets = self
            .resources()?
            .targets
            .get(image_index as usize)
            .ok_or_else(|| {
                RhiError::InvalidHandle(format!("no uniform buffer for image {}", image_index))
            })?;
        targets.uniform.write_data(0, data)
    }

    fn submit(&mut self, submission: &Submission) -> RhiResult<()> {
        let command_buffer = self
            .command_lists
            .get(submission.command_list)
            .map(CommandBuffer::handle)
            .ok_or_else(|| {
                RhiError::InvalidHandle(format!(
                    "stale command list {:?}",
                    submission.command_list
                ))
            })?;

        let wait_semaphores = [self.semaphore(submission.wait)?];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [self.semaphore(submission.signal)?];
        let command_buffers = [command_buffer];
        let fence = self.fence(submission.fence)?.handle();

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        // The pipeline resets the fence right before submitting and never
        // resubmits a list before its fence has been waited on
        unsafe { self.device.submit_graphics(&[submit_info], fence) }
    }

    fn present(&mut self, image_index: u32, wait: SemaphoreId) -> RhiResult<PresentOutcome> {
        let semaphore = self.semaphore(wait)?;
        let result = self
            .swapchain()?
            .present(self.device.present_queue(), image_index, semaphore);

        match result {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(RhiError::VulkanError(e)),
        }
    }
}

impl Drop for VulkanGpu {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            error!("Failed to wait for device idle before teardown: {}", e);
        }
        let lists: Vec<CommandBuffer> = self.command_lists.drain().map(|(_, cmd)| cmd).collect();
        self.command_pool.free(&lists);
        info!("Vulkan backend shutting down");
    }
}

fn startup_error(source: RhiError) -> RenderError {
    match source {
        RhiError::NoSuitableGpu => {
            RenderError::ConfigurationError("no GPU supports the required features".to_string())
        }
        source => RenderError::DeviceError {
            stage: PipelineState::Idle,
            source,
        },
    }
}

fn upload_mesh(device: &Arc<Device>, mesh: &MeshData) -> RhiResult<GpuMesh> {
    let vertex_buffer =
        Buffer::new_with_data(device.clone(), BufferUsage::Vertex, mesh.vertex_bytes())?;
    let index_buffer =
        Buffer::new_with_data(device.clone(), BufferUsage::Index, mesh.index_bytes())?;

    debug!(
        "Uploaded mesh: {} vertices, {} indices",
        mesh.vertices.len(),
        mesh.indices.len()
    );

    Ok(GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: mesh.index_count(),
    })
}

/// Stage and access masks for the layout transitions recorded per image.
fn transition_masks(
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) -> (
    vk::PipelineStageFlags,
    vk::AccessFlags,
    vk::PipelineStageFlags,
    vk::AccessFlags,
) {
    match (old_layout, new_layout) {
        // Chained to the acquire semaphore, which is waited on at this stage
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL) => (
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            vk::AccessFlags::empty(),
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        ),
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL) => (
            vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        ),
        (vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL, vk::ImageLayout::PRESENT_SRC_KHR) => (
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            vk::AccessFlags::empty(),
        ),
        _ => {
            warn!(
                "Unhandled layout transition: {:?} -> {:?}",
                old_layout, new_layout
            );
            (
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
            )
        }
    }
}

fn transition_image(
    cmd: &CommandBuffer,
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    aspect_mask: vk::ImageAspectFlags,
) {
    let (src_stage, src_access, dst_stage, dst_access) = transition_masks(old_layout, new_layout);

    let barrier = vk::ImageMemoryBarrier::default()
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(
            vk::ImageSubresourceRange::default()
                .aspect_mask(aspect_mask)
                .base_mip_level(0)
                .level_count(1)
                .base_array_layer(0)
                .layer_count(1),
        )
        .src_access_mask(src_access)
        .dst_access_mask(dst_access);

    cmd.pipeline_barrier(src_stage, dst_stage, &[barrier]);
}
