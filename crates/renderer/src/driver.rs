//! The frame pipeline driver.
//!
//! One call to [`FramePipeline::run_frame`] performs one iteration:
//!
//! 1. wait on the current slot's fence
//! 2. acquire an image (out of date: rebuild and return)
//! 3. wait on whichever fence last claimed that image, then claim it
//! 4. write the per-frame payload into the image's uniform memory
//! 5. reset the slot fence and submit the image's command list
//! 6. present
//! 7. advance the frame index, then rebuild once if anything invalidated
//!    the surface along the way
//!
//! The extent source is polled before step 1. A zero-area target tears the
//! surface down without submitting anything and leaves the pipeline
//! [`PipelineState::Suspended`] until the extent source reports a usable size.

use tracing::{debug, error, info, trace};

use swapframe_platform::ExtentSource;

use crate::command_recorder::CommandRecorder;
use crate::error::{RenderError, RenderResult};
use crate::frame_slots::FramePool;
use crate::gpu::{AcquireOutcome, Gpu, PresentOutcome, Submission};
use crate::image_tracker::ImageTracker;
use crate::swap_surface::SwapSurface;
use crate::ubo::FramePayload;

/// Where the driver currently is. Also names the stage of a
/// [`RenderError::DeviceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    Acquiring,
    Waiting,
    Recording,
    Submitting,
    Presenting,
    Advancing,
    Rebuilding,
    /// The target has zero area; no surface exists.
    Suspended,
    ShuttingDown,
}

/// What one [`FramePipeline::run_frame`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Work was submitted for `image_index` using frame slot `slot`.
    Submitted {
        slot: usize,
        image_index: u32,
        /// False when present reported the surface out of date.
        presented: bool,
        rebuilt: bool,
    },
    /// Acquire found the surface out of date; it was rebuilt and nothing was
    /// submitted.
    Rebuilt,
    /// The live surface was destroyed and no replacement could be created,
    /// usually because the target lost its area. Nothing was submitted.
    TornDown,
    /// No surface existed and none could be created. Nothing was submitted.
    Suspended,
}

impl FrameOutcome {
    /// Whether a rebuild ran during this call, including one that only tore
    /// the old surface down.
    pub fn rebuilt(&self) -> bool {
        match self {
            FrameOutcome::Submitted { rebuilt, .. } => *rebuilt,
            FrameOutcome::Rebuilt | FrameOutcome::TornDown => true,
            FrameOutcome::Suspended => false,
        }
    }

    /// Whether the pipeline ends this call without a surface.
    pub fn suspended(&self) -> bool {
        matches!(self, FrameOutcome::TornDown | FrameOutcome::Suspended)
    }

    pub fn presented(&self) -> bool {
        matches!(self, FrameOutcome::Submitted { presented: true, .. })
    }
}

/// Drives acquire, submit and present over a [`Gpu`] backend and owns the
/// swap surface rebuild state machine.
pub struct FramePipeline<G: Gpu> {
    gpu: G,
    extent_source: Box<dyn ExtentSource>,
    payload: Box<dyn FramePayload>,

    slots: FramePool,
    tracker: ImageTracker,
    recorder: CommandRecorder,
    surface: Option<SwapSurface>,
    next_generation: u64,

    frame_index: u64,
    state: PipelineState,
    /// Set by [`FramePipeline::notify_resized`].
    resize_pending: bool,
    /// Set when acquire reports a suboptimal surface.
    suboptimal_pending: bool,
}

impl<G: Gpu> FramePipeline<G> {
    /// Creates the frame slots and, if the target has a non-zero extent, the
    /// first swap surface.
    pub fn new(
        mut gpu: G,
        extent_source: Box<dyn ExtentSource>,
        payload: Box<dyn FramePayload>,
    ) -> RenderResult<Self> {
        let slots = FramePool::new(&mut gpu).map_err(RenderError::at(PipelineState::Idle))?;

        let mut pipeline = Self {
            gpu,
            extent_source,
            payload,
            slots,
            tracker: ImageTracker::default(),
            recorder: CommandRecorder::new(),
            surface: None,
            next_generation: 0,
            frame_index: 0,
            state: PipelineState::Idle,
            resize_pending: false,
            suboptimal_pending: false,
        };

        if pipeline.extent_source.is_zero_area() {
            info!("Target has zero area at startup, starting suspended");
            pipeline.transition(PipelineState::Suspended);
        } else {
            pipeline.rebuild("initial surface")?;
        }

        Ok(pipeline)
    }

    /// Runs one frame. See the module docs for the sequence.
    ///
    /// Out-of-date and suboptimal surfaces are handled internally. Any other
    /// GPU failure is returned as a [`RenderError::DeviceError`] naming the
    /// stage it happened in.
    pub fn run_frame(&mut self) -> RenderResult<FrameOutcome> {
        if self.state == PipelineState::ShuttingDown {
            return Err(RenderError::ShutDown);
        }

        if self.extent_source.is_zero_area() {
            if self.surface.is_some() {
                // The rebuild polls again and may find the target visible
                return if self.rebuild("target has zero area")? {
                    Ok(FrameOutcome::Rebuilt)
                } else {
                    Ok(FrameOutcome::TornDown)
                };
            }
            self.transition(PipelineState::Suspended);
            return Ok(FrameOutcome::Suspended);
        }

        let mut rebuilt = false;
        if self.surface.is_none() {
            if !self.rebuild("target has a usable extent again")? {
                return Ok(FrameOutcome::Suspended);
            }
            rebuilt = true;
        }

        let Some((generation, image_count, extent)) = self
            .surface
            .as_ref()
            .map(|s| (s.generation(), s.image_count(), s.extent()))
        else {
            return Ok(FrameOutcome::Suspended);
        };
        let slot_index = FramePool::slot_index(self.frame_index);
        let slot = *self.slots.slot(self.frame_index);

        self.transition(PipelineState::Acquiring);
        self.gpu
            .wait_fence(slot.in_flight)
            .map_err(RenderError::at(PipelineState::Acquiring))?;

        let acquired = self
            .gpu
            .acquire_next_image(slot.image_available)
            .map_err(RenderError::at(PipelineState::Acquiring))?;
        let image_index = match acquired {
            AcquireOutcome::Acquired {
                image_index,
                suboptimal,
            } => {
                if suboptimal {
                    debug!("Acquire reported a suboptimal surface");
                    self.suboptimal_pending = true;
                }
                image_index
            }
            AcquireOutcome::OutOfDate => {
                debug!("Acquire reported an out-of-date surface");
                return if self.rebuild("out of date at acquire")? {
                    Ok(FrameOutcome::Rebuilt)
                } else {
                    Ok(FrameOutcome::TornDown)
                };
            }
        };

        if image_index >= image_count {
            return Err(RenderError::DeviceError {
                stage: PipelineState::Acquiring,
                source: swapframe_rhi::RhiError::InvalidHandle(format!(
                    "acquired image {} of a {}-image swapchain",
                    image_index, image_count
                )),
            });
        }

        self.transition(PipelineState::Waiting);
        self.tracker
            .wait_if_claimed(image_index, &mut self.gpu)
            .map_err(RenderError::at(PipelineState::Waiting))?;
        self.tracker.record_claim(image_index, slot.in_flight);

        self.transition(PipelineState::Recording);
        let data = self.payload.update(extent);
        self.gpu
            .write_frame_data(image_index, data)
            .map_err(RenderError::at(PipelineState::Recording))?;
        let command_list = self
            .recorder
            .list(image_index, generation)
            .map_err(RenderError::at(PipelineState::Recording))?;

        self.transition(PipelineState::Submitting);
        self.gpu
            .reset_fence(slot.in_flight)
            .map_err(RenderError::at(PipelineState::Submitting))?;
        self.gpu
            .submit(&Submission {
                command_list,
                wait: slot.image_available,
                signal: slot.render_finished,
                fence: slot.in_flight,
            })
            .map_err(RenderError::at(PipelineState::Submitting))?;

        self.transition(PipelineState::Presenting);
        let present = self
            .gpu
            .present(image_index, slot.render_finished)
            .map_err(RenderError::at(PipelineState::Presenting))?;
        if present.needs_rebuild() {
            debug!("Present reported {:?}", present);
        }

        self.transition(PipelineState::Advancing);
        self.frame_index += 1;

        let cause = if present == PresentOutcome::OutOfDate {
            Some("out of date at present")
        } else if self.resize_pending {
            Some("target resized")
        } else if present == PresentOutcome::Suboptimal || self.suboptimal_pending {
            Some("surface suboptimal")
        } else {
            None
        };

        match cause {
            Some(cause) => {
                self.rebuild(cause)?;
                rebuilt = true;
            }
            None => self.transition(PipelineState::Idle),
        }

        Ok(FrameOutcome::Submitted {
            slot: slot_index,
            image_index,
            presented: present != PresentOutcome::OutOfDate,
            rebuilt,
        })
    }

    /// Marks the surface for a rebuild at the end of the next frame.
    pub fn notify_resized(&mut self) {
        if !self.resize_pending {
            trace!("Resize pending");
        }
        self.resize_pending = true;
    }

    /// Waits for the device to go idle and releases everything the pipeline
    /// created, newest first. Later calls do nothing.
    pub fn shutdown(&mut self) -> RenderResult<()> {
        if self.state == PipelineState::ShuttingDown {
            return Ok(());
        }
        self.transition(PipelineState::ShuttingDown);

        self.gpu
            .wait_idle()
            .map_err(RenderError::at(PipelineState::ShuttingDown))?;

        self.recorder.free_all(&mut self.gpu);
        if let Some(surface) = self.surface.take() {
            surface.destroy(&mut self.gpu);
        }
        self.tracker.reset(0);
        self.slots.destroy(&mut self.gpu);

        info!("Frame pipeline shut down after {} frames", self.frame_index);
        Ok(())
    }

    /// Tears the surface down and, unless the target has zero area, builds the
    /// next generation. Returns whether a new surface exists afterwards.
    fn rebuild(&mut self, cause: &str) -> RenderResult<bool> {
        self.transition(PipelineState::Rebuilding);

        self.gpu
            .wait_idle()
            .map_err(RenderError::at(PipelineState::Rebuilding))?;

        self.recorder.free_all(&mut self.gpu);
        if let Some(surface) = self.surface.take() {
            surface.destroy(&mut self.gpu);
        }
        self.resize_pending = false;
        self.suboptimal_pending = false;

        let requested = self.extent_source.current_extent();
        if requested.width == 0 || requested.height == 0 {
            info!("Rebuild ({}): target has zero area, suspending", cause);
            self.tracker.reset(0);
            self.transition(PipelineState::Suspended);
            return Ok(false);
        }

        let generation = self.next_generation;
        let surface = match SwapSurface::create(&mut self.gpu, requested, generation) {
            Ok(surface) => surface,
            Err(RenderError::TransientSurfaceInvalidation(reason)) => {
                debug!("Surface changed during rebuild ({}), retrying next frame", reason);
                self.tracker.reset(0);
                self.transition(PipelineState::Suspended);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        self.next_generation += 1;
        let surface = self.surface.insert(surface);

        self.recorder
            .record_all(&mut self.gpu, surface)
            .map_err(RenderError::at(PipelineState::Rebuilding))?;
        self.tracker.reset(surface.image_count());

        info!(
            "Rebuilt swap surface ({}): generation {}, {}x{}, {} images",
            cause,
            generation,
            surface.extent().width,
            surface.extent().height,
            surface.image_count()
        );

        self.transition(PipelineState::Idle);
        Ok(true)
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state != next {
            trace!("{:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    #[inline]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Number of frames advanced so far.
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The live surface, `None` while suspended.
    #[inline]
    pub fn surface(&self) -> Option<&SwapSurface> {
        self.surface.as_ref()
    }

    #[inline]
    pub fn tracker(&self) -> &ImageTracker {
        &self.tracker
    }

    #[inline]
    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    #[inline]
    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }
}

impl<G: Gpu> Drop for FramePipeline<G> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("Frame pipeline shutdown failed: {}", e);
        }
    }
}
