//! swapframe - spinning mesh viewer on the frame pipeline.
//!
//! Usage: `swapframe [config.toml]`. The config path defaults to
//! `swapframe.toml` in the working directory; a missing file means defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use swapframe_core::AppConfig;
use swapframe_platform::Window;
use swapframe_renderer::{FrameOutcome, FramePipeline, SpinningModel, VulkanGpu};

const DEFAULT_CONFIG_PATH: &str = "swapframe.toml";

struct App {
    config: AppConfig,
    // Dropped before the window it renders into
    pipeline: Option<FramePipeline<VulkanGpu>>,
    window: Option<Window>,
    /// Last frame ended without a surface; redraws wait for a window event.
    suspended: bool,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            pipeline: None,
            window: None,
            suspended: false,
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = Window::new(event_loop, &self.config.window).context("creating window")?;

        let mesh = swapframe_resources::load_obj(&self.config.scene.model)
            .with_context(|| format!("loading {}", self.config.scene.model.display()))?;

        let gpu = VulkanGpu::new(&window, &self.config.renderer, &mesh)
            .context("initializing Vulkan")?;
        let payload = SpinningModel::new(self.config.scene.spin_degrees_per_second);
        let pipeline = FramePipeline::new(gpu, window.extent_source(), Box::new(payload))
            .context("creating frame pipeline")?;

        self.pipeline = Some(pipeline);
        self.window = Some(window);
        Ok(())
    }

    /// Minimized windows wait for the next event instead of spinning.
    fn after_frame(&mut self, outcome: &FrameOutcome) -> ControlFlow {
        self.suspended = outcome.suspended();
        if self.suspended {
            ControlFlow::Wait
        } else {
            ControlFlow::Poll
        }
    }

    fn wants_redraw(&self) -> bool {
        !self.suspended && self.window.is_some()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{:#}", err);
        self.fatal = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(()) => info!("Initialization complete, entering main loop"),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                if let Some(pipeline) = self.pipeline.as_mut()
                    && let Err(e) = pipeline.shutdown()
                {
                    error!("Shutdown failed: {}", e);
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                debug!("Window resized to {}x{}", size.width, size.height);
                if let Some(pipeline) = self.pipeline.as_mut() {
                    pipeline.notify_resized();
                }
                if self.suspended
                    && let Some(window) = self.window.as_ref()
                {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(pipeline) = self.pipeline.as_mut() else {
                    return;
                };
                match pipeline.run_frame() {
                    Ok(outcome) => event_loop.set_control_flow(self.after_frame(&outcome)),
                    Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("rendering frame")),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.wants_redraw()
            && let Some(window) = self.window.as_ref()
        {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    swapframe_core::init_logging();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    info!("Starting {}", config.window.title);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspended_frames_stop_polling() {
        let mut app = App::new(AppConfig::default());

        assert_eq!(app.after_frame(&FrameOutcome::TornDown), ControlFlow::Wait);
        assert!(app.suspended);
        assert!(!app.wants_redraw());

        assert_eq!(app.after_frame(&FrameOutcome::Suspended), ControlFlow::Wait);
        assert!(app.suspended);
    }

    #[test]
    fn test_submitted_frame_resumes_polling() {
        let mut app = App::new(AppConfig::default());
        app.after_frame(&FrameOutcome::Suspended);

        let submitted = FrameOutcome::Submitted {
            slot: 0,
            image_index: 0,
            presented: true,
            rebuilt: true,
        };
        assert_eq!(app.after_frame(&submitted), ControlFlow::Poll);
        assert!(!app.suspended);
        assert_eq!(app.after_frame(&FrameOutcome::Rebuilt), ControlFlow::Poll);
    }
}
