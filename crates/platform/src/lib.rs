//! Windowing glue for the swapframe renderer.
//!
//! - Window creation via winit
//! - Vulkan surface creation through raw window handles
//! - Framebuffer extent polling for the frame pipeline

mod extent;
mod window;

pub use extent::{ExtentSource, FixedExtent};
pub use window::{Surface, Window};

pub use winit::event::WindowEvent;
pub use winit::event_loop::EventLoop;
