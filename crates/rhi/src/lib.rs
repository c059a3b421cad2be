//! Vulkan abstraction layer (Render Hardware Interface).
//!
//! Thin RAII wrappers over `ash` used by the frame pipeline's Vulkan backend:
//! - Instance, physical device and logical device creation
//! - Swapchain creation and surface selection rules
//! - Command pools and reusable command buffers
//! - Buffers, descriptors, shaders and graphics pipelines
//! - Semaphores and fences

mod error;

pub mod buffer;
pub mod command;
pub mod descriptor;
pub mod device;
pub mod instance;
pub mod physical_device;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vertex;

pub use error::{RhiError, RhiResult};

// Re-export ash types that users might need
pub use ash::vk;
