//! Application configuration loaded from TOML.
//!
//! Every field has a default, so a missing file or a partial file both work:
//!
//! ```toml
//! [window]
//! title = "swapframe"
//! width = 1280
//! height = 720
//!
//! [renderer]
//! msaa = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Top-level configuration for the swapframe binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub renderer: RendererConfig,
    pub scene: SceneConfig,
}

/// Initial window placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "swapframe".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Device and pipeline options consumed at startup and on every rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Enable `VK_LAYER_KHRONOS_validation` when the layer is installed.
    pub validation: bool,
    /// Render into a multisampled target at the device's max usable sample count.
    pub msaa: bool,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub clear_color: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            validation: cfg!(debug_assertions),
            msaa: true,
            vertex_shader: PathBuf::from("shaders/spirv/mesh.vert.spv"),
            fragment_shader: PathBuf::from("shaders/spirv/mesh.frag.spv"),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// The single mesh drawn every frame and how it animates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub model: PathBuf,
    pub spin_degrees_per_second: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("assets/models/viking_room.obj"),
            spin_degrees_per_second: 45.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults. A file that exists but does not parse,
    /// or whose values fail [`AppConfig::validate`], is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the renderer cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.renderer.vertex_shader.as_os_str().is_empty()
            || self.renderer.fragment_shader.as_os_str().is_empty()
        {
            return Err(Error::Config("shader paths must not be empty".to_string()));
        }
        if !self.scene.spin_degrees_per_second.is_finite() {
            return Err(Error::Config(
                "spin_degrees_per_second must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
