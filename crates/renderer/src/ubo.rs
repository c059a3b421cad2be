//! Per-image uniform payload.
//!
//! The layout must match the vertex shader's uniform block exactly, so the
//! struct is `#[repr(C)]` and `Pod` for safe byte casting.

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use swapframe_core::Timer;

/// Produces the bytes written into an image's uniform memory each frame.
pub trait FramePayload {
    /// Advances the payload for a frame rendered at `extent`.
    fn update(&mut self, extent: vk::Extent2D) -> &[u8];
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MvpUbo {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl MvpUbo {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    const EYE: Vec3 = Vec3::new(2.0, 2.0, 2.0);
    const FOV_DEGREES: f32 = 45.0;
    const NEAR: f32 = 0.1;
    const FAR: f32 = 10.0;

    /// Model rotated `angle` radians about +Z, seen from (2, 2, 2) with Z up.
    pub fn spinning(angle: f32, aspect: f32) -> Self {
        let model = Mat4::from_rotation_z(angle);
        let view = Mat4::look_at_rh(Self::EYE, Vec3::ZERO, Vec3::Z);
        let mut projection =
            Mat4::perspective_rh(Self::FOV_DEGREES.to_radians(), aspect, Self::NEAR, Self::FAR);
        // Vulkan clip space has Y pointing down
        projection.y_axis.y *= -1.0;

        Self {
            model,
            view,
            projection,
        }
    }
}

/// A model spinning at a constant rate since the payload was created.
#[derive(Debug)]
pub struct SpinningModel {
    timer: Timer,
    degrees_per_second: f32,
    ubo: MvpUbo,
}

impl SpinningModel {
    pub fn new(degrees_per_second: f32) -> Self {
        Self {
            timer: Timer::new(),
            degrees_per_second,
            ubo: MvpUbo::default(),
        }
    }
}

impl FramePayload for SpinningModel {
    fn update(&mut self, extent: vk::Extent2D) -> &[u8] {
        let angle = (self.timer.elapsed_secs() * self.degrees_per_second).to_radians();
        let aspect = extent.width.max(1) as f32 / extent.height.max(1) as f32;
        self.ubo = MvpUbo::spinning(angle, aspect);
        bytemuck::bytes_of(&self.ubo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mvp_ubo_size() {
        // 3 Mat4 (3 * 64) = 192 bytes
        assert_eq!(MvpUbo::SIZE, 192);
    }

    #[test]
    fn test_mvp_ubo_alignment() {
        assert_eq!(std::mem::align_of::<MvpUbo>(), 16);
    }

    #[test]
    fn test_zero_angle_has_identity_model() {
        let ubo = MvpUbo::spinning(0.0, 1.0);
        assert_eq!(ubo.model, Mat4::IDENTITY);
    }

    #[test]
    fn test_projection_flips_y() {
        let ubo = MvpUbo::spinning(0.0, 16.0 / 9.0);
        let reference = Mat4::perspective_rh(45.0_f32.to_radians(), 16.0 / 9.0, 0.1, 10.0);
        assert!(ubo.projection.y_axis.y < 0.0);
        assert_eq!(ubo.projection.y_axis.y, -reference.y_axis.y);
        assert_eq!(ubo.projection.x_axis, reference.x_axis);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let ubo = MvpUbo::spinning(1.0, 1.0);
        let clip = ubo.projection * ubo.view * ubo.model * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_spinning_model_bytes() {
        let mut payload = SpinningModel::new(45.0);
        let bytes = payload.update(vk::Extent2D {
            width: 800,
            height: 600,
        });
        assert_eq!(bytes.len(), MvpUbo::SIZE);
    }

    #[test]
    fn test_zero_extent_does_not_produce_nan() {
        let mut payload = SpinningModel::new(45.0);
        payload.update(vk::Extent2D {
            width: 0,
            height: 0,
        });
        assert!(payload.ubo.projection.is_finite());
    }
}
