//! Polling the framebuffer size of the presentation target.

use std::sync::Arc;

use ash::vk;

/// Reports the current framebuffer size in pixels.
///
/// A zero width or height means the target is minimized and nothing can be
/// presented to it.
pub trait ExtentSource {
    fn current_extent(&self) -> vk::Extent2D;

    fn is_zero_area(&self) -> bool {
        let extent = self.current_extent();
        extent.width == 0 || extent.height == 0
    }
}

impl ExtentSource for winit::window::Window {
    fn current_extent(&self) -> vk::Extent2D {
        let size = self.inner_size();
        vk::Extent2D {
            width: size.width,
            height: size.height,
        }
    }
}

impl<T: ExtentSource + ?Sized> ExtentSource for Arc<T> {
    fn current_extent(&self) -> vk::Extent2D {
        (**self).current_extent()
    }
}

/// An extent that never changes, for headless callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedExtent(pub vk::Extent2D);

impl ExtentSource for FixedExtent {
    fn current_extent(&self) -> vk::Extent2D {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_area_detection() {
        let visible = FixedExtent(vk::Extent2D {
            width: 800,
            height: 600,
        });
        assert!(!visible.is_zero_area());

        let minimized = FixedExtent(vk::Extent2D {
            width: 800,
            height: 0,
        });
        assert!(minimized.is_zero_area());
    }

    #[test]
    fn test_arc_forwards() {
        let source: Arc<dyn ExtentSource> = Arc::new(FixedExtent(vk::Extent2D {
            width: 1,
            height: 2,
        }));
        assert_eq!(source.current_extent().height, 2);
    }
}
