//! Presentation surface ownership

use ash::extensions::khr;
use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

use super::{Instance, VulkanError, VulkanResult};

/// Owned presentation surface.
///
/// The loader is built from the same entry/instance pair that realizes the
/// surface, so destruction always routes back through the creating
/// instance. Drop order matters: the surface must go before the instance
/// and before the window it was built from.
pub struct Surface {
    loader: khr::Surface,
    surface: vk::SurfaceKHR,
}

impl Surface {
    /// Bind a window's native handles into a presentable surface.
    ///
    /// On Windows the raw window handle carries the `HWND` and module
    /// handle, which become the platform surface descriptor.
    pub fn new<W>(instance: &Instance, window: &W) -> VulkanResult<Self>
    where
        W: HasRawWindowHandle + HasRawDisplayHandle,
    {
        let loader = khr::Surface::new(instance.entry(), instance.raw());

        let surface = unsafe {
            ash_window::create_surface(
                instance.entry(),
                instance.raw(),
                window.raw_display_handle(),
                window.raw_window_handle(),
                None,
            )
        }
        .map_err(VulkanError::SurfaceCreationFailed)?;

        Ok(Self { loader, surface })
    }

    /// The raw surface handle.
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.surface
    }

    /// The surface extension loader bound to the creating instance.
    pub fn loader(&self) -> &khr::Surface {
        &self.loader
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.surface, None);
        }
    }
}
