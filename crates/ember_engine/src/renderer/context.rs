//! Composition of the full bootstrap flow

use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

use super::{
    device, selection, DeviceProfile, Instance, LogicalDevice, SelectedDevice, Surface,
    VulkanResult,
};

/// Everything a rendering loop needs, creation-ordered and drop-ordered.
///
/// Field order encodes the destruction contract: the surface and logical
/// device are dropped before the instance that created them.
pub struct RenderContext {
    surface: Surface,
    device: LogicalDevice,
    selected: SelectedDevice,
    instance: Instance,
}

impl RenderContext {
    /// Run the bootstrap pipeline against a window: instance → surface →
    /// device selection → logical device.
    pub fn new<W, F>(app_name: &str, window: &W, policy: F) -> VulkanResult<Self>
    where
        W: HasRawWindowHandle + HasRawDisplayHandle,
        F: Fn(&DeviceProfile) -> u32,
    {
        let instance = Instance::new(app_name, window.raw_display_handle())?;
        let surface = Surface::new(&instance, window)?;
        let selected = selection::select_physical_device(&instance, &surface, policy)?;
        let extensions = device::required_device_extensions();
        let device = LogicalDevice::new(
            &instance,
            selected.device,
            selected.queues,
            &extensions,
            vk::PhysicalDeviceFeatures::default(),
        )?;

        Ok(Self {
            surface,
            device,
            selected,
            instance,
        })
    }

    /// The owning instance.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The presentation surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The logical device and its queues.
    pub fn device(&self) -> &LogicalDevice {
        &self.device
    }

    /// The selected candidate and its resolution.
    pub fn selected(&self) -> &SelectedDevice {
        &self.selected
    }
}
