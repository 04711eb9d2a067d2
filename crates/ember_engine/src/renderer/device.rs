//! Logical device construction

use std::collections::BTreeSet;
use std::ffi::CStr;
use std::os::raw::c_char;

use ash::extensions::khr::Swapchain;
use ash::vk;

use super::selection::QueueFamilyResolution;
use super::{Instance, PhysicalDevice, VulkanError, VulkanResult};

/// The fixed extension set every logical device enables.
pub fn required_device_extensions() -> [&'static CStr; 1] {
    [Swapchain::name()]
}

/// One queue-create request per distinct family, in ascending index order.
///
/// When graphics and present resolved to the same family, requesting it
/// twice would be invalid; the set collapses them to one request.
fn unique_queue_families(graphics: u32, present: u32) -> Vec<u32> {
    let families: BTreeSet<u32> = [graphics, present].into_iter().collect();
    families.into_iter().collect()
}

/// Owned logical device and its capability queues.
pub struct LogicalDevice {
    device: ash::Device,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    graphics_family: u32,
    present_family: u32,
}

impl LogicalDevice {
    /// Build the logical device for a selected candidate.
    ///
    /// One queue of uniform priority per distinct resolved family, the
    /// given extension set, and an explicit (possibly default-empty)
    /// feature set; no layers. Fails with
    /// [`VulkanError::DeviceCreationFailed`] and no partial state if the
    /// platform refuses.
    pub fn new(
        instance: &Instance,
        physical: PhysicalDevice,
        queues: QueueFamilyResolution,
        extensions: &[&CStr],
        features: vk::PhysicalDeviceFeatures,
    ) -> VulkanResult<Self> {
        let (graphics_family, present_family) = match (queues.graphics, queues.present) {
            (Some(graphics), Some(present)) => (graphics, present),
            _ => {
                return Err(VulkanError::InitializationFailed(
                    "queue family resolution is incomplete".to_owned(),
                ))
            }
        };

        // Must outlive the create infos holding a pointer to it.
        let queue_priorities = [1.0f32];
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> =
            unique_queue_families(graphics_family, present_family)
                .into_iter()
                .map(|family| {
                    vk::DeviceQueueCreateInfo::builder()
                        .queue_family_index(family)
                        .queue_priorities(&queue_priorities)
                        .build()
                })
                .collect();

        let extension_ptrs: Vec<*const c_char> =
            extensions.iter().map(|extension| extension.as_ptr()).collect();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extension_ptrs)
            .enabled_features(&features);

        let device = unsafe {
            instance
                .raw()
                .create_device(physical.as_vk(), &create_info, None)
        }
        .map_err(VulkanError::DeviceCreationFailed)?;

        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };

        Ok(Self {
            device,
            graphics_queue,
            present_queue,
            graphics_family,
            present_family,
        })
    }

    /// The raw `ash` device.
    pub fn raw(&self) -> &ash::Device {
        &self.device
    }

    /// Queue for graphics submissions.
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    /// Queue for presentation.
    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    /// Family index the graphics queue came from.
    pub fn graphics_family(&self) -> u32 {
        self.graphics_family
    }

    /// Family index the present queue came from.
    pub fn present_family(&self) -> u32 {
        self.present_family
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            // Outstanding work must finish before the device goes away.
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_family_yields_exactly_one_request() {
        assert_eq!(unique_queue_families(2, 2), vec![2]);
    }

    #[test]
    fn distinct_families_yield_one_request_each() {
        assert_eq!(unique_queue_families(3, 1), vec![1, 3]);
    }
}
