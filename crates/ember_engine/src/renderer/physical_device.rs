//! Physical-device handles and capability snapshots

use std::cmp::Ordering;
use std::ffi::CStr;

use ash::vk;
use ash::vk::Handle;

use super::{Instance, Surface, VulkanError, VulkanResult};

/// Opaque, copyable identifier for a candidate device.
///
/// The instance owns device lifetime; this value is only a key and supports
/// ordering so it can index a score map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicalDevice(vk::PhysicalDevice);

impl PhysicalDevice {
    pub(crate) fn from_vk(raw: vk::PhysicalDevice) -> Self {
        Self(raw)
    }

    /// Wrap a raw device handle value.
    pub fn from_raw(raw: u64) -> Self {
        Self(vk::PhysicalDevice::from_raw(raw))
    }

    /// The underlying `ash` handle.
    pub fn as_vk(self) -> vk::PhysicalDevice {
        self.0
    }

    /// Capability snapshot used by the scoring policy.
    pub fn profile(self, instance: &Instance) -> DeviceProfile {
        let properties = unsafe { instance.raw().get_physical_device_properties(self.0) };
        let features = unsafe { instance.raw().get_physical_device_features(self.0) };
        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned();
        DeviceProfile {
            device_type: properties.device_type,
            features,
            name,
        }
    }

    /// Per-family capability snapshot against a presentation surface, in
    /// family-index order.
    pub fn queue_family_caps(
        self,
        instance: &Instance,
        surface: &Surface,
    ) -> VulkanResult<Vec<QueueFamilyCaps>> {
        let families =
            unsafe { instance.raw().get_physical_device_queue_family_properties(self.0) };

        let mut caps = Vec::with_capacity(families.len());
        for (index, family) in families.iter().enumerate() {
            let graphics = family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
            let present = unsafe {
                surface.loader().get_physical_device_surface_support(
                    self.0,
                    index as u32,
                    surface.handle(),
                )
            }
            .map_err(VulkanError::Api)?;
            caps.push(QueueFamilyCaps { graphics, present });
        }
        Ok(caps)
    }

    /// Whether every extension in `required` is available on this device.
    pub fn supports_extensions(
        self,
        instance: &Instance,
        required: &[&CStr],
    ) -> VulkanResult<bool> {
        let available = unsafe {
            instance
                .raw()
                .enumerate_device_extension_properties(self.0)
        }
        .map_err(VulkanError::Api)?;

        Ok(required.iter().all(|required| {
            available.iter().any(|extension| {
                let name = unsafe { CStr::from_ptr(extension.extension_name.as_ptr()) };
                name == *required
            })
        }))
    }
}

impl PartialOrd for PhysicalDevice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PhysicalDevice {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_raw().cmp(&other.0.as_raw())
    }
}

/// Snapshot of the capabilities a scoring policy may consult.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    /// Device class (discrete, integrated, virtual, CPU, other)
    pub device_type: vk::PhysicalDeviceType,
    /// Supported feature set
    pub features: vk::PhysicalDeviceFeatures,
    /// Human-readable device name, for logging
    pub name: String,
}

/// What one queue family offers against a particular surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyCaps {
    /// The family advertises graphics capability
    pub graphics: bool,
    /// The family can present to the surface in question
    pub present: bool,
}
