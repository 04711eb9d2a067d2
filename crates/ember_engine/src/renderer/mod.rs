//! Vulkan device-selection and device-creation pipeline
//!
//! Covers the bootstrap flow up to a logical device bound to a presentation
//! surface: instance → surface → candidate enumeration → scoring and queue
//! resolution → logical device. Rendering itself (swapchain, frame loop) is
//! out of scope; [`RenderContext`] hands the loop everything it needs and
//! encodes the destruction ordering.

use ash::vk;
use thiserror::Error;

pub mod context;
pub mod device;
pub mod instance;
pub mod physical_device;
pub mod selection;
pub mod surface;

pub use context::RenderContext;
pub use device::LogicalDevice;
pub use instance::Instance;
pub use physical_device::{DeviceProfile, PhysicalDevice, QueueFamilyCaps};
pub use selection::{default_suitability, QueueFamilyResolution, SelectedDevice};
pub use surface::Surface;

/// Vulkan bootstrap errors.
///
/// Each is raised at the failing call and propagated undecorated; no
/// operation here is retried or returns a partial object.
#[derive(Error, Debug)]
pub enum VulkanError {
    /// The Vulkan runtime library could not be loaded
    #[error("failed to load the Vulkan runtime: {0}")]
    EntryLoad(String),

    /// The platform reported zero candidate devices
    #[error("no Vulkan-capable devices found")]
    NoDevicesFound,

    /// The device enumeration call itself failed
    #[error("physical device enumeration failed: {0:?}")]
    EnumerationFailed(vk::Result),

    /// No enumerated device resolves both required queue roles
    #[error("no enumerated device resolves both required queue roles")]
    NoSuitableDevice,

    /// Logical device construction was refused
    #[error("logical device creation failed: {0:?}")]
    DeviceCreationFailed(vk::Result),

    /// Surface binding was refused
    #[error("surface creation failed: {0:?}")]
    SurfaceCreationFailed(vk::Result),

    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Bootstrap initialization failed outside a single API call
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
}

/// Result type for Vulkan operations.
pub type VulkanResult<T> = Result<T, VulkanError>;
