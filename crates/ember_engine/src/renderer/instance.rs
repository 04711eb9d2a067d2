//! Vulkan instance ownership and device enumeration

use std::ffi::CString;
use std::os::raw::c_char;

#[cfg(debug_assertions)]
use std::ffi::CStr;

#[cfg(debug_assertions)]
use ash::extensions::ext::DebugUtils;
use ash::vk;
use raw_window_handle::RawDisplayHandle;

use super::{PhysicalDevice, VulkanError, VulkanResult};

/// Owned Vulkan instance.
///
/// Created with the surface extensions the target display requires; in
/// debug builds the Khronos validation layer and a debug messenger that
/// forwards to [`log`] are enabled as well. Layers are a validation-time
/// concern — release builds enable none.
pub struct Instance {
    entry: ash::Entry,
    instance: ash::Instance,
    #[cfg(debug_assertions)]
    debug_utils: Option<DebugUtils>,
    #[cfg(debug_assertions)]
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl Instance {
    /// Create an instance for presenting to the given display.
    pub fn new(app_name: &str, display: RawDisplayHandle) -> VulkanResult<Self> {
        let entry =
            unsafe { ash::Entry::load() }.map_err(|e| VulkanError::EntryLoad(e.to_string()))?;

        let app_name_c = CString::new(app_name)
            .map_err(|e| VulkanError::InitializationFailed(format!("invalid app name: {e}")))?;
        let engine_name_c = CString::new("ember_engine").expect("engine name is a fixed literal");
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_c)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(&engine_name_c)
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_1);

        // Fixed required set: the generic surface extension plus the
        // platform-specific surface extension for this display.
        #[allow(unused_mut)] // extended in debug builds
        let mut extensions: Vec<*const c_char> =
            ash_window::enumerate_required_extensions(display)
                .map_err(VulkanError::Api)?
                .to_vec();

        #[cfg(debug_assertions)]
        extensions.push(DebugUtils::name().as_ptr());

        let layers: Vec<CString> = if cfg!(debug_assertions) {
            vec![CString::new("VK_LAYER_KHRONOS_validation")
                .expect("layer name is a fixed literal")]
        } else {
            vec![]
        };
        let layer_ptrs: Vec<*const c_char> = layers.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_ptrs);

        let instance =
            unsafe { entry.create_instance(&create_info, None) }.map_err(VulkanError::Api)?;

        #[cfg(debug_assertions)]
        let (debug_utils, debug_messenger) = {
            let debug_utils = DebugUtils::new(&entry, &instance);
            match setup_debug_messenger(&debug_utils) {
                Ok(messenger) => (Some(debug_utils), Some(messenger)),
                Err(e) => {
                    log::warn!("debug messenger unavailable: {e}");
                    (None, None)
                }
            }
        };

        Ok(Self {
            entry,
            instance,
            #[cfg(debug_assertions)]
            debug_utils,
            #[cfg(debug_assertions)]
            debug_messenger,
        })
    }

    /// The Vulkan entry point.
    pub fn entry(&self) -> &ash::Entry {
        &self.entry
    }

    /// The raw `ash` instance.
    pub fn raw(&self) -> &ash::Instance {
        &self.instance
    }

    /// Enumerate candidate devices in platform order.
    ///
    /// The two-call count/fetch protocol underneath tolerates the count
    /// changing between the calls (`ash` re-issues the query on
    /// `VK_INCOMPLETE` rather than reading out of bounds).
    pub fn enumerate_physical_devices(&self) -> VulkanResult<Vec<PhysicalDevice>> {
        let devices = unsafe { self.instance.enumerate_physical_devices() }
            .map_err(VulkanError::EnumerationFailed)?;
        if devices.is_empty() {
            return Err(VulkanError::NoDevicesFound);
        }
        Ok(devices.into_iter().map(PhysicalDevice::from_vk).collect())
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        unsafe {
            #[cfg(debug_assertions)]
            if let (Some(debug_utils), Some(messenger)) =
                (&self.debug_utils, self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

#[cfg(debug_assertions)]
fn setup_debug_messenger(debug_utils: &DebugUtils) -> VulkanResult<vk::DebugUtilsMessengerEXT> {
    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback));

    unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
        .map_err(VulkanError::Api)
}

/// Debug callback for validation layers.
#[cfg(debug_assertions)]
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let callback_data = *callback_data;
    let message = CStr::from_ptr(callback_data.p_message).to_string_lossy();

    if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        log::error!("[vulkan] {message_type:?} - {message}");
    } else if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        log::warn!("[vulkan] {message_type:?} - {message}");
    } else {
        log::debug!("[vulkan] {message_type:?} - {message}");
    }

    vk::FALSE
}
