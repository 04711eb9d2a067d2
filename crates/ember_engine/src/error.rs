//! Crate-level error aggregation

use thiserror::Error;

use crate::config::ConfigError;
use crate::platform::PlatformError;
use crate::renderer::VulkanError;

/// Top-level error type for the bootstrap core.
///
/// Every failure below is raised at the failing call and propagated
/// undecorated; the hosting binary decides whether to abort or report.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Platform window or window-class failure
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Vulkan object creation or query failure
    #[error(transparent)]
    Vulkan(#[from] VulkanError),

    /// Configuration load or parse failure
    #[error(transparent)]
    Config(#[from] ConfigError),
}
