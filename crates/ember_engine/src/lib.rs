//! # Ember Engine
//!
//! Resource-lifecycle core for a minimal Vulkan rendering bootstrap.
//!
//! The crate owns the objects whose creation order, destruction order, and
//! reference semantics are dictated by the native APIs underneath it:
//!
//! - reference-counted Win32 window-class registration shared across windows
//! - a generic box for COM-style reference-counted interop handles
//! - the Vulkan instance / physical-device selection / logical-device /
//!   surface pipeline, up to the point a rendering loop would take over
//!
//! The event loop, CLI wiring, and the rendering pipeline itself are out of
//! scope; a host binary pumps messages and reacts to the window's
//! quit-requested signal.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! # #[cfg(windows)]
//! # fn run() -> Result<(), ember_engine::EngineError> {
//! use ember_engine::platform::{ModuleHandle, ShowState};
//! use ember_engine::platform::win32::Window;
//! use ember_engine::renderer::RenderContext;
//! use ember_engine::renderer::selection::default_suitability;
//!
//! let module = ModuleHandle::current()?;
//! let window = Window::create(module, ShowState::Shown, "Ember")?;
//! let context = RenderContext::new("Ember", &window, default_suitability)?;
//! # drop(context);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod platform;
pub mod renderer;

mod error;

pub use config::{Config, ConfigError, EngineConfig};
pub use error::EngineError;
pub use platform::PlatformError;
pub use renderer::VulkanError;
