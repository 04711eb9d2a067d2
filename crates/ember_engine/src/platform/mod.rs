//! Platform window and interop handle management
//!
//! Owns the process-wide window-class registration state, the native window
//! itself, and the generic box for COM-style reference-counted handles. The
//! Win32-backed pieces live in [`win32`] and only build on Windows; the
//! lifecycle logic (registry, side-channel table, handle box) is platform
//! neutral and unit tested everywhere.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod class_registry;
pub mod interop;
pub mod window_map;

#[cfg(windows)]
pub mod win32;

pub use class_registry::{
    ClassAtom, ClassRegistrar, ClassRegistration, ClassStyle, WindowClassRegistry,
};
pub use interop::{QueryInterface, RcHandle, RefCounted};

/// Opaque handle to the module a window class is registered under.
///
/// On Windows this is the `HINSTANCE` of the executable or DLL that owns the
/// window procedure. All windows sharing one class name must be created with
/// the same module handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle(isize);

impl ModuleHandle {
    /// Wrap a raw module handle value.
    pub const fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    /// The raw module handle value.
    pub const fn as_raw(self) -> isize {
        self.0
    }

    /// Handle of the module that created the current process.
    #[cfg(windows)]
    pub fn current() -> Result<Self, PlatformError> {
        win32::current_module()
    }
}

/// Initial visibility applied to a freshly created window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowState {
    /// Window is created but not shown
    Hidden,
    /// Window is shown at its default size and position
    #[default]
    Shown,
    /// Window is shown minimized
    Minimized,
    /// Window is shown maximized
    Maximized,
}

/// Platform window and window-class errors.
///
/// All of these are fatal to the operation that raised them; none are
/// retried.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The platform refused to register the window class
    #[error("window class registration refused: {name}")]
    ClassRegistrationFailed {
        /// Name of the class that could not be registered
        name: String,
        /// Platform-reported detail
        detail: String,
    },

    /// A live class was requested under a second module handle
    #[error("window class {name} is already live under a different module handle")]
    ClassModuleMismatch {
        /// Name of the class the acquisition was for
        name: String,
    },

    /// Native window creation was refused
    #[error("native window creation failed: {0}")]
    WindowCreationFailed(String),

    /// The current module handle could not be resolved
    #[error("module handle lookup failed: {0}")]
    ModuleLookupFailed(String),
}
