//! Win32 window class registrar and window
//!
//! The window procedure recovers its owning [`Window`] through the
//! side-channel table in [`window_map`]: the state block's address travels
//! in the `CREATESTRUCTW` creation parameter, is bound at `WM_NCCREATE`,
//! and is unbound at `WM_NCDESTROY`. The state block is heap-pinned, so
//! moving the `Window` value never invalidates the bound address.

use std::ffi::c_void;
use std::iter::once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use raw_window_handle::{
    HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle,
    Win32WindowHandle, WindowsDisplayHandle,
};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, LoadCursorW, PostQuitMessage,
    RegisterClassExW, SetWindowTextW, ShowWindow, UnregisterClassW, CREATESTRUCTW, CS_DBLCLKS,
    CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, IDC_ARROW, SW_HIDE, SW_SHOW, SW_SHOWMAXIMIZED,
    SW_SHOWMINIMIZED, WM_DESTROY, WM_NCCREATE, WM_NCDESTROY, WNDCLASSEXW, WNDCLASS_STYLES,
    WS_EX_APPWINDOW, WS_OVERLAPPEDWINDOW,
};

use crate::platform::class_registry::{
    ClassAtom, ClassRegistrar, ClassRegistration, ClassStyle, WindowClassRegistry,
};
use crate::platform::{window_map, ModuleHandle, PlatformError, ShowState};

/// Class name shared by every engine window.
pub const WINDOW_CLASS_NAME: &str = "ember_engine::window";

pub(super) fn current_module() -> Result<ModuleHandle, PlatformError> {
    let module = unsafe { GetModuleHandleW(None) }
        .map_err(|e| PlatformError::ModuleLookupFailed(e.to_string()))?;
    Ok(ModuleHandle::from_raw(module.0 as isize))
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(once(0)).collect()
}

fn class_styles(style: ClassStyle) -> WNDCLASS_STYLES {
    let mut styles = WNDCLASS_STYLES(0);
    if style.contains(ClassStyle::HREDRAW) {
        styles |= CS_HREDRAW;
    }
    if style.contains(ClassStyle::VREDRAW) {
        styles |= CS_VREDRAW;
    }
    if style.contains(ClassStyle::DBLCLKS) {
        styles |= CS_DBLCLKS;
    }
    styles
}

/// Registers window classes with the real Win32 API.
pub struct Win32ClassRegistrar;

impl ClassRegistrar for Win32ClassRegistrar {
    fn register(
        &self,
        module: ModuleHandle,
        name: &str,
        style: ClassStyle,
    ) -> Result<ClassAtom, PlatformError> {
        let class_name = wide(name);
        let class = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: class_styles(style),
            lpfnWndProc: Some(wnd_proc),
            hInstance: HINSTANCE(module.as_raw() as *mut c_void),
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };

        let atom = unsafe { RegisterClassExW(&class) };
        if atom == 0 {
            return Err(PlatformError::ClassRegistrationFailed {
                name: name.to_owned(),
                detail: windows::core::Error::from_win32().to_string(),
            });
        }
        Ok(ClassAtom(atom))
    }

    fn unregister(&self, module: ModuleHandle, name: &str) {
        let class_name = wide(name);
        let result = unsafe {
            UnregisterClassW(
                PCWSTR(class_name.as_ptr()),
                HINSTANCE(module.as_raw() as *mut c_void),
            )
        };
        if let Err(e) = result {
            log::warn!("failed to unregister window class {name}: {e}");
        }
    }
}

/// The process-wide registry bound to the real Win32 registrar.
pub fn class_registry() -> &'static Arc<WindowClassRegistry> {
    static REGISTRY: OnceLock<Arc<WindowClassRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| WindowClassRegistry::new(Win32ClassRegistrar))
}

/// Per-window state the message procedure resolves through the side channel.
///
/// Heap-pinned for the lifetime of the native handle.
struct WindowState {
    quit_requested: AtomicBool,
}

/// Main rendering window.
///
/// Owns the native handle and one share of the class registration. Dropping
/// the window destroys the handle first, then releases the class share.
pub struct Window {
    state: Box<WindowState>,
    hwnd: HWND,
    module: ModuleHandle,
    registration: ClassRegistration,
}

impl Window {
    /// Create a window, registering (or sharing) the engine window class.
    ///
    /// The address of the freshly allocated state block travels as the
    /// creation parameter; by the time `CreateWindowExW` returns, the
    /// side-channel slot for the new handle is bound and every message
    /// dispatched so far resolved against it.
    pub fn create(
        module: ModuleHandle,
        show: ShowState,
        title: &str,
    ) -> Result<Self, PlatformError> {
        let registration =
            class_registry().acquire(module, WINDOW_CLASS_NAME, ClassStyle::default())?;
        let state = Box::new(WindowState {
            quit_requested: AtomicBool::new(false),
        });

        let class_name = wide(WINDOW_CLASS_NAME);
        let title_wide = wide(title);
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_APPWINDOW,
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title_wide.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                None,
                None,
                HINSTANCE(module.as_raw() as *mut c_void),
                Some(std::ptr::addr_of!(*state).cast::<c_void>()),
            )
        }
        // On failure the registration share drops here and the class live
        // count rolls back.
        .map_err(|e| PlatformError::WindowCreationFailed(e.to_string()))?;

        let window = Self {
            state,
            hwnd,
            module,
            registration,
        };
        window.show(show);
        log::debug!("created window {:?} ({title})", window.hwnd);
        Ok(window)
    }

    /// Apply a visibility state.
    pub fn show(&self, show: ShowState) {
        let command = match show {
            ShowState::Hidden => SW_HIDE,
            ShowState::Shown => SW_SHOW,
            ShowState::Minimized => SW_SHOWMINIMIZED,
            ShowState::Maximized => SW_SHOWMAXIMIZED,
        };
        unsafe {
            let _ = ShowWindow(self.hwnd, command);
        }
    }

    /// Change the title-bar text.
    pub fn set_title(&self, title: &str) {
        let title_wide = wide(title);
        if let Err(e) = unsafe { SetWindowTextW(self.hwnd, PCWSTR(title_wide.as_ptr())) } {
            log::warn!("failed to set window title: {e}");
        }
    }

    /// Whether the platform destroyed this window and the host loop should
    /// quit. Set on `WM_DESTROY`; the loop consumes it, the core only
    /// raises it.
    pub fn quit_requested(&self) -> bool {
        self.state.quit_requested.load(Ordering::Acquire)
    }

    /// The native window handle.
    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// The module handle this window's class is registered under.
    pub fn module(&self) -> ModuleHandle {
        self.module
    }

    /// The class-registration share backing this window.
    pub fn class_registration(&self) -> &ClassRegistration {
        &self.registration
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if !self.hwnd.is_invalid() {
            // WM_NCDESTROY unbinds the side-channel slot before this
            // returns; teardown errors are logged, never propagated.
            if let Err(e) = unsafe { DestroyWindow(self.hwnd) } {
                log::warn!("DestroyWindow failed for {:?}: {e}", self.hwnd);
            }
        }
        // state, then registration, drop afterwards in field order.
    }
}

unsafe impl HasRawWindowHandle for Window {
    fn raw_window_handle(&self) -> RawWindowHandle {
        let mut handle = Win32WindowHandle::empty();
        handle.hwnd = self.hwnd.0;
        handle.hinstance = self.module.as_raw() as *mut c_void;
        RawWindowHandle::Win32(handle)
    }
}

unsafe impl HasRawDisplayHandle for Window {
    fn raw_display_handle(&self) -> RawDisplayHandle {
        RawDisplayHandle::Windows(WindowsDisplayHandle::empty())
    }
}

unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        let create = lparam.0 as *const CREATESTRUCTW;
        let state = (*create).lpCreateParams as usize;
        window_map::global().bind(hwnd.0 as usize, state);
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let Some(state) = window_map::global().resolve(hwnd.0 as usize) else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };
    let state = &*(state as *const WindowState);

    match msg {
        WM_DESTROY => {
            state.quit_requested.store(true, Ordering::Release);
            PostQuitMessage(0);
            LRESULT(0)
        }
        WM_NCDESTROY => {
            window_map::global().remove(hwnd.0 as usize);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
