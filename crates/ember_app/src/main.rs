//! Bootstrap host: creates the window, builds the render context, and
//! pumps platform messages until the window asks to quit.
//!
//! The engine core only raises the quit-requested signal; reacting to it —
//! and everything else about message dispatch — lives here.

use ember_engine::{Config, EngineConfig, EngineError};

fn main() {
    env_logger::init();

    let config = load_config();
    if let Err(e) = run(&config) {
        log::error!("fatal: {e}");
        std::process::exit(1);
    }
}

/// Optional config file path as the first argument; defaults otherwise.
fn load_config() -> EngineConfig {
    match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from_file(&path).unwrap_or_else(|e| {
            log::warn!("could not load {path}: {e}; using defaults");
            EngineConfig::default()
        }),
        None => EngineConfig::default(),
    }
}

#[cfg(windows)]
fn run(config: &EngineConfig) -> Result<(), EngineError> {
    use ember_engine::platform::win32::Window;
    use ember_engine::platform::ModuleHandle;
    use ember_engine::renderer::RenderContext;

    let module = ModuleHandle::current()?;
    let window = Window::create(module, config.window.show, &config.window.title)?;
    let context = RenderContext::new(&config.app_name, &window, |profile| {
        config.scoring.score(profile)
    })?;
    log::info!("render context ready; entering message loop");

    pump_messages(&window);

    // Teardown order: context (surface, device, instance) before the window.
    drop(context);
    drop(window);
    Ok(())
}

#[cfg(windows)]
fn pump_messages(window: &ember_engine::platform::win32::Window) {
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, TranslateMessage, MSG,
    };

    let mut msg = MSG::default();
    loop {
        let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if result.0 <= 0 {
            // 0 is WM_QUIT, -1 a retrieval failure; both end the loop.
            break;
        }
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        if window.quit_requested() {
            break;
        }
    }
}

#[cfg(not(windows))]
fn run(_config: &EngineConfig) -> Result<(), EngineError> {
    log::error!("the window bootstrap is Windows-only; nothing to do on this platform");
    Ok(())
}
