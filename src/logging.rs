//! Logger installation for each target.

#[cfg(target_arch = "wasm32")]
use std::sync::Once;

/// Runs `install` the first time `once` is seen, so repeated entry points share one
/// logger.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn install_once(once: &std::sync::Once, install: impl FnOnce()) {
    once.call_once(install);
}

/// Routes `log` output to the browser console and panics to `console.error`.
///
/// Safe to call once per started scene; only the first call installs anything.
#[cfg(target_arch = "wasm32")]
pub fn init() {
    static LOGGER: Once = Once::new();

    install_once(&LOGGER, || {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Debug) {
            web_sys::console::error_1(&format!("Failed to initialize logger: {}", e).into());
        }
    });
}

/// Routes `log` output to stdout with a timestamp, level and target per line.
#[cfg(all(not(target_arch = "wasm32"), feature = "sdl"))]
pub fn init() -> Result<(), String> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stdout())
        .apply()
        .map_err(|e| e.to_string())
}
