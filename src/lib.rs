//! Animated WebGL scenes.
//!
//! A [`Scene`] draws a static vertex buffer with a shader program whose sources are
//! fetched at runtime, clearing to a slowly pulsing background every frame. The
//! page, network and frame scheduling are reached through a [`Host`]; the browser
//! host is [`host::WebHost`] and a desktop one is available behind the `sdl` feature.

pub mod abs;
pub mod config;
pub mod host;
pub mod loader;
pub mod logging;
pub mod scene;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{SceneCatalog, SceneConfig};
pub use host::Host;
pub use scene::{Scene, SceneState};

/// Starts the named built-in scene in the current page.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn start_scene(name: &str) -> Result<(), wasm_bindgen::JsValue> {
    use std::rc::Rc;

    logging::init();

    let config = SceneConfig::builtin(name).map_err(|e| wasm_bindgen::JsValue::from_str(&e))?;
    let host = host::WebHost::new().map_err(|e| wasm_bindgen::JsValue::from_str(&e))?;
    let mut scene = Scene::new(Rc::new(host), config);
    log::info!("Starting {}", scene.config().name);
    scene.run();
    Ok(())
}
