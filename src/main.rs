//! Desktop runner: shows one built-in scene in a window, reading shaders from `www/`.

use std::rc::Rc;

use rtr_scene::host::NativeHost;
use rtr_scene::{Scene, SceneConfig, logging};

const DEFAULT_SCENE: &str = "rtr-homework0";
const SHADER_DIR: &str = "www";

fn run() -> Result<(), String> {
    logging::init()?;

    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SCENE.to_string());
    let config = SceneConfig::builtin(&name)?;

    let host = Rc::new(NativeHost::new(&name, SHADER_DIR)?);
    let mut scene = Scene::new(Rc::clone(&host), config);
    let config = scene.config();
    log::info!(
        "Running {} ({} x {}, shaders from {}/)",
        config.name,
        config.width,
        config.height,
        SHADER_DIR
    );
    scene.run();
    host.run_event_loop()
}

fn main() {
    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
