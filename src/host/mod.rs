//! Host environment boundary.
//!
//! A [`Host`] owns everything outside the renderer: the page or window the surface
//! lives in, the network, and the event loop that delivers fetch completions and
//! animation frames. The scene only talks to its host, never to globals.

use std::future::Future;
use std::path::PathBuf;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};

use crate::abs::GraphicsContext;

#[cfg(feature = "sdl")]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(feature = "sdl")]
pub use native::NativeHost;
#[cfg(target_arch = "wasm32")]
pub use web::WebHost;

/// Context API names tried in order when acquiring a graphics context.
pub const CONTEXT_APIS: [&str; 2] = ["webgl", "experimental-webgl"];

/// Message shown in place of the surface when no context can be acquired.
pub const UNSUPPORTED_MESSAGE: &str = "WebGL not supported.";

/// Callback invoked once per display refresh with a timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// The environment a scene renders into.
///
/// All callbacks run on one thread, so implementations are free to use `RefCell`.
pub trait Host: 'static {
    type Context: GraphicsContext + 'static;
    type Fetch: Future<Output = Result<String, String>> + 'static;

    /// Creates the container and a drawing surface of the given pixel size.
    fn create_surface(&self, width: u32, height: u32);
    /// Tries to acquire a context through a single API name.
    fn acquire_context(&self, api: &str) -> Option<Self::Context>;
    /// Discards the drawing surface and shows `message` in its place.
    fn show_unsupported(&self, message: &str);
    /// Attaches the container (and the surface, if kept) to the page.
    fn mount(&self);
    /// Pixel dimensions of the drawing surface.
    fn surface_size(&self) -> (i32, i32);
    /// Starts a GET request for `url` resolving to the response text.
    fn fetch_text(&self, url: &str) -> Self::Fetch;
    /// Runs `task` on the host event loop.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
    /// Registers `callback` for the next display refresh.
    fn request_animation_frame(&self, callback: FrameCallback);
}

/// Reads a text file when first polled rather than when the request is made.
pub fn read_text_file(path: PathBuf) -> LocalBoxFuture<'static, Result<String, String>> {
    future::lazy(move |_| {
        std::fs::read_to_string(&path).map_err(|e| format!("{}: {}", path.display(), e))
    })
    .boxed_local()
}
