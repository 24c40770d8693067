//! Browser host.
//!
//! Builds a centered `<div>` holding a `<canvas>` in the current document, fetches
//! shader text with `window.fetch` and schedules frames with
//! `requestAnimationFrame`.

use std::cell::RefCell;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, Response, WebGlRenderingContext, Window};

use super::{FrameCallback, Host};

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// A host backed by the page the module was loaded into.
pub struct WebHost {
    window: Window,
    document: Document,
    container: RefCell<Option<HtmlElement>>,
    canvas: RefCell<Option<HtmlCanvasElement>>,
}

impl WebHost {
    pub fn new() -> Result<Self, String> {
        let window = web_sys::window().ok_or("no global window exists")?;
        let document = window.document().ok_or("no document exists")?;
        Ok(Self {
            window,
            document,
            container: RefCell::new(None),
            canvas: RefCell::new(None),
        })
    }

    fn create_element<T: JsCast>(&self, tag: &str) -> Result<T, String> {
        self.document
            .create_element(tag)
            .map_err(js_error)?
            .dyn_into::<T>()
            .map_err(|_| format!("<{}> has an unexpected type", tag))
    }

    fn try_create_surface(&self, width: u32, height: u32) -> Result<(), String> {
        let container: HtmlElement = self.create_element("div")?;
        container.set_attribute("align", "center").map_err(js_error)?;

        let canvas: HtmlCanvasElement = self.create_element("canvas")?;
        canvas.set_width(width);
        canvas.set_height(height);

        *self.container.borrow_mut() = Some(container);
        *self.canvas.borrow_mut() = Some(canvas);
        Ok(())
    }

    fn try_mount(&self) -> Result<(), String> {
        let container = self.container.borrow();
        let Some(container) = container.as_ref() else {
            return Err("no surface was created".to_string());
        };
        if let Some(canvas) = self.canvas.borrow().as_ref() {
            container.append_child(canvas).map_err(js_error)?;
        }
        let body = self.document.body().ok_or("document has no body")?;
        body.append_child(container).map_err(js_error)?;
        Ok(())
    }
}

impl Host for WebHost {
    type Context = glow::Context;
    type Fetch = LocalBoxFuture<'static, Result<String, String>>;

    fn create_surface(&self, width: u32, height: u32) {
        if let Err(e) = self.try_create_surface(width, height) {
            log::error!("Failed to create canvas: {}", e);
        }
    }

    fn acquire_context(&self, api: &str) -> Option<glow::Context> {
        let canvas = self.canvas.borrow();
        let context = canvas
            .as_ref()?
            .get_context(api)
            .ok()
            .flatten()?
            .dyn_into::<WebGlRenderingContext>()
            .ok()?;
        Some(glow::Context::from_webgl1_context(context))
    }

    fn show_unsupported(&self, message: &str) {
        self.canvas.borrow_mut().take();
        if let Some(container) = self.container.borrow().as_ref() {
            container.set_inner_text(message);
        }
    }

    fn mount(&self) {
        if let Err(e) = self.try_mount() {
            log::error!("Failed to attach canvas: {}", e);
        }
    }

    fn surface_size(&self) -> (i32, i32) {
        match self.canvas.borrow().as_ref() {
            Some(canvas) => (canvas.width() as i32, canvas.height() as i32),
            None => (0, 0),
        }
    }

    fn fetch_text(&self, url: &str) -> Self::Fetch {
        let request = self.window.fetch_with_str(url);
        let url = url.to_string();
        async move {
            let response: Response = JsFuture::from(request)
                .await
                .map_err(js_error)?
                .dyn_into()
                .map_err(js_error)?;
            if !response.ok() {
                log::warn!("GET {} returned {}", url, response.status());
            }
            let text = JsFuture::from(response.text().map_err(js_error)?)
                .await
                .map_err(js_error)?;
            text.as_string()
                .ok_or_else(|| format!("{} did not return text", url))
        }
        .boxed_local()
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn request_animation_frame(&self, callback: FrameCallback) {
        let closure = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        if let Err(e) = self.window.request_animation_frame(closure.unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {}", js_error(e));
        }
    }
}
