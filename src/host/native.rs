//! Desktop host.
//!
//! Opens an SDL2 window with a GLES 2.0 context (the desktop counterpart of WebGL1),
//! reads shader text from a base directory and drives frames from its own event loop.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use sdl2::video::{GLContext, GLProfile, SwapInterval, Window};

use super::{FrameCallback, Host, read_text_file};

/// A host backed by an SDL2 window.
pub struct NativeHost {
    sdl: sdl2::Sdl,
    video_subsystem: sdl2::VideoSubsystem,
    title: String,
    base_dir: PathBuf,
    window: RefCell<Option<Window>>,
    gl_context: RefCell<Option<GLContext>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    frames: RefCell<VecDeque<FrameCallback>>,
    start: Instant,
}

impl NativeHost {
    /// Initializes SDL2. Shader URLs are resolved against `base_dir`.
    pub fn new(title: &str, base_dir: impl Into<PathBuf>) -> Result<Self, String> {
        let sdl = sdl2::init()?;
        let video_subsystem = sdl.video()?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::GLES);
        gl_attr.set_context_version(2, 0);

        let pool = LocalPool::new();
        let spawner = pool.spawner();

        Ok(Self {
            sdl,
            video_subsystem,
            title: title.to_string(),
            base_dir: base_dir.into(),
            window: RefCell::new(None),
            gl_context: RefCell::new(None),
            pool: RefCell::new(pool),
            spawner,
            frames: RefCell::new(VecDeque::new()),
            start: Instant::now(),
        })
    }

    /// Pumps window events, pending tasks and frame callbacks until the window is
    /// closed. Returns at once if the surface was discarded.
    pub fn run_event_loop(&self) -> Result<(), String> {
        if self.window.borrow().is_none() {
            return Ok(());
        }
        let mut event_pump = self.sdl.event_pump()?;

        'running: loop {
            for event in event_pump.poll_iter() {
                if let sdl2::event::Event::Quit { .. } = event {
                    break 'running;
                }
            }

            self.pool.borrow_mut().run_until_stalled();

            let callbacks: Vec<FrameCallback> = self.frames.borrow_mut().drain(..).collect();
            let timestamp = self.start.elapsed().as_secs_f64() * 1000.0;
            for callback in callbacks {
                callback(timestamp);
            }

            if let Some(window) = self.window.borrow().as_ref() {
                window.gl_swap_window();
            }
        }

        log::info!("Window closed");
        Ok(())
    }
}

impl Host for NativeHost {
    type Context = glow::Context;
    type Fetch = LocalBoxFuture<'static, Result<String, String>>;

    fn create_surface(&self, width: u32, height: u32) {
        match self
            .video_subsystem
            .window(&self.title, width, height)
            .opengl()
            .position_centered()
            .hidden()
            .build()
        {
            Ok(window) => *self.window.borrow_mut() = Some(window),
            Err(e) => log::error!("Failed to create window: {}", e),
        }
    }

    fn acquire_context(&self, api: &str) -> Option<glow::Context> {
        let window = self.window.borrow();
        let window = window.as_ref()?;

        let gl_context = match window.gl_create_context() {
            Ok(gl_context) => gl_context,
            Err(e) => {
                log::warn!("No '{}' context: {}", api, e);
                return None;
            }
        };
        if let Err(e) = window.gl_make_current(&gl_context) {
            log::warn!("Failed to make '{}' context current: {}", api, e);
            return None;
        }
        if let Err(e) = self.video_subsystem.gl_set_swap_interval(SwapInterval::VSync) {
            log::warn!("VSync unavailable: {}", e);
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                self.video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        *self.gl_context.borrow_mut() = Some(gl_context);
        Some(gl)
    }

    fn show_unsupported(&self, message: &str) {
        self.window.borrow_mut().take();
        if let Err(e) = sdl2::messagebox::show_simple_message_box(
            sdl2::messagebox::MessageBoxFlag::ERROR,
            &self.title,
            message,
            None,
        ) {
            log::error!("{}: {}", message, e);
        }
    }

    fn mount(&self) {
        if let Some(window) = self.window.borrow_mut().as_mut() {
            window.show();
        }
    }

    fn surface_size(&self) -> (i32, i32) {
        match self.window.borrow().as_ref() {
            Some(window) => {
                let (width, height) = window.drawable_size();
                (width as i32, height as i32)
            }
            None => (0, 0),
        }
    }

    fn fetch_text(&self, url: &str) -> Self::Fetch {
        read_text_file(self.base_dir.join(url))
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(task) {
            log::error!("Failed to spawn task: {}", e);
        }
    }

    fn request_animation_frame(&self, callback: FrameCallback) {
        self.frames.borrow_mut().push_back(callback);
    }
}
