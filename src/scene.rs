//! The application driver.
//!
//! A [`Scene`] acquires a graphics context from its [`Host`], uploads the vertex
//! buffer, starts loading the shader sources and then redraws on every animation
//! frame. The program shows up whenever its sources arrive; until then frames are
//! only cleared.

use std::cell::OnceCell;
use std::rc::Rc;

use glam::Vec4;

use crate::abs::{GraphicsContext, ShaderProgram, VertexBuffer};
use crate::config::SceneConfig;
use crate::host::{CONTEXT_APIS, Host, UNSUPPORTED_MESSAGE};
use crate::loader::fetch_shader_sources;

/// Name of the vertex attribute the buffer is bound to.
pub const POSITION_ATTRIBUTE: &str = "position";

/// Background color at `t` seconds. Only the green channel moves.
pub fn clear_color(t: f64) -> Vec4 {
    let green = 0.15 * t.sin() + 0.15;
    Vec4::new(0.2, green as f32, 0.4, 1.0)
}

/// Lifecycle of a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// No context could be acquired. Nothing will ever be drawn.
    Unsupported,
    ContextAcquired,
    Running,
}

/// GPU resources shared between the frame loop and the shader loader.
struct Renderer<C: GraphicsContext> {
    gl: Rc<C>,
    buffer: VertexBuffer<C>,
    program: OnceCell<ShaderProgram<C>>,
}

impl<C: GraphicsContext> Renderer<C> {
    fn set_program(&self, program: ShaderProgram<C>) {
        if self.program.set(program).is_err() {
            log::warn!("Shader program was already built, ignoring the new one");
        }
    }

    fn display(&self, t: f64, (width, height): (i32, i32)) {
        let gl = self.gl.as_ref();
        let color = clear_color(t);
        gl.clear_color(color.x, color.y, color.z, color.w);
        gl.clear(glow::COLOR_BUFFER_BIT);
        gl.viewport(0, 0, width, height);

        if let Some(program) = self.program.get() {
            program.use_program();
            self.buffer.render(program.attribute_location(POSITION_ATTRIBUTE));
        }

        gl.use_program(None);
        gl.bind_array_buffer(None);
    }
}

fn frame<H: Host>(host: Rc<H>, renderer: Rc<Renderer<H::Context>>, timestamp: f64) {
    renderer.display(timestamp / 1000.0, host.surface_size());

    let next = Rc::clone(&host);
    host.request_animation_frame(Box::new(move |timestamp| frame(next, renderer, timestamp)));
}

/// One animated scene bound to a host surface.
pub struct Scene<H: Host> {
    host: Rc<H>,
    config: SceneConfig,
    gl: Option<Rc<H::Context>>,
    renderer: Option<Rc<Renderer<H::Context>>>,
}

impl<H: Host> Scene<H> {
    /// Creates the surface and tries each context API in turn.
    ///
    /// If none succeeds the host shows a "not supported" message instead of the
    /// surface, and the scene stays [`SceneState::Unsupported`] for good.
    pub fn new(host: Rc<H>, config: SceneConfig) -> Self {
        host.create_surface(config.width, config.height);

        let gl = CONTEXT_APIS
            .iter()
            .find_map(|api| {
                let context = host.acquire_context(api);
                if context.is_some() {
                    log::info!("Acquired '{}' context for {}", api, config.name);
                }
                context
            })
            .map(Rc::new);

        if gl.is_none() {
            log::error!("No graphics context available for {}", config.name);
            host.show_unsupported(UNSUPPORTED_MESSAGE);
        }
        host.mount();

        Self {
            host,
            config,
            gl,
            renderer: None,
        }
    }

    pub fn state(&self) -> SceneState {
        match (&self.gl, &self.renderer) {
            (None, _) => SceneState::Unsupported,
            (Some(_), None) => SceneState::ContextAcquired,
            (Some(_), Some(_)) => SceneState::Running,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Whether the shader sources have arrived and a program was built from them.
    /// The program itself may still have failed to compile or link.
    pub fn has_program(&self) -> bool {
        self.renderer
            .as_ref()
            .is_some_and(|renderer| renderer.program.get().is_some())
    }

    /// Uploads the vertex buffer, starts loading shaders and enters the frame loop.
    ///
    /// Does nothing without a context or when the scene is already running.
    pub fn run(&mut self) {
        let Some(gl) = &self.gl else {
            return;
        };
        if self.renderer.is_some() {
            log::warn!("{} is already running", self.config.name);
            return;
        }

        let renderer = Rc::new(Renderer {
            gl: Rc::clone(gl),
            buffer: VertexBuffer::new(gl, self.config.topology, &self.config.vertex_data()),
            program: OnceCell::new(),
        });

        let target = Rc::clone(&renderer);
        fetch_shader_sources(
            self.host.as_ref(),
            &self.config.vertex_shader,
            &self.config.fragment_shader,
            move |vertex, fragment| {
                let program = ShaderProgram::new(&target.gl, &vertex, &fragment);
                target.set_program(program);
            },
        );

        log::info!("Running {}", self.config.name);
        self.renderer = Some(Rc::clone(&renderer));
        frame(Rc::clone(&self.host), renderer, 0.0);
    }
}
