//! Recording doubles for the graphics context and the host.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use futures::FutureExt;

use crate::abs::GraphicsContext;
use crate::host::{FrameCallback, Host};

/// Shader source that fails to compile.
pub const BROKEN_SOURCE: &str = "#error broken shader";
/// Shader source that compiles but cannot be linked.
pub const UNLINKABLE_SOURCE: &str = "void helper(); void main() { helper(); }";

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateBuffer(u32),
    BindArrayBuffer(Option<u32>),
    BufferDataStatic(usize),
    DeleteBuffer(u32),
    VertexAttribPointer { index: u32, size: i32 },
    EnableAttrib(u32),
    DisableAttrib(u32),
    DrawArrays { mode: u32, first: i32, count: i32 },
    CreateShader(u32, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    ClearColor([f32; 4]),
    Clear(u32),
    Viewport(i32, i32, i32, i32),
}

#[derive(Default)]
struct MockGlState {
    fail_buffers: bool,
    next_id: Cell<u32>,
    calls: RefCell<Vec<GlCall>>,
    sources: RefCell<HashMap<u32, String>>,
    attached: RefCell<HashMap<u32, Vec<u32>>>,
    linked: RefCell<HashMap<u32, String>>,
}

/// A fake GL context that hands out sequential ids and records every call.
///
/// Sources containing `#error` fail to compile, programs referencing `helper()` fail
/// to link, and an attribute exists when a linked source declares
/// `attribute vec4 <name>;`. Clones share the same state.
#[derive(Clone, Default)]
pub struct MockGl {
    state: Rc<MockGlState>,
}

impl MockGl {
    pub fn failing_buffers() -> Self {
        Self {
            state: Rc::new(MockGlState {
                fail_buffers: true,
                ..Default::default()
            }),
        }
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.state.calls.borrow_mut().clear();
    }

    pub fn draw_calls(&self) -> usize {
        self.state
            .calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, GlCall::DrawArrays { .. }))
            .count()
    }

    fn record(&self, call: GlCall) {
        self.state.calls.borrow_mut().push(call);
    }

    fn next_id(&self) -> u32 {
        let id = self.state.next_id.get() + 1;
        self.state.next_id.set(id);
        id
    }
}

impl GraphicsContext for MockGl {
    type Buffer = u32;
    type Shader = u32;
    type Program = u32;

    fn create_buffer(&self) -> Result<u32, String> {
        if self.state.fail_buffers {
            return Err("out of memory".to_string());
        }
        let id = self.next_id();
        self.record(GlCall::CreateBuffer(id));
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.record(GlCall::BindArrayBuffer(buffer));
    }

    fn buffer_data_static(&self, data: &[f32]) {
        self.record(GlCall::BufferDataStatic(data.len()));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32) {
        self.record(GlCall::VertexAttribPointer { index, size });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableAttrib(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::DisableAttrib(index));
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        let id = self.next_id();
        self.record(GlCall::CreateShader(id, shader_type));
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.state.sources.borrow_mut().insert(shader, source.to_string());
    }

    fn compile_shader(&self, shader: u32) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .sources
            .borrow()
            .get(&shader)
            .is_some_and(|source| !source.contains("#error"))
    }

    fn shader_info_log(&self, shader: u32) -> String {
        format!("ERROR: 0:1: shader {} has errors", shader)
    }

    fn delete_shader(&self, shader: u32) {
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let id = self.next_id();
        self.record(GlCall::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.state.attached.borrow_mut().entry(program).or_default().push(shader);
        self.record(GlCall::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(shaders) = self.state.attached.borrow_mut().get_mut(&program) {
            shaders.retain(|s| *s != shader);
        }
        self.record(GlCall::DetachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        let sources = self.state.sources.borrow();
        let text = self
            .state
            .attached
            .borrow()
            .get(&program)
            .map(|shaders| {
                shaders
                    .iter()
                    .filter_map(|s| sources.get(s).cloned())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        self.state.linked.borrow_mut().insert(program, text);
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .linked
            .borrow()
            .get(&program)
            .is_some_and(|text| !text.contains("helper()"))
    }

    fn program_info_log(&self, _program: u32) -> String {
        "error: unresolved function helper".to_string()
    }

    fn delete_program(&self, program: u32) {
        self.record(GlCall::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GlCall::UseProgram(program));
    }

    fn attrib_location(&self, program: u32, name: &str) -> i32 {
        let declaration = format!("attribute vec4 {};", name);
        match self.state.linked.borrow().get(&program) {
            Some(text) if text.contains(&declaration) => 0,
            _ => -1,
        }
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(GlCall::ClearColor([red, green, blue, alpha]));
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    CreateSurface(u32, u32),
    AcquireContext(String),
    ShowUnsupported(String),
    Mount,
}

/// A host whose network and event loop are driven by the test.
pub struct MockHost {
    gl: MockGl,
    supported_apis: Vec<&'static str>,
    size: Cell<(i32, i32)>,
    events: RefCell<Vec<HostEvent>>,
    requests: RefCell<Vec<String>>,
    responders: RefCell<HashMap<String, oneshot::Sender<Result<String, String>>>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    frames: RefCell<VecDeque<FrameCallback>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::with_apis(MockGl::default(), &["webgl"])
    }
}

impl MockHost {
    /// A host that only hands out `gl` for the listed API names.
    pub fn with_apis(gl: MockGl, supported_apis: &[&'static str]) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            gl,
            supported_apis: supported_apis.to_vec(),
            size: Cell::new((0, 0)),
            events: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
            responders: RefCell::new(HashMap::new()),
            pool: RefCell::new(pool),
            spawner,
            frames: RefCell::new(VecDeque::new()),
        }
    }

    pub fn gl(&self) -> &MockGl {
        &self.gl
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Completes the pending request for `url`.
    pub fn respond(&self, url: &str, result: Result<String, String>) {
        let sender = self.responders.borrow_mut().remove(url);
        if let Some(sender) = sender {
            let _ = sender.send(result);
        }
    }

    /// Drops the pending request for `url` without a response.
    pub fn abort(&self, url: &str) {
        self.responders.borrow_mut().remove(url);
    }

    pub fn run_tasks(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Runs the oldest scheduled frame callback. Returns `false` if none was queued.
    pub fn tick(&self, timestamp: f64) -> bool {
        let callback = self.frames.borrow_mut().pop_front();
        match callback {
            Some(callback) => {
                callback(timestamp);
                true
            }
            None => false,
        }
    }
}

impl Host for MockHost {
    type Context = MockGl;
    type Fetch = LocalBoxFuture<'static, Result<String, String>>;

    fn create_surface(&self, width: u32, height: u32) {
        self.size.set((width as i32, height as i32));
        self.events.borrow_mut().push(HostEvent::CreateSurface(width, height));
    }

    fn acquire_context(&self, api: &str) -> Option<MockGl> {
        self.events.borrow_mut().push(HostEvent::AcquireContext(api.to_string()));
        self.supported_apis
            .iter()
            .any(|supported| *supported == api)
            .then(|| self.gl.clone())
    }

    fn show_unsupported(&self, message: &str) {
        self.size.set((0, 0));
        self.events.borrow_mut().push(HostEvent::ShowUnsupported(message.to_string()));
    }

    fn mount(&self) {
        self.events.borrow_mut().push(HostEvent::Mount);
    }

    fn surface_size(&self) -> (i32, i32) {
        self.size.get()
    }

    fn fetch_text(&self, url: &str) -> Self::Fetch {
        let (sender, receiver) = oneshot::channel();
        self.requests.borrow_mut().push(url.to_string());
        self.responders.borrow_mut().insert(url.to_string(), sender);
        receiver
            .map(|response| response.unwrap_or_else(|_| Err("request aborted".to_string())))
            .boxed_local()
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawner.spawn_local(task).unwrap();
    }

    fn request_animation_frame(&self, callback: FrameCallback) {
        self.frames.borrow_mut().push_back(callback);
    }
}
