//! Static vertex buffers.
//!
//! This module defines the [`VertexBuffer`] struct, a write-once GPU buffer holding
//! homogeneous 4-component positions, and the [`Topology`] used to draw it.

use std::rc::Rc;

use serde::Deserialize;

use super::GraphicsContext;

/// Number of floats making up one vertex.
pub const FLOATS_PER_VERTEX: usize = 4;

/// Primitive assembly mode used when drawing a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    /// The GL enum passed to `drawArrays`.
    pub fn gl_mode(self) -> u32 {
        match self {
            Topology::Points => glow::POINTS,
            Topology::Lines => glow::LINES,
            Topology::LineLoop => glow::LINE_LOOP,
            Topology::LineStrip => glow::LINE_STRIP,
            Topology::Triangles => glow::TRIANGLES,
            Topology::TriangleStrip => glow::TRIANGLE_STRIP,
            Topology::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

/// Keeps an array buffer bound until dropped.
struct BoundArrayBuffer<'a, C: GraphicsContext> {
    gl: &'a C,
}

impl<'a, C: GraphicsContext> BoundArrayBuffer<'a, C> {
    fn bind(gl: &'a C, buffer: C::Buffer) -> Self {
        gl.bind_array_buffer(Some(buffer));
        Self { gl }
    }
}

impl<C: GraphicsContext> Drop for BoundArrayBuffer<'_, C> {
    fn drop(&mut self) {
        self.gl.bind_array_buffer(None);
    }
}

/// Keeps a vertex attribute array enabled until dropped.
struct EnabledAttribute<'a, C: GraphicsContext> {
    gl: &'a C,
    location: u32,
}

impl<'a, C: GraphicsContext> EnabledAttribute<'a, C> {
    fn enable(gl: &'a C, location: u32) -> Self {
        gl.enable_vertex_attrib_array(location);
        Self { gl, location }
    }
}

impl<C: GraphicsContext> Drop for EnabledAttribute<'_, C> {
    fn drop(&mut self) {
        self.gl.disable_vertex_attrib_array(self.location);
    }
}

/// A vertex buffer uploaded once at construction and never modified.
///
/// If the GPU refuses to allocate the buffer the instance stays disabled and
/// [`VertexBuffer::render`] does nothing.
pub struct VertexBuffer<C: GraphicsContext> {
    gl: Rc<C>,
    handle: Option<C::Buffer>,
    topology: Topology,
    count: usize,
}

impl<C: GraphicsContext> VertexBuffer<C> {
    /// Allocates a buffer and uploads `vertices`, four floats per vertex.
    pub fn new(gl: &Rc<C>, topology: Topology, vertices: &[f32]) -> Self {
        let handle = match gl.create_buffer() {
            Ok(buffer) => buffer,
            Err(e) => {
                log::error!("Failed to create vertex buffer: {}", e);
                return Self {
                    gl: Rc::clone(gl),
                    handle: None,
                    topology,
                    count: 0,
                };
            }
        };

        if vertices.len() % FLOATS_PER_VERTEX != 0 {
            log::warn!(
                "Vertex data has {} floats, dropping the trailing partial vertex",
                vertices.len()
            );
        }

        {
            let _bound = BoundArrayBuffer::bind(gl.as_ref(), handle);
            gl.buffer_data_static(vertices);
        }

        Self {
            gl: Rc::clone(gl),
            handle: Some(handle),
            topology,
            count: vertices.len() / FLOATS_PER_VERTEX,
        }
    }

    /// Draws every vertex, feeding them to the attribute at `location`.
    ///
    /// A negative location means the attribute was not found in the program, in which
    /// case nothing is drawn. The buffer and attribute are always unbound afterwards.
    pub fn render(&self, location: i32) {
        let Some(handle) = self.handle else {
            return;
        };
        let Ok(location) = u32::try_from(location) else {
            return;
        };

        let gl = self.gl.as_ref();
        let _bound = BoundArrayBuffer::bind(gl, handle);
        gl.vertex_attrib_pointer_f32(location, FLOATS_PER_VERTEX as i32);
        let _enabled = EnabledAttribute::enable(gl, location);
        gl.draw_arrays(self.topology.gl_mode(), 0, self.count as i32);
    }

    /// Returns the number of vertices in the buffer.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Whether the GPU buffer was allocated.
    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }
}

impl<C: GraphicsContext> Drop for VertexBuffer<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.gl.delete_buffer(handle);
        }
    }
}
