//! Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for compiling and
//! linking GLSL source into a program that can be made current.

use std::fmt;
use std::rc::Rc;

use super::GraphicsContext;

/// Pipeline stage a shader is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("Vertex"),
            ShaderStage::Fragment => f.write_str("Fragment"),
        }
    }
}

/// A compiled shader object. The GL object is deleted on drop.
pub struct Shader<C: GraphicsContext> {
    gl: Rc<C>,
    id: C::Shader,
    stage: ShaderStage,
}

impl<C: GraphicsContext> Shader<C> {
    /// Compiles a new shader from the given source code.
    ///
    /// On failure the shader object is deleted and the compiler log is returned.
    pub fn new(gl: &Rc<C>, stage: ShaderStage, source: &str) -> Result<Self, String> {
        let shader = gl.create_shader(stage.gl_type())?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.shader_compile_status(shader) {
            let log = gl.shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(log);
        }

        Ok(Self {
            gl: Rc::clone(gl),
            id: shader,
            stage,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<C: GraphicsContext> Drop for Shader<C> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

/// A linked vertex + fragment program.
///
/// Construction never fails outright: a compile or link error is logged and leaves the
/// program disabled, after which [`ShaderProgram::use_program`] does nothing and every
/// attribute lookup reports `-1`.
pub struct ShaderProgram<C: GraphicsContext> {
    gl: Rc<C>,
    id: Option<C::Program>,
}

impl<C: GraphicsContext> ShaderProgram<C> {
    /// Compiles both stages and links them into a program.
    pub fn new(gl: &Rc<C>, vertex_source: &str, fragment_source: &str) -> Self {
        let id = match Self::build(gl, vertex_source, fragment_source) {
            Ok(program) => Some(program),
            Err(e) => {
                log::error!("{}", e);
                None
            }
        };

        Self {
            gl: Rc::clone(gl),
            id,
        }
    }

    fn build(
        gl: &Rc<C>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<C::Program, String> {
        // Both stages are compiled so that every broken one gets reported.
        let vertex = Shader::new(gl, ShaderStage::Vertex, vertex_source);
        let fragment = Shader::new(gl, ShaderStage::Fragment, fragment_source);
        let (vertex, fragment) = match (vertex, fragment) {
            (Ok(vertex), Ok(fragment)) => (vertex, fragment),
            (vertex, fragment) => {
                let mut errors = Vec::new();
                if let Err(log) = vertex {
                    errors.push(format!("{} shader compile error\n{}", ShaderStage::Vertex, log));
                }
                if let Err(log) = fragment {
                    errors.push(format!("{} shader compile error\n{}", ShaderStage::Fragment, log));
                }
                return Err(errors.join("\n"));
            }
        };

        Self::link(gl, &[&vertex, &fragment])
    }

    fn link(gl: &Rc<C>, shaders: &[&Shader<C>]) -> Result<C::Program, String> {
        let program = gl.create_program()?;

        for shader in shaders {
            log::debug!("Attaching {} shader", shader.stage());
            gl.attach_shader(program, shader.id);
        }

        gl.link_program(program);

        if !gl.program_link_status(program) {
            let log = gl.program_info_log(program);
            gl.delete_program(program);
            return Err(format!("Program link error\n{}", log));
        }

        for shader in shaders {
            gl.detach_shader(program, shader.id);
        }

        Ok(program)
    }

    /// Makes the program current. Does nothing if the program failed to build.
    pub fn use_program(&self) {
        if let Some(id) = self.id {
            self.gl.use_program(Some(id));
        }
    }

    /// Looks up a vertex attribute by name, returning `-1` when it does not exist.
    pub fn attribute_location(&self, name: &str) -> i32 {
        match self.id {
            Some(id) => self.gl.attrib_location(id, name),
            None => -1,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.id.is_some()
    }
}

impl<C: GraphicsContext> Drop for ShaderProgram<C> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.gl.delete_program(id);
        }
    }
}
