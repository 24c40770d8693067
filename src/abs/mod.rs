//! This module contains the low-level GPU resources: the graphics context seam,
//! static vertex buffers and shader programs.

pub mod buffer;
pub mod context;
pub mod shader;

pub use buffer::*;
pub use context::*;
pub use shader::*;
