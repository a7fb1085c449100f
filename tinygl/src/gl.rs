//! Exposed OpenGL bindings

pub use ::glow::*;

// GLES2/WebGL extension enums that the desktop registry does not name

/// `OES_texture_half_float` pixel type, distinct from the core `HALF_FLOAT`
pub const HALF_FLOAT_OES: u32 = 0x8D61;
/// GLES2 only completeness status
pub const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: u32 = 0x8CD9;
