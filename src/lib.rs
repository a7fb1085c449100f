//! Off-screen render targets on GL contexts with optional features
//!
//! [`FboFactory`] queries which optional features a context has (depth textures, draw buffers,
//! float color storage), validates [`FboOptions`] against them and builds [`Fbo`] framebuffer
//! objects, falling back to renderbuffers where textures cannot be attached. Every GL object a
//! framebuffer allocates is owned by it and released on [`Fbo::dispose`], on drop, or as soon as
//! construction fails.
//!
//! ```ignore
//! let factory = gl_fbo::FboFactory::new(&gl);
//! let mut target = factory.create(512, 512, &gl_fbo::FboOptions::default())?;
//!
//! target.bind();
//! // draw into the target, then sample target.color_texture(0)
//! factory.default_framebuffer().bind(width, height);
//! ```

pub mod log;

mod attachment;
pub use attachment::*;

mod capabilities;
pub use capabilities::*;

mod error;
pub use error::*;

mod factory;
pub use factory::*;

mod framebuffer;
pub use framebuffer::*;

mod options;
pub use options::*;

pub use tinygl;
