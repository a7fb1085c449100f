use std::rc::Rc;

use log::trace;

use tinygl::gl;
use tinygl::wrappers::Framebuffer;
use tinygl::GlContext;

use crate::capabilities::Capabilities;
use crate::error::{FboError, Result};
use crate::framebuffer::Fbo;
use crate::options::FboOptions;

/// Creates framebuffer objects on one context
///
/// The context's capabilities are queried once, when the factory is built, and reused for every
/// framebuffer it creates.
pub struct FboFactory<C: GlContext> {
    gl: Rc<C>,
    caps: Capabilities,
}

impl<C: GlContext> FboFactory<C> {
    pub fn new(gl: &Rc<C>) -> Self {
        Self {
            gl: gl.clone(),
            caps: Capabilities::query(gl.as_ref()),
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Validate `options` and build a complete `width`x`height` framebuffer
    ///
    /// Dimensions are checked before anything is allocated. Options are resolved against the
    /// context's capabilities, then the framebuffer is built; its completeness errors are
    /// returned as is.
    pub fn create(&self, width: i32, height: i32, options: &FboOptions) -> Result<Fbo<C>> {
        if !self.caps.accepts_dimensions(width, height) {
            return Err(FboError::InvalidDimensions {
                width,
                height,
                max: self.caps.max_renderbuffer_size,
            });
        }

        let config = options.resolve(&self.caps)?;
        Fbo::new(&self.gl, self.caps, config, width, height)
    }

    /// Handle on the window-system framebuffer of the same context
    pub fn default_framebuffer(&self) -> DefaultFramebuffer<C> {
        DefaultFramebuffer::new(&self.gl)
    }
}

/// Build a single framebuffer, querying the context's capabilities
///
/// Prefer keeping an [`FboFactory`] when creating several framebuffers on the same context.
pub fn create_fbo<C: GlContext>(
    gl: &Rc<C>,
    width: i32,
    height: i32,
    options: &FboOptions,
) -> Result<Fbo<C>> {
    FboFactory::new(gl).create(width, height, options)
}

/// The framebuffer provided by the window system
///
/// Binding it switches rendering back to the screen, with the same call shape as [`Fbo::bind`].
pub struct DefaultFramebuffer<C: GlContext> {
    gl: Rc<C>,
}

impl<C: GlContext> DefaultFramebuffer<C> {
    pub fn new(gl: &Rc<C>) -> Self {
        Self { gl: gl.clone() }
    }

    /// Bind the window-system framebuffer with a `width`x`height` viewport
    pub fn bind(&self, width: i32, height: i32) {
        trace!("binding default framebuffer ({}x{})", width, height);
        Framebuffer::unbind(self.gl.as_ref(), gl::FRAMEBUFFER);
        unsafe { self.gl.viewport(0, 0, width, height) };
    }
}
