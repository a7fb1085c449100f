//! OpenGL object wrappers

use std::rc::Rc;

use crate::GlContext;

mod framebuffer;
pub use framebuffer::*;

mod renderbuffer;
pub use renderbuffer::*;

mod texture;
pub use texture::*;

/// Trait for GL objects that can be dropped
pub trait GlDrop<C: GlContext> {
    fn drop(&mut self, gl: &C);
}

/// Handle to a GL object that will be cleaned up when this handle is dropped
///
/// This keeps a RC reference to the context, so it is best used as a long-lived handle. The
/// object is released exactly once, when the handle goes out of scope, which makes early returns
/// during partial construction leak-free.
pub struct GlHandle<C: GlContext, T: GlDrop<C>> {
    gl: Rc<C>,
    res: T,
}

impl<C: GlContext, T: GlDrop<C>> GlHandle<C, T> {
    pub fn new(gl: &Rc<C>, res: T) -> Self {
        Self {
            gl: gl.clone(),
            res,
        }
    }

    pub fn context(&self) -> &Rc<C> {
        &self.gl
    }
}

impl<C: GlContext, T: GlDrop<C>> Drop for GlHandle<C, T> {
    fn drop(&mut self) {
        self.res.drop(self.gl.as_ref());
    }
}

impl<C: GlContext, T: GlDrop<C>> std::ops::Deref for GlHandle<C, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.res
    }
}

impl<C: GlContext, T: GlDrop<C>> std::ops::DerefMut for GlHandle<C, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.res
    }
}

impl<C: GlContext, T: GlDrop<C>> std::convert::AsRef<T> for GlHandle<C, T> {
    fn as_ref(&self) -> &T {
        &self.res
    }
}

impl<C: GlContext, T: GlDrop<C>> std::fmt::Debug for GlHandle<C, T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("GlHandle").field(&self.res).finish()
    }
}
