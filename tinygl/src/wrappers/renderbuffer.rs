use log::trace;

use crate::GlContext;

pub struct Renderbuffer<C: GlContext> {
    name: C::Renderbuffer,
}

impl<C: GlContext> Renderbuffer<C> {
    pub fn new(gl: &C) -> Result<Self, String> {
        let name = unsafe { gl.create_renderbuffer() }?;
        trace!("created renderbuffer {:?}", name);
        Ok(Self { name })
    }

    pub fn name(&self) -> C::Renderbuffer {
        self.name
    }

    pub fn bind(&self, gl: &C) {
        unsafe { gl.bind_renderbuffer(crate::gl::RENDERBUFFER, Some(self.name)) };
    }

    /// (Re)specify the storage of this renderbuffer, leaving it unbound
    pub fn storage(&self, gl: &C, internal_format: u32, width: i32, height: i32) {
        self.bind(gl);
        unsafe {
            gl.renderbuffer_storage(crate::gl::RENDERBUFFER, internal_format, width, height);
            gl.bind_renderbuffer(crate::gl::RENDERBUFFER, None);
        }
    }
}

impl<C: GlContext> std::fmt::Debug for Renderbuffer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Renderbuffer").field(&self.name).finish()
    }
}

impl<C: GlContext> super::GlDrop<C> for Renderbuffer<C> {
    fn drop(&mut self, gl: &C) {
        trace!("deleting renderbuffer {:?}", self.name);
        unsafe { gl.delete_renderbuffer(self.name) }
    }
}
