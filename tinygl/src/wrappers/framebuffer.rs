use log::trace;

use crate::GlContext;

pub struct Framebuffer<C: GlContext> {
    name: C::Framebuffer,
}

impl<C: GlContext> Framebuffer<C> {
    pub fn new(gl: &C) -> Result<Self, String> {
        let name = unsafe { gl.create_framebuffer() }?;
        trace!("created framebuffer {:?}", name);
        Ok(Self { name })
    }

    pub fn name(&self) -> C::Framebuffer {
        self.name
    }

    pub fn bind(&self, gl: &C, target: u32) {
        unsafe { gl.bind_framebuffer(target, Some(self.name)) }
    }

    /// Bind the window-system framebuffer to `target`
    pub fn unbind(gl: &C, target: u32) {
        unsafe { gl.bind_framebuffer(target, None) }
    }

    pub fn status(&self, gl: &C, target: u32) -> u32 {
        unsafe { gl.check_framebuffer_status(target) }
    }

    pub fn renderbuffer(
        &self,
        gl: &C,
        target: u32,
        attachment: u32,
        renderbuffer: Option<&super::Renderbuffer<C>>,
    ) {
        unsafe {
            gl.framebuffer_renderbuffer(
                target,
                attachment,
                crate::gl::RENDERBUFFER,
                renderbuffer.map(|rb| rb.name()),
            );
        }
    }

    pub fn texture(
        &self,
        gl: &C,
        target: u32,
        attachment: u32,
        texture: Option<&super::Texture<C>>,
        level: i32,
    ) {
        unsafe {
            gl.framebuffer_texture_2d(
                target,
                attachment,
                crate::gl::TEXTURE_2D,
                texture.map(|tex| tex.name()),
                level,
            );
        }
    }
}

impl<C: GlContext> std::fmt::Debug for Framebuffer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Framebuffer").field(&self.name).finish()
    }
}

impl<C: GlContext> super::GlDrop<C> for Framebuffer<C> {
    fn drop(&mut self, gl: &C) {
        trace!("deleting framebuffer {:?}", self.name);
        unsafe { gl.delete_framebuffer(self.name) }
    }
}
