use log::trace;

use crate::GlContext;

pub struct Texture<C: GlContext> {
    name: C::Texture,
}

impl<C: GlContext> Texture<C> {
    pub fn new(gl: &C) -> Result<Self, String> {
        let name = unsafe { gl.create_texture() }?;
        trace!("created texture {:?}", name);
        Ok(Self { name })
    }

    pub fn name(&self) -> C::Texture {
        self.name
    }

    pub fn bind(&self, gl: &C, target: u32) {
        unsafe { gl.bind_texture(target, Some(self.name)) }
    }

    /// Nearest filtering and edge clamping, for textures that are never mipmapped or wrapped
    pub fn set_nearest_clamped(&self, gl: &C) {
        use crate::gl;

        self.bind(gl, gl::TEXTURE_2D);
        unsafe {
            gl.tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as i32);
            gl.tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as i32);
            gl.tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
            gl.bind_texture(gl::TEXTURE_2D, None);
        }
    }

    /// (Re)allocate uninitialized level 0 storage, leaving the texture unbound
    pub fn image_2d(
        &self,
        gl: &C,
        internal_format: u32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
    ) {
        use crate::gl;

        self.bind(gl, gl::TEXTURE_2D);
        unsafe {
            gl.tex_image_2d(
                gl::TEXTURE_2D,
                0,
                internal_format as i32,
                width,
                height,
                0,
                format,
                ty,
                None,
            );
            gl.bind_texture(gl::TEXTURE_2D, None);
        }
    }
}

impl<C: GlContext> std::fmt::Debug for Texture<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Texture").field(&self.name).finish()
    }
}

impl<C: GlContext> super::GlDrop<C> for Texture<C> {
    fn drop(&mut self, gl: &C) {
        trace!("deleting texture {:?}", self.name);
        unsafe { gl.delete_texture(self.name) }
    }
}
