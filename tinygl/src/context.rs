use std::collections::HashSet;
use std::fmt::Debug;

pub use glow::HasContext;

/// OpenGL function context
///
/// The subset of GL entry points needed to manage render targets. Methods follow
/// [`glow::HasContext`]: they are unsafe, operate on the context-wide bind state, and object
/// creation reports driver failures as a `String`.
pub trait GlContext {
    type Framebuffer: Copy + Debug + PartialEq;
    type Renderbuffer: Copy + Debug + PartialEq;
    type Texture: Copy + Debug + PartialEq;

    fn supported_extensions(&self) -> &HashSet<String>;
    unsafe fn get_parameter_i32(&self, parameter: u32) -> i32;

    unsafe fn create_framebuffer(&self) -> Result<Self::Framebuffer, String>;
    unsafe fn delete_framebuffer(&self, framebuffer: Self::Framebuffer);
    unsafe fn bind_framebuffer(&self, target: u32, framebuffer: Option<Self::Framebuffer>);
    unsafe fn check_framebuffer_status(&self, target: u32) -> u32;
    unsafe fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<Self::Texture>,
        level: i32,
    );
    unsafe fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Option<Self::Renderbuffer>,
    );
    unsafe fn draw_buffers(&self, buffers: &[u32]);

    unsafe fn create_renderbuffer(&self) -> Result<Self::Renderbuffer, String>;
    unsafe fn delete_renderbuffer(&self, renderbuffer: Self::Renderbuffer);
    unsafe fn bind_renderbuffer(&self, target: u32, renderbuffer: Option<Self::Renderbuffer>);
    unsafe fn renderbuffer_storage(
        &self,
        target: u32,
        internal_format: u32,
        width: i32,
        height: i32,
    );

    unsafe fn create_texture(&self) -> Result<Self::Texture, String>;
    unsafe fn delete_texture(&self, texture: Self::Texture);
    unsafe fn bind_texture(&self, target: u32, texture: Option<Self::Texture>);
    unsafe fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    #[allow(clippy::too_many_arguments)]
    unsafe fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    );

    unsafe fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
}

impl GlContext for glow::Context {
    type Framebuffer = <glow::Context as HasContext>::Framebuffer;
    type Renderbuffer = <glow::Context as HasContext>::Renderbuffer;
    type Texture = <glow::Context as HasContext>::Texture;

    fn supported_extensions(&self) -> &HashSet<String> {
        HasContext::supported_extensions(self)
    }

    unsafe fn get_parameter_i32(&self, parameter: u32) -> i32 {
        HasContext::get_parameter_i32(self, parameter)
    }

    unsafe fn create_framebuffer(&self) -> Result<Self::Framebuffer, String> {
        HasContext::create_framebuffer(self)
    }

    unsafe fn delete_framebuffer(&self, framebuffer: Self::Framebuffer) {
        HasContext::delete_framebuffer(self, framebuffer)
    }

    unsafe fn bind_framebuffer(&self, target: u32, framebuffer: Option<Self::Framebuffer>) {
        HasContext::bind_framebuffer(self, target, framebuffer)
    }

    unsafe fn check_framebuffer_status(&self, target: u32) -> u32 {
        HasContext::check_framebuffer_status(self, target)
    }

    unsafe fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<Self::Texture>,
        level: i32,
    ) {
        HasContext::framebuffer_texture_2d(
            self,
            target,
            attachment,
            texture_target,
            texture,
            level,
        )
    }

    unsafe fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Option<Self::Renderbuffer>,
    ) {
        HasContext::framebuffer_renderbuffer(
            self,
            target,
            attachment,
            renderbuffer_target,
            renderbuffer,
        )
    }

    unsafe fn draw_buffers(&self, buffers: &[u32]) {
        HasContext::draw_buffers(self, buffers)
    }

    unsafe fn create_renderbuffer(&self) -> Result<Self::Renderbuffer, String> {
        HasContext::create_renderbuffer(self)
    }

    unsafe fn delete_renderbuffer(&self, renderbuffer: Self::Renderbuffer) {
        HasContext::delete_renderbuffer(self, renderbuffer)
    }

    unsafe fn bind_renderbuffer(&self, target: u32, renderbuffer: Option<Self::Renderbuffer>) {
        HasContext::bind_renderbuffer(self, target, renderbuffer)
    }

    unsafe fn renderbuffer_storage(
        &self,
        target: u32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        HasContext::renderbuffer_storage(self, target, internal_format, width, height)
    }

    unsafe fn create_texture(&self) -> Result<Self::Texture, String> {
        HasContext::create_texture(self)
    }

    unsafe fn delete_texture(&self, texture: Self::Texture) {
        HasContext::delete_texture(self, texture)
    }

    unsafe fn bind_texture(&self, target: u32, texture: Option<Self::Texture>) {
        HasContext::bind_texture(self, target, texture)
    }

    unsafe fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        HasContext::tex_parameter_i32(self, target, parameter, value)
    }

    unsafe fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    ) {
        HasContext::tex_image_2d(
            self,
            target,
            level,
            internal_format,
            width,
            height,
            border,
            format,
            ty,
            pixels,
        )
    }

    unsafe fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        HasContext::viewport(self, x, y, width, height)
    }
}
