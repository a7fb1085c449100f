//! Storage bound to a single framebuffer attachment point

use std::rc::Rc;

use cgmath::Vector2;
use log::trace;

use tinygl::gl;
use tinygl::wrappers::{Framebuffer, GlHandle, Renderbuffer, Texture};
use tinygl::GlContext;

use crate::error::{FboError, Result};

enum Storage<C: GlContext> {
    Texture {
        texture: GlHandle<C, Texture<C>>,
        internal_format: u32,
        format: u32,
        ty: u32,
    },
    Renderbuffer {
        renderbuffer: GlHandle<C, Renderbuffer<C>>,
        format: u32,
    },
}

/// A texture or renderbuffer owned by a framebuffer object
///
/// Dropping the attachment releases its GL object.
pub struct Attachment<C: GlContext> {
    point: u32,
    size: Vector2<i32>,
    storage: Storage<C>,
}

/// Allocate a `size` texture and attach it to `point` of `framebuffer`, which must be bound
///
/// `internal_format` is the storage format, `format` and `ty` describe the (absent) pixel data.
/// A missing pixel type means the attachment is not wanted: nothing is allocated and `None` is
/// returned.
pub fn allocate_texture<C: GlContext>(
    gl: &Rc<C>,
    framebuffer: &Framebuffer<C>,
    size: Vector2<i32>,
    internal_format: u32,
    format: u32,
    ty: Option<u32>,
    point: u32,
) -> Result<Option<Attachment<C>>> {
    let ty = match ty {
        Some(ty) => ty,
        None => return Ok(None),
    };

    let texture = GlHandle::new(gl, Texture::new(gl.as_ref()).map_err(FboError::Allocation)?);
    texture.set_nearest_clamped(gl);
    texture.image_2d(gl, internal_format, size.x, size.y, format, ty);
    framebuffer.texture(gl, gl::FRAMEBUFFER, point, Some(&*texture), 0);

    trace!("attached {:?} at 0x{:04X}", *texture, point);

    Ok(Some(Attachment {
        point,
        size,
        storage: Storage::Texture {
            texture,
            internal_format,
            format,
            ty,
        },
    }))
}

/// Allocate `size` renderbuffer storage and attach it to `point` of `framebuffer`, which must be
/// bound
pub fn allocate_renderbuffer<C: GlContext>(
    gl: &Rc<C>,
    framebuffer: &Framebuffer<C>,
    size: Vector2<i32>,
    format: u32,
    point: u32,
) -> Result<Attachment<C>> {
    let renderbuffer = GlHandle::new(
        gl,
        Renderbuffer::new(gl.as_ref()).map_err(FboError::Allocation)?,
    );
    renderbuffer.storage(gl, format, size.x, size.y);
    framebuffer.renderbuffer(gl, gl::FRAMEBUFFER, point, Some(&*renderbuffer));

    trace!("attached {:?} at 0x{:04X}", *renderbuffer, point);

    Ok(Attachment {
        point,
        size,
        storage: Storage::Renderbuffer {
            renderbuffer,
            format,
        },
    })
}

impl<C: GlContext> Attachment<C> {
    /// Reallocate the storage at `size`, keeping the same GL object
    pub(crate) fn resize(&mut self, gl: &C, size: Vector2<i32>) {
        match &self.storage {
            Storage::Texture {
                texture,
                internal_format,
                format,
                ty,
            } => texture.image_2d(gl, *internal_format, size.x, size.y, *format, *ty),
            Storage::Renderbuffer {
                renderbuffer,
                format,
            } => renderbuffer.storage(gl, *format, size.x, size.y),
        }

        self.size = size;
    }

    /// Attachment point on the owning framebuffer
    pub fn point(&self) -> u32 {
        self.point
    }

    /// Storage size, `x` being the width
    pub fn size(&self) -> Vector2<i32> {
        self.size
    }

    pub fn is_texture(&self) -> bool {
        matches!(self.storage, Storage::Texture { .. })
    }

    /// Texture name for sampling, if this attachment is a texture
    pub fn texture(&self) -> Option<C::Texture> {
        match &self.storage {
            Storage::Texture { texture, .. } => Some(texture.name()),
            Storage::Renderbuffer { .. } => None,
        }
    }

    pub fn renderbuffer(&self) -> Option<C::Renderbuffer> {
        match &self.storage {
            Storage::Renderbuffer { renderbuffer, .. } => Some(renderbuffer.name()),
            Storage::Texture { .. } => None,
        }
    }

    /// Storage format of the texture or renderbuffer
    pub fn internal_format(&self) -> u32 {
        match &self.storage {
            Storage::Texture {
                internal_format, ..
            } => *internal_format,
            Storage::Renderbuffer { format, .. } => *format,
        }
    }

    /// Texture format or renderbuffer storage format
    pub fn format(&self) -> u32 {
        match &self.storage {
            Storage::Texture { format, .. } => *format,
            Storage::Renderbuffer { format, .. } => *format,
        }
    }
}

impl<C: GlContext> std::fmt::Debug for Attachment<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Attachment");
        s.field("point", &self.point).field("size", &self.size);
        match &self.storage {
            Storage::Texture { texture, .. } => s.field("texture", &texture.name()),
            Storage::Renderbuffer { renderbuffer, .. } => {
                s.field("renderbuffer", &renderbuffer.name())
            }
        };
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinygl::mock::{MockContext, MockObject};

    fn bound_framebuffer(gl: &Rc<MockContext>) -> GlHandle<MockContext, Framebuffer<MockContext>> {
        let fb = GlHandle::new(gl, Framebuffer::new(gl.as_ref()).unwrap());
        fb.bind(gl, gl::FRAMEBUFFER);
        fb
    }

    #[test]
    fn texture_attachment() {
        let gl = Rc::new(MockContext::new());
        let fb = bound_framebuffer(&gl);

        let attachment = allocate_texture(
            &gl,
            &fb,
            cgmath::vec2(64, 32),
            gl::RGBA,
            gl::RGBA,
            Some(gl::UNSIGNED_BYTE),
            gl::COLOR_ATTACHMENT0,
        )
        .unwrap()
        .unwrap();

        let name = attachment.texture().unwrap();
        assert!(attachment.is_texture());
        assert_eq!(attachment.renderbuffer(), None);
        assert_eq!(
            gl.attachment(fb.name(), gl::COLOR_ATTACHMENT0),
            Some(MockObject::Texture(name))
        );

        let image = gl.texture_image(name).unwrap();
        assert_eq!((image.width, image.height), (64, 32));
        assert_eq!(image.ty, gl::UNSIGNED_BYTE);
        assert_eq!(
            gl.texture_parameter(name, gl::TEXTURE_MIN_FILTER),
            Some(gl::NEAREST as i32)
        );
        assert_eq!(
            gl.texture_parameter(name, gl::TEXTURE_WRAP_T),
            Some(gl::CLAMP_TO_EDGE as i32)
        );
        assert_eq!(gl.bound_texture(), None);
    }

    #[test]
    fn absent_type_skips_allocation() {
        let gl = Rc::new(MockContext::new());
        let fb = bound_framebuffer(&gl);
        let allocations = gl.allocation_count();

        let attachment = allocate_texture(
            &gl,
            &fb,
            cgmath::vec2(64, 64),
            gl::DEPTH_COMPONENT,
            gl::DEPTH_COMPONENT,
            None,
            gl::DEPTH_ATTACHMENT,
        )
        .unwrap();

        assert!(attachment.is_none());
        assert_eq!(gl.allocation_count(), allocations);
        assert_eq!(gl.live_textures(), 0);
    }

    #[test]
    fn renderbuffer_attachment_resizes_in_place() {
        let gl = Rc::new(MockContext::new());
        let fb = bound_framebuffer(&gl);

        let mut attachment = allocate_renderbuffer(
            &gl,
            &fb,
            cgmath::vec2(16, 16),
            gl::DEPTH_COMPONENT16,
            gl::DEPTH_ATTACHMENT,
        )
        .unwrap();
        let name = attachment.renderbuffer().unwrap();

        attachment.resize(gl.as_ref(), cgmath::vec2(32, 8));

        assert_eq!(attachment.renderbuffer(), Some(name));
        assert_eq!(attachment.size(), cgmath::vec2(32, 8));
        let storage = gl.renderbuffer_storage_of(name).unwrap();
        assert_eq!(
            (storage.internal_format, storage.width, storage.height),
            (gl::DEPTH_COMPONENT16, 32, 8)
        );
        assert_eq!(gl.live_renderbuffers(), 1);
    }

    #[test]
    fn failed_creation_allocates_nothing() {
        let gl = Rc::new(MockContext::new());
        let fb = bound_framebuffer(&gl);
        gl.limit_creations(Some(0));

        let result = allocate_renderbuffer(
            &gl,
            &fb,
            cgmath::vec2(16, 16),
            gl::RGBA4,
            gl::COLOR_ATTACHMENT0,
        );

        assert!(matches!(result, Err(FboError::Allocation(_))));
        assert_eq!(gl.live_renderbuffers(), 0);
    }

    #[test]
    fn drop_releases() {
        let gl = Rc::new(MockContext::new());
        let fb = bound_framebuffer(&gl);

        let attachment = allocate_texture(
            &gl,
            &fb,
            cgmath::vec2(8, 8),
            gl::RGBA32F,
            gl::RGBA,
            Some(gl::FLOAT),
            gl::COLOR_ATTACHMENT1,
        )
        .unwrap();
        assert_eq!(gl.live_textures(), 1);

        drop(attachment);
        assert_eq!(gl.live_textures(), 0);
    }

    #[test]
    fn sized_texture_keeps_internal_format_on_resize() {
        let gl = Rc::new(MockContext::new());
        let fb = bound_framebuffer(&gl);

        let mut attachment = allocate_texture(
            &gl,
            &fb,
            cgmath::vec2(8, 8),
            gl::RGBA16F,
            gl::RGBA,
            Some(gl::HALF_FLOAT),
            gl::COLOR_ATTACHMENT0,
        )
        .unwrap()
        .unwrap();
        attachment.resize(gl.as_ref(), cgmath::vec2(24, 12));

        let image = gl.texture_image(attachment.texture().unwrap()).unwrap();
        assert_eq!(image.internal_format, gl::RGBA16F as i32);
        assert_eq!((image.format, image.ty), (gl::RGBA, gl::HALF_FLOAT));
        assert_eq!((image.width, image.height), (24, 12));
        assert_eq!(attachment.internal_format(), gl::RGBA16F);
        assert_eq!(attachment.format(), gl::RGBA);
    }
}
