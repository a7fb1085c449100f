use std::rc::Rc;

use cgmath::Vector2;
use log::{debug, trace, warn};

use tinygl::gl;
use tinygl::prelude::*;
use tinygl::wrappers::Framebuffer;

use crate::attachment::{allocate_renderbuffer, allocate_texture, Attachment};
use crate::capabilities::{draw_buffer_list, Capabilities};
use crate::error::{FboError, Result};
use crate::options::FboConfig;

/// GL objects owned by a live framebuffer object
struct Resources<C: GlContext> {
    framebuffer: GlHandle<C, Framebuffer<C>>,
    color: Vec<Attachment<C>>,
    /// Backing store when no readable color attachment was requested
    hidden_color: Option<Attachment<C>>,
    depth: Option<Attachment<C>>,
}

impl<C: GlContext> Resources<C> {
    fn attachments_mut(&mut self) -> impl Iterator<Item = &mut Attachment<C>> {
        self.color
            .iter_mut()
            .chain(self.hidden_color.iter_mut())
            .chain(self.depth.iter_mut())
    }

    /// Depth first, then color, then the framebuffer itself
    fn release(self) {
        let Self {
            framebuffer,
            color,
            hidden_color,
            depth,
        } = self;

        drop(depth);
        drop(hidden_color);
        drop(color);
        drop(framebuffer);
    }
}

/// Off-screen render target
///
/// Owns a GL framebuffer and every attachment allocated for it. The object stays complete for as
/// long as it is valid: a completeness failure during a resize disposes it, and so does
/// [`Fbo::dispose`] or dropping it.
pub struct Fbo<C: GlContext> {
    gl: Rc<C>,
    caps: Capabilities,
    config: FboConfig,
    current_size: Vector2<i32>,
    resources: Option<Resources<C>>,
}

impl<C: GlContext> Fbo<C> {
    /// Build and validate a framebuffer for an already resolved `config`
    ///
    /// `width` and `height` must be within the limits of `caps`. On failure every object
    /// allocated so far is released before the error is returned.
    pub(crate) fn new(
        gl: &Rc<C>,
        caps: Capabilities,
        config: FboConfig,
        width: i32,
        height: i32,
    ) -> Result<Self> {
        let size = cgmath::vec2(width, height);

        let framebuffer = GlHandle::new(
            gl,
            Framebuffer::new(gl.as_ref()).map_err(FboError::Allocation)?,
        );
        framebuffer.bind(gl, gl::FRAMEBUFFER);

        // Color outputs
        let color_type = config.color_format.pixel_type(&caps);
        let color_internal = config.color_format.internal_format(&caps);
        let mut color = Vec::with_capacity(config.color_count as usize);
        for i in 0..config.color_count {
            let point = gl::COLOR_ATTACHMENT0 + i;
            if let Some(attachment) = allocate_texture(
                gl,
                &framebuffer,
                size,
                color_internal,
                gl::RGBA,
                Some(color_type),
                point,
            )? {
                color.push(attachment);
            }
        }

        let hidden_color = if config.color_count == 0 {
            Some(allocate_renderbuffer(
                gl,
                &framebuffer,
                size,
                gl::RGBA4,
                gl::COLOR_ATTACHMENT0,
            )?)
        } else {
            None
        };

        if caps.has_draw_buffers && config.color_count != 1 {
            let buffers = draw_buffer_list(config.color_count, caps.max_color_attachments);
            unsafe { gl.draw_buffers(&buffers) };
        }

        let depth = allocate_depth_stencil(gl, &framebuffer, &caps, &config, size)?;

        let resources = Resources {
            framebuffer,
            color,
            hidden_color,
            depth,
        };

        let status = resources.framebuffer.status(gl, gl::FRAMEBUFFER);
        Framebuffer::unbind(gl.as_ref(), gl::FRAMEBUFFER);

        if let Some(error) = FboError::from_status(status) {
            warn!("framebuffer {}x{} rejected: {}", width, height, error);
            resources.release();
            return Err(error);
        }

        debug!(
            "created framebuffer {:?} ({}x{}, {:?})",
            resources.framebuffer.name(),
            width,
            height,
            config
        );

        Ok(Self {
            gl: gl.clone(),
            caps,
            config,
            current_size: size,
            resources: Some(resources),
        })
    }

    /// Make this framebuffer the render target and cover it with the viewport
    ///
    /// Does nothing once the object has been disposed.
    pub fn bind(&self) {
        if let Some(resources) = &self.resources {
            resources.framebuffer.bind(&self.gl, gl::FRAMEBUFFER);
            unsafe {
                self.gl
                    .viewport(0, 0, self.current_size.x, self.current_size.y)
            };
        }
    }

    /// Reallocate every attachment at `height`x`width`, keeping the same GL objects
    ///
    /// Requesting the current shape does nothing. Out of range dimensions are rejected without
    /// touching the object. If the resized framebuffer is not complete the object is disposed and
    /// the completeness error is returned.
    pub fn resize(&mut self, height: i32, width: i32) -> Result<()> {
        let resources = match self.resources.as_mut() {
            Some(resources) => resources,
            None => return Err(FboError::Disposed),
        };

        let new_size = cgmath::vec2(width, height);
        if new_size == self.current_size {
            return Ok(());
        }

        if !self.caps.accepts_dimensions(width, height) {
            return Err(FboError::InvalidDimensions {
                width,
                height,
                max: self.caps.max_renderbuffer_size,
            });
        }

        trace!(
            "resizing framebuffer {:?} to {}x{}",
            resources.framebuffer.name(),
            width,
            height
        );

        for attachment in resources.attachments_mut() {
            attachment.resize(&self.gl, new_size);
        }

        resources.framebuffer.bind(&self.gl, gl::FRAMEBUFFER);
        let status = resources.framebuffer.status(&self.gl, gl::FRAMEBUFFER);
        Framebuffer::unbind(self.gl.as_ref(), gl::FRAMEBUFFER);

        if let Some(error) = FboError::from_status(status) {
            warn!(
                "framebuffer incomplete after resize to {}x{}, disposing: {}",
                width, height, error
            );
            self.dispose();
            return Err(error);
        }

        self.current_size = new_size;
        Ok(())
    }

    /// Release the framebuffer and all of its attachments
    ///
    /// The object is marked invalid before anything is released. Calling this again does
    /// nothing.
    pub fn dispose(&mut self) {
        if let Some(resources) = self.resources.take() {
            trace!("disposing framebuffer {:?}", resources.framebuffer.name());
            resources.release();
        }
    }

    pub fn is_valid(&self) -> bool {
        self.resources.is_some()
    }

    /// Current `(height, width)`, or `(0, 0)` once disposed
    pub fn shape(&self) -> (i32, i32) {
        if self.is_valid() {
            (self.current_size.y, self.current_size.x)
        } else {
            (0, 0)
        }
    }

    /// Readable color attachments, in attachment point order
    pub fn color(&self) -> &[Attachment<C>] {
        match &self.resources {
            Some(resources) => &resources.color,
            None => &[],
        }
    }

    /// Texture of color attachment `index`, for sampling in a later pass
    pub fn color_texture(&self, index: usize) -> Option<C::Texture> {
        self.color().get(index).and_then(Attachment::texture)
    }

    /// Depth, stencil or depth-stencil attachment
    pub fn depth(&self) -> Option<&Attachment<C>> {
        self.resources.as_ref().and_then(|r| r.depth.as_ref())
    }

    pub fn name(&self) -> Option<C::Framebuffer> {
        self.resources.as_ref().map(|r| r.framebuffer.name())
    }

    pub fn config(&self) -> &FboConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }
}

impl<C: GlContext> Drop for Fbo<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<C: GlContext> std::fmt::Debug for Fbo<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fbo")
            .field("name", &self.name())
            .field("shape", &self.shape())
            .field("config", &self.config)
            .field("color", &self.color())
            .field("depth", &self.depth())
            .finish()
    }
}

/// Pick the backing store for the requested depth and stencil combination
///
/// Textures are used when the context can attach depth textures. Otherwise, and always for
/// stencil only, a renderbuffer of the closest native format is used.
fn allocate_depth_stencil<C: GlContext>(
    gl: &Rc<C>,
    framebuffer: &Framebuffer<C>,
    caps: &Capabilities,
    config: &FboConfig,
    size: Vector2<i32>,
) -> Result<Option<Attachment<C>>> {
    let (format, texture_type, storage, point) = match (config.use_depth, config.use_stencil) {
        (true, true) => (
            gl::DEPTH_STENCIL,
            gl::UNSIGNED_INT_24_8,
            gl::DEPTH_STENCIL,
            gl::DEPTH_STENCIL_ATTACHMENT,
        ),
        (true, false) => (
            gl::DEPTH_COMPONENT,
            gl::UNSIGNED_SHORT,
            gl::DEPTH_COMPONENT16,
            gl::DEPTH_ATTACHMENT,
        ),
        (false, true) => {
            return allocate_renderbuffer(
                gl,
                framebuffer,
                size,
                gl::STENCIL_INDEX8,
                gl::STENCIL_ATTACHMENT,
            )
            .map(Some);
        }
        (false, false) => return Ok(None),
    };

    let texture_type = if caps.has_depth_texture {
        Some(texture_type)
    } else {
        None
    };

    match allocate_texture(gl, framebuffer, size, format, format, texture_type, point)? {
        Some(attachment) => Ok(Some(attachment)),
        None => {
            debug!("depth textures unsupported, using a renderbuffer");
            allocate_renderbuffer(gl, framebuffer, size, storage, point).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ColorFormat, FboOptions};
    use tinygl::mock::{MockContext, MockObject};

    fn build(
        gl: &Rc<MockContext>,
        options: FboOptions,
        width: i32,
        height: i32,
    ) -> Result<Fbo<MockContext>> {
        let caps = Capabilities::query(gl.as_ref());
        let config = options.resolve(&caps)?;
        Fbo::new(gl, caps, config, width, height)
    }

    #[test]
    fn default_layout() {
        let gl = Rc::new(MockContext::new());
        let fbo = build(&gl, FboOptions::default(), 64, 32).unwrap();
        let name = fbo.name().unwrap();

        assert!(fbo.is_valid());
        assert_eq!(fbo.shape(), (32, 64));
        assert_eq!(fbo.color().len(), 1);
        assert_eq!(
            gl.attachment_points(name),
            vec![gl::COLOR_ATTACHMENT0, gl::DEPTH_ATTACHMENT]
        );
        assert!(fbo.depth().unwrap().is_texture());
        assert_eq!(gl.completeness_of(name), gl::FRAMEBUFFER_COMPLETE);
        // A single output needs no draw buffer declaration
        assert_eq!(gl.draw_buffers_of(name), None);
        assert_eq!(gl.bound_framebuffer(), None);
    }

    #[test]
    fn multiple_color_outputs() {
        let gl = Rc::new(MockContext::new());
        let options = FboOptions {
            color: 3,
            float: true,
            depth: false,
            ..Default::default()
        };
        let fbo = build(&gl, options, 16, 16).unwrap();
        let name = fbo.name().unwrap();

        assert_eq!(fbo.config().color_format, ColorFormat::Float);
        assert_eq!(fbo.color().len(), 3);
        assert!(fbo.depth().is_none());
        assert_eq!(
            gl.draw_buffers_of(name),
            Some(vec![
                gl::COLOR_ATTACHMENT0,
                gl::COLOR_ATTACHMENT1,
                gl::COLOR_ATTACHMENT2
            ])
        );

        for (i, attachment) in fbo.color().iter().enumerate() {
            assert_eq!(attachment.point(), gl::COLOR_ATTACHMENT0 + i as u32);
            let image = gl.texture_image(attachment.texture().unwrap()).unwrap();
            assert_eq!(image.ty, gl::FLOAT);
        }
    }

    #[test]
    fn desktop_float_storage_is_sized() {
        let gl = Rc::new(MockContext::with_extensions(&["GL_ARB_texture_float"]));
        let options = FboOptions {
            float: true,
            ..Default::default()
        };
        let mut fbo = build(&gl, options, 16, 16).unwrap();
        let texture = fbo.color_texture(0).unwrap();

        let image = gl.texture_image(texture).unwrap();
        assert_eq!(image.internal_format, gl::RGBA32F as i32);
        assert_eq!((image.format, image.ty), (gl::RGBA, gl::FLOAT));

        fbo.resize(32, 8).unwrap();
        let image = gl.texture_image(texture).unwrap();
        assert_eq!(image.internal_format, gl::RGBA32F as i32);
    }

    #[test]
    fn webgl_float_storage_is_unsized() {
        let gl = Rc::new(MockContext::with_extensions(&["OES_texture_half_float"]));
        let options = FboOptions {
            half_float: true,
            ..Default::default()
        };
        let fbo = build(&gl, options, 16, 16).unwrap();

        let image = gl.texture_image(fbo.color_texture(0).unwrap()).unwrap();
        assert_eq!(image.internal_format, gl::RGBA as i32);
        assert_eq!(image.ty, gl::HALF_FLOAT_OES);
    }

    #[test]
    fn no_color_uses_hidden_renderbuffer() {
        let gl = Rc::new(MockContext::new());
        let options = FboOptions {
            color: 0,
            ..Default::default()
        };
        let fbo = build(&gl, options, 16, 16).unwrap();
        let name = fbo.name().unwrap();

        assert!(fbo.color().is_empty());
        assert_eq!(fbo.color_texture(0), None);
        assert!(matches!(
            gl.attachment(name, gl::COLOR_ATTACHMENT0),
            Some(MockObject::Renderbuffer(_))
        ));
        assert_eq!(gl.draw_buffers_of(name), Some(vec![gl::NONE]));
    }

    #[test]
    fn depth_falls_back_to_renderbuffer() {
        let gl = Rc::new(MockContext::with_extensions(&[]));
        let fbo = build(&gl, FboOptions::default(), 16, 16).unwrap();
        let depth = fbo.depth().unwrap();

        assert!(!depth.is_texture());
        assert_eq!(depth.format(), gl::DEPTH_COMPONENT16);
        assert_eq!(depth.point(), gl::DEPTH_ATTACHMENT);
    }

    #[test]
    fn depth_stencil_combinations() {
        let cases = [
            (true, true, true, gl::DEPTH_STENCIL_ATTACHMENT, true),
            (false, true, true, gl::DEPTH_STENCIL_ATTACHMENT, false),
            (true, false, true, gl::STENCIL_ATTACHMENT, false),
            (false, false, true, gl::STENCIL_ATTACHMENT, false),
        ];

        for &(depth_texture, depth, stencil, point, is_texture) in cases.iter() {
            let gl = Rc::new(if depth_texture {
                MockContext::new()
            } else {
                MockContext::with_extensions(&[])
            });
            let options = FboOptions {
                depth,
                stencil,
                ..Default::default()
            };

            let fbo = build(&gl, options, 8, 8).unwrap();
            let attachment = fbo.depth().unwrap();
            assert_eq!(attachment.point(), point);
            assert_eq!(attachment.is_texture(), is_texture);
        }

        let gl = Rc::new(MockContext::new());
        let options = FboOptions {
            depth: false,
            ..Default::default()
        };
        assert!(build(&gl, options, 8, 8).unwrap().depth().is_none());
    }

    #[test]
    fn completeness_failure_releases_everything() {
        let statuses = [
            (gl::FRAMEBUFFER_UNSUPPORTED, FboError::FramebufferUnsupported),
            (gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT, FboError::IncompleteAttachment),
            (gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS, FboError::IncompleteDimensions),
            (gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT, FboError::MissingAttachment),
            (
                gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE,
                FboError::UnspecifiedIncomplete(gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE),
            ),
        ];

        for (status, expected) in statuses.iter() {
            let gl = Rc::new(MockContext::new());
            gl.force_status(Some(*status));
            let options = FboOptions {
                color: 2,
                stencil: true,
                ..Default::default()
            };

            assert_eq!(build(&gl, options, 32, 32).unwrap_err(), *expected);
            assert_eq!(gl.live_handles(), 0);
            assert_eq!(gl.bound_framebuffer(), None);
        }
    }

    #[test]
    fn allocation_failure_releases_everything() {
        // Framebuffer, two color textures, then the depth texture fails
        for budget in 0..4 {
            let gl = Rc::new(MockContext::new());
            gl.limit_creations(Some(budget));
            let options = FboOptions {
                color: 2,
                ..Default::default()
            };

            let result = build(&gl, options, 32, 32);
            assert!(matches!(result, Err(FboError::Allocation(_))));
            assert_eq!(gl.live_handles(), 0);
        }
    }

    #[test]
    fn bind_sets_viewport() {
        let gl = Rc::new(MockContext::new());
        let fbo = build(&gl, FboOptions::default(), 640, 480).unwrap();

        fbo.bind();
        assert_eq!(gl.bound_framebuffer(), fbo.name());
        assert_eq!(gl.viewport(), (0, 0, 640, 480));
    }

    #[test]
    fn resize_keeps_objects() {
        let gl = Rc::new(MockContext::new());
        let options = FboOptions {
            color: 2,
            ..Default::default()
        };
        let mut fbo = build(&gl, options, 256, 256).unwrap();
        let textures: Vec<_> = fbo.color().iter().map(|a| a.texture().unwrap()).collect();
        let handles = gl.live_handles();

        fbo.resize(128, 512).unwrap();

        assert_eq!(fbo.shape(), (128, 512));
        assert_eq!(gl.live_handles(), handles);
        for (attachment, name) in fbo.color().iter().zip(textures.iter()) {
            assert_eq!(attachment.texture(), Some(*name));
            let image = gl.texture_image(*name).unwrap();
            assert_eq!((image.width, image.height), (512, 128));
        }
        let depth = fbo.depth().unwrap().texture().unwrap();
        let image = gl.texture_image(depth).unwrap();
        assert_eq!((image.width, image.height), (512, 128));
        assert_eq!(gl.completeness_of(fbo.name().unwrap()), gl::FRAMEBUFFER_COMPLETE);
    }

    #[test]
    fn resize_hidden_color_renderbuffer() {
        let gl = Rc::new(MockContext::with_extensions(&[]));
        let options = FboOptions {
            color: 0,
            stencil: true,
            ..Default::default()
        };
        let mut fbo = build(&gl, options, 16, 16).unwrap();
        let name = fbo.name().unwrap();

        fbo.resize(20, 10).unwrap();

        for point in gl.attachment_points(name) {
            let storage = match gl.attachment(name, point) {
                Some(MockObject::Renderbuffer(rb)) => gl.renderbuffer_storage_of(rb).unwrap(),
                other => panic!("unexpected attachment {:?}", other),
            };
            assert_eq!((storage.width, storage.height), (10, 20));
        }
    }

    #[test]
    fn resize_to_same_shape_is_free() {
        let gl = Rc::new(MockContext::new());
        let mut fbo = build(&gl, FboOptions::default(), 64, 64).unwrap();
        let calls = gl.call_count();

        fbo.resize(64, 64).unwrap();
        assert_eq!(gl.call_count(), calls);
    }

    #[test]
    fn resize_rejects_bad_dimensions() {
        let gl = Rc::new(MockContext::new());
        let mut fbo = build(&gl, FboOptions::default(), 64, 64).unwrap();
        let calls = gl.call_count();

        assert!(matches!(
            fbo.resize(-1, 64),
            Err(FboError::InvalidDimensions { .. })
        ));
        assert_eq!(
            fbo.resize(64, 4097),
            Err(FboError::InvalidDimensions {
                width: 4097,
                height: 64,
                max: 4096
            })
        );
        assert_eq!(gl.call_count(), calls);
        assert!(fbo.is_valid());
        assert_eq!(fbo.shape(), (64, 64));
    }

    #[test]
    fn failed_resize_disposes() {
        let gl = Rc::new(MockContext::new());
        let mut fbo = build(&gl, FboOptions::default(), 64, 64).unwrap();

        gl.force_status(Some(gl::FRAMEBUFFER_UNSUPPORTED));
        assert_eq!(fbo.resize(32, 32), Err(FboError::FramebufferUnsupported));

        assert!(!fbo.is_valid());
        assert_eq!(fbo.shape(), (0, 0));
        assert_eq!(gl.live_handles(), 0);
        assert_eq!(fbo.resize(16, 16), Err(FboError::Disposed));
    }

    #[test]
    fn dispose_is_idempotent() {
        let gl = Rc::new(MockContext::new());
        let mut fbo = build(&gl, FboOptions::default(), 64, 64).unwrap();

        fbo.dispose();
        let calls = gl.call_count();
        assert!(!fbo.is_valid());
        assert_eq!(gl.live_handles(), 0);

        fbo.dispose();
        assert_eq!(gl.call_count(), calls);
        assert!(!fbo.is_valid());
        assert_eq!(fbo.shape(), (0, 0));
        assert!(fbo.color().is_empty());
        assert!(fbo.depth().is_none());
        assert_eq!(fbo.name(), None);
    }

    #[test]
    fn drop_releases_everything() {
        let gl = Rc::new(MockContext::new());
        let options = FboOptions {
            color: 4,
            stencil: true,
            ..Default::default()
        };
        let fbo = build(&gl, options, 64, 64).unwrap();
        assert_eq!(gl.live_handles(), 6);

        drop(fbo);
        assert_eq!(gl.live_handles(), 0);
    }
}
