//! Optional GPU features relevant to render targets

use log::debug;

use tinygl::gl;
use tinygl::GlContext;

const DEPTH_TEXTURE_EXTENSIONS: &[&str] = &[
    "WEBGL_depth_texture",
    "OES_depth_texture",
    "GL_ARB_depth_texture",
    "GL_OES_depth_texture",
];

const DRAW_BUFFERS_EXTENSIONS: &[&str] = &[
    "WEBGL_draw_buffers",
    "GL_ARB_draw_buffers",
    "GL_EXT_draw_buffers",
];

const FLOAT_COLOR_EXTENSIONS: &[&str] = &[
    "OES_texture_float",
    "GL_ARB_texture_float",
    "GL_OES_texture_float",
];

/// Desktop float extensions, whose textures need a sized internal format
const SIZED_FLOAT_EXTENSIONS: &[&str] = &["GL_ARB_texture_float"];

/// Half float extensions using the `HALF_FLOAT_OES` pixel type
const HALF_FLOAT_OES_EXTENSIONS: &[&str] = &["OES_texture_half_float", "GL_OES_texture_half_float"];

/// Half float extensions using the core `HALF_FLOAT` pixel type
const HALF_FLOAT_EXTENSIONS: &[&str] = &["GL_ARB_half_float_pixel"];

/// Features and limits of a GL context, queried once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Depth and depth-stencil textures can be attached to framebuffers
    pub has_depth_texture: bool,
    /// Several color attachments can be written in a single draw call
    pub has_draw_buffers: bool,
    pub has_float_color: bool,
    pub has_half_float_color: bool,
    /// 1 unless draw buffers are supported
    pub max_color_attachments: u32,
    pub max_renderbuffer_size: i32,
    /// Pixel type for half float textures, matching the detected extension
    pub half_float_type: u32,
    /// Internal format of float color textures: `RGBA32F` on desktop GL, unsized `RGBA` on
    /// WebGL 1 and GLES 2
    pub float_internal_format: u32,
    /// Internal format of half float color textures, `RGBA16F` or unsized `RGBA`
    pub half_float_internal_format: u32,
}

impl Capabilities {
    /// Query the context's extensions and limits
    ///
    /// Only read-only queries are issued. Features are detected from extension names alone, so a
    /// WebGL 2 or GL 3+ core context that provides draw buffers or depth textures without
    /// advertising the matching extension reports them as missing.
    pub fn query<C: GlContext>(gl: &C) -> Self {
        let extensions = gl.supported_extensions();
        let has_any = |names: &[&str]| names.iter().any(|name| extensions.contains(*name));

        let has_depth_texture = has_any(DEPTH_TEXTURE_EXTENSIONS);
        let has_draw_buffers = has_any(DRAW_BUFFERS_EXTENSIONS);
        let has_float_color = has_any(FLOAT_COLOR_EXTENSIONS);
        let half_float_oes = has_any(HALF_FLOAT_OES_EXTENSIONS);
        let has_half_float_color = half_float_oes || has_any(HALF_FLOAT_EXTENSIONS);
        let sized_float = has_any(SIZED_FLOAT_EXTENSIONS);

        let max_color_attachments = if has_draw_buffers {
            unsafe { gl.get_parameter_i32(gl::MAX_COLOR_ATTACHMENTS) }.max(1) as u32
        } else {
            1
        };
        let max_renderbuffer_size = unsafe { gl.get_parameter_i32(gl::MAX_RENDERBUFFER_SIZE) };

        let caps = Self {
            has_depth_texture,
            has_draw_buffers,
            has_float_color,
            has_half_float_color,
            max_color_attachments,
            max_renderbuffer_size,
            half_float_type: if half_float_oes {
                gl::HALF_FLOAT_OES
            } else {
                gl::HALF_FLOAT
            },
            float_internal_format: if sized_float { gl::RGBA32F } else { gl::RGBA },
            half_float_internal_format: if half_float_oes {
                gl::RGBA
            } else {
                gl::RGBA16F
            },
        };

        debug!("framebuffer capabilities: {:?}", caps);
        caps
    }

    /// True if a `width`x`height` target fits the context's limits
    pub fn accepts_dimensions(&self, width: i32, height: i32) -> bool {
        (0..=self.max_renderbuffer_size).contains(&width)
            && (0..=self.max_renderbuffer_size).contains(&height)
    }
}

/// Attachment points to declare as draw buffers for `count` color outputs
///
/// No color output declares `NONE`, otherwise the first `count` color attachment points are
/// listed, capped at `max`.
pub fn draw_buffer_list(count: u32, max: u32) -> Vec<u32> {
    if count == 0 {
        return vec![gl::NONE];
    }

    (0..count.min(max)).map(|i| gl::COLOR_ATTACHMENT0 + i).collect()
}
