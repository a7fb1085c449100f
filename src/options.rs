use log::info;

use tinygl::gl;

use crate::capabilities::Capabilities;
use crate::error::{FboError, Result};

/// Requested framebuffer layout
///
/// Fields left at their defaults give one byte color attachment and a depth attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FboOptions {
    /// Number of color attachments; 0 keeps a hidden color renderbuffer
    pub color: u32,
    /// Require float color storage
    pub float: bool,
    /// Use float color storage when available
    pub prefer_float: bool,
    /// Require half float color storage
    pub half_float: bool,
    pub depth: bool,
    pub stencil: bool,
}

impl Default for FboOptions {
    fn default() -> Self {
        Self {
            color: 1,
            float: false,
            prefer_float: false,
            half_float: false,
            depth: true,
            stencil: false,
        }
    }
}

/// Storage of color attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Byte,
    HalfFloat,
    Float,
}

impl ColorFormat {
    /// Pixel type passed to `tex_image_2d`
    pub fn pixel_type(self, caps: &Capabilities) -> u32 {
        match self {
            Self::Byte => gl::UNSIGNED_BYTE,
            Self::HalfFloat => caps.half_float_type,
            Self::Float => gl::FLOAT,
        }
    }

    /// Internal format passed to `tex_image_2d`
    pub fn internal_format(self, caps: &Capabilities) -> u32 {
        match self {
            Self::Byte => gl::RGBA,
            Self::HalfFloat => caps.half_float_internal_format,
            Self::Float => caps.float_internal_format,
        }
    }
}

/// Framebuffer layout validated against a context's capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FboConfig {
    pub color_count: u32,
    pub color_format: ColorFormat,
    pub use_depth: bool,
    pub use_stencil: bool,
}

impl FboOptions {
    /// Check these options against `caps` and pick the color storage
    pub fn resolve(&self, caps: &Capabilities) -> Result<FboConfig> {
        if self.color > 1 && !caps.has_draw_buffers {
            return Err(FboError::UnsupportedColorCount {
                requested: self.color,
                limit: 1,
            });
        }

        if self.color > caps.max_color_attachments {
            return Err(FboError::UnsupportedColorCount {
                requested: self.color,
                limit: caps.max_color_attachments,
            });
        }

        Ok(FboConfig {
            color_count: self.color,
            color_format: self.resolve_color_format(caps)?,
            use_depth: self.depth,
            use_stencil: self.stencil,
        })
    }

    fn resolve_color_format(&self, caps: &Capabilities) -> Result<ColorFormat> {
        if self.float {
            return if caps.has_float_color {
                Ok(ColorFormat::Float)
            } else {
                Err(FboError::UnsupportedFloatFormat)
            };
        }

        if self.half_float {
            return if caps.has_half_float_color {
                Ok(ColorFormat::HalfFloat)
            } else {
                Err(FboError::UnsupportedFloatFormat)
            };
        }

        if self.prefer_float {
            if caps.has_float_color {
                return Ok(ColorFormat::Float);
            }

            if caps.has_half_float_color {
                info!("float color storage unavailable, using half float");
                return Ok(ColorFormat::HalfFloat);
            }

            info!("float color storage unavailable, using bytes");
        }

        Ok(ColorFormat::Byte)
    }
}
