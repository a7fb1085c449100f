use thiserror::Error;

use tinygl::gl;

/// Errors reported while creating or resizing a framebuffer object
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FboError {
    #[error("invalid framebuffer dimensions {width}x{height} (maximum is {max})")]
    InvalidDimensions { width: i32, height: i32, max: i32 },
    #[error("{requested} color attachments requested but at most {limit} are supported")]
    UnsupportedColorCount { requested: u32, limit: u32 },
    #[error("floating point textures are not supported by this context")]
    UnsupportedFloatFormat,
    #[error("framebuffer unsupported: the attachment formats are not a supported combination")]
    FramebufferUnsupported,
    #[error("framebuffer incomplete: incomplete attachment")]
    IncompleteAttachment,
    #[error("framebuffer incomplete: attachments do not have the same dimensions")]
    IncompleteDimensions,
    #[error("framebuffer incomplete: missing attachment")]
    MissingAttachment,
    #[error("framebuffer incomplete: unspecified status 0x{0:04X}")]
    UnspecifiedIncomplete(u32),
    #[error("the framebuffer object has been disposed")]
    Disposed,
    #[error("failed to create GL object: {0}")]
    Allocation(String),
}

impl FboError {
    /// Map a `check_framebuffer_status` result to an error, `None` meaning complete
    pub fn from_status(status: u32) -> Option<Self> {
        match status {
            gl::FRAMEBUFFER_COMPLETE => None,
            gl::FRAMEBUFFER_UNSUPPORTED => Some(Self::FramebufferUnsupported),
            gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => Some(Self::IncompleteAttachment),
            gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS => Some(Self::IncompleteDimensions),
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => Some(Self::MissingAttachment),
            other => Some(Self::UnspecifiedIncomplete(other)),
        }
    }

    /// True for failures reported by the context's completeness check
    pub fn is_completeness_failure(&self) -> bool {
        matches!(
            self,
            Self::FramebufferUnsupported
                | Self::IncompleteAttachment
                | Self::IncompleteDimensions
                | Self::MissingAttachment
                | Self::UnspecifiedIncomplete(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FboError>;
