mod context;
pub use context::*;

pub mod gl;
pub mod wrappers;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use glow;

pub mod prelude {
    pub use super::context::GlContext;
    pub use super::wrappers::{GlDrop, GlHandle};
}
