//! Cache error types.

use thiserror::Error;

use crate::backend::BackendError;
use crate::resources::DecodeError;

/// Errors returned by [`TextureCache`](super::TextureCache) operations.
#[derive(Error, Debug)]
pub enum TextureCacheError {
    /// `release` was called for a path without a live record.
    #[error("Texture not found: {path}")]
    NotFound { path: String },
    /// The decoder produced a channel count that maps to no pixel format.
    #[error("Unsupported channel count {channels} in {path}, expected 1, 3 or 4")]
    UnsupportedChannelCount { path: String, channels: u32 },
    /// `acquire` of a path already held `u32::MAX` times.
    #[error("Reference count overflow for {path}")]
    ReferenceCountOverflow { path: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Device(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, TextureCacheError>;
