//! Device abstraction trait
//!
//! The cache never talks to a graphics API directly. Every device it drives
//! implements [`TextureDevice`], which is injected at construction.

use crate::backend::types::*;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Unknown texture handle {0:?}")]
    UnknownHandle(TextureHandle),
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU texture
///
/// Only meaningful to the device that allocated it, and only while that
/// device's context is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub(crate) u64);

impl TextureHandle {
    /// Raw id as assigned by the device.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Device operations the texture cache relies on.
pub trait TextureDevice {
    /// Allocate a new, empty texture handle.
    fn allocate_texture(&mut self, label: Option<&str>) -> BackendResult<TextureHandle>;

    /// Upload a 2D image into the texture behind `handle`.
    ///
    /// `data` holds `width * height * format.bytes_per_pixel()` tightly packed bytes.
    fn upload_texture_2d(
        &mut self,
        handle: TextureHandle,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> BackendResult<()>;

    /// Configure how the texture is sampled.
    fn set_sampling(&mut self, handle: TextureHandle, policy: &SamplingPolicy) -> BackendResult<()>;

    /// Free the texture. Must accept any handle this device allocated.
    fn free_texture(&mut self, handle: TextureHandle);
}

impl<T: TextureDevice + ?Sized> TextureDevice for &mut T {
    fn allocate_texture(&mut self, label: Option<&str>) -> BackendResult<TextureHandle> {
        (**self).allocate_texture(label)
    }

    fn upload_texture_2d(
        &mut self,
        handle: TextureHandle,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> BackendResult<()> {
        (**self).upload_texture_2d(handle, format, width, height, data)
    }

    fn set_sampling(&mut self, handle: TextureHandle, policy: &SamplingPolicy) -> BackendResult<()> {
        (**self).set_sampling(handle, policy)
    }

    fn free_texture(&mut self, handle: TextureHandle) {
        (**self).free_texture(handle)
    }
}
