//! Texture Cache - deduplicated GPU texture uploads
//!
//! Hands out one GPU texture per distinct image path, no matter how many
//! owners ask for it. Textures are reference counted and freed on the
//! device when the last owner releases them.
//!
//! # Features
//! - [`TextureCache`] with acquire / release / teardown
//! - Device abstraction via [`TextureDevice`] with a wgpu implementation
//!   and a recording [`DummyDevice`] for tests
//! - Image decoding through the `image` crate, pluggable via [`ImageDecoder`]
//! - [`SharedTextureCache`] for callers on several threads

pub mod backend;
pub mod cache;
pub mod resources;

pub use backend::{
    AddressMode, BackendError, DeviceCall, DummyDevice, FilterMode, SamplingPolicy, TextureDevice,
    TextureFormat, TextureHandle,
};
pub use cache::{
    Result, SharedTextureCache, TextureCache, TextureCacheConfig, TextureCacheError, TextureRecord,
};
pub use resources::{DecodeError, DecodedImage, ImageDecoder, ImageFileDecoder};

// Re-export the wgpu device for direct access
#[cfg(feature = "wgpu-backend")]
pub use backend::wgpu_backend::WgpuTextureDevice;
