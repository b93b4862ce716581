//! Device abstraction layer
//!
//! Provides the [`TextureDevice`] trait the cache drives, plus a wgpu
//! implementation and a recording dummy device.

pub mod dummy;
pub mod traits;
pub mod types;

#[cfg(feature = "wgpu-backend")]
pub mod wgpu_backend;

pub use dummy::{DeviceCall, DummyDevice};
pub use traits::*;
pub use types::*;
