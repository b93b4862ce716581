//! Reference-counted texture cache.
//!
//! [`TextureCache`] keeps exactly one device texture per distinct source
//! path. The first [`acquire`](TextureCache::acquire) of a path decodes and
//! uploads it; later acquires hand out the same handle and bump a count.
//! [`release`](TextureCache::release) drops the count and frees the device
//! texture once nobody holds it.
//!
//! # Example
//!
//! ```ignore
//! let mut cache = TextureCache::new(device, ImageFileDecoder::new());
//! let a = cache.acquire("textures/grass.png")?;
//! let b = cache.acquire("textures/grass.png")?;
//! assert_eq!(a, b);
//! cache.release("textures/grass.png")?;
//! cache.release("textures/grass.png")?;
//! assert!(!cache.contains("textures/grass.png"));
//! ```

mod error;
mod shared;

use std::collections::HashMap;

use crate::backend::{SamplingPolicy, TextureDevice, TextureFormat, TextureHandle};
use crate::resources::{DecodedImage, ImageDecoder, ImageFileDecoder};

pub use error::{Result, TextureCacheError};
pub use shared::SharedTextureCache;

/// Configuration for a [`TextureCache`]
#[derive(Debug, Clone, Default)]
pub struct TextureCacheConfig {
    /// Sampling parameters applied to every uploaded texture
    pub sampling: SamplingPolicy,
    /// Prefix for device resource labels; the path is appended
    pub label_prefix: Option<String>,
}

/// One live texture in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRecord {
    handle: TextureHandle,
    reference_count: u32,
}

impl TextureRecord {
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Number of outstanding acquisitions. Always at least 1.
    pub fn reference_count(&self) -> u32 {
        self.reference_count
    }
}

/// Deduplicating texture cache keyed by path.
///
/// Not synchronized. All calls must come from the thread that owns the
/// device context; wrap in [`SharedTextureCache`] otherwise.
pub struct TextureCache<D: TextureDevice, L: ImageDecoder = ImageFileDecoder> {
    device: D,
    decoder: L,
    config: TextureCacheConfig,
    registry: HashMap<String, TextureRecord>,
}

impl<D: TextureDevice, L: ImageDecoder> TextureCache<D, L> {
    /// Create a cache with the default configuration.
    pub fn new(device: D, decoder: L) -> Self {
        Self::with_config(device, decoder, TextureCacheConfig::default())
    }

    pub fn with_config(device: D, decoder: L, config: TextureCacheConfig) -> Self {
        Self {
            device,
            decoder,
            config,
            registry: HashMap::new(),
        }
    }

    /// Get a handle to the texture for `path`, uploading it on first use.
    ///
    /// On a hit no decoder or device call is made. On any failure the
    /// registry is left untouched and nothing stays allocated on the device.
    pub fn acquire(&mut self, path: &str) -> Result<TextureHandle> {
        if let Some(record) = self.registry.get_mut(path) {
            record.reference_count = record.reference_count.checked_add(1).ok_or_else(|| {
                TextureCacheError::ReferenceCountOverflow {
                    path: path.to_owned(),
                }
            })?;
            log::debug!(
                "Using cached texture for {} ({:?}, count {})",
                path,
                record.handle,
                record.reference_count
            );
            return Ok(record.handle);
        }

        let image = self.decoder.decode(path)?;
        let format = TextureFormat::from_channels(image.channels).ok_or_else(|| {
            TextureCacheError::UnsupportedChannelCount {
                path: path.to_owned(),
                channels: image.channels,
            }
        })?;

        let label = match &self.config.label_prefix {
            Some(prefix) => format!("{prefix}{path}"),
            None => path.to_owned(),
        };
        let handle = self.device.allocate_texture(Some(&label))?;

        if let Err(err) = self.configure_and_upload(handle, format, &image) {
            self.device.free_texture(handle);
            return Err(err.into());
        }

        self.registry.insert(
            path.to_owned(),
            TextureRecord {
                handle,
                reference_count: 1,
            },
        );
        log::info!(
            "Uploaded new texture for {} ({}x{} {:?}) as {:?}",
            path,
            image.width,
            image.height,
            format,
            handle
        );
        self.log_registry();

        Ok(handle)
    }

    fn configure_and_upload(
        &mut self,
        handle: TextureHandle,
        format: TextureFormat,
        image: &DecodedImage,
    ) -> crate::backend::BackendResult<()> {
        self.device.set_sampling(handle, &self.config.sampling)?;
        self.device
            .upload_texture_2d(handle, format, image.width, image.height, &image.pixels)
    }

    /// Give up one acquisition of `path`.
    ///
    /// Frees the device texture when the last acquisition is released.
    /// Fails with [`TextureCacheError::NotFound`] if `path` is not live.
    pub fn release(&mut self, path: &str) -> Result<()> {
        let record = self
            .registry
            .get_mut(path)
            .ok_or_else(|| TextureCacheError::NotFound {
                path: path.to_owned(),
            })?;

        record.reference_count = record.reference_count.saturating_sub(1);
        if record.reference_count > 0 {
            log::debug!(
                "Released {} ({:?}), count {}",
                path,
                record.handle,
                record.reference_count
            );
            return Ok(());
        }

        if let Some(record) = self.registry.remove(path) {
            self.device.free_texture(record.handle);
            log::info!("Freed texture for {} ({:?})", path, record.handle);
        }
        Ok(())
    }

    /// Free every device texture regardless of count and empty the cache.
    ///
    /// Handles still held by callers become invalid. Must be called while the
    /// device context is alive.
    pub fn teardown(&mut self) {
        let count = self.registry.len();
        for (path, record) in self.registry.drain() {
            log::trace!("Teardown freeing {} ({:?})", path, record.handle);
            self.device.free_texture(record.handle);
        }
        if count > 0 {
            log::info!("Texture cache torn down, freed {} textures", count);
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.registry.contains_key(path)
    }

    pub fn record(&self, path: &str) -> Option<&TextureRecord> {
        self.registry.get(path)
    }

    /// Peek at the handle for `path` without acquiring it.
    pub fn handle(&self, path: &str) -> Option<TextureHandle> {
        self.registry.get(path).map(|record| record.handle)
    }

    pub fn reference_count(&self, path: &str) -> Option<u32> {
        self.registry.get(path).map(|record| record.reference_count)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Paths with a live texture, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    pub fn sampling_policy(&self) -> &SamplingPolicy {
        &self.config.sampling
    }

    pub fn config(&self) -> &TextureCacheConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn log_registry(&self) {
        log::info!("Texture map size: {}", self.registry.len());
        if log::log_enabled!(log::Level::Debug) {
            for (path, record) in &self.registry {
                log::debug!(
                    "  {}: {:?}, count {}",
                    path,
                    record.handle,
                    record.reference_count
                );
            }
        }
    }
}

impl<D: TextureDevice, L: ImageDecoder> Drop for TextureCache<D, L> {
    fn drop(&mut self) {
        if !self.registry.is_empty() {
            log::warn!(
                "Texture cache dropped with {} live textures, forcing teardown",
                self.registry.len()
            );
            self.teardown();
        }
    }
}

impl<D: TextureDevice, L: ImageDecoder> std::fmt::Debug for TextureCache<D, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureCache")
            .field("len", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}
