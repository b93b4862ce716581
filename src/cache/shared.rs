//! Mutex-guarded cache handle for callers that share one cache.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::{Result, TextureCache};
use crate::backend::{TextureDevice, TextureHandle};
use crate::resources::{ImageDecoder, ImageFileDecoder};

/// A [`TextureCache`] behind a single lock.
///
/// Every operation holds the lock for its whole check-then-act sequence, so
/// two owners acquiring the same path still get one device texture. Cloning
/// shares the same cache.
pub struct SharedTextureCache<D: TextureDevice, L: ImageDecoder = ImageFileDecoder> {
    inner: Arc<Mutex<TextureCache<D, L>>>,
}

impl<D: TextureDevice, L: ImageDecoder> SharedTextureCache<D, L> {
    pub fn new(cache: TextureCache<D, L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn acquire(&self, path: &str) -> Result<TextureHandle> {
        self.inner.lock().acquire(path)
    }

    pub fn release(&self, path: &str) -> Result<()> {
        self.inner.lock().release(path)
    }

    pub fn teardown(&self) {
        self.inner.lock().teardown()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().contains(path)
    }

    pub fn reference_count(&self, path: &str) -> Option<u32> {
        self.inner.lock().reference_count(path)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Lock the cache for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, TextureCache<D, L>> {
        self.inner.lock()
    }
}

impl<D: TextureDevice, L: ImageDecoder> Clone for SharedTextureCache<D, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: TextureDevice, L: ImageDecoder> From<TextureCache<D, L>> for SharedTextureCache<D, L> {
    fn from(cache: TextureCache<D, L>) -> Self {
        Self::new(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyDevice;
    use crate::resources::{DecodeError, DecodedImage};

    struct SolidDecoder;

    impl ImageDecoder for SolidDecoder {
        fn decode(&mut self, _path: &str) -> std::result::Result<DecodedImage, DecodeError> {
            Ok(DecodedImage {
                width: 1,
                height: 1,
                channels: 4,
                pixels: vec![10, 20, 30, 255],
            })
        }
    }

    #[test]
    fn test_threads_share_one_texture() {
        let shared = SharedTextureCache::new(TextureCache::new(DummyDevice::new(), SolidDecoder));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.acquire("shared.png").unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|thread| thread.join().unwrap())
            .collect();

        assert!(handles.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(shared.reference_count("shared.png"), Some(8));
        assert_eq!(shared.lock().device().allocation_count(), 1);

        for _ in 0..8 {
            shared.release("shared.png").unwrap();
        }
        assert!(shared.is_empty());
        assert_eq!(shared.lock().device().free_count(), 1);
    }
}
