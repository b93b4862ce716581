//! Shared fixtures for texture cache integration tests.

use std::collections::HashMap;
use std::io;

use texture_cache::{DecodeError, DecodedImage, ImageDecoder};

/// Install a test logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Decoder serving images from memory, counting decodes per path.
#[derive(Debug, Default)]
pub struct MemoryDecoder {
    images: HashMap<String, DecodedImage>,
    decodes: HashMap<String, usize>,
}

impl MemoryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `size`x`size` image with `channels` channels, filled with `fill`.
    pub fn with_image(mut self, path: &str, size: u32, channels: u32, fill: u8) -> Self {
        let pixels = vec![fill; (size * size * channels) as usize];
        self.images.insert(
            path.to_string(),
            DecodedImage {
                width: size,
                height: size,
                channels,
                pixels,
            },
        );
        self
    }

    pub fn decodes_of(&self, path: &str) -> usize {
        self.decodes.get(path).copied().unwrap_or(0)
    }

    pub fn total_decodes(&self) -> usize {
        self.decodes.values().sum()
    }
}

impl ImageDecoder for MemoryDecoder {
    fn decode(&mut self, path: &str) -> Result<DecodedImage, DecodeError> {
        *self.decodes.entry(path.to_string()).or_default() += 1;
        self.images.get(path).cloned().ok_or_else(|| {
            DecodeError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{path} does not exist"),
            ))
        })
    }
}
