//! Texture decoding

use image::{DynamicImage, GenericImageView};
use std::path::Path;
use thiserror::Error;

/// Errors produced while turning a path into pixels.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Raw pixels produced by an [`ImageDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create decoded image data, checking the buffer length.
    pub fn new(width: u32, height: u32, channels: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        let expected = width as usize * height as usize * channels as usize;
        if pixels.len() != expected {
            return Err(DecodeError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }
}

/// Turns a path into raw pixels.
pub trait ImageDecoder {
    fn decode(&mut self, path: &str) -> Result<DecodedImage, DecodeError>;
}

impl<T: ImageDecoder + ?Sized> ImageDecoder for &mut T {
    fn decode(&mut self, path: &str) -> Result<DecodedImage, DecodeError> {
        (**self).decode(path)
    }
}

/// Decodes image files with the `image` crate.
///
/// 8-bit grey, RGB and RGBA images keep their channel count. 8-bit
/// grey + alpha is reported with two channels. Anything with wider samples
/// is converted to 8-bit RGBA.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileDecoder;

impl ImageFileDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode an encoded image held in memory.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        let img = image::load_from_memory(bytes)?;
        Self::from_image(img)
    }

    fn decode_file(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        let img = image::io::Reader::open(path)?
            .with_guessed_format()?
            .decode()?;
        Self::from_image(img)
    }

    fn from_image(img: DynamicImage) -> Result<DecodedImage, DecodeError> {
        let (width, height) = img.dimensions();
        let (channels, pixels) = match img {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            other => (4, other.to_rgba8().into_raw()),
        };

        DecodedImage::new(width, height, channels, pixels)
    }
}

impl ImageDecoder for ImageFileDecoder {
    fn decode(&mut self, path: &str) -> Result<DecodedImage, DecodeError> {
        self.decode_file(Path::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_decoded_image_size_checked() {
        assert!(DecodedImage::new(2, 2, 3, vec![0; 12]).is_ok());
        assert!(matches!(
            DecodedImage::new(2, 2, 3, vec![0; 11]),
            Err(DecodeError::SizeMismatch {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn test_decode_keeps_channel_count() {
        let decoder = ImageFileDecoder::new();

        let grey = encode_png(DynamicImage::ImageLuma8(GrayImage::new(3, 2)));
        let decoded = decoder.decode_bytes(&grey).unwrap();
        assert_eq!((decoded.width, decoded.height, decoded.channels), (3, 2, 1));
        assert_eq!(decoded.pixels.len(), 6);

        let rgb = encode_png(DynamicImage::ImageRgb8(RgbImage::new(4, 4)));
        assert_eq!(decoder.decode_bytes(&rgb).unwrap().channels, 3);

        let grey_alpha = encode_png(DynamicImage::ImageLumaA8(GrayAlphaImage::new(1, 1)));
        assert_eq!(decoder.decode_bytes(&grey_alpha).unwrap().channels, 2);
    }

    #[test]
    fn test_decode_missing_file() {
        let mut decoder = ImageFileDecoder::new();
        assert!(matches!(
            decoder.decode("/definitely/not/here.png"),
            Err(DecodeError::Io(_))
        ));
    }

    #[test]
    fn test_decode_garbage() {
        let decoder = ImageFileDecoder::new();
        assert!(matches!(
            decoder.decode_bytes(b"not an image"),
            Err(DecodeError::Image(_))
        ));
    }
}
