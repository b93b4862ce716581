//! Resource loading
//!
//! Turns image paths into raw pixel data for upload.

mod texture;

pub use texture::*;
