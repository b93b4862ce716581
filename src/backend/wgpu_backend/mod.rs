//! wgpu device implementation

use crate::backend::traits::*;
use crate::backend::types::*;
use std::collections::HashMap;

/// Storage behind one [`TextureHandle`].
///
/// wgpu textures are immutable in size and format, so allocation only reserves
/// the slot; the texture itself is created on upload.
#[derive(Default)]
struct TextureSlot {
    label: Option<String>,
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
    sampler: Option<wgpu::Sampler>,
}

/// wgpu texture device
pub struct WgpuTextureDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,

    textures: HashMap<u64, TextureSlot>,
    next_texture_id: u64,
}

impl WgpuTextureDevice {
    /// Wrap an existing device and queue.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: HashMap::new(),
            next_texture_id: 1,
        }
    }

    /// Create a device without a surface, blocking until it is ready.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn headless() -> BackendResult<Self> {
        pollster::block_on(Self::headless_async())
    }

    /// Create a device without a surface.
    pub async fn headless_async() -> BackendResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BackendError::InitializationFailed("No suitable adapter found".into()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Texture Cache Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::DeviceCreationFailed(e.to_string()))?;

        Ok(Self::new(device, queue))
    }

    fn convert_texture_format(format: TextureFormat) -> wgpu::TextureFormat {
        match format {
            TextureFormat::R8 => wgpu::TextureFormat::R8Unorm,
            // wgpu has no three channel format; RGB data is widened on upload
            TextureFormat::Rgb8 | TextureFormat::Rgba8 => wgpu::TextureFormat::Rgba8UnormSrgb,
        }
    }

    fn convert_filter_mode(mode: FilterMode) -> wgpu::FilterMode {
        match mode {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }

    fn convert_address_mode(mode: AddressMode) -> wgpu::AddressMode {
        match mode {
            AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
            AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }

    /// Widen tightly packed RGB pixels to RGBA with opaque alpha.
    fn expand_rgb_to_rgba(data: &[u8]) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(data.len() / 3 * 4);
        for pixel in data.chunks_exact(3) {
            rgba.extend_from_slice(pixel);
            rgba.push(u8::MAX);
        }
        rgba
    }

    fn slot(&self, handle: TextureHandle) -> BackendResult<&TextureSlot> {
        self.textures
            .get(&handle.0)
            .ok_or(BackendError::UnknownHandle(handle))
    }

    /// Get reference to the wgpu device
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get reference to the wgpu queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// The uploaded texture behind `handle`, if any.
    pub fn texture(&self, handle: TextureHandle) -> Option<&wgpu::Texture> {
        self.slot(handle).ok()?.texture.as_ref()
    }

    /// Default view of the uploaded texture behind `handle`, if any.
    pub fn texture_view(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.slot(handle).ok()?.view.as_ref()
    }

    /// Sampler configured for `handle`, if any.
    pub fn sampler(&self, handle: TextureHandle) -> Option<&wgpu::Sampler> {
        self.slot(handle).ok()?.sampler.as_ref()
    }

    /// Number of handles currently allocated.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl TextureDevice for WgpuTextureDevice {
    fn allocate_texture(&mut self, label: Option<&str>) -> BackendResult<TextureHandle> {
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures.insert(
            id,
            TextureSlot {
                label: label.map(str::to_owned),
                ..Default::default()
            },
        );

        Ok(TextureHandle(id))
    }

    fn upload_texture_2d(
        &mut self,
        handle: TextureHandle,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> BackendResult<()> {
        let expected = width as usize * height as usize * format.bytes_per_pixel() as usize;
        if data.len() != expected {
            return Err(BackendError::InvalidUpload(format!(
                "expected {} bytes for {}x{} {:?}, got {}",
                expected,
                width,
                height,
                format,
                data.len()
            )));
        }
        if width == 0 || height == 0 {
            return Err(BackendError::InvalidUpload(format!(
                "texture size {}x{} is empty",
                width, height
            )));
        }

        let max_size = self.device.limits().max_texture_dimension_2d;
        if width > max_size || height > max_size {
            return Err(BackendError::TextureCreationFailed(format!(
                "{}x{} exceeds the device limit of {}",
                width, height, max_size
            )));
        }

        let slot = self
            .textures
            .get_mut(&handle.0)
            .ok_or(BackendError::UnknownHandle(handle))?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: slot.label.as_deref(),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::convert_texture_format(format),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let (pixels, bytes_per_pixel) = match format {
            TextureFormat::Rgb8 => (std::borrow::Cow::Owned(Self::expand_rgb_to_rgba(data)), 4),
            _ => (std::borrow::Cow::Borrowed(data), format.bytes_per_pixel()),
        };

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * bytes_per_pixel),
                rows_per_image: Some(height),
            },
            size,
        );

        // Re-uploading replaces the previous texture
        if let Some(old) = slot.texture.take() {
            old.destroy();
        }
        slot.view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        slot.texture = Some(texture);

        Ok(())
    }

    fn set_sampling(&mut self, handle: TextureHandle, policy: &SamplingPolicy) -> BackendResult<()> {
        let slot = self
            .textures
            .get_mut(&handle.0)
            .ok_or(BackendError::UnknownHandle(handle))?;

        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: slot.label.as_deref(),
            address_mode_u: Self::convert_address_mode(policy.address_mode_u),
            address_mode_v: Self::convert_address_mode(policy.address_mode_v),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: Self::convert_filter_mode(policy.mag_filter),
            min_filter: Self::convert_filter_mode(policy.min_filter),
            mipmap_filter: wgpu::FilterMode::Nearest,
            lod_min_clamp: 0.0,
            lod_max_clamp: 0.0,
            compare: None,
            anisotropy_clamp: 1,
            border_color: None,
        });
        slot.sampler = Some(sampler);

        Ok(())
    }

    fn free_texture(&mut self, handle: TextureHandle) {
        if let Some(slot) = self.textures.remove(&handle.0) {
            if let Some(texture) = slot.texture {
                texture.destroy();
            }
        } else {
            log::warn!("Freeing unknown texture handle {:?}", handle);
        }
    }
}
