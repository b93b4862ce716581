//! Dummy device for testing and development.
//!
//! This device doesn't perform actual GPU operations. It hands out
//! sequential handles and records every call so tests and tools can
//! verify what the cache asked the device to do.

use std::collections::HashSet;

use super::{BackendError, BackendResult, SamplingPolicy, TextureDevice, TextureFormat, TextureHandle};

/// A single call received by [`DummyDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Allocate {
        handle: TextureHandle,
        label: Option<String>,
    },
    Upload {
        handle: TextureHandle,
        format: TextureFormat,
        width: u32,
        height: u32,
        len: usize,
    },
    SetSampling {
        handle: TextureHandle,
        policy: SamplingPolicy,
    },
    Free(TextureHandle),
}

/// Dummy texture device.
#[derive(Debug, Default)]
pub struct DummyDevice {
    next_texture_id: u64,
    live: HashSet<TextureHandle>,
    calls: Vec<DeviceCall>,
    fail_next_allocation: bool,
    fail_next_upload: bool,
}

impl DummyDevice {
    /// Create a new dummy device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Forget the recorded calls. Live textures are kept.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn allocation_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::Allocate { .. }))
            .count()
    }

    pub fn free_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::Free(_)))
            .count()
    }

    /// Number of times `handle` was freed.
    pub fn frees_of(&self, handle: TextureHandle) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == DeviceCall::Free(handle))
            .count()
    }

    /// Whether `handle` was allocated and not yet freed.
    pub fn is_live(&self, handle: TextureHandle) -> bool {
        self.live.contains(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Make the next `allocate_texture` call fail.
    pub fn fail_next_allocation(&mut self) {
        self.fail_next_allocation = true;
    }

    /// Make the next `upload_texture_2d` call fail.
    pub fn fail_next_upload(&mut self) {
        self.fail_next_upload = true;
    }

    fn check_live(&self, handle: TextureHandle) -> BackendResult<()> {
        if self.live.contains(&handle) {
            Ok(())
        } else {
            Err(BackendError::UnknownHandle(handle))
        }
    }
}

impl TextureDevice for DummyDevice {
    fn allocate_texture(&mut self, label: Option<&str>) -> BackendResult<TextureHandle> {
        if std::mem::take(&mut self.fail_next_allocation) {
            return Err(BackendError::TextureCreationFailed(format!(
                "allocation of {:?} rejected",
                label
            )));
        }

        self.next_texture_id += 1;
        let handle = TextureHandle(self.next_texture_id);
        log::trace!("DummyDevice: allocating texture {:?} -> {:?}", label, handle);

        self.live.insert(handle);
        self.calls.push(DeviceCall::Allocate {
            handle,
            label: label.map(str::to_owned),
        });
        Ok(handle)
    }

    fn upload_texture_2d(
        &mut self,
        handle: TextureHandle,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> BackendResult<()> {
        self.check_live(handle)?;
        if std::mem::take(&mut self.fail_next_upload) {
            return Err(BackendError::InvalidUpload(format!(
                "upload to {:?} rejected",
                handle
            )));
        }

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

        log::trace!(
            "DummyDevice: upload {:?} ({}x{} {:?}) len={}",
            handle,
            width,
            height,
            format,
            data.len()
        );
        self.calls.push(DeviceCall::Upload {
            handle,
            format,
            width,
            height,
            len: data.len(),
        });
        Ok(())
    }

    fn set_sampling(&mut self, handle: TextureHandle, policy: &SamplingPolicy) -> BackendResult<()> {
        self.check_live(handle)?;
        log::trace!("DummyDevice: sampling {:?} -> {:?}", handle, policy);
        self.calls.push(DeviceCall::SetSampling {
            handle,
            policy: *policy,
        });
        Ok(())
    }

    fn free_texture(&mut self, handle: TextureHandle) {
        log::trace!("DummyDevice: freeing {:?}", handle);
        self.live.remove(&handle);
        self.calls.push(DeviceCall::Free(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_handles() {
        let mut device = DummyDevice::new();
        let a = device.allocate_texture(None).unwrap();
        let b = device.allocate_texture(Some("b")).unwrap();
        assert_ne!(a, b);
        assert!(device.is_live(a));
        assert!(device.is_live(b));
        assert_eq!(device.allocation_count(), 2);
    }

    #[test]
    fn test_upload_size_checked() {
        let mut device = DummyDevice::new();
        let handle = device.allocate_texture(None).unwrap();

        assert!(device
            .upload_texture_2d(handle, TextureFormat::Rgb8, 2, 2, &[0u8; 12])
            .is_ok());
        assert!(matches!(
            device.upload_texture_2d(handle, TextureFormat::Rgba8, 2, 2, &[0u8; 12]),
            Err(BackendError::InvalidUpload(_))
        ));
    }

    #[test]
    fn test_free_marks_dead() {
        let mut device = DummyDevice::new();
        let handle = device.allocate_texture(None).unwrap();
        device.free_texture(handle);

        assert!(!device.is_live(handle));
        assert_eq!(device.frees_of(handle), 1);
        assert_eq!(
            device.set_sampling(handle, &SamplingPolicy::default()),
            Err(BackendError::UnknownHandle(handle))
        );
    }

    #[test]
    fn test_injected_failures_are_one_shot() {
        let mut device = DummyDevice::new();
        device.fail_next_allocation();
        assert!(device.allocate_texture(None).is_err());
        let handle = device.allocate_texture(None).unwrap();

        device.fail_next_upload();
        assert!(device
            .upload_texture_2d(handle, TextureFormat::R8, 1, 1, &[0])
            .is_err());
        assert!(device
            .upload_texture_2d(handle, TextureFormat::R8, 1, 1, &[0])
            .is_ok());
    }
}
