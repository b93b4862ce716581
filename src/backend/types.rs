//! Common types shared between device implementations

/// Pixel format of an uploaded texture.
///
/// Only the uncompressed 8-bit formats the cache can derive from a decoded
/// image are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Single channel.
    R8,
    /// Three channels, no alpha.
    Rgb8,
    /// Four channels.
    Rgba8,
}

impl TextureFormat {
    /// Map a decoded channel count to a format.
    ///
    /// Returns `None` for channel counts other than 1, 3 and 4.
    pub fn from_channels(channels: u32) -> Option<Self> {
        match channels {
            1 => Some(TextureFormat::R8),
            3 => Some(TextureFormat::Rgb8),
            4 => Some(TextureFormat::Rgba8),
            _ => None,
        }
    }

    pub fn channels(&self) -> u32 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        self.channels()
    }
}

/// Filter mode for samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Address mode for samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

/// Sampling parameters applied to every texture the cache uploads.
///
/// The default wraps on both axes and uses nearest filtering for
/// minification and magnification. No mipmaps are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPolicy {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
}

impl SamplingPolicy {
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode_u = mode;
        self.address_mode_v = mode;
        self
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.min_filter = filter;
        self.mag_filter = filter;
        self
    }
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_channels() {
        assert_eq!(TextureFormat::from_channels(1), Some(TextureFormat::R8));
        assert_eq!(TextureFormat::from_channels(3), Some(TextureFormat::Rgb8));
        assert_eq!(TextureFormat::from_channels(4), Some(TextureFormat::Rgba8));
        assert_eq!(TextureFormat::from_channels(0), None);
        assert_eq!(TextureFormat::from_channels(2), None);
        assert_eq!(TextureFormat::from_channels(5), None);
    }

    #[test]
    fn test_default_sampling_policy() {
        let policy = SamplingPolicy::default();
        assert_eq!(policy.address_mode_u, AddressMode::Repeat);
        assert_eq!(policy.address_mode_v, AddressMode::Repeat);
        assert_eq!(policy.min_filter, FilterMode::Nearest);
        assert_eq!(policy.mag_filter, FilterMode::Nearest);
    }

    #[test]
    fn test_sampling_policy_builders() {
        let policy = SamplingPolicy::default()
            .with_address_mode(AddressMode::ClampToEdge)
            .with_filter(FilterMode::Linear);
        assert_eq!(policy.address_mode_u, AddressMode::ClampToEdge);
        assert_eq!(policy.address_mode_v, AddressMode::ClampToEdge);
        assert_eq!(policy.min_filter, FilterMode::Linear);
        assert_eq!(policy.mag_filter, FilterMode::Linear);
    }
}
