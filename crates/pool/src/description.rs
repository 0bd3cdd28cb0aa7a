use serde::{Deserialize, Serialize};

/// Pixel formats a render target can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    R8,
    Rg8,
    Rgba8,
    R16f,
    Rg16f,
    Rgba16f,
    R32f,
    Rgba32f,
    Depth24Stencil8,
    Depth32f,
}

impl ImageFormat {
    pub fn bytes_per_pixel(self) -> u64 {
        match self {
            ImageFormat::R8 => 1,
            ImageFormat::Rg8 | ImageFormat::R16f => 2,
            ImageFormat::Rgba8
            | ImageFormat::Rg16f
            | ImageFormat::R32f
            | ImageFormat::Depth24Stencil8
            | ImageFormat::Depth32f => 4,
            ImageFormat::Rgba16f => 8,
            ImageFormat::Rgba32f => 16,
        }
    }

    pub fn is_depth(self) -> bool {
        matches!(self, ImageFormat::Depth24Stencil8 | ImageFormat::Depth32f)
    }
}

/// Size and format of a 2D render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDescription {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageDescription {
    pub fn new(width: u32, height: u32, format: ImageFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * self.format.bytes_per_pixel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_accounts_for_format() {
        let d = ImageDescription::new(640, 480, ImageFormat::Rgba16f);
        assert_eq!(d.size_bytes(), 640 * 480 * 8);
        assert_eq!(
            ImageDescription::new(1, 1, ImageFormat::Rgba32f).size_bytes(),
            16
        );
    }

    #[test]
    fn size_does_not_overflow_u32() {
        let d = ImageDescription::new(u32::MAX, 2, ImageFormat::R8);
        assert_eq!(d.size_bytes(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn depth_formats() {
        assert!(ImageFormat::Depth32f.is_depth());
        assert!(!ImageFormat::R32f.is_depth());
    }
}
