//! Decoded probe images handed to template creation.

use imgref::ImgVec;
use rgb::{ComponentBytes, RGB8};

use crate::error::{Error, Result};

/// Pixel format probes are normalized to before template creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// 24-bit RGB.
    #[default]
    Rgb,
    /// 8-bit intensity.
    Grayscale,
}

impl ColorMode {
    /// Bits per pixel for this mode.
    #[must_use]
    pub fn depth(self) -> u8 {
        match self {
            Self::Rgb => 24,
            Self::Grayscale => 8,
        }
    }
}

/// A decoded, tightly packed probe image.
///
/// Rows carry no padding: the raw buffer is exactly
/// `width * height * depth / 8` bytes.
#[derive(Clone)]
pub enum ProbeImage {
    /// 8-bit grayscale.
    Gray8(ImgVec<u8>),

    /// 24-bit RGB.
    Rgb8(ImgVec<RGB8>),
}

impl ProbeImage {
    /// Build an image from a packed raster.
    ///
    /// `depth` must be 8 (`IIII...`) or 24 (`RGBRGB...`).
    pub fn from_raw(width: usize, height: usize, depth: u8, data: Vec<u8>) -> Result<Self> {
        if depth != 8 && depth != 24 {
            return Err(Error::UnsupportedDepth(depth));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(usize::from(depth / 8)));
        if expected != Some(data.len()) {
            return Err(Error::PixelBufferSize {
                width,
                height,
                depth,
                actual: data.len(),
            });
        }

        Ok(match depth {
            8 => Self::Gray8(ImgVec::new(data, width, height)),
            _ => {
                let pixels: Vec<RGB8> = data
                    .chunks_exact(3)
                    .map(|c| RGB8::new(c[0], c[1], c[2]))
                    .collect();
                Self::Rgb8(ImgVec::new(pixels, width, height))
            }
        })
    }

    /// Image width.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Gray8(img) => img.width(),
            Self::Rgb8(img) => img.width(),
        }
    }

    /// Image height.
    #[must_use]
    pub fn height(&self) -> usize {
        match self {
            Self::Gray8(img) => img.height(),
            Self::Rgb8(img) => img.height(),
        }
    }

    /// Bits per pixel, 8 or 24.
    #[must_use]
    pub fn depth(&self) -> u8 {
        match self {
            Self::Gray8(_) => 8,
            Self::Rgb8(_) => 24,
        }
    }

    /// Size of the packed raster in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.width() * self.height() * usize::from(self.depth() / 8)
    }

    /// Packed raster in row-major order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        // Images are only built through `ImgVec::new`, so stride == width.
        match self {
            Self::Gray8(img) => img.buf().as_slice(),
            Self::Rgb8(img) => img.buf().as_bytes(),
        }
    }
}

impl std::fmt::Debug for ProbeImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_raw() {
        let data: Vec<u8> = (0..2 * 3 * 3).map(|i| i as u8).collect();
        let img = ProbeImage::from_raw(2, 3, 24, data.clone()).unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 3);
        assert_eq!(img.depth(), 24);
        assert_eq!(img.size(), 18);
        assert_eq!(img.as_bytes(), data.as_slice());
    }

    #[test]
    fn test_gray_from_raw() {
        let img = ProbeImage::from_raw(4, 2, 8, vec![7; 8]).unwrap();
        assert_eq!(img.depth(), 8);
        assert_eq!(img.as_bytes().len(), 8);
    }

    #[test]
    fn test_rejects_padded_rows() {
        // 3 pixels of RGB plus one padding byte per row
        let err = ProbeImage::from_raw(3, 2, 24, vec![0; 20]).unwrap_err();
        assert!(matches!(err, Error::PixelBufferSize { actual: 20, .. }));
    }

    #[test]
    fn test_rejects_overflowing_dimensions() {
        let err = ProbeImage::from_raw(usize::MAX, 2, 24, vec![0; 6]).unwrap_err();
        assert!(matches!(err, Error::PixelBufferSize { actual: 6, .. }));
        let err = ProbeImage::from_raw(usize::MAX / 2, 1, 24, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::PixelBufferSize { .. }));
    }

    #[test]
    fn test_rejects_depth() {
        assert!(matches!(
            ProbeImage::from_raw(1, 1, 16, vec![0, 0]),
            Err(Error::UnsupportedDepth(16))
        ));
        // Depth is checked before the buffer size.
        assert!(matches!(
            ProbeImage::from_raw(usize::MAX, usize::MAX, 32, Vec::new()),
            Err(Error::UnsupportedDepth(32))
        ));
    }

    #[test]
    fn test_color_mode_depth() {
        assert_eq!(ColorMode::Rgb.depth(), 24);
        assert_eq!(ColorMode::Grayscale.depth(), 8);
    }
}
