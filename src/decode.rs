//! Probe image decoding from files on disk.
//!
//! Any format the `image` crate was built with (jpg, png, gif, bmp) is
//! decoded and normalized to the run's [`ColorMode`]. The resulting raster is
//! tightly packed.
//!
//! # Example
//!
//! ```ignore
//! use irpi_eval::{decode::decode_probe_image, ColorMode};
//!
//! let probe = decode_probe_image("subject/0001.jpg".as_ref(), ColorMode::Grayscale)?;
//! assert_eq!(probe.depth(), 8);
//! ```

use std::path::Path;

use imgref::ImgVec;
use rgb::RGB8;

use crate::error::{Error, Result};
use crate::image::{ColorMode, ProbeImage};
use crate::pipeline::ImageLoader;

/// Decode an image file into a probe image.
pub fn decode_probe_image(path: &Path, mode: ColorMode) -> Result<ProbeImage> {
    let decoded = image::open(path).map_err(|e| Error::ImageLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let width = decoded.width() as usize;
    let height = decoded.height() as usize;

    let probe = match mode {
        ColorMode::Grayscale => {
            let luma = decoded.into_luma8().into_raw();
            ProbeImage::Gray8(ImgVec::new(luma, width, height))
        }
        ColorMode::Rgb => {
            let pixels: Vec<RGB8> = decoded
                .into_rgb8()
                .into_raw()
                .chunks_exact(3)
                .map(|c| RGB8::new(c[0], c[1], c[2]))
                .collect();
            ProbeImage::Rgb8(ImgVec::new(pixels, width, height))
        }
    };

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        depth = probe.depth(),
        "decoded probe image"
    );

    Ok(probe)
}

/// Loader callback for [`Benchmark`](crate::pipeline::Benchmark) that decodes
/// files with [`decode_probe_image`].
pub fn file_loader(mode: ColorMode) -> ImageLoader {
    Box::new(move |path: &Path| decode_probe_image(path, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png_grayscale_and_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.png");
        let img = image::RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8 * 10, y as u8 * 10, 7]));
        img.save(&path).unwrap();

        let rgb = decode_probe_image(&path, ColorMode::Rgb).unwrap();
        assert_eq!((rgb.width(), rgb.height(), rgb.depth()), (3, 2, 24));
        assert_eq!(rgb.as_bytes().len(), 3 * 2 * 3);
        assert_eq!(&rgb.as_bytes()[..3], &[0, 0, 7]);

        let gray = decode_probe_image(&path, ColorMode::Grayscale).unwrap();
        assert_eq!(gray.depth(), 8);
        assert_eq!(gray.as_bytes().len(), 6);
    }

    #[test]
    fn test_decode_missing_file() {
        let err = decode_probe_image(Path::new("/nonexistent/x.png"), ColorMode::Rgb).unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }
}
