//! Filesystem-backed host images.
//!
//! Pixels are decoded lazily with the `image` crate from the stored file or
//! the packed bytes. Generated images start out as a solid colour buffer.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader, Rgba, RgbaImage};

use crate::error::{ExportError, Result};
use crate::types::{ImageAsset, ImageFormat, ImageSource};

use super::HostImage;

/// Default JPEG quality used when re-encoding.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// An image whose pixels live on disk or in memory.
#[derive(Debug, Clone)]
pub struct FsImage {
    asset: ImageAsset,
    pixels: Option<DynamicImage>,
    packed: Option<Vec<u8>>,
    jpeg_quality: u8,
}

impl FsImage {
    /// An image backed by the file at `asset.path`.
    pub fn new(asset: ImageAsset) -> Self {
        Self {
            asset,
            pixels: None,
            packed: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// An image whose bytes are embedded rather than stored in a file.
    pub fn packed(mut asset: ImageAsset, bytes: Vec<u8>) -> Self {
        asset.packed = true;
        Self {
            asset,
            pixels: None,
            packed: Some(bytes),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// A generated image filled with a single colour.
    pub fn generated(name: impl Into<String>, width: u32, height: u32, color: [u8; 4]) -> Self {
        let asset = ImageAsset::new(name, ImageSource::Generated, ImageFormat::Png)
            .with_size(width, height)
            .with_alpha(true);
        let pixels = RgbaImage::from_pixel(width, height, Rgba(color));
        Self {
            asset,
            pixels: Some(DynamicImage::ImageRgba8(pixels)),
            packed: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn set_jpeg_quality(&mut self, quality: u8) {
        self.jpeg_quality = quality.clamp(1, 100);
    }

    fn decode(&self) -> Result<DynamicImage> {
        if let Some(pixels) = &self.pixels {
            return Ok(pixels.clone());
        }

        let path = self.asset.path.clone();
        let decode_err = |e: image::ImageError| ExportError::Io {
            path: path.clone(),
            message: format!("Failed to decode image '{}': {}", self.asset.name, e),
        };

        if let Some(bytes) = &self.packed {
            return ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()?
                .decode()
                .map_err(decode_err);
        }

        if !self.asset.file_exists() {
            return Err(ExportError::ImageNotFound {
                image: self.asset.name.clone(),
                path: self.asset.path.clone(),
            });
        }

        image::open(&self.asset.path).map_err(decode_err)
    }

    fn pixels(&mut self) -> Result<&DynamicImage> {
        let pixels = match self.pixels.take() {
            Some(pixels) => pixels,
            None => self.decode()?,
        };
        Ok(self.pixels.insert(pixels))
    }
}

impl HostImage for FsImage {
    fn asset(&self) -> &ImageAsset {
        &self.asset
    }

    fn asset_mut(&mut self) -> &mut ImageAsset {
        &mut self.asset
    }

    fn persist_as(&mut self, path: &Path, format: ImageFormat) -> Result<()> {
        let quality = self.jpeg_quality;
        let pixels = self.pixels()?;
        let encode_err = |e: image::ImageError| ExportError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        match format {
            ImageFormat::Jpeg => {
                let file = File::create(path).map_err(|e| ExportError::Io {
                    path: path.to_path_buf(),
                    message: format!("Failed to create file: {}", e),
                })?;
                let rgb = pixels.to_rgb8();
                let mut writer = BufWriter::new(file);
                JpegEncoder::new_with_quality(&mut writer, quality)
                    .encode_image(&rgb)
                    .map_err(encode_err)?;
                writer.flush().map_err(|e| ExportError::Io {
                    path: path.to_path_buf(),
                    message: format!("Failed to write JPEG: {}", e),
                })
            }
            ImageFormat::Png
            | ImageFormat::Bmp
            | ImageFormat::Targa
            | ImageFormat::TargaRaw
            | ImageFormat::Tiff => {
                let target = match format {
                    ImageFormat::Png => image::ImageFormat::Png,
                    ImageFormat::Bmp => image::ImageFormat::Bmp,
                    ImageFormat::Tiff => image::ImageFormat::Tiff,
                    _ => image::ImageFormat::Tga,
                };
                pixels.save_with_format(path, target).map_err(encode_err)
            }
            other => Err(ExportError::Encode {
                path: path.to_path_buf(),
                message: format!("no encoder for {}", other),
            }),
        }
    }

    fn pack_into_asset(&mut self) -> Result<()> {
        let bytes = fs::read(&self.asset.path).map_err(|e| ExportError::Io {
            path: self.asset.path.clone(),
            message: format!("Failed to read image for packing: {}", e),
        })?;
        self.packed = Some(bytes);
        self.asset.packed = true;
        // A packed generated image is an ordinary image from now on.
        if self.asset.source == ImageSource::Generated {
            self.asset.source = ImageSource::File;
        }
        Ok(())
    }

    fn packed_bytes(&self) -> Option<&[u8]> {
        self.packed.as_deref()
    }

    fn duplicate(&mut self) -> Result<Self> {
        let pixels = self.pixels()?.clone();
        let mut asset = self.asset.clone();
        asset.name = format!("{}.001", self.asset.name);
        asset.path = Default::default();
        asset.packed = false;
        Ok(Self {
            asset,
            pixels: Some(pixels),
            packed: None,
            jpeg_quality: self.jpeg_quality,
        })
    }

    fn scale(&mut self, width: u32, height: u32) -> Result<()> {
        let resized = self
            .pixels()?
            .resize_exact(width, height, image::imageops::FilterType::Lanczos3);
        self.pixels = Some(resized);
        self.asset.size = (width, height);
        Ok(())
    }

    fn remove(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generated_persists_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gen.png");

        let mut img = FsImage::generated("gen", 3, 2, [255, 0, 0, 128]);
        img.persist_as(&path, ImageFormat::Png).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 128]);
        // Stored metadata untouched
        assert_eq!(img.asset().path.as_os_str(), "");
        assert_eq!(img.asset().format, ImageFormat::Png);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gen.jpg");

        let mut img = FsImage::generated("gen", 4, 4, [0, 0, 255, 10]);
        img.persist_as(&path, ImageFormat::Jpeg).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 4);
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_jpeg_written_completely() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("large.jpg");

        let mut img = FsImage::generated("large", 257, 129, [30, 60, 90, 255]);
        img.persist_as(&path, ImageFormat::Jpeg).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9], "missing end-of-image marker");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (257, 129));
    }

    #[test]
    fn test_pack_reads_file_and_becomes_file_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gen.png");

        let mut img = FsImage::generated("gen", 2, 2, [0, 0, 0, 255]);
        img.persist_as(&path, ImageFormat::Png).unwrap();
        img.asset_mut().path = path.clone();
        img.pack_into_asset().unwrap();

        assert!(img.asset().packed);
        assert_eq!(img.asset().source, ImageSource::File);
        assert_eq!(img.packed_bytes().unwrap(), fs::read(&path).unwrap().as_slice());
    }

    #[test]
    fn test_duplicate_and_scale() {
        let mut img = FsImage::generated("gen", 8, 8, [1, 2, 3, 255]);
        let mut copy = img.duplicate().unwrap();
        copy.scale(2, 4).unwrap();

        assert_eq!(copy.asset().size, (2, 4));
        assert_eq!(img.asset().size, (8, 8));
        copy.remove().unwrap();
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let asset = ImageAsset::new("ghost", ImageSource::File, ImageFormat::Png)
            .with_path("/nonexistent/ghost.png");
        let mut img = FsImage::new(asset);
        let dir = tempdir().unwrap();

        let err = img
            .persist_as(&dir.path().join("ghost.png"), ImageFormat::Png)
            .unwrap_err();
        assert!(matches!(err, ExportError::ImageNotFound { .. }));
    }

    #[test]
    fn test_packed_bytes_decode() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.png");
        FsImage::generated("src", 5, 5, [9, 9, 9, 255])
            .persist_as(&src, ImageFormat::Png)
            .unwrap();

        let asset = ImageAsset::new("packed", ImageSource::File, ImageFormat::Png);
        let mut img = FsImage::packed(asset, fs::read(&src).unwrap());
        let out = dir.path().join("out.bmp");
        img.persist_as(&out, ImageFormat::Bmp).unwrap();

        assert_eq!(image::image_dimensions(&out).unwrap(), (5, 5));
    }
}
