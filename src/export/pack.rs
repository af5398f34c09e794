//! Packing of generated images.
//!
//! Generated images have no bytes to copy or probe, so they are saved as
//! PNG and packed into the scene before export. The temporary PNG only
//! lives for the duration of the pack.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{ExportError, Result};
use crate::host::HostImage;
use crate::types::{ImageFormat, ImageSource};

use super::temp_png;

/// Pack a generated image as PNG. Other images are left alone.
pub fn pack_generated<I: HostImage>(image: &mut I) -> Result<()> {
    if image.asset().source != ImageSource::Generated {
        return Ok(());
    }

    let name = image.asset().name.clone();
    debug!(image = %name, "packing generated image as png");

    let temp = temp_png(&name)?;
    image.persist_as(temp.path(), ImageFormat::Png)?;

    let asset = image.asset_mut();
    asset.path = temp.path().to_path_buf();
    asset.format = ImageFormat::Png;

    let packed = image.pack_into_asset();
    image.asset_mut().path = PathBuf::new();
    packed?;

    temp.close().map_err(|e| ExportError::Io {
        path: std::env::temp_dir(),
        message: format!("Failed to remove temporary file for '{}': {}", name, e),
    })
}

/// Pack every generated image. Returns how many were packed.
pub fn pack_generated_images<I: HostImage>(images: &mut [I]) -> Result<usize> {
    let mut count = 0;
    for image in images.iter_mut() {
        if image.asset().source == ImageSource::Generated {
            pack_generated(image)?;
            count += 1;
        }
    }
    Ok(count)
}
