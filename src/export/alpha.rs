//! Alpha classification.
//!
//! Images declaring alpha usage are only exported as PNG when their data
//! actually carries alpha. Everything else goes out as JPEG.

use std::collections::HashSet;
use std::io::Cursor;

use tracing::debug;

use crate::error::Result;
use crate::host::HostImage;
use crate::types::ImageFormat;

use super::png::{png_file_has_alpha, scan_png_alpha, PNG_SIGNATURE};
use super::{temp_png, ExportOptions};

/// Whether the exported image must keep an alpha channel.
pub fn requires_alpha<I: HostImage>(image: &mut I, options: &ExportOptions) -> Result<bool> {
    let asset = image.asset();

    if !asset.use_alpha {
        return Ok(false);
    }
    if options.compatibility_mode {
        debug!(image = %asset.name, "compatibility mode: trusting declared alpha");
        return Ok(true);
    }
    if asset.format.is_opaque() {
        debug!(image = %asset.name, format = %asset.format, "format carries no alpha");
        return Ok(false);
    }

    if asset.format == ImageFormat::Png && asset.file_exists() {
        return png_file_has_alpha(&asset.path);
    }

    if let Some(bytes) = image.packed_bytes() {
        if let Some(body) = bytes.strip_prefix(&PNG_SIGNATURE[..]) {
            return scan_png_alpha(&mut Cursor::new(body));
        }
    }

    if !asset.has_data() {
        // Nothing to inspect; the exporter reports the missing image.
        return Ok(true);
    }

    let name = asset.name.clone();
    let temp = temp_png(&name)?;
    image.persist_as(temp.path(), ImageFormat::Png)?;
    let has_alpha = png_file_has_alpha(temp.path())?;
    debug!(image = %name, has_alpha, "probed re-encoded image");
    Ok(has_alpha)
}

/// Names of the images that can be exported without alpha.
pub fn classify_images<I: HostImage>(
    images: &mut [I],
    options: &ExportOptions,
) -> Result<HashSet<String>> {
    let mut non_alpha = HashSet::new();
    for image in images.iter_mut() {
        if !requires_alpha(image, options)? {
            non_alpha.insert(image.asset().name.clone());
        }
    }
    Ok(non_alpha)
}
