//! Per-image export.
//!
//! Still images go out as JPEG, or PNG when they need alpha. Each LOD level
//! becomes a resized copy named `{name}-{w}x{h}.{ext}`; the full-size image
//! is `{name}.{ext}`, copied byte for byte when the stored file already has
//! the right format and re-encoded otherwise. Movies are copied as-is.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{ExportError, Result};
use crate::host::HostImage;
use crate::types::{ExportRecord, FormatMap, ImageFormat, ImageSource, LodSpec, LodTarget};

use super::ExportOptions;

/// What to produce for one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPlan {
    pub lod: LodSpec,
    pub requires_alpha: bool,
}

impl ExportPlan {
    /// Target format and canonical extension for still images.
    pub fn target(&self) -> (ImageFormat, &'static str) {
        if self.requires_alpha {
            (ImageFormat::Png, "png")
        } else {
            (ImageFormat::Jpeg, "jpg")
        }
    }
}

/// Export one image into `dest`, returning its records by format.
pub fn export_image<I: HostImage>(
    image: &mut I,
    plan: &ExportPlan,
    dest: &Path,
    options: &ExportOptions,
) -> Result<FormatMap> {
    let source = image.asset().source;
    match source {
        ImageSource::File => export_still(image, plan, dest, options),
        ImageSource::Movie if image.asset().file_exists() => export_movie(image, dest),
        ImageSource::Viewer => Err(ExportError::ViewerImageUnsupported {
            image: image.asset().name.clone(),
        }),
        other => Err(ExportError::UnsupportedImageSource {
            image: image.asset().name.clone(),
            source_kind: other.to_string(),
        }),
    }
}

fn export_still<I: HostImage>(
    image: &mut I,
    plan: &ExportPlan,
    dest: &Path,
    options: &ExportOptions,
) -> Result<FormatMap> {
    let (format, ext) = plan.target();
    let mut formats = FormatMap::new();

    for target in plan.lod.targets() {
        let asset = image.asset();
        if !asset.has_data() {
            return Err(ExportError::ImageNotFound {
                image: asset.name.clone(),
                path: asset.path.clone(),
            });
        }

        let copy = target == LodTarget::FullResolution
            && (asset.format == format || options.compatibility_mode);

        image.asset_mut().exported_extension = Some(ext.to_string());

        let record = match target {
            LodTarget::FullResolution if copy => {
                let record = copy_original(image, format, ext, dest)?;
                if options.compatibility_mode {
                    // Legacy consumers read the stored extension back.
                    let stored = image.asset().stored_extension();
                    image.asset_mut().exported_extension = Some(stored);
                }
                record
            }
            LodTarget::Scaled { width, height } => {
                export_scaled(image, format, ext, width, height, dest)?
            }
            LodTarget::FullResolution => reencode(image, format, ext, dest)?,
        };

        formats.push(record);
    }

    Ok(formats)
}

fn copy_original<I: HostImage>(
    image: &I,
    format: ImageFormat,
    ext: &str,
    dest: &Path,
) -> Result<ExportRecord> {
    let asset = image.asset();
    let file_name = format!("{}.{}", asset.name, ext);
    let out = dest.join(&file_name);

    if asset.file_exists() {
        fs::copy(&asset.path, &out).map_err(|e| ExportError::Io {
            path: out.clone(),
            message: format!("Failed to copy {}: {}", asset.path.display(), e),
        })?;
    } else {
        let bytes = image.packed_bytes().ok_or_else(|| ExportError::ImageNotFound {
            image: asset.name.clone(),
            path: asset.path.clone(),
        })?;
        fs::write(&out, bytes).map_err(|e| ExportError::Io {
            path: out.clone(),
            message: format!("Failed to write packed image: {}", e),
        })?;
    }

    info!(image = %asset.name, file = %file_name, "copied original image");
    record(format, asset.size, file_name, &out)
}

fn export_scaled<I: HostImage>(
    image: &mut I,
    format: ImageFormat,
    ext: &str,
    width: u32,
    height: u32,
    dest: &Path,
) -> Result<ExportRecord> {
    let name = image.asset().name.clone();
    let file_name = format!("{}-{}x{}.{}", name, width, height, ext);
    let out = dest.join(&file_name);

    let mut resized = image.duplicate()?;
    let saved = resized
        .scale(width, height)
        .and_then(|_| resized.persist_as(&out, format));
    let removed = resized.remove();
    saved?;
    removed?;

    info!(image = %name, file = %file_name, "exported resized image as {}", format);
    record(format, (width, height), file_name, &out)
}

fn reencode<I: HostImage>(
    image: &mut I,
    format: ImageFormat,
    ext: &str,
    dest: &Path,
) -> Result<ExportRecord> {
    let name = image.asset().name.clone();
    let size = image.asset().size;
    let file_name = format!("{}.{}", name, ext);
    let out = dest.join(&file_name);

    image.persist_as(&out, format)?;

    info!(image = %name, file = %file_name, "exported image as {}", format);
    record(format, size, file_name, &out)
}

fn export_movie<I: HostImage>(image: &mut I, dest: &Path) -> Result<FormatMap> {
    let asset = image.asset();
    let ext = asset.stored_extension();
    let file_name = format!("{}.{}", asset.name, ext);
    let out = dest.join(&file_name);

    fs::copy(&asset.path, &out).map_err(|e| ExportError::Io {
        path: out.clone(),
        message: format!("Failed to copy {}: {}", asset.path.display(), e),
    })?;
    info!(image = %asset.name, file = %file_name, "copied original video");

    let mut formats = FormatMap::new();
    formats.push(record(asset.format, asset.size, file_name, &out)?);
    image.asset_mut().exported_extension = Some(ext);
    Ok(formats)
}

fn record(
    format: ImageFormat,
    (width, height): (u32, u32),
    file_name: String,
    written: &Path,
) -> Result<ExportRecord> {
    let file_size = fs::metadata(written)
        .map_err(|e| ExportError::Io {
            path: written.to_path_buf(),
            message: format!("Failed to stat exported file: {}", e),
        })?
        .len();

    Ok(ExportRecord {
        format: format.key(),
        width,
        height,
        file_name,
        file_size,
    })
}
