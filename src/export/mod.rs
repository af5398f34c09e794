//! Texture export pipeline.
//!
//! Turns the images used by a scene into files in a destination directory
//! plus one manifest entry per image:
//!
//! 1. every image is planned: render results are rejected and LOD settings
//!    are resolved, so a bad setting fails before anything is written;
//! 2. generated images are packed as PNG;
//! 3. each image is classified as needing alpha (PNG) or not (JPEG);
//! 4. images are exported in the order given, LOD variants first.
//!
//! Any error aborts the batch. Files already written are left in place.
//!
//! # Example
//!
//! ```ignore
//! use texport::export::{export_images, ExportOptions};
//! use texport::host::Scene;
//!
//! let mut scene = Scene::load("scene.yaml".as_ref())?;
//! let entries = export_images(&mut scene.images, &scene.users, "dist".as_ref(), &ExportOptions::default())?;
//! ```

mod alpha;
mod format;
mod manifest;
mod pack;
pub mod png;

use std::fs;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{ExportError, Result};
use crate::host::HostImage;
use crate::types::{ImageAsset, ImageManifestEntry, ImageSource, ImageUsers, LodSpec};

pub use alpha::{classify_images, requires_alpha};
pub use format::{export_image, ExportPlan};
pub use manifest::ManifestBuilder;
pub use pack::{pack_generated, pack_generated_images};
pub use png::{inspect_png, inspect_png_file, png_file_has_alpha, scan_png_alpha, PngSummary};

/// Settings threaded through the whole pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Legacy behaviour for old scenes: trust the declared alpha flag and
    /// copy stored files instead of converting them.
    ///
    /// Declared-alpha images are never inspected in this mode, so an opaque
    /// image flagged as using alpha is still exported as PNG.
    pub compatibility_mode: bool,
}

impl ExportOptions {
    pub fn compatibility() -> Self {
        Self {
            compatibility_mode: true,
        }
    }
}

/// Create the destination directory if needed.
pub fn prepare_destination(dest: &Path) -> Result<()> {
    if !dest.exists() {
        fs::create_dir_all(dest).map_err(|e| ExportError::Io {
            path: dest.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    } else if !dest.is_dir() {
        return Err(ExportError::DestinationNotDirectory {
            path: dest.to_path_buf(),
        });
    }
    Ok(())
}

/// Export every image and return the manifest entries in image order.
pub fn export_images<I: HostImage>(
    images: &mut [I],
    users: &ImageUsers,
    dest: &Path,
    options: &ExportOptions,
) -> Result<Vec<ImageManifestEntry>> {
    prepare_destination(dest)?;

    let lods = images
        .iter()
        .map(|image| plan_lods(image.asset(), users))
        .collect::<Result<Vec<_>>>()?;

    pack_generated_images(images)?;
    let non_alpha = classify_images(images, options)?;

    if options.compatibility_mode {
        warn!("compatibility mode: declared alpha is trusted and stored files are copied as-is");
    }

    let mut manifest = ManifestBuilder::new();
    for (image, lod) in images.iter_mut().zip(lods) {
        let name = image.asset().name.clone();
        let plan = ExportPlan {
            requires_alpha: !non_alpha.contains(&name),
            lod,
        };

        info!(
            image = %name,
            users = users.get(&name).len(),
            alpha = plan.requires_alpha,
            lod_levels = plan.lod.len(),
            "exporting image"
        );

        let formats = export_image(image, &plan, dest, options)?;
        manifest.push(ImageManifestEntry::texture(name, formats));
    }

    Ok(manifest.finish())
}

/// Like [`export_images`], returning one UTF-8 JSON document per image.
pub fn export_images_encoded<I: HostImage>(
    images: &mut [I],
    users: &ImageUsers,
    dest: &Path,
    options: &ExportOptions,
) -> Result<Vec<Vec<u8>>> {
    let entries = export_images(images, users, dest, options)?;
    ManifestBuilder::from_entries(entries).to_json_records()
}

fn plan_lods(asset: &ImageAsset, users: &ImageUsers) -> Result<LodSpec> {
    if asset.source == ImageSource::Viewer {
        return Err(ExportError::ViewerImageUnsupported {
            image: asset.name.clone(),
        });
    }

    let lod = LodSpec::resolve(&asset.name, users.get(&asset.name))?;
    if !lod.is_empty() {
        debug!(image = %asset.name, levels = ?lod.levels(), "lod levels");
    }
    Ok(lod)
}

/// A temporary `.png` path, deleted when the handle drops.
pub(crate) fn temp_png(image_name: &str) -> Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix("texport-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| ExportError::Io {
            path: std::env::temp_dir(),
            message: format!("Failed to create temporary file for '{}': {}", image_name, e),
        })
}
