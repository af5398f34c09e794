//! Host scene access.
//!
//! The export pipeline never touches pixels directly. Everything it needs
//! from the authoring tool goes through [`HostImage`], so the same pipeline
//! drives an in-process scene or the filesystem-backed [`FsImage`] used by
//! the command line.

mod fs;
mod scene;
#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

use crate::error::Result;
use crate::types::{ImageAsset, ImageFormat};

pub use fs::{FsImage, DEFAULT_JPEG_QUALITY};
pub use scene::{Scene, SCENE_IMAGE_DEFAULT_COLOR};

/// Capabilities the pipeline needs from a host image.
pub trait HostImage: Sized {
    /// Current metadata.
    fn asset(&self) -> &ImageAsset;

    /// Mutable metadata, for path/format overrides and annotations.
    fn asset_mut(&mut self) -> &mut ImageAsset;

    /// Encode the current pixels to `path` as `format`.
    ///
    /// The stored path and format of the asset are left as they were.
    fn persist_as(&mut self, path: &Path, format: ImageFormat) -> Result<()>;

    /// Embed the file at the asset's current path into the scene.
    fn pack_into_asset(&mut self) -> Result<()>;

    /// Embedded bytes, if the image is packed.
    fn packed_bytes(&self) -> Option<&[u8]>;

    /// A transient copy of the image, to be disposed with [`HostImage::remove`].
    fn duplicate(&mut self) -> Result<Self>;

    /// Resample the pixels to the given size.
    fn scale(&mut self, width: u32, height: u32) -> Result<()>;

    /// Dispose of a transient image.
    fn remove(self) -> Result<()>;
}
