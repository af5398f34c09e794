//! texport - Texture exporter for runtime asset bundles
//!
//! Exports the images used by a scene into web-friendly files (PNG when the
//! image needs alpha, JPEG otherwise, plus resized LOD variants) and builds
//! a manifest describing every file written.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod host;
pub mod output;
pub mod types;

pub use config::{ExportConfig, CONFIG_FILENAME};
pub use error::{ExportError, Result};
pub use export::{
    export_image, export_images, export_images_encoded, inspect_png, requires_alpha,
    scan_png_alpha, ExportOptions, ExportPlan, ManifestBuilder, PngSummary,
};
pub use host::{FsImage, HostImage, Scene};
pub use types::{
    ExportRecord, FormatMap, ImageAsset, ImageFormat, ImageManifestEntry, ImageSource, ImageUsers,
    LodSpec, LodTarget, TextureReference,
};
