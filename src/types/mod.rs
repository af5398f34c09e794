//! Core data types for texport.

mod asset;
mod lod;
mod record;
mod texture;

pub use asset::{ImageAsset, ImageFormat, ImageSource};
pub use lod::{LodSpec, LodTarget};
pub use record::{ExportRecord, FormatMap, ImageManifestEntry};
pub use texture::{ImageUsers, TextureReference};
