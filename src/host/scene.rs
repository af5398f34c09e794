//! Scene description files.
//!
//! A scene file lists the images used by an export and the textures that
//! reference them. It stands in for the authoring tool when texport runs
//! from the command line.
//!
//! ```yaml
//! images:
//!   - name: wood
//!     path: textures/wood.png
//!     use_alpha: true
//!   - name: noise
//!     source: GENERATED
//!     size: [64, 64]
//! textures:
//!   - name: WoodDiffuse
//!     image: wood
//!     lod_levels: "[64, [128, 256]]"
//! ```

use std::collections::HashSet;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageReader;
use serde::Deserialize;

use crate::error::{ExportError, Result};
use crate::types::{ImageAsset, ImageFormat, ImageSource, ImageUsers, TextureReference};

use super::{FsImage, HostImage};

/// Fill colour of generated images that don't specify one.
pub const SCENE_IMAGE_DEFAULT_COLOR: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default)]
    images: Vec<ImageDef>,
    #[serde(default)]
    textures: Vec<TextureReference>,
}

#[derive(Debug, Deserialize)]
struct ImageDef {
    name: String,
    #[serde(default = "default_source")]
    source: ImageSource,
    #[serde(default)]
    path: Option<PathBuf>,
    /// Read the file into memory and drop the path.
    #[serde(default)]
    packed: bool,
    #[serde(default)]
    use_alpha: bool,
    #[serde(default)]
    format: Option<ImageFormat>,
    #[serde(default)]
    size: Option<(u32, u32)>,
    #[serde(default)]
    color: Option<[u8; 4]>,
}

fn default_source() -> ImageSource {
    ImageSource::File
}

/// Images and texture references loaded from a scene file.
#[derive(Debug)]
pub struct Scene {
    /// Directory relative image paths are resolved against.
    pub root: PathBuf,
    pub images: Vec<FsImage>,
    pub users: ImageUsers,
}

impl Scene {
    /// Load a scene file. Relative paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ExportError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read scene: {}", e),
        })?;

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self::parse(&content, &root)
    }

    /// Parse a scene from YAML.
    pub fn parse(content: &str, root: &Path) -> Result<Self> {
        let file: SceneFile = serde_yaml::from_str(content).map_err(|e| ExportError::Parse {
            message: format!("Invalid scene: {}", e),
            help: Some("Check the scene file syntax".to_string()),
        })?;

        let mut names = HashSet::new();
        let mut images = Vec::with_capacity(file.images.len());
        for def in file.images {
            if !names.insert(def.name.clone()) {
                return Err(ExportError::Parse {
                    message: format!("Duplicate image name '{}'", def.name),
                    help: Some("Image names must be unique".to_string()),
                });
            }
            images.push(build_image(def, root)?);
        }

        for texture in &file.textures {
            if !names.contains(&texture.image) {
                return Err(ExportError::Parse {
                    message: format!(
                        "Texture '{}' references unknown image '{}'",
                        texture.name, texture.image
                    ),
                    help: None,
                });
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            images,
            users: ImageUsers::from_references(file.textures),
        })
    }

    /// Apply a JPEG quality to every image.
    pub fn set_jpeg_quality(&mut self, quality: u8) {
        for image in &mut self.images {
            image.set_jpeg_quality(quality);
        }
    }
}

fn build_image(def: ImageDef, root: &Path) -> Result<FsImage> {
    let path = def.path.map(|p| if p.is_relative() { root.join(p) } else { p });

    if def.source == ImageSource::Generated {
        let (width, height) = def.size.ok_or_else(|| ExportError::Parse {
            message: format!("Generated image '{}' needs a size", def.name),
            help: Some("Add `size: [width, height]`".to_string()),
        })?;
        let color = def.color.unwrap_or(SCENE_IMAGE_DEFAULT_COLOR);
        let mut image = FsImage::generated(def.name, width, height, color);
        image.asset_mut().use_alpha = def.use_alpha;
        return Ok(image);
    }

    let format = def
        .format
        .or_else(|| {
            path.as_deref()
                .and_then(|p| p.extension())
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .unwrap_or(ImageFormat::Png);

    let mut asset = ImageAsset::new(def.name, def.source, format).with_alpha(def.use_alpha);
    if let Some(path) = &path {
        asset.path = path.clone();
    }

    let is_still = !matches!(def.source, ImageSource::Movie | ImageSource::Viewer);

    if def.packed {
        let Some(path) = path else {
            return Err(ExportError::Parse {
                message: format!("Packed image '{}' needs a path to pack from", asset.name),
                help: None,
            });
        };
        let bytes = fs::read(&path).map_err(|e| ExportError::Io {
            path: path.clone(),
            message: format!("Failed to read image for packing: {}", e),
        })?;
        asset.size = match def.size {
            Some(size) => size,
            None if is_still => ImageReader::new(Cursor::new(&bytes))
                .with_guessed_format()?
                .into_dimensions()
                .map_err(|e| unreadable_size(&asset.name, e))?,
            None => (0, 0),
        };
        asset.path = PathBuf::new();
        return Ok(FsImage::packed(asset, bytes));
    }

    asset.size = match def.size {
        Some(size) => size,
        None if is_still && asset.file_exists() => {
            image::image_dimensions(&asset.path).map_err(|e| unreadable_size(&asset.name, e))?
        }
        None => (0, 0),
    };

    Ok(FsImage::new(asset))
}

fn unreadable_size(name: &str, err: image::ImageError) -> ExportError {
    ExportError::Parse {
        message: format!("Cannot read the size of image '{}': {}", name, err),
        help: Some("Add `size: [width, height]` to the image".to_string()),
    }
}
