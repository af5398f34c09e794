use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for texport operations
#[derive(Error, Diagnostic, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    #[diagnostic(code(texport::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(texport::io))]
    Io { path: PathBuf, message: String },

    #[error("Parse error: {message}")]
    #[diagnostic(code(texport::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to encode {path}: {message}")]
    #[diagnostic(code(texport::encode))]
    Encode { path: PathBuf, message: String },

    #[error("Destination path is not a directory: {path}")]
    #[diagnostic(
        code(texport::destination),
        help("Remove the file or choose another output directory")
    )]
    DestinationNotDirectory { path: PathBuf },

    #[error("Image '{image}' is a render result and cannot be exported")]
    #[diagnostic(
        code(texport::viewer),
        help("Save the render result as an image file first")
    )]
    ViewerImageUnsupported { image: String },

    #[error("Image source not supported: {image} source: {source_kind}")]
    #[diagnostic(code(texport::source))]
    UnsupportedImageSource { image: String, source_kind: String },

    #[error("Image not found: {image} path: {path}")]
    #[diagnostic(
        code(texport::not_found),
        help("Check the image path or pack the image into the scene")
    )]
    ImageNotFound { image: String, path: PathBuf },

    #[error("There are several textures with settings for image {image}: {first} and {second}")]
    #[diagnostic(
        code(texport::lod_conflict),
        help("Remove the lod_levels setting from one of them")
    )]
    ConflictingLodSettings {
        image: String,
        first: String,
        second: String,
    },

    #[error("Invalid lod_levels on texture {texture} (image {image}): {message}")]
    #[diagnostic(
        code(texport::lod_parse),
        help("Use a list of sizes, e.g. [64, [128, 256]]")
    )]
    InvalidLodSettings {
        image: String,
        texture: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;
