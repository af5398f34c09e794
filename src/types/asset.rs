//! Image asset metadata as seen by the export pipeline.
//!
//! The host scene owns the pixels; this module only describes them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where the pixels of an image come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageSource {
    /// A single image file, on disk or packed into the scene.
    File,
    /// Procedurally generated pixels with no file behind them.
    Generated,
    /// A movie container.
    Movie,
    /// A render result or compositor viewer buffer.
    Viewer,
    /// A numbered image sequence.
    Sequence,
    /// A tiled (UDIM) image set.
    Tiled,
}

impl ImageSource {
    pub fn name(&self) -> &'static str {
        match self {
            ImageSource::File => "FILE",
            ImageSource::Generated => "GENERATED",
            ImageSource::Movie => "MOVIE",
            ImageSource::Viewer => "VIEWER",
            ImageSource::Sequence => "SEQUENCE",
            ImageSource::Tiled => "TILED",
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Encoding format of an image, either as stored or as exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Jpeg2000,
    Bmp,
    Targa,
    TargaRaw,
    Tiff,
    OpenExr,
    Hdr,
    Webp,
    Ffmpeg,
    AviJpeg,
    AviRaw,
}

impl ImageFormat {
    /// Host-side format name, e.g. "PNG" or "OPEN_EXR".
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Jpeg2000 => "JPEG2000",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Targa => "TARGA",
            ImageFormat::TargaRaw => "TARGA_RAW",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::OpenExr => "OPEN_EXR",
            ImageFormat::Hdr => "HDR",
            ImageFormat::Webp => "WEBP",
            ImageFormat::Ffmpeg => "FFMPEG",
            ImageFormat::AviJpeg => "AVI_JPEG",
            ImageFormat::AviRaw => "AVI_RAW",
        }
    }

    /// Manifest key for records of this format ("jpeg", "png", ...).
    pub fn key(&self) -> String {
        self.name().to_lowercase()
    }

    /// Canonical file extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Jpeg2000 => "jp2",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Targa | ImageFormat::TargaRaw => "tga",
            ImageFormat::Tiff => "tif",
            ImageFormat::OpenExr => "exr",
            ImageFormat::Hdr => "hdr",
            ImageFormat::Webp => "webp",
            ImageFormat::Ffmpeg => "mp4",
            ImageFormat::AviJpeg | ImageFormat::AviRaw => "avi",
        }
    }

    /// Guess the stored format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "jp2" | "j2c" => Some(ImageFormat::Jpeg2000),
            "bmp" => Some(ImageFormat::Bmp),
            "tga" => Some(ImageFormat::Targa),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "exr" => Some(ImageFormat::OpenExr),
            "hdr" => Some(ImageFormat::Hdr),
            "webp" => Some(ImageFormat::Webp),
            "mp4" | "mkv" | "mov" | "webm" | "ogv" => Some(ImageFormat::Ffmpeg),
            "avi" => Some(ImageFormat::AviJpeg),
            _ => None,
        }
    }

    /// Formats that never carry an alpha channel as far as export is concerned.
    pub fn is_opaque(&self) -> bool {
        matches!(self, ImageFormat::Jpeg | ImageFormat::Tiff)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Metadata for one image in the host scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    /// Unique image name; also the stem of every exported file.
    pub name: String,
    pub source: ImageSource,
    /// Stored file path. Empty when the image has no file.
    pub path: PathBuf,
    /// Whether the pixel bytes are embedded in the scene.
    pub packed: bool,
    /// Pixel dimensions (width, height).
    pub size: (u32, u32),
    /// Declared alpha usage.
    pub use_alpha: bool,
    /// Currently stored encoding.
    pub format: ImageFormat,
    /// Extension the image was last exported with. Read by legacy consumers
    /// that build file names from the image name.
    pub exported_extension: Option<String>,
}

impl ImageAsset {
    pub fn new(name: impl Into<String>, source: ImageSource, format: ImageFormat) -> Self {
        Self {
            name: name.into(),
            source,
            path: PathBuf::new(),
            packed: false,
            size: (0, 0),
            use_alpha: false,
            format,
            exported_extension: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_alpha(mut self, use_alpha: bool) -> Self {
        self.use_alpha = use_alpha;
        self
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    /// Whether the stored path points at an existing regular file.
    pub fn file_exists(&self) -> bool {
        !self.path.as_os_str().is_empty() && self.path.is_file()
    }

    /// Whether there are any bytes to export, on disk or packed.
    pub fn has_data(&self) -> bool {
        self.file_exists() || self.packed
    }

    /// The actual extension of the stored path, falling back to the
    /// canonical extension of the stored format.
    pub fn stored_extension(&self) -> String {
        stored_extension(&self.path).unwrap_or_else(|| self.format.extension().to_string())
    }
}

fn stored_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_string())
}
