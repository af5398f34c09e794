//! Level-of-detail settings.
//!
//! A texture may carry a `lod_levels` setting listing lower-resolution
//! variants to export next to the full-size image. The setting is either a
//! JSON string (`"[64, [128, 256]]"`) or a native list; both normalize to a
//! [`LodSpec`] here, once, before anything is written.

use serde_json::{Number, Value};

use crate::error::{ExportError, Result};

use super::TextureReference;

/// One pass of the export loop for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LodTarget {
    /// A resized variant.
    Scaled { width: u32, height: u32 },
    /// The image at its own size.
    FullResolution,
}

/// Ordered list of LOD sizes for one image, low to high quality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LodSpec {
    levels: Vec<(u32, u32)>,
}

impl LodSpec {
    pub fn new(levels: Vec<(u32, u32)>) -> Self {
        Self { levels }
    }

    /// Find the LOD setting among the textures using `image`.
    ///
    /// At most one texture may carry a setting. Two or more is an error
    /// naming the first two, so the user knows which one to clear.
    pub fn resolve(image: &str, references: &[TextureReference]) -> Result<Self> {
        let mut with_settings = references.iter().filter(|t| t.lod_levels.is_some());

        let Some(texture) = with_settings.next() else {
            return Ok(Self::default());
        };

        if let Some(other) = with_settings.next() {
            return Err(ExportError::ConflictingLodSettings {
                image: image.to_string(),
                first: texture.name.clone(),
                second: other.name.clone(),
            });
        }

        let raw = texture.lod_levels.as_ref().unwrap_or(&Value::Null);
        Self::parse(raw).map_err(|message| ExportError::InvalidLodSettings {
            image: image.to_string(),
            texture: texture.name.clone(),
            message,
        })
    }

    /// Parse a raw setting value.
    ///
    /// Strings are decoded as JSON first. Every entry is either a bare
    /// size (square) or a `[width, height]` pair.
    pub fn parse(raw: &Value) -> std::result::Result<Self, String> {
        let decoded;
        let entries = match raw {
            Value::String(s) => {
                decoded = serde_json::from_str::<Value>(s)
                    .map_err(|e| format!("not valid JSON: {}", e))?;
                match &decoded {
                    Value::Array(entries) => entries,
                    other => return Err(format!("expected a list, found {}", other)),
                }
            }
            Value::Array(entries) => entries,
            other => return Err(format!("expected a list or a JSON string, found {}", other)),
        };

        let levels = entries
            .iter()
            .map(parse_level)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { levels })
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[(u32, u32)] {
        &self.levels
    }

    /// Every scaled variant in order, then the full-resolution pass.
    pub fn targets(&self) -> impl Iterator<Item = LodTarget> + '_ {
        self.levels
            .iter()
            .map(|&(width, height)| LodTarget::Scaled { width, height })
            .chain(std::iter::once(LodTarget::FullResolution))
    }
}

fn parse_level(value: &Value) -> std::result::Result<(u32, u32), String> {
    match value {
        Value::Number(n) => {
            let side = dimension(n)?;
            Ok((side, side))
        }
        Value::Array(pair) if pair.len() == 2 => match (&pair[0], &pair[1]) {
            (Value::Number(w), Value::Number(h)) => Ok((dimension(w)?, dimension(h)?)),
            _ => Err(format!("expected [width, height], found {}", value)),
        },
        other => Err(format!("expected a size or [width, height], found {}", other)),
    }
}

fn dimension(n: &Number) -> std::result::Result<u32, String> {
    n.as_u64()
        .filter(|&v| v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("invalid size {}", n))
}
