//! Texture slots referencing images.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A material-level texture slot pointing at an image.
///
/// Images carry no custom settings of their own, so per-image export
/// settings such as `lod_levels` live on the textures that use them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureReference {
    /// Texture name.
    pub name: String,
    /// Name of the referenced image.
    pub image: String,
    /// Raw LOD setting: either a JSON-encoded string or a native list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lod_levels: Option<serde_json::Value>,
}

impl TextureReference {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            lod_levels: None,
        }
    }

    pub fn with_lod_levels(mut self, lod_levels: serde_json::Value) -> Self {
        self.lod_levels = Some(lod_levels);
        self
    }
}

/// Texture references grouped by the image they point at.
#[derive(Debug, Clone, Default)]
pub struct ImageUsers {
    users: BTreeMap<String, Vec<TextureReference>>,
}

impl ImageUsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group references by image, keeping their order within each image.
    pub fn from_references(references: impl IntoIterator<Item = TextureReference>) -> Self {
        let mut users = Self::new();
        for reference in references {
            users.add(reference);
        }
        users
    }

    pub fn add(&mut self, reference: TextureReference) {
        self.users
            .entry(reference.image.clone())
            .or_default()
            .push(reference);
    }

    /// References for an image; empty when nothing uses it.
    pub fn get(&self, image: &str) -> &[TextureReference] {
        self.users.get(image).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<TextureReference>)> {
        self.users.iter()
    }
}
