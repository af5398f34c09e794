//! Manifest output values.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One exported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    /// Manifest key of the format; serialized as the map key, not here.
    #[serde(skip)]
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub file_size: u64,
}

/// Exported records grouped by format, in the order they were produced.
///
/// Within a format the list runs from low to high quality, which is the
/// order LOD variants are exported in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatMap {
    entries: Vec<(String, Vec<ExportRecord>)>,
}

impl FormatMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record under its format key.
    pub fn push(&mut self, record: ExportRecord) {
        match self.entries.iter_mut().find(|(key, _)| *key == record.format) {
            Some((_, records)) => records.push(record),
            None => self.entries.push((record.format.clone(), vec![record])),
        }
    }

    pub fn get(&self, format: &str) -> Option<&[ExportRecord]> {
        self.entries
            .iter()
            .find(|(key, _)| key == format)
            .map(|(_, records)| records.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ExportRecord])> {
        self.entries
            .iter()
            .map(|(key, records)| (key.as_str(), records.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of records across all formats.
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(|(_, records)| records.len()).sum()
    }
}

impl Serialize for FormatMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, records) in &self.entries {
            map.serialize_entry(key, records)?;
        }
        map.end()
    }
}

/// Manifest entry for one exported image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageManifestEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub formats: FormatMap,
    /// Null: taken from the material.
    pub wrap: Option<String>,
    pub filter: Option<String>,
    /// Null: decided by a later stage.
    pub use_mipmap: Option<bool>,
}

impl ImageManifestEntry {
    pub fn texture(name: impl Into<String>, formats: FormatMap) -> Self {
        Self {
            kind: "TEXTURE".to_string(),
            name: name.into(),
            formats,
            wrap: None,
            filter: None,
            use_mipmap: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(format: &str, width: u32, file_name: &str) -> ExportRecord {
        ExportRecord {
            format: format.to_string(),
            width,
            height: width,
            file_name: file_name.to_string(),
            file_size: 10,
        }
    }

    #[test]
    fn test_push_groups_by_format_in_order() {
        let mut formats = FormatMap::new();
        formats.push(record("png", 64, "a-64x64.png"));
        formats.push(record("jpeg", 32, "a-32x32.jpg"));
        formats.push(record("png", 128, "a.png"));

        assert_eq!(formats.keys().collect::<Vec<_>>(), vec!["png", "jpeg"]);
        let png: Vec<u32> = formats.get("png").unwrap().iter().map(|r| r.width).collect();
        assert_eq!(png, vec![64, 128]);
        assert_eq!(formats.record_count(), 3);
    }

    #[test]
    fn test_entry_serializes_manifest_shape() {
        let mut formats = FormatMap::new();
        formats.push(record("jpeg", 4, "wood.jpg"));
        let entry = ImageManifestEntry::texture("wood", formats);

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "TEXTURE",
                "name": "wood",
                "formats": {
                    "jpeg": [
                        {"width": 4, "height": 4, "file_name": "wood.jpg", "file_size": 10}
                    ]
                },
                "wrap": null,
                "filter": null,
                "use_mipmap": null
            })
        );
    }

    #[test]
    fn test_serialized_keys_keep_insertion_order() {
        let mut formats = FormatMap::new();
        formats.push(record("png", 1, "b.png"));
        formats.push(record("jpeg", 1, "b.jpg"));

        let json = serde_json::to_string(&formats).unwrap();
        assert!(json.find("\"png\"").unwrap() < json.find("\"jpeg\"").unwrap());
    }
}
