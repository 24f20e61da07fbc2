use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Text field that reads `null` and non-string values as empty.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Identifier field: strings are trimmed, numbers become their decimal
/// text, anything else is empty.
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// One photographed item, keyed by the identifier the upstream photo
/// service assigned to it.
///
/// Every field defaults to empty so partial candidates from the fetcher
/// deserialize cleanly; `null` or a value of the wrong JSON type also
/// reads as empty. Keys this struct does not know about are kept in
/// `extra` and written back on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoRecord {
    #[serde(alias = "imagn_id", deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub image_url: String,
    #[serde(deserialize_with = "lenient_text")]
    pub thumbnail_url: String,
    #[serde(deserialize_with = "lenient_text")]
    pub headline: String,
    #[serde(deserialize_with = "lenient_text")]
    pub caption: String,
    #[serde(deserialize_with = "lenient_text")]
    pub photographer: String,
    #[serde(deserialize_with = "lenient_text")]
    pub source: String,
    #[serde(deserialize_with = "lenient_text")]
    pub photo_date: String,
    #[serde(deserialize_with = "lenient_text")]
    pub player_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub player_slug: String,
    #[serde(deserialize_with = "lenient_text")]
    pub brand_slug: String,
    #[serde(deserialize_with = "lenient_text")]
    pub keywords: String,
    #[serde(deserialize_with = "lenient_text")]
    pub added_at: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PhotoRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Text scanned for brand keywords.
    pub fn brand_text(&self) -> String {
        format!("{} {}", self.headline, self.caption).to_lowercase()
    }

    /// The plain-text fields that take part in fill-forward merge. `id`,
    /// `added_at` and the derived slugs are handled separately.
    pub(crate) fn mergeable_fields_mut(&mut self) -> [&mut String; 9] {
        [
            &mut self.image_url,
            &mut self.thumbnail_url,
            &mut self.headline,
            &mut self.caption,
            &mut self.photographer,
            &mut self.source,
            &mut self.photo_date,
            &mut self.player_name,
            &mut self.keywords,
        ]
    }

    pub(crate) fn mergeable_fields(&self) -> [&String; 9] {
        [
            &self.image_url,
            &self.thumbnail_url,
            &self.headline,
            &self.caption,
            &self.photographer,
            &self.source,
            &self.photo_date,
            &self.player_name,
            &self.keywords,
        ]
    }
}

pub fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
