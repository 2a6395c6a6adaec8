//! Data models flowing through the pipeline

use serde::{Deserialize, Serialize};

/// The image currently held by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Data URI as received (`data:<mime>;base64,<payload>`)
    pub data: String,
    /// Length of `data` in bytes
    pub length: usize,
}

impl StoredImage {
    pub fn new(data: String) -> Self {
        let length = data.len();
        Self { data, length }
    }
}

/// Locale parameters sent with every search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLocale {
    pub location: String,
    /// Interface language, e.g. `en`
    pub language: String,
    /// Country, e.g. `us`
    pub country: String,
    pub domain: String,
}

impl Default for SearchLocale {
    fn default() -> Self {
        Self {
            location: "Menlo Park, California, United States".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
            domain: "google.com".to_string(),
        }
    }
}

impl From<&crate::config::SearchConfig> for SearchLocale {
    fn from(config: &crate::config::SearchConfig) -> Self {
        Self {
            location: config.location.clone(),
            language: config.hl.clone(),
            country: config.gl.clone(),
            domain: config.google_domain.clone(),
        }
    }
}

/// A free-text query plus its locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub locale: SearchLocale,
}

/// One raw shopping listing as the provider sends it
///
/// Every field is optional and unknown fields are ignored. A field that is
/// present with an unexpected JSON type is treated the same as a missing one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProductEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub extracted_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: Option<String>,
}

impl RawProductEntry {
    /// Build an entry from arbitrary JSON; a non-object becomes an all-empty entry
    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Canonical product shape returned to callers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub seller: Option<String>,
    pub product_name: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub location: Option<String>,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
    }
}
