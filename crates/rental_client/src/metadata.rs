//! Off-chain property metadata.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ClientError;

/// Metadata document referenced by a property's URI. Every field is
/// optional; unknown fields are ignored and a field of the wrong type reads
/// as absent instead of rejecting the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyMetadata {
    #[serde(deserialize_with = "lenient::text")]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::attributes")]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub trait_type: String,
    #[serde(default)]
    pub value: Option<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Flag(b) => write!(f, "{}", b),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl PropertyMetadata {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// First attribute whose `trait_type` matches, ignoring ASCII case.
    pub fn attribute(&self, trait_type: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.trait_type.eq_ignore_ascii_case(trait_type))
            .and_then(|a| a.value.as_ref())
    }

    /// First match among several spellings of the same trait.
    pub fn attribute_any(&self, trait_types: &[&str]) -> Option<&AttributeValue> {
        trait_types.iter().find_map(|t| self.attribute(t))
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed property")
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{Attribute, AttributeValue};

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    /// Entries that are not objects are skipped.
    pub fn attributes<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Attribute>, D::Error> {
        let items = match Value::deserialize(d)? {
            Value::Array(items) => items,
            _ => return Ok(Vec::new()),
        };
        Ok(items.into_iter().filter_map(attribute).collect())
    }

    fn attribute(item: Value) -> Option<Attribute> {
        let mut fields = match item {
            Value::Object(fields) => fields,
            _ => return None,
        };
        let trait_type = match fields.remove("trait_type") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let value = fields.remove("value").and_then(value);
        Some(Attribute { trait_type, value })
    }

    fn value(v: Value) -> Option<AttributeValue> {
        match v {
            Value::String(s) => Some(AttributeValue::Text(s)),
            Value::Number(n) => n.as_f64().map(AttributeValue::Number),
            Value::Bool(b) => Some(AttributeValue::Flag(b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    client: reqwest::Client,
}

impl MetadataFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Ledger {
                message: format!("could not build HTTP client: {}", e),
            })?;
        Ok(MetadataFetcher { client })
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, uri: &str) -> Result<PropertyMetadata, ClientError> {
        let failed = |message: String| ClientError::MetadataFetchFailed {
            uri: uri.to_string(),
            message,
        };

        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {}", status)));
        }
        let body = response.bytes().await.map_err(|e| failed(e.to_string()))?;
        let metadata = PropertyMetadata::from_slice(&body)
            .map_err(|e| failed(format!("not a metadata document: {}", e)))?;

        debug!(name = ?metadata.name, attributes = metadata.attributes.len(), "Fetched metadata");
        Ok(metadata)
    }
}
