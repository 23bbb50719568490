use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// SKU details as returned by the catalog API
///
/// Only the fields the updater reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkuDetails {
    #[serde(rename = "ProductName", default)]
    pub product_name: Option<String>,

    #[serde(rename = "NameComplete", default)]
    pub name_complete: Option<String>,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "RefId", default)]
    pub ref_id: Option<Value>,
}

impl SkuDetails {
    /// Returns the first non-empty name among ProductName, NameComplete and Name
    pub fn display_name(&self) -> Option<&str> {
        [&self.product_name, &self.name_complete, &self.name]
            .into_iter()
            .filter_map(|candidate| candidate.as_deref())
            .find(|candidate| !candidate.is_empty())
    }

    /// Returns the reference code rendered as text, if present
    pub fn reference(&self) -> Option<String> {
        match &self.ref_id {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// One image attached to a SKU
///
/// Fields other than the identifier and the two label fields are kept in
/// `extra` untouched, so writing a record back sends the remote everything it
/// originally returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "Id")]
    pub id: i64,

    #[serde(rename = "Label", default)]
    pub label: Option<String>,

    #[serde(rename = "Text", default)]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageRecord {
    /// Returns true if the image carries a non-blank label
    pub fn has_label(&self) -> bool {
        self.label
            .as_deref()
            .map(|label| !label.trim().is_empty())
            .unwrap_or(false)
    }

    /// Returns true if the label already equals the target alt text
    pub fn label_matches(&self, alt_text: &str) -> bool {
        self.label.as_deref().unwrap_or("") == alt_text
    }

    /// Returns a copy with both label fields replaced by `alt_text`
    pub fn with_alt_text(&self, alt_text: &str) -> Self {
        Self {
            label: Some(alt_text.to_string()),
            text: Some(alt_text.to_string()),
            ..self.clone()
        }
    }
}
