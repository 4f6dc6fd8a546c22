use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One court session entry as published by the schedule feed.
///
/// Every field is optional. Anything other than a JSON string (missing,
/// `null`, a number, ...) is read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaseRecord {
    /// ROC date, `YYYMMDD`.
    #[serde(deserialize_with = "lenient_string")]
    pub dudt: Option<String>,
    /// Session time, `HHMM`.
    #[serde(deserialize_with = "lenient_string")]
    pub dutm: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub sys: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub dpt: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub crmyy: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub crmid: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub crmno: Option<String>,
    /// Courtroom name.
    #[serde(deserialize_with = "lenient_string")]
    pub dunm: Option<String>,
    /// Courtroom code.
    #[serde(deserialize_with = "lenient_string")]
    pub ducd: Option<String>,
    /// Session type.
    #[serde(deserialize_with = "lenient_string")]
    pub dukd: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl CaseRecord {
    /// Build a record from an arbitrary JSON value. Non-objects yield an
    /// empty record.
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Extract the record list from a feed payload.
///
/// The proxy and the upstream API wrap the list as `{"data": [...]}`; a
/// snapshot may also be a bare array. Returns `None` when no array is present.
pub fn records_from_payload(payload: &Value) -> Option<Vec<CaseRecord>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(map) => map.get("data")?.as_array()?,
        _ => return None,
    };

    Some(items.iter().map(CaseRecord::from_value).collect())
}
