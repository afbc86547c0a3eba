//! BLS timeseries API response schema
//!
//! Every field is optional at every depth. A field of the wrong JSON type
//! deserializes as absent instead of failing the whole body, so partial
//! responses still yield whatever series they carry.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Status string BLS returns for a fully successful request
pub const REQUEST_SUCCEEDED: &str = "REQUEST_SUCCEEDED";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlsResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub message: Vec<String>,
    #[serde(rename = "Results", default, deserialize_with = "lenient")]
    pub results: Option<BlsResults>,
}

impl BlsResponse {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some(REQUEST_SUCCEEDED)
    }

    /// Series entries, empty when `Results` is missing or malformed
    pub fn series(&self) -> &[BlsSeries] {
        self.results
            .as_ref()
            .map(|r| r.series.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlsResults {
    #[serde(default, deserialize_with = "lenient_list")]
    pub series: Vec<BlsSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlsSeries {
    #[serde(rename = "seriesID", default, deserialize_with = "lenient_text")]
    pub series_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub data: Vec<BlsDataPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlsDataPoint {
    #[serde(default, deserialize_with = "lenient_text")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub period: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: Option<String>,
}

impl BlsDataPoint {
    pub fn year(&self) -> Option<i32> {
        self.year.as_deref().and_then(|y| y.trim().parse().ok())
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Arrays keep their well-formed elements; anything else is empty
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn as_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_text(Value::deserialize(deserializer)?))
}

fn lenient_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(as_text).collect(),
        other => as_text(other).into_iter().collect(),
    })
}
