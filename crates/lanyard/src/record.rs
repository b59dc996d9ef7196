//! Upstream card records and the text shown on each card face.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::RecordError;

const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
const HASH_PREFIX_LEN: usize = 8;

/// One upstream data item, bound 1:1 to a card body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    #[serde(default, alias = "id", deserialize_with = "deserialize_identifier")]
    pub identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "city")]
    pub locality: String,
    #[serde(default, alias = "land_size", deserialize_with = "deserialize_size")]
    pub size_value: Option<f64>,
    #[serde(default, alias = "uploaded_at", deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at", deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "ipfs_hash")]
    pub content_hash: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl CardRecord {
    /// Stable key of the record: the identifier, or the content hash when the
    /// feed carries none.
    #[must_use]
    pub fn key(&self) -> &str {
        if self.identifier.is_empty() {
            &self.content_hash
        } else {
            &self.identifier
        }
    }

    /// Checks the fields a card needs to be spawned.
    ///
    /// # Errors
    /// Returns [`RecordError::MissingField`] or [`RecordError::InvalidField`].
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.content_hash.trim().is_empty() {
            return Err(RecordError::MissingField("contentHash"));
        }
        if let Some(size) = self.size_value {
            if !(size.is_finite() && size >= 0.0) {
                return Err(RecordError::InvalidField {
                    field: "sizeValue",
                    reason: format!("{size} is not a non-negative number"),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn label(&self) -> CardLabel {
        CardLabel::from_record(self)
    }
}

/// Parses a feed document, skipping elements that fail to deserialize.
///
/// # Errors
/// Returns [`RecordError::Json`] for unparsable JSON and
/// [`RecordError::NotAList`] when the top level is not an array.
pub fn parse_records(json: &str) -> Result<Vec<CardRecord>, RecordError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(RecordError::NotAList);
    };
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<CardRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping malformed record at index {index}: {e}"),
        }
    }
    Ok(records)
}

/// Feeds disagree on whether ids and sizes are quoted.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn deserialize_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        None => String::new(),
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Integer(n)) => n.to_string(),
        Some(TextOrNumber::Float(x)) => x.to_string(),
    })
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<TextOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        #[allow(clippy::cast_precision_loss)]
        Some(TextOrNumber::Integer(n)) => Ok(Some(n as f64)),
        Some(TextOrNumber::Float(x)) => Ok(Some(x)),
        Some(TextOrNumber::Text(text)) => match text.trim() {
            "" => Ok(None),
            trimmed => trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("size `{trimmed}` is not a number"))),
        },
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp `{text}`"))),
    }
}

/// Accepts RFC 3339, naive ISO date-times (taken as UTC) and bare dates.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Text lines and download target rendered on a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardLabel {
    pub title: String,
    pub locality: String,
    pub size_line: String,
    pub date_line: String,
    pub hash_line: String,
    pub download_url: String,
    pub download_file_name: String,
}

impl CardLabel {
    #[must_use]
    pub fn from_record(record: &CardRecord) -> Self {
        let prefix: String = record.content_hash.chars().take(HASH_PREFIX_LEN).collect();
        let size_line = match record.size_value {
            Some(size) => format!("Size: {size} sq.m"),
            None => String::new(),
        };
        let date_line = record
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        Self {
            title: record.title.clone(),
            locality: record.locality.clone(),
            size_line,
            date_line,
            hash_line: format!("IPFS: {prefix}..."),
            download_url: format!("{IPFS_GATEWAY}{}", record.content_hash),
            download_file_name: format!("property-{prefix}.pdf"),
        }
    }
}
