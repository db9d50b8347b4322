// SPDX-License-Identifier: AGPL-3.0-only
// Event payloads accepted by the handler and their resolution into a single
// obfuscation request.

use pii_obfuscator::parse_field_list;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("invalid event: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("event must contain 'file_to_obfuscate' and 'pii_fields'")]
    MissingParameters,
}

/// Either a direct invocation (`file_to_obfuscate`, `pii_fields`,
/// `primary_key`) or a storage notification carrying `detail.bucket.name`
/// and `detail.object.key`.  Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct Event {
    #[serde(default)]
    file_to_obfuscate: Option<String>,
    #[serde(default)]
    pii_fields: Option<FieldList>,
    #[serde(default)]
    primary_key: Option<String>,
    #[serde(default)]
    detail: Option<Detail>,
}

/// PII fields arrive as a JSON list, though a comma-separated string is
/// tolerated.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldList {
    List(Vec<String>),
    Joined(String),
}

impl FieldList {
    fn into_fields(self) -> Vec<String> {
        match self {
            FieldList::List(fields) => fields
                .into_iter()
                .map(|field| field.trim().to_string())
                .filter(|field| !field.is_empty())
                .collect(),
            FieldList::Joined(raw) => parse_field_list(&raw),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Detail {
    bucket: Bucket,
    object: Object,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Object {
    key: String,
}

/// Handler configuration used to fill gaps in notification events.
#[derive(Debug, Clone, Default)]
pub struct Fallbacks {
    pub pii_fields: Vec<String>,
    pub primary_key: Option<String>,
}

/// A fully resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub locator: String,
    pub pii_fields: Vec<String>,
    pub primary_key: Option<String>,
}

/// Reply printed once the result has been stored.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub message: String,
}

impl Response {
    pub fn saved(key: &str) -> Self {
        Self {
            status: 200,
            message: format!("File {key} successfully obfuscated and saved."),
        }
    }
}

impl Event {
    pub fn from_json(text: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolve the locator, PII list and primary key.  Fallbacks apply only
    /// to notification events, which cannot carry them.
    pub fn resolve(self, fallbacks: &Fallbacks) -> Result<Request, EventError> {
        let mut pii_fields = self
            .pii_fields
            .map(FieldList::into_fields)
            .unwrap_or_default();
        let mut primary_key = self.primary_key.filter(|key| !key.is_empty());

        let locator = match (self.file_to_obfuscate.filter(|l| !l.is_empty()), self.detail) {
            (Some(locator), _) => locator,
            (None, Some(detail)) => {
                if pii_fields.is_empty() {
                    pii_fields = fallbacks.pii_fields.clone();
                }
                if primary_key.is_none() {
                    primary_key = fallbacks.primary_key.clone();
                }
                format!("s3://{}/{}", detail.bucket.name, detail.object.key)
            }
            (None, None) => return Err(EventError::MissingParameters),
        };

        if pii_fields.is_empty() {
            return Err(EventError::MissingParameters);
        }
        Ok(Request {
            locator,
            pii_fields,
            primary_key,
        })
    }
}
