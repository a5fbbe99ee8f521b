use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const SUCCESS_STATUS_CODE: u16 = 200;

const BUCKET_NAME_POINTER: &str = "/s3/bucket/name";
const OBJECT_KEY_POINTER: &str = "/s3/object/key";

/// Where an invocation asked us to read the input VCF from.
///
/// Storage-trigger keys arrive URL-encoded and are decoded during parsing, so
/// both variants carry a key that can be used against the store as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationRequest {
    StorageTrigger { bucket: String, key: String },
    Manual { bucket: String, key: String },
}

impl InvocationRequest {
    pub fn bucket(&self) -> &str {
        match self {
            Self::StorageTrigger { bucket, .. } | Self::Manual { bucket, .. } => bucket,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::StorageTrigger { key, .. } | Self::Manual { key, .. } => key,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::StorageTrigger { .. } => "storage_trigger",
            Self::Manual { .. } => "manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("invocation payload must be a JSON object")]
    NotAnObject,
    #[error("invocation payload is missing a non-empty string at `{0}`")]
    MissingField(&'static str),
    #[error("object key `{key}` does not decode to valid UTF-8")]
    InvalidKeyEncoding { key: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormaliseSummary {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormaliseResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl NormaliseResponse {
    pub fn success(summary: &NormaliseSummary) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code: SUCCESS_STATUS_CODE,
            body: serde_json::to_string(summary)?,
        })
    }
}

/// Reads the bucket and key out of either a storage-trigger event or a manual
/// `{"bucket", "key"}` payload. A non-empty `Records` array always selects the
/// trigger shape, even when top-level `bucket`/`key` are also present.
pub fn parse_invocation(event: &Value) -> Result<InvocationRequest, EventError> {
    let Some(object) = event.as_object() else {
        return Err(EventError::NotAnObject);
    };

    match object
        .get("Records")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
    {
        Some(record) => parse_storage_record(record),
        None => Ok(InvocationRequest::Manual {
            bucket: required_str(event, "/bucket", "bucket")?.to_string(),
            key: required_str(event, "/key", "key")?.to_string(),
        }),
    }
}

/// Undoes the form-style encoding storage events apply to object keys: `+`
/// becomes a space, then `%XX` escapes are decoded.
pub fn decode_object_key(raw: &str) -> Result<String, EventError> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| EventError::InvalidKeyEncoding {
            key: raw.to_string(),
        })
}

fn parse_storage_record(record: &Value) -> Result<InvocationRequest, EventError> {
    let bucket = required_str(record, BUCKET_NAME_POINTER, "Records[0].s3.bucket.name")?;
    let raw_key = required_str(record, OBJECT_KEY_POINTER, "Records[0].s3.object.key")?;

    Ok(InvocationRequest::StorageTrigger {
        bucket: bucket.to_string(),
        key: decode_object_key(raw_key)?,
    })
}

fn required_str<'a>(
    value: &'a Value,
    pointer: &str,
    field: &'static str,
) -> Result<&'a str, EventError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .ok_or(EventError::MissingField(field))
}
