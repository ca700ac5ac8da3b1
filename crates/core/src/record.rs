//! Event records: the open field map clients submit and the enriched record
//! that gets persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use validator::{Validate, ValidationError};

use crate::error::{Error, Result, ValidationErrorCode};
use crate::limits::MAX_USER_AGENT_LEN;
use crate::user_agent::{Browser, Device};

/// A single field value. Nested arrays and objects are kept as compact JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numbers, or strings that parse as a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => n.as_f64(),
            Self::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        n.is_finite().then_some(n)
    }

    /// Strings and numbers rendered as text; empty strings count as absent.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::String(s) if !s.is_empty() => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::String(nested.to_string()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

/// Open field map of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventFields(BTreeMap<String, Scalar>);

impl EventFields {
    /// Parse a `/track` request body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| Error::validation_code(ValidationErrorCode::InvalidJson, e.to_string()))?;
        Self::from_value(value).ok_or_else(|| {
            Error::validation_code(
                ValidationErrorCode::InvalidJson,
                "request body must be a JSON object",
            )
        })
    }

    /// Parse a record read back from the store.
    pub fn from_stored(raw: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| Error::schema(e.to_string()))?;
        Self::from_value(value).ok_or_else(|| Error::schema("record is not a JSON object"))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(
                map.into_iter().map(|(k, v)| (k, Scalar::from(v))).collect(),
            )),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.0.get(key)
    }

    /// Non-empty string value of a field.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Scalar::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn validate_event_name(event: &str) -> std::result::Result<(), ValidationError> {
    if event.contains(':') {
        let mut err = ValidationError::new("event_contains_separator");
        err.message = Some("event must not contain ':'".into());
        return Err(err);
    }
    Ok(())
}

/// The named fields the write path acts on.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct TrackRequest {
    #[validate(length(min = 1, max = 64), custom(function = "validate_event_name"))]
    pub event: String,
    #[validate(length(max = 64))]
    pub version: Option<String>,
    #[validate(length(max = 128))]
    pub visitor_id: Option<String>,
}

impl TrackRequest {
    /// Extract and validate the named fields of a submission.
    pub fn from_fields(fields: &EventFields) -> Result<Self> {
        let event = match fields.get("event") {
            None | Some(Scalar::Null) => return Err(Error::missing_field("event")),
            Some(Scalar::String(s)) => s.clone(),
            Some(_) => {
                return Err(Error::validation_code(
                    ValidationErrorCode::InvalidEvent,
                    "event must be a string",
                ))
            }
        };

        let request = Self {
            event,
            version: fields.get("version").and_then(Scalar::as_text),
            visitor_id: fields.get("visitorId").and_then(Scalar::as_text),
        };

        request
            .validate()
            .map_err(|e| Error::validation_code(ValidationErrorCode::InvalidEvent, e.to_string()))?;

        Ok(request)
    }

    pub fn is_page_view(&self) -> bool {
        self.event == "page_view"
    }
}

/// Request metadata supplied by the transport rather than the client body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub country: Option<String>,
}

/// An enriched event ready to be persisted.
#[derive(Debug, Clone)]
pub struct EventRecord {
    fields: EventFields,
    timestamp: DateTime<Utc>,
}

impl EventRecord {
    /// Merge client fields with server-assigned ones. Server fields win.
    pub fn build(mut fields: EventFields, ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        let user_agent = ctx
            .user_agent
            .clone()
            .filter(|ua| !ua.is_empty())
            .or_else(|| fields.str_field("userAgent").map(str::to_string));

        let country = ctx
            .country
            .clone()
            .filter(|c| !c.is_empty())
            .or_else(|| fields.str_field("country").map(str::to_string))
            .unwrap_or_else(|| "Unknown".to_string());

        fields.insert("timestamp", now.to_rfc3339_opts(SecondsFormat::Millis, true));
        fields.insert("country", country);
        if let Some(ip) = ctx.ip.as_deref() {
            fields.insert("ip", ip);
        }

        let ua = user_agent.as_deref();
        fields.insert("browser", Browser::classify(ua).as_str());
        fields.insert("device", Device::classify(ua).as_str());
        match ua {
            Some(ua) => fields.insert("userAgent", truncate(ua, MAX_USER_AGENT_LEN)),
            None => fields.insert("userAgent", Scalar::Null),
        }

        fields.insert("hour", now.hour());
        fields.insert("dayOfWeek", now.weekday().num_days_from_sunday());
        fields.insert("month", now.format("%Y-%m").to_string());

        Self {
            fields,
            timestamp: now,
        }
    }

    pub fn fields(&self) -> &EventFields {
        &self.fields
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn to_json(&self) -> Result<String> {
        self.fields.to_json()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
