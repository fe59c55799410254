//! Readings, tags and the identity readings are grouped by.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::value::FieldValue;

/// Tag carrying the BACnet object instance number.
pub const OBJECT_INSTANCE_NUMBER: &str = "objectInstanceNumber";
/// Tag carrying the BACnet device identifier.
pub const DEVICE_IDENTIFIER: &str = "deviceIdentifier";
/// Stand-in for an identity tag a reading does not carry.
pub const MISSING_TAG: &str = "None";

/// One `key=value` dimension of a reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: FieldValue,
}

impl Tag {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> From<(K, V)> for Tag {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// One observed attribute of a BACnet object.
///
/// The timestamp is captured when the reading is built and cannot be changed
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    measurement: String,
    value: FieldValue,
    tags: Vec<Tag>,
    timestamp: i64,
}

impl Reading {
    /// Builds a reading stamped with the current time in nanoseconds.
    #[must_use]
    pub fn new(measurement: impl Into<String>, value: impl Into<FieldValue>, tags: Vec<Tag>) -> Self {
        Self::with_timestamp(measurement, value, tags, now_nanos())
    }

    /// Builds a reading with an explicit nanosecond timestamp.
    #[must_use]
    pub fn with_timestamp(
        measurement: impl Into<String>,
        value: impl Into<FieldValue>,
        tags: Vec<Tag>,
        timestamp: i64,
    ) -> Self {
        Self {
            measurement: measurement.into(),
            value: value.into(),
            tags,
            timestamp,
        }
    }

    #[must_use]
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    #[must_use]
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }

    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Capture time, nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The identity this reading aggregates under.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::from_tags(&self.tags)
    }

    pub(crate) fn into_parts(self) -> (String, FieldValue, Vec<Tag>, i64) {
        (self.measurement, self.value, self.tags, self.timestamp)
    }
}

/// Producer wire form: `{"measurement": "units", "value": "degF", "tags": [["deviceIdentifier", 10]]}`.
#[derive(Debug, Deserialize)]
struct JsonReading {
    measurement: String,
    value: FieldValue,
    #[serde(default)]
    tags: Vec<(String, FieldValue)>,
    #[serde(default)]
    timestamp: Option<i64>,
}

impl Reading {
    /// Decode one JSON reading. Without a `timestamp` field the reading is
    /// stamped with the current time.
    pub fn from_json(line: &str) -> Result<Self, InputError> {
        let raw: JsonReading = serde_json::from_str(line)?;
        let tags = raw.tags.into_iter().map(Tag::from).collect();
        let timestamp = raw.timestamp.unwrap_or_else(now_nanos);
        Ok(Self::with_timestamp(raw.measurement, raw.value, tags, timestamp))
    }
}

fn now_nanos() -> i64 {
    // Only out of range past the year 2262.
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Key grouping readings of one physical BACnet object:
/// `<objectInstanceNumber>_<deviceIdentifier>`.
///
/// A missing tag is written as `None`, so readings without identity tags
/// share a bucket (`None_None` when both are absent). When a key repeats, the
/// last occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    #[must_use]
    pub fn from_tags(tags: &[Tag]) -> Self {
        let object = lookup(tags, OBJECT_INSTANCE_NUMBER);
        let device = lookup(tags, DEVICE_IDENTIFIER);
        Self(format!("{object}_{device}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn lookup(tags: &[Tag], key: &str) -> String {
    tags.iter()
        .rev()
        .find(|t| t.key == key)
        .map_or_else(|| MISSING_TAG.to_string(), |t| t.value.to_string())
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
