//! Boundary serde helpers
//!
//! Backend payloads are normalized here so nothing past the boundary has to
//! guess at timestamp formats or blank fields.

use crate::models::NO_OBSERVATION;
use crate::types::Timestamp;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Parse a textual timestamp into Unix millis
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`, `+02:00` offsets) and naive
/// ISO strings, which are read as UTC. Digit-only strings are taken as millis.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse().ok();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(value, fmt)
            .ok()
            .map(|naive| naive.and_utc().timestamp_millis())
    })
}

/// Timestamp field that accepts either millis or a date string
///
/// Serializes back as plain millis.
pub mod flexible_timestamp {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S>(ts: &Timestamp, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_i64(*ts)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct TimestampVisitor;

        impl<'de> Visitor<'de> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("unix millis or an RFC 3339 timestamp string")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value).map_err(|_| E::custom(format!("timestamp out of range: {}", value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value.is_finite() {
                    Ok(value as i64)
                } else {
                    Err(E::custom("timestamp must be finite"))
                }
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                parse_timestamp(value).ok_or_else(|| E::custom(format!("invalid timestamp: {}", value)))
            }
        }

        deserializer.deserialize_any(TimestampVisitor)
    }
}

/// Trim an observation and map blank text onto the sentinel marker
pub fn normalize_observation(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        NO_OBSERVATION.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Deserialize an observation, treating null/blank as the sentinel
pub fn observation<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
        .map(|opt| normalize_observation(opt.as_deref().unwrap_or_default()))
}

/// Default for a missing observation field
pub fn default_observation() -> String {
    NO_OBSERVATION.to_string()
}
