use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

/// Portal timestamp. Wraps chrono::DateTime with the offset the portal reports
/// and serializes as an RFC 3339 string, the format the REST API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub DateTime<FixedOffset>);

impl Time {
    /// Create a new Time from a DateTime
    pub fn new(dt: DateTime<FixedOffset>) -> Self {
        Time(dt)
    }

    /// Parse an RFC 3339 timestamp such as `2024-03-01T10:00:00+03:00`
    pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value.trim()).map(Time)
    }

    /// Create a Time from a unix timestamp in seconds, in UTC
    pub fn from_unix(unix: i64) -> Option<Self> {
        Utc.timestamp_opt(unix, 0)
            .single()
            .map(|dt| Time(dt.fixed_offset()))
    }

    /// Get the unix timestamp in seconds
    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }

    /// Format as RFC 3339, keeping the original offset
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Deref for Time {
    type Target = DateTime<FixedOffset>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<FixedOffset>> for Time {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Time(dt)
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(dt: DateTime<Utc>) -> Self {
        Time(dt.fixed_offset())
    }
}

impl From<Time> for DateTime<FixedOffset> {
    fn from(t: Time) -> Self {
        t.0
    }
}

impl Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Time::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Timing block attached to every REST reply.
/// `operating` is the time the method has consumed in the current
/// rate-limit window, reset at `operating_reset_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTime {
    pub start: f64,
    pub finish: f64,
    pub duration: f64,
    pub processing: f64,
    pub date_start: Time,
    pub date_finish: Time,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_reset_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_keeps_offset() {
        let time: Time = serde_json::from_str(r#""2024-03-01T10:00:00+03:00""#).unwrap();
        assert_eq!(time.unix(), 1709276400);
        assert_eq!(time.offset().local_minus_utc(), 3 * 3600);

        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, r#""2024-03-01T10:00:00+03:00""#);
    }

    #[test]
    fn test_response_time() {
        let json = r#"{
            "start": 1709276400.123,
            "finish": 1709276400.456,
            "duration": 0.333,
            "processing": 0.01,
            "date_start": "2024-03-01T10:00:00+03:00",
            "date_finish": "2024-03-01T10:00:00+03:00",
            "operating_reset_at": 1709277000,
            "operating": 0
        }"#;

        let time: ResponseTime = serde_json::from_str(json).unwrap();
        assert_eq!(time.operating_reset_at, Some(1709277000));
        assert_eq!(time.operating, Some(0.0));
        assert_eq!(time.date_start.unix(), 1709276400);
    }

    #[test]
    fn test_time_null() {
        let result: Result<Option<Time>, _> = serde_json::from_str("null");
        assert!(result.unwrap().is_none());
    }
}
