//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the translation pool.
//! They have no external dependencies beyond serde.

use serde::{Serialize, Serializer};
use std::fmt;

/// Durable status flag of a registered endpoint.
///
/// Persisted as `"1"` (usable) or `"0"` (unusable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointStatus {
    Usable,
    Unusable,
}

impl EndpointStatus {
    /// Parse a stored flag. Anything other than `"1"` is unusable.
    pub fn from_flag(flag: &str) -> Self {
        if flag == "1" {
            Self::Usable
        } else {
            Self::Unusable
        }
    }

    /// Flag representation used by the store and the listing API.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Usable => "1",
            Self::Unusable => "0",
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Usable)
    }
}

impl fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

impl Serialize for EndpointStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_flag())
    }
}

/// One row of the endpoint listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointRecord {
    /// Normalized base URL
    pub url: String,
    /// Reported status (may be downgraded by the failure tracker)
    pub status: EndpointStatus,
}

impl EndpointRecord {
    pub fn new(url: impl Into<String>, status: EndpointStatus) -> Self {
        Self {
            url: url.into(),
            status,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_flag() {
        assert_eq!(EndpointStatus::from_flag("1"), EndpointStatus::Usable);
        assert_eq!(EndpointStatus::from_flag("0"), EndpointStatus::Unusable);
        assert_eq!(EndpointStatus::from_flag(""), EndpointStatus::Unusable);
        assert_eq!(EndpointStatus::from_flag("true"), EndpointStatus::Unusable);
    }

    #[test]
    fn test_status_as_flag() {
        assert_eq!(EndpointStatus::Usable.as_flag(), "1");
        assert_eq!(EndpointStatus::Unusable.as_flag(), "0");
        assert_eq!(EndpointStatus::Usable.to_string(), "1");
    }

    #[test]
    fn test_record_serializes_flag_as_string() {
        let record = EndpointRecord::new("https://a.example", EndpointStatus::Unusable);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "https://a.example", "status": "0"})
        );
    }
}
