use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fetch lifecycle for one (source, key):
///
/// Unset → AwaitingFetchCall → Fetching → Fetched, with Error reachable from
/// AwaitingFetchCall or Fetching. A new request is accepted only from Unset or
/// Error.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// Never requested. Serialized as `{}`.
    #[default]
    Unset,
    AwaitingFetchCall,
    Fetching,
    Fetched,
    Error,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Unset => "unset",
            FetchStatus::AwaitingFetchCall => "awaitingFetchCall",
            FetchStatus::Fetching => "fetching",
            FetchStatus::Fetched => "fetched",
            FetchStatus::Error => "error",
        }
    }

    pub fn can_request(&self) -> bool {
        matches!(self, FetchStatus::Unset | FetchStatus::Error)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::AwaitingFetchCall | FetchStatus::Fetching)
    }

    /// Counts towards progress.
    pub fn is_settled(&self) -> bool {
        matches!(self, FetchStatus::Fetched | FetchStatus::Error)
    }

    pub fn can_transition_to(&self, next: FetchStatus) -> bool {
        use FetchStatus::*;
        matches!(
            (self, next),
            (Unset | Error, AwaitingFetchCall)
                | (AwaitingFetchCall, Fetching)
                | (AwaitingFetchCall | Fetching, Error)
                | (Fetching, Fetched)
        )
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FetchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FetchStatus::Unset => serializer.serialize_map(Some(0))?.end(),
            other => serializer.serialize_str(other.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for FetchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match &value {
            serde_json::Value::Object(map) if map.is_empty() => Ok(FetchStatus::Unset),
            serde_json::Value::String(s) => match s.as_str() {
                "awaitingFetchCall" => Ok(FetchStatus::AwaitingFetchCall),
                "fetching" => Ok(FetchStatus::Fetching),
                "fetched" => Ok(FetchStatus::Fetched),
                "error" => Ok(FetchStatus::Error),
                other => Err(D::Error::custom(format!("unknown fetch status: {other}"))),
            },
            other => Err(D::Error::custom(format!("invalid fetch status: {other}"))),
        }
    }
}
