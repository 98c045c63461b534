//! Interface to the transport collaborator.
//!
//! The core never performs HTTP itself: a [`Transport`] turns a fetch key into
//! an already-decoded JSON payload. Retries and backoff belong to the
//! implementation, not to the fetch table.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::source::FeatureDataSource;
use crate::table::FetchKey;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fetch that produced no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fetches the payload for one (source, key).
///
/// Implementations must be `Send + Sync`; the returned future is spawned on
/// its own task, so it must not borrow from `self`.
pub trait Transport: Send + Sync {
    fn fetch(&self, key: &FetchKey) -> BoxFuture<'static, Result<Value, TransportError>>;
}

/// Transport answering from canned payloads.
///
/// Keys without a payload fail, which makes it usable for replaying recorded
/// responses and for exercising error paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    responses: BTreeMap<FetchKey, Result<Value, String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, key: FetchKey, payload: Value) -> Self {
        self.responses.insert(key, Ok(payload));
        self
    }

    pub fn with_failure(mut self, key: FetchKey, message: impl Into<String>) -> Self {
        self.responses.insert(key, Err(message.into()));
        self
    }

    /// Builds from `{ SOURCE: { KEY: payload } }`.
    pub fn from_json(value: &Value) -> Result<Self, TransportError> {
        let sources = value
            .as_object()
            .ok_or_else(|| TransportError::new("responses must be an object keyed by source"))?;
        let mut out = Self::new();
        for (source, keys) in sources {
            let source = source
                .parse::<FeatureDataSource>()
                .map_err(TransportError::new)?;
            let keys = keys.as_object().ok_or_else(|| {
                TransportError::new(format!("responses for {source} must be an object"))
            })?;
            for (key, payload) in keys {
                out = out.with_response(FetchKey::new(source, key.clone()), payload.clone());
            }
        }
        Ok(out)
    }
}

impl Transport for MemoryTransport {
    fn fetch(&self, key: &FetchKey) -> BoxFuture<'static, Result<Value, TransportError>> {
        let result = match self.responses.get(key) {
            Some(Ok(payload)) => Ok(payload.clone()),
            Some(Err(message)) => Err(TransportError::new(message.clone())),
            None => Err(TransportError::new(format!("no response recorded for {key}"))),
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryTransport, Transport, TransportError};
    use crate::source::FeatureDataSource;
    use crate::table::FetchKey;
    use serde_json::json;

    #[tokio::test]
    async fn replays_recorded_payloads() {
        let transport = MemoryTransport::from_json(&json!({
            "REST_LOCATIONS_API": {"TOWERS": {"features": []}},
        }))
        .unwrap();
        let towers = FetchKey::new(FeatureDataSource::RestLocationsApi, "TOWERS");
        assert_eq!(transport.fetch(&towers).await.unwrap(), json!({"features": []}));

        let reaches = FetchKey::new(FeatureDataSource::ArcgisAssetsApi, "AQUATIC_REACHES");
        let err = transport.fetch(&reaches).await.unwrap_err();
        assert!(err.to_string().contains("AQUATIC_REACHES"));
    }

    #[tokio::test]
    async fn recorded_failures_keep_their_message() {
        let towers = FetchKey::new(FeatureDataSource::RestLocationsApi, "TOWERS");
        let transport = MemoryTransport::new().with_failure(towers.clone(), "503 from upstream");
        let err = transport.fetch(&towers).await.unwrap_err();
        assert_eq!(err, TransportError::new("503 from upstream"));
        assert_eq!(err.to_string(), "503 from upstream");
    }

    #[test]
    fn rejects_unknown_sources() {
        assert!(MemoryTransport::from_json(&json!({"FTP": {}})).is_err());
        assert!(MemoryTransport::from_json(&json!([])).is_err());
    }
}
