use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::request::FetchTicket;
use crate::source::FeatureDataSource;
use crate::status::FetchStatus;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchKey {
    pub source: FeatureDataSource,
    pub key: String,
}

impl FetchKey {
    pub fn new(source: FeatureDataSource, key: impl Into<String>) -> Self {
        Self {
            source,
            key: key.into(),
        }
    }
}

impl std::fmt::Display for FetchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.source, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTableError {
    UnknownKey(FetchKey),
    InvalidTransition {
        key: FetchKey,
        from: FetchStatus,
        to: FetchStatus,
    },
    /// The entry was reset or re-requested after the ticket was issued.
    Stale { key: FetchKey, ticket: u64, current: u64 },
}

impl std::fmt::Display for FetchTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchTableError::UnknownKey(key) => write!(f, "unknown fetch key: {key}"),
            FetchTableError::InvalidTransition { key, from, to } => {
                write!(f, "invalid fetch transition for {key}: {from} -> {to}")
            }
            FetchTableError::Stale {
                key,
                ticket,
                current,
            } => write!(
                f,
                "stale fetch resolution for {key}: ticket generation {ticket}, current {current}"
            ),
        }
    }
}

impl std::error::Error for FetchTableError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FetchEntry {
    status: FetchStatus,
    generation: u64,
}

/// Per (source, key) fetch bookkeeping.
///
/// Notes:
/// - The key set is fixed when the table is seeded; writes to unknown keys
///   are rejected rather than inserted.
/// - Entries are kept in `BTreeMap`s so traversal order is stable.
/// - Generations come from one table-wide counter, so a ticket issued before
///   a reset can never match the entry again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchTable {
    entries: BTreeMap<FeatureDataSource, BTreeMap<String, FetchEntry>>,
    next_generation: u64,
}

impl FetchTable {
    /// An empty, unseeded table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding every fetchable (source, key) pair, all `Unset`.
    pub fn seeded() -> Self {
        let entries = FeatureDataSource::ALL
            .into_iter()
            .map(|source| {
                let keys = source
                    .fetchable_keys()
                    .iter()
                    .map(|k| (k.to_string(), FetchEntry::default()))
                    .collect();
                (source, keys)
            })
            .collect();
        Self {
            entries,
            next_generation: 0,
        }
    }

    pub fn is_seeded(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> impl Iterator<Item = FetchKey> + '_ {
        self.entries.iter().flat_map(|(source, keys)| {
            keys.keys().map(move |k| FetchKey::new(*source, k.clone()))
        })
    }

    pub fn status(&self, key: &FetchKey) -> Option<FetchStatus> {
        self.entry(key).map(|e| e.status)
    }

    pub fn status_of(&self, source: FeatureDataSource, key: &str) -> Option<FetchStatus> {
        self.entries.get(&source)?.get(key).map(|e| e.status)
    }

    /// Current ticket for `key`, if one is outstanding.
    pub fn ticket(&self, key: &FetchKey) -> Option<FetchTicket> {
        let entry = self.entry(key)?;
        entry
            .status
            .is_loading()
            .then(|| FetchTicket::new(key.clone(), entry.generation))
    }

    /// Marks `key` as awaiting a fetch call.
    ///
    /// Returns `Ok(None)` when a fetch is already awaiting or in flight, so
    /// duplicate requests are no-ops. Only `Unset` and `Error` accept a new
    /// request; `Fetched` is reported as an invalid transition.
    pub fn request(&mut self, key: &FetchKey) -> Result<Option<FetchTicket>, FetchTableError> {
        let generation = self.next_generation + 1;
        let entry = self.entry_mut(key)?;
        if entry.status.is_loading() {
            return Ok(None);
        }
        if !entry.status.can_request() {
            return Err(FetchTableError::InvalidTransition {
                key: key.clone(),
                from: entry.status,
                to: FetchStatus::AwaitingFetchCall,
            });
        }
        entry.status = FetchStatus::AwaitingFetchCall;
        entry.generation = generation;
        self.next_generation = generation;
        Ok(Some(FetchTicket::new(key.clone(), generation)))
    }

    /// AwaitingFetchCall → Fetching.
    pub fn begin(&mut self, ticket: &FetchTicket) -> Result<(), FetchTableError> {
        self.transition(ticket, FetchStatus::Fetching)
    }

    /// Fetching → Fetched.
    pub fn complete(&mut self, ticket: &FetchTicket) -> Result<(), FetchTableError> {
        self.transition(ticket, FetchStatus::Fetched)
    }

    /// AwaitingFetchCall | Fetching → Error.
    pub fn fail(&mut self, ticket: &FetchTicket) -> Result<(), FetchTableError> {
        self.transition(ticket, FetchStatus::Error)
    }

    /// Returns `key` to `Unset` and supersedes any outstanding ticket.
    pub fn reset(&mut self, key: &FetchKey) -> Result<(), FetchTableError> {
        let generation = self.next_generation + 1;
        let entry = self.entry_mut(key)?;
        entry.status = FetchStatus::Unset;
        entry.generation = generation;
        self.next_generation = generation;
        Ok(())
    }

    /// Resets every key; the key set itself is untouched.
    pub fn reset_all(&mut self) {
        for entry in self.entries.values_mut().flat_map(BTreeMap::values_mut) {
            self.next_generation += 1;
            entry.status = FetchStatus::Unset;
            entry.generation = self.next_generation;
        }
    }

    /// Settled keys (`Fetched` or `Error`) over all keys, as 0–100.
    pub fn progress(&self) -> f64 {
        let total = self.len();
        if total == 0 {
            return 0.0;
        }
        let settled = self
            .entries
            .values()
            .flat_map(BTreeMap::values)
            .filter(|e| e.status.is_settled())
            .count();
        settled as f64 * 100.0 / total as f64
    }

    pub fn is_loading(&self) -> bool {
        self.entries
            .values()
            .flat_map(BTreeMap::values)
            .any(|e| e.status.is_loading())
    }

    pub fn keys_with_status(&self, status: FetchStatus) -> Vec<FetchKey> {
        self.keys()
            .filter(|k| self.status(k) == Some(status))
            .collect()
    }

    fn entry(&self, key: &FetchKey) -> Option<&FetchEntry> {
        self.entries.get(&key.source)?.get(&key.key)
    }

    fn entry_mut(&mut self, key: &FetchKey) -> Result<&mut FetchEntry, FetchTableError> {
        self.entries
            .get_mut(&key.source)
            .and_then(|keys| keys.get_mut(&key.key))
            .ok_or_else(|| FetchTableError::UnknownKey(key.clone()))
    }

    fn transition(&mut self, ticket: &FetchTicket, to: FetchStatus) -> Result<(), FetchTableError> {
        let key = &ticket.key;
        let entry = self.entry_mut(key)?;
        if entry.generation != ticket.generation {
            return Err(FetchTableError::Stale {
                key: key.clone(),
                ticket: ticket.generation,
                current: entry.generation,
            });
        }
        if !entry.status.can_transition_to(to) {
            return Err(FetchTableError::InvalidTransition {
                key: key.clone(),
                from: entry.status,
                to,
            });
        }
        entry.status = to;
        Ok(())
    }
}

/// Serializes as `{ SOURCE: { KEY: status } }`; generations are internal.
impl Serialize for FetchTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let view: BTreeMap<&FeatureDataSource, BTreeMap<&str, FetchStatus>> = self
            .entries
            .iter()
            .map(|(source, keys)| {
                let statuses = keys.iter().map(|(k, e)| (k.as_str(), e.status)).collect();
                (source, statuses)
            })
            .collect();
        view.serialize(serializer)
    }
}
