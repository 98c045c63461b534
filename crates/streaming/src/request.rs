use crate::table::FetchKey;

/// Proof that a fetch was requested for `key` at a given table generation.
///
/// Every write back into the fetch table must present the ticket; a ticket
/// whose generation no longer matches the entry is stale and is rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket {
    pub key: FetchKey,
    pub generation: u64,
}

impl FetchTicket {
    pub fn new(key: FetchKey, generation: u64) -> Self {
        Self { key, generation }
    }
}
