use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::request::FetchTicket;
use crate::source::FeatureDataSource;
use crate::table::{FetchKey, FetchTable, FetchTableError};
use crate::transport::{Transport, TransportError};

struct Completion {
    ticket: FetchTicket,
    result: Result<Value, TransportError>,
}

/// What happened to one completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Fetched(FetchKey),
    Failed(FetchKey),
    /// The key was reset or re-requested while the fetch ran.
    Discarded(FetchKey),
}

/// Single owner of the fetch table.
///
/// Requests are queued in arrival order and dispatched to the transport as
/// independent tasks, at most `max_in_flight` at a time. Completions come back
/// over a channel and are written only if their ticket is still current, so a
/// cancelled or superseded fetch can never overwrite newer state.
///
/// `dispatch` spawns onto the ambient tokio runtime and must be called from
/// within one.
pub struct FetchCoordinator<T> {
    table: FetchTable,
    transport: Arc<T>,
    config: FetchConfig,
    queued: VecDeque<FetchTicket>,
    in_flight: BTreeMap<FetchKey, (u64, AbortHandle)>,
    payloads: BTreeMap<FetchKey, Value>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl<T: Transport + 'static> FetchCoordinator<T> {
    pub fn new(transport: T, config: FetchConfig) -> Self {
        Self::with_table(FetchTable::seeded(), transport, config)
    }

    pub fn with_table(table: FetchTable, transport: T, config: FetchConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            table,
            transport: Arc::new(transport),
            config,
            queued: VecDeque::new(),
            in_flight: BTreeMap::new(),
            payloads: BTreeMap::new(),
            tx,
            rx,
        }
    }

    pub fn table(&self) -> &FetchTable {
        &self.table
    }

    pub fn config(&self) -> FetchConfig {
        self.config
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    pub fn payload(&self, key: &FetchKey) -> Option<&Value> {
        self.payloads.get(key)
    }

    pub fn payloads(&self) -> impl Iterator<Item = (&FetchKey, &Value)> {
        self.payloads.iter()
    }

    /// Queues a fetch for `key`.
    ///
    /// Returns `Ok(false)` when one is already awaiting or in flight.
    pub fn request(&mut self, key: &FetchKey) -> Result<bool, FetchTableError> {
        let Some(ticket) = self.table.request(key)? else {
            return Ok(false);
        };
        debug!("queued fetch {key} (generation {})", ticket.generation);
        self.queued.push_back(ticket);
        Ok(true)
    }

    /// Queues every key of `source` that accepts a request; returns how many
    /// were queued.
    pub fn request_source(&mut self, source: FeatureDataSource) -> usize {
        let keys: Vec<FetchKey> = self
            .table
            .keys()
            .filter(|k| k.source == source)
            .collect();
        self.request_many(keys)
    }

    pub fn request_all(&mut self) -> usize {
        let keys: Vec<FetchKey> = self.table.keys().collect();
        self.request_many(keys)
    }

    fn request_many(&mut self, keys: Vec<FetchKey>) -> usize {
        let mut queued = 0;
        for key in keys {
            match self.request(&key) {
                Ok(true) => queued += 1,
                Ok(false) => {}
                Err(e) => debug!("not requesting {key}: {e}"),
            }
        }
        queued
    }

    /// Starts queued fetches up to the in-flight limit; returns how many
    /// started.
    pub fn dispatch(&mut self) -> usize {
        let mut started = 0;
        while self.in_flight.len() < self.config.max_in_flight {
            let Some(ticket) = self.queued.pop_front() else {
                break;
            };
            if let Err(e) = self.table.begin(&ticket) {
                debug!("skipping superseded request: {e}");
                continue;
            }

            let fetch = tokio::spawn(self.transport.fetch(&ticket.key));
            let abort = fetch.abort_handle();
            let tx = self.tx.clone();
            let task_ticket = ticket.clone();
            // A panicked or aborted fetch still reports back, as a failure.
            tokio::spawn(async move {
                let result = match fetch.await {
                    Ok(result) => result,
                    Err(e) => Err(TransportError::new(format!("fetch task failed: {e}"))),
                };
                // The receiver only goes away with the coordinator itself.
                let _ = tx.send(Completion {
                    ticket: task_ticket,
                    result,
                });
            });

            debug!("dispatched fetch {}", ticket.key);
            self.in_flight
                .insert(ticket.key, (ticket.generation, abort));
            started += 1;
        }
        started
    }

    /// Aborts any fetch for `key` and returns it to `Unset`.
    ///
    /// Returns `true` if a fetch was awaiting or running.
    pub fn cancel(&mut self, key: &FetchKey) -> Result<bool, FetchTableError> {
        let was_loading = self.table.status(key).is_some_and(|s| s.is_loading());
        if let Some((_, handle)) = self.in_flight.remove(key) {
            handle.abort();
        }
        self.table.reset(key)?;
        self.payloads.remove(key);
        Ok(was_loading)
    }

    /// Teardown: aborts everything and resets every key.
    pub fn cancel_all(&mut self) {
        for (_, (_, handle)) in std::mem::take(&mut self.in_flight) {
            handle.abort();
        }
        self.queued.clear();
        self.payloads.clear();
        self.table.reset_all();
    }

    /// Applies every completion that has already arrived, without waiting.
    pub fn try_apply_completions(&mut self) -> Vec<Applied> {
        let mut out = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            out.push(self.apply(completion));
        }
        out
    }

    /// Waits for the next completion; `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Applied> {
        if self.in_flight.is_empty() {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Dispatches and applies until no fetch is queued or running.
    pub async fn run_until_settled(&mut self) -> Vec<Applied> {
        let mut out = Vec::new();
        loop {
            self.dispatch();
            match self.next_completion().await {
                Some(applied) => out.push(applied),
                None => break,
            }
        }
        info!(
            progress = self.table.progress(),
            fetched = self.payloads.len(),
            "feature data fetches settled"
        );
        out
    }

    fn apply(&mut self, completion: Completion) -> Applied {
        let Completion { ticket, result } = completion;
        let key = ticket.key.clone();
        if self
            .in_flight
            .get(&key)
            .is_some_and(|(generation, _)| *generation == ticket.generation)
        {
            self.in_flight.remove(&key);
        }

        let written = match &result {
            Ok(_) => self.table.complete(&ticket),
            Err(_) => self.table.fail(&ticket),
        };
        if let Err(e) = written {
            debug!("discarding fetch result: {e}");
            return Applied::Discarded(key);
        }

        match result {
            Ok(payload) => {
                self.payloads.insert(key.clone(), payload);
                Applied::Fetched(key)
            }
            Err(err) => {
                warn!("fetch failed for {key}: {err}");
                Applied::Failed(key)
            }
        }
    }
}

impl<T> Drop for FetchCoordinator<T> {
    fn drop(&mut self) {
        for (_, handle) in self.in_flight.values() {
            handle.abort();
        }
    }
}
