//! Test doubles for the environment traits.
//!
//! Every double is a cheap `Clone` around shared state, so a test keeps one
//! handle for scripting and inspection while an `Arc<dyn Trait>` copy lives
//! inside the environment under test.

use rifa_core::environment::{AdminApi, ApiFuture, ClientStorage, Page, RaffleApi};
use rifa_core::error::{ApiError, StorageError};
use rifa_core::ticket::Ticket;
use rifa_core::wire::{SaleOutcome, StatusReport};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// `HashMap`-backed [`ClientStorage`] with failure injection
#[derive(Clone, Debug, Default)]
pub struct InMemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStorage {
    /// Empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with `entries`
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let storage = Self::new();
        {
            let mut map = storage.entries.lock().unwrap();
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        }
        storage
    }

    /// Make every subsequent `get` fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` and `remove` fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current value under `key`, bypassing failure injection
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Number of successful `set`/`remove` calls
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("storage is read-only".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl ClientStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Io("storage is unreadable".to_string()));
        }
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_write()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_write()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// [`RaffleApi`] answering from queues of scripted responses
///
/// An empty search queue answers with no tickets. An empty status queue
/// answers with a transport failure.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRaffleApi {
    search_responses: Arc<Mutex<VecDeque<Result<Vec<Ticket>, ApiError>>>>,
    status_responses: Arc<Mutex<VecDeque<Result<StatusReport, ApiError>>>>,
    queries: Arc<Mutex<Vec<String>>>,
    status_calls: Arc<AtomicUsize>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl ScriptedRaffleApi {
    /// API with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next search response
    pub fn push_search(&self, response: Result<Vec<Ticket>, ApiError>) {
        self.search_responses.lock().unwrap().push_back(response);
    }

    /// Queue the next status response
    pub fn push_status(&self, response: Result<StatusReport, ApiError>) {
        self.status_responses.lock().unwrap().push_back(response);
    }

    /// Delay every response by `latency` (use with paused tokio time)
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Queries received so far, in order
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Number of status requests received
    #[must_use]
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn latency(&self) -> Option<Duration> {
        *self.latency.lock().unwrap()
    }
}

impl RaffleApi for ScriptedRaffleApi {
    fn search(&self, query: String) -> ApiFuture<'_, Vec<Ticket>> {
        self.queries.lock().unwrap().push(query);
        let response = self
            .search_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        let latency = self.latency();
        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            response
        })
    }

    fn ticket_statuses(&self) -> ApiFuture<'_, StatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .status_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::RequestFailed("no scripted status".to_string())));
        let latency = self.latency();
        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            response
        })
    }
}

/// One recorded admin request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminRequest {
    /// `confirm_sale` or `cancel_reservation`
    pub kind: &'static str,
    /// Form target
    pub action: String,
    /// Anti-forgery token sent
    pub csrf_token: String,
}

/// [`AdminApi`] answering from queues of scripted responses
///
/// An empty sale queue answers with a transport failure; an empty cancel
/// queue succeeds.
#[derive(Clone, Debug, Default)]
pub struct ScriptedAdminApi {
    sale_responses: Arc<Mutex<VecDeque<Result<SaleOutcome, ApiError>>>>,
    cancel_responses: Arc<Mutex<VecDeque<Result<(), ApiError>>>>,
    requests: Arc<Mutex<Vec<AdminRequest>>>,
}

impl ScriptedAdminApi {
    /// API with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next confirm-sale response
    pub fn push_sale(&self, response: Result<SaleOutcome, ApiError>) {
        self.sale_responses.lock().unwrap().push_back(response);
    }

    /// Queue the next cancel-reservation response
    pub fn push_cancel(&self, response: Result<(), ApiError>) {
        self.cancel_responses.lock().unwrap().push_back(response);
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<AdminRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, kind: &'static str, action: String, csrf_token: String) {
        self.requests.lock().unwrap().push(AdminRequest {
            kind,
            action,
            csrf_token,
        });
    }
}

impl AdminApi for ScriptedAdminApi {
    fn confirm_sale(&self, action: String, csrf_token: String) -> ApiFuture<'_, SaleOutcome> {
        self.record("confirm_sale", action, csrf_token);
        let response = self
            .sale_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::RequestFailed("no scripted sale".to_string())));
        Box::pin(async move { response })
    }

    fn cancel_reservation(&self, action: String, csrf_token: String) -> ApiFuture<'_, ()> {
        self.record("cancel_reservation", action, csrf_token);
        let response = self
            .cancel_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));
        Box::pin(async move { response })
    }
}

/// [`Page`] that records every interaction
///
/// Confirmation prompts are answered from a queue; an empty queue declines.
#[derive(Clone, Debug, Default)]
pub struct RecordingPage {
    alerts: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    answers: Arc<Mutex<VecDeque<bool>>>,
    opened: Arc<Mutex<Vec<String>>>,
    locations: Arc<Mutex<Vec<String>>>,
    reloads: Arc<AtomicUsize>,
}

impl RecordingPage {
    /// Page with no scripted answers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next confirmation prompt
    pub fn answer_confirm(&self, proceed: bool) {
        self.answers.lock().unwrap().push_back(proceed);
    }

    /// Alerts shown so far
    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    /// Confirmation prompts shown so far
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Links opened in a new context
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    /// Addresses the location was replaced with
    #[must_use]
    pub fn locations(&self) -> Vec<String> {
        self.locations.lock().unwrap().clone()
    }

    /// Number of reloads
    #[must_use]
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Page for RecordingPage {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }

    fn open_in_new_context(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }

    fn replace_location(&self, location: &str) {
        self.locations.lock().unwrap().push(location.to_string());
    }
}
