//! Environment traits - injected dependencies.
//!
//! Every external collaborator of the client sits behind one of these
//! traits: the persisted key/value storage, the storefront HTTP endpoints,
//! the page chrome (notices, confirmation prompts, navigation) and the clock.
//! Reducers receive them through their environment, so tests swap in the
//! in-memory versions from `rifa-testing`.
//!
//! # Dyn Compatibility
//!
//! The async traits return `Pin<Box<dyn Future>>` instead of using `async fn`
//! so they can be shared as `Arc<dyn RaffleApi>` and captured by effects.

use crate::error::{ApiError, StorageError};
use crate::ticket::Ticket;
use crate::wire::{SaleOutcome, StatusReport};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by the API traits
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// String-keyed client storage scoped to the site origin
///
/// Synchronous by contract: a write has either happened or failed by the
/// time the call returns.
pub trait ClientStorage: Send + Sync {
    /// Read a value
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write did not happen.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value; deleting a missing key succeeds
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the delete did not happen.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Public storefront endpoints
pub trait RaffleApi: Send + Sync {
    /// `GET /buscar/?q=<query>`
    fn search(&self, query: String) -> ApiFuture<'_, Vec<Ticket>>;

    /// `GET /api/status/`
    fn ticket_statuses(&self) -> ApiFuture<'_, StatusReport>;
}

/// Anti-forgery-protected admin endpoints
pub trait AdminApi: Send + Sync {
    /// POST the confirm-sale form
    ///
    /// `action` is the form's target, absolute or relative to the site origin.
    fn confirm_sale(&self, action: String, csrf_token: String) -> ApiFuture<'_, SaleOutcome>;

    /// POST the cancel-reservation form
    fn cancel_reservation(&self, action: String, csrf_token: String) -> ApiFuture<'_, ()>;
}

/// The page chrome around the storefront
pub trait Page: Send + Sync {
    /// Blocking notification
    fn alert(&self, message: &str);

    /// Interactive yes/no confirmation; `true` means proceed
    ///
    /// May block while waiting for the user; callers run it off the async
    /// executor.
    fn confirm(&self, message: &str) -> bool;

    /// Open a link in a new browsing context
    fn open_in_new_context(&self, url: &str);

    /// Reload the current page
    fn reload(&self);

    /// Replace the address shown for the current page without reloading
    fn replace_location(&self, location: &str);
}
