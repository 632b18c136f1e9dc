//! Dependencies injected into the storefront and admin reducers.

use rifa_core::environment::{AdminApi, ClientStorage, Clock, Page, RaffleApi};
use std::sync::Arc;
use std::time::Duration;

/// Tunables of the storefront page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorefrontSettings {
    /// Quiet period before a search runs
    pub search_debounce: Duration,
    /// Shortest query, in characters, that reaches the server
    pub min_query_len: usize,
    /// Tickets in the raffle; drives id width and range pages
    pub ticket_count: u32,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(300),
            min_query_len: 2,
            ticket_count: 1000,
        }
    }
}

/// Environment of the storefront reducer
#[derive(Clone)]
pub struct StorefrontEnvironment {
    /// Persisted selection storage
    pub storage: Arc<dyn ClientStorage>,
    /// Search and status endpoints
    pub api: Arc<dyn RaffleApi>,
    /// Notices and address bar
    pub page: Arc<dyn Page>,
    /// Reconciliation timestamps
    pub clock: Arc<dyn Clock>,
    /// Page tunables
    pub settings: StorefrontSettings,
}

impl StorefrontEnvironment {
    /// Bundle the collaborators
    #[must_use]
    pub fn new(
        storage: Arc<dyn ClientStorage>,
        api: Arc<dyn RaffleApi>,
        page: Arc<dyn Page>,
        clock: Arc<dyn Clock>,
        settings: StorefrontSettings,
    ) -> Self {
        Self {
            storage,
            api,
            page,
            clock,
            settings,
        }
    }
}

/// Environment of the admin reducer
#[derive(Clone)]
pub struct AdminEnvironment {
    /// Anti-forgery-protected endpoints
    pub api: Arc<dyn AdminApi>,
    /// Prompts, notices, new contexts and reloads
    pub page: Arc<dyn Page>,
}

impl AdminEnvironment {
    /// Bundle the collaborators
    #[must_use]
    pub fn new(api: Arc<dyn AdminApi>, page: Arc<dyn Page>) -> Self {
        Self { api, page }
    }
}
