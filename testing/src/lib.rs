//! # Rifa Testing
//!
//! Test doubles and helpers for the raffle storefront client.
//!
//! This crate provides:
//! - In-memory and scripted implementations of the environment traits
//!   ([`InMemoryStorage`], [`ScriptedRaffleApi`], [`ScriptedAdminApi`],
//!   [`RecordingPage`], [`FixedClock`])
//! - A Given-When-Then [`ReducerTest`] harness
//! - Effect assertions and [`resolve_effects`] for driving effects without a
//!   runtime
//!
//! ## Example
//!
//! ```ignore
//! use rifa_testing::{InMemoryStorage, ScriptedRaffleApi, RecordingPage, test_clock};
//!
//! #[tokio::test]
//! async fn poll_evicts_sold_ticket() {
//!     let storage = InMemoryStorage::new();
//!     let api = ScriptedRaffleApi::new();
//!     api.push_status(Ok(StatusReport::Snapshot(vec![sold("45")])));
//!
//!     let env = environment(&storage, &api, &RecordingPage::new());
//!     let store = Store::new(StorefrontState::default(), StorefrontReducer, env);
//!
//!     store.send(StorefrontAction::PollTick).await?.wait().await;
//!     assert!(!store.state(|s| s.is_selected("45")).await);
//! }
//! ```

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap on poisoned locks
#![allow(clippy::missing_panics_doc)]

use chrono::{DateTime, Utc};
use rifa_core::environment::Clock;

pub mod mocks;

mod reducer_test;

pub use mocks::{InMemoryStorage, RecordingPage, ScriptedAdminApi, ScriptedRaffleApi};
pub use reducer_test::{ReducerTest, assertions, resolve_effects};

/// Fixed clock for deterministic tests
///
/// # Example
///
/// ```
/// use rifa_testing::FixedClock;
/// use rifa_core::environment::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Fixed clock at 2025-01-01 00:00:00 UTC
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}
