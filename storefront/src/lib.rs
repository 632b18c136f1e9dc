//! # Rifa Storefront
//!
//! Client for the raffle storefront: a ticket grid with a persisted
//! selection, debounced search, periodic reconciliation against the server's
//! ticket statuses, the purchase summary, and the admin sale actions.
//!
//! The page is a [`reducer::StorefrontReducer`] running in a
//! [`rifa_runtime::Store`]; the admin forms are an
//! [`admin::AdminReducer`] in a second store. [`http::HttpClient`],
//! [`storage::FileStorage`] and [`page::TerminalPage`] are the production
//! environment.

pub mod admin;
pub mod config;
pub mod environment;
pub mod grid;
pub mod http;
pub mod location;
pub mod page;
pub mod reducer;
pub mod shell;
pub mod storage;
pub mod summary;
pub mod view;

pub use admin::{AdminAction, AdminReducer, AdminState};
pub use config::{Config, ConfigError};
pub use environment::{AdminEnvironment, StorefrontEnvironment, StorefrontSettings};
pub use reducer::{StorefrontAction, StorefrontReducer, StorefrontState};
