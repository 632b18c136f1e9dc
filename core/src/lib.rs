//! # Rifa Core
//!
//! Core traits and types for the raffle storefront client.
//!
//! The client follows the Reducer pattern: every user interaction and every
//! server response is an action, a reducer turns `(State, Action, Environment)`
//! into a new state plus effect descriptions, and the runtime executes those
//! effects and feeds their results back in as actions.
//!
//! ## Core Concepts
//!
//! - **State**: the storefront view model (grid, selection, modal, poller phase)
//! - **Action**: clicks, keystrokes, timer expirations, server responses
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: side effect descriptions (HTTP calls, timers, page notices)
//! - **Environment**: injected dependencies ([`environment::ClientStorage`],
//!   [`environment::RaffleApi`], [`environment::Page`], [`environment::Clock`])
//!
//! ## Domain
//!
//! - [`ticket`]: ticket identifiers, statuses and raffle ids
//! - [`wire`]: strict schemas for the storefront's JSON endpoints
//! - [`selection`]: the persisted, raffle-scoped selection set
//!
//! ## Example
//!
//! ```ignore
//! use rifa_core::*;
//!
//! impl Reducer for StorefrontReducer {
//!     type State = StorefrontState;
//!     type Action = StorefrontAction;
//!     type Environment = StorefrontEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut StorefrontState,
//!         action: StorefrontAction,
//!         env: &StorefrontEnvironment,
//!     ) -> SmallVec<[Effect<StorefrontAction>; 4]> {
//!         // Selection and reconciliation logic goes here
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Environment traits - injected dependencies
pub mod environment;

/// Error types shared across the workspace
pub mod error;

/// Persisted, raffle-scoped selection set
pub mod selection;

/// Ticket identifiers, statuses and raffle ids
pub mod ticket;

/// Wire schemas for the storefront endpoints
pub mod wire;

/// Reducer module - The core trait for client logic
///
/// Reducers are functions `(State, Action, Environment) → (State, Effects)`.
/// They hold all selection and reconciliation rules and are testable without
/// a runtime.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for client logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The view state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for AdminReducer {
    ///     type State = AdminState;
    ///     type Action = AdminAction;
    ///     type Environment = AdminEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut AdminState,
    ///         action: AdminAction,
    ///         env: &AdminEnvironment,
    ///     ) -> SmallVec<[Effect<AdminAction>; 4]> {
    ///         match action {
    ///             AdminAction::ConfirmSaleRequested { .. } => smallvec![Effect::None],
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates state in place and returns the effects the runtime must
        /// execute. Synchronous environment calls (client storage) happen here
        /// so that persistence is complete before the state is observed.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. The runtime executes them and
/// feeds any produced action back into the reducer.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Dispatch an action after a delay (debounce timers)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation (HTTP calls, page notices)
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Wrap an async block as an effect
        #[must_use]
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Whether this effect does nothing
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) => effects.iter().all(Effect::is_none),
                Effect::Delay { .. } | Effect::Future(_) => false,
            }
        }
    }
}
