//! Storefront state machine.
//!
//! One reducer owns the whole page: the persisted selection, the catalog of
//! last known ticket statuses, the grid, the purchase bar, the summary modal,
//! the debounced search and the reconciliation cycle. Every mutation ends in
//! a render pass so the derived view never disagrees with the selection.
//!
//! Reconciliation cycles are serialized: a `PollTick` while a status request
//! is in flight is skipped. The phases are `Idle -> Fetching -> Idle`, with
//! the applying step happening inside the reduction of `PollCompleted`, so a
//! user click is always reduced either before or after it, never during.

use crate::environment::StorefrontEnvironment;
use crate::grid::{Grid, GridMode, PurchaseBar, TicketRange};
use crate::location::PageLocation;
use crate::summary::{ModalTarget, SummaryModal};
use chrono::{DateTime, Utc};
use rifa_core::effect::Effect;
use rifa_core::error::ApiError;
use rifa_core::reducer::Reducer;
use rifa_core::selection::{LocalSelectionStore, SelectionSet};
use rifa_core::ticket::{RaffleId, Ticket, TicketId, TicketStatus};
use rifa_core::wire::StatusReport;
use rifa_runtime::metrics::{ReconciliationMetrics, SearchMetrics};
use smallvec::{SmallVec, smallvec};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Notice shown once after the server redirects back from a purchase
pub const PURCHASE_SUCCESS_NOTICE: &str =
    "¡Felicidades! Tu(s) número(s) ha(n) sido reservado(s) pendiente de verificación de pago.";

/// Reconciliation phase
///
/// There is no separate applying phase: a snapshot is applied within the
/// reduction of `PollCompleted`, which also moves the phase back to `Idle`.
/// No other action can be reduced while a snapshot is half applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollPhase {
    /// No status request outstanding
    #[default]
    Idle,
    /// A status request is in flight
    Fetching,
}

/// Reconciliation bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    /// Current phase
    pub phase: PollPhase,
    /// Ticks skipped because a request was still in flight
    pub skipped_ticks: u64,
    /// When a snapshot was last applied
    pub last_reconciled_at: Option<DateTime<Utc>>,
}

/// Search box bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Raw input text
    pub text: String,
    /// Bumped on every keystroke; only the latest generation may run
    pub generation: u64,
}

/// Everything the storefront page shows or remembers
#[derive(Debug, Clone)]
pub struct StorefrontState {
    raffle_id: Option<RaffleId>,
    selection: LocalSelectionStore,
    catalog: BTreeMap<TicketId, TicketStatus>,
    range: TicketRange,
    grid: Grid,
    purchase_bar: PurchaseBar,
    modal: SummaryModal,
    search: SearchState,
    poll: PollState,
    location: Option<PageLocation>,
}

impl Default for StorefrontState {
    fn default() -> Self {
        let range = TicketRange::first(0);
        Self {
            raffle_id: None,
            selection: LocalSelectionStore::default(),
            catalog: BTreeMap::new(),
            range,
            grid: Grid::new(range),
            purchase_bar: PurchaseBar::default(),
            modal: SummaryModal::default(),
            search: SearchState::default(),
            poll: PollState::default(),
            location: None,
        }
    }
}

impl StorefrontState {
    /// Raffle the page belongs to
    #[must_use]
    pub const fn raffle_id(&self) -> Option<&RaffleId> {
        self.raffle_id.as_ref()
    }

    /// Current selection
    #[must_use]
    pub const fn selection(&self) -> &SelectionSet {
        self.selection.selection()
    }

    /// Whether the ticket with id text `raw` is selected
    #[must_use]
    pub fn is_selected(&self, raw: &str) -> bool {
        self.selection().iter().any(|id| id.as_str() == raw)
    }

    /// Last known status of a ticket
    #[must_use]
    pub fn known_status(&self, id: &TicketId) -> Option<TicketStatus> {
        self.catalog.get(id).copied()
    }

    /// Range page the unfiltered view shows
    #[must_use]
    pub const fn range(&self) -> TicketRange {
        self.range
    }

    /// Rendered grid
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Selected-count label and purchase button
    #[must_use]
    pub const fn purchase_bar(&self) -> PurchaseBar {
        self.purchase_bar
    }

    /// Summary modal
    #[must_use]
    pub const fn modal(&self) -> &SummaryModal {
        &self.modal
    }

    /// Search box bookkeeping
    #[must_use]
    pub const fn search(&self) -> &SearchState {
        &self.search
    }

    /// Reconciliation bookkeeping
    #[must_use]
    pub const fn poll(&self) -> &PollState {
        &self.poll
    }

    /// Current page address
    #[must_use]
    pub const fn location(&self) -> Option<&PageLocation> {
        self.location.as_ref()
    }

    fn render(&mut self) {
        let selection = self.selection.selection();
        self.grid.apply_selection(selection);
        self.purchase_bar = PurchaseBar::for_selection(selection);
        if self.modal.is_visible() {
            self.modal.render(selection);
        }
    }

    fn show_page(&mut self) {
        let tickets = self
            .catalog
            .iter()
            .map(|(id, status)| Ticket::new(id.clone(), *status));
        self.grid.show_page(self.range, tickets);
    }
}

/// Storefront actions
#[derive(Debug, Clone)]
pub enum StorefrontAction {
    /// The page finished loading with its server-rendered tickets
    PageLoaded {
        /// Raffle id embedded in the page
        raffle_id: Option<RaffleId>,
        /// Address the page was loaded from
        location: PageLocation,
        /// Tickets rendered by the server
        tickets: Vec<Ticket>,
    },
    /// A grid cell was clicked
    TicketClicked {
        /// Ticket under the pointer
        id: TicketId,
    },
    /// The purchase button was clicked
    PurchaseButtonClicked,
    /// A summary chip was clicked
    SummaryChipClicked {
        /// Ticket the chip stands for
        id: TicketId,
    },
    /// A click landed in the modal's area
    ModalClicked {
        /// Which part was hit
        target: ModalTarget,
    },
    /// The search box changed
    SearchInputChanged {
        /// New input text
        text: String,
    },
    /// The debounce period of a keystroke ended
    SearchDebounceElapsed {
        /// Keystroke generation the timer belongs to
        generation: u64,
    },
    /// A search request finished
    SearchCompleted {
        /// Generation that issued the request
        generation: u64,
        /// Matching tickets or the failure
        result: Result<Vec<Ticket>, ApiError>,
    },
    /// Range navigation
    RangeRequested {
        /// Page to show
        range: TicketRange,
    },
    /// Reconciliation interval fired
    PollTick,
    /// A status request finished
    PollCompleted {
        /// Snapshot or failure
        result: Result<StatusReport, ApiError>,
    },
}

/// Reducer for the storefront page
#[derive(Debug, Clone, Copy, Default)]
pub struct StorefrontReducer;

impl StorefrontReducer {
    /// Create a reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn page_loaded(
        state: &mut StorefrontState,
        raffle_id: Option<RaffleId>,
        location: PageLocation,
        tickets: Vec<Ticket>,
        env: &StorefrontEnvironment,
    ) -> SmallVec<[Effect<StorefrontAction>; 4]> {
        let storage = env.storage.as_ref();
        state.selection = LocalSelectionStore::load(storage, raffle_id.as_ref());
        state.raffle_id = raffle_id;
        state.catalog = tickets
            .into_iter()
            .map(|ticket| (ticket.id, ticket.status))
            .collect();
        state.range = TicketRange::from_param(
            location.range_param().as_deref(),
            env.settings.ticket_count,
        );

        let mut effects: SmallVec<[Effect<StorefrontAction>; 4]> = smallvec![];
        if location.purchase_succeeded() {
            tracing::info!("Purchase completed, clearing selection");
            state.selection.clear(storage);

            let clean = location.without_purchase_flag();
            let address = clean.address();
            state.location = Some(clean);

            let page = Arc::clone(&env.page);
            effects.push(Effect::future(async move {
                page.alert(PURCHASE_SUCCESS_NOTICE);
                page.replace_location(&address);
                None
            }));
        } else {
            state.location = Some(location);
        }

        state.show_page();
        state.render();
        tracing::info!(
            raffle = ?state.raffle_id.as_ref().map(RaffleId::as_str),
            tickets = state.catalog.len(),
            selected = state.selection().len(),
            range = %state.range,
            "Page loaded"
        );

        if effects.is_empty() {
            effects.push(Effect::None);
        }
        effects
    }

    fn ticket_clicked(state: &mut StorefrontState, id: &TicketId, env: &StorefrontEnvironment) {
        let Some(cell) = state.grid.cell(id) else {
            tracing::debug!(ticket = %id, "Click outside the rendered grid ignored");
            return;
        };
        if !cell.status.is_available() {
            tracing::debug!(ticket = %id, status = %cell.status, "Click on unavailable ticket ignored");
            return;
        }

        let selected = state.selection.toggle(env.storage.as_ref(), id).len();
        tracing::debug!(ticket = %id, selected, "Ticket toggled");
        state.render();
    }

    fn search_elapsed(
        state: &mut StorefrontState,
        generation: u64,
        env: &StorefrontEnvironment,
    ) -> SmallVec<[Effect<StorefrontAction>; 4]> {
        if generation != state.search.generation {
            return smallvec![Effect::None];
        }

        let query = state.search.text.trim().to_string();
        if query.chars().count() < env.settings.min_query_len {
            tracing::debug!(query = %query, "Query too short, restoring page view");
            state.show_page();
            state.render();
            return smallvec![Effect::None];
        }

        tracing::debug!(query = %query, generation, "Searching");
        SearchMetrics::record_request();
        let api = Arc::clone(&env.api);
        smallvec![Effect::future(async move {
            let result = api.search(query).await;
            Some(StorefrontAction::SearchCompleted { generation, result })
        })]
    }

    fn search_completed(
        state: &mut StorefrontState,
        generation: u64,
        result: Result<Vec<Ticket>, ApiError>,
    ) {
        if generation != state.search.generation {
            tracing::debug!(
                generation,
                current = state.search.generation,
                "Dropping results of a superseded search"
            );
            return;
        }

        match result {
            Ok(tickets) => {
                for ticket in &tickets {
                    state.catalog.insert(ticket.id.clone(), ticket.status);
                }
                let query = state.search.text.trim().to_string();
                tracing::debug!(query = %query, results = tickets.len(), "Search results rendered");
                state.grid.show_search(query, tickets);
                state.render();
            },
            Err(error) => {
                tracing::warn!(error = %error, "Search failed, keeping the current grid");
            },
        }
    }

    fn poll_tick(
        state: &mut StorefrontState,
        env: &StorefrontEnvironment,
    ) -> SmallVec<[Effect<StorefrontAction>; 4]> {
        if state.poll.phase == PollPhase::Fetching {
            state.poll.skipped_ticks += 1;
            ReconciliationMetrics::record_skipped();
            tracing::debug!("Previous status request still in flight, skipping tick");
            return smallvec![Effect::None];
        }

        state.poll.phase = PollPhase::Fetching;
        let api = Arc::clone(&env.api);
        smallvec![Effect::future(async move {
            let result = api.ticket_statuses().await;
            Some(StorefrontAction::PollCompleted { result })
        })]
    }

    fn poll_completed(
        state: &mut StorefrontState,
        result: Result<StatusReport, ApiError>,
        env: &StorefrontEnvironment,
    ) {
        state.poll.phase = PollPhase::Idle;

        let tickets = match result {
            Ok(StatusReport::Snapshot(tickets)) => tickets,
            Ok(StatusReport::Unavailable { status, message }) => {
                tracing::info!(status = %status, message = ?message, "Status endpoint has nothing to apply");
                ReconciliationMetrics::record_cycle("unavailable");
                return;
            },
            Err(error) => {
                tracing::warn!(error = %error, "Status request failed, skipping cycle");
                ReconciliationMetrics::record_cycle("failed");
                return;
            },
        };

        let storage = env.storage.as_ref();
        let mut changed = 0_usize;
        let mut evicted = 0_usize;
        for ticket in tickets {
            let previous = state.catalog.insert(ticket.id.clone(), ticket.status);
            let redrawn = state.grid.set_status(&ticket.id, ticket.status);
            if redrawn || previous.is_some_and(|status| status != ticket.status) {
                changed += 1;
            }
            if ticket.status.is_taken() && state.selection.remove(storage, &ticket.id) {
                tracing::info!(ticket = %ticket.id, status = %ticket.status, "Selected ticket taken, evicted");
                evicted += 1;
            }
        }

        if state.grid.pagination_visible() {
            state.show_page();
        }
        state.render();
        state.poll.last_reconciled_at = Some(env.clock.now());

        ReconciliationMetrics::record_cycle("applied");
        ReconciliationMetrics::record_evictions(evicted);
        tracing::debug!(changed, evicted, "Reconciliation applied");
    }
}

impl Reducer for StorefrontReducer {
    type State = StorefrontState;
    type Action = StorefrontAction;
    type Environment = StorefrontEnvironment;

    fn reduce(
        &self,
        state: &mut StorefrontState,
        action: StorefrontAction,
        env: &StorefrontEnvironment,
    ) -> SmallVec<[Effect<StorefrontAction>; 4]> {
        match action {
            StorefrontAction::PageLoaded {
                raffle_id,
                location,
                tickets,
            } => return Self::page_loaded(state, raffle_id, location, tickets, env),

            StorefrontAction::TicketClicked { id } => Self::ticket_clicked(state, &id, env),

            StorefrontAction::PurchaseButtonClicked => {
                if state.purchase_bar.purchase_enabled {
                    state.modal.open(state.selection.selection());
                } else {
                    tracing::debug!("Purchase button disabled, click ignored");
                }
            },

            StorefrontAction::SummaryChipClicked { id } => {
                if state.modal.is_visible() && state.modal.has_chip(&id) {
                    state.selection.remove(env.storage.as_ref(), &id);
                    state.render();
                }
            },

            StorefrontAction::ModalClicked { target } => {
                if target.closes() {
                    state.modal.close();
                }
            },

            StorefrontAction::SearchInputChanged { text } => {
                state.search.text = text;
                state.search.generation += 1;
                return smallvec![Effect::Delay {
                    duration: env.settings.search_debounce,
                    action: Box::new(StorefrontAction::SearchDebounceElapsed {
                        generation: state.search.generation,
                    }),
                }];
            },

            StorefrontAction::SearchDebounceElapsed { generation } => {
                return Self::search_elapsed(state, generation, env);
            },

            StorefrontAction::SearchCompleted { generation, result } => {
                Self::search_completed(state, generation, result);
            },

            StorefrontAction::RangeRequested { range } => {
                state.range = range;
                state.search.text.clear();
                state.search.generation += 1;
                state.location = state
                    .location
                    .as_ref()
                    .map(|location| location.with_range(&range.to_string()));
                state.show_page();
                state.render();
            },

            StorefrontAction::PollTick => return Self::poll_tick(state, env),

            StorefrontAction::PollCompleted { result } => {
                Self::poll_completed(state, result, env);
            },
        }

        smallvec![Effect::None]
    }
}

/// Whether the grid currently shows search results
#[must_use]
pub const fn is_search_view(state: &StorefrontState) -> bool {
    matches!(state.grid.mode(), GridMode::Search { .. })
}
