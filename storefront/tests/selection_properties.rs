//! Property tests for clicks on the ticket grid

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use rifa_core::reducer::Reducer;
use rifa_core::selection::{RAFFLE_MARKER_KEY, SELECTION_KEY, SelectionSet};
use rifa_core::ticket::{RaffleId, Ticket, TicketId, TicketStatus};
use rifa_storefront::location::PageLocation;
use rifa_storefront::{
    StorefrontAction, StorefrontEnvironment, StorefrontReducer, StorefrontSettings, StorefrontState,
};
use rifa_testing::{InMemoryStorage, RecordingPage, ScriptedRaffleApi, test_clock};
use std::collections::BTreeMap;
use std::sync::Arc;

const AVAILABLE: [&str; 6] = ["00", "07", "12", "45", "77", "99"];
const TAKEN: [&str; 2] = ["46", "50"];

fn id(raw: &str) -> TicketId {
    TicketId::new(raw).unwrap()
}

fn loaded_page() -> (StorefrontState, InMemoryStorage, StorefrontEnvironment) {
    let storage = InMemoryStorage::with_entries([(RAFFLE_MARKER_KEY, "7")]);
    let env = StorefrontEnvironment::new(
        Arc::new(storage.clone()),
        Arc::new(ScriptedRaffleApi::new()),
        Arc::new(RecordingPage::new()),
        Arc::new(test_clock()),
        StorefrontSettings {
            ticket_count: 100,
            ..StorefrontSettings::default()
        },
    );

    let mut tickets: Vec<Ticket> = AVAILABLE
        .iter()
        .map(|raw| Ticket::new(id(raw), TicketStatus::Available))
        .collect();
    tickets.push(Ticket::new(id(TAKEN[0]), TicketStatus::Reserved));
    tickets.push(Ticket::new(id(TAKEN[1]), TicketStatus::Sold));

    let mut state = StorefrontState::default();
    StorefrontReducer.reduce(
        &mut state,
        StorefrontAction::PageLoaded {
            raffle_id: RaffleId::parse("7"),
            location: PageLocation::parse("http://localhost:8000/rifa/").unwrap(),
            tickets,
        },
        &env,
    );
    (state, storage, env)
}

fn click_target() -> impl Strategy<Value = &'static str> {
    prop::sample::select(AVAILABLE.iter().chain(TAKEN.iter()).copied().collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn odd_click_counts_stay_selected(clicks in prop::collection::vec(click_target(), 0..40)) {
        let (mut state, storage, env) = loaded_page();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for raw in &clicks {
            *counts.entry(*raw).or_default() += 1;
            StorefrontReducer.reduce(
                &mut state,
                StorefrontAction::TicketClicked { id: id(raw) },
                &env,
            );
        }

        for raw in AVAILABLE {
            let odd = counts.get(raw).is_some_and(|n| n % 2 == 1);
            prop_assert_eq!(state.is_selected(raw), odd);
            prop_assert_eq!(state.grid().cell(&id(raw)).unwrap().selected, odd);
        }
        for raw in TAKEN {
            prop_assert!(!state.is_selected(raw));
        }

        let stored = storage
            .value(SELECTION_KEY)
            .map(|raw| SelectionSet::from_stored(&raw).unwrap())
            .unwrap_or_default();
        prop_assert_eq!(&stored, state.selection());

        let bar = state.purchase_bar();
        prop_assert_eq!(bar.selected_count, state.selection().len());
        prop_assert_eq!(bar.purchase_enabled, !state.selection().is_empty());
    }
}
