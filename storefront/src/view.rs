//! Plain-text rendering of the storefront view model.

use crate::grid::{GridMode, NO_RESULTS_NOTICE, TicketCell, TicketRange};
use crate::reducer::StorefrontState;
use crate::summary::{EMPTY_SUMMARY_NOTICE, SUMMARY_TITLE, SummaryChip};
use rifa_core::ticket::TicketStatus;
use std::fmt::Write;

const CELLS_PER_ROW: usize = 10;

fn cell_text(cell: &TicketCell) -> String {
    let mark = match (cell.status, cell.selected) {
        (_, true) => '*',
        (TicketStatus::Available, false) => ' ',
        (TicketStatus::Reserved, false) => 'r',
        (TicketStatus::Sold, false) => 'v',
    };
    format!("[{}{mark}]", cell.id)
}

/// Render the grid, range navigation, purchase bar and open modal
#[must_use]
pub fn render(state: &StorefrontState, ticket_count: u32) -> String {
    let mut out = String::new();
    let grid = state.grid();

    match grid.mode() {
        GridMode::Page { range } => {
            let _ = writeln!(out, "Números {range}");
        },
        GridMode::Search { query } => {
            let _ = writeln!(out, "Búsqueda \"{query}\"");
        },
    }

    if grid.shows_no_results() {
        let _ = writeln!(out, "  {NO_RESULTS_NOTICE}");
    }
    for row in grid.cells().chunks(CELLS_PER_ROW) {
        let line: Vec<String> = row.iter().map(cell_text).collect();
        let _ = writeln!(out, "  {}", line.join(" "));
    }

    if grid.pagination_visible() {
        let current = grid.range();
        let labels: Vec<String> = TicketRange::all(ticket_count)
            .into_iter()
            .map(|range| {
                if Some(range) == current {
                    format!("<{range}>")
                } else {
                    range.to_string()
                }
            })
            .collect();
        let _ = writeln!(out, "Rangos: {}", labels.join(" "));
    }

    let bar = state.purchase_bar();
    let _ = writeln!(
        out,
        "Seleccionados: {} | Comprar: {}",
        bar.selected_count,
        if bar.purchase_enabled { "habilitado" } else { "deshabilitado" }
    );

    let modal = state.modal();
    if modal.is_visible() {
        let _ = writeln!(out, "── Resumen ──");
        if modal.chips().is_empty() {
            let _ = writeln!(out, "  {EMPTY_SUMMARY_NOTICE}");
        } else {
            let chips: Vec<String> = modal.chips().iter().map(SummaryChip::label).collect();
            let _ = writeln!(out, "  {SUMMARY_TITLE}");
            let _ = writeln!(out, "  {}", chips.join("  "));
        }
        let _ = writeln!(out, "  numeros_seleccionados = {}", modal.form_value());
    }

    out
}
