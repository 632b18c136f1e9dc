//! Ticket grid view model.
//!
//! The grid shows either one range page of the catalog or the results of a
//! search. Each cell carries an explicit [`TicketStatus`]; presentation
//! classes are derived from it, never the other way round.

use rifa_core::selection::SelectionSet;
use rifa_core::ticket::{Ticket, TicketId, TicketStatus};
use std::fmt;

/// Text shown in place of the grid when a search matched nothing
pub const NO_RESULTS_NOTICE: &str = "No se encontraron números.";

/// Tickets per range page
pub const RANGE_SIZE: u32 = 100;

/// Digits used to zero-pad ticket ids for a raffle of `ticket_count` tickets
#[must_use]
pub const fn id_width(ticket_count: u32) -> usize {
    match ticket_count {
        0..=100 => 2,
        101..=1000 => 3,
        _ => 4,
    }
}

/// An inclusive block of ticket numbers shown as one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketRange {
    start: u32,
    end: u32,
    width: usize,
}

impl TicketRange {
    /// First range for a raffle of `ticket_count` tickets
    #[must_use]
    pub const fn first(ticket_count: u32) -> Self {
        Self {
            start: 0,
            end: RANGE_SIZE - 1,
            width: id_width(ticket_count),
        }
    }

    /// Every range page of a raffle of `ticket_count` tickets
    #[must_use]
    pub fn all(ticket_count: u32) -> Vec<Self> {
        let width = id_width(ticket_count);
        let pages = ticket_count.div_ceil(RANGE_SIZE).max(1);
        (0..pages)
            .map(|page| Self {
                start: page * RANGE_SIZE,
                end: page * RANGE_SIZE + RANGE_SIZE - 1,
                width,
            })
            .collect()
    }

    /// Parse a `rango` label such as `100-199`
    ///
    /// Returns `None` unless both bounds are numbers and `start <= end`.
    #[must_use]
    pub fn parse(label: &str, ticket_count: u32) -> Option<Self> {
        let (start, end) = label.split_once('-')?;
        let start: u32 = start.trim().parse().ok()?;
        let end: u32 = end.trim().parse().ok()?;
        (start <= end).then_some(Self {
            start,
            end,
            width: id_width(ticket_count),
        })
    }

    /// Range selected by an optional `rango` value, falling back to the first
    #[must_use]
    pub fn from_param(label: Option<&str>, ticket_count: u32) -> Self {
        label
            .and_then(|label| Self::parse(label, ticket_count))
            .unwrap_or_else(|| Self::first(ticket_count))
    }

    /// Zero-padded lower bound
    #[must_use]
    pub fn start_label(&self) -> String {
        format!("{:0width$}", self.start, width = self.width)
    }

    /// Zero-padded upper bound
    #[must_use]
    pub fn end_label(&self) -> String {
        format!("{:0width$}", self.end, width = self.width)
    }

    /// Whether `id` falls inside the range
    ///
    /// Compares the id text against the zero-padded bounds, the same way the
    /// server filters its pages.
    #[must_use]
    pub fn contains(&self, id: &TicketId) -> bool {
        let id = id.as_str();
        id >= self.start_label().as_str() && id <= self.end_label().as_str()
    }
}

impl fmt::Display for TicketRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_label(), self.end_label())
    }
}

/// One rendered ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketCell {
    /// Ticket number
    pub id: TicketId,
    /// Last status shown for the ticket
    pub status: TicketStatus,
    /// Whether the cell is highlighted as part of the selection
    pub selected: bool,
}

impl TicketCell {
    /// Presentation classes: `numero <estado> [seleccionado]`
    #[must_use]
    pub fn css_classes(&self) -> String {
        if self.selected {
            format!("numero {} seleccionado", self.status)
        } else {
            format!("numero {}", self.status)
        }
    }
}

/// What the grid is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridMode {
    /// One range page of the catalog
    Page {
        /// The page shown
        range: TicketRange,
    },
    /// Results of a search
    Search {
        /// The trimmed query the results belong to
        query: String,
    },
}

/// The rendered ticket grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    mode: GridMode,
    cells: Vec<TicketCell>,
}

impl Grid {
    /// Empty page view of `range`
    #[must_use]
    pub const fn new(range: TicketRange) -> Self {
        Self {
            mode: GridMode::Page { range },
            cells: Vec::new(),
        }
    }

    /// Replace the contents with a page view
    pub fn show_page(&mut self, range: TicketRange, tickets: impl IntoIterator<Item = Ticket>) {
        self.mode = GridMode::Page { range };
        self.cells = tickets
            .into_iter()
            .filter(|ticket| range.contains(&ticket.id))
            .map(Self::cell_for)
            .collect();
    }

    /// Replace the contents with search results, in server order
    pub fn show_search(&mut self, query: String, tickets: Vec<Ticket>) {
        self.mode = GridMode::Search { query };
        self.cells = tickets.into_iter().map(Self::cell_for).collect();
    }

    /// Update the status of a rendered ticket; returns whether it changed
    pub fn set_status(&mut self, id: &TicketId, status: TicketStatus) -> bool {
        match self.cells.iter_mut().find(|cell| &cell.id == id) {
            Some(cell) if cell.status != status => {
                cell.status = status;
                true
            },
            _ => false,
        }
    }

    /// Recompute every cell's highlight
    ///
    /// A cell is highlighted only when it is both selected and available.
    pub fn apply_selection(&mut self, selection: &SelectionSet) {
        for cell in &mut self.cells {
            cell.selected = cell.status.is_available() && selection.contains(&cell.id);
        }
    }

    /// The rendered cell for `id`
    #[must_use]
    pub fn cell(&self, id: &TicketId) -> Option<&TicketCell> {
        self.cells.iter().find(|cell| &cell.id == id)
    }

    /// Rendered cells in display order
    #[must_use]
    pub fn cells(&self) -> &[TicketCell] {
        &self.cells
    }

    /// What the grid is showing
    #[must_use]
    pub const fn mode(&self) -> &GridMode {
        &self.mode
    }

    /// The page range, if a page is shown
    #[must_use]
    pub const fn range(&self) -> Option<TicketRange> {
        match &self.mode {
            GridMode::Page { range } => Some(*range),
            GridMode::Search { .. } => None,
        }
    }

    /// Range navigation is hidden while search results are shown
    #[must_use]
    pub const fn pagination_visible(&self) -> bool {
        matches!(self.mode, GridMode::Page { .. })
    }

    /// Whether the no-results placeholder replaces the grid
    #[must_use]
    pub fn shows_no_results(&self) -> bool {
        matches!(self.mode, GridMode::Search { .. }) && self.cells.is_empty()
    }

    fn cell_for(ticket: Ticket) -> TicketCell {
        TicketCell {
            id: ticket.id,
            status: ticket.status,
            selected: false,
        }
    }
}

/// Selected-count label and purchase button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurchaseBar {
    /// Number of selected tickets
    pub selected_count: usize,
    /// The purchase button is enabled iff something is selected
    pub purchase_enabled: bool,
}

impl PurchaseBar {
    /// Bar for `selection`
    #[must_use]
    pub fn for_selection(selection: &SelectionSet) -> Self {
        Self {
            selected_count: selection.len(),
            purchase_enabled: !selection.is_empty(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(raw: &str) -> TicketId {
        TicketId::new(raw).unwrap()
    }

    fn ticket(raw: &str, status: TicketStatus) -> Ticket {
        Ticket::new(id(raw), status)
    }

    fn unselected(raw: &str, status: TicketStatus) -> TicketCell {
        TicketCell {
            id: id(raw),
            status,
            selected: false,
        }
    }

    #[test]
    fn width_follows_ticket_count() {
        assert_eq!(id_width(100), 2);
        assert_eq!(id_width(101), 3);
        assert_eq!(id_width(1000), 3);
        assert_eq!(id_width(1001), 4);
    }

    #[test]
    fn ranges_cover_the_raffle() {
        let labels: Vec<String> = TicketRange::all(1000).iter().map(ToString::to_string).collect();
        assert_eq!(labels.len(), 10);
        assert_eq!(labels[0], "000-099");
        assert_eq!(labels[9], "900-999");

        assert_eq!(TicketRange::all(100)[0].to_string(), "00-99");
        assert_eq!(TicketRange::all(0).len(), 1);
    }

    #[test]
    fn invalid_range_falls_back_to_first() {
        assert_eq!(TicketRange::from_param(Some("200-299"), 1000).to_string(), "200-299");
        assert_eq!(TicketRange::from_param(Some("abc"), 1000).to_string(), "000-099");
        assert_eq!(TicketRange::from_param(Some("300-200"), 1000).to_string(), "000-099");
        assert_eq!(TicketRange::from_param(None, 1000).to_string(), "000-099");
    }

    #[test]
    fn membership_is_textual() {
        let range = TicketRange::parse("100-199", 1000).unwrap();
        assert!(range.contains(&id("100")));
        assert!(range.contains(&id("199")));
        assert!(!range.contains(&id("099")));
        // Unpadded ids sort by text, as on the server
        assert!(range.contains(&id("12")));
    }

    #[test]
    fn selected_highlight_requires_available() {
        let mut grid = Grid::new(TicketRange::first(1000));
        grid.show_page(
            TicketRange::first(1000),
            vec![
                ticket("012", TicketStatus::Available),
                ticket("045", TicketStatus::Sold),
                ticket("150", TicketStatus::Available),
            ],
        );
        let selection: SelectionSet = [id("012"), id("045")].into_iter().collect();
        grid.apply_selection(&selection);

        assert_eq!(grid.cells().len(), 2);
        assert_eq!(grid.cell(&id("012")).unwrap().css_classes(), "numero disponible seleccionado");
        assert_eq!(grid.cell(&id("045")).unwrap().css_classes(), "numero vendido");
    }

    #[test]
    fn empty_search_shows_placeholder_and_hides_pagination() {
        let mut grid = Grid::new(TicketRange::first(1000));
        assert!(grid.pagination_visible());
        assert!(!grid.shows_no_results());

        grid.show_search("99".to_string(), Vec::new());
        assert!(!grid.pagination_visible());
        assert!(grid.shows_no_results());
        assert_eq!(grid.range(), None);
    }

    #[test]
    fn search_results_keep_server_order_unhighlighted() {
        let mut grid = Grid::new(TicketRange::first(1000));
        grid.show_search(
            "45".to_string(),
            vec![
                ticket("945", TicketStatus::Available),
                ticket("045", TicketStatus::Reserved),
                ticket("145", TicketStatus::Sold),
            ],
        );

        assert_eq!(
            grid.mode(),
            &GridMode::Search {
                query: "45".to_string()
            }
        );
        assert_eq!(
            grid.cells(),
            &[
                unselected("945", TicketStatus::Available),
                unselected("045", TicketStatus::Reserved),
                unselected("145", TicketStatus::Sold),
            ]
        );

        grid.show_page(TicketRange::first(1000), vec![ticket("045", TicketStatus::Sold)]);
        assert_eq!(grid.range(), Some(TicketRange::first(1000)));
        assert_eq!(grid.cell(&id("045")).unwrap().status, TicketStatus::Sold);
        assert_eq!(grid.cell(&id("945")), None);
    }

    #[test]
    fn set_status_reports_changes_only() {
        let mut grid = Grid::new(TicketRange::first(1000));
        grid.show_search("4".to_string(), vec![ticket("045", TicketStatus::Available)]);

        assert!(grid.set_status(&id("045"), TicketStatus::Reserved));
        assert!(!grid.set_status(&id("045"), TicketStatus::Reserved));
        assert!(!grid.set_status(&id("046"), TicketStatus::Sold));
    }
}
