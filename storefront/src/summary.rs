//! Purchase summary modal.

use rifa_core::selection::SelectionSet;
use rifa_core::ticket::TicketId;

/// Shown instead of chips when nothing is selected
pub const EMPTY_SUMMARY_NOTICE: &str = "No hay números seleccionados.";

/// Heading above the chips
pub const SUMMARY_TITLE: &str = "Haz clic en un número para eliminarlo:";

/// Where a click inside the modal's area landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalTarget {
    /// The explicit close control
    CloseButton,
    /// The dimmed area around the dialog
    Backdrop,
    /// Anywhere inside the dialog itself
    Content,
}

impl ModalTarget {
    /// Whether a click on this target closes the modal
    #[must_use]
    pub const fn closes(self) -> bool {
        matches!(self, Self::CloseButton | Self::Backdrop)
    }
}

/// A removable entry for one selected ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryChip {
    /// Ticket the chip removes
    pub id: TicketId,
}

impl SummaryChip {
    /// Chip text
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ❌", self.id)
    }
}

/// The confirmation dialog listing the selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryModal {
    visible: bool,
    chips: Vec<SummaryChip>,
    form_value: String,
}

impl SummaryModal {
    /// Render the chips and the purchase form's hidden field from `selection`
    pub fn render(&mut self, selection: &SelectionSet) {
        self.chips = selection
            .iter()
            .map(|id| SummaryChip { id: id.clone() })
            .collect();
        self.form_value = selection.to_json().unwrap_or_else(|error| {
            tracing::warn!(error = %error, "Could not encode selection for the purchase form");
            "[]".to_string()
        });
    }

    /// Render and show
    pub fn open(&mut self, selection: &SelectionSet) {
        self.render(selection);
        self.visible = true;
    }

    /// Hide
    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Whether the dialog is shown
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Chips in selection order
    #[must_use]
    pub fn chips(&self) -> &[SummaryChip] {
        &self.chips
    }

    /// Whether a chip for `id` is rendered
    #[must_use]
    pub fn has_chip(&self, id: &TicketId) -> bool {
        self.chips.iter().any(|chip| &chip.id == id)
    }

    /// JSON array submitted as `numeros_seleccionados`
    #[must_use]
    pub fn form_value(&self) -> &str {
        &self.form_value
    }
}
