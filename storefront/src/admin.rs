//! Admin panel form actions: confirm a sale, cancel a reservation.
//!
//! Confirming a sale asks the admin first; the prompt may block, so it runs
//! on the blocking pool. A form whose request is still outstanding ignores
//! further submissions.

use crate::environment::AdminEnvironment;
use rifa_core::effect::Effect;
use rifa_core::error::ApiError;
use rifa_core::reducer::Reducer;
use rifa_core::wire::SaleOutcome;
use rifa_runtime::metrics::AdminMetrics;
use smallvec::{SmallVec, smallvec};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Shown when the confirm-sale request got no usable response
pub const SALE_CONNECTIVITY_NOTICE: &str = "Hubo un error de conexión al confirmar la venta.";

/// A confirm-sale button and the form around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRequest {
    /// Form target
    pub action: String,
    /// Hidden anti-forgery field
    pub csrf_token: String,
    /// Ticket number shown on the button
    pub ticket: String,
    /// Buyer name shown on the button
    pub buyer_name: String,
    /// Buyer phone shown on the button
    pub phone: String,
}

impl SaleRequest {
    /// Confirmation prompt
    #[must_use]
    pub fn prompt(&self) -> String {
        format!(
            "⚠️ ¿Estás seguro de CONFIRMAR la venta del número {} a {}? Esto es irreversible.",
            self.ticket, self.buyer_name
        )
    }

    /// Notice after the server confirmed the sale
    #[must_use]
    pub fn confirmed_notice(&self) -> String {
        format!(
            "✅ ¡Venta de {} confirmada! Abrirá WhatsApp para notificar a {}.",
            self.ticket, self.buyer_name
        )
    }
}

/// A cancel-reservation button and the form around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelRequest {
    /// Form target
    pub action: String,
    /// Hidden anti-forgery field
    pub csrf_token: String,
    /// Ticket number shown on the button
    pub ticket: String,
}

/// Forms with a request in flight, keyed by form target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminState {
    in_flight: BTreeSet<String>,
}

impl AdminState {
    /// Whether the form posting to `action` is busy
    #[must_use]
    pub fn is_pending(&self, action: &str) -> bool {
        self.in_flight.contains(action)
    }

    fn begin(&mut self, action: &str) -> bool {
        self.in_flight.insert(action.to_string())
    }

    fn finish(&mut self, action: &str) {
        self.in_flight.remove(action);
    }
}

/// Admin actions
#[derive(Debug, Clone)]
pub enum AdminAction {
    /// The confirm-sale button was pressed
    ConfirmSaleRequested(SaleRequest),
    /// The admin answered the confirmation prompt
    SaleConfirmationAnswered {
        /// The form
        request: SaleRequest,
        /// `true` to go ahead
        proceed: bool,
    },
    /// The confirm-sale request finished
    SaleCompleted {
        /// The form
        request: SaleRequest,
        /// Server verdict or failure
        result: Result<SaleOutcome, ApiError>,
    },
    /// The cancel-reservation button was pressed
    CancelReservationRequested(CancelRequest),
    /// The cancel-reservation request finished
    CancelCompleted {
        /// The form
        request: CancelRequest,
        /// Outcome
        result: Result<(), ApiError>,
    },
}

/// Reducer for the admin panel forms
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminReducer;

impl AdminReducer {
    /// Create a reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for AdminReducer {
    type State = AdminState;
    type Action = AdminAction;
    type Environment = AdminEnvironment;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut AdminState,
        action: AdminAction,
        env: &AdminEnvironment,
    ) -> SmallVec<[Effect<AdminAction>; 4]> {
        match action {
            AdminAction::ConfirmSaleRequested(request) => {
                if !state.begin(&request.action) {
                    tracing::debug!(action = %request.action, "Sale already in progress, ignoring");
                    return smallvec![Effect::None];
                }

                let page = Arc::clone(&env.page);
                smallvec![Effect::future(async move {
                    let prompt = request.prompt();
                    let proceed = tokio::task::spawn_blocking(move || page.confirm(&prompt))
                        .await
                        .unwrap_or_else(|error| {
                            tracing::warn!(error = %error, "Confirmation prompt failed, treating as declined");
                            false
                        });
                    Some(AdminAction::SaleConfirmationAnswered { request, proceed })
                })]
            },

            AdminAction::SaleConfirmationAnswered { request, proceed } => {
                if !proceed {
                    tracing::info!(ticket = %request.ticket, "Sale confirmation declined");
                    state.finish(&request.action);
                    AdminMetrics::record("confirm_sale", "declined");
                    return smallvec![Effect::None];
                }

                let api = Arc::clone(&env.api);
                smallvec![Effect::future(async move {
                    let result = api
                        .confirm_sale(request.action.clone(), request.csrf_token.clone())
                        .await;
                    Some(AdminAction::SaleCompleted { request, result })
                })]
            },

            AdminAction::SaleCompleted { request, result } => {
                state.finish(&request.action);
                let page = Arc::clone(&env.page);

                match result {
                    Ok(SaleOutcome::Confirmed { whatsapp_url, .. }) => {
                        tracing::info!(ticket = %request.ticket, "Sale confirmed");
                        AdminMetrics::record("confirm_sale", "confirmed");
                        smallvec![Effect::future(async move {
                            if let Some(url) = whatsapp_url {
                                page.open_in_new_context(&url);
                            }
                            page.alert(&request.confirmed_notice());
                            page.reload();
                            None
                        })]
                    },
                    Ok(SaleOutcome::Rejected { message }) => {
                        let message = message.unwrap_or_else(|| "sin detalle".to_string());
                        tracing::warn!(ticket = %request.ticket, message = %message, "Sale rejected");
                        AdminMetrics::record("confirm_sale", "rejected");
                        smallvec![Effect::future(async move {
                            page.alert(&format!("Error al confirmar venta: {message}"));
                            None
                        })]
                    },
                    Err(error) => {
                        tracing::error!(ticket = %request.ticket, error = %error, "Sale confirmation failed");
                        AdminMetrics::record("confirm_sale", "failed");
                        smallvec![Effect::future(async move {
                            page.alert(SALE_CONNECTIVITY_NOTICE);
                            None
                        })]
                    },
                }
            },

            AdminAction::CancelReservationRequested(request) => {
                if !state.begin(&request.action) {
                    tracing::debug!(action = %request.action, "Cancellation already in progress, ignoring");
                    return smallvec![Effect::None];
                }

                let api = Arc::clone(&env.api);
                smallvec![Effect::future(async move {
                    let result = api
                        .cancel_reservation(request.action.clone(), request.csrf_token.clone())
                        .await;
                    Some(AdminAction::CancelCompleted { request, result })
                })]
            },

            AdminAction::CancelCompleted { request, result } => {
                state.finish(&request.action);
                let page = Arc::clone(&env.page);

                match result {
                    Ok(()) => {
                        tracing::info!(ticket = %request.ticket, "Reservation cancelled");
                        AdminMetrics::record("cancel_reservation", "cancelled");
                        smallvec![Effect::future(async move {
                            page.reload();
                            None
                        })]
                    },
                    Err(error) => {
                        tracing::error!(ticket = %request.ticket, error = %error, "Cancellation failed");
                        AdminMetrics::record("cancel_reservation", "failed");
                        smallvec![Effect::future(async move {
                            page.alert(&format!(
                                "Error al cancelar la reserva del número {}: {error}",
                                request.ticket
                            ));
                            None
                        })]
                    },
                }
            },
        }
    }
}
