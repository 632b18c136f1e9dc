//! Strict schemas for the storefront's JSON endpoints.
//!
//! Every body is decoded into a typed struct before it reaches a reducer.
//! Missing fields, unknown statuses and empty ticket numbers are reported as
//! [`ApiError::MalformedResponse`] instead of being guessed around.

use crate::error::ApiError;
use crate::ticket::{Ticket, TicketId, TicketStatus};
use serde::Deserialize;

/// Value of `status` on a successful `/api/status/` response
pub const STATUS_OK: &str = "ok";

/// Value of `status` on a successful sale confirmation
pub const SALE_SUCCESS: &str = "success";

/// One entry of `numeros` as sent by the server
#[derive(Debug, Clone, Deserialize)]
struct WireTicket {
    numero: TicketId,
    estado: TicketStatus,
}

impl From<WireTicket> for Ticket {
    fn from(wire: WireTicket) -> Self {
        Self::new(wire.numero, wire.estado)
    }
}

/// `GET /buscar/?q=<term>`
#[derive(Debug, Deserialize)]
struct SearchBody {
    numeros: Vec<WireTicket>,
}

/// `GET /api/status/`
#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
    #[serde(default)]
    numeros: Option<Vec<WireTicket>>,
    #[serde(default)]
    message: Option<String>,
}

/// Response to the admin confirm-sale POST
#[derive(Debug, Deserialize)]
struct SaleBody {
    status: String,
    #[serde(default)]
    whatsapp_url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Decoded `/api/status/` response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    /// `status == "ok"`: authoritative status of every known ticket
    Snapshot(Vec<Ticket>),
    /// Any other status: nothing to apply this cycle
    Unavailable {
        /// The status the server reported
        status: String,
        /// Optional explanation from the server
        message: Option<String>,
    },
}

/// Decoded confirm-sale response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleOutcome {
    /// `status == "success"`
    Confirmed {
        /// Messaging link to open for the buyer, if the server built one
        whatsapp_url: Option<String>,
        /// Server message
        message: Option<String>,
    },
    /// Any other status
    Rejected {
        /// Server message, shown verbatim to the admin
        message: Option<String>,
    },
}

fn malformed(endpoint: &str, error: &serde_json::Error) -> ApiError {
    ApiError::MalformedResponse(format!("{endpoint}: {error}"))
}

/// Decode a search response body
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] if the body does not match the schema.
pub fn parse_search(body: &[u8]) -> Result<Vec<Ticket>, ApiError> {
    let body: SearchBody = serde_json::from_slice(body).map_err(|e| malformed("search", &e))?;
    Ok(body.numeros.into_iter().map(Ticket::from).collect())
}

/// Decode a status response body
///
/// An `"ok"` status without a `numeros` array is malformed.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] if the body does not match the schema.
pub fn parse_status(body: &[u8]) -> Result<StatusReport, ApiError> {
    let body: StatusBody = serde_json::from_slice(body).map_err(|e| malformed("status", &e))?;
    if body.status != STATUS_OK {
        return Ok(StatusReport::Unavailable {
            status: body.status,
            message: body.message,
        });
    }
    let numeros = body.numeros.ok_or_else(|| {
        ApiError::MalformedResponse("status: \"ok\" response without `numeros`".to_string())
    })?;
    Ok(StatusReport::Snapshot(
        numeros.into_iter().map(Ticket::from).collect(),
    ))
}

/// Decode a confirm-sale response body
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] if the body does not match the schema.
pub fn parse_sale(body: &[u8]) -> Result<SaleOutcome, ApiError> {
    let body: SaleBody = serde_json::from_slice(body).map_err(|e| malformed("sale", &e))?;
    if body.status == SALE_SUCCESS {
        Ok(SaleOutcome::Confirmed {
            whatsapp_url: body.whatsapp_url.filter(|url| !url.trim().is_empty()),
            message: body.message,
        })
    } else {
        Ok(SaleOutcome::Rejected {
            message: body.message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn search_decodes_tickets_in_order() {
        let body = br#"{"numeros":[{"numero":"120","estado":"disponible"},{"numero":"121","estado":"vendido"}]}"#;
        let tickets = parse_search(body).unwrap();
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].id.as_str(), "120");
        assert_eq!(tickets[1].status, TicketStatus::Sold);
    }

    #[test]
    fn search_rejects_unknown_status() {
        let body = br#"{"numeros":[{"numero":"120","estado":"agotado"}]}"#;
        assert!(matches!(
            parse_search(body),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn search_rejects_empty_ticket_number() {
        let body = br#"{"numeros":[{"numero":"","estado":"disponible"}]}"#;
        assert!(matches!(
            parse_search(body),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn status_error_payload_is_unavailable() {
        let body = br#"{"status":"error","message":"No hay rifa activa."}"#;
        assert_eq!(
            parse_status(body).unwrap(),
            StatusReport::Unavailable {
                status: "error".to_string(),
                message: Some("No hay rifa activa.".to_string()),
            }
        );
    }

    #[test]
    fn status_ok_requires_numeros() {
        assert!(matches!(
            parse_status(br#"{"status":"ok"}"#),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn sale_success_drops_empty_link() {
        let body = br#"{"status":"success","whatsapp_url":"","message":"ok"}"#;
        assert_eq!(
            parse_sale(body).unwrap(),
            SaleOutcome::Confirmed {
                whatsapp_url: None,
                message: Some("ok".to_string()),
            }
        );
    }

    #[test]
    fn sale_null_link_is_absent() {
        let body = br#"{"status":"success","whatsapp_url":null}"#;
        assert!(matches!(
            parse_sale(body).unwrap(),
            SaleOutcome::Confirmed { whatsapp_url: None, .. }
        ));
    }

    #[test]
    fn sale_failure_keeps_message() {
        let body = br#"{"status":"error","message":"Fallo interno"}"#;
        assert_eq!(
            parse_sale(body).unwrap(),
            SaleOutcome::Rejected {
                message: Some("Fallo interno".to_string()),
            }
        );
    }
}
