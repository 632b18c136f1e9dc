//! Interactive shell commands.

use crate::admin::{CancelRequest, SaleRequest};
use crate::grid::TicketRange;
use rifa_core::ticket::{InvalidTicketId, TicketId};
use thiserror::Error;

/// Help text listing every command
pub const HELP: &str = "\
click <número>                              seleccionar / deseleccionar
buy                                         abrir el resumen de compra
chip <número>                               quitar un número desde el resumen
close | backdrop | modal                    clic en cerrar / fondo / contenido del resumen
search <texto>                              escribir en el buscador
range <inicio-fin>                          ir a un rango, p. ej. 100-199
grid                                        mostrar la cuadrícula
sale <url> <csrf> <número> <nombre> <tel>   confirmar una venta (admin)
cancel <url> <csrf> <número>                cancelar una reserva (admin)
help | quit";

/// Parse failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Unrecognized command word
    #[error("Unknown command {0:?}; type `help`")]
    Unknown(String),

    /// A required argument is missing
    #[error("`{command}` needs <{argument}>")]
    MissingArgument {
        /// Command word
        command: &'static str,
        /// Missing argument
        argument: &'static str,
    },

    /// The ticket argument is not a valid ticket id
    #[error(transparent)]
    InvalidTicket(#[from] InvalidTicketId),

    /// The range argument is not `start-end`
    #[error("Invalid range {0:?}; expected e.g. 100-199")]
    InvalidRange(String),
}

/// One shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Click a grid cell
    Click(TicketId),
    /// Click the purchase button
    Buy,
    /// Click a summary chip
    Chip(TicketId),
    /// Click the modal's close control
    Close,
    /// Click the modal's backdrop
    Backdrop,
    /// Click inside the modal
    Modal,
    /// Replace the search box text
    Search(String),
    /// Navigate to a range page
    Range(TicketRange),
    /// Print the grid
    Grid,
    /// Press a confirm-sale button
    Sale(SaleRequest),
    /// Press a cancel-reservation button
    Cancel(CancelRequest),
    /// Print the command list
    Help,
    /// Leave
    Quit,
}

impl Command {
    /// Parse one input line; blank lines yield `None`
    ///
    /// `ticket_count` decides how range bounds are padded.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown commands and bad arguments.
    pub fn parse(line: &str, ticket_count: u32) -> Result<Option<Self>, CommandError> {
        let line = line.trim_start();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let mut args = rest.split_whitespace();

        let command = match word.to_lowercase().as_str() {
            "" => return Ok(None),
            "click" => Self::Click(ticket(args.next(), "click")?),
            "buy" => Self::Buy,
            "chip" => Self::Chip(ticket(args.next(), "chip")?),
            "close" => Self::Close,
            "backdrop" => Self::Backdrop,
            "modal" => Self::Modal,
            "search" => Self::Search(rest.trim_end_matches(['\r', '\n']).to_string()),
            "range" => {
                let label = required(args.next(), "range", "inicio-fin")?;
                let range = TicketRange::parse(label, ticket_count)
                    .ok_or_else(|| CommandError::InvalidRange(label.to_string()))?;
                Self::Range(range)
            },
            "grid" => Self::Grid,
            "sale" => {
                let action = required(args.next(), "sale", "url")?.to_string();
                let csrf_token = required(args.next(), "sale", "csrf")?.to_string();
                let ticket = required(args.next(), "sale", "número")?.to_string();
                let mut tail: Vec<&str> = args.collect();
                let phone = tail.pop().ok_or(CommandError::MissingArgument {
                    command: "sale",
                    argument: "tel",
                })?;
                if tail.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "sale",
                        argument: "nombre",
                    });
                }
                Self::Sale(SaleRequest {
                    action,
                    csrf_token,
                    ticket,
                    buyer_name: tail.join(" "),
                    phone: phone.to_string(),
                })
            },
            "cancel" => Self::Cancel(CancelRequest {
                action: required(args.next(), "cancel", "url")?.to_string(),
                csrf_token: required(args.next(), "cancel", "csrf")?.to_string(),
                ticket: required(args.next(), "cancel", "número")?.to_string(),
            }),
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn required<'a>(
    arg: Option<&'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingArgument { command, argument })
}

fn ticket(arg: Option<&str>, command: &'static str) -> Result<TicketId, CommandError> {
    Ok(TicketId::new(required(arg, command, "número")?)?)
}
