//! Ticket identifiers, statuses and raffle ids.
//!
//! Ticket numbers are zero-padded strings (`"007"`, `"0450"`) owned by the
//! server. The client never does arithmetic on them; it compares them as
//! strings, the same way the server orders and filters them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a ticket identifier was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTicketId {
    /// Identifier was empty
    #[error("ticket identifier is empty")]
    Empty,

    /// Identifier contains whitespace or control characters
    #[error("ticket identifier {0:?} contains whitespace or control characters")]
    IllegalCharacters(String),
}

/// Identifier of one raffle ticket (the printed number)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(String);

impl TicketId {
    /// Validate and wrap an identifier
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTicketId`] if the identifier is empty or contains
    /// whitespace/control characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidTicketId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidTicketId::Empty);
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidTicketId::IllegalCharacters(raw));
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TicketId {
    type Error = InvalidTicketId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a ticket as reported by the server
///
/// Serialized with the storefront's wire names (`disponible`, `reservado`,
/// `vendido`). Any other value is a malformed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Free to be selected
    #[serde(rename = "disponible")]
    Available,
    /// Held by a buyer pending payment verification
    #[serde(rename = "reservado")]
    Reserved,
    /// Paid and confirmed
    #[serde(rename = "vendido")]
    Sold,
}

impl TicketStatus {
    /// Wire name, also used as the presentation class
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "disponible",
            Self::Reserved => "reservado",
            Self::Sold => "vendido",
        }
    }

    /// Whether a ticket in this status can be selected
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Whether a ticket in this status must leave any selection
    #[must_use]
    pub const fn is_taken(self) -> bool {
        matches!(self, Self::Reserved | Self::Sold)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ticket and its last known status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket number
    pub id: TicketId,
    /// Last known status
    pub status: TicketStatus,
}

impl Ticket {
    /// Create a ticket
    #[must_use]
    pub const fn new(id: TicketId, status: TicketStatus) -> Self {
        Self { id, status }
    }
}

/// Identifier of a raffle instance, as rendered on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaffleId(String);

impl RaffleId {
    /// Wrap a raffle id, treating blank input as absent
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Borrow the id text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RaffleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
