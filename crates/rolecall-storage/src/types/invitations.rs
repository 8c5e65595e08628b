//! Invitation types and the status lifecycle.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, InvitationId, RoleId, UserId};

/// Negotiation status of an invitation.
///
/// ```text
/// Sent ──► Accepted ───────┐
///   │                      ├──► Selected
///   ├────► CounterOffered ─┘
///   └────► Declined
/// ```
///
/// Any live status may also be forced to `Declined` when a sibling is
/// selected or the role is retired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Sent,
    Accepted,
    Declined,
    CounterOffered,
    Selected,
}

/// Error type for parsing InvitationStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseInvitationStatusError(pub String);

impl std::fmt::Display for ParseInvitationStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid invitation status: {}", self.0)
    }
}

impl std::error::Error for ParseInvitationStatusError {}

impl FromStr for InvitationStatus {
    type Err = ParseInvitationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(InvitationStatus::Sent),
            "accepted" => Ok(InvitationStatus::Accepted),
            "declined" => Ok(InvitationStatus::Declined),
            "counter_offered" => Ok(InvitationStatus::CounterOffered),
            "selected" => Ok(InvitationStatus::Selected),
            _ => Err(ParseInvitationStatusError(s.to_string())),
        }
    }
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Sent => "sent",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::CounterOffered => "counter_offered",
            InvitationStatus::Selected => "selected",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvitationStatus::Declined | InvitationStatus::Selected)
    }

    /// Still in play for the role (can be selected or force-declined).
    pub fn is_live(&self) -> bool {
        !self.is_terminal()
    }

    /// The candidate has answered positively, so the organizer may select.
    pub fn is_selectable(&self) -> bool {
        matches!(
            self,
            InvitationStatus::Accepted | InvitationStatus::CounterOffered
        )
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terms proposed by a candidate instead of the role budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterOffer {
    pub amount: i64, // Same currency as the role budget
    pub message: String,
}

/// Invitation record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub role_id: RoleId,
    pub event_id: EventId,
    pub candidate_id: UserId,
    pub status: InvitationStatus,
    pub counter_offer: Option<CounterOffer>,
    pub note: Option<String>, // Organizer's message sent with the invite
    pub sent_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>, // Candidate's own answer only
    pub updated_at: DateTime<Utc>,
}
