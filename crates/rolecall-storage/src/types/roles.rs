//! Role types: staffing slots an organizer defines for an event.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, RoleId, UserId};

/// Amount offered for a role, in whole units of `currency`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub amount: i64,
    pub currency: String, // ISO 4217 style, e.g. "USD"
}

impl Budget {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

impl std::fmt::Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}

/// Role record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub event_id: EventId,
    pub organizer_id: UserId,
    pub title: String,
    pub description: String,
    pub budget: Budget,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub retired_at: Option<DateTime<Utc>>, // Set once by retirement, never cleared
}

impl Role {
    /// Whether the role still accepts invitations and selections.
    pub fn is_active(&self) -> bool {
        self.retired_at.is_none()
    }
}
