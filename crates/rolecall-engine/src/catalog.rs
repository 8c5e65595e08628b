//! Role definitions per event.

use std::sync::Arc;

use chrono::NaiveDate;
use rolecall_storage::{Budget, EventId, MemberKind, Role, RoleId, Store, UserId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{lookup_error, EngineError, EngineResult};
use crate::ledger::InvitationLedger;

/// Parameters for a new role
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
    pub event_id: EventId,
    pub organizer_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub budget: Budget,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub deadline: NaiveDate,
}

pub struct RoleCatalog<S> {
    store: Arc<S>,
    ledger: InvitationLedger<S>,
    clock: Arc<dyn Clock>,
}

impl<S: Store> RoleCatalog<S> {
    pub fn new(store: Arc<S>, ledger: InvitationLedger<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            ledger,
            clock,
        }
    }

    pub async fn create_role(&self, params: NewRole) -> EngineResult<Role> {
        let title = params.title.trim();
        if title.is_empty() {
            return Err(EngineError::Validation(
                "title must not be empty".to_string(),
            ));
        }
        if params.budget.amount <= 0 {
            return Err(EngineError::Validation(
                "budget amount must be greater than zero".to_string(),
            ));
        }
        if !is_currency_code(&params.budget.currency) {
            return Err(EngineError::Validation(format!(
                "currency '{}' is not a three-letter code",
                params.budget.currency
            )));
        }
        let today = self.clock.today();
        if params.deadline < today {
            return Err(EngineError::Validation(format!(
                "deadline {} is in the past",
                params.deadline
            )));
        }

        let organizer = self
            .store
            .get_member(&params.organizer_id)
            .await
            .map_err(lookup_error("organizer", params.organizer_id))?;
        if organizer.kind != MemberKind::Organizer {
            return Err(EngineError::Validation(format!(
                "{} is not an organizer",
                organizer.name
            )));
        }

        let role = Role {
            id: RoleId::new(),
            event_id: params.event_id,
            organizer_id: params.organizer_id,
            title: title.to_string(),
            description: params.description.trim().to_string(),
            budget: params.budget,
            responsibilities: clean_lines(params.responsibilities),
            requirements: clean_lines(params.requirements),
            deadline: params.deadline,
            created_at: self.clock.now(),
            retired_at: None,
        };
        self.store.insert_role(&role).await?;

        info!(role_id = %role.id, event_id = %role.event_id, title = %role.title, "role created");
        Ok(role)
    }

    /// Active roles of an event in creation order.
    pub async fn list_roles(&self, event_id: EventId) -> EngineResult<Vec<Role>> {
        let roles = self.store.list_roles(&event_id).await?;
        Ok(roles.into_iter().filter(Role::is_active).collect())
    }

    /// Any role by id, retired ones included.
    pub async fn get_role(&self, role_id: RoleId) -> EngineResult<Role> {
        self.store
            .get_role(&role_id)
            .await
            .map_err(lookup_error("role", role_id))
    }

    /// Retire a role and force-decline its open invitations.
    pub async fn retire_role(&self, role_id: RoleId) -> EngineResult<Role> {
        let mut role = self.get_role(role_id).await?;
        if !role.is_active() {
            return Err(EngineError::NotFound(format!(
                "role {} is already retired",
                role_id
            )));
        }

        let at = self.clock.now();
        let declined = self.ledger.plan_withdrawal(&role, at).await?;
        self.store.retire_role(&role_id, at, &declined).await?;
        role.retired_at = Some(at);

        info!(role_id = %role_id, declined = declined.len(), "role retired");
        self.ledger.announce_withdrawal(&role, &declined);
        Ok(role)
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
