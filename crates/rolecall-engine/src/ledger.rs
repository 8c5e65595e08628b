//! Invitation records and the negotiation state machine.
//!
//! Every mutating method checks everything first, writes once, and publishes
//! notifications only after the write succeeded. Callers are expected to hold
//! the role lock (see [`AssignmentCoordinator`](crate::AssignmentCoordinator)).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rolecall_notify::{Notification, NotificationStore};
use rolecall_storage::{
    CounterOffer, Invitation, InvitationId, InvitationStatus, MemberKind, Role, RoleId, Store,
    StoreError, UserId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{lookup_error, EngineError, EngineResult};
use crate::metrics::record_notification;
use crate::notices;

/// A candidate's answer to an invitation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Decline,
    CounterOffer,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Decline => "decline",
            Decision::CounterOffer => "counter_offer",
        }
    }
}

/// An invitation joined with the terms of its role, as a candidate sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationView {
    pub invitation: Invitation,
    pub role: Role,
}

pub struct InvitationLedger<S> {
    store: Arc<S>,
    notifications: Arc<NotificationStore>,
    clock: Arc<dyn Clock>,
    max_invitations_per_role: Option<usize>,
}

impl<S> Clone for InvitationLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifications: Arc::clone(&self.notifications),
            clock: Arc::clone(&self.clock),
            max_invitations_per_role: self.max_invitations_per_role,
        }
    }
}

impl<S: Store> InvitationLedger<S> {
    pub fn new(
        store: Arc<S>,
        notifications: Arc<NotificationStore>,
        clock: Arc<dyn Clock>,
        max_invitations_per_role: Option<usize>,
    ) -> Self {
        Self {
            store,
            notifications,
            clock,
            max_invitations_per_role,
        }
    }

    /// Invite a manager to a role.
    pub async fn invite(
        &self,
        role_id: RoleId,
        candidate_id: UserId,
        note: Option<String>,
    ) -> EngineResult<Invitation> {
        let role = self.active_role(&role_id).await?;

        let candidate = self
            .store
            .get_member(&candidate_id)
            .await
            .map_err(lookup_error("candidate", candidate_id))?;
        if candidate.kind != MemberKind::Manager {
            return Err(EngineError::Validation(format!(
                "{} is an {}, only managers can be invited",
                candidate.name, candidate.kind
            )));
        }

        let siblings = self.store.list_invitations_for_role(&role_id).await?;
        if siblings
            .iter()
            .any(|i| i.status == InvitationStatus::Selected)
        {
            return Err(already_filled(&role));
        }
        if siblings.iter().any(|i| i.candidate_id == candidate_id) {
            return Err(already_invited(&role, &candidate.name));
        }
        if let Some(max) = self.max_invitations_per_role {
            if siblings.len() >= max {
                return Err(EngineError::Conflict(format!(
                    "role '{}' already has the maximum of {} invitations",
                    role.title, max
                )));
            }
        }

        let now = self.clock.now();
        let invitation = Invitation {
            id: InvitationId::new(),
            role_id,
            event_id: role.event_id,
            candidate_id,
            status: InvitationStatus::Sent,
            counter_offer: None,
            note: note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            sent_at: now,
            responded_at: None,
            updated_at: now,
        };

        self.store
            .insert_invitation(&invitation)
            .await
            .map_err(|err| match err {
                StoreError::AlreadyExists => already_invited(&role, &candidate.name),
                other => EngineError::Store(other),
            })?;

        info!(
            invitation_id = %invitation.id,
            role_id = %role_id,
            candidate_id = %candidate_id,
            "invitation sent"
        );
        self.publish(vec![notices::invitation_sent(&role, &invitation)]);
        Ok(invitation)
    }

    /// Record the candidate's single answer to a sent invitation.
    pub async fn respond(
        &self,
        invitation_id: InvitationId,
        decision: Decision,
        counter_offer: Option<CounterOffer>,
    ) -> EngineResult<Invitation> {
        let counter_offer = validate_response(decision, counter_offer)?;

        let current = self.get_invitation(invitation_id).await?;
        if current.status != InvitationStatus::Sent {
            return Err(EngineError::InvalidState(format!(
                "invitation is already {}; a candidate can respond only once",
                current.status
            )));
        }
        let role = self.role(&current.role_id).await?;

        let now = self.clock.now();
        let mut updated = current;
        updated.status = match decision {
            Decision::Accept => InvitationStatus::Accepted,
            Decision::Decline => InvitationStatus::Declined,
            Decision::CounterOffer => InvitationStatus::CounterOffered,
        };
        updated.counter_offer = counter_offer;
        updated.responded_at = Some(now);
        updated.updated_at = now;

        self.store
            .update_invitations(std::slice::from_ref(&updated))
            .await?;

        info!(
            invitation_id = %invitation_id,
            role_id = %updated.role_id,
            status = %updated.status,
            "invitation answered"
        );
        let name = self.display_name(&updated.candidate_id).await;
        let notice = match decision {
            Decision::Accept => notices::invitation_accepted(&role, &updated, &name),
            Decision::Decline => notices::invitation_declined(&role, &updated, &name),
            Decision::CounterOffer => notices::counter_offer_received(&role, &updated, &name),
        };
        self.publish(vec![notice]);
        Ok(updated)
    }

    /// Select a candidate and decline every other live invitation of the role.
    pub async fn select(&self, invitation_id: InvitationId) -> EngineResult<Invitation> {
        let current = self.get_invitation(invitation_id).await?;
        let role = self.active_role(&current.role_id).await?;

        let siblings = self.store.list_invitations_for_role(&role.id).await?;
        if siblings
            .iter()
            .any(|i| i.status == InvitationStatus::Selected)
        {
            return Err(already_filled(&role));
        }

        let target = siblings
            .iter()
            .find(|i| i.id == invitation_id)
            .cloned()
            .unwrap_or(current);
        if !target.status.is_selectable() {
            return Err(EngineError::InvalidState(format!(
                "invitation is {}; only accepted or counter-offered invitations can be selected",
                target.status
            )));
        }

        let now = self.clock.now();
        let mut selected = target;
        selected.status = InvitationStatus::Selected;
        selected.updated_at = now;

        let declined: Vec<Invitation> = siblings
            .into_iter()
            .filter(|i| i.id != invitation_id && i.status.is_live())
            .map(|mut i| {
                i.status = InvitationStatus::Declined;
                i.updated_at = now;
                i
            })
            .collect();

        let mut batch = Vec::with_capacity(declined.len() + 1);
        batch.push(selected.clone());
        batch.extend(declined.iter().cloned());
        self.store.update_invitations(&batch).await?;

        info!(
            invitation_id = %invitation_id,
            role_id = %role.id,
            declined = declined.len(),
            "candidate selected"
        );
        let name = self.display_name(&selected.candidate_id).await;
        let mut outgoing: Vec<Notification> = declined
            .iter()
            .map(|i| notices::role_filled(&role, i))
            .collect();
        outgoing.push(notices::candidate_selected(&role, &selected));
        outgoing.push(notices::assignment_confirmed(&role, &selected, &name));
        self.publish(outgoing);

        Ok(selected)
    }

    pub async fn get_invitation(&self, invitation_id: InvitationId) -> EngineResult<Invitation> {
        self.store
            .get_invitation(&invitation_id)
            .await
            .map_err(lookup_error("invitation", invitation_id))
    }

    /// Role an invitation belongs to. Never changes after creation.
    pub async fn role_of(&self, invitation_id: InvitationId) -> EngineResult<RoleId> {
        Ok(self.get_invitation(invitation_id).await?.role_id)
    }

    /// Invitations of a role in the order they were sent.
    pub async fn list_for_role(&self, role_id: RoleId) -> EngineResult<Vec<Invitation>> {
        self.role(&role_id).await?;
        Ok(self.store.list_invitations_for_role(&role_id).await?)
    }

    /// A candidate's invitations with role terms, most recent first.
    pub async fn list_for_candidate(
        &self,
        candidate_id: UserId,
    ) -> EngineResult<Vec<InvitationView>> {
        let invitations = self
            .store
            .list_invitations_for_candidate(&candidate_id)
            .await?;

        let mut views = Vec::with_capacity(invitations.len());
        for invitation in invitations.into_iter().rev() {
            let role = self.role(&invitation.role_id).await?;
            views.push(InvitationView { invitation, role });
        }
        Ok(views)
    }

    /// Live invitations of a role, already moved to `Declined` as of `at`.
    pub(crate) async fn plan_withdrawal(
        &self,
        role: &Role,
        at: DateTime<Utc>,
    ) -> EngineResult<Vec<Invitation>> {
        let invitations = self.store.list_invitations_for_role(&role.id).await?;
        Ok(invitations
            .into_iter()
            .filter(|i| i.status.is_live())
            .map(|mut i| {
                i.status = InvitationStatus::Declined;
                i.updated_at = at;
                i
            })
            .collect())
    }

    /// Tell each affected candidate and the organizer about a retirement.
    pub(crate) fn announce_withdrawal(&self, role: &Role, declined: &[Invitation]) {
        let mut outgoing: Vec<Notification> = declined
            .iter()
            .map(|i| notices::role_withdrawn(role, i))
            .collect();
        outgoing.push(notices::role_retired(role, declined.len()));
        self.publish(outgoing);
    }

    async fn role(&self, role_id: &RoleId) -> EngineResult<Role> {
        self.store
            .get_role(role_id)
            .await
            .map_err(lookup_error("role", role_id))
    }

    async fn active_role(&self, role_id: &RoleId) -> EngineResult<Role> {
        let role = self.role(role_id).await?;
        if !role.is_active() {
            return Err(EngineError::NotFound(format!(
                "role {} has been retired",
                role_id
            )));
        }
        Ok(role)
    }

    // Falls back to the id so a missing directory entry never blocks a transition
    async fn display_name(&self, user_id: &UserId) -> String {
        match self.store.get_member(user_id).await {
            Ok(member) => member.name,
            Err(_) => user_id.to_string(),
        }
    }

    fn publish(&self, outgoing: Vec<Notification>) {
        for notification in outgoing {
            record_notification(notification.kind);
            self.notifications.publish(notification);
        }
    }
}

fn validate_response(
    decision: Decision,
    counter_offer: Option<CounterOffer>,
) -> EngineResult<Option<CounterOffer>> {
    match (decision, counter_offer) {
        (Decision::CounterOffer, None) => Err(EngineError::Validation(
            "a counter offer needs an amount and a message".to_string(),
        )),
        (Decision::CounterOffer, Some(offer)) => {
            if offer.amount <= 0 {
                return Err(EngineError::Validation(
                    "counter offer amount must be greater than zero".to_string(),
                ));
            }
            let message = offer.message.trim();
            if message.is_empty() {
                return Err(EngineError::Validation(
                    "counter offer message must not be empty".to_string(),
                ));
            }
            Ok(Some(CounterOffer {
                amount: offer.amount,
                message: message.to_string(),
            }))
        }
        (decision, Some(_)) => Err(EngineError::Validation(format!(
            "a counter offer cannot be attached to {}",
            decision.as_str()
        ))),
        (_, None) => Ok(None),
    }
}

fn already_filled(role: &Role) -> EngineError {
    EngineError::Conflict(format!("role '{}' is already filled", role.title))
}

fn already_invited(role: &Role, candidate_name: &str) -> EngineError {
    EngineError::Conflict(format!(
        "{} has already been invited to '{}'",
        candidate_name, role.title
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(amount: i64, message: &str) -> Option<CounterOffer> {
        Some(CounterOffer {
            amount,
            message: message.to_string(),
        })
    }

    #[test]
    fn counter_offer_needs_positive_amount_and_message() {
        assert!(matches!(
            validate_response(Decision::CounterOffer, offer(0, "x")),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            validate_response(Decision::CounterOffer, offer(500, "")),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            validate_response(Decision::CounterOffer, offer(500, "   ")),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            validate_response(Decision::CounterOffer, None),
            Err(EngineError::Validation(_))
        ));

        let ok = validate_response(Decision::CounterOffer, offer(4500, " lower rate "))
            .unwrap()
            .unwrap();
        assert_eq!(ok.message, "lower rate");
    }

    #[test]
    fn plain_answers_take_no_terms() {
        assert!(validate_response(Decision::Accept, None).unwrap().is_none());
        assert!(validate_response(Decision::Decline, None).unwrap().is_none());
        assert!(matches!(
            validate_response(Decision::Accept, offer(10, "more")),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn decision_serde_names() {
        assert_eq!(
            serde_json::to_string(&Decision::CounterOffer).unwrap(),
            "\"counter_offer\""
        );
        let d: Decision = serde_json::from_str("\"decline\"").unwrap();
        assert_eq!(d, Decision::Decline);
    }
}
