//! Per-user notifications for rolecall staffing transitions.
//!
//! This crate defines the notification record published for every visible
//! state change and the [`NotificationStore`] that keeps one mailbox per
//! recipient. Actions attached to a notification are plain data: the
//! collaborator resolves them by calling the engine with the referenced
//! invitation id.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rolecall_storage::{
    Budget, CounterOffer, EventId, Invitation, InvitationId, MemberKind, Role, RoleId, UserId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

mod mailbox;

pub use mailbox::{NotificationStore, NotificationStream, DEFAULT_FEED_CAPACITY};

/// Unique identifier for a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    /// Generate a new notification ID using UUID v7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NotificationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Rendering category of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
    Invitation,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
            NotificationKind::Invitation => "invitation",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the recipient can do about the referenced invitation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Accept,
    Decline,
    View,
}

/// Actions bound to the invitation a notification originated from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationActions {
    pub invitation_id: InvitationId,
    pub kinds: BTreeSet<ActionKind>,
}

impl NotificationActions {
    pub fn new(invitation_id: InvitationId, kinds: impl IntoIterator<Item = ActionKind>) -> Self {
        Self {
            invitation_id,
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn allows(&self, kind: ActionKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Role, invitation and event fields a client needs to render a notification
/// without another round trip.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsibilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation_id: Option<InvitationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_offer: Option<CounterOffer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NotificationPayload {
    /// Payload carrying the full terms of a role.
    pub fn for_role(role: &Role) -> Self {
        Self {
            event_id: Some(role.event_id),
            role_id: Some(role.id),
            role_title: Some(role.title.clone()),
            role_description: Some(role.description.clone()),
            budget: Some(role.budget.clone()),
            responsibilities: role.responsibilities.clone(),
            requirements: role.requirements.clone(),
            deadline: Some(role.deadline),
            ..Self::default()
        }
    }

    /// Lightweight reference to a role: ids and title only.
    pub fn role_ref(role: &Role) -> Self {
        Self {
            event_id: Some(role.event_id),
            role_id: Some(role.id),
            role_title: Some(role.title.clone()),
            ..Self::default()
        }
    }

    /// Attach the invitation's id, candidate and negotiated terms.
    pub fn with_invitation(mut self, invitation: &Invitation) -> Self {
        self.invitation_id = Some(invitation.id);
        self.candidate_id = Some(invitation.candidate_id);
        self.counter_offer = invitation.counter_offer.clone();
        self.note = invitation.note.clone();
        self
    }
}

/// A message in one user's mailbox.
///
/// Immutable after publication except for the `read` flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub recipient_role: MemberKind,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub payload: NotificationPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<NotificationActions>,
}

impl Notification {
    /// Create a new notification builder
    pub fn builder(
        recipient_id: UserId,
        recipient_role: MemberKind,
        kind: NotificationKind,
    ) -> NotificationBuilder {
        NotificationBuilder::new(recipient_id, recipient_role, kind)
    }
}

/// Builder for constructing notifications
pub struct NotificationBuilder {
    recipient_id: UserId,
    recipient_role: MemberKind,
    kind: NotificationKind,
    title: String,
    message: String,
    created_at: Option<DateTime<Utc>>,
    payload: NotificationPayload,
    actions: Option<NotificationActions>,
}

impl NotificationBuilder {
    pub fn new(recipient_id: UserId, recipient_role: MemberKind, kind: NotificationKind) -> Self {
        Self {
            recipient_id,
            recipient_role,
            kind,
            title: String::new(),
            message: String::new(),
            created_at: None,
            payload: NotificationPayload::default(),
            actions: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn payload(mut self, payload: NotificationPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn actions(mut self, actions: NotificationActions) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn build(self) -> Notification {
        Notification {
            id: NotificationId::new(),
            recipient_id: self.recipient_id,
            recipient_role: self.recipient_role,
            kind: self.kind,
            title: self.title,
            message: self.message,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            read: false,
            payload: self.payload,
            actions: self.actions,
        }
    }
}

/// Error type for notification store operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification not found: {0}")]
    NotFound(NotificationId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolecall_storage::InvitationStatus;

    fn sample_role() -> Role {
        Role {
            id: RoleId::new(),
            event_id: EventId::new(),
            organizer_id: UserId::new(),
            title: "Logistics lead".to_string(),
            description: "Venue and vendors".to_string(),
            budget: Budget::new(5000, "USD"),
            responsibilities: vec!["Coordinate venue".to_string()],
            requirements: vec!["3 years experience".to_string()],
            deadline: NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
            created_at: Utc::now(),
            retired_at: None,
        }
    }

    #[test]
    fn builder_defaults() {
        let user = UserId::new();
        let n = Notification::builder(user, MemberKind::Manager, NotificationKind::Info)
            .title("Hello")
            .message("World")
            .build();
        assert_eq!(n.recipient_id, user);
        assert_eq!(n.kind, NotificationKind::Info);
        assert!(!n.read);
        assert!(n.actions.is_none());
        assert_eq!(n.payload, NotificationPayload::default());
    }

    #[test]
    fn payload_for_role_carries_terms() {
        let role = sample_role();
        let payload = NotificationPayload::for_role(&role);
        assert_eq!(payload.role_title.as_deref(), Some("Logistics lead"));
        assert_eq!(payload.budget, Some(Budget::new(5000, "USD")));
        assert_eq!(payload.responsibilities, role.responsibilities);
        assert_eq!(payload.requirements, role.requirements);
        assert_eq!(payload.deadline, Some(role.deadline));
        assert!(payload.invitation_id.is_none());
    }

    #[test]
    fn payload_with_invitation_carries_counter_offer() {
        let role = sample_role();
        let now = Utc::now();
        let invitation = Invitation {
            id: InvitationId::new(),
            role_id: role.id,
            event_id: role.event_id,
            candidate_id: UserId::new(),
            status: InvitationStatus::CounterOffered,
            counter_offer: Some(CounterOffer {
                amount: 4500,
                message: "lower rate".to_string(),
            }),
            note: None,
            sent_at: now,
            responded_at: Some(now),
            updated_at: now,
        };
        let payload = NotificationPayload::role_ref(&role).with_invitation(&invitation);
        assert_eq!(payload.invitation_id, Some(invitation.id));
        assert_eq!(payload.candidate_id, Some(invitation.candidate_id));
        assert_eq!(payload.counter_offer.unwrap().amount, 4500);
        assert!(payload.budget.is_none());
    }

    #[test]
    fn actions_serialize_as_data() {
        let invitation_id = InvitationId::new();
        let n = Notification::builder(
            UserId::new(),
            MemberKind::Manager,
            NotificationKind::Invitation,
        )
        .actions(NotificationActions::new(
            invitation_id,
            [ActionKind::View, ActionKind::Accept, ActionKind::Decline],
        ))
        .build();

        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "invitation");
        assert_eq!(json["recipient_role"], "manager");
        assert_eq!(
            json["actions"]["kinds"],
            serde_json::json!(["accept", "decline", "view"])
        );
        assert_eq!(
            json["actions"]["invitation_id"],
            serde_json::json!(invitation_id.to_string())
        );

        let back: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(back, n);
        assert!(back.actions.unwrap().allows(ActionKind::Accept));
    }

    #[test]
    fn notify_error_display() {
        let id = NotificationId::new();
        let err = NotifyError::NotFound(id);
        assert_eq!(err.to_string(), format!("notification not found: {}", id));
    }
}
