//! Notification texts for each staffing transition.

use rolecall_notify::{
    ActionKind, Notification, NotificationActions, NotificationBuilder, NotificationKind,
    NotificationPayload,
};
use rolecall_storage::{Invitation, MemberKind, Role};

/// New invitation, addressed to the candidate.
pub(crate) fn invitation_sent(role: &Role, invitation: &Invitation) -> Notification {
    let mut message = format!(
        "You have been invited to serve as {} for {}. Please respond by {}.",
        role.title, role.budget, role.deadline
    );
    if let Some(note) = &invitation.note {
        message.push_str("\n\n");
        message.push_str(note);
    }

    Notification::builder(
        invitation.candidate_id,
        MemberKind::Manager,
        NotificationKind::Invitation,
    )
    .title("New Role Invitation")
    .message(message)
    .created_at(invitation.sent_at)
    .payload(NotificationPayload::for_role(role).with_invitation(invitation))
    .actions(NotificationActions::new(
        invitation.id,
        [ActionKind::Accept, ActionKind::Decline, ActionKind::View],
    ))
    .build()
}

pub(crate) fn invitation_accepted(
    role: &Role,
    invitation: &Invitation,
    candidate_name: &str,
) -> Notification {
    to_organizer(role, invitation, NotificationKind::Success)
        .title("Invitation Accepted")
        .message(format!(
            "{} accepted the {} role at {}.",
            candidate_name, role.title, role.budget
        ))
        .actions(NotificationActions::new(invitation.id, [ActionKind::View]))
        .build()
}

pub(crate) fn invitation_declined(
    role: &Role,
    invitation: &Invitation,
    candidate_name: &str,
) -> Notification {
    to_organizer(role, invitation, NotificationKind::Info)
        .title("Invitation Declined")
        .message(format!(
            "{} declined the {} role.",
            candidate_name, role.title
        ))
        .build()
}

/// Counter-offer, addressed to the organizer. Accepting it means selecting
/// the candidate.
pub(crate) fn counter_offer_received(
    role: &Role,
    invitation: &Invitation,
    candidate_name: &str,
) -> Notification {
    let terms = match &invitation.counter_offer {
        Some(offer) => format!(
            " proposing {} {} instead of {}: {}",
            role.budget.currency, offer.amount, role.budget, offer.message
        ),
        None => String::new(),
    };

    to_organizer(role, invitation, NotificationKind::Invitation)
        .title("Counter Offer Received")
        .message(format!(
            "{} sent a counter offer for {}{}",
            candidate_name, role.title, terms
        ))
        .actions(NotificationActions::new(
            invitation.id,
            [ActionKind::Accept, ActionKind::View],
        ))
        .build()
}

/// Sent to every live sibling declined by a selection.
pub(crate) fn role_filled(role: &Role, invitation: &Invitation) -> Notification {
    to_candidate(role, invitation, NotificationKind::Info)
        .title("Role Filled")
        .message(format!(
            "The {} role has been filled by another candidate.",
            role.title
        ))
        .build()
}

pub(crate) fn candidate_selected(role: &Role, invitation: &Invitation) -> Notification {
    let agreed = match &invitation.counter_offer {
        Some(offer) => format!("{} {}", role.budget.currency, offer.amount),
        None => role.budget.to_string(),
    };

    to_candidate(role, invitation, NotificationKind::Success)
        .title("You Have Been Selected")
        .message(format!(
            "You have been selected as {} at {}.",
            role.title, agreed
        ))
        .actions(NotificationActions::new(invitation.id, [ActionKind::View]))
        .build()
}

pub(crate) fn assignment_confirmed(
    role: &Role,
    invitation: &Invitation,
    candidate_name: &str,
) -> Notification {
    to_organizer(role, invitation, NotificationKind::Success)
        .title("Assignment Confirmed")
        .message(format!(
            "{} is now assigned to {}.",
            candidate_name, role.title
        ))
        .actions(NotificationActions::new(invitation.id, [ActionKind::View]))
        .build()
}

/// Sent to each candidate whose open invitation a retirement declined.
pub(crate) fn role_withdrawn(role: &Role, invitation: &Invitation) -> Notification {
    to_candidate(role, invitation, NotificationKind::Warning)
        .title("Role Withdrawn")
        .message(format!(
            "The {} role has been withdrawn by the organizer. Your invitation is no longer open.",
            role.title
        ))
        .build()
}

pub(crate) fn role_retired(role: &Role, declined: usize) -> Notification {
    let at = role.retired_at.unwrap_or(role.created_at);
    Notification::builder(role.organizer_id, MemberKind::Organizer, NotificationKind::Info)
        .title("Role Retired")
        .message(format!(
            "{} has been retired. {} open invitation(s) were declined.",
            role.title, declined
        ))
        .created_at(at)
        .payload(NotificationPayload::role_ref(role))
        .build()
}

fn to_organizer(
    role: &Role,
    invitation: &Invitation,
    kind: NotificationKind,
) -> NotificationBuilder {
    Notification::builder(role.organizer_id, MemberKind::Organizer, kind)
        .created_at(invitation.updated_at)
        .payload(NotificationPayload::role_ref(role).with_invitation(invitation))
}

fn to_candidate(
    role: &Role,
    invitation: &Invitation,
    kind: NotificationKind,
) -> NotificationBuilder {
    Notification::builder(invitation.candidate_id, MemberKind::Manager, kind)
        .created_at(invitation.updated_at)
        .payload(NotificationPayload::role_ref(role).with_invitation(invitation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rolecall_storage::{
        Budget, CounterOffer, EventId, InvitationId, InvitationStatus, RoleId, UserId,
    };

    fn role() -> Role {
        Role {
            id: RoleId::new(),
            event_id: EventId::new(),
            organizer_id: UserId::new(),
            title: "Stage manager".to_string(),
            description: "Runs the main stage".to_string(),
            budget: Budget::new(5000, "USD"),
            responsibilities: vec!["Cue changes".to_string()],
            requirements: vec!["Radio license".to_string()],
            deadline: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            created_at: Utc::now(),
            retired_at: None,
        }
    }

    fn invitation(role: &Role, status: InvitationStatus) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: InvitationId::new(),
            role_id: role.id,
            event_id: role.event_id,
            candidate_id: UserId::new(),
            status,
            counter_offer: None,
            note: Some("Hope you can make it".to_string()),
            sent_at: now,
            responded_at: None,
            updated_at: now,
        }
    }

    #[test]
    fn invitation_carries_terms_and_actions() {
        let role = role();
        let inv = invitation(&role, InvitationStatus::Sent);
        let n = invitation_sent(&role, &inv);

        assert_eq!(n.recipient_id, inv.candidate_id);
        assert_eq!(n.kind, NotificationKind::Invitation);
        assert!(n.message.contains("Stage manager"));
        assert!(n.message.contains("USD 5000"));
        assert!(n.message.ends_with("Hope you can make it"));
        assert_eq!(n.payload.requirements, role.requirements);
        assert_eq!(n.payload.note.as_deref(), Some("Hope you can make it"));

        let actions = n.actions.unwrap();
        assert_eq!(actions.invitation_id, inv.id);
        assert!(actions.allows(ActionKind::Accept));
        assert!(actions.allows(ActionKind::Decline));
        assert!(actions.allows(ActionKind::View));
    }

    #[test]
    fn counter_offer_goes_to_organizer_with_terms() {
        let role = role();
        let mut inv = invitation(&role, InvitationStatus::CounterOffered);
        inv.counter_offer = Some(CounterOffer {
            amount: 4500,
            message: "lower rate".to_string(),
        });
        let n = counter_offer_received(&role, &inv, "Maya");

        assert_eq!(n.recipient_id, role.organizer_id);
        assert_eq!(n.recipient_role, MemberKind::Organizer);
        assert_eq!(n.kind, NotificationKind::Invitation);
        assert!(n.message.contains("USD 4500"));
        assert!(n.message.contains("lower rate"));
        assert_eq!(n.payload.counter_offer.as_ref().unwrap().amount, 4500);
        assert!(!n.actions.unwrap().allows(ActionKind::Decline));
    }

    #[test]
    fn selection_quotes_agreed_amount() {
        let role = role();
        let mut inv = invitation(&role, InvitationStatus::Selected);
        assert!(candidate_selected(&role, &inv).message.contains("USD 5000"));

        inv.counter_offer = Some(CounterOffer {
            amount: 4200,
            message: "final".to_string(),
        });
        let n = candidate_selected(&role, &inv);
        assert_eq!(n.kind, NotificationKind::Success);
        assert!(n.message.contains("USD 4200"));
    }

    #[test]
    fn cascade_kinds() {
        let role = role();
        let inv = invitation(&role, InvitationStatus::Declined);
        assert_eq!(role_filled(&role, &inv).kind, NotificationKind::Info);
        assert_eq!(role_withdrawn(&role, &inv).kind, NotificationKind::Warning);

        let summary = role_retired(&role, 2);
        assert_eq!(summary.recipient_id, role.organizer_id);
        assert_eq!(summary.kind, NotificationKind::Info);
        assert!(summary.message.contains("2 open invitation(s)"));
    }
}
