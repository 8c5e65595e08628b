#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rolecall_engine::{AssignmentCoordinator, Decision, EngineConfig, ManualClock, NewRole};
use rolecall_storage::{
    Budget, CounterOffer, EventId, Invitation, InvitationStatus, Member, MemberKind, Role,
    RoleId, UserId,
};
use rolecall_store_memory::MemoryStore;

pub struct Harness {
    pub engine: Arc<AssignmentCoordinator<MemoryStore>>,
    pub clock: Arc<ManualClock>,
    pub organizer: Member,
    pub event_id: EventId,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(EngineConfig::default()).await
    }

    pub async fn with_config(config: EngineConfig) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap(),
        ));
        let engine = Arc::new(AssignmentCoordinator::with_clock(
            Arc::new(MemoryStore::new()),
            Arc::new(config.notification_store()),
            clock.clone(),
            &config,
        ));
        let organizer = engine
            .register_member("Olivia Organizer", MemberKind::Organizer)
            .await
            .unwrap();
        Self {
            engine,
            clock,
            organizer,
            event_id: EventId::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        use rolecall_engine::Clock;
        self.clock.today()
    }

    pub async fn manager(&self, name: &str) -> Member {
        self.engine
            .register_member(name, MemberKind::Manager)
            .await
            .unwrap()
    }

    pub fn params(&self, title: &str) -> NewRole {
        NewRole {
            event_id: self.event_id,
            organizer_id: self.organizer.id,
            title: title.to_string(),
            description: "Keeps the show running".to_string(),
            budget: Budget::new(5000, "USD"),
            responsibilities: vec!["Coordinate vendors".to_string()],
            requirements: vec!["Two prior events".to_string()],
            deadline: self.today() + Duration::days(7),
        }
    }

    pub async fn role(&self, title: &str) -> Role {
        self.engine.create_role(self.params(title)).await.unwrap()
    }

    pub async fn invite(&self, role: &Role, candidate: &Member) -> Invitation {
        self.engine.invite(role.id, candidate.id, None).await.unwrap()
    }

    pub async fn accept(&self, invitation: &Invitation) -> Invitation {
        self.engine
            .respond(invitation.id, Decision::Accept, None)
            .await
            .unwrap()
    }

    pub async fn counter(
        &self,
        invitation: &Invitation,
        amount: i64,
        message: &str,
    ) -> Invitation {
        self.engine
            .respond(
                invitation.id,
                Decision::CounterOffer,
                Some(offer(amount, message)),
            )
            .await
            .unwrap()
    }

    pub async fn status(&self, invitation: &Invitation) -> InvitationStatus {
        self.engine
            .get_invitation(invitation.id)
            .await
            .unwrap()
            .status
    }

    pub async fn selected_count(&self, role_id: RoleId) -> usize {
        self.engine
            .invitations_for_role(role_id)
            .await
            .unwrap()
            .iter()
            .filter(|i| i.status == InvitationStatus::Selected)
            .count()
    }

    pub fn mailbox_len(&self, user_id: UserId) -> usize {
        self.engine.list_notifications(user_id).len()
    }
}

pub fn offer(amount: i64, message: &str) -> CounterOffer {
    CounterOffer {
        amount,
        message: message.to_string(),
    }
}
