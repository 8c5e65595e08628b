//! The externally callable staffing API.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use rolecall_notify::{Notification, NotificationId, NotificationStore, NotificationStream};
use rolecall_storage::{
    CounterOffer, EventId, Invitation, InvitationId, Member, MemberKind, Role, RoleId, Store,
    UserId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::catalog::{NewRole, RoleCatalog};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{lookup_error, EngineError, EngineResult};
use crate::ledger::{Decision, InvitationLedger, InvitationView};
use crate::metrics::OperationTimer;

/// An active role with its invitations in sent order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBoard {
    pub role: Role,
    pub invitations: Vec<Invitation>,
}

/// One exclusive lock per role, dropped once the role is retired.
#[derive(Default)]
struct RoleLocks {
    locks: DashMap<RoleId, Arc<Mutex<()>>>,
}

impl RoleLocks {
    async fn acquire(&self, role_id: RoleId) -> OwnedMutexGuard<()> {
        // Clone the Arc so the map shard is released before awaiting
        let lock = self.locks.entry(role_id).or_default().value().clone();
        let guard = lock.lock_owned().await;
        debug!(role_id = %role_id, "role lock acquired");
        guard
    }

    /// Forget the lock of a role that can no longer change.
    ///
    /// Tasks still queued on the old lock find the role retired and fail
    /// with `NotFound`, as does anything taking a fresh lock afterwards.
    fn release(&self, role_id: &RoleId) {
        self.locks.remove(role_id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Serializes every mutation of a role and fans results out to mailboxes.
///
/// Mutations on different roles run concurrently. Reads take no role lock
/// and may observe a state that is about to change.
pub struct AssignmentCoordinator<S> {
    store: Arc<S>,
    catalog: RoleCatalog<S>,
    ledger: InvitationLedger<S>,
    notifications: Arc<NotificationStore>,
    locks: RoleLocks,
}

impl<S: Store> AssignmentCoordinator<S> {
    pub fn new(
        store: Arc<S>,
        notifications: Arc<NotificationStore>,
        config: &EngineConfig,
    ) -> Self {
        Self::with_clock(store, notifications, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        store: Arc<S>,
        notifications: Arc<NotificationStore>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        let ledger = InvitationLedger::new(
            Arc::clone(&store),
            Arc::clone(&notifications),
            Arc::clone(&clock),
            config.max_invitations_per_role,
        );
        let catalog = RoleCatalog::new(Arc::clone(&store), ledger.clone(), clock);
        Self {
            store,
            catalog,
            ledger,
            notifications,
            locks: RoleLocks::default(),
        }
    }

    pub fn notifications(&self) -> &Arc<NotificationStore> {
        &self.notifications
    }

    // ───────────────────────────────────── Members ────────────────────────────────────────

    pub async fn register_member(
        &self,
        name: impl Into<String>,
        kind: MemberKind,
    ) -> EngineResult<Member> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "member name must not be empty".to_string(),
            ));
        }
        let member = Member {
            id: UserId::new(),
            name,
            kind,
        };
        self.store.upsert_member(&member).await?;
        debug!(user_id = %member.id, kind = %member.kind, "member registered");
        Ok(member)
    }

    pub async fn get_member(&self, user_id: UserId) -> EngineResult<Member> {
        self.store
            .get_member(&user_id)
            .await
            .map_err(lookup_error("member", user_id))
    }

    pub async fn list_members(&self, kind: Option<MemberKind>) -> EngineResult<Vec<Member>> {
        Ok(self.store.list_members(kind).await?)
    }

    // ───────────────────────────────────── Roles ──────────────────────────────────────────

    pub async fn create_role(&self, params: NewRole) -> EngineResult<Role> {
        observed("create_role", self.catalog.create_role(params)).await
    }

    pub async fn list_roles(&self, event_id: EventId) -> EngineResult<Vec<Role>> {
        self.catalog.list_roles(event_id).await
    }

    pub async fn get_role(&self, role_id: RoleId) -> EngineResult<Role> {
        self.catalog.get_role(role_id).await
    }

    pub async fn retire_role(&self, role_id: RoleId) -> EngineResult<Role> {
        observed("retire_role", async {
            let _guard = self.locks.acquire(role_id).await;
            let retired = self.catalog.retire_role(role_id).await?;
            self.locks.release(&role_id);
            Ok(retired)
        })
        .await
    }

    /// Every active role of an event with its invitations.
    pub async fn role_board(&self, event_id: EventId) -> EngineResult<Vec<RoleBoard>> {
        let roles = self.catalog.list_roles(event_id).await?;
        let mut boards = Vec::with_capacity(roles.len());
        for role in roles {
            let invitations = self.store.list_invitations_for_role(&role.id).await?;
            boards.push(RoleBoard { role, invitations });
        }
        Ok(boards)
    }

    // ───────────────────────────────────── Invitations ────────────────────────────────────

    pub async fn invite(
        &self,
        role_id: RoleId,
        candidate_id: UserId,
        note: Option<String>,
    ) -> EngineResult<Invitation> {
        observed("invite", async {
            let _guard = self.locks.acquire(role_id).await;
            self.ledger.invite(role_id, candidate_id, note).await
        })
        .await
    }

    pub async fn respond(
        &self,
        invitation_id: InvitationId,
        decision: Decision,
        counter_offer: Option<CounterOffer>,
    ) -> EngineResult<Invitation> {
        observed("respond", async {
            let role_id = self.ledger.role_of(invitation_id).await?;
            let _guard = self.locks.acquire(role_id).await;
            self.ledger
                .respond(invitation_id, decision, counter_offer)
                .await
        })
        .await
    }

    pub async fn select(&self, invitation_id: InvitationId) -> EngineResult<Invitation> {
        observed("select", async {
            let role_id = self.ledger.role_of(invitation_id).await?;
            let _guard = self.locks.acquire(role_id).await;
            self.ledger.select(invitation_id).await
        })
        .await
    }

    pub async fn get_invitation(&self, invitation_id: InvitationId) -> EngineResult<Invitation> {
        self.ledger.get_invitation(invitation_id).await
    }

    pub async fn invitations_for_role(&self, role_id: RoleId) -> EngineResult<Vec<Invitation>> {
        self.ledger.list_for_role(role_id).await
    }

    /// A manager's inbox: invitations with role terms, most recent first.
    pub async fn invitations_for_candidate(
        &self,
        candidate_id: UserId,
    ) -> EngineResult<Vec<InvitationView>> {
        self.ledger.list_for_candidate(candidate_id).await
    }

    // ───────────────────────────────────── Notifications ──────────────────────────────────

    pub fn list_notifications(&self, user_id: UserId) -> Vec<Notification> {
        self.notifications.list(&user_id)
    }

    pub fn list_unread(&self, user_id: UserId) -> Vec<Notification> {
        self.notifications.list_unread(&user_id)
    }

    pub fn unread_count(&self, user_id: UserId) -> usize {
        self.notifications.unread_count(&user_id)
    }

    pub fn mark_read(&self, notification_id: NotificationId) -> EngineResult<()> {
        Ok(self.notifications.mark_read(&notification_id)?)
    }

    pub fn mark_all_read(&self, user_id: UserId) -> usize {
        self.notifications.mark_all_read(&user_id)
    }

    pub fn subscribe(&self, user_id: UserId) -> NotificationStream {
        self.notifications.subscribe(&user_id)
    }
}

async fn observed<T>(
    op: &'static str,
    fut: impl Future<Output = EngineResult<T>>,
) -> EngineResult<T> {
    let timer = OperationTimer::start(op);
    let result = fut.await;
    if let Err(err) = &result {
        match err {
            EngineError::Store(_) => warn!(op = op, error = %err, "operation failed"),
            _ if op == "select" => {
                warn!(op = op, kind = %err.kind(), error = %err, "selection rejected")
            }
            _ => debug!(op = op, kind = %err.kind(), error = %err, "operation rejected"),
        }
    }
    timer.finish(&result);
    result
}
