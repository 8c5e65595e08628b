//! In-memory store implementation using concurrent hash maps.
//!
//! This implementation is suitable for:
//! - Single process deployments
//! - Development and testing
//!
//! Records live for the lifetime of the process. Uniqueness of the
//! (role, candidate) pair is enforced here, like a unique index would be.
//!
//! A role's invitations are kept together in one map entry, so a batch
//! update is applied under a single write guard and readers observe the
//! role either before or after it.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rolecall_storage::{
    EventId, Invitation, InvitationId, Member, MemberKind, Role, RoleId, Store, StoreError,
    UserId,
};

/// Process-scoped store backed by `DashMap`s.
#[derive(Default)]
pub struct MemoryStore {
    members: DashMap<UserId, (u64, Member)>,
    member_seq: AtomicU64,
    roles: DashMap<RoleId, Role>,
    roles_by_event: DashMap<EventId, Vec<RoleId>>,
    /// Invitation records per role, in the order they were sent.
    invitations: DashMap<RoleId, Vec<Invitation>>,
    /// Where each invitation sits in `invitations`. Positions never move.
    invitation_slots: DashMap<InvitationId, (RoleId, usize)>,
    invited_pairs: DashMap<(RoleId, UserId), InvitationId>,
    invitations_by_candidate: DashMap<UserId, Vec<InvitationId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, invitation_id: &InvitationId) -> Option<(RoleId, usize)> {
        self.invitation_slots.get(invitation_id).map(|slot| *slot)
    }

    fn read_invitation(&self, invitation_id: &InvitationId) -> Option<Invitation> {
        let (role_id, pos) = self.slot(invitation_id)?;
        let records = self.invitations.get(&role_id)?;
        records.get(pos).cloned()
    }

    /// Validate and write a batch of updates to one role's invitations.
    ///
    /// Every record must already exist under the same role and keep its
    /// candidate. Nothing is written unless the whole batch checks out.
    fn apply_batch(&self, batch: &[Invitation]) -> Result<(), StoreError> {
        let Some(first) = batch.first() else {
            return Ok(());
        };
        let role_id = first.role_id;
        if batch.iter().any(|inv| inv.role_id != role_id) {
            return Err(StoreError::Conflict);
        }

        let mut positions = Vec::with_capacity(batch.len());
        for inv in batch {
            let (slot_role, pos) = self.slot(&inv.id).ok_or(StoreError::NotFound)?;
            if slot_role != role_id {
                return Err(StoreError::Conflict);
            }
            positions.push(pos);
        }

        let mut records = self.invitations.get_mut(&role_id).ok_or(StoreError::NotFound)?;
        for (inv, &pos) in batch.iter().zip(&positions) {
            let existing = records.get(pos).ok_or(StoreError::NotFound)?;
            if existing.id != inv.id || existing.candidate_id != inv.candidate_id {
                return Err(StoreError::Conflict);
            }
        }
        for (inv, &pos) in batch.iter().zip(&positions) {
            records[pos] = inv.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    // ───────────────────────────── Members ─────────────────────────────

    async fn upsert_member(&self, member: &Member) -> Result<(), StoreError> {
        match self.members.entry(member.id) {
            Entry::Occupied(mut slot) => {
                // Keep the original registration position
                slot.get_mut().1 = member.clone();
            }
            Entry::Vacant(slot) => {
                let seq = self.member_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, member.clone()));
            }
        }
        Ok(())
    }

    async fn get_member(&self, user_id: &UserId) -> Result<Member, StoreError> {
        self.members
            .get(user_id)
            .map(|entry| entry.1.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn list_members(&self, kind: Option<MemberKind>) -> Result<Vec<Member>, StoreError> {
        let mut rows: Vec<(u64, Member)> = self
            .members
            .iter()
            .filter(|entry| kind.map_or(true, |k| entry.1.kind == k))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, member)| member).collect())
    }

    // ───────────────────────────── Roles ───────────────────────────────

    async fn insert_role(&self, role: &Role) -> Result<(), StoreError> {
        match self.roles.entry(role.id) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(role.clone());
                self.roles_by_event
                    .entry(role.event_id)
                    .or_default()
                    .push(role.id);
                Ok(())
            }
        }
    }

    async fn get_role(&self, role_id: &RoleId) -> Result<Role, StoreError> {
        self.roles
            .get(role_id)
            .map(|role| role.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn list_roles(&self, event_id: &EventId) -> Result<Vec<Role>, StoreError> {
        let ids = self
            .roles_by_event
            .get(event_id)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.roles.get(id).map(|role| role.clone()))
            .collect())
    }

    async fn retire_role(
        &self,
        role_id: &RoleId,
        retired_at: DateTime<Utc>,
        cascade: &[Invitation],
    ) -> Result<(), StoreError> {
        let mut role = self.roles.get_mut(role_id).ok_or(StoreError::NotFound)?;
        if role.retired_at.is_some() {
            return Err(StoreError::Conflict);
        }
        if cascade.iter().any(|inv| inv.role_id != *role_id) {
            return Err(StoreError::Conflict);
        }
        self.apply_batch(cascade)?;
        role.retired_at = Some(retired_at);
        Ok(())
    }

    // ───────────────────────────── Invitations ─────────────────────────

    async fn insert_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        match self
            .invited_pairs
            .entry((invitation.role_id, invitation.candidate_id))
        {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(pair) => {
                if self.invitation_slots.contains_key(&invitation.id) {
                    return Err(StoreError::AlreadyExists);
                }
                let mut records = self.invitations.entry(invitation.role_id).or_default();
                // Register the slot before the role's records are readable again
                self.invitation_slots
                    .insert(invitation.id, (invitation.role_id, records.len()));
                records.push(invitation.clone());
                drop(records);

                self.invitations_by_candidate
                    .entry(invitation.candidate_id)
                    .or_default()
                    .push(invitation.id);
                pair.insert(invitation.id);
                Ok(())
            }
        }
    }

    async fn get_invitation(
        &self,
        invitation_id: &InvitationId,
    ) -> Result<Invitation, StoreError> {
        self.read_invitation(invitation_id)
            .ok_or(StoreError::NotFound)
    }

    async fn list_invitations_for_role(
        &self,
        role_id: &RoleId,
    ) -> Result<Vec<Invitation>, StoreError> {
        Ok(self
            .invitations
            .get(role_id)
            .map(|records| records.clone())
            .unwrap_or_default())
    }

    async fn list_invitations_for_candidate(
        &self,
        candidate_id: &UserId,
    ) -> Result<Vec<Invitation>, StoreError> {
        let ids = self
            .invitations_by_candidate
            .get(candidate_id)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.read_invitation(id))
            .collect())
    }

    async fn update_invitations(&self, invitations: &[Invitation]) -> Result<(), StoreError> {
        self.apply_batch(invitations)
    }
}
