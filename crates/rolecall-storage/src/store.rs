//! The Store trait that backends implement.

use chrono::{DateTime, Utc};

use crate::types::*;
use crate::StoreError;

/// The record storage trait `rolecall-engine` depends on.
///
/// Backends persist records and enforce key uniqueness; they know nothing
/// about the invitation lifecycle. Callers serialize writes per role.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Members ────────────────────────────────────────

    /// Insert or replace a member record.
    async fn upsert_member(&self, member: &Member) -> Result<(), StoreError>;

    /// Get member by ID.
    async fn get_member(&self, user_id: &UserId) -> Result<Member, StoreError>;

    /// List members in registration order, optionally filtered by kind.
    async fn list_members(&self, kind: Option<MemberKind>) -> Result<Vec<Member>, StoreError>;

    // ───────────────────────────────────── Roles ──────────────────────────────────────────

    /// Insert a new role. Fails with `AlreadyExists` if the ID is taken.
    async fn insert_role(&self, role: &Role) -> Result<(), StoreError>;

    /// Get role by ID (retired roles included).
    async fn get_role(&self, role_id: &RoleId) -> Result<Role, StoreError>;

    /// List all roles of an event in creation order (retired roles included).
    async fn list_roles(&self, event_id: &EventId) -> Result<Vec<Role>, StoreError>;

    /// Mark a role retired and apply the cascaded invitation updates.
    ///
    /// Either the role and every invitation are written, or nothing is.
    async fn retire_role(
        &self,
        role_id: &RoleId,
        retired_at: DateTime<Utc>,
        cascade: &[Invitation],
    ) -> Result<(), StoreError>;

    // ───────────────────────────────────── Invitations ────────────────────────────────────

    /// Insert a new invitation.
    /// Fails with `AlreadyExists` if the (role, candidate) pair is already invited.
    async fn insert_invitation(&self, invitation: &Invitation) -> Result<(), StoreError>;

    /// Get invitation by ID.
    async fn get_invitation(
        &self,
        invitation_id: &InvitationId,
    ) -> Result<Invitation, StoreError>;

    /// List invitations for a role in the order they were sent.
    async fn list_invitations_for_role(
        &self,
        role_id: &RoleId,
    ) -> Result<Vec<Invitation>, StoreError>;

    /// List invitations addressed to a candidate in the order they were sent.
    async fn list_invitations_for_candidate(
        &self,
        candidate_id: &UserId,
    ) -> Result<Vec<Invitation>, StoreError>;

    /// Replace existing invitation records.
    ///
    /// All records of a batch belong to one role, and readers see either
    /// none or all of the batch. If any ID is unknown, nothing is written
    /// and `NotFound` is returned; a batch mixing roles is a `Conflict`.
    async fn update_invitations(&self, invitations: &[Invitation]) -> Result<(), StoreError>;
}
