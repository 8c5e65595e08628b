//! Replays a script against a fresh in-process engine.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rolecall_engine::{AssignmentCoordinator, EngineConfig, EngineResult, ErrorKind, NewRole};
use rolecall_notify::Notification;
use rolecall_storage::{EventId, InvitationId, InvitationStatus, Member, RoleId, UserId};
use rolecall_store_memory::MemoryStore;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::CliError;
use crate::script::{Action, MemberSpec, Step};

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub op: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Ok { summary: String, detail: Value },
    ExpectedError { kind: ErrorKind, message: String },
}

#[derive(Debug, Serialize)]
pub struct MailboxReport {
    pub member: String,
    pub name: String,
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

struct Done {
    summary: String,
    detail: Value,
}

impl Done {
    fn new(summary: String, detail: &impl Serialize) -> Self {
        Self {
            summary,
            detail: serde_json::to_value(detail).unwrap_or_default(),
        }
    }
}

pub struct Runner {
    engine: AssignmentCoordinator<MemoryStore>,
    members: HashMap<String, Member>,
    member_order: Vec<String>,
    events: HashMap<String, EventId>,
    roles: HashMap<String, RoleId>,
    invitations: HashMap<String, InvitationId>,
}

impl Runner {
    pub fn new(config: &EngineConfig) -> Self {
        let engine = AssignmentCoordinator::new(
            Arc::new(MemoryStore::new()),
            Arc::new(config.notification_store()),
            config,
        );
        Self {
            engine,
            members: HashMap::new(),
            member_order: Vec::new(),
            events: HashMap::new(),
            roles: HashMap::new(),
            invitations: HashMap::new(),
        }
    }

    pub async fn register(&mut self, members: &[MemberSpec]) -> Result<(), CliError> {
        for spec in members {
            let member = self
                .engine
                .register_member(spec.name.as_str(), spec.kind)
                .await
                .map_err(|source| CliError::Step {
                    step: 0,
                    op: "register_member",
                    source,
                })?;
            info!(label = %spec.label, user_id = %member.id, "member registered");
            self.members.insert(spec.label.clone(), member);
            self.member_order.push(spec.label.clone());
        }
        Ok(())
    }

    /// Run every step, reporting each one as it finishes. Stops at the first
    /// step whose outcome differs from what the script expects.
    pub async fn run<F>(
        &mut self,
        steps: &[Step],
        mut on_step: F,
    ) -> Result<Vec<StepReport>, CliError>
    where
        F: FnMut(&StepReport),
    {
        let mut reports = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let number = i + 1;
            let op = step.action.name();
            let result = self.execute(&step.action).await?;

            let outcome = match (result, step.expect_error) {
                (Ok(done), None) => Outcome::Ok {
                    summary: done.summary,
                    detail: done.detail,
                },
                (Ok(_), Some(expected)) => {
                    return Err(CliError::UnexpectedSuccess {
                        step: number,
                        op,
                        expected,
                    })
                }
                (Err(err), Some(expected)) if err.kind() == expected => Outcome::ExpectedError {
                    kind: expected,
                    message: err.user_message(),
                },
                (Err(source), _) => {
                    return Err(CliError::Step {
                        step: number,
                        op,
                        source,
                    })
                }
            };

            info!(step = number, op = op, "step finished");
            let report = StepReport {
                step: number,
                op,
                outcome,
            };
            on_step(&report);
            reports.push(report);
        }
        Ok(reports)
    }

    /// Every registered member's mailbox, in registration order.
    pub fn mailboxes(&self) -> Vec<MailboxReport> {
        self.member_order
            .iter()
            .filter_map(|label| self.members.get(label).map(|m| (label, m)))
            .map(|(label, member)| MailboxReport {
                member: label.clone(),
                name: member.name.clone(),
                unread: self.engine.unread_count(member.id),
                notifications: self.engine.list_notifications(member.id),
            })
            .collect()
    }

    async fn execute(&mut self, action: &Action) -> Result<EngineResult<Done>, CliError> {
        let result = match action {
            Action::CreateRole {
                label,
                event,
                organizer,
                title,
                description,
                budget,
                responsibilities,
                requirements,
                deadline,
            } => {
                let params = NewRole {
                    event_id: self.event(event),
                    organizer_id: self.member(organizer)?,
                    title: title.clone(),
                    description: description.clone(),
                    budget: budget.clone(),
                    responsibilities: responsibilities.clone(),
                    requirements: requirements.clone(),
                    deadline: deadline.resolve(Utc::now().date_naive()),
                };
                match self.engine.create_role(params).await {
                    Ok(role) => {
                        self.roles.insert(label.clone(), role.id);
                        let summary = format!(
                            "{}: {} ({}, due {})",
                            label, role.title, role.budget, role.deadline
                        );
                        Ok(Done::new(summary, &role))
                    }
                    Err(err) => Err(err),
                }
            }
            Action::RetireRole { role } => {
                let role_id = self.role(role)?;
                self.engine
                    .retire_role(role_id)
                    .await
                    .map(|retired| Done::new(format!("{} retired", role), &retired))
            }
            Action::Invite {
                label,
                role,
                candidate,
                note,
            } => {
                let role_id = self.role(role)?;
                let candidate_id = self.member(candidate)?;
                match self.engine.invite(role_id, candidate_id, note.clone()).await {
                    Ok(invitation) => {
                        self.invitations.insert(label.clone(), invitation.id);
                        let summary = format!("{}: {} invited to {}", label, candidate, role);
                        Ok(Done::new(summary, &invitation))
                    }
                    Err(err) => Err(err),
                }
            }
            Action::Respond {
                invitation,
                decision,
                counter_offer,
            } => {
                let id = self.invitation(invitation)?;
                self.engine
                    .respond(id, *decision, counter_offer.clone())
                    .await
                    .map(|updated| {
                        Done::new(format!("{} -> {}", invitation, updated.status), &updated)
                    })
            }
            Action::Select { invitation } => {
                let id = self.invitation(invitation)?;
                self.engine
                    .select(id)
                    .await
                    .map(|selected| {
                        Done::new(format!("{} -> {}", invitation, selected.status), &selected)
                    })
            }
            Action::ListRoles { event } => {
                let event_id = self.event(event);
                self.engine.list_roles(event_id).await.map(|roles| {
                    let titles: Vec<_> = roles.iter().map(|r| r.title.as_str()).collect();
                    let summary = format!("{}: [{}]", event, titles.join(", "));
                    Done::new(summary, &roles)
                })
            }
            Action::Board { event } => {
                let event_id = self.event(event);
                match self.engine.role_board(event_id).await {
                    Ok(boards) => {
                        let lines: Vec<String> = boards
                            .iter()
                            .map(|board| {
                                let selected = board
                                    .invitations
                                    .iter()
                                    .find(|i| i.status == InvitationStatus::Selected)
                                    .map(|i| self.label_of(&i.candidate_id))
                                    .unwrap_or_else(|| "open".to_string());
                                format!(
                                    "{} ({} invitation(s), {})",
                                    board.role.title,
                                    board.invitations.len(),
                                    selected
                                )
                            })
                            .collect();
                        Ok(Done::new(format!("{}: {}", event, lines.join("; ")), &boards))
                    }
                    Err(err) => Err(err),
                }
            }
            Action::Inbox { member } => {
                let user_id = self.member(member)?;
                self.engine
                    .invitations_for_candidate(user_id)
                    .await
                    .map(|views| {
                        let summary = format!("{}: {} invitation(s)", member, views.len());
                        Done::new(summary, &views)
                    })
            }
            Action::Notifications { member } => {
                let user_id = self.member(member)?;
                let notifications = self.engine.list_notifications(user_id);
                let summary = format!(
                    "{}: {} notification(s), {} unread",
                    member,
                    notifications.len(),
                    self.engine.unread_count(user_id)
                );
                Ok(Done::new(summary, &notifications))
            }
            Action::MarkAllRead { member } => {
                let user_id = self.member(member)?;
                let changed = self.engine.mark_all_read(user_id);
                Ok(Done::new(format!("{}: {} marked read", member, changed), &changed))
            }
        };
        Ok(result)
    }

    fn member(&self, label: &str) -> Result<UserId, CliError> {
        self.members
            .get(label)
            .map(|m| m.id)
            .ok_or_else(|| CliError::UnknownLabel(label.to_string()))
    }

    fn role(&self, label: &str) -> Result<RoleId, CliError> {
        self.roles
            .get(label)
            .copied()
            .ok_or_else(|| CliError::UnknownLabel(label.to_string()))
    }

    fn invitation(&self, label: &str) -> Result<InvitationId, CliError> {
        self.invitations
            .get(label)
            .copied()
            .ok_or_else(|| CliError::UnknownLabel(label.to_string()))
    }

    // Events need no registration; the first mention creates the id
    fn event(&mut self, label: &str) -> EventId {
        *self.events.entry(label.to_string()).or_default()
    }

    fn label_of(&self, user_id: &UserId) -> String {
        self.members
            .iter()
            .find(|(_, m)| m.id == *user_id)
            .map(|(label, _)| label.clone())
            .unwrap_or_else(|| user_id.to_string())
    }
}
