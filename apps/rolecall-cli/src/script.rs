//! Scenario scripts.
//!
//! A script registers members under labels and then lists steps that refer
//! to members, events, roles and invitations by label:
//!
//! ```json
//! {
//!   "members": [{ "label": "olivia", "name": "Olivia", "kind": "organizer" }],
//!   "steps": [
//!     { "op": "create_role", "label": "lead", "event": "gala", "organizer": "olivia",
//!       "title": "Logistics lead", "budget": { "amount": 5000, "currency": "USD" },
//!       "deadline": { "in_days": 7 } },
//!     { "op": "select", "invitation": "inv1", "expect_error": "conflict" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use rolecall_engine::{Decision, ErrorKind};
use rolecall_storage::{Budget, CounterOffer, MemberKind};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub members: Vec<MemberSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemberSpec {
    pub label: String,
    pub name: String,
    pub kind: MemberKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    /// The step passes only if it fails with this kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_error: Option<ErrorKind>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    CreateRole {
        label: String,
        event: String,
        organizer: String,
        title: String,
        #[serde(default)]
        description: String,
        budget: Budget,
        #[serde(default)]
        responsibilities: Vec<String>,
        #[serde(default)]
        requirements: Vec<String>,
        deadline: Deadline,
    },
    RetireRole {
        role: String,
    },
    Invite {
        label: String,
        role: String,
        candidate: String,
        #[serde(default)]
        note: Option<String>,
    },
    Respond {
        invitation: String,
        decision: Decision,
        #[serde(default)]
        counter_offer: Option<CounterOffer>,
    },
    Select {
        invitation: String,
    },
    ListRoles {
        event: String,
    },
    Board {
        event: String,
    },
    Inbox {
        member: String,
    },
    Notifications {
        member: String,
    },
    MarkAllRead {
        member: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateRole { .. } => "create_role",
            Action::RetireRole { .. } => "retire_role",
            Action::Invite { .. } => "invite",
            Action::Respond { .. } => "respond",
            Action::Select { .. } => "select",
            Action::ListRoles { .. } => "list_roles",
            Action::Board { .. } => "board",
            Action::Inbox { .. } => "inbox",
            Action::Notifications { .. } => "notifications",
            Action::MarkAllRead { .. } => "mark_all_read",
        }
    }
}

/// Either a calendar date or an offset from today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deadline {
    Date(NaiveDate),
    InDays { in_days: i64 },
}

impl Deadline {
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Deadline::Date(date) => *date,
            Deadline::InDays { in_days } => today + Duration::days(*in_days),
        }
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check labels: members are unique, and every reference points at a
    /// label defined earlier in the script.
    pub fn check(&self) -> Result<(), CliError> {
        let mut problems = Vec::new();

        let mut members = HashSet::new();
        for member in &self.members {
            if !members.insert(member.label.as_str()) {
                problems.push(format!("member '{}' is defined twice", member.label));
            }
        }

        let mut roles = HashSet::new();
        let mut invitations = HashSet::new();
        for (i, step) in self.steps.iter().enumerate() {
            let at = i + 1;
            match &step.action {
                Action::CreateRole {
                    label, organizer, ..
                } => {
                    unknown(&mut problems, at, "member", &members, organizer);
                    if !roles.insert(label.as_str()) {
                        problems.push(format!("step {}: role '{}' is defined twice", at, label));
                    }
                }
                Action::RetireRole { role } => unknown(&mut problems, at, "role", &roles, role),
                Action::Invite {
                    label,
                    role,
                    candidate,
                    ..
                } => {
                    unknown(&mut problems, at, "role", &roles, role);
                    unknown(&mut problems, at, "member", &members, candidate);
                    if !invitations.insert(label.as_str()) && step.expect_error.is_none() {
                        problems.push(format!(
                            "step {}: invitation '{}' is defined twice",
                            at, label
                        ));
                    }
                }
                Action::Respond { invitation, .. } | Action::Select { invitation } => {
                    unknown(&mut problems, at, "invitation", &invitations, invitation)
                }
                Action::Inbox { member }
                | Action::Notifications { member }
                | Action::MarkAllRead { member } => {
                    unknown(&mut problems, at, "member", &members, member)
                }
                Action::ListRoles { .. } | Action::Board { .. } => {}
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CliError::Check(problems))
        }
    }
}

fn unknown(
    problems: &mut Vec<String>,
    at: usize,
    kind: &str,
    known: &HashSet<&str>,
    label: &str,
) {
    if !known.contains(label) {
        problems.push(format!("step {}: unknown {} '{}'", at, kind, label));
    }
}
