//! Member types: the organizers and managers taking part in staffing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UserId;

/// Which side of the staffing flow a member acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Defines roles for their events and selects candidates.
    Organizer,
    /// Receives invitations and responds to them.
    Manager,
}

/// Error type for parsing MemberKind from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMemberKindError(pub String);

impl std::fmt::Display for ParseMemberKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid member kind: {}", self.0)
    }
}

impl std::error::Error for ParseMemberKindError {}

impl FromStr for MemberKind {
    type Err = ParseMemberKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organizer" => Ok(MemberKind::Organizer),
            "manager" => Ok(MemberKind::Manager),
            _ => Err(ParseMemberKindError(s.to_string())),
        }
    }
}

impl MemberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Organizer => "organizer",
            MemberKind::Manager => "manager",
        }
    }
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    pub name: String,
    pub kind: MemberKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_kind_parse() {
        assert_eq!("organizer".parse::<MemberKind>(), Ok(MemberKind::Organizer));
        assert_eq!("manager".parse::<MemberKind>(), Ok(MemberKind::Manager));
        let err = "vendor".parse::<MemberKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid member kind: vendor");
    }

    #[test]
    fn member_kind_as_str_matches_serde() {
        for kind in [MemberKind::Organizer, MemberKind::Manager] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
