use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one assembly participant: a part at a specific revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberRef {
    pub part_name: String,
    pub revision_index: u32,
}

impl MemberRef {
    pub fn new(part_name: impl Into<String>, revision_index: u32) -> Self {
        Self {
            part_name: part_name.into(),
            revision_index,
        }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.part_name, self.revision_index)
    }
}

/// An assembly member as the surrounding workflow records it.
/// Excluded members are never classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub part_name: String,
    pub revision_index: u32,
    #[serde(default = "default_included")]
    pub included: bool,
}

fn default_included() -> bool {
    true
}

impl Member {
    pub fn new(part_name: impl Into<String>, revision_index: u32) -> Self {
        Self {
            part_name: part_name.into(),
            revision_index,
            included: true,
        }
    }

    pub fn excluded(part_name: impl Into<String>, revision_index: u32) -> Self {
        Self {
            included: false,
            ..Self::new(part_name, revision_index)
        }
    }

    pub fn member_ref(&self) -> MemberRef {
        MemberRef::new(self.part_name.clone(), self.revision_index)
    }
}

/// A named assembly within a project, with its members in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    pub project: String,
    pub assembly_id: String,
    pub members: Vec<Member>,
}

impl Assembly {
    pub fn new(project: impl Into<String>, assembly_id: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            assembly_id: assembly_id.into(),
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Included members in insertion order.
    pub fn included_members(&self) -> Vec<MemberRef> {
        self.members
            .iter()
            .filter(|m| m.included)
            .map(Member::member_ref)
            .collect()
    }
}
