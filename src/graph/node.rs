//! Member node type and related structures.
//!
//! A member is one person in the lineage. Each member has:
//! - A stable opaque identifier (survives every edit)
//! - An ordered, duplicate-free list of parent ids (empty means root)
//! - A generation number derived from its parents
//! - A sibling order used only for rendering order under a shared parent
//! - A descriptive profile the engine never interprets

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable member identifier.
///
/// Opaque to the engine: ids are compared, hashed and displayed, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new NodeId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Membership status of a person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Studying,
    Graduated,
    Retired,
}

/// Descriptive payload carried through the engine untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    pub student_id: String,
    pub photo_url: String,
    pub status: MemberStatus,
}

/// A member of the lineage as supplied by the external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique id.
    pub id: NodeId,
    /// Parents in insertion order. Empty for roots.
    #[serde(default)]
    pub parent_ids: Vec<NodeId>,
    /// Depth in the lineage. Re-derived by the generation resolver.
    #[serde(default)]
    pub generation: u32,
    /// Rendering order among siblings. No bearing on validity.
    #[serde(default)]
    pub sibling_order: i32,
    #[serde(flatten)]
    pub profile: Profile,
}

impl Member {
    /// Create a root member with an empty profile.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            parent_ids: Vec::new(),
            generation: 0,
            sibling_order: 0,
            profile: Profile::default(),
        }
    }

    /// Builder: set the parent list.
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.parent_ids = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set the sibling order.
    pub fn with_sibling_order(mut self, order: i32) -> Self {
        self.sibling_order = order;
        self
    }

    /// Builder: set the nickname.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.profile.nickname = nickname.into();
        self
    }

    /// True when the member has no parents.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// True when `parent` is one of this member's parents.
    #[inline]
    pub fn has_parent(&self, parent: &str) -> bool {
        self.parent_ids.iter().any(|p| p.as_str() == parent)
    }
}
