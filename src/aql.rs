//! Action model: the structured form of one requested data operation.
//!
//! Actions are produced by the request-parsing layer and consumed read-only by
//! the security and execution modules. Verbs and resource kinds are closed
//! enums so an unknown verb is rejected here, before any authorization runs.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::storage::Row;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Count,
    Filter,
    Limit,
    OrderAsc,
    OrderDsc,
}

impl ActionVerb {
    pub const ALL: [ActionVerb; 10] = [
        ActionVerb::Get, ActionVerb::Post, ActionVerb::Put, ActionVerb::Patch, ActionVerb::Delete,
        ActionVerb::Count, ActionVerb::Filter, ActionVerb::Limit, ActionVerb::OrderAsc, ActionVerb::OrderDsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionVerb::Get => "GET",
            ActionVerb::Post => "POST",
            ActionVerb::Put => "PUT",
            ActionVerb::Patch => "PATCH",
            ActionVerb::Delete => "DELETE",
            ActionVerb::Count => "COUNT",
            ActionVerb::Filter => "FILTER",
            ActionVerb::Limit => "LIMIT",
            ActionVerb::OrderAsc => "ORDERASC",
            ActionVerb::OrderDsc => "ORDERDSC",
        }
    }

    /// True for verbs that change stored state.
    pub fn is_mutating(&self) -> bool {
        matches!(self, ActionVerb::Post | ActionVerb::Put | ActionVerb::Patch | ActionVerb::Delete)
    }
}

impl FromStr for ActionVerb {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionVerb::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| AuthError::InvalidAction { verb: s.to_string() })
    }
}

impl Display for ActionVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceKind {
    Database,
    Collection,
    Record,
    Permit,
    User,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Database, ResourceKind::Collection, ResourceKind::Record, ResourceKind::Permit, ResourceKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Database => "DATABASE",
            ResourceKind::Collection => "COLLECTION",
            ResourceKind::Record => "RECORD",
            ResourceKind::Permit => "PERMIT",
            ResourceKind::User => "USER",
        }
    }

    /// Database-scoped kinds are judged by the caller's permit on the target
    /// database; the others by the caller's global role. Never mix the two.
    pub fn is_database_scoped(&self) -> bool {
        matches!(self, ResourceKind::Record | ResourceKind::Collection | ResourceKind::Permit)
    }
}

impl FromStr for ResourceKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AuthError::InvalidAction { verb: format!("resource {}", s) })
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// Binary predicate node. Leaves carry a field name or literal in `value`;
/// interior nodes carry the operator (`=` or `AND`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<Node>>,
}

impl Node {
    pub fn leaf(value: impl Into<String>) -> Self { Self { value: value.into(), left: None, right: None } }

    /// `field = literal`
    pub fn equals(field: impl Into<String>, literal: impl Into<String>) -> Self {
        Self { value: "=".into(), left: Some(Box::new(Node::leaf(field))), right: Some(Box::new(Node::leaf(literal))) }
    }

    pub fn and(left: Node, right: Node) -> Self {
        Self { value: "AND".into(), left: Some(Box::new(left)), right: Some(Box::new(right)) }
    }

    /// Evaluate against a row. Only equality and conjunction are understood;
    /// anything else never matches.
    pub fn matches(&self, row: &Row) -> bool {
        let (Some(l), Some(r)) = (self.left.as_deref(), self.right.as_deref()) else { return false; };
        match self.value.as_str() {
            "=" => match row.get(&l.value) {
                Some(serde_json::Value::String(s)) => *s == r.value,
                Some(serde_json::Value::Null) | None => false,
                Some(other) => other.to_string() == r.value,
            },
            op if op.eq_ignore_ascii_case("and") => l.matches(row) && r.matches(row),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    #[serde(rename = "type")]
    pub verb: ActionVerb,
    #[serde(rename = "resource")]
    pub resource_kind: ResourceKind,
    #[serde(default)]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Node>,
}

impl Action {
    pub fn new(verb: ActionVerb, resource_kind: ResourceKind, identifier: impl Into<String>) -> Self {
        Self { verb, resource_kind, identifier: identifier.into(), filter: None }
    }

    /// Build from wire spellings; unknown verbs or kinds fail with `InvalidAction`.
    pub fn parse(verb: &str, resource_kind: &str, identifier: impl Into<String>) -> Result<Self, AuthError> {
        Ok(Self::new(verb.parse()?, resource_kind.parse()?, identifier))
    }

    pub fn with_filter(mut self, filter: Node) -> Self {
        self.filter = Some(filter);
        self
    }

    /// First dotted segment of the identifier.
    pub fn database(&self) -> &str {
        self.identifier.split('.').next().unwrap_or_default()
    }

    /// Second dotted segment, when present.
    pub fn collection(&self) -> Option<&str> {
        self.identifier.split('.').nth(1)
    }
}
