//! Permission matrix: which role a verb needs on which resource tier.
//!
//! The same table serves both role sources. The caller decides whether the
//! role came from a database permit or from the user's global record.

use serde::{Deserialize, Serialize};

use crate::aql::{ActionVerb, ResourceKind};

/// Role tiers, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Read,
    Write,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Read => "READ",
            Role::Write => "WRITE",
            Role::Admin => "ADMIN",
        }
    }

    /// Stored role strings other than ADMIN and WRITE read as READ.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "ADMIN" => Role::Admin,
            "WRITE" => Role::Write,
            _ => Role::Read,
        }
    }
}

/// Escalated resources accept only ADMIN for mutation; standard ones accept WRITE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceTier {
    Standard,
    Escalated,
}

impl ResourceTier {
    pub fn of(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Record | ResourceKind::Database => ResourceTier::Standard,
            ResourceKind::Collection | ResourceKind::Permit | ResourceKind::User => ResourceTier::Escalated,
        }
    }

    fn column(&self) -> usize {
        match self {
            ResourceTier::Standard => 0,
            ResourceTier::Escalated => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
    UnknownVerb,
}

use ActionVerb::*;
use Role::{Admin, Read, Write};

/// Minimum role per verb, columns `[Standard, Escalated]`.
const MATRIX: &[(ActionVerb, [Role; 2])] = &[
    (Count,    [Read, Read]),
    (Filter,   [Read, Read]),
    (Get,      [Read, Read]),
    (Limit,    [Read, Read]),
    (OrderAsc, [Read, Read]),
    (OrderDsc, [Read, Read]),
    (Delete,   [Write, Admin]),
    (Patch,    [Write, Admin]),
    (Post,     [Write, Admin]),
    (Put,      [Write, Admin]),
];

/// Minimum role `verb` needs on `kind`, or `None` for a verb with no row.
pub fn required_role(verb: ActionVerb, kind: ResourceKind) -> Option<Role> {
    MATRIX.iter().find(|(v, _)| *v == verb).map(|(_, cols)| cols[ResourceTier::of(kind).column()])
}

pub fn evaluate(verb: ActionVerb, kind: ResourceKind, role: Role) -> Verdict {
    match required_role(verb, kind) {
        None => Verdict::UnknownVerb,
        Some(min) if role >= min => Verdict::Allow,
        Some(_) => Verdict::Deny,
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod matrix_tests;
