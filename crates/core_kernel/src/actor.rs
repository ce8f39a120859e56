//! Authenticated principals and workflow roles
//!
//! Every domain operation receives the [`Actor`] that invoked it. Role
//! checks happen inside the domain layer, not in HTTP middleware, so the
//! same rules apply no matter which interface drives the workflow.

use crate::identifiers::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Workflow roles as they appear on user records and JWT claims
///
/// The wire names are the human-readable forms used by the existing user
/// directory ("Data Entry Officer", not "data_entry_officer").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Citizen")]
    Citizen,
    #[serde(rename = "Data Entry Officer")]
    DataEntryOfficer,
    #[serde(rename = "Verification Officer")]
    VerificationOfficer,
    #[serde(rename = "Approving Authority")]
    ApprovingAuthority,
    #[serde(rename = "Field Worker")]
    FieldWorker,
    #[serde(rename = "NGO Viewer")]
    NgoViewer,
    #[serde(rename = "Scheme Admin")]
    SchemeAdmin,
    #[serde(rename = "Super Admin")]
    SuperAdmin,
}

impl Role {
    /// All known roles, in privilege-neutral declaration order
    pub fn all() -> &'static [Role] {
        &[
            Role::Citizen,
            Role::DataEntryOfficer,
            Role::VerificationOfficer,
            Role::ApprovingAuthority,
            Role::FieldWorker,
            Role::NgoViewer,
            Role::SchemeAdmin,
            Role::SuperAdmin,
        ]
    }

    /// The wire name for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "Citizen",
            Role::DataEntryOfficer => "Data Entry Officer",
            Role::VerificationOfficer => "Verification Officer",
            Role::ApprovingAuthority => "Approving Authority",
            Role::FieldWorker => "Field Worker",
            Role::NgoViewer => "NGO Viewer",
            Role::SchemeAdmin => "Scheme Admin",
            Role::SuperAdmin => "Super Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized role name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::all()
            .iter()
            .find(|role| role.as_str() == s)
            .copied()
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

/// An authenticated principal invoking domain operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub roles: Vec<Role>,
    /// District scope for officers; `None` for state-level actors
    pub district: Option<String>,
    pub state: Option<String>,
}

impl Actor {
    pub fn new(id: UserId, name: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            id,
            name: name.into(),
            roles,
            district: None,
            state: None,
        }
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }

    /// Super admins bypass every role and ownership check
    pub fn is_super_admin(&self) -> bool {
        self.has_role(Role::SuperAdmin)
    }
}
