//! Authentication claims and the access-gate role check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles a principal can hold within a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// School administrator, full access.
    Admin,
    /// Finance office staff, manages the fee ledger.
    Bursar,
    /// Teaching staff, read-only access to payments.
    Teacher,
    /// Parent/guardian, restricted to their linked children.
    Parent,
}

impl Role {
    /// Parses a role from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "bursar" => Some(Self::Bursar),
            "teacher" => Some(Self::Teacher),
            "parent" => Some(Self::Parent),
            _ => None,
        }
    }

    /// Returns the wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Bursar => "bursar",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims for access tokens minted by the auth gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// School ID (current tenant context).
    pub school: Uuid,
    /// User's role in the school.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, school_id: Uuid, role: Role, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            school: school_id,
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the school ID from claims.
    #[must_use]
    pub const fn school_id(&self) -> Uuid {
        self.school
    }

    /// Returns the parsed role, if the claim carries a known one.
    #[must_use]
    pub fn parsed_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Access-gate check: may this principal act in the given school with
    /// one of the required roles?
    ///
    /// Tenancy and role are checked together; ledger logic itself stays
    /// role-agnostic and never calls this.
    #[must_use]
    pub fn is_authorized(&self, school_id: Uuid, required_roles: &[Role]) -> bool {
        if self.school != school_id {
            return false;
        }
        self.parsed_role()
            .is_some_and(|role| required_roles.contains(&role))
    }
}
