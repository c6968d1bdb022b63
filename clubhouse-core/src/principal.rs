use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

/// Authorization tier of a club account.
///
/// Exactly two tiers exist; anything finer grained (per-resource grants)
/// is out of scope for the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

/// Caller identity resolved from a session token.
///
/// Carries exactly what the gate chain needs to decide: who, which tier,
/// and whether an administrator has let the account in. Built by a
/// [`SessionProvider`](crate::session::SessionProvider) and injected into
/// request handling; never parsed from client-controlled fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user_id: String,
    role: Role,
    approved: bool,
}

impl Principal {
    /// Create a principal, rejecting an empty user id.
    pub fn new(user_id: impl Into<String>, role: Role, approved: bool) -> Result<Self> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(Error::EmptyComponent { field: "user_id" });
        }
        Ok(Self {
            user_id,
            role,
            approved,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn approved(&self) -> bool {
        self.approved
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!("member".parse::<Role>().expect("parse"), Role::Member);
        assert_eq!("admin".parse::<Role>().expect("parse"), Role::Admin);
        assert_eq!(Role::Member.to_string(), "member");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err, Error::UnknownRole("owner".to_string()));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Admin).expect("serialize"),
            "\"admin\""
        );
        let role: Role = serde_json::from_str("\"member\"").expect("deserialize");
        assert_eq!(role, Role::Member);
    }

    #[test]
    fn principal_requires_a_user_id() {
        let err = Principal::new("  ", Role::Member, true).unwrap_err();
        assert_eq!(err, Error::EmptyComponent { field: "user_id" });
    }

    #[test]
    fn admin_check_follows_role() {
        let admin = Principal::new("u-1", Role::Admin, true).expect("principal");
        let member = Principal::new("u-2", Role::Member, true).expect("principal");
        assert!(admin.is_admin());
        assert!(!member.is_admin());
    }
}
