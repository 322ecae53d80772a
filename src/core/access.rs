//! Role-based access control.
//!
//! Admins manage buildings, members and money records. Plain users can only read
//! reports. Every mutating operation in `core` takes an [`Actor`] and calls
//! [`ensure_admin`] before touching the store.

use crate::errors::{Error, Result};
use std::fmt;

/// Role of a user within the society
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Committee member allowed to change records
    Admin,
    /// Resident with read-only access
    User,
}

impl Role {
    /// Parses `"admin"` or `"user"`, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Lowercase name as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user on whose behalf an operation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// User id recorded in the audit log
    pub id: String,
    /// Granted role
    pub role: Role,
}

impl Actor {
    /// Creates an actor with the given id and role.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Built-in administrator used by imports and local command-line sessions.
    #[must_use]
    pub fn system() -> Self {
        Self::new("system", Role::Admin)
    }

    /// Whether this actor may change records
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fails with [`Error::PermissionDenied`] unless `actor` is an admin.
pub fn ensure_admin(actor: &Actor, action: &str) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        tracing::warn!("Denied {action} for {} ({})", actor.id, actor.role);
        Err(Error::PermissionDenied {
            actor: actor.id.clone(),
            action: action.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" USER "), Some(Role::User));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_ensure_admin() {
        assert!(ensure_admin(&Actor::system(), "create building").is_ok());

        let resident = Actor::new("flat-101", Role::User);
        let err = ensure_admin(&resident, "create building").unwrap_err();
        assert!(matches!(
            err,
            Error::PermissionDenied { ref actor, ref action }
                if actor == "flat-101" && action == "create building"
        ));
    }
}
