//! Resolves the acting user for command-line sessions.
//!
//! The operator is read from `BUILDINGWISE_ACTOR_ID` and `BUILDINGWISE_ACTOR_ROLE`
//! (`admin` or `user`, usually set in `.env`). Without them the session acts as
//! the built-in `system` administrator.

use crate::core::access::{Actor, Role};

/// Builds the acting user from environment variables.
#[must_use]
pub fn operator_from_env() -> Actor {
    let id = std::env::var("BUILDINGWISE_ACTOR_ID").ok();
    let role = std::env::var("BUILDINGWISE_ACTOR_ROLE").ok();
    operator_from_parts(id, role.as_deref())
}

fn operator_from_parts(id: Option<String>, role: Option<&str>) -> Actor {
    match id {
        Some(id) if !id.trim().is_empty() => {
            let role = role.and_then(Role::parse).unwrap_or(Role::User);
            Actor::new(id.trim(), role)
        }
        _ => Actor::system(),
    }
}
