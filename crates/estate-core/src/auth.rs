//! Roles and the property authorization predicate.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User role for authorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Owner,
    Admin,
}

impl Role {
    /// Roles allowed to list, edit and remove properties.
    pub const PROPERTY_MANAGERS: &'static [Role] = &[Role::Owner, Role::Admin];
    pub const ADMINS: &'static [Role] = &[Role::Admin];
    pub const ANY: &'static [Role] = &[Role::Client, Role::Owner, Role::Admin];
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::Client => write!(f, "client"),
            Role::Owner => write!(f, "owner"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

/// Whether `actor_id` acting as `actor_role` may change or remove a property
/// owned by `resource_owner`. Admins may touch anything; everyone else only
/// their own listings.
pub fn can_modify_property(actor_role: Role, resource_owner: i64, actor_id: i64) -> bool {
    actor_role == Role::Admin || resource_owner == actor_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_can_modify_own_property() {
        assert!(can_modify_property(Role::Owner, 7, 7));
    }

    #[test]
    fn test_owner_cannot_modify_foreign_property() {
        assert!(!can_modify_property(Role::Owner, 7, 8));
        assert!(!can_modify_property(Role::Client, 7, 8));
    }

    #[test]
    fn test_admin_can_modify_any_property() {
        assert!(can_modify_property(Role::Admin, 7, 1));
    }

    #[test]
    fn test_role_round_trips_through_string() {
        for role in Role::ANY {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), *role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}
