use core::str::FromStr;

use serde::{Deserialize, Serialize};
use stockpanel_core::DomainError;

/// Role identifier used for RBAC.
///
/// Roles are flat: there is no ordering between them and no implied
/// inheritance. Every access decision is an explicit allow-list lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    PrimaryInventor,
    SecondaryInventor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::PrimaryInventor, Role::SecondaryInventor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::PrimaryInventor => "PRIMARY_INVENTOR",
            Role::SecondaryInventor => "SECONDARY_INVENTOR",
        }
    }

    /// Translation key of the human-readable role name shown in the header.
    pub fn display_key(&self) -> &'static str {
        match self {
            Role::Admin => "users.admin",
            Role::PrimaryInventor => "users.primaryInventor",
            Role::SecondaryInventor => "users.secondaryInventor",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::unknown_variant("role", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            assert_eq!(
                serde_json::to_string(&role).unwrap(),
                format!("\"{}\"", role.as_str())
            );
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("SUPERUSER".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }
}
