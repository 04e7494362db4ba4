use core::str::FromStr;

use serde::{Deserialize, Serialize};

use firstshift_core::DomainError;

/// Privilege level a user holds within one organization.
///
/// The same user may hold different roles in different organizations, so a
/// `Role` is only meaningful next to an organization id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Rank in the privilege order (`employee < manager < admin`).
    pub fn privilege(&self) -> u8 {
        match self {
            Role::Employee => 0,
            Role::Manager => 1,
            Role::Admin => 2,
        }
    }

    /// True if this role holds at least the privileges of `other`.
    pub fn includes(&self, other: Role) -> bool {
        self.privilege() >= other.privilege()
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn rejects_unknown_and_mixed_case_roles() {
        assert!("owner".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn privilege_order_is_total() {
        assert!(Role::Admin.includes(Role::Manager));
        assert!(Role::Manager.includes(Role::Employee));
        assert!(Role::Admin.includes(Role::Employee));
        assert!(!Role::Employee.includes(Role::Manager));
        assert!(!Role::Manager.includes(Role::Admin));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        let role: Role = serde_json::from_str("\"employee\"").unwrap();
        assert_eq!(role, Role::Employee);
    }
}
