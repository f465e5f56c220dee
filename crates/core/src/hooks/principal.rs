//! The caller of an operation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role names used by the accounting module.
pub mod roles {
    /// Day-to-day bookkeeping.
    pub const ACCOUNTS_USER: &str = "Accounts User";
    /// Chart of accounts maintenance.
    pub const ACCOUNTS_MANAGER: &str = "Accounts Manager";
    /// Site-wide administration.
    pub const SYSTEM_MANAGER: &str = "System Manager";
}

/// User that bypasses every permission predicate.
pub const ADMINISTRATOR: &str = "Administrator";

/// Kind of access being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    /// Read a document.
    Read,
    /// Modify a document.
    Write,
    /// Create a document.
    Create,
    /// Delete a document.
    Delete,
}

impl PermissionType {
    /// Returns the lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "create" => Ok(Self::Create),
            "delete" => Ok(Self::Delete),
            other => Err(format!("Unknown permission type: {other}")),
        }
    }
}

/// Authenticated caller: a user name and the roles granted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User name.
    pub user: String,
    /// Granted roles.
    pub roles: Vec<String>,
}

impl Principal {
    /// Creates a principal.
    #[must_use]
    pub fn new(
        user: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            user: user.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in administrator.
    #[must_use]
    pub fn administrator() -> Self {
        Self::new(ADMINISTRATOR, [roles::SYSTEM_MANAGER])
    }

    /// Returns true for the built-in administrator.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.user == ADMINISTRATOR
    }

    /// Returns true if the principal holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns true if the principal holds any of `roles`.
    #[must_use]
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let p = Principal::new("bursar@school.edu", [roles::ACCOUNTS_USER]);
        assert!(p.has_role(roles::ACCOUNTS_USER));
        assert!(!p.has_role(roles::ACCOUNTS_MANAGER));
        assert!(p.has_any_role(&[roles::ACCOUNTS_MANAGER, roles::ACCOUNTS_USER]));
        assert!(!p.is_administrator());
        assert!(Principal::administrator().is_administrator());
    }

    #[test]
    fn test_permission_type_parse() {
        assert_eq!("Read".parse::<PermissionType>().unwrap(), PermissionType::Read);
        assert_eq!("create".parse::<PermissionType>().unwrap(), PermissionType::Create);
        assert!("approve".parse::<PermissionType>().is_err());
    }
}
