//! # Roles and Capability Checks
//!
//! Pure permission rules. The server resolves a session into a
//! [`Principal`] and asks these functions whether the call may proceed.
//!
//! ## Capability Matrix
//! ```text
//! ┌──────────────────────────────┬───────┬─────────┬──────────────────┐
//! │ check                        │ admin │ manager │ user             │
//! ├──────────────────────────────┼───────┼─────────┼──────────────────┤
//! │ require_admin                │  ✅   │   ✅    │  ❌              │
//! │ require_self_or_admin(id)    │  ✅   │   ✅    │  only own custid │
//! │ require_role(&[..])          │  listed roles only                  │
//! └──────────────────────────────┴───────┴─────────┴──────────────────┘
//! ```
//! No principal at all is always [`AccessError::Unauthenticated`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::AccessError;

// =============================================================================
// Role
// =============================================================================

/// Customer role stored in `Customer.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    User,
}

impl Role {
    /// Stored text form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }

    /// Admins and managers run the store.
    pub const fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

// =============================================================================
// Principal
// =============================================================================

/// The logged-in customer a request acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub custid: i64,
    pub name: String,
    pub role: Role,
}

// =============================================================================
// Checks
// =============================================================================

/// Allows admins and managers.
pub fn require_admin(principal: Option<&Principal>) -> Result<&Principal, AccessError> {
    let principal = principal.ok_or(AccessError::Unauthenticated)?;
    if principal.role.is_staff() {
        Ok(principal)
    } else {
        Err(AccessError::Forbidden {
            required: "admin".to_string(),
        })
    }
}

/// Allows only the listed roles.
pub fn require_role<'a>(
    principal: Option<&'a Principal>,
    allowed: &[Role],
) -> Result<&'a Principal, AccessError> {
    let principal = principal.ok_or(AccessError::Unauthenticated)?;
    if allowed.contains(&principal.role) {
        Ok(principal)
    } else {
        let required = allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" or ");
        Err(AccessError::Forbidden { required })
    }
}

/// Allows staff, or the customer whose data is being touched.
///
/// ## Arguments
/// * `principal` - Session owner, if any
/// * `target_custid` - Customer the request reads or modifies
pub fn require_self_or_admin(
    principal: Option<&Principal>,
    target_custid: i64,
) -> Result<&Principal, AccessError> {
    let principal = principal.ok_or(AccessError::Unauthenticated)?;
    if principal.role.is_staff() || principal.custid == target_custid {
        Ok(principal)
    } else {
        Err(AccessError::Forbidden {
            required: "admin or account owner".to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
