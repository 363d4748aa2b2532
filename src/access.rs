// Access control gate
// Maps (principal, operation, resource) to an allow/deny decision

use crate::auth::models::{Principal, Role};
use crate::error::ApiError;

/// What the caller wants to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

/// What the caller wants to do it to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Products and categories
    Catalog,
    /// The order space, before a concrete order is known
    Orders,
    /// A concrete order owned by `client_id`
    Order { client_id: i32 },
    /// The caller's own account
    Account,
}

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Forbidden,
    Unauthorized,
}

impl Decision {
    /// Convert a denial into the matching API error
    pub fn into_result(self) -> Result<(), ApiError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Unauthorized => Err(ApiError::Unauthorized("Authentication required".to_string())),
            Decision::Forbidden => Err(ApiError::Forbidden("Access denied".to_string())),
        }
    }
}

/// Decide whether `principal` may perform `operation` on `resource`
///
/// Catalog reads are public. Everything else requires a principal;
/// catalog writes and order mutation need ADMIN, and a CLIENT only sees
/// orders it owns.
pub fn authorize(principal: Option<&Principal>, operation: Operation, resource: Resource) -> Decision {
    if resource == Resource::Catalog && operation == Operation::Read {
        return Decision::Allow;
    }

    let Some(principal) = principal else {
        return Decision::Unauthorized;
    };

    match (resource, operation) {
        (Resource::Catalog, _) => admin_only(principal),
        (Resource::Orders, Operation::Read | Operation::Create) => Decision::Allow,
        (Resource::Orders, _) => admin_only(principal),
        (Resource::Order { client_id }, Operation::Read) => {
            if principal.role == Role::Admin || principal.user_id == client_id {
                Decision::Allow
            } else {
                Decision::Forbidden
            }
        }
        (Resource::Order { .. }, _) => admin_only(principal),
        (Resource::Account, _) => Decision::Allow,
    }
}

/// Unwrap the principal of a request the gate already let through
pub fn require_principal(principal: Option<Principal>) -> Result<Principal, ApiError> {
    principal.ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
}

fn admin_only(principal: &Principal) -> Decision {
    match principal.role {
        Role::Admin => Decision::Allow,
        Role::Client => Decision::Forbidden,
    }
}
