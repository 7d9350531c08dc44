//! Role-based authorization as an explicit decision.

use super::choices::Role;

/// Roles allowed on moderation and admin endpoints.
pub const STAFF_ROLES: &[Role] = &[Role::Admin, Role::Moderator];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny { reason: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Decide whether `role` may use an endpoint restricted to `allowed`.
///
/// `role` is the raw stored value so that unknown roles are denied rather
/// than rejected earlier with a parse error.
pub fn authorize(role: &str, allowed: &[Role]) -> AccessDecision {
    match role.parse::<Role>() {
        Ok(role) if allowed.contains(&role) => AccessDecision::Allow,
        Ok(role) => AccessDecision::Deny {
            reason: format!(
                "role '{}' is not one of: {}",
                role,
                allowed
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        Err(e) => AccessDecision::Deny {
            reason: e.to_string(),
        },
    }
}
