//! Caller identity injected into every service call.

use uuid::Uuid;

/// Authenticated caller of a service operation. Built by the HTTP layer
/// from the verified token; services never look identity up themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: Uuid,
}

impl CallerContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
