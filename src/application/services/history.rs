//! Read side of the audit trail.

use std::sync::Arc;

use crate::application::context::CallerContext;
use crate::domain::{HistoryRecord, RepositoryProvider};
use crate::shared::DomainResult;

pub struct HistoryService {
    repos: Arc<dyn RepositoryProvider>,
}

impl HistoryService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// The caller's lifecycle feed, newest first.
    pub async fn feed(&self, caller: CallerContext) -> DomainResult<Vec<HistoryRecord>> {
        self.repos.history().find_for_user(caller.user_id).await
    }
}
