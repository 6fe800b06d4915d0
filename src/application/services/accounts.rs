//! Account registration and credential checks.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::password;
use crate::domain::{RepositoryProvider, User};
use crate::shared::{DomainError, DomainResult};

pub struct AccountService {
    repos: Arc<dyn RepositoryProvider>,
}

impl AccountService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn register(
        &self,
        email: &str,
        plain_password: &str,
        first_name: &str,
        last_name: &str,
    ) -> DomainResult<User> {
        if self.repos.users().find_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict(
                "Email is already registered".to_string(),
            ));
        }

        let hash = password::hash(plain_password)?;
        let user = User::new(
            email.to_string(),
            hash,
            first_name.to_string(),
            last_name.to_string(),
        );
        self.repos.users().insert(user.clone()).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Verify email/password; the API layer turns the result into a token.
    pub async fn authenticate(&self, email: &str, plain_password: &str) -> DomainResult<User> {
        let user = self
            .repos
            .users()
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Invalid credentials".to_string()))?;

        if !password::verify(plain_password, &user.password_hash)? {
            return Err(DomainError::Unauthorized("Invalid credentials".to_string()));
        }
        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", "id", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryProvider;

    fn setup() -> AccountService {
        AccountService::new(Arc::new(MemoryProvider::new()))
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let service = setup();
        let user = service
            .register("ana@example.com", "s3cret", "Ana", "Silva")
            .await
            .unwrap();
        assert!(!user.license_validated);

        let authed = service
            .authenticate("ana@example.com", "s3cret")
            .await
            .unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let service = setup();
        service
            .register("ana@example.com", "s3cret", "Ana", "Silva")
            .await
            .unwrap();
        let result = service
            .register("ana@example.com", "other", "Ana", "Souza")
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn wrong_password_rejected() {
        let service = setup();
        service
            .register("ana@example.com", "s3cret", "Ana", "Silva")
            .await
            .unwrap();
        let result = service.authenticate("ana@example.com", "wrong").await;
        assert!(matches!(result, Err(DomainError::Unauthorized(_))));
    }
}
