//! Driver profile management.

use std::sync::Arc;

use tracing::info;

use crate::application::context::CallerContext;
use crate::domain::{Driver, RepositoryProvider};
use crate::shared::{DomainError, DomainResult};

pub struct DriverService {
    repos: Arc<dyn RepositoryProvider>,
}

impl DriverService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Create the caller's driver profile. Registering a profile also
    /// marks the user's license as validated, unlocking ride creation.
    pub async fn create_profile(
        &self,
        caller: CallerContext,
        license_no: &str,
        car_name: &str,
        seats: u32,
    ) -> DomainResult<Driver> {
        let mut user = self
            .repos
            .users()
            .find_by_id(caller.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", "id", caller.user_id))?;

        if self
            .repos
            .drivers()
            .find_by_user_id(user.id)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(
                "Driver profile already exists".to_string(),
            ));
        }
        if seats == 0 {
            return Err(DomainError::Validation(
                "A vehicle must have at least one seat".to_string(),
            ));
        }

        let driver = Driver::new(
            user.id,
            license_no.to_string(),
            car_name.to_string(),
            seats,
        );
        self.repos.drivers().insert(driver.clone()).await?;

        user.license_validated = true;
        self.repos.users().update(&user).await?;

        info!(user_id = %user.id, "driver profile created");
        Ok(driver)
    }

    pub async fn get_profile(&self, caller: CallerContext) -> DomainResult<Driver> {
        self.repos
            .drivers()
            .find_by_user_id(caller.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("driver", "user_id", caller.user_id))
    }

    pub async fn update_profile(
        &self,
        caller: CallerContext,
        license_no: &str,
        car_name: &str,
        seats: u32,
    ) -> DomainResult<Driver> {
        let mut driver = self.get_profile(caller).await?;
        if seats == 0 {
            return Err(DomainError::Validation(
                "A vehicle must have at least one seat".to_string(),
            ));
        }

        driver.license_no = license_no.to_string();
        driver.car_name = car_name.to_string();
        driver.seats = seats;
        self.repos.drivers().update(&driver).await?;
        Ok(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::infrastructure::memory::MemoryProvider;

    async fn setup() -> (Arc<dyn RepositoryProvider>, DriverService, User) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(MemoryProvider::new());
        let user = User::new(
            "d@example.com".into(),
            "hash".into(),
            "Dana".into(),
            "Driver".into(),
        );
        repos.users().insert(user.clone()).await.unwrap();
        let service = DriverService::new(Arc::clone(&repos));
        (repos, service, user)
    }

    #[tokio::test]
    async fn create_validates_license() {
        let (repos, service, user) = setup().await;
        service
            .create_profile(CallerContext::new(user.id), "LIC-1", "Corolla", 4)
            .await
            .unwrap();

        let stored = repos.users().find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.license_validated);
    }

    #[tokio::test]
    async fn second_profile_rejected() {
        let (_repos, service, user) = setup().await;
        let ctx = CallerContext::new(user.id);
        service
            .create_profile(ctx, "LIC-1", "Corolla", 4)
            .await
            .unwrap();
        let result = service.create_profile(ctx, "LIC-2", "Civic", 4).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_replaces_details() {
        let (_repos, service, user) = setup().await;
        let ctx = CallerContext::new(user.id);
        service
            .create_profile(ctx, "LIC-1", "Corolla", 4)
            .await
            .unwrap();
        let updated = service.update_profile(ctx, "LIC-9", "Civic", 3).await.unwrap();
        assert_eq!(updated.car_name, "Civic");
        assert_eq!(updated.seats, 3);
    }
}
