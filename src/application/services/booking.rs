//! Ride lifecycle and seat booking engine.
//!
//! Every write goes through a load, mutate, conditional-write cycle keyed
//! on the ride's version token. Precondition failures (full ride, wrong
//! status, wrong caller) fail fast; losing a version race triggers a
//! bounded re-read and re-check, which is what keeps N+1 concurrent
//! bookings on N seats down to exactly N winners.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::context::CallerContext;
use crate::application::services::fanout::derive_fan_out;
use crate::domain::history::{
    HistoryEvent, HistoryRecord, MSG_CANCELLED_BY_DRIVER, MSG_CANCELLED_BY_USER,
    MSG_RIDE_BOOKED, MSG_RIDE_COMPLETED, MSG_RIDE_CREATED,
};
use crate::domain::{BoardingCode, Booking, RepositoryProvider, Ride, User};
use crate::shared::{DomainError, DomainResult};

/// Upper bound on re-reads after losing a version race.
const MAX_WRITE_ATTEMPTS: u32 = 8;

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
}

impl BookingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    async fn require_user(&self, id: Uuid) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", "id", id))
    }

    async fn require_ride(&self, id: Uuid) -> DomainResult<Ride> {
        self.repos
            .rides()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("ride", "id", id))
    }

    /// Load, apply, conditionally write. The closure runs against a fresh
    /// snapshot on every attempt; its errors abort the loop immediately.
    async fn commit(
        &self,
        ride_id: Uuid,
        mut apply: impl FnMut(&mut Ride) -> DomainResult<()>,
    ) -> DomainResult<Ride> {
        for attempt in 0..MAX_WRITE_ATTEMPTS {
            let mut ride = self.require_ride(ride_id).await?;
            apply(&mut ride)?;
            if self.repos.rides().update(&ride).await? {
                ride.version += 1;
                return Ok(ride);
            }
            debug!(ride_id = %ride_id, attempt, "lost ride version race, retrying");
        }
        Err(DomainError::Conflict(
            "Ride is being modified concurrently, try again".to_string(),
        ))
    }

    async fn driver_display_name(&self, driver_user_id: Uuid) -> String {
        match self.repos.users().find_by_id(driver_user_id).await {
            Ok(Some(user)) => user.display_name(),
            _ => String::new(),
        }
    }

    fn record_history(&self, record: HistoryRecord) {
        let repos = Arc::clone(&self.repos);
        tokio::spawn(async move {
            let ride_id = record.ride_id;
            if let Err(err) = repos.history().insert_unique(record).await {
                warn!(ride_id = %ride_id, error = %err, "failed to write history record");
            }
        });
    }

    /// Schedule a new ride. Caller must hold a complete, validated driver
    /// profile; seats are capped by the vehicle. Fans notifications out to
    /// every fellow group member.
    pub async fn schedule_ride(
        &self,
        caller: CallerContext,
        scheduled_at: DateTime<Utc>,
        seats: u32,
    ) -> DomainResult<Ride> {
        let user = self.require_user(caller.user_id).await?;
        let driver = self
            .repos
            .drivers()
            .find_by_user_id(user.id)
            .await?
            .ok_or_else(|| DomainError::Forbidden("Not a driver".to_string()))?;

        if !user.license_validated || !driver.is_complete() {
            return Err(DomainError::Forbidden(
                "Cannot create the ride: missing license validation or car details"
                    .to_string(),
            ));
        }
        if seats > driver.seats {
            return Err(DomainError::Validation(
                "Seats cannot be more than your available seats".to_string(),
            ));
        }

        let ride = Ride::schedule(user.id, scheduled_at, seats)?;
        self.repos.rides().insert(ride.clone()).await?;
        info!(ride_id = %ride.id, driver = %user.id, seats, "ride scheduled");

        self.record_history(HistoryRecord::new(
            user.id,
            ride.id,
            user.display_name(),
            HistoryEvent::Created,
            MSG_RIDE_CREATED,
        ));

        // Best-effort fan-out; the ride stands even if this fails.
        let groups = self.repos.groups().find_for_member(user.id).await?;
        let notifications = derive_fan_out(&groups, user.id, ride.id);
        if !notifications.is_empty() {
            if let Err(err) = self.repos.notifications().insert_many(notifications).await {
                warn!(ride_id = %ride.id, error = %err, "notification fan-out failed");
            }
        }

        Ok(ride)
    }

    /// Reserve a seat for the caller and issue their boarding code.
    pub async fn book_seat(
        &self,
        caller: CallerContext,
        ride_id: Uuid,
    ) -> DomainResult<BoardingCode> {
        let user = self.require_user(caller.user_id).await?;

        let ride = self
            .commit(ride_id, |ride| ride.book(user.id, BoardingCode::generate()))
            .await?;
        info!(ride_id = %ride.id, passenger = %user.id, "seat booked");

        let code = ride
            .boarding_code(user.id)
            .cloned()
            .ok_or_else(|| DomainError::Storage("booked seat lost its code".to_string()))?;

        let driver_name = self.driver_display_name(ride.driver_id).await;
        self.record_history(HistoryRecord::new(
            user.id,
            ride.id,
            driver_name,
            HistoryEvent::Booked,
            MSG_RIDE_BOOKED,
        ));

        Ok(code)
    }

    /// Give the caller's seat back and withdraw their boarding credential.
    /// Their history entry is rewritten to a cancellation after commit.
    pub async fn release_seat(&self, caller: CallerContext, ride_id: Uuid) -> DomainResult<()> {
        let user = self.require_user(caller.user_id).await?;
        let ride = self.commit(ride_id, |ride| ride.unbook(user.id)).await?;
        info!(ride_id = %ride.id, passenger = %user.id, "seat released");

        let repos = Arc::clone(&self.repos);
        tokio::spawn(async move {
            if let Err(err) = repos
                .history()
                .rewrite_for_participant(ride.id, user.id, MSG_CANCELLED_BY_USER)
                .await
            {
                warn!(ride_id = %ride.id, error = %err, "history rewrite failed");
            }
        });

        Ok(())
    }

    /// The driver's boarding manifest: every passenger with their code.
    pub async fn boarding_manifest(
        &self,
        caller: CallerContext,
        ride_id: Uuid,
    ) -> DomainResult<Vec<Booking>> {
        let ride = self.require_ride(ride_id).await?;
        if ride.driver_id != caller.user_id {
            return Err(DomainError::Forbidden(
                "Only the driver can view the boarding manifest".to_string(),
            ));
        }
        Ok(ride.passengers)
    }

    /// The caller's own boarding code, available only while the ride is
    /// still pending.
    pub async fn my_boarding_code(
        &self,
        caller: CallerContext,
        ride_id: Uuid,
    ) -> DomainResult<BoardingCode> {
        let ride = self.require_ride(ride_id).await?;
        if ride.status != crate::domain::RideStatus::Pending {
            return Err(DomainError::Conflict(
                "Boarding codes are only available for pending rides".to_string(),
            ));
        }
        ride.boarding_code(caller.user_id).cloned().ok_or_else(|| {
            DomainError::Forbidden("Not a passenger on this ride".to_string())
        })
    }

    /// Driver checks one passenger's code. With `all_validated` the whole
    /// credential batch is consumed and the ride departs; returns whether
    /// the ride is now ongoing.
    pub async fn validate_boarding(
        &self,
        caller: CallerContext,
        ride_id: Uuid,
        passenger_id: Uuid,
        code: &str,
        all_validated: bool,
    ) -> DomainResult<bool> {
        let snapshot = self.require_ride(ride_id).await?;
        if snapshot.driver_id != caller.user_id {
            return Err(DomainError::Forbidden(
                "Only the driver can validate boarding".to_string(),
            ));
        }

        if !all_validated {
            // Pure check, nothing to persist.
            let mut probe = snapshot;
            probe.validate_boarding(passenger_id, code, false)?;
            return Ok(false);
        }

        let ride = self
            .commit(ride_id, |ride| {
                ride.validate_boarding(passenger_id, code, true).map(|_| ())
            })
            .await?;
        info!(ride_id = %ride.id, "boarding complete, ride ongoing");
        Ok(true)
    }

    /// Driver marks an ongoing ride as completed. Notifications for the
    /// ride are swept and every participant gets a completion entry.
    pub async fn complete_ride(&self, caller: CallerContext, ride_id: Uuid) -> DomainResult<()> {
        let user = self.require_user(caller.user_id).await?;
        let snapshot = self.require_ride(ride_id).await?;
        if snapshot.driver_id != user.id {
            return Err(DomainError::Forbidden(
                "Only the driver can complete the ride".to_string(),
            ));
        }

        let ride = self.commit(ride_id, |ride| ride.complete()).await?;
        info!(ride_id = %ride.id, "ride completed");

        if let Err(err) = self.repos.notifications().delete_for_ride(ride.id).await {
            warn!(ride_id = %ride.id, error = %err, "notification sweep failed");
        }

        let driver_name = user.display_name();
        for booking in &ride.passengers {
            self.record_history(HistoryRecord::new(
                booking.user_id,
                ride.id,
                driver_name.clone(),
                HistoryEvent::Completed,
                MSG_RIDE_COMPLETED,
            ));
        }
        self.record_history(HistoryRecord::new(
            user.id,
            ride.id,
            driver_name,
            HistoryEvent::Completed,
            MSG_RIDE_COMPLETED,
        ));

        Ok(())
    }

    /// Driver cancels a pending or ongoing ride. Notifications are swept
    /// and every participant's history entries are rewritten.
    pub async fn cancel_ride(&self, caller: CallerContext, ride_id: Uuid) -> DomainResult<()> {
        let user = self.require_user(caller.user_id).await?;
        let snapshot = self.require_ride(ride_id).await?;
        if snapshot.driver_id != user.id {
            return Err(DomainError::Forbidden(
                "Only the driver can cancel the ride".to_string(),
            ));
        }

        let ride = self.commit(ride_id, |ride| ride.cancel()).await?;
        info!(ride_id = %ride.id, "ride cancelled");

        if let Err(err) = self.repos.notifications().delete_for_ride(ride.id).await {
            warn!(ride_id = %ride.id, error = %err, "notification sweep failed");
        }
        if let Err(err) = self
            .repos
            .history()
            .rewrite_for_ride(ride.id, MSG_CANCELLED_BY_DRIVER)
            .await
        {
            warn!(ride_id = %ride.id, error = %err, "history rewrite failed");
        }

        Ok(())
    }

    pub async fn get_ride(&self, ride_id: Uuid) -> DomainResult<Ride> {
        self.require_ride(ride_id).await
    }

    /// Rides the caller drives or rides in, newest departure first.
    pub async fn list_related(&self, caller: CallerContext) -> DomainResult<Vec<Ride>> {
        let mut rides = self.repos.rides().find_related(caller.user_id).await?;
        rides.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(rides)
    }

    /// Open rides the caller could still book, newest departure first.
    pub async fn list_bookable(&self, caller: CallerContext) -> DomainResult<Vec<Ride>> {
        let mut rides = self.repos.rides().find_bookable(caller.user_id).await?;
        rides.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(rides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RideStatus;
    use crate::infrastructure::memory::MemoryProvider;
    use chrono::Duration;

    async fn seed_user(repos: &Arc<dyn RepositoryProvider>, first: &str) -> User {
        let user = User::new(
            format!("{first}@example.com"),
            "hash".to_string(),
            first.to_string(),
            "Tester".to_string(),
        );
        repos.users().insert(user.clone()).await.unwrap();
        user
    }

    async fn seed_driver(repos: &Arc<dyn RepositoryProvider>, seats: u32) -> User {
        let mut user = seed_user(repos, "Driver").await;
        user.license_validated = true;
        repos.users().update(&user).await.unwrap();
        let driver = crate::domain::Driver::new(
            user.id,
            "LIC-123".to_string(),
            "Corolla".to_string(),
            seats,
        );
        repos.drivers().insert(driver).await.unwrap();
        user
    }

    fn setup() -> (Arc<dyn RepositoryProvider>, BookingService) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(MemoryProvider::new());
        let service = BookingService::new(Arc::clone(&repos));
        (repos, service)
    }

    fn departure() -> DateTime<Utc> {
        Utc::now() + Duration::hours(3)
    }

    #[tokio::test]
    async fn schedule_requires_driver_profile() {
        let (repos, service) = setup();
        let user = seed_user(&repos, "Rider").await;

        let result = service
            .schedule_ride(CallerContext::new(user.id), departure(), 2)
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn schedule_caps_seats_at_vehicle_capacity() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;

        let result = service
            .schedule_ride(CallerContext::new(driver.id), departure(), 5)
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn book_issues_code_and_takes_seat() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;
        let rider = seed_user(&repos, "Rider").await;

        let ride = service
            .schedule_ride(CallerContext::new(driver.id), departure(), 2)
            .await
            .unwrap();

        let code = service
            .book_seat(CallerContext::new(rider.id), ride.id)
            .await
            .unwrap();
        assert_eq!(code.as_str().len(), 6);

        let stored = service.get_ride(ride.id).await.unwrap();
        assert_eq!(stored.seats_remaining, 1);
        assert!(stored.is_passenger(rider.id));
    }

    #[tokio::test]
    async fn driver_cannot_book_own_ride() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;

        let ride = service
            .schedule_ride(CallerContext::new(driver.id), departure(), 2)
            .await
            .unwrap();

        let result = service
            .book_seat(CallerContext::new(driver.id), ride.id)
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn concurrent_bookings_never_oversell() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;
        let seats = 3u32;

        let ride = service
            .schedule_ride(CallerContext::new(driver.id), departure(), seats)
            .await
            .unwrap();

        let service = Arc::new(service);
        let mut handles = Vec::new();
        for i in 0..(seats + 1) {
            let rider = seed_user(&repos, &format!("Rider{i}")).await;
            let service = Arc::clone(&service);
            let ride_id = ride.id;
            handles.push(tokio::spawn(async move {
                service
                    .book_seat(CallerContext::new(rider.id), ride_id)
                    .await
            }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(DomainError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, seats);
        assert_eq!(conflicts, 1);

        let stored = service.get_ride(ride.id).await.unwrap();
        assert_eq!(stored.seats_remaining, 0);
        assert_eq!(stored.passengers.len(), seats as usize);
    }

    #[tokio::test]
    async fn release_returns_the_seat() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;
        let rider = seed_user(&repos, "Rider").await;

        let ride = service
            .schedule_ride(CallerContext::new(driver.id), departure(), 2)
            .await
            .unwrap();
        service
            .book_seat(CallerContext::new(rider.id), ride.id)
            .await
            .unwrap();
        service
            .release_seat(CallerContext::new(rider.id), ride.id)
            .await
            .unwrap();

        let stored = service.get_ride(ride.id).await.unwrap();
        assert_eq!(stored.seats_remaining, 2);
        assert!(!stored.is_passenger(rider.id));
    }

    #[tokio::test]
    async fn full_lifecycle_to_completed() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;
        let rider = seed_user(&repos, "Rider").await;
        let driver_ctx = CallerContext::new(driver.id);

        let ride = service
            .schedule_ride(driver_ctx, departure(), 1)
            .await
            .unwrap();
        let code = service
            .book_seat(CallerContext::new(rider.id), ride.id)
            .await
            .unwrap();

        // Completing before boarding must fail.
        let early = service.complete_ride(driver_ctx, ride.id).await;
        assert!(matches!(early, Err(DomainError::Conflict(_))));

        let started = service
            .validate_boarding(driver_ctx, ride.id, rider.id, code.as_str(), true)
            .await
            .unwrap();
        assert!(started);

        service.complete_ride(driver_ctx, ride.id).await.unwrap();
        let stored = service.get_ride(ride.id).await.unwrap();
        assert_eq!(stored.status, RideStatus::Completed);

        // Second completion loses the status guard.
        let again = service.complete_ride(driver_ctx, ride.id).await;
        assert!(matches!(again, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn wrong_code_keeps_ride_pending() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;
        let rider = seed_user(&repos, "Rider").await;
        let driver_ctx = CallerContext::new(driver.id);

        let ride = service
            .schedule_ride(driver_ctx, departure(), 1)
            .await
            .unwrap();
        service
            .book_seat(CallerContext::new(rider.id), ride.id)
            .await
            .unwrap();

        let result = service
            .validate_boarding(driver_ctx, ride.id, rider.id, "not-a-code", true)
            .await;
        assert!(matches!(result, Err(DomainError::InvalidCredential(_))));

        let stored = service.get_ride(ride.id).await.unwrap();
        assert_eq!(stored.status, RideStatus::Pending);
        assert_eq!(stored.pending_credentials.len(), 1);
    }

    #[tokio::test]
    async fn only_driver_validates_boarding() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;
        let rider = seed_user(&repos, "Rider").await;

        let ride = service
            .schedule_ride(CallerContext::new(driver.id), departure(), 1)
            .await
            .unwrap();
        let code = service
            .book_seat(CallerContext::new(rider.id), ride.id)
            .await
            .unwrap();

        let result = service
            .validate_boarding(
                CallerContext::new(rider.id),
                ride.id,
                rider.id,
                code.as_str(),
                true,
            )
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn cancel_sweeps_notifications() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;
        let member = seed_user(&repos, "Member").await;

        let mut group = crate::domain::Group::new("g".into(), "#fff".into(), driver.id);
        group.add_member(member.id);
        repos.groups().insert(group).await.unwrap();

        let ride = service
            .schedule_ride(CallerContext::new(driver.id), departure(), 2)
            .await
            .unwrap();

        let unread = repos
            .notifications()
            .find_unread_for_user(member.id)
            .await
            .unwrap();
        assert_eq!(unread.len(), 1);

        service
            .cancel_ride(CallerContext::new(driver.id), ride.id)
            .await
            .unwrap();

        let unread = repos
            .notifications()
            .find_unread_for_user(member.id)
            .await
            .unwrap();
        assert!(unread.is_empty());

        let stored = service.get_ride(ride.id).await.unwrap();
        assert_eq!(stored.status, RideStatus::Cancelled);
        assert!(stored.pending_credentials.is_empty());
    }

    #[tokio::test]
    async fn cancel_rewrites_audit_messages() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;
        let first = seed_user(&repos, "First").await;
        let second = seed_user(&repos, "Second").await;

        let ride = service
            .schedule_ride(CallerContext::new(driver.id), departure(), 2)
            .await
            .unwrap();

        // Seed the booking records directly; the service writes its own
        // copies from a background task.
        for rider in [&first, &second] {
            repos
                .history()
                .insert_unique(HistoryRecord::new(
                    rider.id,
                    ride.id,
                    driver.display_name(),
                    HistoryEvent::Booked,
                    MSG_RIDE_BOOKED,
                ))
                .await
                .unwrap();
        }

        service
            .cancel_ride(CallerContext::new(driver.id), ride.id)
            .await
            .unwrap();

        for rider in [&first, &second] {
            let feed = repos.history().find_for_user(rider.id).await.unwrap();
            assert!(feed.iter().all(|r| r.message == MSG_CANCELLED_BY_DRIVER));
        }
    }

    #[tokio::test]
    async fn bookable_excludes_own_and_joined_rides() {
        let (repos, service) = setup();
        let driver = seed_driver(&repos, 4).await;
        let other_driver = {
            let mut user = seed_user(&repos, "Other").await;
            user.license_validated = true;
            repos.users().update(&user).await.unwrap();
            let profile = crate::domain::Driver::new(
                user.id,
                "LIC-456".to_string(),
                "Model 3".to_string(),
                4,
            );
            repos.drivers().insert(profile).await.unwrap();
            user
        };
        let rider = seed_user(&repos, "Rider").await;

        let own = service
            .schedule_ride(CallerContext::new(driver.id), departure(), 2)
            .await
            .unwrap();
        let joined = service
            .schedule_ride(CallerContext::new(other_driver.id), departure(), 2)
            .await
            .unwrap();
        service
            .book_seat(CallerContext::new(driver.id), joined.id)
            .await
            .unwrap();

        let bookable = service
            .list_bookable(CallerContext::new(driver.id))
            .await
            .unwrap();
        assert!(bookable.is_empty());

        let related = service
            .list_related(CallerContext::new(driver.id))
            .await
            .unwrap();
        let ids: Vec<Uuid> = related.iter().map(|r| r.id).collect();
        assert!(ids.contains(&own.id));
        assert!(ids.contains(&joined.id));

        let rider_bookable = service
            .list_bookable(CallerContext::new(rider.id))
            .await
            .unwrap();
        assert_eq!(rider_bookable.len(), 2);
    }
}
