//! Ride aggregate and its lifecycle state machine

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::errors::{DomainError, DomainResult};

/// Ride lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideStatus {
    /// Open for booking; passengers hold pending boarding credentials
    Pending,
    /// Boarding validated, ride under way
    Ongoing,
    /// Terminal: ride finished
    Completed,
    /// Terminal: ride called off
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "ongoing" => Self::Ongoing,
            "completed" => Self::Completed,
            _ => Self::Cancelled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single-use boarding code issued to a passenger at booking time.
///
/// Six decimal digits drawn uniformly. A convenience check-in identifier
/// shown on the passenger's screen and read out to the driver — not a
/// cryptographic secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardingCode(String);

impl BoardingCode {
    pub fn generate() -> Self {
        let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
        Self(format!("{:06}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BoardingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A passenger's seat reservation: passenger identity plus boarding code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub user_id: Uuid,
    pub code: BoardingCode,
}

/// The ride aggregate. Single writer: the booking engine.
///
/// `version` is the optimistic-concurrency token; every persisted mutation
/// is conditioned on it so racing writers cannot both win (no oversell).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    /// User identity of the owning driver; immutable after creation.
    pub driver_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub offered_seats: u32,
    pub seats_remaining: u32,
    pub status: RideStatus,
    /// Ordered, unique by passenger identity.
    pub passengers: Vec<Booking>,
    /// (passenger, code) pairs awaiting driver validation. Non-empty only
    /// while `Pending`; cleared as a batch when boarding completes.
    pub pending_credentials: Vec<Booking>,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl Ride {
    /// Schedule a new ride. Departure must be at least one hour out.
    pub fn schedule(
        driver_id: Uuid,
        scheduled_at: DateTime<Utc>,
        seats: u32,
    ) -> DomainResult<Self> {
        if seats == 0 {
            return Err(DomainError::Validation(
                "A ride must offer at least one seat".to_string(),
            ));
        }

        let now = Utc::now();
        if scheduled_at <= now {
            return Err(DomainError::Validation(
                "Cannot schedule a ride in the past".to_string(),
            ));
        }
        if scheduled_at - now < Duration::hours(1) {
            return Err(DomainError::Validation(
                "Rides must be scheduled at least one hour in advance".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            driver_id,
            scheduled_at,
            offered_seats: seats,
            seats_remaining: seats,
            status: RideStatus::Pending,
            passengers: Vec::new(),
            pending_credentials: Vec::new(),
            created_at: now,
            version: 0,
        })
    }

    pub fn is_passenger(&self, user_id: Uuid) -> bool {
        self.passengers.iter().any(|b| b.user_id == user_id)
    }

    pub fn boarding_code(&self, user_id: Uuid) -> Option<&BoardingCode> {
        self.passengers
            .iter()
            .find(|b| b.user_id == user_id)
            .map(|b| &b.code)
    }

    /// Reserve one seat for `user_id` with the given boarding code.
    pub fn book(&mut self, user_id: Uuid, code: BoardingCode) -> DomainResult<()> {
        if self.status != RideStatus::Pending {
            return Err(DomainError::Conflict(format!(
                "Ride is not open for booking (status: {})",
                self.status
            )));
        }
        if user_id == self.driver_id {
            return Err(DomainError::Forbidden(
                "Driver cannot book their own ride".to_string(),
            ));
        }
        if self.is_passenger(user_id) {
            return Err(DomainError::Conflict(
                "Already booked on this ride".to_string(),
            ));
        }
        if self.seats_remaining == 0 {
            return Err(DomainError::Conflict("No seats available".to_string()));
        }

        self.passengers.push(Booking {
            user_id,
            code: code.clone(),
        });
        self.pending_credentials.push(Booking { user_id, code });
        self.seats_remaining -= 1;
        Ok(())
    }

    /// Release the caller's seat and withdraw their boarding credential.
    pub fn unbook(&mut self, user_id: Uuid) -> DomainResult<()> {
        if self.status != RideStatus::Pending {
            return Err(DomainError::Conflict(format!(
                "Ride is not open for changes (status: {})",
                self.status
            )));
        }
        let idx = self
            .passengers
            .iter()
            .position(|b| b.user_id == user_id)
            .ok_or_else(|| {
                DomainError::Forbidden("Not a passenger on this ride".to_string())
            })?;

        self.passengers.remove(idx);
        self.pending_credentials.retain(|b| b.user_id != user_id);
        self.seats_remaining += 1;
        Ok(())
    }

    /// Check one (passenger, code) pair against the pending credentials.
    ///
    /// Returns `true` when the ride transitioned to `Ongoing`. Checking a
    /// single code with `all_validated = false` acknowledges the match but
    /// persists nothing — the whole credential set is discarded as a batch
    /// only once the driver signals the last check. This makes validating
    /// one code idempotent until the terminal flag is sent.
    pub fn validate_boarding(
        &mut self,
        user_id: Uuid,
        code: &str,
        all_validated: bool,
    ) -> DomainResult<bool> {
        let matched = self
            .pending_credentials
            .iter()
            .any(|b| b.user_id == user_id && b.code.as_str() == code);
        if !matched {
            return Err(DomainError::InvalidCredential(self.id.to_string()));
        }

        if all_validated {
            self.status = RideStatus::Ongoing;
            self.pending_credentials.clear();
            return Ok(true);
        }
        Ok(false)
    }

    /// `Ongoing` → `Completed`. The status guard doubles as the idempotency
    /// check for concurrent duplicate completion requests.
    pub fn complete(&mut self) -> DomainResult<()> {
        if self.status != RideStatus::Ongoing {
            return Err(DomainError::Conflict(format!(
                "Cannot complete a ride that is {}",
                self.status
            )));
        }
        self.status = RideStatus::Completed;
        Ok(())
    }

    /// Cancel from any non-terminal status. Outstanding credentials are
    /// discarded with the ride.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::Conflict(format!(
                "Cannot cancel a ride that is {}",
                self.status
            )));
        }
        self.status = RideStatus::Cancelled;
        self.pending_credentials.clear();
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ride(seats: u32) -> Ride {
        Ride::schedule(Uuid::new_v4(), Utc::now() + Duration::hours(2), seats).unwrap()
    }

    fn assert_invariants(ride: &Ride) {
        assert_eq!(
            ride.seats_remaining + ride.passengers.len() as u32,
            ride.offered_seats
        );
        if ride.status == RideStatus::Pending {
            assert_eq!(ride.pending_credentials.len(), ride.passengers.len());
        } else {
            assert!(ride.pending_credentials.is_empty());
        }
    }

    #[test]
    fn schedule_rejects_zero_seats() {
        let result = Ride::schedule(Uuid::new_v4(), Utc::now() + Duration::hours(2), 0);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn schedule_rejects_past_departure() {
        let result = Ride::schedule(Uuid::new_v4(), Utc::now() - Duration::hours(1), 3);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn schedule_enforces_one_hour_lead() {
        let result = Ride::schedule(Uuid::new_v4(), Utc::now() + Duration::minutes(30), 3);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn new_ride_is_pending_with_all_seats() {
        let ride = sample_ride(3);
        assert_eq!(ride.status, RideStatus::Pending);
        assert_eq!(ride.seats_remaining, 3);
        assert!(ride.passengers.is_empty());
        assert_invariants(&ride);
    }

    #[test]
    fn book_takes_a_seat_and_issues_credential() {
        let mut ride = sample_ride(2);
        let passenger = Uuid::new_v4();
        ride.book(passenger, BoardingCode::generate()).unwrap();

        assert_eq!(ride.seats_remaining, 1);
        assert!(ride.is_passenger(passenger));
        assert!(ride.boarding_code(passenger).is_some());
        assert_invariants(&ride);
    }

    #[test]
    fn book_rejects_driver() {
        let mut ride = sample_ride(2);
        let driver = ride.driver_id;
        let result = ride.book(driver, BoardingCode::generate());
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
        assert_invariants(&ride);
    }

    #[test]
    fn book_rejects_duplicate_passenger() {
        let mut ride = sample_ride(3);
        let passenger = Uuid::new_v4();
        ride.book(passenger, BoardingCode::generate()).unwrap();
        let result = ride.book(passenger, BoardingCode::generate());
        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(ride.seats_remaining, 2);
    }

    #[test]
    fn book_rejects_when_full() {
        let mut ride = sample_ride(1);
        ride.book(Uuid::new_v4(), BoardingCode::generate()).unwrap();
        let result = ride.book(Uuid::new_v4(), BoardingCode::generate());
        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(ride.seats_remaining, 0);
        assert_invariants(&ride);
    }

    #[test]
    fn unbook_frees_the_seat_and_withdraws_credential() {
        let mut ride = sample_ride(2);
        let keeper = Uuid::new_v4();
        let leaver = Uuid::new_v4();
        ride.book(keeper, BoardingCode::generate()).unwrap();
        ride.book(leaver, BoardingCode::generate()).unwrap();
        assert_eq!(ride.seats_remaining, 0);

        ride.unbook(leaver).unwrap();
        assert_eq!(ride.seats_remaining, 1);
        assert!(!ride.is_passenger(leaver));
        assert!(ride.is_passenger(keeper));
        assert_invariants(&ride);
    }

    #[test]
    fn unbook_rejects_non_passenger() {
        let mut ride = sample_ride(2);
        let result = ride.unbook(Uuid::new_v4());
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[test]
    fn validate_boarding_rejects_wrong_code() {
        let mut ride = sample_ride(2);
        let passenger = Uuid::new_v4();
        ride.book(passenger, BoardingCode::generate()).unwrap();

        let result = ride.validate_boarding(passenger, "000000x", true);
        assert!(matches!(result, Err(DomainError::InvalidCredential(_))));
        assert_eq!(ride.status, RideStatus::Pending);
        assert_eq!(ride.pending_credentials.len(), 1);
    }

    #[test]
    fn validate_boarding_rejects_code_of_another_passenger() {
        let mut ride = sample_ride(2);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        ride.book(first, BoardingCode::generate()).unwrap();
        ride.book(second, BoardingCode::generate()).unwrap();

        let second_code = ride.boarding_code(second).unwrap().as_str().to_string();
        let result = ride.validate_boarding(first, &second_code, false);
        // Codes could theoretically collide; skip the assertion if they do.
        if ride.boarding_code(first).unwrap().as_str() != second_code {
            assert!(matches!(result, Err(DomainError::InvalidCredential(_))));
        }
    }

    #[test]
    fn boarding_completes_in_two_steps() {
        let mut ride = sample_ride(2);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        ride.book(first, BoardingCode::generate()).unwrap();
        ride.book(second, BoardingCode::generate()).unwrap();

        let first_code = ride.boarding_code(first).unwrap().as_str().to_string();
        let transitioned = ride.validate_boarding(first, &first_code, false).unwrap();
        assert!(!transitioned);
        assert_eq!(ride.status, RideStatus::Pending);
        assert_eq!(ride.pending_credentials.len(), 2);

        let second_code = ride.boarding_code(second).unwrap().as_str().to_string();
        let transitioned = ride.validate_boarding(second, &second_code, true).unwrap();
        assert!(transitioned);
        assert_eq!(ride.status, RideStatus::Ongoing);
        assert!(ride.pending_credentials.is_empty());
        assert_invariants(&ride);
    }

    #[test]
    fn complete_requires_ongoing() {
        let mut ride = sample_ride(1);
        let result = ride.complete();
        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(ride.status, RideStatus::Pending);
    }

    #[test]
    fn complete_after_boarding() {
        let mut ride = sample_ride(1);
        let passenger = Uuid::new_v4();
        ride.book(passenger, BoardingCode::generate()).unwrap();
        let code = ride.boarding_code(passenger).unwrap().as_str().to_string();
        ride.validate_boarding(passenger, &code, true).unwrap();

        ride.complete().unwrap();
        assert_eq!(ride.status, RideStatus::Completed);
        assert!(ride.complete().is_err());
    }

    #[test]
    fn cancel_allowed_while_pending_and_ongoing() {
        let mut pending = sample_ride(1);
        pending.cancel().unwrap();
        assert_eq!(pending.status, RideStatus::Cancelled);

        let mut ongoing = sample_ride(1);
        let passenger = Uuid::new_v4();
        ongoing.book(passenger, BoardingCode::generate()).unwrap();
        let code = ongoing.boarding_code(passenger).unwrap().as_str().to_string();
        ongoing.validate_boarding(passenger, &code, true).unwrap();

        ongoing.cancel().unwrap();
        assert_eq!(ongoing.status, RideStatus::Cancelled);
        assert_invariants(&ongoing);
    }

    #[test]
    fn terminal_states_are_immutable() {
        let mut ride = sample_ride(2);
        ride.cancel().unwrap();

        assert!(ride.book(Uuid::new_v4(), BoardingCode::generate()).is_err());
        assert!(ride.unbook(Uuid::new_v4()).is_err());
        assert!(ride.complete().is_err());
        assert!(ride.cancel().is_err());
        assert_eq!(ride.status, RideStatus::Cancelled);
    }

    #[test]
    fn boarding_code_is_six_digits() {
        for _ in 0..100 {
            let code = BoardingCode::generate();
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn status_display_roundtrip() {
        for status in &[
            RideStatus::Pending,
            RideStatus::Ongoing,
            RideStatus::Completed,
            RideStatus::Cancelled,
        ] {
            let parsed = RideStatus::from_str(status.as_str());
            assert_eq!(&parsed, status);
        }
    }
}
