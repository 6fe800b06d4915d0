//! Ride repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Ride;
use crate::shared::DomainResult;

#[async_trait]
pub trait RideRepository: Send + Sync {
    /// Persist a newly scheduled ride
    async fn insert(&self, ride: Ride) -> DomainResult<()>;

    /// Find ride by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Ride>>;

    /// Conditional write: persists `ride` (with its version bumped by one)
    /// only if the stored version still equals `ride.version`. Returns
    /// `false` when a concurrent writer won the race.
    async fn update(&self, ride: &Ride) -> DomainResult<bool>;

    /// Rides the user participates in, as driver or passenger
    async fn find_related(&self, user_id: Uuid) -> DomainResult<Vec<Ride>>;

    /// Open rides the user could still book (pending, not their own,
    /// not already booked)
    async fn find_bookable(&self, user_id: Uuid) -> DomainResult<Vec<Ride>>;
}
