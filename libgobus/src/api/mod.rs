//! API abstraction for the GoBus backend
//!
//! `BusApi` is the sole seam between the store layer and the transport:
//! `HttpApi` talks to the real backend over HTTPS JSON, `MockApi` is an
//! in-memory double for tests. Stores depend on `Arc<dyn BusApi>` and never
//! on a concrete transport.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Bus, BusPatch, BusSchedule, NewSchedule, SearchSchedule, Stand, UserProfile, VerifiedUser,
};

pub mod http;
pub mod mock;

pub use http::HttpApi;
pub use mock::MockApi;

/// Source of the session token for outgoing requests, and the target of
/// the forced-logout hook when the backend answers 401.
///
/// The session store implements this; the indirection keeps the transport
/// from depending on the store layer.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// The current session token, if any
    fn token(&self) -> Option<String>;

    /// Called once per 401 response, before the error propagates
    async fn handle_unauthorized(&self);
}

/// A token source that never has a token; used where no session exists
/// (tests, pre-login flows).
pub struct NoSession;

#[async_trait]
impl TokenSource for NoSession {
    fn token(&self) -> Option<String> {
        None
    }

    async fn handle_unauthorized(&self) {}
}

/// The backend operations consumed by the client, one method per endpoint
#[async_trait]
pub trait BusApi: Send + Sync {
    /// Request an OTP for the given address. POST `auth/get-email`
    async fn send_otp(&self, email: &str) -> Result<()>;

    /// Exchange an OTP for a (possibly skeleton) user. POST `auth/verify-otp`
    async fn verify_otp(&self, otp: u32) -> Result<VerifiedUser>;

    /// Create or update the user profile. PATCH `api/user/create-user`
    async fn register_user(&self, profile: &UserProfile) -> Result<VerifiedUser>;

    /// The logged-in owner's buses. GET `bus/my-buses`
    async fn my_buses(&self) -> Result<Vec<Bus>>;

    /// POST `bus/create`
    async fn create_bus(&self, bus: &Bus) -> Result<()>;

    /// PUT `bus/update/{id}`
    async fn update_bus(&self, id: &str, patch: &BusPatch) -> Result<()>;

    /// DELETE `bus/delete/{id}`
    async fn delete_bus(&self, id: &str) -> Result<()>;

    /// The boarding-point reference list. GET `schedule/stands`
    async fn stands(&self) -> Result<Vec<Stand>>;

    /// GET `schedule/search?source=&destination=`
    async fn search_schedules(
        &self,
        source_id: &str,
        destination_id: &str,
    ) -> Result<Vec<SearchSchedule>>;

    /// POST `schedule/create`
    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<()>;

    /// GET `schedule/bus/{busId}`; `None` when the bus has no schedule yet
    async fn schedule_by_bus(&self, bus_id: &str) -> Result<Option<BusSchedule>>;

    /// DELETE `schedule/{scheduleId}`
    async fn delete_schedule(&self, schedule_id: &str) -> Result<()>;

    /// GET `user/favorites`
    async fn favorites(&self) -> Result<Vec<Bus>>;

    /// POST `user/favorites/add`
    async fn add_favorite(&self, bus_id: &str) -> Result<()>;

    /// DELETE `user/favorites/{busId}`
    async fn remove_favorite(&self, bus_id: &str) -> Result<()>;

    /// POST `feedback`
    async fn send_feedback(&self, message: &str, admin_email: &str) -> Result<()>;
}
