//! GoBus - client toolkit for the GoByBus service
//!
//! This library provides the typed API client, persisted local state
//! (session and recent searches) and the store layer shared by the
//! gobus-* command-line tools.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use api::{BusApi, HttpApi, MockApi};
pub use config::Config;
pub use db::Database;
pub use error::{ApiError, GobusError, Result};
pub use service::{GobusService, LoginOutcome};
pub use store::{BusStore, ScheduleStore, SearchStore, SessionStore};
pub use types::{
    Bus, BusPatch, BusSchedule, NewSchedule, NewScheduleStop, RecentSearch, Role, SearchSchedule,
    Session, Stand, User, UserProfile,
};
