//! Core types for GoBus
//!
//! Wire types mirror the backend's JSON verbatim (camelCase field names,
//! Mongo-style `_id` identifiers). The client never derives its own
//! invariants over server-owned entities; they are opaque snapshots.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user's profile as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Profile details submitted when completing registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Passenger,
    Driver,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Passenger => write!(f, "passenger"),
            Role::Driver => write!(f, "driver"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passenger" => Ok(Role::Passenger),
            "driver" => Ok(Role::Driver),
            _ => Err(format!(
                "Invalid role: '{}'. Valid options: passenger, driver",
                s
            )),
        }
    }
}

/// The user object inside OTP-verification and registration responses.
///
/// For a first-time login the backend returns a skeleton user with no
/// profile; `name` and `role` being present is what distinguishes an
/// existing account from one that still needs profile completion.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifiedUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl VerifiedUser {
    /// An account is considered existing when the backend has a completed
    /// profile for it.
    pub fn is_complete(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
            && self.role.as_deref().is_some_and(|r| !r.is_empty())
    }

    pub fn into_user(self) -> Option<User> {
        Some(User {
            name: self.name?,
            email: self.email.unwrap_or_default(),
            avatar: self.avatar,
            role: self.role,
            phone: self.phone,
        })
    }
}

/// The locally persisted authentication state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_logged_in: bool,
}

/// A boarding point, read-only reference data refreshed wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stand {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// A bus owned by the logged-in driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub registration_number: String,
    pub bus_number: String,
    pub bus_type: String,
    pub seat_capacity: u32,
    #[serde(rename = "isAC")]
    pub is_ac: bool,
    pub is_express: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Partial bus update; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_capacity: Option<u32>,
    #[serde(rename = "isAC", skip_serializing_if = "Option::is_none")]
    pub is_ac: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_express: Option<bool>,
}

/// One stop inside a schedule's stop list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleStop {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "arrivalTime")]
    pub arrival_time: String,
    pub stand: StopStand,
}

/// The stand reference embedded in a schedule stop, including the
/// server-computed distance and cumulative price at that stop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopStand {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub price: f64,
}

/// A bus's schedule as returned by `schedule/bus/{busId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusSchedule {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "departureTime", default)]
    pub departure_time: Option<String>,
    #[serde(rename = "arrivalTime", default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub fare: Option<f64>,
    #[serde(rename = "schedule", default)]
    pub stops: Vec<ScheduleStop>,
}

/// A search hit: a bus together with its stop list and timing summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSchedule {
    #[serde(rename = "_id")]
    pub id: String,
    pub bus: Bus,
    #[serde(rename = "schedule", default)]
    pub stops: Vec<ScheduleStop>,
    #[serde(rename = "sourceTime", default)]
    pub source_time: Option<String>,
    #[serde(rename = "destinationTime", default)]
    pub destination_time: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl SearchSchedule {
    /// The fare shown for a search hit is taken verbatim from the last
    /// stop's cumulative price, never recomputed client-side.
    pub fn fare(&self) -> Option<f64> {
        self.stops.last().map(|stop| stop.stand.price)
    }
}

/// Request body for creating a bus's schedule with its stop list.
#[derive(Debug, Clone, Serialize)]
pub struct NewSchedule {
    #[serde(rename = "busId")]
    pub bus_id: String,
    #[serde(rename = "scheduleStops")]
    pub stops: Vec<NewScheduleStop>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewScheduleStop {
    pub id: String,
    #[serde(rename = "standName")]
    pub stand_name: String,
    #[serde(rename = "arrivalTime")]
    pub arrival_time: String,
}

/// A previously executed origin/destination query.
///
/// Identity for de-duplication is the `(from_id, to_id)` pair; the labels
/// are display-only and two searches with equal names but different stand
/// ids are distinct entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentSearch {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "fromId")]
    pub from_id: String,
    #[serde(rename = "toId")]
    pub to_id: String,
}

impl RecentSearch {
    pub fn new(from: String, to: String, from_id: String, to_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from,
            to,
            from_id,
            to_id,
        }
    }
}
