//! Mock API implementation for testing
//!
//! An in-memory backend double with configurable failures and per-call
//! latency, used by store and service tests to exercise success paths,
//! stale-on-error behavior, and out-of-order fetch completion without any
//! network access.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use uuid::Uuid;

use crate::api::BusApi;
use crate::error::{ApiError, Result};
use crate::types::{
    Bus, BusPatch, BusSchedule, NewSchedule, SearchSchedule, Stand, UserProfile, VerifiedUser,
};

#[derive(Default)]
pub struct MockState {
    pub stands: Vec<Stand>,
    pub buses: Vec<Bus>,
    pub schedules_by_bus: HashMap<String, BusSchedule>,
    pub search_results: Vec<SearchSchedule>,
    pub favorite_ids: Vec<String>,
    pub feedback: Vec<String>,
    pub otp_emails: Vec<String>,

    /// User returned by `verify_otp` / `register_user`
    pub verified_user: VerifiedUser,

    /// When set, every call fails with a clone of this error
    pub fail_with: Option<ApiError>,

    /// Per-call latencies, popped front-first by each fetch; calls beyond
    /// the queue complete immediately. Lets tests interleave two in-flight
    /// fetches deterministically.
    pub delays: VecDeque<Duration>,

    /// Scripted stands responses, popped per `stands()` call; when empty
    /// the `stands` field is returned.
    pub stands_script: VecDeque<Vec<Stand>>,

    pub call_counts: HashMap<&'static str, usize>,
}

pub struct MockApi {
    pub state: Mutex<MockState>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                verified_user: VerifiedUser {
                    name: Some("Test User".to_string()),
                    email: Some("test@example.com".to_string()),
                    role: Some("passenger".to_string()),
                    token: Some("mock-token".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            }),
        }
    }

    /// A mock whose every call fails with the given error
    pub fn failing(error: ApiError) -> Self {
        let mock = Self::new();
        mock.lock().fail_with = Some(error);
        mock
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self, name: &'static str) -> usize {
        *self.lock().call_counts.get(name).unwrap_or(&0)
    }

    /// Record the call, pop any scripted delay, and fail if configured.
    /// Returns the delay to sleep outside the lock.
    fn enter(&self, name: &'static str) -> Result<Duration> {
        let mut state = self.lock();
        *state.call_counts.entry(name).or_insert(0) += 1;
        let delay = state.delays.pop_front().unwrap_or(Duration::ZERO);
        match &state.fail_with {
            Some(error) => Err(error.clone().into()),
            None => Ok(delay),
        }
    }
}

#[async_trait]
impl BusApi for MockApi {
    async fn send_otp(&self, email: &str) -> Result<()> {
        let delay = self.enter("send_otp")?;
        sleep(delay).await;
        self.lock().otp_emails.push(email.to_string());
        Ok(())
    }

    async fn verify_otp(&self, _otp: u32) -> Result<VerifiedUser> {
        let delay = self.enter("verify_otp")?;
        sleep(delay).await;
        Ok(self.lock().verified_user.clone())
    }

    async fn register_user(&self, profile: &UserProfile) -> Result<VerifiedUser> {
        let delay = self.enter("register_user")?;
        sleep(delay).await;
        let mut user = self.lock().verified_user.clone();
        user.name = Some(profile.name.clone());
        user.email = Some(profile.email.clone());
        user.role = Some(profile.role.to_string());
        user.phone = Some(profile.phone.clone());
        Ok(user)
    }

    async fn my_buses(&self) -> Result<Vec<Bus>> {
        let delay = self.enter("my_buses")?;
        sleep(delay).await;
        Ok(self.lock().buses.clone())
    }

    async fn create_bus(&self, bus: &Bus) -> Result<()> {
        let delay = self.enter("create_bus")?;
        sleep(delay).await;
        let mut created = bus.clone();
        created.id = Some(Uuid::new_v4().to_string());
        self.lock().buses.push(created);
        Ok(())
    }

    async fn update_bus(&self, id: &str, patch: &BusPatch) -> Result<()> {
        let delay = self.enter("update_bus")?;
        sleep(delay).await;
        let mut state = self.lock();
        let bus = state
            .buses
            .iter_mut()
            .find(|b| b.id.as_deref() == Some(id))
            .ok_or(ApiError::Unexpected {
                status: 404,
                message: "bus not found".to_string(),
            })?;
        if let Some(name) = &patch.name {
            bus.name = name.clone();
        }
        if let Some(registration) = &patch.registration_number {
            bus.registration_number = registration.clone();
        }
        if let Some(number) = &patch.bus_number {
            bus.bus_number = number.clone();
        }
        if let Some(bus_type) = &patch.bus_type {
            bus.bus_type = bus_type.clone();
        }
        if let Some(seats) = patch.seat_capacity {
            bus.seat_capacity = seats;
        }
        if let Some(ac) = patch.is_ac {
            bus.is_ac = ac;
        }
        if let Some(express) = patch.is_express {
            bus.is_express = express;
        }
        Ok(())
    }

    async fn delete_bus(&self, id: &str) -> Result<()> {
        let delay = self.enter("delete_bus")?;
        sleep(delay).await;
        self.lock().buses.retain(|b| b.id.as_deref() != Some(id));
        Ok(())
    }

    async fn stands(&self) -> Result<Vec<Stand>> {
        let delay = self.enter("stands")?;
        // Scripted responses pair with calls in issue order, not in the
        // order the delayed calls happen to complete.
        let scripted = self.lock().stands_script.pop_front();
        sleep(delay).await;
        Ok(match scripted {
            Some(stands) => stands,
            None => self.lock().stands.clone(),
        })
    }

    async fn search_schedules(
        &self,
        _source_id: &str,
        _destination_id: &str,
    ) -> Result<Vec<SearchSchedule>> {
        let delay = self.enter("search_schedules")?;
        sleep(delay).await;
        Ok(self.lock().search_results.clone())
    }

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<()> {
        let delay = self.enter("create_schedule")?;
        sleep(delay).await;
        let stored = BusSchedule {
            id: Uuid::new_v4().to_string(),
            departure_time: schedule.stops.first().map(|s| s.arrival_time.clone()),
            arrival_time: schedule.stops.last().map(|s| s.arrival_time.clone()),
            fare: None,
            stops: vec![],
        };
        self.lock()
            .schedules_by_bus
            .insert(schedule.bus_id.clone(), stored);
        Ok(())
    }

    async fn schedule_by_bus(&self, bus_id: &str) -> Result<Option<BusSchedule>> {
        let delay = self.enter("schedule_by_bus")?;
        sleep(delay).await;
        Ok(self.lock().schedules_by_bus.get(bus_id).cloned())
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<()> {
        let delay = self.enter("delete_schedule")?;
        sleep(delay).await;
        self.lock()
            .schedules_by_bus
            .retain(|_, schedule| schedule.id != schedule_id);
        Ok(())
    }

    async fn favorites(&self) -> Result<Vec<Bus>> {
        let delay = self.enter("favorites")?;
        sleep(delay).await;
        let state = self.lock();
        Ok(state
            .buses
            .iter()
            .filter(|b| {
                b.id.as_ref()
                    .map(|id| state.favorite_ids.contains(id))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn add_favorite(&self, bus_id: &str) -> Result<()> {
        let delay = self.enter("add_favorite")?;
        sleep(delay).await;
        let mut state = self.lock();
        if !state.favorite_ids.iter().any(|id| id == bus_id) {
            state.favorite_ids.push(bus_id.to_string());
        }
        Ok(())
    }

    async fn remove_favorite(&self, bus_id: &str) -> Result<()> {
        let delay = self.enter("remove_favorite")?;
        sleep(delay).await;
        self.lock().favorite_ids.retain(|id| id != bus_id);
        Ok(())
    }

    async fn send_feedback(&self, message: &str, _admin_email: &str) -> Result<()> {
        let delay = self.enter("send_feedback")?;
        sleep(delay).await;
        self.lock().feedback.push(message.to_string());
        Ok(())
    }
}
