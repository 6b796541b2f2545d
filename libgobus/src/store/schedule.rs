//! Schedule store: per-bus stop lists, keyed by bus id
//!
//! The cache distinguishes three states per key: absent (never fetched),
//! `Some(None)` (fetched but failed or empty), and `Some(Some(_))` (a
//! cached schedule). Deleting a schedule, or the bus store's invalidation
//! hook, drops the key back to absent.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use crate::api::BusApi;
use crate::error::Result;
use crate::store::{read, write, KeyedFetchGate};
use crate::types::BusSchedule;

#[derive(Default)]
struct ScheduleState {
    schedules_by_bus: HashMap<String, Option<BusSchedule>>,
    loading: bool,
}

pub struct ScheduleStore {
    api: Arc<dyn BusApi>,
    state: RwLock<ScheduleState>,
    gate: KeyedFetchGate,
}

impl ScheduleStore {
    pub fn new(api: Arc<dyn BusApi>) -> Self {
        Self {
            api,
            state: RwLock::new(ScheduleState::default()),
            gate: KeyedFetchGate::default(),
        }
    }

    /// Fetch one bus's schedule into the keyed cache.
    ///
    /// A bus without a schedule caches as `None` under its key, as does a
    /// failed fetch, so the caller can tell "tried and got nothing" apart
    /// from "never tried".
    pub async fn fetch(&self, bus_id: &str) -> Result<()> {
        let ticket = self.gate.issue(bus_id);
        write(&self.state).loading = true;

        let result = self.api.schedule_by_bus(bus_id).await;

        let mut state = write(&self.state);
        if !self.gate.is_current(bus_id, ticket) {
            debug!(bus_id, "discarding superseded schedule fetch");
            return result.map(|_| ());
        }
        state.loading = false;

        match result {
            Ok(schedule) => {
                state.schedules_by_bus.insert(bus_id.to_string(), schedule);
                Ok(())
            }
            Err(e) => {
                error!(bus_id, error = %e, "failed to fetch schedule");
                state.schedules_by_bus.insert(bus_id.to_string(), None);
                Err(e)
            }
        }
    }

    /// Delete a schedule and drop the bus's cache entry
    pub async fn delete_schedule(&self, bus_id: &str, schedule_id: &str) -> Result<()> {
        self.api.delete_schedule(schedule_id).await?;
        write(&self.state).schedules_by_bus.remove(bus_id);
        Ok(())
    }

    /// Create a schedule, then refetch it so the cache holds the
    /// server-computed stop list rather than a local guess
    pub async fn create(&self, schedule: &crate::types::NewSchedule) -> Result<()> {
        let bus_id = schedule.bus_id.clone();
        self.api.create_schedule(schedule).await?;
        self.fetch(&bus_id).await
    }

    /// Invalidation hook: called by the bus store when a bus is deleted
    pub fn invalidate(&self, bus_id: &str) {
        if write(&self.state)
            .schedules_by_bus
            .remove(bus_id)
            .is_some()
        {
            debug!(bus_id, "evicted cached schedule for deleted bus");
        }
    }

    /// The cache entry for a bus: `None` = never fetched,
    /// `Some(None)` = fetched and failed/empty, `Some(Some(_))` = cached
    pub fn entry(&self, bus_id: &str) -> Option<Option<BusSchedule>> {
        read(&self.state).schedules_by_bus.get(bus_id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        read(&self.state).loading
    }
}
