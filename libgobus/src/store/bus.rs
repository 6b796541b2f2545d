//! Bus store: the owner's bus inventory
//!
//! Mutations never patch local state; every successful write refetches the
//! whole collection so the snapshot is always the server's. Deleting a bus
//! also invalidates its cached schedule through the schedule store, so the
//! two stores cannot drift apart on that edge.

use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use crate::api::BusApi;
use crate::error::Result;
use crate::store::{read, write, FetchGate, ScheduleStore};
use crate::types::{Bus, BusPatch};

#[derive(Default)]
struct BusState {
    /// `None` until the first successful fetch
    my_buses: Option<Vec<Bus>>,
    loading: bool,
}

pub struct BusStore {
    api: Arc<dyn BusApi>,
    schedules: Arc<ScheduleStore>,
    state: RwLock<BusState>,
    gate: FetchGate,
}

impl BusStore {
    pub fn new(api: Arc<dyn BusApi>, schedules: Arc<ScheduleStore>) -> Self {
        Self {
            api,
            schedules,
            state: RwLock::new(BusState::default()),
            gate: FetchGate::default(),
        }
    }

    /// Refresh the inventory wholesale; on failure the prior snapshot stays
    pub async fn fetch(&self) -> Result<()> {
        let ticket = self.gate.issue();
        write(&self.state).loading = true;

        let result = self.api.my_buses().await;

        let mut state = write(&self.state);
        if !self.gate.is_current(ticket) {
            debug!("discarding superseded bus fetch");
            return result.map(|_| ());
        }
        state.loading = false;

        match result {
            Ok(buses) => {
                state.my_buses = Some(buses);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to fetch buses");
                Err(e)
            }
        }
    }

    pub async fn add(&self, bus: &Bus) -> Result<()> {
        self.api.create_bus(bus).await?;
        self.fetch().await
    }

    pub async fn update(&self, id: &str, patch: &BusPatch) -> Result<()> {
        self.api.update_bus(id, patch).await?;
        self.fetch().await
    }

    /// Delete a bus, evict its cached schedule, and resynchronize
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.delete_bus(id).await?;
        self.schedules.invalidate(id);
        self.fetch().await
    }

    /// `None` = never fetched, `Some(buses)` = last server snapshot
    pub fn my_buses(&self) -> Option<Vec<Bus>> {
        read(&self.state).my_buses.clone()
    }

    pub fn is_loading(&self) -> bool {
        read(&self.state).loading
    }
}
