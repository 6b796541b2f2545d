//! Search store: stands reference list, schedule search, recent searches
//!
//! The stands list is transient fetch state and is never persisted; the
//! recent-search list is the persisted half, mirrored wholesale to local
//! storage on every mutation and rehydrated before first use.
//!
//! Recent-search invariants: at most five entries, no two entries share a
//! `(from_id, to_id)` pair, most recent first. A re-added pair is promoted
//! to the front as a fresh entry; the older occurrence is removed, not
//! reused, so its original insertion time is lost. That is a deliberate
//! simplification carried over from the source behavior.

use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use crate::api::BusApi;
use crate::db::Database;
use crate::error::Result;
use crate::store::{read, write, FetchGate};
use crate::types::{RecentSearch, SearchSchedule, Stand};

pub const MAX_RECENT_SEARCHES: usize = 5;

#[derive(Default)]
struct SearchState {
    stands: Vec<Stand>,
    recent: Vec<RecentSearch>,
    loading: bool,
}

pub struct SearchStore {
    api: Arc<dyn BusApi>,
    db: Arc<Database>,
    state: RwLock<SearchState>,
    gate: FetchGate,
}

impl SearchStore {
    pub fn new(api: Arc<dyn BusApi>, db: Arc<Database>) -> Self {
        Self {
            api,
            db,
            state: RwLock::new(SearchState::default()),
            gate: FetchGate::default(),
        }
    }

    /// Restore the persisted recent-search list
    pub async fn hydrate(&self) -> Result<()> {
        let recent = self.db.load_recent_searches().await?;
        write(&self.state).recent = recent;
        Ok(())
    }

    /// Refresh the stands list wholesale; on failure the prior list stays
    pub async fn fetch_stands(&self) -> Result<()> {
        let ticket = self.gate.issue();
        write(&self.state).loading = true;

        let result = self.api.stands().await;

        let mut state = write(&self.state);
        if !self.gate.is_current(ticket) {
            debug!("discarding superseded stands fetch");
            return result.map(|_| ());
        }
        state.loading = false;

        match result {
            Ok(stands) => {
                state.stands = stands;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to fetch stands");
                Err(e)
            }
        }
    }

    /// Run an origin/destination search; results are returned, not cached
    pub async fn search(
        &self,
        source_id: &str,
        destination_id: &str,
    ) -> Result<Vec<SearchSchedule>> {
        write(&self.state).loading = true;
        let result = self.api.search_schedules(source_id, destination_id).await;
        write(&self.state).loading = false;

        if let Err(e) = &result {
            error!(error = %e, "schedule search failed");
        }
        result
    }

    /// Record a completed search: dedup by `(from_id, to_id)`, newest
    /// first, capped at five. The in-memory update cannot fail; the
    /// storage mirror reports its own errors.
    pub async fn add_recent(&self, search: RecentSearch) -> Result<()> {
        let snapshot = {
            let mut state = write(&self.state);
            state
                .recent
                .retain(|s| !(s.from_id == search.from_id && s.to_id == search.to_id));
            state.recent.insert(0, search);
            state.recent.truncate(MAX_RECENT_SEARCHES);
            state.recent.clone()
        };
        self.db.replace_recent_searches(&snapshot).await
    }

    /// Reset the recent-search list; idempotent
    pub async fn clear_recent(&self) -> Result<()> {
        write(&self.state).recent.clear();
        self.db.replace_recent_searches(&[]).await
    }

    pub fn stands(&self) -> Vec<Stand> {
        read(&self.state).stands.clone()
    }

    /// Case-insensitive stand lookup by display name
    pub fn stand_by_name(&self, name: &str) -> Option<Stand> {
        read(&self.state)
            .stands
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn recent(&self) -> Vec<RecentSearch> {
        read(&self.state).recent.clone()
    }

    pub fn is_loading(&self) -> bool {
        read(&self.state).loading
    }
}
