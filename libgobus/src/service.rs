//! Service facade wiring config, storage, transport and stores
//!
//! `GobusService` is the single entry point the CLI tools consume: it
//! loads configuration, opens the local state database, rehydrates the
//! persisted session and recent searches, and builds the store graph with
//! the session store doubling as the transport's token source. Auth flows
//! and the thin stateless calls (favorites, feedback) live here; the
//! collection stores are reachable through accessors.

use std::sync::Arc;

use tracing::info;

use crate::api::{BusApi, HttpApi};
use crate::config::Config;
use crate::db::Database;
use crate::error::{ApiError, GobusError, Result};
use crate::store::{BusStore, ScheduleStore, SearchStore, SessionStore};
use crate::types::{Bus, User, UserProfile, VerifiedUser};

/// Where feedback reports are routed server-side
pub const FEEDBACK_ADMIN_EMAIL: &str = "gobybus2025@gmail.com";

/// Outcome of OTP verification
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// A known account; the session is established
    Existing(User),
    /// First login: the caller must complete the profile before a
    /// session exists
    NeedsProfile,
}

pub struct GobusService {
    config: Arc<Config>,
    db: Arc<Database>,
    api: Arc<dyn BusApi>,
    session: Arc<SessionStore>,
    search: Arc<SearchStore>,
    buses: Arc<BusStore>,
    schedules: Arc<ScheduleStore>,
}

impl GobusService {
    /// Create a service from the default configuration location, falling
    /// back to built-in defaults when no config file exists
    pub async fn new() -> Result<Self> {
        Self::from_config(Config::load_or_default()).await
    }

    /// Create a service with a custom configuration
    pub async fn from_config(config: Config) -> Result<Self> {
        let db = Arc::new(Database::new(&config.database.path).await?);

        let session = Arc::new(SessionStore::new(Arc::clone(&db)));
        session.hydrate().await?;

        let api: Arc<dyn BusApi> =
            Arc::new(HttpApi::new(&config.api, Arc::clone(&session) as _)?);

        Self::assemble(Arc::new(config), db, api, session).await
    }

    /// Assemble a service from pre-built parts; used by tests to inject a
    /// mock transport
    pub async fn from_parts(
        config: Arc<Config>,
        db: Arc<Database>,
        api: Arc<dyn BusApi>,
        session: Arc<SessionStore>,
    ) -> Result<Self> {
        Self::assemble(config, db, api, session).await
    }

    async fn assemble(
        config: Arc<Config>,
        db: Arc<Database>,
        api: Arc<dyn BusApi>,
        session: Arc<SessionStore>,
    ) -> Result<Self> {
        let search = Arc::new(SearchStore::new(Arc::clone(&api), Arc::clone(&db)));
        search.hydrate().await?;

        let schedules = Arc::new(ScheduleStore::new(Arc::clone(&api)));
        let buses = Arc::new(BusStore::new(Arc::clone(&api), Arc::clone(&schedules)));

        Ok(Self {
            config,
            db,
            api,
            session,
            search,
            buses,
            schedules,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn search(&self) -> &SearchStore {
        &self.search
    }

    pub fn buses(&self) -> &BusStore {
        &self.buses
    }

    pub fn schedules(&self) -> &ScheduleStore {
        &self.schedules
    }

    // Auth flows

    /// Ask the backend to email an OTP
    pub async fn request_otp(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(GobusError::InvalidInput(
                "A valid email address is required".to_string(),
            ));
        }
        self.api.send_otp(email).await
    }

    /// Exchange an OTP for a session, or learn that the profile still
    /// needs completing
    pub async fn verify_otp(&self, otp: u32) -> Result<LoginOutcome> {
        let verified = self.api.verify_otp(otp).await?;

        if !verified.is_complete() {
            return Ok(LoginOutcome::NeedsProfile);
        }

        let user = self.establish_session(verified).await?;
        info!(name = %user.name, "logged in");
        Ok(LoginOutcome::Existing(user))
    }

    /// Complete a first-time registration and establish the session
    pub async fn complete_profile(&self, profile: &UserProfile) -> Result<User> {
        if profile.name.trim().is_empty() {
            return Err(GobusError::InvalidInput("Name is required".to_string()));
        }
        if profile.phone.trim().is_empty() {
            return Err(GobusError::InvalidInput("Phone is required".to_string()));
        }

        let verified = self.api.register_user(profile).await?;
        let user = self.establish_session(verified).await?;
        info!(name = %user.name, "registered and logged in");
        Ok(user)
    }

    async fn establish_session(&self, verified: VerifiedUser) -> Result<User> {
        let token = verified
            .token
            .clone()
            .ok_or_else(|| ApiError::Decode("response has no session token".to_string()))?;
        let user = verified
            .into_user()
            .ok_or_else(|| ApiError::Decode("response has no user profile".to_string()))?;

        self.session.login(user.clone(), token).await?;
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await
    }

    // Favorites and feedback have no client-side collection of record;
    // callers hit the API each time, as the original screens did.

    pub async fn favorites(&self) -> Result<Vec<Bus>> {
        self.api.favorites().await
    }

    pub async fn add_favorite(&self, bus_id: &str) -> Result<()> {
        self.api.add_favorite(bus_id).await
    }

    pub async fn remove_favorite(&self, bus_id: &str) -> Result<()> {
        self.api.remove_favorite(bus_id).await
    }

    pub async fn send_feedback(&self, message: &str) -> Result<()> {
        let message = message.trim();
        if message.is_empty() {
            return Err(GobusError::InvalidInput(
                "Feedback message cannot be empty".to_string(),
            ));
        }
        self.api.send_feedback(message, FEEDBACK_ADMIN_EMAIL).await
    }
}
