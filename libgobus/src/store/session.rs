//! Session store: authenticated user, token, login state
//!
//! The only mutators are `login` and `logout`; every mutation is mirrored
//! to the session row in local storage, and `hydrate` restores it at
//! process start. The store doubles as the transport's `TokenSource`, so a
//! 401 from any endpoint forces a logout here before the error reaches the
//! caller.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::TokenSource;
use crate::db::Database;
use crate::error::Result;
use crate::store::{read, write};
use crate::types::{Session, User};

pub struct SessionStore {
    db: Arc<Database>,
    state: RwLock<Session>,
}

impl SessionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            state: RwLock::new(Session::default()),
        }
    }

    /// Restore the persisted session; a fresh install stays logged out
    pub async fn hydrate(&self) -> Result<()> {
        if let Some(session) = self.db.load_session().await? {
            debug!(logged_in = session.is_logged_in, "session rehydrated");
            *write(&self.state) = session;
        }
        Ok(())
    }

    pub async fn login(&self, user: User, token: String) -> Result<()> {
        let session = Session {
            user: Some(user),
            token: Some(token),
            is_logged_in: true,
        };
        *write(&self.state) = session.clone();
        self.db.save_session(&session).await
    }

    /// Null out user and token; holds regardless of prior state
    pub async fn logout(&self) -> Result<()> {
        let session = Session::default();
        *write(&self.state) = session.clone();
        self.db.save_session(&session).await
    }

    pub fn snapshot(&self) -> Session {
        read(&self.state).clone()
    }

    pub fn user(&self) -> Option<User> {
        read(&self.state).user.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        read(&self.state).is_logged_in
    }
}

#[async_trait]
impl TokenSource for SessionStore {
    fn token(&self) -> Option<String> {
        read(&self.state).token.clone()
    }

    async fn handle_unauthorized(&self) {
        warn!("session rejected by server, logging out");
        if let Err(error) = self.logout().await {
            warn!(%error, "failed to persist forced logout");
        }
    }
}
