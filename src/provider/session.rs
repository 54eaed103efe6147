use std::sync::{Arc, Mutex};

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use super::KeyValueStorage;
use crate::{
    error::Error,
    model::{Session, User},
};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated(Session),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Started,
    LoggedIn,
    LoggedOut,
    /// The backend rejected the token; the user has to log in again.
    Expired,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// `Some(exp)` for a JWT carrying an `exp` claim, `None` for anything else.
/// The signature is not checked: the token is only inspected for expiry.
pub fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}

pub fn is_token_expired(token: &str, now: i64) -> bool {
    token_expiry(token).is_some_and(|exp| exp <= now)
}

/// Current user and token, mirrored into storage under `token` and `user`.
#[derive(Debug)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    state: Mutex<AuthState>,
    events: watch::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let (events, _) = watch::channel(SessionEvent::Started);
        SessionStore {
            storage,
            state: Mutex::new(AuthState::Anonymous),
            events,
        }
    }

    /// Restores the persisted session. Unreadable user data or an expired
    /// token wipes both keys.
    pub fn rehydrate(&self) -> Result<Option<Session>, Error> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            (None, None) => return Ok(None),
            _ => {
                warn!("Incomplete persisted session, clearing");
                self.wipe_storage()?;
                return Ok(None);
            },
        };

        let user = match serde_json::from_str::<User>(&user) {
            Ok(user) => user,
            Err(e) => {
                warn!("Persisted user is unreadable, clearing: {}", e);
                self.wipe_storage()?;
                return Ok(None);
            },
        };

        if is_token_expired(&token, Utc::now().timestamp()) {
            info!("Persisted token expired, clearing");
            self.wipe_storage()?;
            return Ok(None);
        }

        let session = Session { token, user };
        self.set_state(AuthState::Authenticated(session.clone()))?;

        Ok(Some(session))
    }

    pub fn state(&self) -> AuthState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(_) => AuthState::Anonymous,
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        match self.state() {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.current_session().map(|session| session.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    /// Returns the session in force before the attempt.
    pub fn begin_authentication(&self) -> Result<Option<Session>, Error> {
        let previous = self.current_session();
        self.set_state(AuthState::Authenticating)?;
        Ok(previous)
    }

    /// A failed attempt puts the previous session back. Storage was never
    /// touched, so memory and storage agree again.
    pub fn abort_authentication(&self, previous: Option<Session>) -> Result<(), Error> {
        match previous {
            Some(session) => self.set_state(AuthState::Authenticated(session)),
            None => self.set_state(AuthState::Anonymous),
        }
    }

    pub fn establish(&self, session: Session) -> Result<(), Error> {
        self.storage.set(TOKEN_KEY, &session.token)?;
        self.storage
            .set(USER_KEY, &serde_json::to_string(&session.user)?)?;
        self.set_state(AuthState::Authenticated(session))?;
        self.events.send_replace(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Local logout. Always leaves the store anonymous.
    pub fn clear(&self) -> Result<(), Error> {
        let state = self.set_state(AuthState::Anonymous);
        let storage = self.wipe_storage();
        self.events.send_replace(SessionEvent::LoggedOut);
        state.and(storage)
    }

    /// Teardown after a 401. Storage failures are logged, never returned,
    /// so the caller can always surface the 401 itself.
    pub fn invalidate(&self) {
        if let Err(e) = self.set_state(AuthState::Anonymous) {
            warn!("Session state reset failed: {}", e);
        }
        if let Err(e) = self.wipe_storage() {
            warn!("Session storage cleanup failed: {}", e);
        }
        self.events.send_replace(SessionEvent::Expired);
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn last_event(&self) -> SessionEvent {
        *self.events.borrow()
    }

    fn set_state(&self, next: AuthState) -> Result<(), Error> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| Error::LockError(e.to_string()))?;
        *state = next;
        Ok(())
    }

    fn wipe_storage(&self) -> Result<(), Error> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        Ok(())
    }
}
