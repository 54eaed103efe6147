use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Api, SessionStore};
use crate::{
    configuration::SessionMode,
    error::Error,
    model::{display_name_from_email, Role, Session, User},
    types::RegisterRequest,
};

pub const DEMO_ADMIN_EMAIL: &str = "admin@easyfund.com";
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";
pub const DEMO_ISSUER: &str = "easyfund-demo";
pub const DEMO_USER_ID: &str = "1";
pub const DEMO_TOKEN_HOURS: i64 = 24;
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    async fn login(&self, email: &str, password: &str) -> Result<Session, Error>;
    async fn register(&self, request: &RegisterRequest) -> Result<Session, Error>;
    async fn logout(&self) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct BackendSessionProvider {
    api: Api,
}

impl BackendSessionProvider {
    pub fn new(api: Api) -> Self {
        BackendSessionProvider { api }
    }
}

impl SessionProvider for BackendSessionProvider {
    async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        let response = self.api.login(email, password).await?;
        let user = User::decode(response.user)?;

        Ok(Session {
            token: response.token,
            user,
        })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Session, Error> {
        self.api.register(request).await?;
        self.login(&request.email, &request.password).await
    }

    async fn logout(&self) -> Result<(), Error> {
        self.api.logout().await
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DemoClaims {
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Local stand-in for the backend: every login succeeds with a synthesized
/// user and a locally signed token.
#[derive(Debug, Clone)]
pub struct DemoSessionProvider {
    secret: String,
}

impl DemoSessionProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        DemoSessionProvider {
            secret: secret.into(),
        }
    }

    fn session(&self, user: User) -> Result<Session, Error> {
        let now = Utc::now();
        let claims = DemoClaims {
            user_id: user.user_id.to_owned(),
            email: user.email.to_owned(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(DEMO_TOKEN_HOURS)).timestamp(),
            iss: String::from(DEMO_ISSUER),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(Session { token, user })
    }
}

impl SessionProvider for DemoSessionProvider {
    async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        let email = email.trim();
        let (full_name, role) = if email == DEMO_ADMIN_EMAIL && password == DEMO_ADMIN_PASSWORD {
            (String::from("Admin User"), Role::BankRiskManager)
        } else {
            (display_name_from_email(email), Role::Client)
        };

        self.session(User {
            user_id: String::from(DEMO_USER_ID),
            email: email.to_owned(),
            full_name,
            phone: None,
            role,
            created_at: Some(Utc::now()),
        })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Session, Error> {
        self.session(User {
            user_id: String::from(DEMO_USER_ID),
            email: request.email.trim().to_owned(),
            full_name: request.full_name.trim().to_owned(),
            phone: Some(request.phone.to_owned()).filter(|p| !p.is_empty()),
            role: Role::Client,
            created_at: Some(Utc::now()),
        })
    }

    async fn logout(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Strategy picked by `SESSION_MODE`.
#[derive(Debug, Clone)]
pub enum Provider {
    Backend(BackendSessionProvider),
    Demo(DemoSessionProvider),
    /// Backend first, demo only when the backend is unreachable or failing.
    Fallback {
        backend: BackendSessionProvider,
        demo: DemoSessionProvider,
    },
}

impl Provider {
    pub fn new(mode: SessionMode, api: Api, secret: &str) -> Self {
        match mode {
            SessionMode::Backend => Provider::Backend(BackendSessionProvider::new(api)),
            SessionMode::Demo => Provider::Demo(DemoSessionProvider::new(secret)),
            SessionMode::Fallback => Provider::Fallback {
                backend: BackendSessionProvider::new(api),
                demo: DemoSessionProvider::new(secret),
            },
        }
    }
}

impl SessionProvider for Provider {
    async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        match self {
            Provider::Backend(backend) => backend.login(email, password).await,
            Provider::Demo(demo) => demo.login(email, password).await,
            Provider::Fallback { backend, demo } => {
                match backend.login(email, password).await {
                    Err(e) if e.is_unavailable() => {
                        warn!("Backend login unavailable ({}), using demo session", e);
                        demo.login(email, password).await
                    },
                    result => result,
                }
            },
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Session, Error> {
        match self {
            Provider::Backend(backend) => backend.register(request).await,
            Provider::Demo(demo) => demo.register(request).await,
            Provider::Fallback { backend, demo } => match backend.register(request).await {
                Err(e) if e.is_unavailable() => {
                    warn!("Backend registration unavailable ({}), using demo session", e);
                    demo.register(request).await
                },
                result => result,
            },
        }
    }

    async fn logout(&self) -> Result<(), Error> {
        match self {
            Provider::Backend(backend) => backend.logout().await,
            Provider::Demo(demo) => demo.logout().await,
            Provider::Fallback { backend, .. } => backend.logout().await,
        }
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<(), Error> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(Error::Validation(String::from("Введите корректный email.")));
    }
    if password.is_empty() {
        return Err(Error::Validation(String::from("Введите пароль.")));
    }
    Ok(())
}

pub fn validate_registration(request: &RegisterRequest) -> Result<(), Error> {
    if request.full_name.trim().is_empty() {
        return Err(Error::Validation(String::from("Введите имя и фамилию.")));
    }
    validate_login(&request.email, &request.password)?;
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::Validation(format!(
            "Пароль должен содержать не менее {} символов.",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// The one place session state changes: login, registration and logout
/// go through here.
#[derive(Debug, Clone)]
pub struct AuthContext {
    store: Arc<SessionStore>,
    provider: Provider,
}

impl AuthContext {
    pub fn new(store: Arc<SessionStore>, provider: Provider) -> Self {
        AuthContext { store, provider }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn current_session(&self) -> Option<Session> {
        self.store.current_session()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        validate_login(email, password)?;
        let previous = self.store.begin_authentication()?;

        match self.provider.login(email.trim(), password).await {
            Ok(session) => {
                self.store.establish(session.clone())?;
                info!("Logged in as {}", session.user.email);
                Ok(session)
            },
            Err(e) => {
                self.store.abort_authentication(previous)?;
                Err(e)
            },
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, Error> {
        validate_registration(request)?;
        let previous = self.store.begin_authentication()?;

        match self.provider.register(request).await {
            Ok(session) => {
                self.store.establish(session.clone())?;
                info!("Registered {}", session.user.email);
                Ok(session)
            },
            Err(e) => {
                self.store.abort_authentication(previous)?;
                Err(e)
            },
        }
    }

    /// Local state is cleared even when the backend call fails.
    pub async fn logout(&self) -> Result<(), Error> {
        if self.store.is_authenticated() {
            if let Err(e) = self.provider.logout().await {
                warn!("Backend logout failed: {}", e);
            }
        }

        self.store.clear()
    }
}
