pub use self::{
    api::Api,
    http::HTTP,
    session::{
        is_token_expired, token_expiry, AuthState, SessionEvent, SessionStore,
        TOKEN_KEY, USER_KEY,
    },
    session_provider::{
        validate_login, validate_registration, AuthContext, BackendSessionProvider,
        DemoClaims, DemoSessionProvider, Provider, SessionProvider,
    },
    storage::{FileStorage, KeyValueStorage, MemoryStorage},
};

mod api;
mod http;
mod session;
mod session_provider;
mod storage;
