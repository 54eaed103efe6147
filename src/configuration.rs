use std::{
    env, fmt, fs,
    ops::Deref,
    path::PathBuf,
    str::FromStr,
    sync::Arc,
};

use bigdecimal::BigDecimal;
use tracing::warn;
use url::Url;

use crate::{
    error::Error,
    helpers::chart::{DonutGeometry, DEFAULT_GAP_DEGREES},
    model::{DashboardOptions, Session},
    provider::{
        Api, AuthContext, FileStorage, KeyValueStorage, Provider, SessionStore,
        HTTP,
    },
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

/// Everything a page container needs, handed over explicitly.
#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub api: Api,
    pub auth: AuthContext,
    pub session: Arc<SessionStore>,
}

impl State {
    pub fn new(config: Config) -> Result<State, Error> {
        let storage: Arc<dyn KeyValueStorage> =
            Arc::new(FileStorage::new(&config.session_storage_path));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(
        config: Config,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Result<State, Error> {
        let session = Arc::new(SessionStore::new(storage));

        if let Err(e) = session.rehydrate() {
            warn!("Could not restore session: {}", e);
        }

        let http = HTTP::new(config.clone(), session.clone())?;
        let api = Api::new(http);
        let provider = Provider::new(
            config.session_mode,
            api.clone(),
            &config.demo_token_secret,
        );
        let auth = AuthContext::new(session.clone(), provider);

        Ok(Self {
            config,
            api,
            auth,
            session,
        })
    }

    pub fn require_session(&self) -> Result<Session, Error> {
        self.session.current_session().ok_or(Error::Unauthorized())
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            transactions_limit: self.config.transactions_limit,
            geometry: DonutGeometry {
                gap_degrees: self.config.chart_gap_degrees,
                ..DonutGeometry::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Backend,
    Demo,
    Fallback,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SessionMode::Backend => "backend",
            SessionMode::Demo => "demo",
            SessionMode::Fallback => "fallback",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for SessionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backend" => Ok(SessionMode::Backend),
            "demo" => Ok(SessionMode::Demo),
            "fallback" => Ok(SessionMode::Fallback),
            _ => Err(Error::InvalidOption {
                option: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: Url,
    pub timeout: u64,
    pub session_mode: SessionMode,
    pub session_storage_path: PathBuf,
    pub demo_token_secret: String,
    pub transactions_limit: usize,
    pub history_limit: usize,
    pub max_loan_amount: BigDecimal,
    pub chart_gap_degrees: f64,
}

impl Config {
    /// Shipped defaults around a given backend.
    pub fn new(api_base_url: Url) -> Config {
        Config {
            api_base_url,
            timeout: 15,
            session_mode: SessionMode::Fallback,
            session_storage_path: PathBuf::from(".easyfund-session.json"),
            demo_token_secret: String::from("easyfund-demo"),
            transactions_limit: 10,
            history_limit: 8,
            max_loan_amount: BigDecimal::from(1_000_000),
            chart_gap_degrees: DEFAULT_GAP_DEGREES,
        }
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let api_base_url = Url::parse(&env::var("API_BASE_URL")?)?;
    let timeout = env::var("TIMEOUT")?.parse()?;
    let session_mode = env::var("SESSION_MODE")?.parse()?;
    let session_storage_path = PathBuf::from(env::var("SESSION_STORAGE_PATH")?);
    let demo_token_secret = env::var("DEMO_TOKEN_SECRET")?;
    let transactions_limit = env::var("TRANSACTIONS_LIMIT")?.parse()?;
    let history_limit = env::var("HISTORY_LIMIT")?.parse()?;
    let max_loan_amount = BigDecimal::from_str(&env::var("MAX_LOAN_AMOUNT")?)?;
    let chart_gap_degrees: f64 = env::var("CHART_GAP_DEGREES")?.parse()?;

    if !(0.0..360.0).contains(&chart_gap_degrees) {
        return Err(Error::ConfigurationError(format!(
            "CHART_GAP_DEGREES out of range: {}",
            chart_gap_degrees
        )));
    }

    let config = Config {
        api_base_url,
        timeout,
        session_mode,
        session_storage_path,
        demo_token_secret,
        transactions_limit,
        history_limit,
        max_loan_amount,
        chart_gap_degrees,
    };

    Ok(config)
}

/// Loads `.env` (optional) and `easyfund.conf` from the crate directory.
/// Variables already present in the environment are left alone, and
/// `.env` is read first so it overrides the shipped file.
pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";
    let app_config_file: &str = "easyfund.conf";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);
    let app_config_path = format!("{}/{}", directory, app_config_file);

    if let Ok(config_string) = fs::read_to_string(path) {
        parse_config_string(&config_string);
    }

    let app_config_string = fs::read_to_string(app_config_path)?;
    parse_config_string(&app_config_string);

    Ok(())
}

fn parse_config_string(config: &str) {
    for (key, value) in parse_pairs(config) {
        if env::var_os(key).is_none() {
            env::set_var(key, value);
        }
    }
}

fn parse_pairs(config: &str) -> Vec<(&str, &str)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
