use std::{
    env::VarError,
    io::Error as IO_ERROR,
    num::{ParseFloatError, ParseIntError},
};

use bigdecimal::ParseBigDecimalError as BIG_DECIMAL_ERROR;
use jsonwebtoken::errors::Error as JWT_ERROR;
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    FLOAT(#[from] ParseFloatError),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    BigDecimalError(#[from] BIG_DECIMAL_ERROR),

    #[error("Field not exists: {0}")]
    FieldNotExist(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("{0}")]
    JWT(#[from] JWT_ERROR),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Invalid option {option}")]
    InvalidOption { option: String },

    #[error("Session expired")]
    Unauthorized(),

    #[error("Api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unavailable(String),
}

impl Error {
    /// Transport-level failure or a server-side 5xx, as opposed to the
    /// backend rejecting the request itself.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Error::ReqwestError(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Error::Api { status, .. } => *status >= 500,
            Error::Unavailable(_) => true,
            _ => false,
        }
    }

    /// Message shown to the user next to the form that caused it.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Error::Validation(message) => Some(message.to_owned()),
            Error::Api { message, .. } if !message.is_empty() => {
                Some(message.to_owned())
            },
            _ => None,
        }
    }
}
