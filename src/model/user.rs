use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::Error, helpers::formatter::parse_timestamp, types::ApiUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    BankRiskManager,
    BankAnalyst,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Role::Client => "client",
            Role::BankRiskManager => "bank_risk_manager",
            Role::BankAnalyst => "bank_analyst",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "bank_risk_manager" => Ok(Role::BankRiskManager),
            "bank_analyst" => Ok(Role::BankAnalyst),
            _ => Err(Error::InvalidOption {
                option: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// `user_id` wins over `id`; a user without either is rejected.
    pub fn decode(raw: ApiUser) -> Result<User, Error> {
        let user_id = raw
            .user_id
            .or(raw.id)
            .map(|id| id.to_string())
            .ok_or_else(|| Error::FieldNotExist(String::from("user_id")))?;

        let email = raw.email.unwrap_or_default();
        let full_name = match raw.full_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => display_name_from_email(&email),
        };

        let role = match raw.role.as_deref() {
            Some(role) => role.parse().unwrap_or_else(|_| {
                warn!("Unknown role {}, treating as client", role);
                Role::Client
            }),
            None => Role::Client,
        };

        Ok(User {
            user_id,
            email,
            full_name,
            phone: raw.phone.filter(|p| !p.is_empty()),
            role,
            created_at: parse_timestamp(raw.created_at.as_deref()),
        })
    }
}

/// Local part of an address, used when the backend sends no name.
pub fn display_name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}
