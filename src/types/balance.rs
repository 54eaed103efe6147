use serde::Deserialize;

use super::{RawAmount, RawId};

#[derive(Debug, Deserialize, Default)]
pub struct ApiBalance {
    pub total_balance: Option<RawAmount>,
    pub currency: Option<String>,
    #[serde(default)]
    pub by_bank: Vec<ApiBankBalance>,
    pub total_debt: Option<RawAmount>,
    pub credit_rating: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
pub struct ApiBankBalance {
    pub bank_id: Option<RawId>,
    pub balance: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAccount {
    pub account_id: Option<RawId>,
    pub bank_id: Option<RawId>,
    pub balance: Option<RawAmount>,
    pub currency: Option<String>,
    pub created_at: Option<String>,
}
