use serde::Deserialize;

use super::{RawAmount, RawId};

#[derive(Debug, Deserialize, Clone)]
pub struct ApiLoan {
    pub loan_id: Option<RawId>,
    pub id: Option<RawId>,
    pub bank_id: Option<RawId>,
    pub original_amount: Option<RawAmount>,
    pub amount: Option<RawAmount>,
    pub remaining_balance: Option<RawAmount>,
    pub outstanding: Option<RawAmount>,
    pub interest_rate: Option<RawAmount>,
    pub rate: Option<RawAmount>,
    pub months: Option<i64>,
    pub term_months: Option<i64>,
    pub status: Option<String>,
    pub purpose: Option<String>,
    pub taken_at: Option<String>,
    pub created_at: Option<String>,
}
