use serde::Deserialize;

use super::{RawAmount, RawId};

#[derive(Debug, Deserialize, Default)]
pub struct ApiDebt {
    pub total_debt: Option<RawAmount>,
    #[serde(default)]
    pub by_loan: Vec<ApiLoanDebt>,
}

#[derive(Debug, Deserialize)]
pub struct ApiLoanDebt {
    pub loan_id: Option<RawId>,
    pub outstanding: Option<RawAmount>,
}
