use serde::{Deserialize, Serialize};

use super::{RawAmount, RawId};

#[derive(Debug, Deserialize, Clone)]
pub struct ApiApplication {
    pub application_id: Option<RawId>,
    pub id: Option<RawId>,
    pub bank_id: Option<RawId>,
    pub type_code: Option<String>,
    pub r#type: Option<String>,
    pub requested_amount: Option<RawAmount>,
    pub amount: Option<RawAmount>,
    pub status_code: Option<String>,
    pub status: Option<String>,
    pub purpose: Option<String>,
    pub term_months: Option<i64>,
    pub submitted_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewApplicationRequest {
    pub bank_id: i64,
    pub type_code: String,
    pub requested_amount: String,
}
