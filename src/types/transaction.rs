use serde::{Deserialize, Serialize};

use super::{RawAmount, RawId};

#[derive(Debug, Deserialize, Clone)]
pub struct ApiTransaction {
    pub transaction_id: Option<RawId>,
    pub id: Option<RawId>,
    pub bank_id: Option<RawId>,
    pub amount: Option<RawAmount>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: Option<String>,
    pub created_at: Option<String>,
}

/// `/transactions` answers either with the documented envelope or, on
/// older deployments, with a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiTransactionHistory {
    List(Vec<ApiTransaction>),
    Envelope {
        #[serde(default)]
        transactions: Vec<ApiTransaction>,
        total_spent: Option<RawAmount>,
    },
}

impl Default for ApiTransactionHistory {
    fn default() -> Self {
        ApiTransactionHistory::List(vec![])
    }
}

#[derive(Debug, Serialize, Default, Clone)]
pub struct TransactionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip)]
    pub bank_id: Option<i64>,
}
