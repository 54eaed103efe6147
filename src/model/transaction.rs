use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::{
    error::Error,
    helpers::{
        amount::{normalize_amount, normalize_signed_amount},
        formatter::{format_date, format_signed_currency, parse_timestamp},
    },
    types::{ApiTransaction, ApiTransactionHistory},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: Option<String>,
    pub bank_id: Option<i64>,
    /// Signed: positive is income, negative is spending.
    pub amount: BigDecimal,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub formatted_amount: String,
    pub date: String,
}

impl Transaction {
    pub fn decode(raw: ApiTransaction) -> Result<Transaction, Error> {
        let amount = normalize_signed_amount(raw.amount.as_ref());
        let occurred_at = parse_timestamp(
            raw.occurred_at
                .as_deref()
                .or(raw.created_at.as_deref()),
        );

        Ok(Transaction {
            id: raw.transaction_id.or(raw.id).map(|id| id.to_string()),
            bank_id: raw.bank_id.and_then(|id| id.as_i64()),
            formatted_amount: format_signed_currency(&amount),
            date: format_date(occurred_at.as_ref()),
            amount,
            category: raw.category.filter(|c| !c.is_empty()),
            description: raw.description.filter(|d| !d.is_empty()),
            occurred_at,
        })
    }

    pub fn is_income(&self) -> bool {
        self.amount > BigDecimal::zero()
    }

    /// Magnitude of the entry when it is spending, zero otherwise.
    pub fn spent(&self) -> BigDecimal {
        if self.amount < BigDecimal::zero() {
            self.amount.abs()
        } else {
            BigDecimal::zero()
        }
    }

    /// `YYYY-MM` bucket of the entry.
    pub fn month(&self) -> Option<String> {
        self.occurred_at
            .map(|date| format!("{:04}-{:02}", date.year(), date.month()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    /// Non-negative total of spending.
    pub total_spent: BigDecimal,
}

impl TransactionPage {
    pub fn decode(raw: ApiTransactionHistory) -> TransactionPage {
        let (items, reported_total) = match raw {
            ApiTransactionHistory::List(items) => (items, None),
            ApiTransactionHistory::Envelope {
                transactions,
                total_spent,
            } => (transactions, total_spent),
        };

        let transactions = super::decode_list(items, "transaction", Transaction::decode);

        let total_spent = match reported_total {
            Some(total) => normalize_amount(Some(&total)),
            None => transactions.iter().map(Transaction::spent).sum(),
        };

        TransactionPage {
            transactions,
            total_spent,
        }
    }
}
