use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    helpers::{
        amount::{first_present, normalize_amount},
        formatter::parse_timestamp,
        status::{map_status, normalize_status_code, StatusMeta},
    },
    types::ApiLoan,
};

pub const DEFAULT_LOAN_STATUS: &str = "ACTIVE";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loan {
    pub id: String,
    pub bank_id: Option<i64>,
    pub original_amount: BigDecimal,
    /// `None` when the backend reports no remaining balance at all, which
    /// is different from a fully repaid loan.
    pub remaining_balance: Option<BigDecimal>,
    pub interest_rate: Option<BigDecimal>,
    pub term_months: Option<i64>,
    pub status_code: String,
    pub status: StatusMeta,
    pub purpose: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// Field precedence: `loan_id` over `id` over the loan's `position`
    /// in its list, `original_amount` over `amount`, `remaining_balance`
    /// over `outstanding`, `interest_rate` over `rate`, `term_months` over
    /// `months`, `taken_at` over `created_at`.
    pub fn decode(raw: ApiLoan, position: usize) -> Loan {
        let id = raw
            .loan_id
            .or(raw.id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| position.to_string());

        let original_amount = normalize_amount(first_present(&[
            raw.original_amount.as_ref(),
            raw.amount.as_ref(),
        ]));

        let remaining = first_present(&[
            raw.remaining_balance.as_ref(),
            raw.outstanding.as_ref(),
        ]);
        let remaining_balance = remaining.map(|value| normalize_amount(Some(value)));

        let interest_rate = first_present(&[raw.interest_rate.as_ref(), raw.rate.as_ref()])
            .map(|value| normalize_amount(Some(value)));

        let status_code = raw
            .status
            .filter(|code| !code.trim().is_empty())
            .map(|code| normalize_status_code(&code))
            .unwrap_or_else(|| String::from(DEFAULT_LOAN_STATUS));

        Loan {
            id,
            bank_id: raw.bank_id.and_then(|id| id.as_i64()),
            original_amount,
            remaining_balance,
            interest_rate,
            term_months: raw.term_months.or(raw.months),
            status: map_status(&status_code),
            status_code,
            purpose: raw.purpose.filter(|p| !p.trim().is_empty()),
            taken_at: parse_timestamp(raw.taken_at.as_deref().or(raw.created_at.as_deref())),
        }
    }

    /// What is still owed: the remaining balance, or the original amount
    /// when no remaining balance is reported.
    pub fn outstanding(&self) -> BigDecimal {
        self.remaining_balance
            .clone()
            .unwrap_or_else(|| self.original_amount.clone())
    }

    pub fn is_active(&self) -> bool {
        self.status_code == DEFAULT_LOAN_STATUS
    }
}
