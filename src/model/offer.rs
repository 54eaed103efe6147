use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Application, Loan};
use crate::helpers::{
    amount::to_plain_string,
    formatter::{format_currency, format_date},
    status::{normalize_status_code, StatusMeta},
};

pub const ALL_STATUSES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferKind {
    Loan,
    Application,
}

/// One row of the applications page: a loan or an application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditOffer {
    pub id: String,
    pub kind: OfferKind,
    pub name: String,
    pub amount: BigDecimal,
    pub amount_text: String,
    pub formatted_amount: String,
    pub interest_rate: Option<String>,
    pub term_months: Option<i64>,
    pub status_code: String,
    pub status: StatusMeta,
    pub purpose: String,
    pub bank_id: Option<i64>,
    pub date: String,
    #[serde(skip)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&Loan> for CreditOffer {
    fn from(loan: &Loan) -> Self {
        CreditOffer {
            id: loan.id.to_owned(),
            kind: OfferKind::Loan,
            name: format!("Кредит #{}", loan.id),
            amount_text: to_plain_string(&loan.original_amount),
            formatted_amount: format_currency(&loan.original_amount),
            amount: loan.original_amount.clone(),
            interest_rate: loan.interest_rate.as_ref().map(to_plain_string),
            term_months: loan.term_months,
            status_code: loan.status_code.to_owned(),
            status: loan.status.clone(),
            purpose: loan
                .purpose
                .clone()
                .unwrap_or_else(|| String::from("Кредит")),
            bank_id: loan.bank_id,
            date: format_date(loan.taken_at.as_ref()),
            timestamp: loan.taken_at,
        }
    }
}

impl From<&Application> for CreditOffer {
    fn from(application: &Application) -> Self {
        CreditOffer {
            id: application.id.to_owned(),
            kind: OfferKind::Application,
            name: format!("Заявка #{}", application.id),
            amount_text: to_plain_string(&application.amount),
            formatted_amount: format_currency(&application.amount),
            amount: application.amount.clone(),
            interest_rate: None,
            term_months: application.term_months,
            status_code: application.status_code.to_owned(),
            status: application.status.clone(),
            purpose: application
                .purpose
                .clone()
                .unwrap_or_else(|| String::from(super::application::GENERIC_TITLE)),
            bank_id: application.bank_id,
            date: format_date(application.submitted_at.as_ref()),
            timestamp: application.submitted_at,
        }
    }
}

impl CreditOffer {
    /// Case-insensitive match on name and purpose; the amount matches on
    /// its plain digits.
    pub fn matches_search(&self, search: &str) -> bool {
        let search = search.trim();
        if search.is_empty() {
            return true;
        }

        let needle = search.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.purpose.to_lowercase().contains(&needle)
            || self.amount_text.contains(search)
    }

    /// `None`, an empty filter and `all` let everything through.
    pub fn matches_status(&self, status: Option<&str>) -> bool {
        match status.map(str::trim) {
            None | Some("") => true,
            Some(value) if value.eq_ignore_ascii_case(ALL_STATUSES) => true,
            Some(value) => normalize_status_code(value) == self.status_code,
        }
    }
}

/// Loans first, then applications, in payload order.
pub fn merge_offers(loans: &[Loan], applications: &[Application]) -> Vec<CreditOffer> {
    loans
        .iter()
        .map(CreditOffer::from)
        .chain(applications.iter().map(CreditOffer::from))
        .collect()
}

pub fn filter_offers(
    offers: &[CreditOffer],
    search: &str,
    status: Option<&str>,
) -> Vec<CreditOffer> {
    offers
        .iter()
        .filter(|offer| offer.matches_search(search) && offer.matches_status(status))
        .cloned()
        .collect()
}
