use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::bank::{bank_name, Bank};
use crate::{
    helpers::{
        amount::{first_present, normalize_amount},
        formatter::{format_currency, format_date, parse_timestamp},
        status::{map_status, normalize_status_code, StatusMeta},
    },
    types::ApiApplication,
};

pub const DEFAULT_TYPE_CODE: &str = "PERSONAL";
pub const DEFAULT_APPLICATION_STATUS: &str = "PENDING";
pub const GENERIC_TITLE: &str = "Заявка на кредит";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplicationTemplate {
    pub code: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub highlight: Option<&'static str>,
}

pub static TEMPLATES: [ApplicationTemplate; 4] = [
    ApplicationTemplate {
        code: "PERSONAL",
        title: "Потребительский кредит",
        description: "Наличные на любые цели без залога и поручителей",
        highlight: Some("Популярно"),
    },
    ApplicationTemplate {
        code: "MORTGAGE",
        title: "Ипотечное кредитование",
        description: "Покупка квартиры или дома на первичном и вторичном рынке",
        highlight: None,
    },
    ApplicationTemplate {
        code: "AUTO",
        title: "Автокредит",
        description: "Новый или подержанный автомобиль в кредит",
        highlight: None,
    },
    ApplicationTemplate {
        code: "OTHER",
        title: "Индивидуальная заявка",
        description: "Условия подбираются под вашу ситуацию",
        highlight: None,
    },
];

pub fn find_template(code: &str) -> Option<&'static ApplicationTemplate> {
    let code = code.trim().to_uppercase();
    TEMPLATES.iter().find(|template| template.code == code)
}

pub fn template_title(code: &str) -> &'static str {
    find_template(code)
        .map(|template| template.title)
        .unwrap_or(GENERIC_TITLE)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: String,
    pub bank_id: Option<i64>,
    pub type_code: String,
    pub amount: BigDecimal,
    pub status_code: String,
    pub status: StatusMeta,
    pub purpose: Option<String>,
    pub term_months: Option<i64>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Field precedence: `application_id` over `id` over the application's
    /// `position` in its list, `type_code` over
    /// `type`, `requested_amount` over `amount`, `status_code` over
    /// `status`, `submitted_at` over `created_at`.
    pub fn decode(raw: ApiApplication, position: usize) -> Application {
        let id = raw
            .application_id
            .or(raw.id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| position.to_string());

        let type_code = raw
            .type_code
            .or(raw.r#type)
            .filter(|code| !code.trim().is_empty())
            .map(|code| code.trim().to_uppercase())
            .unwrap_or_else(|| String::from(DEFAULT_TYPE_CODE));

        let amount = normalize_amount(first_present(&[
            raw.requested_amount.as_ref(),
            raw.amount.as_ref(),
        ]));

        let status_code = raw
            .status_code
            .or(raw.status)
            .filter(|code| !code.trim().is_empty())
            .map(|code| normalize_status_code(&code))
            .unwrap_or_else(|| String::from(DEFAULT_APPLICATION_STATUS));

        let submitted_at = parse_timestamp(
            raw.submitted_at
                .as_deref()
                .or(raw.created_at.as_deref()),
        );

        Application {
            id,
            bank_id: raw.bank_id.and_then(|id| id.as_i64()),
            type_code,
            amount,
            status: map_status(&status_code),
            status_code,
            purpose: raw.purpose.filter(|p| !p.trim().is_empty()),
            term_months: raw.term_months,
            submitted_at,
            updated_at: parse_timestamp(raw.updated_at.as_deref()),
        }
    }

    pub fn title(&self) -> &'static str {
        template_title(&self.type_code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub bank_name: String,
    pub status: StatusMeta,
    pub amount: String,
    pub date: String,
}

impl HistoryEntry {
    pub fn new(application: &Application, banks: &[Bank]) -> Self {
        HistoryEntry {
            id: application.id.to_owned(),
            title: application.title().to_owned(),
            bank_name: bank_name(banks, application.bank_id),
            status: application.status.clone(),
            amount: format_currency(&application.amount),
            date: format_date(application.submitted_at.as_ref()),
        }
    }
}

/// Newest first; entries without a submission time sink to the end.
pub fn build_history(
    mut applications: Vec<Application>,
    banks: &[Bank],
    limit: usize,
) -> Vec<HistoryEntry> {
    applications.sort_by(|a, b| match (&a.submitted_at, &b.submitted_at) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    applications
        .iter()
        .take(limit)
        .map(|application| HistoryEntry::new(application, banks))
        .collect()
}
