//! New-application form.
//!
//! Holds the local form state (template, selected banks with their shares,
//! requested amount, per-bank overrides), validates before anything goes
//! out, submits one application per bank and keeps the history list next
//! to the form fresh.

use std::collections::HashMap;

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use super::{banks::fetch_banks, Page, PageState};
use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::{
        amount::{clamp_non_negative, parse_amount, to_f64, to_plain_string},
        chart::payoff_percent,
        formatter::format_currency,
        share::ShareAllocation,
    },
    model::{
        build_history, decode_positional, find_template, static_catalog, Application,
        ApplicationTemplate, Bank, HistoryEntry, TEMPLATES,
    },
    types::NewApplicationRequest,
};

pub const NO_BANK_SELECTED: &str = "Выберите банк для отправки заявки.";
pub const INVALID_AMOUNT: &str = "Введите корректную сумму заявки.";
pub const SUBMIT_SUCCESS: &str = "Заявка успешно отправлена. Мы уведомим вас о статусе.";
pub const SUBMIT_FAILED: &str = "Не удалось отправить заявку. Попробуйте снова позже.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl FormMessage {
    fn success(text: &str) -> Self {
        FormMessage {
            kind: MessageKind::Success,
            text: text.to_owned(),
        }
    }

    fn error(text: String) -> Self {
        FormMessage {
            kind: MessageKind::Error,
            text,
        }
    }
}

/// `degraded` is set when the list could not be fetched and is shown empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History {
    pub entries: Vec<HistoryEntry>,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankRow {
    pub bank: Bank,
    pub selected: bool,
    pub share: Option<u32>,
    pub amount: Option<String>,
    pub limit_progress: u32,
}

#[derive(Debug)]
pub struct NewApplicationForm {
    state: AppState<State>,
    template: &'static ApplicationTemplate,
    banks: Vec<Bank>,
    allocation: ShareAllocation,
    amount: BigDecimal,
    overrides: HashMap<i64, String>,
    message: Option<FormMessage>,
    pub history: Page<History>,
}

impl NewApplicationForm {
    pub fn new(state: AppState<State>) -> Self {
        NewApplicationForm {
            state,
            template: &TEMPLATES[0],
            banks: static_catalog(),
            allocation: ShareAllocation::new(),
            amount: BigDecimal::zero(),
            overrides: HashMap::new(),
            message: None,
            history: Page::new(),
        }
    }

    pub async fn load(&mut self) -> Result<(), Error> {
        self.banks = fetch_banks(&self.state).await?;
        self.refresh_history().await?;
        Ok(())
    }

    /// Failure leaves an empty, degraded list rather than an error state.
    pub async fn refresh_history(&self) -> Result<PageState<History>, Error> {
        let ticket = self.history.begin();
        let session = self.state.require_session()?;

        let history = match self
            .state
            .api
            .get_applications(&session.user.user_id)
            .await
        {
            Ok(raw) => History {
                entries: build_history(
                    decode_positional(raw, Application::decode),
                    &self.banks,
                    self.state.config.history_limit,
                ),
                degraded: false,
            },
            Err(Error::Unauthorized()) => {
                self.history.apply(
                    ticket,
                    PageState::Failed(Error::Unauthorized().to_string()),
                );
                return Err(Error::Unauthorized());
            },
            Err(e) => {
                warn!("Application history unavailable: {}", e);
                History {
                    entries: vec![],
                    degraded: true,
                }
            },
        };

        self.history.apply(ticket, PageState::Ready(history));
        Ok(self.history.state())
    }

    pub fn templates(&self) -> &'static [ApplicationTemplate] {
        &TEMPLATES
    }

    pub fn template(&self) -> &'static ApplicationTemplate {
        self.template
    }

    pub fn select_template(&mut self, code: &str) -> Result<(), Error> {
        self.template = find_template(code).ok_or_else(|| Error::InvalidOption {
            option: code.to_owned(),
        })?;
        Ok(())
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn allocation(&self) -> &ShareAllocation {
        &self.allocation
    }

    pub fn select_bank(&mut self, bank_id: i64) -> Result<(), Error> {
        if !self.banks.iter().any(|bank| bank.id == bank_id) {
            return Err(Error::InvalidOption {
                option: bank_id.to_string(),
            });
        }
        self.allocation.add(bank_id);
        Ok(())
    }

    pub fn deselect_bank(&mut self, bank_id: i64) -> bool {
        self.overrides.remove(&bank_id);
        self.allocation.remove(bank_id)
    }

    pub fn toggle_bank(&mut self, bank_id: i64) -> Result<bool, Error> {
        if self.allocation.contains(bank_id) {
            self.deselect_bank(bank_id);
            return Ok(false);
        }
        self.select_bank(bank_id)?;
        Ok(true)
    }

    pub fn set_share(&mut self, bank_id: i64, share: u32) -> bool {
        self.allocation.set_share(bank_id, share)
    }

    /// Rebuilds every share from `weights` in one step, so no earlier
    /// edit rescales a later one. Selected banks left out weigh zero.
    pub fn set_shares(&mut self, weights: &[(i64, u32)]) {
        let weights: Vec<(i64, f64)> = self
            .allocation
            .bank_ids()
            .into_iter()
            .map(|bank_id| {
                let weight = weights
                    .iter()
                    .find(|(id, _)| *id == bank_id)
                    .map_or(0.0, |(_, weight)| f64::from(*weight));
                (bank_id, weight)
            })
            .collect();

        self.allocation = ShareAllocation::from_weights(&weights);
    }

    pub fn distribute_evenly(&mut self) {
        self.allocation.redistribute_evenly();
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    /// Clamped to `[0, MAX_LOAN_AMOUNT]`.
    pub fn set_amount(&mut self, amount: BigDecimal) {
        let max = &self.state.config.max_loan_amount;
        let amount = clamp_non_negative(amount);
        self.amount = if amount > *max { max.clone() } else { amount };
    }

    pub fn set_amount_text(&mut self, text: &str) {
        self.set_amount(parse_amount(text).unwrap_or_else(BigDecimal::zero));
    }

    /// Free-text amount for one bank; empty text drops the override.
    pub fn set_bank_amount(&mut self, bank_id: i64, text: &str) {
        if text.trim().is_empty() {
            self.overrides.remove(&bank_id);
        } else {
            self.overrides.insert(bank_id, text.to_owned());
        }
    }

    fn override_amount(&self, bank_id: i64) -> Option<BigDecimal> {
        let max = &self.state.config.max_loan_amount;
        self.overrides
            .get(&bank_id)
            .and_then(|text| parse_amount(text))
            .map(clamp_non_negative)
            .map(|amount| if amount > *max { max.clone() } else { amount })
    }

    /// Amount per selected bank. A single bank with its own amount uses
    /// that; otherwise the requested amount is split by share.
    pub fn bank_amounts(&self) -> Vec<(i64, BigDecimal)> {
        if let [only] = self.allocation.entries() {
            if let Some(amount) = self.override_amount(only.bank_id) {
                return vec![(only.bank_id, amount)];
            }
        }

        self.allocation.split_amount(&self.amount)
    }

    pub fn limit_progress(&self, amount: &BigDecimal) -> u32 {
        payoff_percent(to_f64(amount), to_f64(&self.state.config.max_loan_amount))
    }

    pub fn rows(&self) -> Vec<BankRow> {
        let amounts: HashMap<i64, BigDecimal> = self.bank_amounts().into_iter().collect();

        self.banks
            .iter()
            .map(|bank| {
                let amount = amounts.get(&bank.id);
                BankRow {
                    bank: bank.clone(),
                    selected: self.allocation.contains(bank.id),
                    share: self.allocation.share_of(bank.id),
                    amount: amount.map(format_currency),
                    limit_progress: amount.map(|a| self.limit_progress(a)).unwrap_or(0),
                }
            })
            .collect()
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    /// One request per bank with a non-zero amount.
    pub fn validate(&self) -> Result<Vec<NewApplicationRequest>, Error> {
        if self.allocation.is_empty() {
            return Err(Error::Validation(String::from(NO_BANK_SELECTED)));
        }

        let requests: Vec<NewApplicationRequest> = self
            .bank_amounts()
            .into_iter()
            .map(|(bank_id, amount)| (bank_id, amount.with_scale_round(2, RoundingMode::HalfUp)))
            .filter(|(_, amount)| *amount > BigDecimal::zero())
            .map(|(bank_id, amount)| NewApplicationRequest {
                bank_id,
                type_code: self.template.code.to_owned(),
                requested_amount: to_plain_string(&amount),
            })
            .collect();

        if requests.is_empty() {
            return Err(Error::Validation(String::from(INVALID_AMOUNT)));
        }

        Ok(requests)
    }

    /// Validates, posts every request and refreshes the history when at
    /// least one went through. The outcome is also kept as the form
    /// message.
    pub async fn submit(&mut self) -> Result<Vec<Application>, Error> {
        self.message = None;

        let requests = match self.validate() {
            Ok(requests) => requests,
            Err(e) => {
                self.message = e.user_message().map(FormMessage::error);
                return Err(e);
            },
        };

        let api = &self.state.api;
        let results = join_all(requests.iter().map(|request| api.create_application(request))).await;

        let mut created = vec![];
        let mut accepted = 0;
        let mut failure = None;

        for (position, result) in results.into_iter().enumerate() {
            match result {
                Ok(raw) => {
                    accepted += 1;
                    if let Some(raw) = raw {
                        created.push(Application::decode(raw, position));
                    }
                },
                Err(e) => {
                    warn!("Application submit failed: {}", e);
                    failure.get_or_insert(e);
                },
            }
        }

        if accepted > 0 {
            info!("{} of {} applications accepted", accepted, requests.len());
            match self.refresh_history().await {
                Err(Error::Unauthorized()) => return Err(Error::Unauthorized()),
                Err(e) => warn!("History refresh failed: {}", e),
                Ok(_) => {},
            }
        }

        match failure {
            Some(e) => {
                let text = e
                    .user_message()
                    .unwrap_or_else(|| String::from(SUBMIT_FAILED));
                self.message = Some(FormMessage::error(text));
                Err(e)
            },
            None => {
                self.message = Some(FormMessage::success(SUBMIT_SUCCESS));
                Ok(created)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{str::FromStr, sync::Arc};

    use url::Url;

    use super::*;
    use crate::{configuration::Config, provider::MemoryStorage};

    fn form() -> NewApplicationForm {
        let config = Config::new(Url::parse("http://127.0.0.1:9/api/v1").unwrap());
        let state = State::with_storage(config, Arc::new(MemoryStorage::new())).unwrap();
        NewApplicationForm::new(AppState::new(state))
    }

    #[test]
    fn test_validation_messages() {
        let mut form = form();
        form.set_amount_text("150 000");

        let error = form.validate().unwrap_err();
        assert_eq!(error.user_message().as_deref(), Some(NO_BANK_SELECTED));

        form.select_bank(2).unwrap();
        form.set_amount_text("-5");
        let error = form.validate().unwrap_err();
        assert_eq!(error.user_message().as_deref(), Some(INVALID_AMOUNT));
    }

    #[test]
    fn test_single_bank_request() {
        let mut form = form();
        form.select_template("personal").unwrap();
        form.select_bank(2).unwrap();
        form.set_amount_text("150000");

        let requests = form.validate().unwrap();
        assert_eq!(
            requests,
            vec![NewApplicationRequest {
                bank_id: 2,
                type_code: String::from("PERSONAL"),
                requested_amount: String::from("150000"),
            }]
        );
    }

    #[test]
    fn test_amount_is_clamped() {
        let mut form = form();
        form.set_amount_text("5 000 000");
        assert_eq!(form.amount(), &BigDecimal::from(1_000_000));
        form.set_amount(BigDecimal::from(-1));
        assert_eq!(form.amount(), &BigDecimal::from(0));
    }

    #[test]
    fn test_multi_bank_split_skips_zero_shares() {
        let mut form = form();
        form.set_amount(BigDecimal::from(100_000));
        form.select_bank(1).unwrap();
        form.select_bank(3).unwrap();
        form.select_bank(4).unwrap();

        // 3 and 4 joined with zero shares.
        let requests = form.validate().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].requested_amount, "100000");

        form.set_share(1, 50);
        let requests = form.validate().unwrap();
        let amounts: Vec<&str> = requests.iter().map(|r| r.requested_amount.as_str()).collect();
        assert_eq!(amounts, vec!["50000", "25000", "25000"]);

        form.distribute_evenly();
        let total: BigDecimal = form
            .validate()
            .unwrap()
            .iter()
            .map(|r| BigDecimal::from_str(&r.requested_amount).unwrap())
            .sum();
        assert_eq!(total, BigDecimal::from(100_000));
    }

    #[test]
    fn test_set_shares_keeps_exact_split() {
        let mut form = form();
        form.set_amount(BigDecimal::from(100_000));
        for bank_id in [1, 2, 3] {
            form.select_bank(bank_id).unwrap();
        }

        form.set_shares(&[(1, 50), (2, 30), (3, 20)]);
        assert_eq!(
            form.bank_amounts(),
            vec![
                (1, BigDecimal::from(50_000)),
                (2, BigDecimal::from(30_000)),
                (3, BigDecimal::from(20_000)),
            ]
        );

        form.set_shares(&[(2, 1), (9, 5)]);
        let shares: Vec<u32> = form.allocation().entries().iter().map(|e| e.share).collect();
        assert_eq!(shares, vec![0, 100, 0]);
    }

    #[test]
    fn test_single_bank_override_wins() {
        let mut form = form();
        form.set_amount(BigDecimal::from(100_000));
        form.select_bank(5).unwrap();
        form.set_bank_amount(5, "42 000");

        assert_eq!(form.bank_amounts(), vec![(5, BigDecimal::from(42_000))]);
        let row = form.rows().into_iter().find(|row| row.bank.id == 5).unwrap();
        assert!(row.selected);
        assert_eq!(row.amount.as_deref(), Some("42 000 ₽"));
        assert_eq!(row.limit_progress, 4);

        form.select_bank(1).unwrap();
        assert_eq!(form.bank_amounts()[0].1, BigDecimal::from(100_000));
    }

    #[test]
    fn test_unknown_bank_and_template() {
        let mut form = form();
        assert!(form.select_bank(77).is_err());
        assert!(form.select_template("crypto").is_err());
        assert_eq!(form.template().code, "PERSONAL");
        assert!(form.toggle_bank(2).unwrap());
        assert!(!form.toggle_bank(2).unwrap());
        assert!(form.allocation().is_empty());
    }
}
