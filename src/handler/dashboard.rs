use tracing::{info, warn};

use super::{isolate, settle, Page, PageState};
use crate::{
    configuration::{AppState, State},
    error::Error,
    model::{bank_catalog, static_catalog, Dashboard, DashboardSources, Section},
    types::TransactionQuery,
};

pub const DASHBOARD_FAILED: &str = "Не удалось загрузить данные";

#[derive(Debug)]
pub struct DashboardPage {
    state: AppState<State>,
    pub page: Page<Dashboard>,
}

impl DashboardPage {
    pub fn new(state: AppState<State>) -> Self {
        DashboardPage {
            state,
            page: Page::new(),
        }
    }

    pub async fn load(&self) -> Result<PageState<Dashboard>, Error> {
        let ticket = self.page.begin();
        let result = self.fetch().await;
        settle(&self.page, ticket, result, DASHBOARD_FAILED)
    }

    /// Five section requests plus the bank list, issued together. Each
    /// one may fail on its own; only a lost session aborts the load.
    async fn fetch(&self) -> Result<Dashboard, Error> {
        let session = self.state.require_session()?;
        let user_id = session.user.user_id.as_str();
        let api = &self.state.api;

        let query = TransactionQuery {
            limit: Some(self.state.config.transactions_limit as i64),
            ..TransactionQuery::default()
        };

        let (balance, debt, loans, transactions, applications, banks) = tokio::join!(
            api.get_balance(user_id),
            api.get_debt(user_id),
            api.get_loans(user_id),
            api.get_transactions(user_id, &query),
            api.get_applications(user_id),
            api.get_banks(),
        );

        let sources = DashboardSources {
            balance: isolate(&Section::Balance, balance)?,
            debt: isolate(&Section::Debt, debt)?,
            loans: isolate(&Section::Loans, loans)?,
            transactions: isolate(&Section::Transactions, transactions)?,
            applications: isolate(&Section::Applications, applications)?,
        };

        let banks = match isolate(&"banks", banks)? {
            Some(raw) => bank_catalog(raw),
            None => static_catalog(),
        };

        let dashboard = Dashboard::build(sources, &banks, &self.state.dashboard_options());

        if dashboard.failed_sections.is_empty() {
            info!("Dashboard loaded for user {}", user_id);
        } else {
            warn!(
                "Dashboard rendered without: {}",
                dashboard
                    .failed_sections
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(dashboard)
    }
}
