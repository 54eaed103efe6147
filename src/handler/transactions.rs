use super::{settle, Page, PageState};
use crate::{
    configuration::{AppState, State},
    error::Error,
    model::TransactionPage,
    types::TransactionQuery,
};

pub const TRANSACTIONS_FAILED: &str = "Не удалось загрузить операции";

#[derive(Debug)]
pub struct TransactionsPage {
    state: AppState<State>,
    pub page: Page<TransactionPage>,
}

impl TransactionsPage {
    pub fn new(state: AppState<State>) -> Self {
        TransactionsPage {
            state,
            page: Page::new(),
        }
    }

    pub async fn load(&self, query: &TransactionQuery) -> Result<PageState<TransactionPage>, Error> {
        let ticket = self.page.begin();
        let result = self.fetch(query).await;
        settle(&self.page, ticket, result, TRANSACTIONS_FAILED)
    }

    async fn fetch(&self, query: &TransactionQuery) -> Result<TransactionPage, Error> {
        let session = self.state.require_session()?;
        let raw = self
            .state
            .api
            .get_transactions(&session.user.user_id, query)
            .await?;

        Ok(TransactionPage::decode(raw))
    }
}
