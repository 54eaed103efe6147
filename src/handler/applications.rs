use tracing::info;

use super::{isolate, settle, Page, PageState};
use crate::{
    configuration::{AppState, State},
    error::Error,
    model::{decode_positional, filter_offers, merge_offers, Application, CreditOffer, Loan},
};

pub const OFFERS_FAILED: &str = "Не удалось загрузить кредитные предложения";

/// Loans and applications of the current user as one searchable list.
#[derive(Debug)]
pub struct ApplicationsPage {
    state: AppState<State>,
    pub page: Page<Vec<CreditOffer>>,
}

impl ApplicationsPage {
    pub fn new(state: AppState<State>) -> Self {
        ApplicationsPage {
            state,
            page: Page::new(),
        }
    }

    pub async fn load(&self) -> Result<PageState<Vec<CreditOffer>>, Error> {
        let ticket = self.page.begin();
        let result = self.fetch().await;
        settle(&self.page, ticket, result, OFFERS_FAILED)
    }

    pub async fn retry(&self) -> Result<PageState<Vec<CreditOffer>>, Error> {
        info!("Retrying credit offers");
        self.load().await
    }

    /// Offers matching `search` and `status`; empty until a load succeeds.
    pub fn filtered(&self, search: &str, status: Option<&str>) -> Vec<CreditOffer> {
        match self.page.state() {
            PageState::Ready(offers) => filter_offers(&offers, search, status),
            _ => vec![],
        }
    }

    async fn fetch(&self) -> Result<Vec<CreditOffer>, Error> {
        let session = self.state.require_session()?;
        let user_id = session.user.user_id.as_str();
        let api = &self.state.api;

        let (loans, applications) =
            tokio::join!(api.get_loans(user_id), api.get_applications(user_id));

        let loans = isolate(&"loans", loans)?;
        let applications = isolate(&"applications", applications)?;

        if loans.is_none() && applications.is_none() {
            return Err(Error::Unavailable(String::from(OFFERS_FAILED)));
        }

        let loans = decode_positional(loans.unwrap_or_default(), Loan::decode);
        let applications =
            decode_positional(applications.unwrap_or_default(), Application::decode);

        Ok(merge_offers(&loans, &applications))
    }
}
