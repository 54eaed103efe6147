use tracing::warn;

use super::{settle, Page, PageState};
use crate::{
    configuration::{AppState, State},
    error::Error,
    model::{bank_catalog, static_catalog, Bank},
};

pub const BANKS_FAILED: &str = "Не удалось загрузить список банков";

#[derive(Debug)]
pub struct BanksPage {
    state: AppState<State>,
    pub page: Page<Vec<Bank>>,
}

impl BanksPage {
    pub fn new(state: AppState<State>) -> Self {
        BanksPage {
            state,
            page: Page::new(),
        }
    }

    /// Rates are client-side constants, so an unreachable backend still
    /// yields the static catalog.
    pub async fn load(&self) -> Result<PageState<Vec<Bank>>, Error> {
        let ticket = self.page.begin();
        let result = fetch_banks(&self.state).await;
        settle(&self.page, ticket, result, BANKS_FAILED)
    }
}

pub async fn fetch_banks(state: &State) -> Result<Vec<Bank>, Error> {
    match state.api.get_banks().await {
        Ok(raw) => Ok(bank_catalog(raw)),
        Err(Error::Unauthorized()) => Err(Error::Unauthorized()),
        Err(e) => {
            warn!("Bank list unavailable, using built-in catalog: {}", e);
            Ok(static_catalog())
        },
    }
}
