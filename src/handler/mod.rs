use std::fmt::Display;

use tracing::warn;

use crate::error::Error;

pub use self::page::{LoadTicket, Page, PageState};

pub mod applications;
pub mod banks;
pub mod dashboard;
pub mod new_application;
pub mod page;
pub mod transactions;

/// Per-request isolation: a failed request becomes `None` so the rest of
/// the page still renders. A 401 is never swallowed.
pub fn isolate<T>(section: &dyn Display, result: Result<T, Error>) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::Unauthorized()) => Err(Error::Unauthorized()),
        Err(e) => {
            warn!("Section {} failed: {}", section, e);
            Ok(None)
        },
    }
}

/// Routes a load result into its page. Failures become a `Failed` state
/// carrying `failure`; only a lost session is returned as an error.
pub fn settle<T: Clone>(
    page: &Page<T>,
    ticket: LoadTicket,
    result: Result<T, Error>,
    failure: &str,
) -> Result<PageState<T>, Error> {
    match result {
        Ok(value) => {
            page.apply(ticket, PageState::Ready(value));
            Ok(page.state())
        },
        Err(Error::Unauthorized()) => {
            page.apply(ticket, PageState::Failed(Error::Unauthorized().to_string()));
            Err(Error::Unauthorized())
        },
        Err(e) => {
            warn!("{}: {}", failure, e);
            page.apply(ticket, PageState::Failed(failure.to_owned()));
            Ok(page.state())
        },
    }
}
