//! Normalized view models.
//!
//! Every raw payload from `types` passes through exactly one `decode`
//! function here, which is where field precedence and defaults live.

use tracing::warn;

use crate::error::Error;

pub use self::{
    application::{
        build_history, find_template, template_title, Application, ApplicationTemplate,
        HistoryEntry, TEMPLATES,
    },
    bank::{bank_catalog, bank_name, static_catalog, Bank, BankMeta, BANK_TABLE},
    dashboard::{
        BankAmount, CreditRating, Dashboard, DashboardOptions, DashboardSources, DebtSlice,
        Payoff, Section, SpendingPoint,
    },
    loan::Loan,
    offer::{filter_offers, merge_offers, CreditOffer, OfferKind},
    transaction::{Transaction, TransactionPage},
    user::{display_name_from_email, Role, Session, User},
};

pub mod application;
pub mod bank;
pub mod dashboard;
pub mod loan;
pub mod offer;
pub mod transaction;
pub mod user;

/// Decodes a list, dropping and logging the items that fail.
pub fn decode_list<R, T, F>(raw: Vec<R>, entity: &str, decode: F) -> Vec<T>
where
    F: Fn(R) -> Result<T, Error>,
{
    raw.into_iter()
        .filter_map(|item| match decode(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping {}: {}", entity, e);
                None
            },
        })
        .collect()
}

/// Decodes a list whose items never fail, handing each its position for
/// use as a fallback id.
pub fn decode_positional<R, T, F>(raw: Vec<R>, decode: F) -> Vec<T>
where
    F: Fn(R, usize) -> T,
{
    raw.into_iter()
        .enumerate()
        .map(|(position, item)| decode(item, position))
        .collect()
}
