pub use self::{
    api_error::ApiErrorBody,
    application::{ApiApplication, NewApplicationRequest},
    auth::{ApiUser, LoginRequest, LoginResponse, RegisterRequest},
    balance::{ApiAccount, ApiBalance, ApiBankBalance},
    bank::ApiBank,
    debt::{ApiDebt, ApiLoanDebt},
    loan::ApiLoan,
    raw_value::{RawAmount, RawId},
    transaction::{ApiTransaction, ApiTransactionHistory, TransactionQuery},
};

mod api_error;
mod application;
mod auth;
mod balance;
mod bank;
mod debt;
mod loan;
mod raw_value;
mod transaction;
