use tracing::info;

use super::HTTP;
use crate::{
    error::Error,
    types::{
        ApiAccount, ApiApplication, ApiBalance, ApiBank, ApiDebt, ApiLoan,
        ApiTransactionHistory, ApiUser, LoginRequest, LoginResponse,
        NewApplicationRequest, RegisterRequest, TransactionQuery,
    },
};

/// Backend endpoints grouped by resource. Responses are returned raw; the
/// decode step lives in `model`.
#[derive(Debug, Clone)]
pub struct Api {
    pub http: HTTP,
}

impl Api {
    pub fn new(http: HTTP) -> Self {
        Api { http }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, Error> {
        let body = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        self.http.post("/auth/login", &body).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value, Error> {
        self.http.post("/auth/register", request).await
    }

    pub async fn logout(&self) -> Result<(), Error> {
        self.http.post_empty("/auth/logout").await
    }

    pub async fn me(&self) -> Result<ApiUser, Error> {
        self.http.get("/auth/me").await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<ApiUser, Error> {
        self.http.get(&format!("/users/{}", user_id)).await
    }

    pub async fn get_balance(&self, user_id: &str) -> Result<ApiBalance, Error> {
        self.http.get(&format!("/users/{}/balance", user_id)).await
    }

    pub async fn get_accounts(&self, user_id: &str) -> Result<Vec<ApiAccount>, Error> {
        self.http.get(&format!("/users/{}/accounts", user_id)).await
    }

    pub async fn get_debt(&self, user_id: &str) -> Result<ApiDebt, Error> {
        self.http.get(&format!("/users/{}/debt", user_id)).await
    }

    pub async fn get_loans(&self, user_id: &str) -> Result<Vec<ApiLoan>, Error> {
        self.http.get(&format!("/users/{}/loans", user_id)).await
    }

    /// The bank-scoped endpoint is used when the query names a bank.
    pub async fn get_transactions(
        &self,
        user_id: &str,
        query: &TransactionQuery,
    ) -> Result<ApiTransactionHistory, Error> {
        let path = match query.bank_id {
            Some(bank_id) => format!("/users/{}/banks/{}/transactions", user_id, bank_id),
            None => format!("/users/{}/transactions", user_id),
        };
        self.http.get_with_query(&path, query).await
    }

    pub async fn get_applications(&self, user_id: &str) -> Result<Vec<ApiApplication>, Error> {
        self.http
            .get(&format!("/users/{}/applications", user_id))
            .await
    }

    pub async fn create_application(
        &self,
        request: &NewApplicationRequest,
    ) -> Result<Option<ApiApplication>, Error> {
        info!(
            "Submitting application to bank {} for {}",
            request.bank_id, request.requested_amount
        );
        self.http.post("/applications", request).await
    }

    pub async fn get_banks(&self) -> Result<Vec<ApiBank>, Error> {
        self.http.get("/banks").await
    }
}
