use std::{sync::Arc, time::Duration};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::SessionStore;
use crate::{configuration::Config, error::Error, types::ApiErrorBody};

/// Request client bound to the backend base URL. Attaches the bearer
/// token of the current session and tears the session down on 401.
#[derive(Debug, Clone)]
pub struct HTTP {
    pub config: Config,
    http: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl HTTP {
    pub fn new(config: Config, session: Arc<SessionStore>) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        let mut base_url = config.api_base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(HTTP {
            config,
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        self.send(self.http.get(url)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.http.get(url).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.http.post(url).json(body)).await
    }

    pub async fn post_empty(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        let _: serde_json::Value = self.send(self.http.post(url)).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let token = self.session.token();
        let request = match &token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        // Without a token a 401 is a credential rejection, not an expiry.
        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            warn!("Backend rejected the session token, logging out");
            self.session.invalidate();
            return Err(Error::Unauthorized());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = parsed
                .error
                .or(parsed.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_owned());

            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_str("null")?);
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
