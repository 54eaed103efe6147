use serde::Deserialize;

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize, Default)]
pub struct ApiErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}
