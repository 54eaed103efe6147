use serde::{Deserialize, Serialize};

use super::RawId;

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: ApiUser,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiUser {
    pub user_id: Option<RawId>,
    pub id: Option<RawId>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<String>,
}
