use serde::Deserialize;

use super::RawId;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiBank {
    pub bank_id: Option<RawId>,
    pub id: Option<RawId>,
    pub code: Option<String>,
    pub name: Option<String>,
}
