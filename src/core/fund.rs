use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reference record of an investment fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    pub code: String,
    pub management_company_id: String,
    pub title: String,
}

#[async_trait]
pub trait FundRepository: Send + Sync {
    /// Returns `Ok(None)` when no fund is registered under `code`.
    async fn get_by_code(&self, code: &str) -> Result<Option<Fund>>;
}
