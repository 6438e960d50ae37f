use super::util::{RetryPolicy, with_retry};
use crate::core::cache::KeyValueCollection;
use crate::core::{Fund, FundRepository, PriceObservation, PriceSeriesProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Identifier {
    Text(String),
    Number(i64),
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        match id {
            Identifier::Text(text) => text,
            Identifier::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FundResponse {
    code: String,
    management_company_id: Identifier,
    title: String,
}

/// Decimal columns are serialized either as numbers or as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Decimal {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct HistoricalValue {
    date: String,
    value: Option<Decimal>,
}

impl HistoricalValue {
    fn into_observation(self, code: &str) -> Result<PriceObservation> {
        let day = self.date.get(..10).unwrap_or(&self.date);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .with_context(|| format!("Failed to parse date: {}", self.date))?;
        let price = match self.value {
            Some(Decimal::Number(n)) => Some(n),
            Some(Decimal::Text(text)) => text.trim().parse().ok(),
            None => None,
        };
        Ok(PriceObservation::new(code, date, price))
    }
}

/// Fund records and price histories served by the FonParam API.
pub struct FonparamProvider {
    base_url: String,
    client: reqwest::Client,
    cache: Arc<dyn KeyValueCollection>,
    fund_ttl: Duration,
    history_ttl: Duration,
    retry: RetryPolicy,
}

impl FonparamProvider {
    pub fn new(
        base_url: &str,
        cache: Arc<dyn KeyValueCollection>,
        fund_ttl: Duration,
        history_ttl: Duration,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            cache,
            fund_ttl,
            history_ttl,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        with_retry(
            || async {
                let response = self.client.get(url).send().await?;
                if response.status() == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                let body = response.error_for_status()?.text().await?;
                Ok(Some(body))
            },
            self.retry,
        )
        .await
        .with_context(|| format!("Request to {url} failed"))
    }
}

#[async_trait]
impl FundRepository for FonparamProvider {
    async fn get_by_code(&self, code: &str) -> Result<Option<Fund>> {
        let key = format!("fund:{code}");
        if let Some(cached) = self.cache.get(key.as_bytes()).await {
            match serde_json::from_slice::<Fund>(&cached) {
                Ok(fund) => return Ok(Some(fund)),
                Err(e) => debug!("Discarding unreadable cached fund {}: {}", code, e),
            }
        }

        let url = format!("{}/funds/{}", self.base_url, code);
        let Some(body) = self.fetch_text(&url).await? else {
            debug!("Fund {} not found at source", code);
            return Ok(None);
        };

        let raw: FundResponse = match serde_json::from_str(&body) {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = ?e, response = %body, "Failed to parse fund response");
                return Err(e).context("Failed to parse fund response");
            }
        };
        let fund = Fund {
            code: raw.code,
            management_company_id: raw.management_company_id.into(),
            title: raw.title,
        };

        self.cache
            .put(key.as_bytes(), &serde_json::to_vec(&fund)?, Some(self.fund_ttl))
            .await;
        Ok(Some(fund))
    }
}

#[async_trait]
impl PriceSeriesProvider for FonparamProvider {
    async fn get_range(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>> {
        let key = format!("history:{code}:{start}:{end}");
        if let Some(cached) = self.cache.get(key.as_bytes()).await {
            match serde_json::from_slice::<Vec<PriceObservation>>(&cached) {
                Ok(series) => return Ok(series),
                Err(e) => debug!("Discarding unreadable cached history {}: {}", key, e),
            }
        }

        let url = format!(
            "{}/funds/{}/historical?start_date={}&end_date={}&sort=date&order=ASC",
            self.base_url,
            code,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );
        let Some(body) = self.fetch_text(&url).await? else {
            return Ok(Vec::new());
        };

        let rows: Vec<HistoricalValue> = match serde_json::from_str(&body) {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = ?e, response = %body, "Failed to parse historical values");
                return Err(e).context("Failed to parse historical values");
            }
        };
        let mut series = rows
            .into_iter()
            .map(|row| row.into_observation(code))
            .collect::<Result<Vec<_>>>()?;
        series.sort_by_key(|obs| obs.date);
        debug!("Fetched {} historical values for {}", series.len(), code);

        self.cache
            .put(
                key.as_bytes(),
                &serde_json::to_vec(&series)?,
                Some(self.history_ttl),
            )
            .await;
        Ok(series)
    }
}
