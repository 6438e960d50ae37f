use crate::core::{Fund, FundRepository, PriceObservation, PriceSeriesProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Dataset {
    funds: Vec<DatasetFund>,
}

#[derive(Debug, Deserialize)]
struct DatasetFund {
    code: String,
    management_company_id: String,
    title: String,
    #[serde(default)]
    prices: Vec<(NaiveDate, Option<f64>)>,
}

struct FundSeries {
    fund: Fund,
    /// Sorted by date.
    observations: Vec<PriceObservation>,
}

/// Serves funds and prices from a JSON file loaded into memory.
pub struct LocalDatasetProvider {
    funds: HashMap<String, FundSeries>,
}

impl LocalDatasetProvider {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse dataset: {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(text)?;
        let funds = dataset
            .funds
            .into_iter()
            .map(|entry| {
                let mut observations: Vec<_> = entry
                    .prices
                    .into_iter()
                    .map(|(date, price)| PriceObservation::new(&entry.code, date, price))
                    .collect();
                observations.sort_by_key(|obs| obs.date);
                let fund = Fund {
                    code: entry.code,
                    management_company_id: entry.management_company_id,
                    title: entry.title,
                };
                (fund.code.clone(), FundSeries { fund, observations })
            })
            .collect::<HashMap<_, _>>();
        debug!("Loaded {} funds from dataset", funds.len());
        Ok(Self { funds })
    }
}

#[async_trait]
impl FundRepository for LocalDatasetProvider {
    async fn get_by_code(&self, code: &str) -> Result<Option<Fund>> {
        Ok(self.funds.get(code).map(|series| series.fund.clone()))
    }
}

#[async_trait]
impl PriceSeriesProvider for LocalDatasetProvider {
    async fn get_range(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>> {
        let Some(series) = self.funds.get(code) else {
            return Ok(Vec::new());
        };
        let observations = &series.observations;
        let from = observations.partition_point(|obs| obs.date < start);
        let to = observations.partition_point(|obs| obs.date <= end);
        Ok(observations[from..to.max(from)].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "funds": [
            {
                "code": "AFT",
                "management_company_id": "AKP",
                "title": "Test Fund",
                "prices": [
                    ["2024-01-03", 1.3],
                    ["2024-01-02", 1.2],
                    ["2024-02-01", null],
                    ["2024-03-01", 1.5]
                ]
            }
        ]
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_fund_lookup() {
        let provider = LocalDatasetProvider::from_json(DATASET).unwrap();
        let fund = provider.get_by_code("AFT").await.unwrap().unwrap();
        assert_eq!(fund.title, "Test Fund");
        assert!(provider.get_by_code("XYZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_range_is_inclusive_and_sorted() {
        let provider = LocalDatasetProvider::from_json(DATASET).unwrap();
        let series = provider
            .get_range("AFT", date(2024, 1, 2), date(2024, 2, 1))
            .await
            .unwrap();
        let dates: Vec<_> = series.iter().map(|obs| obs.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 2, 1)]
        );
        assert_eq!(series[2].price, None);

        let empty = provider
            .get_range("AFT", date(2025, 1, 1), date(2024, 1, 1))
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalDatasetProvider::from_path(dir.path().join("none.json")).err();
        assert!(err.unwrap().to_string().starts_with("Failed to read dataset"));
    }
}
