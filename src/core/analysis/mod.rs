//! Periodic-investment analysis of a fund's unit price history.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod model;
pub mod request;
pub mod sampler;
pub mod schedule;

pub use engine::Anchoring;
pub use error::AnalysisError;
pub use model::{
    AnalysisResponse, AnalysisSummary, ContributionPlan, EscalationKind, EscalationRule,
    MonthlyDetail,
};
pub use request::{AnalysisRequest, StartDatePreset};

use crate::core::fund::FundRepository;
use crate::core::price::PriceSeriesProvider;
use chrono::NaiveDate;
use sampler::MonthlyIndex;
use tracing::{debug, info};

/// Runs analyses against injected fund and price sources.
///
/// Holds no per-run state; concurrent calls are independent.
pub struct Analyzer<'a> {
    funds: &'a (dyn FundRepository + Send + Sync),
    prices: &'a (dyn PriceSeriesProvider + Send + Sync),
    anchoring: Anchoring,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        funds: &'a (dyn FundRepository + Send + Sync),
        prices: &'a (dyn PriceSeriesProvider + Send + Sync),
        anchoring: Anchoring,
    ) -> Self {
        Self {
            funds,
            prices,
            anchoring,
        }
    }

    /// Simulates `request` over the window ending on `today`.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        today: NaiveDate,
    ) -> Result<AnalysisResponse, AnalysisError> {
        request.validate()?;
        let code = request.fund_code.trim();
        let start = request.start_date.resolve(today);
        info!("Analyzing {code} from {start} to {today}");

        let fund = self
            .funds
            .get_by_code(code)
            .await?
            .ok_or_else(|| AnalysisError::FundNotFound(code.to_string()))?;

        let series = self.prices.get_range(code, start, today).await?;
        debug!("Fetched {} price observations for {code}", series.len());

        let index = MonthlyIndex::build(
            series
                .iter()
                .filter(|obs| obs.date >= start && obs.date <= today),
        );
        let last_price = index
            .last()
            .map(|point| point.price)
            .ok_or_else(|| AnalysisError::NoHistoricalData {
                code: code.to_string(),
                start,
                end: today,
            })?;

        let plan = request.plan(start);
        let simulation = engine::simulate(&plan, &index, today, self.anchoring);
        debug!(
            "Simulated {} months for {code}, {} units held",
            simulation.details.len(),
            simulation.state.total_units
        );

        let summary = aggregate::summarize(&simulation.state, last_price);
        Ok(aggregate::assemble(
            fund,
            summary,
            simulation.details,
            request.include_monthly_details,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fund::Fund;
    use crate::core::price::PriceObservation;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chrono::Datelike;
    use std::collections::HashMap;

    struct MockSource {
        funds: HashMap<String, Fund>,
        prices: HashMap<String, Vec<PriceObservation>>,
        fail_prices: bool,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                funds: HashMap::new(),
                prices: HashMap::new(),
                fail_prices: false,
            }
        }

        fn add_fund(&mut self, code: &str, prices: Vec<PriceObservation>) {
            self.funds.insert(
                code.to_string(),
                Fund {
                    code: code.to_string(),
                    management_company_id: "AKP".to_string(),
                    title: format!("{code} Fund"),
                },
            );
            self.prices.insert(code.to_string(), prices);
        }
    }

    #[async_trait]
    impl FundRepository for MockSource {
        async fn get_by_code(&self, code: &str) -> Result<Option<Fund>> {
            Ok(self.funds.get(code).cloned())
        }
    }

    #[async_trait]
    impl PriceSeriesProvider for MockSource {
        async fn get_range(
            &self,
            code: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<PriceObservation>> {
            if self.fail_prices {
                return Err(anyhow!("database unavailable"));
            }
            Ok(self
                .prices
                .get(code)
                .map(|series| {
                    series
                        .iter()
                        .filter(|o| o.date >= start && o.date <= end)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(code: &str, from: NaiveDate, to: NaiveDate, price: impl Fn(NaiveDate) -> f64) -> Vec<PriceObservation> {
        from.iter_days()
            .take_while(|d| *d <= to)
            .map(|d| PriceObservation::new(code, d, Some(price(d))))
            .collect()
    }

    fn request(code: &str, preset: StartDatePreset, initial: f64, monthly: f64) -> AnalysisRequest {
        AnalysisRequest {
            fund_code: code.to_string(),
            start_date: preset,
            initial_investment: initial,
            monthly_investment: monthly,
            yearly_increase: EscalationRule::none(),
            include_monthly_details: true,
        }
    }

    #[tokio::test]
    async fn test_flat_year_lump_sum() {
        let today = date(2026, 10, 14);
        let mut source = MockSource::new();
        source.add_fund("AFT", daily("AFT", date(2025, 10, 14), today, |_| 10.0));
        let analyzer = Analyzer::new(&source, &source, Anchoring::Drift);

        let response = analyzer
            .analyze(&request("AFT", StartDatePreset::OneYearAgo, 1000.0, 0.0), today)
            .await
            .unwrap();

        assert_eq!(response.code, "AFT");
        assert_eq!(response.summary.total_investment, 1000.0);
        assert_eq!(response.summary.current_value, 1000.0);
        assert_eq!(response.summary.total_yield, 0.0);
        assert_eq!(response.summary.total_yield_percentage, 0.0);
        let details = response.monthly_details.unwrap();
        assert_eq!(details.last().unwrap().total_units, 100.0);
    }

    #[tokio::test]
    async fn test_summary_uses_latest_observation() {
        let today = date(2026, 10, 14);
        let mut source = MockSource::new();
        // Without the 13th and 14th of September the target day drifts to
        // the 12th, so October is sampled before the last two observations.
        let mut series: Vec<PriceObservation> =
            daily("AFT", date(2026, 8, 14), date(2026, 10, 13), |_| 10.0)
                .into_iter()
                .filter(|o| o.date != date(2026, 9, 13) && o.date != date(2026, 9, 14))
                .collect();
        series.push(PriceObservation::new("AFT", today, Some(12.0)));
        source.add_fund("AFT", series);
        let analyzer = Analyzer::new(&source, &source, Anchoring::Drift);

        let req = request("AFT", StartDatePreset::ThreeMonthsAgo, 1000.0, 0.0);
        let response = analyzer.analyze(&req, today).await.unwrap();

        let details = response.monthly_details.unwrap();
        let last = details.last().unwrap();
        assert_eq!(last.date, date(2026, 10, 12));
        assert_eq!(last.unit_price, 10.0);
        assert!((response.summary.current_value - 1200.0).abs() < 1e-9);
        assert!((response.summary.total_yield_percentage - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_year_start_samples_the_run_day() {
        let today = date(2026, 10, 14);
        let mut source = MockSource::new();
        let series = daily("AFT", date(2026, 1, 2), today, |_| 10.0)
            .into_iter()
            .filter(|o| o.date.day() <= 28)
            .collect();
        source.add_fund("AFT", series);
        let analyzer = Analyzer::new(&source, &source, Anchoring::Drift);

        let response = analyzer
            .analyze(&request("AFT", StartDatePreset::YearStart, 1000.0, 100.0), today)
            .await
            .unwrap();

        let details = response.monthly_details.unwrap();
        assert_eq!(details.len(), 10);
        assert_eq!(details[0].date, date(2026, 1, 14));
        assert!(details.iter().all(|d| d.date.day() == 14));
        assert_eq!(response.summary.total_investment, 1900.0);
    }

    #[tokio::test]
    async fn test_details_flag_does_not_change_summary() {
        let today = date(2026, 10, 14);
        let mut source = MockSource::new();
        source.add_fund(
            "TI2",
            daily("TI2", date(2026, 4, 14), today, |d| 5.0 + f64::from(d.ordinal()) / 100.0),
        );
        let analyzer = Analyzer::new(&source, &source, Anchoring::Drift);

        let mut with = request("TI2", StartDatePreset::SixMonthsAgo, 1000.0, 250.0);
        let detailed = analyzer.analyze(&with, today).await.unwrap();
        with.include_monthly_details = false;
        let plain = analyzer.analyze(&with, today).await.unwrap();

        assert_eq!(detailed.summary, plain.summary);
        assert_eq!(detailed.summary.total_investment, 1000.0 + 6.0 * 250.0);
    }

    #[tokio::test]
    async fn test_unknown_fund() {
        let source = MockSource::new();
        let analyzer = Analyzer::new(&source, &source, Anchoring::Drift);
        let err = analyzer
            .analyze(
                &request("ZZZ", StartDatePreset::OneYearAgo, 1000.0, 0.0),
                date(2026, 10, 14),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::FundNotFound(code) if code == "ZZZ"));
    }

    #[tokio::test]
    async fn test_no_historical_data() {
        let mut source = MockSource::new();
        source.add_fund(
            "AFT",
            vec![PriceObservation::new("AFT", date(2026, 10, 1), None)],
        );
        let analyzer = Analyzer::new(&source, &source, Anchoring::Drift);
        let err = analyzer
            .analyze(
                &request("AFT", StartDatePreset::OneMonthAgo, 1000.0, 0.0),
                date(2026, 10, 14),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoHistoricalData { .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_fetching() {
        let mut source = MockSource::new();
        source.fail_prices = true;
        let analyzer = Analyzer::new(&source, &source, Anchoring::Drift);
        let err = analyzer
            .analyze(
                &request("AFT", StartDatePreset::OneYearAgo, -5.0, 0.0),
                date(2026, 10, 14),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let mut source = MockSource::new();
        source.add_fund("AFT", Vec::new());
        source.fail_prices = true;
        let analyzer = Analyzer::new(&source, &source, Anchoring::Drift);
        let err = analyzer
            .analyze(
                &request("AFT", StartDatePreset::OneYearAgo, 1000.0, 0.0),
                date(2026, 10, 14),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "database unavailable");
    }
}
