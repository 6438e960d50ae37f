use super::error::AnalysisError;
use super::model::{ContributionPlan, EscalationRule};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

/// Largest number of funds analyzed in one batch.
pub const MAX_BATCH_SIZE: usize = 5;

/// Analysis window start, relative to the day the analysis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartDatePreset {
    #[serde(rename = "5_years_ago")]
    FiveYearsAgo,
    #[serde(rename = "3_years_ago")]
    ThreeYearsAgo,
    #[serde(rename = "1_year_ago")]
    OneYearAgo,
    #[serde(rename = "year_start")]
    YearStart,
    #[serde(rename = "6_months_ago")]
    SixMonthsAgo,
    #[serde(rename = "3_months_ago")]
    ThreeMonthsAgo,
    #[serde(rename = "1_month_ago")]
    OneMonthAgo,
}

impl StartDatePreset {
    pub const ALL: [StartDatePreset; 7] = [
        StartDatePreset::FiveYearsAgo,
        StartDatePreset::ThreeYearsAgo,
        StartDatePreset::OneYearAgo,
        StartDatePreset::YearStart,
        StartDatePreset::SixMonthsAgo,
        StartDatePreset::ThreeMonthsAgo,
        StartDatePreset::OneMonthAgo,
    ];

    /// Resolves the preset against `today`.
    ///
    /// Month arithmetic clamps to the last day of shorter months. The
    /// three-month window counts the current month, so it starts two
    /// calendar months back.
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        let months_back = |n: u32| {
            today
                .checked_sub_months(Months::new(n))
                .unwrap_or(NaiveDate::MIN)
        };
        match self {
            StartDatePreset::FiveYearsAgo => months_back(60),
            StartDatePreset::ThreeYearsAgo => months_back(36),
            StartDatePreset::OneYearAgo => months_back(12),
            StartDatePreset::YearStart => NaiveDate::from_yo_opt(today.year(), 1).unwrap_or(today),
            StartDatePreset::SixMonthsAgo => months_back(6),
            StartDatePreset::ThreeMonthsAgo => months_back(2),
            StartDatePreset::OneMonthAgo => months_back(1),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            StartDatePreset::FiveYearsAgo => "5_years_ago",
            StartDatePreset::ThreeYearsAgo => "3_years_ago",
            StartDatePreset::OneYearAgo => "1_year_ago",
            StartDatePreset::YearStart => "year_start",
            StartDatePreset::SixMonthsAgo => "6_months_ago",
            StartDatePreset::ThreeMonthsAgo => "3_months_ago",
            StartDatePreset::OneMonthAgo => "1_month_ago",
        }
    }
}

impl Display for StartDatePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StartDatePreset {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StartDatePreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s.to_lowercase())
            .ok_or_else(|| AnalysisError::InvalidParameters(format!("Invalid start date: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub fund_code: String,
    pub start_date: StartDatePreset,
    pub initial_investment: f64,
    pub monthly_investment: f64,
    pub yearly_increase: EscalationRule,
    #[serde(default)]
    pub include_monthly_details: bool,
}

impl AnalysisRequest {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_fund_code(&self.fund_code)?;
        validate_amount("initialInvestment", self.initial_investment)?;
        validate_amount("monthlyInvestment", self.monthly_investment)?;
        validate_amount("yearlyIncrease.value", self.yearly_increase.value)?;
        Ok(())
    }

    pub fn plan(&self, start_date: NaiveDate) -> ContributionPlan {
        ContributionPlan {
            start_date,
            initial_investment: self.initial_investment,
            monthly_base: self.monthly_investment,
            escalation: self.yearly_increase,
        }
    }
}

/// Fund codes are 2 to 10 upper-case letters or digits.
pub fn validate_fund_code(code: &str) -> Result<(), AnalysisError> {
    let code = code.trim();
    let valid_len = (2..=10).contains(&code.chars().count());
    let valid_chars = code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if valid_len && valid_chars {
        Ok(())
    } else {
        Err(AnalysisError::InvalidParameters(format!(
            "Fund code must be 2-10 upper-case letters or digits: '{code}'"
        )))
    }
}

/// A batch holds between 1 and [`MAX_BATCH_SIZE`] distinct valid codes.
pub fn validate_batch(codes: &[String]) -> Result<(), AnalysisError> {
    if codes.is_empty() {
        return Err(AnalysisError::InvalidParameters(
            "At least one fund code is required".to_string(),
        ));
    }
    if codes.len() > MAX_BATCH_SIZE {
        return Err(AnalysisError::InvalidParameters(format!(
            "At most {MAX_BATCH_SIZE} funds can be analyzed at once"
        )));
    }
    for code in codes {
        validate_fund_code(code)?;
    }
    let unique: HashSet<&str> = codes.iter().map(|c| c.trim()).collect();
    if unique.len() != codes.len() {
        return Err(AnalysisError::InvalidParameters(
            "The same fund cannot be specified more than once".to_string(),
        ));
    }
    Ok(())
}

fn validate_amount(name: &str, value: f64) -> Result<(), AnalysisError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidParameters(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}
