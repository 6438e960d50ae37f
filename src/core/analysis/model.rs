//! Value types flowing through an analysis run.

use super::error::AnalysisError;
use crate::core::fund::Fund;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationKind {
    /// Compounds the base amount by `value` percent per year.
    Percentage,
    /// Adds `value` to the base amount per year.
    Amount,
}

impl Display for EscalationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                EscalationKind::Percentage => "percentage",
                EscalationKind::Amount => "amount",
            }
        )
    }
}

impl FromStr for EscalationKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percentage" => Ok(EscalationKind::Percentage),
            "amount" => Ok(EscalationKind::Amount),
            _ => Err(AnalysisError::InvalidParameters(format!(
                "Invalid yearly increase type: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscalationRule {
    #[serde(rename = "type")]
    pub kind: EscalationKind,
    pub value: f64,
}

impl EscalationRule {
    pub fn none() -> Self {
        Self {
            kind: EscalationKind::Percentage,
            value: 0.0,
        }
    }
}

/// Parameters of a single periodic-investment run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContributionPlan {
    pub start_date: NaiveDate,
    pub initial_investment: f64,
    pub monthly_base: f64,
    pub escalation: EscalationRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDetail {
    pub date: NaiveDate,
    /// Contribution made this month; zero for the first month.
    pub investment: f64,
    pub total_investment: f64,
    pub unit_price: f64,
    /// Units bought this month.
    pub units: f64,
    pub total_units: f64,
    pub value: f64,
    #[serde(rename = "yield")]
    pub yield_amount: f64,
    /// Return of the month against a no-market-movement baseline.
    pub yield_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_investment: f64,
    pub current_value: f64,
    pub total_yield: f64,
    pub total_yield_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub code: String,
    pub management_company_id: String,
    pub title: String,
    pub summary: AnalysisSummary,
    #[serde(
        rename = "monthlyDetails",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub monthly_details: Option<Vec<MonthlyDetail>>,
}

impl AnalysisResponse {
    pub fn new(fund: Fund, summary: AnalysisSummary, details: Option<Vec<MonthlyDetail>>) -> Self {
        Self {
            code: fund.code,
            management_company_id: fund.management_company_id,
            title: fund.title,
            summary,
            monthly_details: details,
        }
    }
}
