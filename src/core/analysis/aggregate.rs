use super::engine::SimulationState;
use super::model::{AnalysisResponse, AnalysisSummary, MonthlyDetail};
use crate::core::fund::Fund;

/// Division with a zero result for degenerate denominators.
///
/// A zero denominator or a non-finite quotient yields `0.0`, so no `NaN` or
/// infinity reaches a report.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() { quotient } else { 0.0 }
}

/// `part` as a percentage of `whole`, see [`safe_divide`].
pub fn percentage(part: f64, whole: f64) -> f64 {
    safe_divide(part, whole) * 100.0
}

/// Values the final holdings at `last_price`.
pub fn summarize(state: &SimulationState, last_price: f64) -> AnalysisSummary {
    let current_value = state.total_units * last_price;
    let total_yield = current_value - state.total_investment;
    AnalysisSummary {
        total_investment: state.total_investment,
        current_value,
        total_yield,
        total_yield_percentage: percentage(total_yield, state.total_investment),
    }
}

pub fn assemble(
    fund: Fund,
    summary: AnalysisSummary,
    details: Vec<MonthlyDetail>,
    include_details: bool,
) -> AnalysisResponse {
    AnalysisResponse::new(fund, summary, include_details.then_some(details))
}
