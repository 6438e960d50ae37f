//! Monthly contribution amounts under a yearly escalation rule.

use super::model::{ContributionPlan, EscalationKind, EscalationRule};
use chrono::{Datelike, NaiveDate};

/// How far a contribution month lies from the plan start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elapsed {
    /// The calendar month the plan started in.
    StartMonth,
    /// January right after a December start. Counted as a new calendar year
    /// but contributes the unescalated base amount.
    JanuaryAfterDecemberStart,
    /// Calendar years between the start and the contribution month.
    Years(i32),
}

impl Elapsed {
    pub fn between(start: NaiveDate, current: NaiveDate) -> Self {
        if current.year() == start.year() && current.month() == start.month() {
            return Elapsed::StartMonth;
        }
        let years = current.year() - start.year();
        if years == 1 && start.month() == 12 && current.month() == 1 {
            return Elapsed::JanuaryAfterDecemberStart;
        }
        Elapsed::Years(years)
    }
}

/// Contribution owed for the month containing `current`.
pub fn contribution(plan: &ContributionPlan, current: NaiveDate) -> f64 {
    escalate(
        plan.monthly_base,
        Elapsed::between(plan.start_date, current),
        &plan.escalation,
    )
}

pub fn escalate(base: f64, elapsed: Elapsed, rule: &EscalationRule) -> f64 {
    match elapsed {
        Elapsed::StartMonth => 0.0,
        _ if rule.value == 0.0 => base,
        Elapsed::JanuaryAfterDecemberStart => base,
        Elapsed::Years(years) if years <= 0 => base,
        Elapsed::Years(years) => match rule.kind {
            EscalationKind::Percentage => base * (1.0 + rule.value / 100.0).powi(years),
            EscalationKind::Amount => base + rule.value * f64::from(years),
        },
    }
}
