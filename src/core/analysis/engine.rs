//! Month-by-month periodic-investment simulation.

use super::aggregate::percentage;
use super::model::{ContributionPlan, MonthlyDetail};
use super::sampler::{MonthKey, MonthlyIndex, PricePoint};
use super::schedule;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which day of month each month's sample is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchoring {
    /// Aim at the day of the observation used for the previous month.
    #[default]
    Drift,
    /// Always aim at the day of month the analysis runs on.
    Fixed,
}

/// Running totals of one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationState {
    pub total_investment: f64,
    pub total_units: f64,
    pub previous_period_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub state: SimulationState,
    pub details: Vec<MonthlyDetail>,
}

struct Cursor {
    month: MonthKey,
    target_day: u32,
    anchor_day: u32,
}

impl Cursor {
    fn new(start: NaiveDate, target_day: u32) -> Self {
        Self {
            month: MonthKey::of(start),
            target_day,
            anchor_day: target_day,
        }
    }

    fn skip(&mut self) {
        self.month = self.month.next();
    }

    fn advance(&mut self, used: NaiveDate, anchoring: Anchoring) {
        self.month = MonthKey::of(used).next();
        self.target_day = match anchoring {
            Anchoring::Drift => used.day(),
            Anchoring::Fixed => self.anchor_day,
        };
    }
}

impl SimulationState {
    fn open(plan: &ContributionPlan) -> Self {
        Self {
            total_investment: plan.initial_investment,
            ..Self::default()
        }
    }

    /// Buys the initial lump sum. The first month has no baseline, so its
    /// period return is zero.
    fn first_month(&mut self, plan: &ContributionPlan, point: &PricePoint) -> MonthlyDetail {
        self.total_units = plan.initial_investment / point.price;
        let value = self.total_units * point.price;
        self.previous_period_value = value;
        MonthlyDetail {
            date: point.date,
            investment: 0.0,
            total_investment: self.total_investment,
            unit_price: point.price,
            units: self.total_units,
            total_units: self.total_units,
            value,
            yield_amount: value - self.total_investment,
            yield_percentage: 0.0,
        }
    }

    fn next_month(&mut self, plan: &ContributionPlan, point: &PricePoint) -> MonthlyDetail {
        let contribution = schedule::contribution(plan, point.date);
        let units = if contribution > 0.0 {
            contribution / point.price
        } else {
            0.0
        };
        if contribution > 0.0 {
            self.total_investment += contribution;
            self.total_units += units;
        }

        let value = self.total_units * point.price;
        let baseline = self.previous_period_value + contribution;
        self.previous_period_value = value;
        MonthlyDetail {
            date: point.date,
            investment: contribution,
            total_investment: self.total_investment,
            unit_price: point.price,
            units,
            total_units: self.total_units,
            value,
            yield_amount: value - self.total_investment,
            yield_percentage: percentage(value - baseline, baseline),
        }
    }
}

/// Runs `plan` over every month from its start through the month of `today`.
///
/// Sampling first aims at the day of month of `today`. Months without a
/// sample are skipped and leave the state unchanged.
pub fn simulate(
    plan: &ContributionPlan,
    index: &MonthlyIndex,
    today: NaiveDate,
    anchoring: Anchoring,
) -> Simulation {
    let mut state = SimulationState::open(plan);
    let mut details: Vec<MonthlyDetail> = Vec::new();
    let mut cursor = Cursor::new(plan.start_date, today.day());
    let through = MonthKey::of(today);

    while cursor.month <= through {
        let Some(point) = index.sample(cursor.month, cursor.target_day) else {
            debug!(
                "No price for {}-{:02}, skipping month",
                cursor.month.year, cursor.month.month
            );
            cursor.skip();
            continue;
        };

        let detail = if details.is_empty() {
            state.first_month(plan, point)
        } else {
            state.next_month(plan, point)
        };
        details.push(detail);
        cursor.advance(point.date, anchoring);
    }

    Simulation { state, details }
}
