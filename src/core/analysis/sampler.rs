//! Reduces an irregular trading-day price series to one price per month.
//!
//! Valid observations are kept in a date-sorted arena. A month table maps
//! every calendar month between the first and last observation to the slice
//! of the arena it covers, so looking up a month is an offset computation.

use crate::core::price::PriceObservation;
use chrono::{Datelike, NaiveDate};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

/// An observation with a usable price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MonthlyIndex {
    points: Vec<PricePoint>,
    first_month: Option<MonthKey>,
    months: Vec<Range<usize>>,
}

impl MonthlyIndex {
    /// Builds the index, dropping observations without a usable price.
    pub fn build<'a>(series: impl IntoIterator<Item = &'a PriceObservation>) -> Self {
        let mut points: Vec<PricePoint> = series
            .into_iter()
            .filter_map(|obs| {
                obs.usable_price().map(|price| PricePoint {
                    date: obs.date,
                    price,
                })
            })
            .collect();
        points.sort_by_key(|p| p.date);

        let first_month = points.first().map(|p| MonthKey::of(p.date));
        let mut months: Vec<Range<usize>> = Vec::new();
        if let Some(first) = first_month {
            for (i, point) in points.iter().enumerate() {
                let slot = (MonthKey::of(point.date).ordinal() - first.ordinal()) as usize;
                while months.len() <= slot {
                    months.push(i..i);
                }
                months[slot].end = i + 1;
            }
        }

        Self {
            points,
            first_month,
            months,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest valid observation of the whole series.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// All valid observations of `key`, ascending.
    pub fn month(&self, key: MonthKey) -> &[PricePoint] {
        let Some(first) = self.first_month else {
            return &[];
        };
        let offset = key.ordinal() - first.ordinal();
        if offset < 0 {
            return &[];
        }
        match self.months.get(offset as usize) {
            Some(range) => &self.points[range.clone()],
            None => &[],
        }
    }

    /// The representative observation of `key` for the given target day.
    pub fn sample(&self, key: MonthKey, target_day: u32) -> Option<&PricePoint> {
        select(self.month(key), target_day)
    }
}

/// Picks the latest day not later than `target_day`, falling back to the
/// first observation of the month when every day is later.
pub fn select(candidates: &[PricePoint], target_day: u32) -> Option<&PricePoint> {
    let mut chosen: Option<&PricePoint> = None;
    for candidate in candidates {
        match chosen {
            None => chosen = Some(candidate),
            Some(stored) => {
                let day = candidate.date.day();
                let stored_day = stored.date.day();
                if day <= target_day && (stored_day > target_day || day > stored_day) {
                    chosen = Some(candidate);
                }
            }
        }
    }
    chosen
}
