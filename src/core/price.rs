//! Price series abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single unit price (NAV) reported for a fund on a trading day.
///
/// `price` is `None` when the source published a row without a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub code: String,
    pub date: NaiveDate,
    pub price: Option<f64>,
}

impl PriceObservation {
    pub fn new(code: &str, date: NaiveDate, price: Option<f64>) -> Self {
        Self {
            code: code.to_string(),
            date,
            price,
        }
    }

    /// Returns the price if it can be used to buy units.
    pub fn usable_price(&self) -> Option<f64> {
        self.price.filter(|p| p.is_finite() && *p > 0.0)
    }
}

#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Observations for `code` with `start <= date <= end`, ascending by date.
    async fn get_range(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_price() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            PriceObservation::new("AFT", date, Some(1.5)).usable_price(),
            Some(1.5)
        );
        assert_eq!(PriceObservation::new("AFT", date, None).usable_price(), None);
        assert_eq!(
            PriceObservation::new("AFT", date, Some(0.0)).usable_price(),
            None
        );
        assert_eq!(
            PriceObservation::new("AFT", date, Some(f64::NAN)).usable_price(),
            None
        );
    }
}
