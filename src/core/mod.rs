//! Core business logic abstractions

pub mod analysis;
pub mod cache;
pub mod config;
pub mod fund;
pub mod log;
pub mod price;

// Re-export main types for cleaner imports
pub use fund::{Fund, FundRepository};
pub use price::{PriceObservation, PriceSeriesProvider};
