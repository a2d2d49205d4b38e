//! Cost rates and per-day cost breakdowns
//!
//! Every charge the simulation makes is priced from [`CostRates`] and booked
//! into the [`CostBreakdown`] of the day on which it happened.

pub mod rates;

pub use rates::{CostBreakdown, CostRates};
