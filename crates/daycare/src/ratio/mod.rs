//! Staff-to-child ratio engine.
//!
//! Everything here is a pure function of an already-fetched snapshot: the
//! children checked in to a room and the number of on-duty staff. Callers are
//! responsible for reading both counts at the same instant.

mod age;
mod group;
mod policy;
mod status;

#[cfg(test)]
mod tests;

pub use age::calculate_age_in_months;
pub use group::{ChildRatioInput, RatioGroup};
pub use policy::{EffectiveRatio, RatioPolicy};
pub use status::{status_indicator, RatioStatus, StatusIndicator};
