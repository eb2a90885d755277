//! Daycare operations core: roster bookkeeping, role-gated access, and the
//! staff-to-child ratio engine surfaced by the classroom screens.

pub mod auth;
pub mod config;
pub mod dates;
pub mod error;
pub mod ratio;
pub mod roster;
pub mod telemetry;
