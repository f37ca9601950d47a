// Dashboard usage metrics, aggregated from simple per-user counts.

pub mod handlers;
pub mod metrics;
