// Subscription paywall: monthly search allowance for the free tier, unlimited premium.
// The checkout itself happens at the payment provider; `activate` is the hook the
// client calls once checkout succeeds.

pub mod allowance;
pub mod handlers;
pub mod metering;
pub mod store;
