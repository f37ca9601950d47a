use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::search_limits::SearchLimitsRow;

/// Searches per calendar month on the free tier.
pub const FREE_MONTHLY_SEARCHES: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
        }
    }

    /// An active subscription is premium regardless of the stored type label.
    pub fn of(row: &SearchLimitsRow) -> Self {
        if row.subscription_active {
            SubscriptionTier::Premium
        } else {
            SubscriptionTier::Free
        }
    }
}

/// What a user may still do this month. `None` limits mean unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchAllowance {
    pub tier: SubscriptionTier,
    pub searches_used: u32,
    pub max_searches: Option<u32>,
    pub remaining: Option<u32>,
    pub period_start: NaiveDate,
}

impl SearchAllowance {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

pub fn current_period_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

/// Allowance for `today`. A row last touched in an earlier month counts as unused.
pub fn evaluate(row: &SearchLimitsRow, today: NaiveDate) -> SearchAllowance {
    let period_start = current_period_start(today);
    let searches_used = if row.period_start < period_start {
        0
    } else {
        u32::try_from(row.searches_used).unwrap_or(0)
    };

    match SubscriptionTier::of(row) {
        SubscriptionTier::Premium => SearchAllowance {
            tier: SubscriptionTier::Premium,
            searches_used,
            max_searches: None,
            remaining: None,
            period_start,
        },
        SubscriptionTier::Free => {
            let max = u32::try_from(row.max_searches).unwrap_or(0);
            SearchAllowance {
                tier: SubscriptionTier::Free,
                searches_used,
                max_searches: Some(max),
                remaining: Some(max.saturating_sub(searches_used)),
                period_start,
            }
        }
    }
}
