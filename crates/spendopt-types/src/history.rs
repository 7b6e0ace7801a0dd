//! Daily campaign history as supplied by the stats backend

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of campaign activity
///
/// Leads are signed so that bad rows from upstream exports deserialize and can
/// be filtered out by the engine instead of failing the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    /// Day of the observation ("YYYY-MM-DD")
    pub date: String,
    /// Ad spend for the day in USD
    #[serde(default)]
    pub ad_spend: f64,
    /// Leads generated that day
    #[serde(default)]
    pub leads: i64,
}

impl HistoryPoint {
    pub fn new(date: impl Into<String>, ad_spend: f64, leads: i64) -> Self {
        Self {
            date: date.into(),
            ad_spend,
            leads,
        }
    }

    /// Parse `date` as an ISO calendar day
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// True if the point can take part in a spend/leads regression
    pub fn is_usable(&self) -> bool {
        self.ad_spend.is_finite() && self.ad_spend > 0.0 && self.leads >= 0
    }
}
