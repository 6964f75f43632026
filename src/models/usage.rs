use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

const BYTES_PER_GB: f64 = (1u64 << 30) as f64;

pub fn bytes_to_gb(bytes: i64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsageSummary {
    pub bytes_up: i64,
    pub bytes_down: i64,
    pub total_bytes_used: i64,
    pub gb_used: f64,
    /// `None` means the plan is unlimited (or there is no active plan).
    pub gb_total: Option<i32>,
    /// Percentage of the cap consumed; only present for capped plans.
    pub percent_used: Option<f64>,
    pub subscription_id: Option<Uuid>,
    pub plan_name: Option<String>,
}

impl UsageSummary {
    pub fn empty() -> Self {
        Self {
            bytes_up: 0,
            bytes_down: 0,
            total_bytes_used: 0,
            gb_used: 0.0,
            gb_total: None,
            percent_used: None,
            subscription_id: None,
            plan_name: None,
        }
    }

    pub fn percent_of_cap(gb_used: f64, gb_total: Option<i32>) -> Option<f64> {
        match gb_total {
            Some(cap) if cap > 0 => Some(gb_used / cap as f64 * 100.0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_gb() {
        assert_eq!(bytes_to_gb(0), 0.0);
        assert_eq!(bytes_to_gb(1 << 30), 1.0);
        assert_eq!(bytes_to_gb(5 * (1 << 30)), 5.0);
        assert_eq!(bytes_to_gb((1 << 30) / 2), 0.5);
    }

    #[test]
    fn test_percent_of_cap() {
        assert_eq!(UsageSummary::percent_of_cap(50.0, Some(100)), Some(50.0));
        assert_eq!(UsageSummary::percent_of_cap(1.0, None), None);
        assert_eq!(UsageSummary::percent_of_cap(1.0, Some(0)), None);
    }

    #[test]
    fn test_empty_summary() {
        let summary = UsageSummary::empty();
        assert_eq!(summary.total_bytes_used, 0);
        assert_eq!(summary.gb_total, None);
        assert_eq!(summary.subscription_id, None);
    }
}
