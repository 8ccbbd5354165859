//! Headline statistics shown above the views.

use serde::{Deserialize, Serialize};

use ev_core::models::DashboardViews;

/// The four headline figures for a filtered record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Records in the filtered set, whether or not any view could use them.
    pub total_vehicles: usize,
    /// Manufacturer with the highest mean range.
    pub top_manufacturer: Option<String>,
    /// Mean range of `top_manufacturer`.
    pub top_average_range: Option<u32>,
    /// Latest model year present.
    pub latest_year: Option<i32>,
}

impl DashboardSummary {
    /// Derive the summary from the filtered count and its views.
    pub fn from_views(total_vehicles: usize, views: &DashboardViews) -> Self {
        let top = views.ranked.first();
        Self {
            total_vehicles,
            top_manufacturer: top.map(|r| r.label.clone()),
            top_average_range: top.map(|r| r.average_range),
            latest_year: views.trend.last().map(|p| p.period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_core::models::{RankedAverage, TrendPoint};

    #[test]
    fn test_summary_from_views() {
        let views = DashboardViews {
            trend: vec![
                TrendPoint { period: 2019, count: 4 },
                TrendPoint { period: 2024, count: 1 },
            ],
            distribution: vec![],
            ranked: vec![
                RankedAverage { label: "JAGUAR".to_string(), average_range: 234 },
                RankedAverage { label: "KIA".to_string(), average_range: 120 },
            ],
        };
        let summary = DashboardSummary::from_views(7, &views);
        assert_eq!(summary.total_vehicles, 7);
        assert_eq!(summary.top_manufacturer.as_deref(), Some("JAGUAR"));
        assert_eq!(summary.top_average_range, Some(234));
        assert_eq!(summary.latest_year, Some(2024));
    }

    #[test]
    fn test_summary_of_empty_views() {
        let summary = DashboardSummary::from_views(3, &DashboardViews::default());
        assert_eq!(summary.total_vehicles, 3);
        assert!(summary.top_manufacturer.is_none());
        assert!(summary.top_average_range.is_none());
        assert!(summary.latest_year.is_none());
    }
}
