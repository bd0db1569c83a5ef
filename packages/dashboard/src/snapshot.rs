//! Per-interaction dashboard output.
//!
//! A [`DashboardSnapshot`] is everything a presentation layer needs for one
//! filter state: the matching rows, capped map points, the four chart
//! series, and any notices. [`FilterOptions`] lists the values a sidebar
//! should offer and the default criteria for a fresh session.

use chrono::{Days, NaiveDate};
use crime_explorer_analytics::aggregate::{by_category, by_day, by_hour, by_region};
use crime_explorer_analytics::filter::filter;
use crime_explorer_analytics_models::{
    CategoryCount, DailyCount, DateWindow, FilterCriteria, HourlyCount, Outcome, RegionCount,
    Selection,
};
use crime_explorer_source_models::{Incident, IncidentTable, IncidentView, RegionId};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::notice::{Notice, NoticeKind};

/// Choices and defaults derived from the loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct categories, sorted alphabetically.
    pub categories: Vec<String>,
    /// Distinct regions, numeric identifiers first in numeric order.
    pub regions: Vec<RegionId>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// Criteria for a fresh session.
    pub defaults: FilterCriteria,
}

impl FilterOptions {
    /// Collects the options present in `table`.
    ///
    /// The default window ends at the latest incident and spans
    /// `default_lookback_days`, clipped to the earliest incident. The
    /// default category selection is the first `default_category_count`
    /// categories alphabetically; every region is selected.
    #[must_use]
    pub fn from_table(table: &IncidentTable, config: &DashboardConfig) -> Self {
        let mut categories: Vec<String> = table.iter().map(|i| i.category.clone()).collect();
        categories.sort_unstable();
        categories.dedup();

        let mut regions: Vec<RegionId> = table.iter().map(|i| i.region_id.clone()).collect();
        regions.sort_unstable();
        regions.dedup();

        let bounds = table.date_bounds();
        let window = bounds.map_or_else(DateWindow::unbounded, |(min, max)| {
            let start = max
                .checked_sub_days(Days::new(config.default_lookback_days))
                .map_or(min, |start| start.max(min));
            DateWindow::new(start, max)
        });

        let defaults = FilterCriteria::within(window)
            .with_categories(Selection::from_values(
                categories
                    .iter()
                    .take(config.default_category_count)
                    .cloned(),
            ))
            .with_regions(Selection::Unconstrained)
            .with_outcome(Outcome::Any);

        Self {
            categories,
            regions,
            min_date: bounds.map(|(min, _)| min),
            max_date: bounds.map(|(_, max)| max),
            defaults,
        }
    }
}

/// Location and tooltip text for one map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint<'a> {
    pub latitude: f64,
    pub longitude: f64,
    pub category: &'a str,
    pub description: &'a str,
    pub block: &'a str,
    pub date_display: &'a str,
}

impl<'a> From<&'a Incident> for MapPoint<'a> {
    fn from(incident: &'a Incident) -> Self {
        Self {
            latitude: incident.latitude,
            longitude: incident.longitude,
            category: &incident.category,
            description: &incident.description,
            block: &incident.block,
            date_display: &incident.date_display,
        }
    }
}

/// Filtered rows and chart series for one filter state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot<'a> {
    pub criteria: FilterCriteria,
    pub total_matching: usize,
    pub incidents: IncidentView<'a>,
    pub map_points: Vec<MapPoint<'a>>,
    pub by_day: Vec<DailyCount>,
    pub by_category: Vec<CategoryCount>,
    pub by_hour: Vec<HourlyCount>,
    /// `None` when exactly one region is selected.
    pub by_region: Option<Vec<RegionCount>>,
    pub notices: Vec<Notice>,
}

impl<'a> DashboardSnapshot<'a> {
    /// Filters `table` by `criteria` and computes every summary.
    #[must_use]
    pub fn build(table: &'a IncidentTable, criteria: FilterCriteria, map_point_cap: usize) -> Self {
        let view = filter(table, &criteria);
        let mut notices = Vec::new();

        if view.is_empty() {
            notices.push(NoticeKind::NoMatches.into());
            notices.push(NoticeKind::NoMapPoints.into());
        } else if view.len() > map_point_cap {
            notices.push(
                NoticeKind::MapTruncated {
                    total: view.len(),
                    shown: map_point_cap,
                }
                .into(),
            );
        }

        let single_region = criteria
            .regions
            .restricted()
            .filter(|set| set.len() == 1)
            .and_then(|set| set.first().cloned());
        let region_chart = match single_region {
            Some(region) => {
                notices.push(NoticeKind::SingleRegion { region }.into());
                None
            }
            None => Some(by_region(&view)),
        };

        Self {
            total_matching: view.len(),
            map_points: view.iter().take(map_point_cap).map(MapPoint::from).collect(),
            by_day: by_day(&view),
            by_category: by_category(&view),
            by_hour: by_hour(&view),
            by_region: region_chart,
            incidents: view,
            criteria,
            notices,
        }
    }
}
