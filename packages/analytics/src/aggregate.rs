//! Grouped-count summaries of a filtered view.
//!
//! Each function is an independent reduction over an [`IncidentView`] and
//! returns a fresh, chart-ready series.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use crime_explorer_analytics_models::{
    CategoryCount, DailyCount, HourlyCount, RegionCount, TOP_CATEGORIES, TOP_REGIONS,
};
use crime_explorer_source_models::{IncidentView, RegionId};

/// Incidents per calendar day from the first to the last day present.
///
/// The series is dense: days inside that span with no incidents appear with
/// a zero count. An empty view yields an empty series.
#[must_use]
pub fn by_day(view: &IncidentView<'_>) -> Vec<DailyCount> {
    let Some((first, last)) = view.date_bounds() else {
        return Vec::new();
    };

    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for incident in view.iter() {
        *counts.entry(incident.date()).or_default() += 1;
    }

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| DailyCount {
            date,
            count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// The [`TOP_CATEGORIES`] most frequent categories, most frequent first.
///
/// Equal counts are ordered by category name.
#[must_use]
pub fn by_category(view: &IncidentView<'_>) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for incident in view.iter() {
        *counts.entry(incident.category.as_str()).or_default() += 1;
    }

    let mut series: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    series.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    series.truncate(TOP_CATEGORIES);
    series
}

/// Incidents per hour of the day, always 24 entries ordered by hour.
#[must_use]
pub fn by_hour(view: &IncidentView<'_>) -> Vec<HourlyCount> {
    let mut counts = [0u64; 24];
    for incident in view.iter() {
        if let Some(slot) = usize::try_from(incident.hour)
            .ok()
            .and_then(|hour| counts.get_mut(hour))
        {
            *slot += 1;
        }
    }

    (0u32..)
        .zip(counts)
        .map(|(hour, count)| HourlyCount { hour, count })
        .collect()
}

/// Incidents per community area, at most [`TOP_REGIONS`] entries.
///
/// When every region identifier is numeric the series is ordered by
/// identifier ascending. Otherwise it falls back to count descending, with
/// equal counts ordered by identifier.
#[must_use]
pub fn by_region(view: &IncidentView<'_>) -> Vec<RegionCount> {
    let mut counts: BTreeMap<&RegionId, u64> = BTreeMap::new();
    for incident in view.iter() {
        *counts.entry(&incident.region_id).or_default() += 1;
    }

    let all_numeric = counts.keys().all(|region| region.is_numeric());

    let mut series: Vec<RegionCount> = counts
        .into_iter()
        .map(|(region, count)| RegionCount {
            region: region.clone(),
            count,
        })
        .collect();

    if !all_numeric {
        log::debug!("Non-numeric community area present; ordering regions by count");
        series.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.region.cmp(&b.region)));
    }
    series.truncate(TOP_REGIONS);
    series
}
