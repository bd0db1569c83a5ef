#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter criteria and grouped-count result types.
//!
//! [`FilterCriteria`] describes one dashboard interaction: a date window,
//! category and region selections, and an arrest outcome. The count types
//! are the chart-ready outputs of the aggregations.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use crime_explorer_source_models::{Incident, RegionId};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Maximum number of categories returned by the category aggregate.
pub const TOP_CATEGORIES: usize = 15;

/// Maximum number of regions returned by the region aggregate.
pub const TOP_REGIONS: usize = 25;

/// Membership constraint on one dimension.
///
/// `Unconstrained` admits every value. It is what an empty selection in the
/// UI means, so [`Selection::from_values`] maps an empty input to it rather
/// than to a restriction that matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "camelCase")]
pub enum Selection<T: Ord> {
    /// No constraint on this dimension.
    Unconstrained,
    /// Only the listed values are admitted.
    Restricted(BTreeSet<T>),
}

impl<T: Ord> Selection<T> {
    /// Builds a selection from user-chosen values; no values means
    /// [`Selection::Unconstrained`].
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        let set: BTreeSet<T> = values.into_iter().collect();
        if set.is_empty() {
            Self::Unconstrained
        } else {
            Self::Restricted(set)
        }
    }

    /// Returns `true` if `value` passes this selection.
    #[must_use]
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Restricted(set) => set.contains(value),
        }
    }

    /// Selected values, or `None` when unconstrained.
    #[must_use]
    pub const fn restricted(&self) -> Option<&BTreeSet<T>> {
        match self {
            Self::Unconstrained => None,
            Self::Restricted(set) => Some(set),
        }
    }
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Self::Unconstrained
    }
}

/// Arrest outcome constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Outcome {
    /// Arrested or not.
    #[default]
    Any,
    /// Only incidents where an arrest was made.
    Arrested,
    /// Only incidents without an arrest.
    NotArrested,
}

impl Outcome {
    /// Returns `true` if an incident with the given arrest flag passes.
    #[must_use]
    pub const fn admits(self, arrest_made: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Arrested => arrest_made,
            Self::NotArrested => !arrest_made,
        }
    }
}

/// Inclusive range of calendar days.
///
/// Admits timestamps `t` with `start 00:00 <= t < (end + 1 day) 00:00`, so
/// the whole end day is included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A window that admits every representable timestamp.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(NaiveDate::MIN, NaiveDate::MAX)
    }

    /// First admitted instant.
    #[must_use]
    pub fn lower_bound(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// First instant past the window, or `None` if the day after `end` is
    /// not representable.
    #[must_use]
    pub fn upper_bound(&self) -> Option<NaiveDateTime> {
        self.end
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN))
    }

    /// Returns `true` if `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: &NaiveDateTime) -> bool {
        *at >= self.lower_bound() && self.upper_bound().is_none_or(|upper| *at < upper)
    }
}

/// Conjunction of the dashboard's filter predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub window: DateWindow,
    pub categories: Selection<String>,
    pub regions: Selection<RegionId>,
    pub outcome: Outcome,
}

impl FilterCriteria {
    /// Criteria constrained only by `window`.
    #[must_use]
    pub const fn within(window: DateWindow) -> Self {
        Self {
            window,
            categories: Selection::Unconstrained,
            regions: Selection::Unconstrained,
            outcome: Outcome::Any,
        }
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Selection<String>) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn with_regions(mut self, regions: Selection<RegionId>) -> Self {
        self.regions = regions;
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Returns `true` if `incident` passes every predicate.
    #[must_use]
    pub fn matches(&self, incident: &Incident) -> bool {
        self.window.contains(&incident.occurred_at)
            && self.categories.admits(&incident.category)
            && self.regions.admits(&incident.region_id)
            && self.outcome.admits(incident.arrest_made)
    }
}

/// Incidents on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Incidents in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Incidents in one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyCount {
    /// Hour of the day, 0-23.
    pub hour: u32,
    pub count: u64,
}

/// Incidents in one community area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCount {
    pub region: RegionId,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_values_are_unconstrained() {
        let selection: Selection<String> = Selection::from_values(Vec::new());
        assert_eq!(selection, Selection::Unconstrained);
        assert!(selection.admits(&"ANYTHING".to_string()));
    }

    #[test]
    fn restricted_selection_checks_membership() {
        let selection = Selection::from_values(["THEFT".to_string()]);
        assert!(selection.admits(&"THEFT".to_string()));
        assert!(!selection.admits(&"BATTERY".to_string()));
    }

    #[test]
    fn window_includes_whole_end_day() {
        let window = DateWindow::new(day(2024, 1, 1), day(2024, 1, 31));
        let last_second = day(2024, 1, 31).and_hms_opt(23, 59, 59).unwrap();
        let next_midnight = day(2024, 2, 1).and_hms_opt(0, 0, 0).unwrap();
        let first_instant = day(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        assert!(window.contains(&last_second));
        assert!(window.contains(&first_instant));
        assert!(!window.contains(&next_midnight));
    }

    #[test]
    fn unbounded_window_admits_extremes() {
        let window = DateWindow::unbounded();
        assert!(window.upper_bound().is_none());
        assert!(window.contains(&NaiveDateTime::MAX));
        assert!(window.contains(&NaiveDateTime::MIN));
    }

    #[test]
    fn outcome_parses_case_insensitively() {
        assert_eq!("ARRESTED".parse::<Outcome>().unwrap(), Outcome::Arrested);
        assert_eq!("not_arrested".parse::<Outcome>().unwrap(), Outcome::NotArrested);
        assert!("sometimes".parse::<Outcome>().is_err());
        assert_eq!(Outcome::NotArrested.to_string(), "not_arrested");
    }

    #[test]
    fn outcome_admits_by_flag() {
        assert!(Outcome::Any.admits(true) && Outcome::Any.admits(false));
        assert!(Outcome::Arrested.admits(true) && !Outcome::Arrested.admits(false));
        assert!(!Outcome::NotArrested.admits(true) && Outcome::NotArrested.admits(false));
    }

    #[test]
    fn selection_serializes_tagged() {
        let selection = Selection::from_values(["8".to_string()]);
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "restricted", "values": ["8"]}));
    }
}
