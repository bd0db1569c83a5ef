#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Typed incident table produced by the normalizer.
//!
//! Raw open-data records arrive as untyped JSON objects ([`RawRecord`]).
//! After normalization every row is an [`Incident`] with all mandatory
//! fields present and its calendar sub-fields derived once. Rows are held
//! in an immutable [`IncidentTable`]; filtering produces borrowed
//! [`IncidentView`]s and never touches the table itself.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// One record exactly as decoded from the remote JSON array.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Marker substituted for missing optional text so consumers never see an
/// absent value.
pub const MISSING_TEXT: &str = "N/A";

/// `strftime` format of [`Incident::date_display`].
pub const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Day of the week, serialized as its full English name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// Administrative sub-area identifier (a Chicago community area).
///
/// The source publishes these as numbers or as text depending on the
/// dataset vintage, so the identifier carries a tag recording whether its
/// label parsed as a finite number. Equality and hashing use the label
/// only. Ordering puts numeric identifiers first (by value) and text
/// identifiers after them (by label).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegionId {
    /// Label that parses as a finite number.
    Numeric {
        /// Label as received.
        label: String,
        /// Parsed numeric value of the label.
        value: f64,
    },
    /// Label that is not numeric.
    Text(String),
}

impl RegionId {
    /// Classifies `label` as numeric when it parses as a finite number.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        match label.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Numeric { label, value },
            _ => Self::Text(label),
        }
    }

    /// Returns the identifier as received.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Numeric { label, .. } | Self::Text(label) => label,
        }
    }

    /// Returns `true` if the label parsed as a number.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric { .. })
    }
}

impl From<String> for RegionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<RegionId> for String {
    fn from(value: RegionId) -> Self {
        match value {
            RegionId::Numeric { label, .. } | RegionId::Text(label) => label,
        }
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl PartialEq for RegionId {
    fn eq(&self, other: &Self) -> bool {
        self.label() == other.label()
    }
}

impl Eq for RegionId {}

impl Hash for RegionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label().hash(state);
    }
}

impl PartialOrd for RegionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RegionId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                Self::Numeric { label: a, value: x },
                Self::Numeric { label: b, value: y },
            ) => x.total_cmp(y).then_with(|| a.cmp(b)),
            (Self::Numeric { .. }, Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Numeric { .. }) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

/// Coerced fields of one admitted row, before calendar derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentFields {
    /// When the crime occurred (source wall-clock time).
    pub occurred_at: NaiveDateTime,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Primary classification label (e.g. `"THEFT"`).
    pub category: String,
    /// Community area the incident occurred in.
    pub region_id: RegionId,
    /// Whether an arrest was made.
    pub arrest_made: bool,
    /// Whether this was a domestic incident.
    pub is_domestic: bool,
    /// Secondary description (e.g. `"$500 AND UNDER"`).
    pub description: String,
    /// Block-level address (e.g. `"001XX N STATE ST"`).
    pub block: String,
    /// Type of location (e.g. `"STREET"`).
    pub location_description: String,
}

impl IncidentFields {
    /// Creates fields with both flags `false` and every optional text set
    /// to [`MISSING_TEXT`].
    #[must_use]
    pub fn new(
        occurred_at: NaiveDateTime,
        latitude: f64,
        longitude: f64,
        category: impl Into<String>,
        region_id: impl Into<RegionId>,
    ) -> Self {
        Self {
            occurred_at,
            latitude,
            longitude,
            category: category.into(),
            region_id: region_id.into(),
            arrest_made: false,
            is_domestic: false,
            description: MISSING_TEXT.to_string(),
            block: MISSING_TEXT.to_string(),
            location_description: MISSING_TEXT.to_string(),
        }
    }

    /// Sets the arrest flag.
    #[must_use]
    pub fn with_arrest(mut self, arrest_made: bool) -> Self {
        self.arrest_made = arrest_made;
        self
    }
}

/// A normalized crime incident.
///
/// The calendar fields are derived from `occurred_at` when the incident is
/// built and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub occurred_at: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub region_id: RegionId,
    pub arrest_made: bool,
    pub is_domestic: bool,
    pub description: String,
    pub block: String,
    pub location_description: String,
    pub year: i32,
    /// Month of the year, 1-12.
    pub month: u32,
    pub day_of_week: DayOfWeek,
    /// Hour of the day, 0-23.
    pub hour: u32,
    /// `occurred_at` rendered with [`DATE_DISPLAY_FORMAT`].
    pub date_display: String,
}

impl Incident {
    /// Builds an incident and derives its calendar fields.
    #[must_use]
    pub fn new(fields: IncidentFields) -> Self {
        let at = fields.occurred_at;
        Self {
            year: at.year(),
            month: at.month(),
            day_of_week: at.weekday().into(),
            hour: at.hour(),
            date_display: at.format(DATE_DISPLAY_FORMAT).to_string(),
            occurred_at: fields.occurred_at,
            latitude: fields.latitude,
            longitude: fields.longitude,
            category: fields.category,
            region_id: fields.region_id,
            arrest_made: fields.arrest_made,
            is_domestic: fields.is_domestic,
            description: fields.description,
            block: fields.block,
            location_description: fields.location_description,
        }
    }

    /// Calendar day the incident occurred on.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.occurred_at.date()
    }
}

impl From<IncidentFields> for Incident {
    fn from(fields: IncidentFields) -> Self {
        Self::new(fields)
    }
}

/// Immutable, cheaply clonable table of incidents in fetch order.
#[derive(Debug, Clone, Default)]
pub struct IncidentTable {
    rows: Arc<[Incident]>,
}

impl IncidentTable {
    /// Wraps `rows` without reordering them.
    #[must_use]
    pub fn new(rows: Vec<Incident>) -> Self {
        Self { rows: rows.into() }
    }

    /// An empty table, used as the sentinel after a failed load.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in fetch order.
    #[must_use]
    pub fn rows(&self) -> &[Incident] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Incident> {
        self.rows.iter()
    }

    /// A view over every row.
    #[must_use]
    pub fn view(&self) -> IncidentView<'_> {
        self.rows.iter().collect()
    }

    /// Earliest and latest calendar day present, or `None` when empty.
    #[must_use]
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        date_bounds(self.rows.iter())
    }
}

impl FromIterator<Incident> for IncidentTable {
    fn from_iter<T: IntoIterator<Item = Incident>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IncidentTable {
    type Item = &'a Incident;
    type IntoIter = std::slice::Iter<'a, Incident>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Order-preserving selection of rows borrowed from an [`IncidentTable`].
#[derive(Debug, Clone, Default)]
pub struct IncidentView<'a> {
    rows: Vec<&'a Incident>,
}

impl<'a> IncidentView<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[&'a Incident] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Incident> + '_ {
        self.rows.iter().copied()
    }

    /// Earliest and latest calendar day present, or `None` when empty.
    #[must_use]
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        date_bounds(self.iter())
    }

    /// Clones the selected rows out of the table.
    #[must_use]
    pub fn to_incidents(&self) -> Vec<Incident> {
        self.rows.iter().map(|row| (*row).clone()).collect()
    }
}

impl<'a> FromIterator<&'a Incident> for IncidentView<'a> {
    fn from_iter<T: IntoIterator<Item = &'a Incident>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl Serialize for IncidentView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows.iter())
    }
}

fn date_bounds<'a>(rows: impl Iterator<Item = &'a Incident>) -> Option<(NaiveDate, NaiveDate)> {
    rows.map(Incident::date).fold(None, |bounds, day| match bounds {
        None => Some((day, day)),
        Some((lo, hi)) => Some((lo.min(day), hi.max(day))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn derives_calendar_fields() {
        let incident = Incident::new(IncidentFields::new(
            at("2024-01-15 14:30:05"),
            41.88,
            -87.63,
            "THEFT",
            "32",
        ));
        assert_eq!(incident.year, 2024);
        assert_eq!(incident.month, 1);
        assert_eq!(incident.day_of_week, DayOfWeek::Monday);
        assert_eq!(incident.hour, 14);
        assert_eq!(incident.date_display, "2024-01-15 14:30:05");
        assert_eq!(incident.description, MISSING_TEXT);
    }

    #[test]
    fn day_of_week_serializes_full_name() {
        let json = serde_json::to_string(&DayOfWeek::Wednesday).unwrap();
        assert_eq!(json, "\"Wednesday\"");
        assert_eq!(DayOfWeek::Sunday.to_string(), "Sunday");
    }

    #[test]
    fn region_id_classifies_labels() {
        assert!(RegionId::new("25").is_numeric());
        assert!(RegionId::new("25.0").is_numeric());
        assert!(!RegionId::new("two").is_numeric());
        assert!(!RegionId::new("NaN").is_numeric());
        assert!(!RegionId::new("inf").is_numeric());
    }

    #[test]
    fn region_id_orders_numeric_before_text() {
        let mut ids: Vec<RegionId> = ["two", "12", "3", "alpha"]
            .into_iter()
            .map(RegionId::from)
            .collect();
        ids.sort();
        let labels: Vec<&str> = ids.iter().map(RegionId::label).collect();
        assert_eq!(labels, ["3", "12", "alpha", "two"]);
    }

    #[test]
    fn region_id_serializes_as_label() {
        let id = RegionId::new("8");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"8\"");
        let back: RegionId = serde_json::from_str("\"8\"").unwrap();
        assert_eq!(back, id);
        assert!(back.is_numeric());
    }

    #[test]
    fn view_preserves_table_order() {
        let table: IncidentTable = [
            "2024-01-03 00:00:00",
            "2024-01-01 00:00:00",
            "2024-01-02 00:00:00",
        ]
        .into_iter()
        .map(|s| Incident::new(IncidentFields::new(at(s), 1.0, 1.0, "THEFT", "1")))
        .collect();

        let view = table.view();
        let days: Vec<u32> = view.iter().map(|i| i.date().day()).collect();
        assert_eq!(days, [3, 1, 2]);
        assert_eq!(
            table.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
            ))
        );
    }

    #[test]
    fn empty_table_has_no_bounds() {
        assert!(IncidentTable::empty().is_empty());
        assert_eq!(IncidentTable::empty().date_bounds(), None);
    }
}
