#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime explorer server.
//!
//! These types are serialized to JSON for the REST API. Query parameters
//! arrive as strings and are resolved against the session defaults in
//! [`DashboardQueryParams::to_criteria`].

use chrono::{DateTime, NaiveDate, Utc};
use crime_explorer_analytics_models::{DateWindow, FilterCriteria, Outcome, Selection};
use crime_explorer_dashboard::notice::Notice;
use crime_explorer_dashboard::snapshot::{DashboardSnapshot, FilterOptions};
use crime_explorer_source_models::RegionId;
use serde::{Deserialize, Serialize};

/// Date format accepted by the `from` and `to` parameters.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// A query parameter that could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// `from` or `to` is not a `YYYY-MM-DD` date.
    #[error("Invalid {param} date {value:?}, expected YYYY-MM-DD")]
    InvalidDate {
        /// Parameter name.
        param: &'static str,
        /// Value as received.
        value: String,
    },

    /// `outcome` is not one of `any`, `arrested`, `not_arrested`.
    #[error("Invalid outcome {0:?}, expected any, arrested, or not_arrested")]
    InvalidOutcome(String),

    /// `from` is after `to`.
    #[error("Date range starts ({from}) after it ends ({to})")]
    InvertedWindow {
        /// Requested start.
        from: NaiveDate,
        /// Requested end.
        to: NaiveDate,
    },
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Query parameters for the dashboard endpoint.
///
/// Absent parameters fall back to the session defaults. An empty list
/// parameter (`categories=`) clears the selection, which admits every
/// value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQueryParams {
    /// First day of the window (`YYYY-MM-DD`).
    pub from: Option<String>,
    /// Last day of the window, inclusive (`YYYY-MM-DD`).
    pub to: Option<String>,
    /// Comma-separated list of category names to include.
    pub categories: Option<String>,
    /// Comma-separated list of community areas to include.
    pub regions: Option<String>,
    /// `any`, `arrested`, or `not_arrested`.
    pub outcome: Option<String>,
}

impl DashboardQueryParams {
    /// Resolves these parameters against `defaults`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if a date or the outcome does not parse, or if
    /// the resulting window is inverted.
    pub fn to_criteria(&self, defaults: &FilterCriteria) -> Result<FilterCriteria, QueryError> {
        let start = match self.from.as_deref() {
            Some(value) => parse_date("from", value)?,
            None => defaults.window.start,
        };
        let end = match self.to.as_deref() {
            Some(value) => parse_date("to", value)?,
            None => defaults.window.end,
        };
        if start > end {
            return Err(QueryError::InvertedWindow {
                from: start,
                to: end,
            });
        }

        let categories = self.categories.as_deref().map_or_else(
            || defaults.categories.clone(),
            |s| Selection::from_values(split_list(s).map(str::to_string)),
        );
        let regions = self.regions.as_deref().map_or_else(
            || defaults.regions.clone(),
            |s| Selection::from_values(split_list(s).map(RegionId::new)),
        );
        let outcome = match self.outcome.as_deref() {
            Some(value) => value
                .trim()
                .parse::<Outcome>()
                .map_err(|_| QueryError::InvalidOutcome(value.to_string()))?,
            None => defaults.outcome,
        };

        Ok(FilterCriteria::within(DateWindow::new(start, end))
            .with_categories(categories)
            .with_regions(regions)
            .with_outcome(outcome))
    }
}

fn parse_date(param: &'static str, value: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(value.trim(), QUERY_DATE_FORMAT).map_err(|_| {
        QueryError::InvalidDate {
            param,
            value: value.to_string(),
        }
    })
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|v| !v.is_empty())
}

/// Response from the options endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOptions {
    /// When the underlying table was fetched, if the load succeeded.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Socrata resource the table is fetched from.
    pub data_url: String,
    #[serde(flatten)]
    pub options: FilterOptions,
    /// Load-level notices (fetch failure, empty dataset).
    pub notices: Vec<Notice>,
}

/// Response from the dashboard endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDashboard<'a> {
    /// When the underlying table was fetched, if the load succeeded.
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot<'a>,
    /// Load-level notices, shown above the snapshot's own notices.
    pub load_notices: Vec<Notice>,
}

/// Error body returned with 4xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable description.
    pub error: String,
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
