//! Socrata SODA API fetcher.
//!
//! Builds the `$limit`/`$where` query URL and performs one GET against it.
//! There is no pagination and no retry: a single attempt either yields the
//! decoded records or a [`SourceError`].

use std::time::Duration;

use chrono::NaiveDateTime;
use crime_explorer_source_models::RawRecord;

use crate::SourceError;

/// Socrata endpoint for City of Chicago crime data.
pub const CHICAGO_API_URL: &str = "https://data.cityofchicago.org/resource/t7ek-mgzi.json";

/// Format of the `$where` lower bound, e.g. `2023-01-01T00:00:00.000`.
pub const SOCRATA_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Parameters of a Socrata query.
#[derive(Debug, Clone, Copy)]
pub struct SocrataQuery<'a> {
    /// Resource URL (e.g. [`CHICAGO_API_URL`]).
    pub endpoint: &'a str,
    /// Column used for the server-side date filter.
    pub date_column: &'a str,
    /// Maximum number of records the server should return.
    pub limit: u64,
    /// Only records strictly after this timestamp are requested.
    pub since: NaiveDateTime,
}

impl SocrataQuery<'_> {
    /// Renders the full request URL.
    ///
    /// The URL is left unencoded; it doubles as the cache key so it must be
    /// stable for identical parameters.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}?$limit={}&$where={} > '{}'",
            self.endpoint,
            self.limit,
            self.date_column,
            self.since.format(SOCRATA_TIMESTAMP_FORMAT)
        )
    }
}

/// Builds an HTTP client whose requests fail after `timeout`.
///
/// # Errors
///
/// Returns [`SourceError::Client`] if the TLS backend cannot be set up.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(SourceError::Client)
}

/// Fetches `url` once with a fresh client bounded by `timeout`.
///
/// # Errors
///
/// See [`fetch_records`].
pub async fn fetch(url: &str, timeout: Duration) -> Result<Vec<RawRecord>, SourceError> {
    let client = build_client(timeout)?;
    fetch_records(&client, url).await
}

/// Performs one GET against `url` and decodes the body as a JSON array of
/// objects.
///
/// # Errors
///
/// * [`SourceError::Fetch`] on network failure, timeout, or non-2xx status.
/// * [`SourceError::MalformedBody`] if the body is not valid JSON.
/// * [`SourceError::Processing`] if the JSON is not an array of objects.
pub async fn fetch_records(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<RawRecord>, SourceError> {
    let fetch_err = |source| SourceError::Fetch {
        url: url.to_string(),
        source,
    };

    log::info!("Fetching incidents: {url}");
    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(fetch_err)?;
    let text = response.text().await.map_err(fetch_err)?;

    let body: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| SourceError::MalformedBody {
            url: url.to_string(),
            source,
        })?;

    let records = records_from_body(body)?;
    log::info!("Downloaded {} raw records ({} bytes)", records.len(), text.len());

    Ok(records)
}

/// Splits a decoded body into records.
///
/// # Errors
///
/// Returns [`SourceError::Processing`] if `body` is not an array or any
/// element is not an object.
pub fn records_from_body(body: serde_json::Value) -> Result<Vec<RawRecord>, SourceError> {
    let serde_json::Value::Array(items) = body else {
        return Err(SourceError::Processing {
            message: format!("expected a JSON array, got {}", json_kind(&body)),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(record) => Ok(record),
            other => Err(SourceError::Processing {
                message: format!("record {index} is {}, expected an object", json_kind(&other)),
            }),
        })
        .collect()
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
