#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Socrata incident fetcher and record normalization.
//!
//! [`socrata`] issues the single GET against the open-data endpoint and
//! decodes the JSON array into [`RawRecord`]s. [`normalize`] coerces those
//! records into the typed [`IncidentTable`], dropping rows that lack any
//! mandatory field.
//!
//! [`RawRecord`]: crime_explorer_source_models::RawRecord
//! [`IncidentTable`]: crime_explorer_source_models::IncidentTable

pub mod normalize;
pub mod parsing;
pub mod socrata;

/// Errors that can occur while loading incidents from the remote source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    /// Network failure, timeout, or non-2xx status.
    #[error("HTTP request to {url} failed: {source}")]
    Fetch {
        /// Request URL.
        url: String,
        /// Underlying transport or status error.
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not valid JSON.
    #[error("Malformed JSON body from {url}: {source}")]
    MalformedBody {
        /// Request URL.
        url: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Decoded body did not have the expected shape.
    #[error("Processing error: {message}")]
    Processing {
        /// Description of what went wrong.
        message: String,
    },
}

impl SourceError {
    /// Returns `true` for failures that happened before a body was decoded
    /// (network, timeout, status, malformed JSON).
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(
            self,
            Self::Client(_) | Self::Fetch { .. } | Self::MalformedBody { .. }
        )
    }
}
