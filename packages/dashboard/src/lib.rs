#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cached incident store and dashboard snapshot assembly.
//!
//! [`store::IncidentStore`] wraps the fetch and normalize steps in a
//! [`cache::TtlCache`] keyed by request URL and turns load failures into
//! an empty table plus a user-visible [`notice::Notice`].
//! [`snapshot::DashboardSnapshot`] runs filtering and every aggregation for
//! one interaction, and [`snapshot::FilterOptions`] describes the choices
//! and defaults a frontend should offer.

pub mod cache;
pub mod config;
pub mod notice;
pub mod snapshot;
pub mod store;

use std::path::PathBuf;

use crime_explorer_source::SourceError;

/// Errors that can occur while setting up or running the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Fetching or normalizing incidents failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigIo {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration was not valid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
