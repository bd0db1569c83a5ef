#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident filtering and grouped-count aggregation.
//!
//! Both stages are pure functions over an immutable
//! [`IncidentTable`](crime_explorer_source_models::IncidentTable): every
//! dashboard interaction recomputes them from scratch.

pub mod aggregate;
pub mod filter;
