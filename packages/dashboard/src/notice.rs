//! User-visible messages produced by the pipeline.
//!
//! Load failures and empty results are reported as notices rather than
//! errors so that a presentation layer can always render something.

use crime_explorer_source::SourceError;
use crime_explorer_source_models::RegionId;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How prominently a notice should be shown.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// What a notice is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NoticeKind {
    /// Network failure, timeout, bad status, or malformed body.
    FetchFailed { detail: String },
    /// The decoded body had an unexpected shape.
    ProcessingFailed { detail: String },
    /// The load succeeded but no incident survived normalization.
    EmptyDataset,
    /// No incident matched the filters.
    NoMatches,
    /// There was nothing to put on the map.
    NoMapPoints,
    /// The map shows only the first `shown` of `total` points.
    MapTruncated { total: usize, shown: usize },
    /// Exactly one region is selected, so the region chart is omitted.
    SingleRegion { region: RegionId },
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    /// Converts a load failure into an error notice.
    #[must_use]
    pub fn from_source_error(err: &SourceError) -> Self {
        let detail = err.to_string();
        if err.is_fetch() {
            NoticeKind::FetchFailed { detail }.into()
        } else {
            NoticeKind::ProcessingFailed { detail }.into()
        }
    }
}

impl NoticeKind {
    #[must_use]
    pub const fn level(&self) -> NoticeLevel {
        match self {
            Self::FetchFailed { .. } | Self::ProcessingFailed { .. } => NoticeLevel::Error,
            Self::EmptyDataset | Self::NoMapPoints => NoticeLevel::Warning,
            Self::NoMatches | Self::MapTruncated { .. } | Self::SingleRegion { .. } => {
                NoticeLevel::Info
            }
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::FetchFailed { detail } => format!("Error fetching data: {detail}"),
            Self::ProcessingFailed { detail } => {
                format!("An error occurred during data processing: {detail}")
            }
            Self::EmptyDataset => {
                "Could not load data. Please check the data source or try again later."
                    .to_string()
            }
            Self::NoMatches => "No crimes match the selected filters.".to_string(),
            Self::NoMapPoints => "No data available to display the map.".to_string(),
            Self::MapTruncated { total, shown } => {
                format!("Too many points ({total}) to display on map. Showing the first {shown}.")
            }
            Self::SingleRegion { region } => {
                format!("Displaying data for community area {region} only.")
            }
        }
    }
}

impl From<NoticeKind> for Notice {
    fn from(kind: NoticeKind) -> Self {
        Self {
            level: kind.level(),
            message: kind.message(),
            kind,
        }
    }
}
