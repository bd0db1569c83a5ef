//! Normalization of raw Chicago crime records into typed incidents.
//!
//! A row is admitted only if its timestamp, latitude, longitude, category,
//! and community area are all present after coercion. Rows missing a
//! coordinate are therefore excluded from every aggregate, including those
//! that never look at location.

use crime_explorer_source_models::{
    Incident, IncidentFields, IncidentTable, MISSING_TEXT, RawRecord, RegionId,
};

use crate::SourceError;
use crate::parsing::{coerce_bool, coerce_f64, coerce_text, coerce_timestamp};

pub const DATE_FIELD: &str = "date";
pub const LATITUDE_FIELD: &str = "latitude";
pub const LONGITUDE_FIELD: &str = "longitude";
pub const CATEGORY_FIELD: &str = "primary_type";
pub const REGION_FIELD: &str = "community_area";
pub const ARREST_FIELD: &str = "arrest";
pub const DOMESTIC_FIELD: &str = "domestic";
pub const DESCRIPTION_FIELD: &str = "description";
pub const BLOCK_FIELD: &str = "block";
pub const LOCATION_DESCRIPTION_FIELD: &str = "location_description";

/// Columns every admitted row must carry.
pub const REQUIRED_FIELDS: [&str; 5] = [
    DATE_FIELD,
    LATITUDE_FIELD,
    LONGITUDE_FIELD,
    CATEGORY_FIELD,
    REGION_FIELD,
];

/// Normalizes a batch of raw records into an immutable table, preserving
/// the input order of admitted rows.
///
/// # Errors
///
/// Returns [`SourceError::Processing`] if the batch is non-empty and some
/// mandatory column appears in none of its records, which means the
/// endpoint returned a different schema.
pub fn normalize(records: &[RawRecord]) -> Result<IncidentTable, SourceError> {
    let missing = missing_columns(records);
    if !missing.is_empty() {
        return Err(SourceError::Processing {
            message: format!(
                "response is missing expected column(s): {}",
                missing.join(", ")
            ),
        });
    }

    let table: IncidentTable = records.iter().filter_map(normalize_record).collect();

    let dropped = records.len() - table.len();
    if dropped > 0 {
        log::debug!("Dropped {dropped} records missing a mandatory field");
    }
    log::info!(
        "Normalized {} incidents from {} raw records",
        table.len(),
        records.len()
    );

    Ok(table)
}

/// Coerces one record, returning `None` if any mandatory field is absent.
#[must_use]
pub fn normalize_record(record: &RawRecord) -> Option<Incident> {
    let occurred_at = coerce_timestamp(record.get(DATE_FIELD));
    let latitude = coerce_f64(record.get(LATITUDE_FIELD));
    let longitude = coerce_f64(record.get(LONGITUDE_FIELD));
    let category = coerce_text(record.get(CATEGORY_FIELD));
    let region = coerce_text(record.get(REGION_FIELD));

    let (Some(occurred_at), Some(latitude), Some(longitude), Some(category), Some(region)) =
        (occurred_at, latitude, longitude, category, region)
    else {
        return None;
    };

    let text = |field: &str| {
        coerce_text(record.get(field)).unwrap_or_else(|| MISSING_TEXT.to_string())
    };

    Some(Incident::new(IncidentFields {
        occurred_at,
        latitude,
        longitude,
        category,
        region_id: RegionId::new(region),
        arrest_made: coerce_bool(record.get(ARREST_FIELD)),
        is_domestic: coerce_bool(record.get(DOMESTIC_FIELD)),
        description: text(DESCRIPTION_FIELD),
        block: text(BLOCK_FIELD),
        location_description: text(LOCATION_DESCRIPTION_FIELD),
    }))
}

/// Mandatory columns that no record in the batch contains.
fn missing_columns(records: &[RawRecord]) -> Vec<&'static str> {
    if records.is_empty() {
        return Vec::new();
    }
    REQUIRED_FIELDS
        .into_iter()
        .filter(|field| !records.iter().any(|record| record.contains_key(*field)))
        .collect()
}
