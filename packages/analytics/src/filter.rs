//! Predicate filtering of the incident table.

use crime_explorer_analytics_models::FilterCriteria;
use crime_explorer_source_models::{IncidentTable, IncidentView};

/// Selects the rows of `table` that pass every predicate in `criteria`.
///
/// Rows keep their table order. The table itself is never modified.
#[must_use]
pub fn filter<'a>(table: &'a IncidentTable, criteria: &FilterCriteria) -> IncidentView<'a> {
    let view: IncidentView<'a> = table.iter().filter(|row| criteria.matches(row)).collect();
    log::debug!("Filter kept {} of {} incidents", view.len(), table.len());
    view
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use crime_explorer_analytics_models::{DateWindow, Outcome, Selection};
    use crime_explorer_source_models::{Incident, IncidentFields, RegionId};

    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn incident(ts: &str, category: &str, region: &str, arrest: bool) -> Incident {
        Incident::new(
            IncidentFields::new(at(ts), 41.9, -87.6, category, region).with_arrest(arrest),
        )
    }

    fn table() -> IncidentTable {
        IncidentTable::new(vec![
            incident("2024-03-02 08:00:00", "THEFT", "8", true),
            incident("2024-03-01 12:00:00", "BATTERY", "32", false),
            incident("2024-03-03 23:59:59", "THEFT", "32", false),
            incident("2024-03-04 00:00:00", "ASSAULT", "8", true),
        ])
    }

    fn march_1_to_3() -> DateWindow {
        DateWindow::new(day("2024-03-01"), day("2024-03-03"))
    }

    #[test]
    fn empty_selections_keep_every_row_in_window() {
        let table = table();
        let view = filter(&table, &FilterCriteria::within(march_1_to_3()));
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn end_day_is_inclusive() {
        let table = table();
        let view = filter(&table, &FilterCriteria::within(march_1_to_3()));
        assert!(view.iter().any(|i| i.date_display == "2024-03-03 23:59:59"));
        assert!(view.iter().all(|i| i.date_display != "2024-03-04 00:00:00"));
    }

    #[test]
    fn predicates_combine_with_and() {
        let table = table();
        let criteria = FilterCriteria::within(DateWindow::unbounded())
            .with_categories(Selection::from_values(["THEFT".to_string()]))
            .with_regions(Selection::from_values([RegionId::new("32")]))
            .with_outcome(Outcome::NotArrested);
        let view = filter(&table, &criteria);
        assert_eq!(view.len(), 1);
        assert_eq!(view.rows()[0].date_display, "2024-03-03 23:59:59");
    }

    #[test]
    fn outcome_filters_on_arrest_flag() {
        let table = table();
        let arrested = filter(
            &table,
            &FilterCriteria::within(DateWindow::unbounded()).with_outcome(Outcome::Arrested),
        );
        assert_eq!(arrested.len(), 2);
        assert!(arrested.iter().all(|i| i.arrest_made));
    }

    #[test]
    fn keeps_table_order_and_is_pure() {
        let table = table();
        let before = table.rows().to_vec();
        let criteria = FilterCriteria::within(DateWindow::unbounded());

        let first = filter(&table, &criteria).to_incidents();
        let second = filter(&table, &criteria).to_incidents();

        assert_eq!(first, second);
        assert_eq!(first, before);
        assert_eq!(table.rows(), before.as_slice());
    }

    #[test]
    fn inverted_window_matches_nothing() {
        let table = table();
        let window = DateWindow::new(day("2024-03-03"), day("2024-03-01"));
        assert!(filter(&table, &FilterCriteria::within(window)).is_empty());
    }
}
