//! HTTP handler functions for the crime explorer API.

use actix_web::{HttpResponse, web};
use crime_explorer_dashboard::snapshot::{DashboardSnapshot, FilterOptions};
use crime_explorer_dashboard::store::LoadedTable;
use crime_explorer_server_models::{
    ApiDashboard, ApiError, ApiHealth, ApiOptions, DashboardQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/options`
///
/// Returns the categories, regions, and date range present in the loaded
/// table together with the default filter criteria.
pub async fn options(state: web::Data<AppState>) -> HttpResponse {
    let loaded = state.store.load().await;
    options_response(&state, loaded)
}

/// `POST /api/refresh`
///
/// Discards the cached table, fetches it again, and returns the new
/// options.
pub async fn refresh(state: web::Data<AppState>) -> HttpResponse {
    log::info!("Refresh requested");
    let loaded = state.store.refresh().await;
    options_response(&state, loaded)
}

/// `GET /api/dashboard`
///
/// Filters the loaded table and returns the rows, map points, and chart
/// series for the requested criteria.
pub async fn dashboard(
    state: web::Data<AppState>,
    params: web::Query<DashboardQueryParams>,
) -> HttpResponse {
    let loaded = state.store.load().await;
    let config = state.store.config();
    let defaults = FilterOptions::from_table(&loaded.table, config).defaults;

    let criteria = match params.to_criteria(&defaults) {
        Ok(criteria) => criteria,
        Err(e) => {
            log::debug!("Rejected dashboard query: {e}");
            return HttpResponse::BadRequest().json(ApiError::from(e));
        }
    };

    let snapshot = DashboardSnapshot::build(&loaded.table, criteria, config.map_point_cap);
    log::debug!(
        "Dashboard query matched {} of {} incidents",
        snapshot.total_matching,
        loaded.table.len()
    );

    HttpResponse::Ok().json(ApiDashboard {
        fetched_at: loaded.fetched_at,
        snapshot,
        load_notices: loaded.notice.into_iter().collect(),
    })
}

fn options_response(state: &AppState, loaded: LoadedTable) -> HttpResponse {
    let config = state.store.config();
    let options = FilterOptions::from_table(&loaded.table, config);
    HttpResponse::Ok().json(ApiOptions {
        fetched_at: loaded.fetched_at,
        data_url: config.api_url.clone(),
        options,
        notices: loaded.notice.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test};
    use crime_explorer_dashboard::config::DashboardConfig;
    use crime_explorer_dashboard::store::IncidentStore;
    use crime_explorer_test_utils::{FakeSocrata, Reply};
    use serde_json::Value;

    use super::*;

    const BODY: &str = r#"[
        {"date":"2024-03-01T08:15:00.000","latitude":"41.88","longitude":"-87.63",
         "primary_type":"THEFT","community_area":"32","arrest":true,"domestic":false,
         "block":"001XX N STATE ST"},
        {"date":"2024-03-02T22:40:00.000","latitude":"41.79","longitude":"-87.60",
         "primary_type":"BATTERY","community_area":"8","arrest":false,"domestic":true},
        {"date":"2024-03-02T23:05:00.000","latitude":"41.80","longitude":"-87.61",
         "primary_type":"THEFT","community_area":"8","arrest":false,"domestic":false}
    ]"#;

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/resource/test.json")
    }

    fn state_for(api_url: String) -> web::Data<AppState> {
        let config = DashboardConfig {
            api_url,
            fetch_timeout_secs: 5,
            ..DashboardConfig::default()
        };
        web::Data::new(AppState {
            store: Arc::new(IncidentStore::new(config).unwrap()),
        })
    }

    #[actix_rt::test]
    async fn health_reports_version() {
        let app = test::init_service(
            App::new()
                .app_data(state_for(closed_port_url()))
                .configure(crate::configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_rt::test]
    async fn dashboard_filters_loaded_table() {
        let api = FakeSocrata::start(Reply::json(BODY)).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(state_for(api.resource_url()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/dashboard?from=2024-03-01&to=2024-03-02&categories=THEFT&regions=8,32&outcome=any")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["totalMatching"], 2);
        assert_eq!(body["mapPoints"].as_array().unwrap().len(), 2);
        assert_eq!(body["mapPoints"][0]["block"], "001XX N STATE ST");
        assert_eq!(body["byDay"].as_array().unwrap().len(), 2);
        assert_eq!(body["byHour"].as_array().unwrap().len(), 24);
        assert_eq!(body["byCategory"][0]["category"], "THEFT");
        assert_eq!(body["byRegion"][0]["region"], "8");
        assert!(body["loadNotices"].as_array().unwrap().is_empty());
        assert!(body["fetchedAt"].is_string());

        let req = test::TestRequest::get()
            .uri("/api/dashboard?from=2024-03-01&to=2024-03-02&regions=8&outcome=not_arrested")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalMatching"], 2);
        assert!(body["byRegion"].is_null());
        assert_eq!(body["notices"][0]["kind"]["type"], "singleRegion");

        assert_eq!(api.hits(), 1);
    }

    #[actix_rt::test]
    async fn options_report_data_url_and_refresh_refetches() {
        let api = FakeSocrata::start(Reply::json(BODY)).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(state_for(api.resource_url()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/options").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["dataUrl"], api.resource_url());
        assert_eq!(body["categories"], serde_json::json!(["BATTERY", "THEFT"]));
        assert_eq!(body["regions"], serde_json::json!(["8", "32"]));
        assert_eq!(body["maxDate"], "2024-03-02");

        let req = test::TestRequest::post().uri("/api/refresh").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["dataUrl"], api.resource_url());
        assert_eq!(api.hits(), 2);
    }

    #[actix_rt::test]
    async fn invalid_query_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(state_for(closed_port_url()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/dashboard?outcome=sometimes")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("sometimes"));
    }

    #[actix_rt::test]
    async fn fetch_failure_still_returns_options() {
        let app = test::init_service(
            App::new()
                .app_data(state_for(closed_port_url()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/options").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["categories"].as_array().unwrap().is_empty());
        assert!(body["fetchedAt"].is_null());
        assert_eq!(body["notices"][0]["level"], "error");
        assert_eq!(body["notices"][0]["kind"]["type"], "fetchFailed");

        let req = test::TestRequest::post().uri("/api/refresh").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/api/dashboard").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalMatching"], 0);
        assert_eq!(body["notices"][0]["kind"]["type"], "noMatches");
        assert_eq!(body["loadNotices"][0]["kind"]["type"], "fetchFailed");
    }
}
