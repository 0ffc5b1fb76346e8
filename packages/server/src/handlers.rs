//! HTTP handler functions for the crash map API.

use actix_web::{HttpResponse, web};
use crash_map_crash_models::CrashRecord;
use crash_map_filter::options::{self, SidebarOptions};
use crash_map_filter::filter_crashes;
use crash_map_marker::{PopupTemplate, project_markers};
use crash_map_server_models::{ApiCrashPage, ApiDataset, ApiHealth, CrashQueryParams};
use crash_map_source::registry;
use serde_json::json;

use crate::AppState;

/// Rows shown by the preview endpoint.
const PREVIEW_ROWS: usize = 5;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/datasets`
///
/// Lists every embedded dataset definition, marking the loaded one.
pub async fn datasets(state: web::Data<AppState>) -> HttpResponse {
    let list: Vec<ApiDataset> = registry::all_datasets()
        .into_iter()
        .map(|def| {
            let active = def.id == state.dataset.id;
            ApiDataset {
                active,
                record_count: active.then_some(state.records.len() as u64),
                id: def.id,
                name: def.name,
                region: def.region,
                license_type: def.license.license_type,
                attribution: def.license.attribution_text,
                first_year: def.years.first,
                last_year: def.years.last,
                default_year: def.years.default,
            }
        })
        .collect();

    HttpResponse::Ok().json(list)
}

/// `GET /api/options`
///
/// Returns the sidebar select lists for the full table.
pub async fn options(state: web::Data<AppState>) -> HttpResponse {
    let years = &state.dataset.years;
    HttpResponse::Ok().json(SidebarOptions::from_records(
        &years.descending(),
        years.default,
        &state.records,
    ))
}

/// `GET /api/preview`
///
/// The first rows of the selected year. Only the year and the
/// property-damage toggle apply.
pub async fn preview(
    state: web::Data<AppState>,
    params: web::Query<CrashQueryParams>,
) -> HttpResponse {
    let criteria = match params.criteria(state.dataset.years.default) {
        Ok(c) => c,
        Err(e) => return bad_request(&e),
    };

    let rows: Vec<&CrashRecord> = options::preview(&state.records, &criteria, PREVIEW_ROWS);
    HttpResponse::Ok().json(rows)
}

/// `GET /api/crashes`
///
/// Filtered rows, paged with `limit`/`offset`.
pub async fn crashes(
    state: web::Data<AppState>,
    params: web::Query<CrashQueryParams>,
) -> HttpResponse {
    let criteria = match params.criteria(state.dataset.years.default) {
        Ok(c) => c,
        Err(e) => return bad_request(&e),
    };

    let rows = filter_crashes(&state.records, &criteria);
    HttpResponse::Ok().json(ApiCrashPage::paginate(rows, params.offset, params.limit))
}

/// `GET /api/markers`
pub async fn markers(
    state: web::Data<AppState>,
    params: web::Query<CrashQueryParams>,
) -> HttpResponse {
    let criteria = match params.criteria(state.dataset.years.default) {
        Ok(c) => c,
        Err(e) => return bad_request(&e),
    };

    let rows = filter_crashes(&state.records, &criteria);
    HttpResponse::Ok().json(project_markers(&rows, &popup_template(&state)))
}

/// `GET /api/markers.geojson`
pub async fn markers_geojson(
    state: web::Data<AppState>,
    params: web::Query<CrashQueryParams>,
) -> HttpResponse {
    let criteria = match params.criteria(state.dataset.years.default) {
        Ok(c) => c,
        Err(e) => return bad_request(&e),
    };

    let rows = filter_crashes(&state.records, &criteria);
    let collection = project_markers(&rows, &popup_template(&state)).to_geojson();

    match serde_json::to_string(&collection) {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/geo+json")
            .body(body),
        Err(e) => {
            log::error!("Failed to serialize markers: {e}");
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to serialize markers"
            }))
        }
    }
}

/// `GET /api/charts`
pub async fn charts(
    state: web::Data<AppState>,
    params: web::Query<CrashQueryParams>,
) -> HttpResponse {
    let criteria = match params.criteria(state.dataset.years.default) {
        Ok(c) => c,
        Err(e) => return bad_request(&e),
    };

    let rows = filter_crashes(&state.records, &criteria);
    HttpResponse::Ok().json(crash_map_analytics::summarize(&rows, &criteria))
}

fn popup_template(state: &AppState) -> PopupTemplate {
    PopupTemplate::new(state.dataset.has_fatality_total())
}

fn bad_request(e: &dyn std::error::Error) -> HttpResponse {
    log::debug!("Rejected query: {e}");
    HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))
}
