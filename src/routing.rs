//! Application router configuration.

use std::path::Path;

use axum::{
    Router,
    response::{Redirect, Response},
    routing::get,
};
use tower_http::services::ServeDir;

use crate::{
    AppState, Error,
    dashboard::get_dashboard_page,
    endpoints,
    sales::{
        get_chart_series, get_courses_json, get_enrollments, get_enrollments_csv,
        get_frequencies, get_platforms, get_sales_csv, get_timeframes, get_transactions,
    },
};

/// Return a router with all the app's routes.
///
/// Files under `static_dir` are served from [endpoints::STATIC].
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let api_routes = Router::new()
        .route(endpoints::COURSES_API, get(get_courses_json))
        .route(endpoints::PLATFORMS_API, get(get_platforms))
        .route(endpoints::TIMEFRAMES_API, get(get_timeframes))
        .route(endpoints::FREQUENCIES_API, get(get_frequencies))
        .route(endpoints::TRANSACTIONS_API, get(get_transactions))
        .route(endpoints::ENROLLMENTS_API, get(get_enrollments))
        .route(endpoints::CHART_API, get(get_chart_series))
        .route(endpoints::ENROLLMENTS_CSV, get(get_enrollments_csv))
        .route(endpoints::SALES_CSV, get(get_sales_csv));

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new(static_dir.as_ref()))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_page_response()
}
