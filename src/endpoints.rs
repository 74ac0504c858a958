//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The sales dashboard page.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to list courses.
pub const COURSES_API: &str = "/api/courses";
/// The route to list platform names.
pub const PLATFORMS_API: &str = "/api/platforms";
/// The route to list timeframe names.
pub const TIMEFRAMES_API: &str = "/api/timeframes";
/// The route to list chart frequencies.
pub const FREQUENCIES_API: &str = "/api/frequencies";
/// The route for per-day sales.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for per-day enrollment counts.
pub const ENROLLMENTS_API: &str = "/api/enrollments";
/// The route for the regrouped chart series.
pub const CHART_API: &str = "/api/chart";
/// The route to download enrollments per day as CSV.
pub const ENROLLMENTS_CSV: &str = "/api/export/enrollments.csv";
/// The route to download sales per day as CSV.
pub const SALES_CSV: &str = "/api/export/sales.csv";
