//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    course::{Course, CourseId, get_courses},
    dashboard::charts::{DashboardChart, chart_script, chart_view, sales_chart},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, base, format_currency, link,
    },
    platform::Platform,
    sales::{
        ChartSeries, Frequency, ReportFilter, ReportParams, Revenue, Timeframe,
        build_chart_series, build_report,
    },
    timezone::{get_timezone, local_now},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading courses and sales.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The selector values the page was rendered with.
struct Selection {
    course_id: Option<CourseId>,
    platform: Platform,
    timeframe: Timeframe,
    frequency: Frequency,
}

impl Selection {
    /// Unlike the JSON API, a page opened without a timeframe shows the first one.
    fn from_params(params: &ReportParams) -> Result<Self, Error> {
        let timeframe = match params.timeframe.as_deref() {
            None | Some("") => Timeframe::ALL[0],
            Some(_) => params.timeframe(),
        };

        Ok(Self {
            course_id: params.course_id()?,
            platform: params.platform(),
            timeframe,
            frequency: params.frequency(),
        })
    }

    fn filter(&self) -> ReportFilter {
        ReportFilter {
            course_id: self.course_id,
            platform: self.platform,
            timeframe: self.timeframe,
        }
    }

    /// The query string for the CSV export links, or `None` if it cannot be encoded.
    fn export_query(&self) -> Option<String> {
        let params = ReportParams {
            course_id: self.course_id.map(|id| id.to_string()),
            platform: Some(self.platform.name().to_owned()),
            timeframe: Some(self.timeframe.name().to_owned()),
            frequency: None,
        };

        serde_urlencoded::to_string(&params)
            .inspect_err(|error| {
                tracing::error!("Could not encode export query {params:?}: {error}")
            })
            .ok()
    }
}

/// Display the sales chart for the course, platform, timeframe and frequency
/// selected in the query string.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(params): Query<ReportParams>,
) -> Response {
    match build_dashboard(&state, &params) {
        Ok(page) => page.into_response(),
        Err(error) => error.into_page_response(),
    }
}

fn build_dashboard(state: &DashboardState, params: &ReportParams) -> Result<Markup, Error> {
    let selection = Selection::from_params(params)?;
    let timezone = get_timezone(&state.local_timezone)?;
    let now = local_now(timezone);

    let courses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_courses(&connection)?
    };

    let days =
        build_report::<Revenue>(&selection.filter(), timezone, now, &state.db_connection)?;
    let series = build_chart_series(&days, selection.timeframe, selection.frequency, now);
    let chart = DashboardChart {
        id: "sales-chart",
        options: sales_chart(&series, selection.frequency).to_string(),
    };

    Ok(dashboard_view(&courses, &selection, &series, &chart))
}

fn dashboard_view(
    courses: &[Course],
    selection: &Selection,
    series: &ChartSeries,
    chart: &DashboardChart,
) -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Course Sales" }

            (selection_form(courses, selection))

            section
                id="totals"
                class="grid grid-cols-2 gap-4 w-full max-w-screen-md my-4 text-center"
            {
                div
                {
                    p class="text-sm text-gray-600 dark:text-gray-400" { "Total Enrollments" }
                    p id="total-enrollments" class="text-2xl font-semibold"
                    {
                        (series.total_enrollments)
                    }
                }

                div
                {
                    p class="text-sm text-gray-600 dark:text-gray-400" { "Total Sales" }
                    p id="total-sales" class="text-2xl font-semibold"
                    {
                        (format_currency(series.total_sales))
                    }
                }
            }

            @if series.total_enrollments == 0 {
                p class="mb-4" { "No sales in this timeframe." }
            }

            (chart_view(chart))

            @if let Some(query) = selection.export_query() {
                @let enrollments_url = format!("{}?{query}", endpoints::ENROLLMENTS_CSV);
                @let sales_url = format!("{}?{query}", endpoints::SALES_CSV);

                p id="exports" class="flex gap-4"
                {
                    (link(&enrollments_url, "Export enrollments (CSV)"))
                    (link(&sales_url, "Export sales (CSV)"))
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        chart_script(chart),
    ];

    base("Dashboard", &scripts, &content)
}

fn selection_form(courses: &[Course], selection: &Selection) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="grid grid-cols-1 md:grid-cols-5 gap-4 items-end w-full max-w-screen-xl"
        {
            div
            {
                label for="course_id" class=(FORM_LABEL_STYLE) { "Course" }
                select id="course_id" name="course_id" class=(FORM_SELECT_STYLE)
                {
                    option value="" selected[selection.course_id.is_none()] { "All Courses" }

                    @for course in courses {
                        option
                            value=(course.id)
                            selected[selection.course_id == Some(course.id)]
                        {
                            (course.course_name)
                        }
                    }
                }
            }

            div
            {
                label for="platform" class=(FORM_LABEL_STYLE) { "Platform" }
                select id="platform" name="platform" class=(FORM_SELECT_STYLE)
                {
                    @for platform in Platform::ALL {
                        option value=(platform.name()) selected[platform == selection.platform]
                        {
                            (platform.name())
                        }
                    }
                }
            }

            div
            {
                label for="timeframe" class=(FORM_LABEL_STYLE) { "Timeframe" }
                select id="timeframe" name="timeframe" class=(FORM_SELECT_STYLE)
                {
                    @for timeframe in Timeframe::ALL {
                        option
                            value=(timeframe.name())
                            selected[timeframe == selection.timeframe]
                        {
                            (timeframe.name())
                        }
                    }
                }
            }

            div
            {
                label for="frequency" class=(FORM_LABEL_STYLE) { "Frequency" }
                select id="frequency" name="frequency" class=(FORM_SELECT_STYLE)
                {
                    @for frequency in Frequency::ALL {
                        option
                            value=(frequency.key())
                            selected[frequency == selection.frequency]
                        {
                            (frequency.label())
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update" }
        }
    )
}
