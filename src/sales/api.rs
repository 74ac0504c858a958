//! JSON and CSV endpoints for sales reports.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::{
    bucket::{DayBucket, Occurrences, Revenue},
    export::{ExportMetric, export_csv},
    frequency::Frequency,
    report::{ReportFilter, build_report},
    series::{ChartSeries, build_chart_series},
    timeframe::Timeframe,
};
use crate::{
    AppState, Error,
    course::{Course, CourseId, get_courses},
    platform::Platform,
    timezone::{get_timezone, local_now},
};

/// The state needed by the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading courses and sales.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters shared by the report endpoints and the dashboard page.
///
/// Every parameter is optional. Empty values are treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReportParams {
    /// The course ID, or missing for every course.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    /// A platform name, see [Platform::name].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// A timeframe name, see [Timeframe::name].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    /// A frequency key, see [Frequency::key].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

impl ReportParams {
    /// The selected course ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the ID is not a number, since it cannot
    /// refer to a course.
    pub fn course_id(&self) -> Result<Option<CourseId>, Error> {
        match self.course_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(course_id) => course_id.parse().map(Some).map_err(|_| Error::NotFound),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform::from_name(self.platform.as_deref().unwrap_or_default())
    }

    /// The selected timeframe. Missing names are unrecognized and filter nothing.
    pub fn timeframe(&self) -> Timeframe {
        Timeframe::from_name(self.timeframe.as_deref().unwrap_or_default())
    }

    pub fn frequency(&self) -> Frequency {
        Frequency::from_key(self.frequency.as_deref().unwrap_or_default())
    }

    /// The report selection described by these parameters.
    ///
    /// # Errors
    /// Returns the errors of [ReportParams::course_id].
    pub fn filter(&self) -> Result<ReportFilter, Error> {
        Ok(ReportFilter {
            course_id: self.course_id()?,
            platform: self.platform(),
            timeframe: self.timeframe(),
        })
    }
}

/// A selectable chart frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyOption {
    pub key: &'static str,
    pub label: &'static str,
}

/// List every course, ordered by name.
pub async fn get_courses_json(
    State(state): State<ReportState>,
) -> Result<Json<Vec<Course>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_courses(&connection).map(Json)
}

/// List the platform names in display order.
pub async fn get_platforms() -> Json<Vec<&'static str>> {
    Json(Platform::ALL.iter().map(|platform| platform.name()).collect())
}

/// List the timeframe names in display order.
pub async fn get_timeframes() -> Json<Vec<&'static str>> {
    Json(Timeframe::ALL.iter().map(|timeframe| timeframe.name()).collect())
}

/// List the chart frequencies in display order.
pub async fn get_frequencies() -> Json<Vec<FrequencyOption>> {
    Json(
        Frequency::ALL
            .iter()
            .map(|frequency| FrequencyOption {
                key: frequency.key(),
                label: frequency.label(),
            })
            .collect(),
    )
}

/// Per-day sales where each course's total is its summed sale amounts.
pub async fn get_transactions(
    State(state): State<ReportState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<DayBucket>>, Error> {
    let timezone = get_timezone(&state.local_timezone)?;
    let now = local_now(timezone);

    build_report::<Revenue>(&params.filter()?, timezone, now, &state.db_connection).map(Json)
}

/// Per-day enrollments where each course's total is its number of sales.
pub async fn get_enrollments(
    State(state): State<ReportState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<DayBucket>>, Error> {
    let timezone = get_timezone(&state.local_timezone)?;
    let now = local_now(timezone);

    build_report::<Occurrences>(&params.filter()?, timezone, now, &state.db_connection)
        .map(Json)
}

/// Enrollment, sales and average-sales series regrouped by the selected frequency.
pub async fn get_chart_series(
    State(state): State<ReportState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ChartSeries>, Error> {
    let timezone = get_timezone(&state.local_timezone)?;
    let now = local_now(timezone);
    let filter = params.filter()?;
    let days = build_report::<Revenue>(&filter, timezone, now, &state.db_connection)?;

    Ok(Json(build_chart_series(
        &days,
        filter.timeframe,
        params.frequency(),
        now,
    )))
}

/// Download the per-day enrollments as CSV.
pub async fn get_enrollments_csv(
    State(state): State<ReportState>,
    Query(params): Query<ReportParams>,
) -> Result<Response, Error> {
    csv_response(&state, &params, ExportMetric::Enrollments)
}

/// Download the per-day sales as CSV.
pub async fn get_sales_csv(
    State(state): State<ReportState>,
    Query(params): Query<ReportParams>,
) -> Result<Response, Error> {
    csv_response(&state, &params, ExportMetric::Sales)
}

fn csv_response(
    state: &ReportState,
    params: &ReportParams,
    metric: ExportMetric,
) -> Result<Response, Error> {
    let timezone = get_timezone(&state.local_timezone)?;
    let now = local_now(timezone);
    let days =
        build_report::<Revenue>(&params.filter()?, timezone, now, &state.db_connection)?;
    let csv = export_csv(&days, metric)
        .inspect_err(|error| tracing::error!("could not export {}: {error}", metric.label()))?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", metric.file_name()),
            ),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use super::{
        ReportParams, ReportState, get_chart_series, get_courses_json, get_enrollments,
        get_enrollments_csv, get_frequencies, get_platforms, get_sales_csv, get_timeframes,
        get_transactions,
    };
    use crate::{
        Error,
        course::{NewCourse, create_course},
        db::initialize,
        platform::Platform,
        sales::{
            record::{NewTeachableSale, NewUdemySale, create_teachable_sale, create_udemy_sale},
            timeframe::Timeframe,
        },
        test_utils::{assert_status_ok, get_header, parse_text},
    };

    fn get_test_state() -> (ReportState, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let course = create_course(
            &NewCourse {
                course_name: "Rust 101".to_owned(),
                teachable_name: Some("Rust 101".to_owned()),
                udemy_name: Some("Rust 101 on Udemy".to_owned()),
            },
            &conn,
        )
        .unwrap();

        // Noon UTC yesterday stays inside the past 30 days in UTC.
        let yesterday = OffsetDateTime::now_utc().replace_time(time::macros::time!(12:00))
            - Duration::days(1);

        for user_id in [1, 1, 2] {
            create_teachable_sale(
                &NewTeachableSale {
                    purchased_at: Some(yesterday),
                    course_name: "Rust 101".to_owned(),
                    earnings_usd: Some(20.0),
                    user_id: Some(user_id),
                    ..Default::default()
                },
                &conn,
            )
            .unwrap();
        }

        create_udemy_sale(
            &NewUdemySale {
                transaction_id: Some(99),
                date: Some(yesterday),
                course_name: "Rust 101 on Udemy".to_owned(),
                instructor_share: Some(5.0),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let state = ReportState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, course.id)
    }

    fn report_params(course_id: i64, platform: Platform) -> ReportParams {
        ReportParams {
            course_id: Some(course_id.to_string()),
            platform: Some(platform.name().to_owned()),
            timeframe: Some(Timeframe::Past30Days.name().to_owned()),
            frequency: None,
        }
    }

    #[test]
    fn empty_course_id_selects_every_course() {
        let params = ReportParams {
            course_id: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(params.course_id(), Ok(None));
    }

    #[test]
    fn non_numeric_course_id_is_not_found() {
        let params = ReportParams {
            course_id: Some("abc".to_owned()),
            ..Default::default()
        };

        assert_eq!(params.course_id(), Err(Error::NotFound));
    }

    #[test]
    fn missing_names_fall_back_to_defaults() {
        let params = ReportParams::default();

        assert_eq!(params.platform(), Platform::All);
        assert_eq!(params.timeframe(), Timeframe::Unrecognized);
        assert_eq!(params.frequency(), crate::sales::frequency::Frequency::Day);
    }

    #[tokio::test]
    async fn lists_are_in_display_order() {
        let Json(platforms) = get_platforms().await;
        let Json(timeframes) = get_timeframes().await;
        let Json(frequencies) = get_frequencies().await;

        assert_eq!(platforms, vec!["All Platforms", "Teachable", "Udemy"]);
        assert_eq!(timeframes.len(), 8);
        assert_eq!(timeframes[0], "Past 30 Days");
        assert_eq!(timeframes[7], "Beginning Of Time");
        assert_eq!(frequencies[0].key, "day");
        assert_eq!(frequencies[4].label, "Yearly");
    }

    #[tokio::test]
    async fn courses_are_listed() {
        let (state, _) = get_test_state();

        let Json(courses) = get_courses_json(State(state)).await.unwrap();

        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_name, "Rust 101");
    }

    #[tokio::test]
    async fn transactions_are_deduplicated_and_summed() {
        let (state, course_id) = get_test_state();

        let params = report_params(course_id, Platform::All);

        let Json(days) = get_transactions(State(state), Query(params)).await.unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].count(), 3);
        assert_eq!(days[0].total(), 45.0);
    }

    #[tokio::test]
    async fn enrollments_count_instead_of_summing() {
        let (state, course_id) = get_test_state();

        let Json(days) = get_enrollments(
            State(state),
            Query(report_params(course_id, Platform::Teachable)),
        )
        .await
        .unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].total(), 2.0);
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let (state, _) = get_test_state();

        let response = get_transactions(State(state), Query(report_params(1234, Platform::All)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn chart_series_totals_match_the_report() {
        let (state, course_id) = get_test_state();
        let params = ReportParams {
            frequency: Some("week".to_owned()),
            ..report_params(course_id, Platform::All)
        };

        let Json(series) = get_chart_series(State(state), Query(params)).await.unwrap();

        assert_eq!(series.total_enrollments, 3);
        assert_eq!(series.total_sales, 45.0);
        assert_eq!(series.sales.iter().map(|p| p.value).sum::<f64>(), 45.0);
        assert_eq!(series.enrollments.iter().map(|p| p.value).sum::<f64>(), 3.0);
        assert_eq!(series.sales.len(), series.average_sales.len());
    }

    #[tokio::test]
    async fn sales_csv_is_an_attachment() {
        let (state, course_id) = get_test_state();

        let params = report_params(course_id, Platform::Udemy);

        let response = get_sales_csv(State(state), Query(params)).await.unwrap();

        assert_status_ok(&response);
        assert_eq!(get_header(&response, "content-type"), "text/csv; charset=utf-8");
        assert_eq!(
            get_header(&response, "content-disposition"),
            "attachment; filename=\"salesPerDay.csv\""
        );
        let text = parse_text(response).await;
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Course Name,Date,Sales");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Rust 101,") && lines[1].ends_with(",5"));
    }

    #[tokio::test]
    async fn enrollments_csv_has_its_own_file_name() {
        let (state, course_id) = get_test_state();

        let response =
            get_enrollments_csv(State(state), Query(report_params(course_id, Platform::All)))
                .await
                .unwrap();

        assert_eq!(
            get_header(&response, "content-disposition"),
            "attachment; filename=\"enrollmentsPerDay.csv\""
        );
        let text = parse_text(response).await;
        assert!(text.starts_with("Course Name,Date,Enrollments\n"));
        assert!(text.trim_end().ends_with(",3"));
    }
}
