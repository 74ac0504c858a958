//! A dashboard for course sales and enrollments on Teachable and Udemy.
//!
//! This library provides a JSON API and a server-rendered chart page that
//! report per-day sales for a selected course, platform and timeframe, and
//! a CSV export of the same data.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod course;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod logging;
mod platform;
mod routing;
mod sales;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use course::{Course, CourseId, NewCourse, create_course};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use sales::{
    NewTeachableSale, NewUdemySale, create_teachable_sale, create_udemy_sale,
};
pub use timezone::get_local_offset;

use crate::html::error_view;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., course ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A report could not be written as CSV.
    #[error("could not export CSV: {0}")]
    CsvExportError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to clients. Internal details are only logged.
    fn client_message(&self) -> String {
        match self {
            Error::NotFound => self.to_string(),
            Error::InvalidTimezoneError(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
            _ => "An unexpected error occurred, check the server logs for more details.".to_owned(),
        }
    }

    /// Render the error as an HTML page instead of JSON.
    fn into_page_response(self) -> Response {
        let status_code = self.status_code();
        let page = match self {
            Error::NotFound => error_view(
                "Not Found",
                "404",
                "Something's missing.",
                "Sorry, we can't find that page or course.",
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                error_view(
                    "Internal Server Error",
                    "500",
                    "Internal Server Error",
                    &error.client_message(),
                )
            }
        };

        (status_code, Html(page.into_string())).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self != Error::NotFound {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (
            self.status_code(),
            Json(json!({ "error": self.client_message() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use crate::Error;

    async fn json_body(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn not_found_is_404_with_json_body() {
        let (status, body) = json_body(Error::NotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["error"],
            Value::from("the requested resource could not be found")
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = json_body(Error::SqlError(rusqlite::Error::InvalidQuery)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("SQL"));
    }

    #[test]
    fn no_rows_is_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn page_response_keeps_the_status_code() {
        let response = Error::DatabaseLockError.into_page_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
