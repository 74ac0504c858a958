use axum::{body::Body, response::Response};
use scraper::Html;

use super::http::parse_text;

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let text = parse_text(response).await;

    Html::parse_document(&text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}
