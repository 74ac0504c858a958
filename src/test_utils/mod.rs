pub(crate) mod html;
pub(crate) mod http;

pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::{assert_status_ok, get_header, parse_text};
