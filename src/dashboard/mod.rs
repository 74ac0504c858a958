//! Dashboard module
//!
//! Provides the page with the course, platform, timeframe and frequency
//! selectors, the sales chart, the totals and the CSV export links.

mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
