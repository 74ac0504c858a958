//! The sales chart drawn on the dashboard.
//!
//! The chart is generated as JSON configuration for the ECharts library and
//! rendered with an HTML container and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::Line,
};
use maud::{Markup, PreEscaped, html};

use crate::{
    html::HeadElement,
    sales::{ChartSeries, Frequency, SeriesPoint},
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML container for a dashboard chart.
pub(super) fn chart_view(chart: &DashboardChart) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div
                id=(chart.id)
                class="min-h-[420px] rounded dark:bg-gray-100"
            {}
        }
    )
}

/// Generates JavaScript initialization code for a dashboard chart.
///
/// The chart follows the browser's dark mode setting and resizes with the window.
pub(super) fn chart_script(chart: &DashboardChart) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chartDom = document.getElementById("{}");
            const chart = echarts.init(chartDom);
            const option = {};
            chart.setOption(option);

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                const isDarkMode = darkModeMediaQuery.matches;
                chart.setTheme(isDarkMode ? 'dark' : 'default');
            }}
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#,
        chart.id, chart.options
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

/// Enrollments on the left axis, sales and average sales on the right.
pub(super) fn sales_chart(series: &ChartSeries, frequency: Frequency) -> Chart {
    let labels: Vec<String> = series
        .sales
        .iter()
        .map(|point| frequency.slot_label(point.date))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Enrollments and Sales")
                .subtext(frequency.label()),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Cross)),
        )
        .legend(Legend::new().top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value).name("Enrollments"))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name("Sales")
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Enrollments").data(values(&series.enrollments)))
        .series(
            Line::new()
                .name("Sales")
                .y_axis_index(1)
                .data(values(&series.sales)),
        )
        .series(
            Line::new()
                .name("Average Sales")
                .y_axis_index(1)
                .data(values(&series.average_sales)),
        )
}

fn values(points: &[SeriesPoint]) -> Vec<f64> {
    points.iter().map(|point| point.value).collect()
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}
