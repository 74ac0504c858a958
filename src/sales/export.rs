//! CSV export of per-day, per-course report rows.

use super::bucket::{CourseAggregate, DayBucket};
use crate::Error;

/// The value written to the last column of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMetric {
    /// The number of sales.
    Enrollments,
    /// The summed sale amounts.
    Sales,
}

impl ExportMetric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Enrollments => "Enrollments",
            Self::Sales => "Sales",
        }
    }

    /// The name of the downloaded file.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Enrollments => "enrollmentsPerDay.csv",
            Self::Sales => "salesPerDay.csv",
        }
    }

    fn value(self, aggregate: &CourseAggregate) -> String {
        match self {
            Self::Enrollments => aggregate.count.to_string(),
            Self::Sales => aggregate.total.to_string(),
        }
    }
}

/// Write `days` as CSV with one row per day and course.
///
/// The header is `Course Name,Date,<metric>` and dates are `MM/DD/YYYY`.
///
/// # Errors
/// Returns an [Error::CsvExportError] if a row could not be written.
pub fn export_csv(days: &[DayBucket], metric: ExportMetric) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Course Name", "Date", metric.label()])
        .map_err(|error| Error::CsvExportError(error.to_string()))?;

    for day in days {
        let date = format!(
            "{:02}/{:02}/{}",
            u8::from(day.date.month()),
            day.date.day(),
            day.date.year()
        );

        for aggregate in &day.course_aggregates {
            let value = metric.value(aggregate);

            writer
                .write_record([aggregate.course_name.as_str(), date.as_str(), value.as_str()])
                .map_err(|error| Error::CsvExportError(error.to_string()))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvExportError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvExportError(error.to_string()))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{ExportMetric, export_csv};
    use crate::sales::bucket::{CourseAggregate, DayBucket};

    fn days() -> Vec<DayBucket> {
        vec![
            DayBucket {
                date: date!(2023 - 03 - 05),
                course_aggregates: vec![
                    CourseAggregate {
                        course_name: "Rust 101".to_owned(),
                        count: 2,
                        total: 25.5,
                    },
                    CourseAggregate {
                        course_name: "Go, the Easy Way".to_owned(),
                        count: 1,
                        total: 10.0,
                    },
                ],
            },
            DayBucket {
                date: date!(2023 - 11 - 16),
                course_aggregates: vec![CourseAggregate {
                    course_name: "Rust 101".to_owned(),
                    count: 3,
                    total: 30.0,
                }],
            },
        ]
    }

    #[test]
    fn enrollments_export_counts() {
        let csv = export_csv(&days(), ExportMetric::Enrollments).unwrap();

        assert_eq!(
            csv,
            "Course Name,Date,Enrollments\n\
             Rust 101,03/05/2023,2\n\
             \"Go, the Easy Way\",03/05/2023,1\n\
             Rust 101,11/16/2023,3\n"
        );
    }

    #[test]
    fn sales_export_totals() {
        let csv = export_csv(&days(), ExportMetric::Sales).unwrap();

        assert_eq!(
            csv,
            "Course Name,Date,Sales\n\
             Rust 101,03/05/2023,25.5\n\
             \"Go, the Easy Way\",03/05/2023,10\n\
             Rust 101,11/16/2023,30\n"
        );
    }

    #[test]
    fn no_days_is_just_the_header() {
        let csv = export_csv(&[], ExportMetric::Sales).unwrap();

        assert_eq!(csv, "Course Name,Date,Sales\n");
    }
}
