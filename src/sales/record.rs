//! Raw sale rows from the Teachable and Udemy tables and their mapping to [RawRecord]s.

use rusqlite::{Connection, Row, types::FromSql};
use time::OffsetDateTime;

use crate::{Error, course::Course};

// ============================================================================
// MODELS
// ============================================================================

/// A single sale from either platform, reduced to the fields the report needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// When the sale happened. `None` if the row's date was missing or malformed.
    pub date: Option<OffsetDateTime>,
    /// Identifies the underlying sale across duplicate rows, namespaced by platform.
    pub item_id: Option<String>,
    /// The course's display name.
    pub course_name: String,
    /// The amount earned from the sale in USD.
    pub amount: f64,
}

/// A Teachable sale as exported by Teachable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTeachableSale {
    /// Teachable's ID for the sale row.
    pub teachable_id: Option<i64>,
    /// When the course was purchased.
    pub purchased_at: Option<OffsetDateTime>,
    /// The course name as it appears on Teachable.
    pub course_name: String,
    /// The price paid after coupons.
    pub final_price: Option<f64>,
    /// The amount earned in USD.
    pub earnings_usd: Option<f64>,
    /// The coupon code used, if any.
    pub coupon: Option<String>,
    /// The Teachable user who enrolled.
    pub user_id: Option<i64>,
    /// Teachable's ID for the sale.
    pub sale_id: Option<i64>,
}

/// A Udemy sale as it appears on a Udemy earnings statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUdemySale {
    /// Udemy's ID for the transaction.
    pub transaction_id: Option<i64>,
    /// The earnings statement the sale was reported on.
    pub statement_id: Option<i64>,
    /// When the sale happened.
    pub date: Option<OffsetDateTime>,
    /// The name of the student.
    pub user_name: Option<String>,
    /// The course name as it appears on Udemy.
    pub course_name: String,
    /// The coupon code used, if any.
    pub coupon_code: Option<String>,
    /// How the student found the course, e.g. "Instructor promotion".
    pub revenue_channel: Option<String>,
    /// The store the sale was made through, e.g. "Udemy" or "Apple".
    pub vendor: Option<String>,
    /// The price paid in the transaction currency.
    pub price: Option<f64>,
    /// The currency the student paid in.
    pub transaction_currency: Option<String>,
    /// The tax paid on the sale.
    pub tax_amount: Option<f64>,
    /// The fee taken by the store.
    pub store_fee: Option<f64>,
    /// The price shared between Udemy and the instructor.
    pub share_price: Option<f64>,
    /// The instructor's share of the sale in USD.
    pub instructor_share: Option<f64>,
    /// The tax rate applied to the sale.
    pub tax_rate: Option<f64>,
    /// The exchange rate from the transaction currency to USD.
    pub exchange_rate: Option<f64>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Insert a Teachable sale.
///
/// # Errors
/// Returns an [Error::SqlError] if the row could not be inserted.
pub fn create_teachable_sale(
    sale: &NewTeachableSale,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO teachable (teachable_id, purchased_at, course_name, final_price, \
            earnings_usd, coupon, user_id, sale_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            sale.teachable_id,
            sale.purchased_at,
            &sale.course_name,
            sale.final_price,
            sale.earnings_usd,
            &sale.coupon,
            sale.user_id,
            sale.sale_id,
        ),
    )?;

    Ok(())
}

/// Insert a Udemy sale.
///
/// # Errors
/// Returns an [Error::SqlError] if the row could not be inserted.
pub fn create_udemy_sale(sale: &NewUdemySale, connection: &Connection) -> Result<(), Error> {
    connection
        .prepare(
            "INSERT INTO udemy (transaction_id, statement_id, date, user_name, course_name, \
                coupon_code, revenue_channel, vendor, price, transaction_currency, tax_amount, \
                store_fee, share_price, instructor_share, tax_rate, exchange_rate)
             VALUES (:transaction_id, :statement_id, :date, :user_name, :course_name, \
                :coupon_code, :revenue_channel, :vendor, :price, :transaction_currency, \
                :tax_amount, :store_fee, :share_price, :instructor_share, :tax_rate, \
                :exchange_rate)",
        )?
        .execute(rusqlite::named_params! {
            ":transaction_id": sale.transaction_id,
            ":statement_id": sale.statement_id,
            ":date": sale.date,
            ":user_name": sale.user_name,
            ":course_name": sale.course_name,
            ":coupon_code": sale.coupon_code,
            ":revenue_channel": sale.revenue_channel,
            ":vendor": sale.vendor,
            ":price": sale.price,
            ":transaction_currency": sale.transaction_currency,
            ":tax_amount": sale.tax_amount,
            ":store_fee": sale.store_fee,
            ":share_price": sale.share_price,
            ":instructor_share": sale.instructor_share,
            ":tax_rate": sale.tax_rate,
            ":exchange_rate": sale.exchange_rate,
        })?;

    Ok(())
}

/// Get the Teachable sales of `course` as raw records.
///
/// Courses not sold on Teachable have no records. A Teachable user can
/// only enroll in a course once, so the item ID is the user and course.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_teachable_records(
    course: &Course,
    connection: &Connection,
) -> Result<Vec<RawRecord>, Error> {
    let Some(teachable_name) = course.teachable_name.as_deref() else {
        return Ok(Vec::new());
    };

    connection
        .prepare(
            "SELECT purchased_at, user_id, course_name, earnings_usd
             FROM teachable WHERE course_name = :course_name",
        )?
        .query_map(&[(":course_name", &teachable_name)], |row| {
            let user_id: Option<i64> = row.get(1)?;
            let platform_name: String = row.get(2)?;

            Ok(RawRecord {
                date: lenient_date(row, 0)?,
                item_id: user_id.map(|user_id| format!("teachable:{user_id}:{platform_name}")),
                course_name: course.course_name.clone(),
                amount: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
            })
        })?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

/// Get the Udemy sales of `course` as raw records.
///
/// Courses not sold on Udemy have no records. The item ID is the Udemy
/// transaction ID.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_udemy_records(
    course: &Course,
    connection: &Connection,
) -> Result<Vec<RawRecord>, Error> {
    let Some(udemy_name) = course.udemy_name.as_deref() else {
        return Ok(Vec::new());
    };

    connection
        .prepare(
            "SELECT date, transaction_id, instructor_share
             FROM udemy WHERE course_name = :course_name",
        )?
        .query_map(&[(":course_name", &udemy_name)], |row| {
            let transaction_id: Option<i64> = row.get(1)?;

            Ok(RawRecord {
                date: lenient_date(row, 0)?,
                item_id: transaction_id.map(|id| format!("udemy:{id}")),
                course_name: course.course_name.clone(),
                amount: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
            })
        })?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

/// Read a date column, treating NULL or unparseable values as missing.
fn lenient_date(row: &Row, index: usize) -> Result<Option<OffsetDateTime>, rusqlite::Error> {
    let value = row.get_ref(index)?;

    Ok(OffsetDateTime::column_result(value).ok())
}

/// Create the Teachable and Udemy sales tables.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_sales_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS teachable (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            teachable_id INTEGER,
            purchased_at TEXT,
            course_name TEXT NOT NULL,
            final_price REAL,
            earnings_usd REAL,
            coupon TEXT,
            user_id INTEGER,
            sale_id INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_teachable_course_name ON teachable(course_name);

        CREATE TABLE IF NOT EXISTS udemy (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            transaction_id INTEGER,
            statement_id INTEGER,
            date TEXT,
            user_name TEXT,
            course_name TEXT NOT NULL,
            coupon_code TEXT,
            revenue_channel TEXT,
            vendor TEXT,
            price REAL,
            transaction_currency TEXT,
            tax_amount REAL,
            store_fee REAL,
            share_price REAL,
            instructor_share REAL,
            tax_rate REAL,
            exchange_rate REAL
        );

        CREATE INDEX IF NOT EXISTS idx_udemy_course_name ON udemy(course_name);",
    )
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use super::{
        NewTeachableSale, NewUdemySale, RawRecord, create_teachable_sale, create_udemy_sale,
        get_teachable_records, get_udemy_records,
    };
    use crate::{
        course::{Course, NewCourse, create_course},
        db::initialize,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn create_test_course(conn: &Connection) -> Course {
        create_course(
            &NewCourse {
                course_name: "Rust 101".to_owned(),
                teachable_name: Some("Rust 101 (Teachable)".to_owned()),
                udemy_name: Some("Rust 101: Zero to Hero".to_owned()),
            },
            conn,
        )
        .unwrap()
    }

    #[test]
    fn teachable_rows_map_to_records_with_display_name() {
        let conn = get_test_connection();
        let course = create_test_course(&conn);
        create_teachable_sale(
            &NewTeachableSale {
                purchased_at: Some(datetime!(2023-03-15 10:30 UTC)),
                course_name: "Rust 101 (Teachable)".to_owned(),
                earnings_usd: Some(42.5),
                user_id: Some(7),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let records = get_teachable_records(&course, &conn).unwrap();

        assert_eq!(
            records,
            vec![RawRecord {
                date: Some(datetime!(2023-03-15 10:30 UTC)),
                item_id: Some("teachable:7:Rust 101 (Teachable)".to_owned()),
                course_name: "Rust 101".to_owned(),
                amount: 42.5,
            }]
        );
    }

    #[test]
    fn udemy_rows_map_to_records_with_display_name() {
        let conn = get_test_connection();
        let course = create_test_course(&conn);
        create_udemy_sale(
            &NewUdemySale {
                transaction_id: Some(1234),
                date: Some(datetime!(2023-03-16 08:00 UTC)),
                course_name: "Rust 101: Zero to Hero".to_owned(),
                price: Some(19.99),
                instructor_share: Some(9.5),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let records = get_udemy_records(&course, &conn).unwrap();

        assert_eq!(
            records,
            vec![RawRecord {
                date: Some(datetime!(2023-03-16 08:00 UTC)),
                item_id: Some("udemy:1234".to_owned()),
                course_name: "Rust 101".to_owned(),
                amount: 9.5,
            }]
        );
    }

    #[test]
    fn rows_for_other_courses_are_not_returned() {
        let conn = get_test_connection();
        let course = create_test_course(&conn);
        create_udemy_sale(
            &NewUdemySale {
                transaction_id: Some(1),
                date: Some(datetime!(2023-03-16 08:00 UTC)),
                course_name: "Some Other Course".to_owned(),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert!(get_udemy_records(&course, &conn).unwrap().is_empty());
    }

    #[test]
    fn missing_fields_become_none_or_zero() {
        let conn = get_test_connection();
        let course = create_test_course(&conn);
        create_teachable_sale(
            &NewTeachableSale {
                course_name: "Rust 101 (Teachable)".to_owned(),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let records = get_teachable_records(&course, &conn).unwrap();

        assert_eq!(
            records,
            vec![RawRecord {
                date: None,
                item_id: None,
                course_name: "Rust 101".to_owned(),
                amount: 0.0,
            }]
        );
    }

    #[test]
    fn malformed_dates_are_read_as_missing() {
        let conn = get_test_connection();
        let course = create_test_course(&conn);
        conn.execute(
            "INSERT INTO udemy (transaction_id, date, course_name) VALUES (1, 'not a date', ?1)",
            ["Rust 101: Zero to Hero"],
        )
        .unwrap();

        let records = get_udemy_records(&course, &conn).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, None);
    }

    #[test]
    fn course_without_platform_name_has_no_records() {
        let conn = get_test_connection();
        let course = create_course(
            &NewCourse {
                course_name: "Udemy Only".to_owned(),
                teachable_name: None,
                udemy_name: Some("Udemy Only".to_owned()),
            },
            &conn,
        )
        .unwrap();

        assert!(get_teachable_records(&course, &conn).unwrap().is_empty());
    }
}
