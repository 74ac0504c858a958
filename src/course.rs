//! Courses and the names they are sold under on each platform.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::Error;

/// Alias for the integer type used for course IDs.
pub type CourseId = i64;

/// A course sold on one or both platforms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// The ID of the course.
    pub id: CourseId,
    /// The name shown on the dashboard.
    pub course_name: String,
    /// The name of the course on Teachable, `None` if it is not sold there.
    pub teachable_name: Option<String>,
    /// The name of the course on Udemy, `None` if it is not sold there.
    pub udemy_name: Option<String>,
}

/// The data needed to create a [Course].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    /// The name shown on the dashboard.
    pub course_name: String,
    /// The name of the course on Teachable, if it is sold there.
    pub teachable_name: Option<String>,
    /// The name of the course on Udemy, if it is sold there.
    pub udemy_name: Option<String>,
}

/// Create a course.
///
/// # Errors
/// Returns an [Error::SqlError] if the course could not be inserted.
pub fn create_course(course: &NewCourse, connection: &Connection) -> Result<Course, Error> {
    let course = connection
        .prepare(
            "INSERT INTO course (course_name, teachable_name, udemy_name)
             VALUES (?1, ?2, ?3)
             RETURNING id, course_name, teachable_name, udemy_name",
        )?
        .query_row(
            (&course.course_name, &course.teachable_name, &course.udemy_name),
            map_course_row,
        )?;

    Ok(course)
}

/// Retrieve a course by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a course,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_course(id: CourseId, connection: &Connection) -> Result<Course, Error> {
    let course = connection
        .prepare("SELECT id, course_name, teachable_name, udemy_name FROM course WHERE id = :id")?
        .query_one(&[(":id", &id)], map_course_row)?;

    Ok(course)
}

/// Retrieve all courses ordered by name.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_courses(connection: &Connection) -> Result<Vec<Course>, Error> {
    connection
        .prepare(
            "SELECT id, course_name, teachable_name, udemy_name FROM course
             ORDER BY course_name ASC",
        )?
        .query_map([], map_course_row)?
        .map(|maybe_course| maybe_course.map_err(Error::from))
        .collect()
}

/// Create the course table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_course_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS course (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_name TEXT NOT NULL,
            teachable_name TEXT,
            udemy_name TEXT
        )",
        (),
    )?;

    Ok(())
}

fn map_course_row(row: &Row) -> Result<Course, rusqlite::Error> {
    Ok(Course {
        id: row.get(0)?,
        course_name: row.get(1)?,
        teachable_name: row.get(2)?,
        udemy_name: row.get(3)?,
    })
}
