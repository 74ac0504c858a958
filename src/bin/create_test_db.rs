use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, Time};

use course_dashboard::{
    NewCourse, NewTeachableSale, NewUdemySale, create_course, create_teachable_sale,
    create_udemy_sale, initialize_db,
};

/// How many days of sales to create, counting back from today.
const DAYS_OF_SALES: i64 = 430;

/// A utility for creating a demo database for the course sales dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating courses...");
    let courses = [
        ("Rust for Beginners", Some("Rust for Beginners"), Some("Learn Rust: Beginner to Pro")),
        ("Async Rust", Some("Async Rust in Depth"), None),
        ("Web Servers with Axum", None, Some("Build Web Servers with Axum")),
    ];

    for (course_name, teachable_name, udemy_name) in courses {
        create_course(
            &NewCourse {
                course_name: course_name.to_owned(),
                teachable_name: teachable_name.map(str::to_owned),
                udemy_name: udemy_name.map(str::to_owned),
            },
            &conn,
        )?;
    }

    println!("Creating sales...");
    let today = OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT);
    let mut next_id = 1;
    let mut sale_count = 0;

    for days_ago in 0..DAYS_OF_SALES {
        let day = today - Duration::days(days_ago);

        for (course_index, (_, teachable_name, udemy_name)) in courses.iter().enumerate() {
            // A repeating, uneven pattern so the chart has some shape.
            let sales_today = (days_ago * 7 + course_index as i64 * 3) % 5;

            for sale in 0..sales_today {
                let purchased_at = day + Duration::hours(8 + sale * 3);

                if let Some(course_name) = teachable_name.filter(|_| sale % 2 == 0) {
                    create_teachable_sale(
                        &NewTeachableSale {
                            teachable_id: Some(next_id),
                            purchased_at: Some(purchased_at),
                            course_name: course_name.to_string(),
                            final_price: Some(49.0),
                            earnings_usd: Some(44.1),
                            coupon: None,
                            user_id: Some(next_id),
                            sale_id: Some(next_id),
                        },
                        &conn,
                    )?;
                } else if let Some(course_name) = udemy_name {
                    create_udemy_sale(
                        &NewUdemySale {
                            transaction_id: Some(next_id),
                            statement_id: Some(days_ago / 30),
                            date: Some(purchased_at),
                            user_name: Some(format!("Student {next_id}")),
                            course_name: course_name.to_string(),
                            revenue_channel: Some("Organic".to_owned()),
                            vendor: Some("Udemy".to_owned()),
                            price: Some(14.99),
                            transaction_currency: Some("USD".to_owned()),
                            share_price: Some(14.99),
                            instructor_share: Some(5.6),
                            exchange_rate: Some(1.0),
                            ..Default::default()
                        },
                        &conn,
                    )?;
                } else {
                    continue;
                }

                next_id += 1;
                sale_count += 1;
            }
        }
    }

    println!("Created {sale_count} sales. Success!");

    Ok(())
}
