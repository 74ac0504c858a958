//! Drops records that appear more than once in a request.
//!
//! The same sale can be returned once per joined source row, so every record
//! carries a platform-specific item ID that identifies the underlying sale.

use std::collections::HashSet;

use super::record::RawRecord;

/// Returns `true` if `record` should be kept.
///
/// A record is dropped when it has no date, has a missing or empty item ID,
/// or its item ID is already in `seen`. Kept records have their item ID
/// added to `seen`.
pub fn dedupe(record: &RawRecord, seen: &mut HashSet<String>) -> bool {
    if record.date.is_none() {
        return false;
    }

    match record.item_id.as_deref() {
        None | Some("") => false,
        Some(item_id) => seen.insert(item_id.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use time::macros::datetime;

    use super::dedupe;
    use crate::sales::record::RawRecord;

    fn record(item_id: Option<&str>) -> RawRecord {
        RawRecord {
            date: Some(datetime!(2023-03-15 10:00 UTC)),
            item_id: item_id.map(str::to_owned),
            course_name: "Rust 101".to_owned(),
            amount: 10.0,
        }
    }

    #[test]
    fn keeps_first_occurrence_only() {
        let mut seen = HashSet::new();

        assert!(dedupe(&record(Some("a")), &mut seen));
        assert!(!dedupe(&record(Some("a")), &mut seen));
        assert!(dedupe(&record(Some("b")), &mut seen));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn at_most_one_survives_regardless_of_order() {
        let first = RawRecord {
            amount: 1.0,
            ..record(Some("same"))
        };
        let second = RawRecord {
            amount: 2.0,
            ..record(Some("same"))
        };

        for (a, b) in [(&first, &second), (&second, &first)] {
            let mut seen = HashSet::new();
            let kept = [a, b]
                .into_iter()
                .filter(|record| dedupe(record, &mut seen))
                .count();

            assert_eq!(kept, 1);
        }
    }

    #[test]
    fn drops_records_without_an_id() {
        let mut seen = HashSet::new();

        assert!(!dedupe(&record(None), &mut seen));
        assert!(!dedupe(&record(Some("")), &mut seen));
        assert!(seen.is_empty());
    }

    #[test]
    fn drops_records_without_a_date() {
        let mut seen = HashSet::new();
        let undated = RawRecord {
            date: None,
            ..record(Some("a"))
        };

        assert!(!dedupe(&undated, &mut seen));
        // The ID is not consumed, so a dated copy is still kept.
        assert!(dedupe(&record(Some("a")), &mut seen));
    }
}
