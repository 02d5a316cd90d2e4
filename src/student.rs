use crate::store::{Record, RecordStore};
use thiserror::Error;

pub const NOT_FOUND_MESSAGE: &str = "No data found for the provided Roll No and Class.";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Please enter both Roll No and Class.")]
    MissingInput,
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// First row, in table order, whose trimmed roll number and class equal the
/// trimmed inputs. Roll numbers repeat across centers, so registration order
/// decides which center a student sees.
pub fn lookup(
    store: &RecordStore,
    roll_no: &str,
    class_level: &str,
) -> Result<Option<Record>, LookupError> {
    let roll_no = roll_no.trim();
    let class_level = class_level.trim();
    if roll_no.is_empty() || class_level.is_empty() {
        return Err(LookupError::MissingInput);
    }
    Ok(store
        .read_all()?
        .into_iter()
        .find(|r| r.student_roll_no.trim() == roll_no && r.class_level.trim() == class_level))
}

pub fn describe(record: &Record) -> String {
    format!(
        "Center Code: {}\nCenter Name: {}\nDistrict: {}\nState: {}",
        record.center_code, record.center_name, record.district, record.state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{rec, temp_dir};

    fn seeded(prefix: &str, rows: &[Record]) -> RecordStore {
        let s = RecordStore::in_workspace(&temp_dir(prefix));
        s.init().expect("init");
        s.append_all(rows).expect("append");
        s
    }

    #[test]
    fn first_registered_row_wins() {
        let s = seeded(
            "examcenters-lookup-first",
            &[
                rec("C1", "5", "10"),
                rec("C2", "6", "10"),
                rec("C1", "6", "10"),
            ],
        );
        let hit = lookup(&s, "6", "10").expect("lookup").expect("found");
        assert_eq!(hit.center_code, "C2");
    }

    #[test]
    fn class_must_match_too() {
        let s = seeded(
            "examcenters-lookup-class",
            &[rec("C1", "6", "12"), rec("C3", "6", "10")],
        );
        let hit = lookup(&s, " 6 ", "10 ").expect("lookup").expect("found");
        assert_eq!(hit.center_code, "C3");
        assert!(lookup(&s, "7", "10").expect("lookup").is_none());
    }

    #[test]
    fn stored_values_are_trimmed_before_comparing() {
        let mut padded = rec("C4", " 11 ", "10 ");
        padded.state = "Goa".to_string();
        let s = seeded("examcenters-lookup-trim", &[padded]);
        let hit = lookup(&s, "11", "10").expect("lookup").expect("found");
        assert_eq!(hit.state, "Goa");
    }

    #[test]
    fn blank_input_is_missing_not_miss() {
        let s = seeded("examcenters-lookup-blank", &[rec("C1", "6", "10")]);
        assert!(matches!(
            lookup(&s, "", "10"),
            Err(LookupError::MissingInput)
        ));
        assert!(matches!(
            lookup(&s, "6", "   "),
            Err(LookupError::MissingInput)
        ));
    }

    #[test]
    fn describe_lists_center_details() {
        let text = describe(&rec("C1", "6", "10"));
        assert_eq!(
            text,
            "Center Code: C1\nCenter Name: C1 Hall\nDistrict: Pune\nState: Maharashtra"
        );
    }

    #[test]
    fn unreadable_table_is_io_not_miss() {
        let s = RecordStore::in_workspace(&temp_dir("examcenters-lookup-io"));
        std::fs::write(s.path(), b"Center Code\r\nC1,H,D,S,6,\xff\r\n").expect("write");
        assert!(matches!(lookup(&s, "6", "10"), Err(LookupError::Io(_))));

        let dir_store = RecordStore::in_workspace(&temp_dir("examcenters-lookup-dir"));
        std::fs::create_dir_all(dir_store.path()).expect("mkdir");
        assert!(matches!(lookup(&dir_store, "6", "10"), Err(LookupError::Io(_))));
    }
}
