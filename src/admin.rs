use crate::store::{CenterDetails, Record, RecordStore};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0}")]
    Input(&'static str),
    #[error("{0}")]
    NoSelection(&'static str),
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

impl AdminError {
    pub fn code(&self) -> &'static str {
        match self {
            AdminError::Input(_) => "input_error",
            AdminError::NoSelection(_) => "no_selection",
            AdminError::Io(_) => "io_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done { message: String, rows: usize },
    NotFound { message: String },
    Cancelled { prompt: String },
}

impl Outcome {
    pub fn success(&self) -> bool {
        matches!(self, Outcome::Done { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Done { message, .. } | Outcome::NotFound { message } => message.as_str(),
            Outcome::Cancelled { prompt } => prompt.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RangeRequest<'a> {
    pub center_code: &'a str,
    pub center_name: &'a str,
    pub district: &'a str,
    pub state: &'a str,
    pub class_level: &'a str,
    pub start_roll: &'a str,
    pub end_roll: &'a str,
}

/// Largest number of rows one range add may write.
pub const MAX_RANGE_ROWS: i128 = 100_000;

pub fn add_range(store: &RecordStore, req: &RangeRequest<'_>) -> Result<Outcome, AdminError> {
    const BAD_NUMBER: &str = "Please enter valid numeric values for Roll No.";
    let start = req
        .start_roll
        .trim()
        .parse::<i64>()
        .map_err(|_| AdminError::Input(BAD_NUMBER))?;
    let end = req
        .end_roll
        .trim()
        .parse::<i64>()
        .map_err(|_| AdminError::Input(BAD_NUMBER))?;
    if start > end {
        return Err(AdminError::Input(
            "Starting Roll No cannot be greater than Ending Roll No.",
        ));
    }

    if end as i128 - start as i128 + 1 > MAX_RANGE_ROWS {
        return Err(AdminError::Input(
            "Roll No range is too large; add at most 100000 roll numbers at a time.",
        ));
    }

    let mut record = Record {
        center_code: req.center_code.to_string(),
        center_name: req.center_name.to_string(),
        district: req.district.to_string(),
        state: req.state.to_string(),
        student_roll_no: String::new(),
        class_level: req.class_level.to_string(),
    };
    let mut added = 0usize;
    for roll in start..=end {
        record.student_roll_no = roll.to_string();
        store.append(&record)?;
        added += 1;
    }
    info!(center_code = req.center_code, start, end, added, "added roll range");

    Ok(Outcome::Done {
        message: format!(
            "Records for roll numbers {} to {} added successfully!",
            start, end
        ),
        rows: added,
    })
}

pub fn update_selected(
    store: &RecordStore,
    selected: Option<&Record>,
    details: &CenterDetails,
    confirm: impl FnOnce(&str) -> bool,
) -> Result<Outcome, AdminError> {
    let Some(sel) = selected else {
        return Err(AdminError::NoSelection("Please select a record to update."));
    };
    let prompt = format!(
        "Are you sure you want to update record with Center Code: {}, Roll No: {}?",
        sel.center_code, sel.student_roll_no
    );
    if !confirm(&prompt) {
        return Ok(Outcome::Cancelled { prompt });
    }

    let matched = store.update(&sel.center_code, &sel.student_roll_no, details)?;
    if matched > 0 {
        Ok(Outcome::Done {
            message: "Record updated successfully.".to_string(),
            rows: matched,
        })
    } else {
        Ok(Outcome::NotFound {
            message: "Record not found.".to_string(),
        })
    }
}

/// Deletes by the selection's center code, which removes every student
/// registered at that center, not only the selected row.
pub fn delete_selected(
    store: &RecordStore,
    selected: Option<&Record>,
    confirm: impl FnOnce(&str) -> bool,
) -> Result<Outcome, AdminError> {
    let Some(sel) = selected else {
        return Err(AdminError::NoSelection("Please select a record to delete."));
    };
    let prompt = format!(
        "Are you sure you want to delete record with Center Code: {}?",
        sel.center_code
    );
    if !confirm(&prompt) {
        return Ok(Outcome::Cancelled { prompt });
    }

    let removed = store.delete(&sel.center_code)?;
    Ok(Outcome::Done {
        message: format!(
            "Record with Center Code: {} deleted successfully.",
            sel.center_code
        ),
        rows: removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{rec, temp_dir};

    fn store(prefix: &str) -> RecordStore {
        let s = RecordStore::in_workspace(&temp_dir(prefix));
        s.init().expect("init");
        s
    }

    fn range<'a>(start: &'a str, end: &'a str) -> RangeRequest<'a> {
        RangeRequest {
            center_code: "C1",
            center_name: "City Hall",
            district: "Nashik",
            state: "Maharashtra",
            class_level: "10",
            start_roll: start,
            end_roll: end,
        }
    }

    fn details(district: &str) -> CenterDetails {
        CenterDetails {
            center_name: "C1 Hall".to_string(),
            district: district.to_string(),
            state: "Maharashtra".to_string(),
            class_level: "10".to_string(),
        }
    }

    #[test]
    fn add_range_appends_inclusive_rolls() {
        let s = store("examcenters-admin-range");
        let out = add_range(&s, &range("5", " 8 ")).expect("add");
        assert!(out.success());
        assert_eq!(
            out.message(),
            "Records for roll numbers 5 to 8 added successfully!"
        );

        let rows = s.read_all().expect("read");
        let rolls: Vec<&str> = rows.iter().map(|r| r.student_roll_no.as_str()).collect();
        assert_eq!(rolls, vec!["5", "6", "7", "8"]);
        assert!(rows.iter().all(|r| r.center_code == "C1"
            && r.center_name == "City Hall"
            && r.district == "Nashik"
            && r.class_level == "10"));
    }

    #[test]
    fn add_range_single_roll() {
        let s = store("examcenters-admin-single");
        let out = add_range(&s, &range("3", "3")).expect("add");
        assert_eq!(
            out,
            Outcome::Done {
                message: "Records for roll numbers 3 to 3 added successfully!".to_string(),
                rows: 1
            }
        );
    }

    #[test]
    fn add_range_rejects_reversed_and_non_numeric_bounds() {
        let s = store("examcenters-admin-bad");
        let before = std::fs::read_to_string(s.path()).expect("read");

        let e = add_range(&s, &range("9", "3")).expect_err("reversed");
        assert_eq!(e.code(), "input_error");
        assert_eq!(
            e.to_string(),
            "Starting Roll No cannot be greater than Ending Roll No."
        );

        let e = add_range(&s, &range("abc", "3")).expect_err("non-numeric");
        assert_eq!(e.to_string(), "Please enter valid numeric values for Roll No.");
        let e = add_range(&s, &range("1", "")).expect_err("empty");
        assert_eq!(e.code(), "input_error");

        assert_eq!(std::fs::read_to_string(s.path()).expect("read"), before);
    }

    #[test]
    fn update_requires_selection_and_confirmation() {
        let s = store("examcenters-admin-update");
        s.append_all(&[rec("C1", "5", "10"), rec("C1", "6", "10")])
            .expect("append");

        let e = update_selected(&s, None, &details("D2"), |_| true).expect_err("no selection");
        assert_eq!(e.code(), "no_selection");

        let sel = rec("C1", "6", "10");
        let mut asked = String::new();
        let out = update_selected(&s, Some(&sel), &details("D2"), |p| {
            asked = p.to_string();
            false
        })
        .expect("declined");
        assert!(matches!(out, Outcome::Cancelled { .. }));
        assert_eq!(
            asked,
            "Are you sure you want to update record with Center Code: C1, Roll No: 6?"
        );
        assert_eq!(s.read_all().expect("read")[1].district, "Pune");

        let out = update_selected(&s, Some(&sel), &details("D2"), |_| true).expect("update");
        assert_eq!(out.message(), "Record updated successfully.");
        let rows = s.read_all().expect("read");
        assert_eq!(rows[0].district, "Pune");
        assert_eq!(rows[1].district, "D2");
    }

    #[test]
    fn update_of_vanished_selection_is_not_found() {
        let s = store("examcenters-admin-gone");
        let sel = rec("C7", "1", "12");
        let out = update_selected(&s, Some(&sel), &details("D2"), |_| true).expect("update");
        assert_eq!(
            out,
            Outcome::NotFound {
                message: "Record not found.".to_string()
            }
        );
        assert!(!out.success());
    }

    #[test]
    fn delete_selected_drops_whole_center() {
        let s = store("examcenters-admin-delete");
        s.append_all(&[
            rec("C1", "1", "10"),
            rec("C2", "1", "10"),
            rec("C1", "2", "10"),
        ])
        .expect("append");

        let e = delete_selected(&s, None, |_| true).expect_err("no selection");
        assert_eq!(e.to_string(), "Please select a record to delete.");

        let sel = rec("C1", "2", "10");
        let out = delete_selected(&s, Some(&sel), |_| false).expect("declined");
        assert!(!out.success());
        assert_eq!(s.read_all().expect("read").len(), 3);

        let out = delete_selected(&s, Some(&sel), |_| true).expect("delete");
        assert_eq!(
            out,
            Outcome::Done {
                message: "Record with Center Code: C1 deleted successfully.".to_string(),
                rows: 2
            }
        );
        assert_eq!(s.read_all().expect("read"), vec![rec("C2", "1", "10")]);
    }

    #[test]
    fn add_range_refuses_oversized_span() {
        let s = store("examcenters-admin-huge");
        let before = std::fs::read_to_string(s.path()).expect("read");

        let e = add_range(&s, &range("0", "9999999999")).expect_err("too large");
        assert_eq!(e.code(), "input_error");
        let e = add_range(&s, &range("-9223372036854775808", "9223372036854775807"))
            .expect_err("full i64 span");
        assert_eq!(e.code(), "input_error");
        let e = add_range(&s, &range("1", "100001")).expect_err("one past the limit");
        assert_eq!(e.code(), "input_error");
        assert_eq!(std::fs::read_to_string(s.path()).expect("read"), before);
    }

    #[test]
    fn update_reports_every_duplicate_row() {
        let s = store("examcenters-admin-dupes");
        add_range(&s, &range("1", "2")).expect("first add");
        add_range(&s, &range("1", "2")).expect("second add");
        let sel = rec("C1", "2", "10");
        let out = update_selected(&s, Some(&sel), &details("D2"), |_| true).expect("update");
        assert_eq!(
            out,
            Outcome::Done {
                message: "Record updated successfully.".to_string(),
                rows: 2
            }
        );
    }

    #[test]
    fn unreadable_table_surfaces_as_io_error() {
        let s = store("examcenters-admin-io");
        let garbage = b"Center Code\r\nC1,\xff\xfe,D,S,1,10\r\n".to_vec();
        std::fs::write(s.path(), &garbage).expect("write");
        let sel = rec("C1", "1", "10");

        let e = update_selected(&s, Some(&sel), &details("D2"), |_| true).expect_err("update");
        assert!(matches!(e, AdminError::Io(_)));
        assert_eq!(e.code(), "io_failed");
        let e = delete_selected(&s, Some(&sel), |_| true).expect_err("delete");
        assert!(matches!(e, AdminError::Io(_)));
        assert_eq!(std::fs::read(s.path()).expect("read"), garbage);
    }

    #[test]
    fn directory_at_table_path_surfaces_as_io_error() {
        let dir = temp_dir("examcenters-admin-dir");
        let s = RecordStore::in_workspace(&dir);
        std::fs::create_dir_all(s.path().join("inner")).expect("mkdir");

        let e = add_range(&s, &range("1", "3")).expect_err("append");
        assert!(matches!(e, AdminError::Io(_)));
        let e = delete_selected(&s, Some(&rec("C1", "1", "10")), |_| true).expect_err("delete");
        assert!(matches!(e, AdminError::Io(_)));
        assert!(s.path().join("inner").is_dir());
    }
}
