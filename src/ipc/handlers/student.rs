use crate::ipc::error::{err, ok};
use crate::ipc::helpers::text_param;
use crate::ipc::types::{AppState, Request};
use crate::student::{self, LookupError, NOT_FOUND_MESSAGE};
use serde_json::json;

fn handle_student_lookup(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Absent fields behave like empty text boxes.
    let roll_no = text_param(req, "rollNo").unwrap_or_default();
    let class_level = text_param(req, "classLevel").unwrap_or_default();

    match student::lookup(&state.store, &roll_no, &class_level) {
        Ok(Some(record)) => ok(
            &req.id,
            json!({
                "found": true,
                "details": student::describe(&record),
                "record": record,
            }),
        ),
        Ok(None) => ok(
            &req.id,
            json!({ "found": false, "message": NOT_FOUND_MESSAGE }),
        ),
        Err(e @ LookupError::MissingInput) => err(&req.id, "input_error", e.to_string(), None),
        Err(LookupError::Io(e)) => err(&req.id, "io_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "student.lookup" => Some(handle_student_lookup(state, req)),
        _ => None,
    }
}
