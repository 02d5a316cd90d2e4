use crate::admin::{self, AdminError, Outcome, RangeRequest};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{bool_param, str_param, text_param};
use crate::ipc::types::{AppState, Request};
use crate::store::CenterDetails;
use serde_json::json;
use tracing::warn;

fn admin_err(req: &Request, e: AdminError) -> serde_json::Value {
    if let AdminError::Io(ref inner) = e {
        warn!(method = %req.method, error = %inner, "table io failed");
    }
    err(&req.id, e.code(), format!("{e:#}"), None)
}

fn outcome_json(outcome: &Outcome) -> serde_json::Value {
    let mut result = json!({
        "success": outcome.success(),
        "message": outcome.message(),
    });
    match outcome {
        Outcome::Done { rows, .. } => result["rowsAffected"] = json!(rows),
        Outcome::NotFound { .. } => result["notFound"] = json!(true),
        Outcome::Cancelled { prompt } => {
            result["cancelled"] = json!(true);
            result["confirmationRequired"] = json!(true);
            result["prompt"] = json!(prompt);
        }
    }
    result
}

fn handle_records_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.store.read_all() {
        Ok(records) => ok(&req.id, json!({ "records": records })),
        Err(e) => err(&req.id, "io_failed", format!("{e:#}"), None),
    }
}

fn handle_records_add_range(state: &mut AppState, req: &Request) -> serde_json::Value {
    let read = || -> Result<[String; 7], serde_json::Value> {
        Ok([
            str_param(req, "centerCode")?.to_string(),
            str_param(req, "centerName")?.to_string(),
            str_param(req, "district")?.to_string(),
            str_param(req, "state")?.to_string(),
            str_param(req, "classLevel")?.to_string(),
            text_param(req, "startRoll")?,
            text_param(req, "endRoll")?,
        ])
    };
    let [center_code, center_name, district, state_name, class_level, start_roll, end_roll] =
        match read() {
            Ok(v) => v,
            Err(e) => return e,
        };

    let range = RangeRequest {
        center_code: &center_code,
        center_name: &center_name,
        district: &district,
        state: &state_name,
        class_level: &class_level,
        start_roll: &start_roll,
        end_roll: &end_roll,
    };
    match admin::add_range(&state.store, &range) {
        Ok(outcome) => {
            let mut result = outcome_json(&outcome);
            if let Outcome::Done { rows, .. } = outcome {
                result["rowsAdded"] = json!(rows);
            }
            ok(&req.id, result)
        }
        Err(e) => admin_err(req, e),
    }
}

fn handle_records_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let center_code = match str_param(req, "centerCode") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let roll_no = match text_param(req, "studentRollNo") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let rows = match state.store.read_all() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "io_failed", format!("{e:#}"), None),
    };
    match rows.into_iter().find(|r| r.has_key(center_code, &roll_no)) {
        Some(record) => {
            let result = json!({ "selected": record });
            state.selection = Some(record);
            ok(&req.id, result)
        }
        None => err(
            &req.id,
            "not_found",
            "record not found",
            Some(json!({ "centerCode": center_code, "studentRollNo": roll_no })),
        ),
    }
}

fn handle_records_clear_selection(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.selection = None;
    ok(&req.id, json!({ "selected": null }))
}

fn handle_records_update_selected(state: &mut AppState, req: &Request) -> serde_json::Value {
    let read = || -> Result<CenterDetails, serde_json::Value> {
        Ok(CenterDetails {
            center_name: str_param(req, "centerName")?.to_string(),
            district: str_param(req, "district")?.to_string(),
            state: str_param(req, "state")?.to_string(),
            class_level: str_param(req, "classLevel")?.to_string(),
        })
    };
    let details = match read() {
        Ok(v) => v,
        Err(e) => return e,
    };
    let confirmed = bool_param(req, "confirmed");

    match admin::update_selected(&state.store, state.selection.as_ref(), &details, |_| confirmed) {
        Ok(outcome) => {
            if outcome.success() {
                state.selection = None;
            }
            ok(&req.id, outcome_json(&outcome))
        }
        Err(e) => admin_err(req, e),
    }
}

fn handle_records_delete_selected(state: &mut AppState, req: &Request) -> serde_json::Value {
    let confirmed = bool_param(req, "confirmed");
    match admin::delete_selected(&state.store, state.selection.as_ref(), |_| confirmed) {
        Ok(outcome) => {
            let mut result = outcome_json(&outcome);
            if let Outcome::Done { rows, .. } = outcome {
                state.selection = None;
                // The whole center goes, not just the selected student.
                result["rowsRemoved"] = json!(rows);
            }
            ok(&req.id, result)
        }
        Err(e) => admin_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "records.list" => Some(handle_records_list(state, req)),
        "records.addRange" => Some(handle_records_add_range(state, req)),
        "records.select" => Some(handle_records_select(state, req)),
        "records.clearSelection" => Some(handle_records_clear_selection(state, req)),
        "records.updateSelected" => Some(handle_records_update_selected(state, req)),
        "records.deleteSelected" => Some(handle_records_delete_selected(state, req)),
        _ => None,
    }
}
