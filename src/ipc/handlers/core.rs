use crate::ipc::error::{err, ok};
use crate::ipc::helpers::str_param;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.to_string_lossy(),
            "tablePath": state.store.path().to_string_lossy(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match str_param(req, "path") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        Ok(_) => return err(&req.id, "bad_params", "path must not be empty", None),
        Err(e) => return e,
    };

    match AppState::open(path.clone()) {
        Ok(next) => {
            *state = next;
            info!(workspace = %path.display(), "workspace selected");
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "tablePath": state.store.path().to_string_lossy(),
                }),
            )
        }
        Err(e) => {
            warn!(workspace = %path.display(), error = %e, "workspace open failed");
            err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": path.to_string_lossy() })),
            )
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
