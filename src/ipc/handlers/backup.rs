use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::str_param;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn path_param(req: &Request, key: &str) -> Result<PathBuf, serde_json::Value> {
    let raw = str_param(req, key)?.trim();
    if raw.is_empty() {
        return Err(err(&req.id, "bad_params", format!("missing {}", key), None));
    }
    Ok(PathBuf::from(raw))
}

fn handle_backup_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match path_param(req, "outPath") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match backup::export_table_bundle(state.store.path(), &out_path) {
        Ok(summary) => {
            info!(out = %out_path.display(), rows = summary.row_count, "exported bundle");
            ok(
                &req.id,
                json!({
                    "path": out_path.to_string_lossy(),
                    "bundleFormat": summary.bundle_format,
                    "rowCount": summary.row_count,
                    "sha256": summary.sha256,
                }),
            )
        }
        Err(e) => err(
            &req.id,
            "io_failed",
            format!("{e:#}"),
            Some(json!({ "path": out_path.to_string_lossy() })),
        ),
    }
}

fn handle_backup_import_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match path_param(req, "inPath") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match backup::import_table_bundle(&in_path, state.store.path()) {
        Ok(summary) => {
            state.selection = None;
            info!(from = %in_path.display(), rows = summary.row_count, "imported bundle");
            ok(
                &req.id,
                json!({
                    "bundleFormatDetected": summary.bundle_format_detected,
                    "rowCount": summary.row_count,
                }),
            )
        }
        Err(e) => err(
            &req.id,
            "io_failed",
            format!("{e:#}"),
            Some(json!({ "path": in_path.to_string_lossy() })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportBundle" => Some(handle_backup_export_bundle(state, req)),
        "backup.importBundle" => Some(handle_backup_import_bundle(state, req)),
        _ => None,
    }
}
