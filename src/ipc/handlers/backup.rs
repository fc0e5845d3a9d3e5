use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::str_param;
use crate::ipc::types::{AppState, Request};
use crate::store::ParameterStore;
use serde_json::json;
use std::path::PathBuf;

fn handle_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(out_path) = str_param(&req.params, "outPath").map(PathBuf::from) else {
        return err(&req.id, "bad_params", "missing outPath", None);
    };
    match backup::export_workspace_bundle(&workspace, &out_path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "ok": true,
                "path": out_path.to_string_lossy(),
                "bundleFormat": summary.bundle_format,
                "entryCount": summary.entry_count,
                "dbSha256": summary.db_sha256,
            }),
        ),
        Err(e) => err(&req.id, "io_failed", format!("{e:#}"), None),
    }
}

fn handle_import_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(in_path) = str_param(&req.params, "inPath").map(PathBuf::from) else {
        return err(&req.id, "bad_params", "missing inPath", None);
    };

    // The database file is replaced underneath the connection, so close it
    // first and reopen whatever ends up on disk.
    if let Some(store) = state.store.take() {
        if let Err(e) = store.close() {
            tracing::warn!(error = %e, "failed to close store before bundle import");
        }
    }
    let imported = backup::import_workspace_bundle(&in_path, &workspace);
    let reopened = ParameterStore::open(&workspace);

    match (imported, reopened) {
        (Ok(summary), Ok(store)) => {
            let count = store.count().unwrap_or(0);
            state.store = Some(store);
            ok(
                &req.id,
                json!({
                    "ok": true,
                    "bundleFormatDetected": summary.bundle_format_detected,
                    "parameterCount": count,
                }),
            )
        }
        (Err(e), reopened) => {
            state.store = reopened.ok();
            if state.store.is_none() {
                state.workspace = None;
            }
            err(&req.id, "io_failed", format!("{e:#}"), None)
        }
        (Ok(_), Err(e)) => {
            state.workspace = None;
            err(&req.id, "db_open_failed", format!("{e:#}"), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportWorkspaceBundle" => Some(handle_export_bundle(state, req)),
        "backup.importWorkspaceBundle" => Some(handle_import_bundle(state, req)),
        _ => None,
    }
}
