use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::ParameterStore;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    // Release the previous workspace before opening the next one.
    if let Some(previous) = state.store.take() {
        if let Err(e) = previous.close() {
            tracing::warn!(error = %e, "failed to close previous workspace");
        }
        state.workspace = None;
    }

    match ParameterStore::open(&path) {
        Ok(store) => {
            let count = store.count().unwrap_or(0);
            state.workspace = Some(path.clone());
            state.store = Some(store);
            ok(
                &req.id,
                json!({ "workspacePath": path.to_string_lossy(), "parameterCount": count }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
