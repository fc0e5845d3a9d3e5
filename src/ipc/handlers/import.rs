use crate::import::{parse_json_import, ImportKeys, ImportOutcome, SkippedEntry};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{store_err, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::Parameter;
use crate::settings;
use crate::store::ParameterStore;
use serde_json::json;

fn import_keys(store: Option<&ParameterStore>) -> anyhow::Result<ImportKeys> {
    match store {
        Some(s) => settings::load_import_keys(s.conn()),
        None => Ok(ImportKeys::default()),
    }
}

// Records sent back from a preview; each one is checked on its own.
fn outcome_from_records(records: &[serde_json::Value]) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();
    for (i, v) in records.iter().enumerate() {
        match serde_json::from_value::<Parameter>(v.clone()) {
            Ok(p) => outcome.records.push(p),
            Err(e) => outcome.skipped.push(SkippedEntry {
                location: format!("records[{i}]"),
                name: v.get("name").and_then(|n| n.as_str()).map(str::to_string),
                reason: e.to_string(),
            }),
        }
    }
    outcome
}

fn handle_preview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(text) = str_param(&req.params, "text") else {
        return err(&req.id, "bad_params", "missing text", None);
    };
    let keys = match import_keys(state.store.as_ref()) {
        Ok(k) => k,
        Err(e) => return err(&req.id, "db_failed", e.to_string(), None),
    };
    match parse_json_import(text, &keys) {
        Ok(outcome) => ok(&req.id, json!(outcome)),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_apply(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let parsed = if let Some(records) = req.params.get("records").and_then(|v| v.as_array()) {
        outcome_from_records(records)
    } else if let Some(text) = str_param(&req.params, "text") {
        let keys = match import_keys(Some(store)) {
            Ok(k) => k,
            Err(e) => return err(&req.id, "db_failed", e.to_string(), None),
        };
        match parse_json_import(text, &keys) {
            Ok(outcome) => outcome,
            Err(e) => return store_err(&req.id, &e),
        }
    } else {
        return err(&req.id, "bad_params", "expected text or records", None);
    };

    let applied = match store.import_candidates(&parsed.records) {
        Ok(s) => s,
        Err(e) => return store_err(&req.id, &e),
    };
    let mut skipped = parsed.skipped;
    skipped.extend(applied.skipped);
    ok(
        &req.id,
        json!({
            "added": applied.added,
            "skipped": skipped,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "import.preview" => Some(handle_preview(state, req)),
        "import.apply" => Some(handle_apply(state, req)),
        _ => None,
    }
}
