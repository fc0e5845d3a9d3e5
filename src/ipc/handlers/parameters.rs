use crate::catalog;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{key_params, overlay_fields, store_err, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::ParameterFields;
use crate::validate::validate_fields;
use chrono::Local;
use serde_json::json;
use std::path::PathBuf;

fn handle_options(state: &mut AppState, req: &Request) -> serde_json::Value {
    let stored = match state.store.as_ref().map(|s| s.distinct_units()) {
        Some(Ok(units)) => units,
        Some(Err(e)) => return store_err(&req.id, &e),
        None => Vec::new(),
    };
    ok(
        &req.id,
        json!({
            "ageGroups": catalog::AGE_GROUPS,
            "units": catalog::merged_units(&stored),
            "categories": catalog::CATEGORIES,
        }),
    )
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return ok(&req.id, json!({ "parameters": [] }));
    };
    match store.list_all() {
        Ok(rows) => ok(&req.id, json!({ "parameters": rows })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (name, age_group) = match key_params(&req.params) {
        Ok(k) => k,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match store.get(name, age_group) {
        Ok(Some(p)) => ok(&req.id, json!({ "parameter": p })),
        Ok(None) => err(
            &req.id,
            "not_found",
            "parameter not found",
            Some(json!({ "name": name, "ageGroup": age_group })),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return ok(&req.id, json!({ "parameters": [] }));
    };
    let name = str_param(&req.params, "name");
    let age_group = str_param(&req.params, "ageGroup");
    match store.search(name, age_group) {
        Ok(rows) => ok(&req.id, json!({ "parameters": rows })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let fields = overlay_fields(ParameterFields::default(), &req.params);
    let record = match validate_fields(&fields) {
        Ok(r) => r,
        Err(e) => return store_err(&req.id, &e),
    };
    match store.add(&record) {
        Ok(p) => ok(&req.id, json!({ "parameter": p })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (name, age_group) = match key_params(&req.params) {
        Ok(k) => k,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let Some(patch) = req.params.get("patch").filter(|v| v.is_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let current = match store.get(name, age_group) {
        Ok(Some(p)) => p,
        Ok(None) => {
            return err(
                &req.id,
                "not_found",
                "parameter not found",
                Some(json!({ "name": name, "ageGroup": age_group })),
            )
        }
        Err(e) => return store_err(&req.id, &e),
    };
    let fields = overlay_fields(ParameterFields::from(&current), patch);
    let record = match validate_fields(&fields) {
        Ok(r) => r,
        Err(e) => return store_err(&req.id, &e),
    };
    match store.update(name, age_group, &record) {
        Ok(p) => ok(&req.id, json!({ "parameter": p })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (name, age_group) = match key_params(&req.params) {
        Ok(k) => k,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match store.delete(name, age_group) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_purge(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let backup_path = str_param(&req.params, "backupPath").map(PathBuf::from);
    if let Some(path) = backup_path.as_ref() {
        if let Err(e) = store.export(path) {
            return store_err(&req.id, &e);
        }
    }
    match store.purge_all() {
        Ok(removed) => ok(
            &req.id,
            json!({
                "removed": removed,
                "backupPath": backup_path.map(|p| p.to_string_lossy().to_string()),
            }),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let path = match str_param(&req.params, "outPath") {
        Some(p) => PathBuf::from(p),
        None => store.workspace().join(format!(
            "database_export_{}.txt",
            Local::now().format("%Y%m%d_%H%M%S")
        )),
    };
    match store.export(&path) {
        Ok(count) => ok(
            &req.id,
            json!({ "path": path.to_string_lossy(), "count": count }),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "parameters.options" => Some(handle_options(state, req)),
        "parameters.list" => Some(handle_list(state, req)),
        "parameters.get" => Some(handle_get(state, req)),
        "parameters.search" => Some(handle_search(state, req)),
        "parameters.add" => Some(handle_add(state, req)),
        "parameters.update" => Some(handle_update(state, req)),
        "parameters.delete" => Some(handle_delete(state, req)),
        "parameters.purge" => Some(handle_purge(state, req)),
        "parameters.export" => Some(handle_export(state, req)),
        _ => None,
    }
}
