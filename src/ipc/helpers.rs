use crate::error::StoreError;
use crate::ipc::error::err;
use crate::model::ParameterFields;
use serde_json::{json, Value};

pub fn store_err(id: &str, e: &StoreError) -> Value {
    let details = match e {
        StoreError::Validation { field, .. } => Some(json!({ "field": field })),
        StoreError::DuplicateKey { name, age_group } | StoreError::NotFound { name, age_group } => {
            Some(json!({ "name": name, "ageGroup": age_group }))
        }
        _ => None,
    };
    err(id, e.code(), e.to_string(), details)
}

pub fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

/// The `(name, ageGroup)` pair identifying an existing record.
pub fn key_params(params: &Value) -> Result<(&str, &str), String> {
    let name = str_param(params, "name").ok_or("missing name")?;
    let age_group = str_param(params, "ageGroup").ok_or("missing ageGroup")?;
    Ok((name, age_group))
}

/// Overlay form fields from `obj` onto `base`. Bounds may arrive as JSON
/// numbers or as the text typed into the form.
pub fn overlay_fields(mut base: ParameterFields, obj: &Value) -> ParameterFields {
    if let Some(v) = obj.get("name") {
        base.name = text_of(v);
    }
    if let Some(v) = obj.get("ageGroup") {
        base.age_group = text_of(v);
    }
    if let Some(v) = obj.get("minValue") {
        base.min_value = text_of(v);
    }
    if let Some(v) = obj.get("maxValue") {
        base.max_value = text_of(v);
    }
    if let Some(v) = obj.get("unit") {
        base.unit = optional_of(v);
    }
    if let Some(v) = obj.get("category") {
        base.category = optional_of(v);
    }
    if let Some(v) = obj.get("subCategory") {
        base.sub_category = optional_of(v);
    }
    if let Some(v) = obj.get("notes") {
        base.notes = optional_of(v);
    }
    base
}

fn text_of(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn optional_of(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        other => Some(text_of(other)),
    }
}
