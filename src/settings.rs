use crate::db;
use crate::import::ImportKeys;
use rusqlite::Connection;
use serde_json::{Map, Value};
use thiserror::Error;

pub const IMPORT_KEYS: &str = "import.keys";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    BadPatch(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Import key names for this workspace, falling back to the defaults for any
/// key that was never customised.
pub fn load_import_keys(conn: &Connection) -> anyhow::Result<ImportKeys> {
    match db::settings_get_json(conn, IMPORT_KEYS)? {
        Some(v) => Ok(serde_json::from_value(v)?),
        None => Ok(ImportKeys::default()),
    }
}

/// Merge `patch` into the stored import keys. Every patched key must be a
/// known field with a non-empty string value.
pub fn update_import_keys(
    conn: &Connection,
    patch: &Map<String, Value>,
) -> Result<ImportKeys, SettingsError> {
    let current = load_import_keys(conn)?;
    let mut merged = serde_json::to_value(&current)?;
    let Some(obj) = merged.as_object_mut() else {
        return Err(SettingsError::BadPatch(
            "import keys must serialize to an object".to_string(),
        ));
    };
    for (k, v) in patch {
        if !obj.contains_key(k) {
            return Err(SettingsError::BadPatch(format!("unknown import key: {k}")));
        }
        let Some(text) = v.as_str().map(str::trim).filter(|s| !s.is_empty()) else {
            return Err(SettingsError::BadPatch(format!(
                "{k} must be a non-empty string"
            )));
        };
        obj.insert(k.clone(), Value::String(text.to_string()));
    }

    let keys: ImportKeys = serde_json::from_value(merged)?;
    db::settings_set_json(conn, IMPORT_KEYS, &serde_json::to_value(&keys)?)?;
    tracing::info!("import key settings updated");
    Ok(keys)
}
