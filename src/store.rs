use crate::db;
use crate::error::{StoreError, StoreResult};
use crate::import::SkippedEntry;
use crate::model::{optional_text, Parameter};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const SELECT_COLUMNS: &str = "SELECT parameter_name, age_group, low_range, high_range, unit, category, sub_category, notes
     FROM lab_parameters";

/// Outcome of writing a batch of import candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySummary {
    pub added: Vec<Parameter>,
    pub skipped: Vec<SkippedEntry>,
}

/// The reference table of one workspace.
///
/// Owns its SQLite connection for as long as the workspace is selected; each
/// call commits before returning.
pub struct ParameterStore {
    workspace: PathBuf,
    conn: Connection,
}

impl ParameterStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        let conn = db::open_db(workspace)?;
        tracing::info!(workspace = %workspace.display(), "parameter store opened");
        Ok(Self {
            workspace: workspace.to_path_buf(),
            conn,
        })
    }

    pub fn close(self) -> StoreResult<()> {
        let workspace = self.workspace;
        self.conn.close().map_err(|(_, e)| StoreError::Db(e))?;
        tracing::info!(workspace = %workspace.display(), "parameter store closed");
        Ok(())
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn add(&self, record: &Parameter) -> StoreResult<Parameter> {
        let record = record.clone().normalized();
        record.validate()?;
        insert(&self.conn, &record)?;
        tracing::info!(name = %record.name, age_group = %record.age_group, "parameter added");
        Ok(record)
    }

    pub fn get(&self, name: &str, age_group: &str) -> StoreResult<Option<Parameter>> {
        let sql = format!("{SELECT_COLUMNS} WHERE parameter_name = ? AND age_group = ?");
        let found = self
            .conn
            .query_row(&sql, (name.trim(), age_group.trim()), row_to_parameter)
            .optional()?;
        Ok(found)
    }

    pub fn list_all(&self) -> StoreResult<Vec<Parameter>> {
        self.query(
            &format!("{SELECT_COLUMNS} ORDER BY parameter_name, age_group"),
            Vec::new(),
        )
    }

    /// Case-insensitive substring match on the name, exact match on the age
    /// group. Blank or absent filters are ignored.
    /// Folding is full Unicode lowercasing, not SQLite's ASCII-only `lower()`.
    pub fn search(
        &self,
        name_fragment: Option<&str>,
        age_group: Option<&str>,
    ) -> StoreResult<Vec<Parameter>> {
        let rows = match optional_text(age_group) {
            Some(age) => self.query(
                &format!("{SELECT_COLUMNS} WHERE age_group = ? ORDER BY parameter_name, age_group"),
                vec![age],
            )?,
            None => self.list_all()?,
        };
        let Some(fragment) = optional_text(name_fragment) else {
            return Ok(rows);
        };
        let needle = fragment.to_lowercase();
        Ok(rows
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Replace the record stored under `(name, age_group)`.
    ///
    /// The replacement may carry a different key; that key must not belong to
    /// another record.
    pub fn update(
        &self,
        name: &str,
        age_group: &str,
        new_record: &Parameter,
    ) -> StoreResult<Parameter> {
        let (name, age_group) = (name.trim(), age_group.trim());
        let record = new_record.clone().normalized();
        record.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        if !key_exists(&tx, name, age_group)? {
            return Err(StoreError::not_found(name, age_group));
        }
        let key_changed = record.name != name || record.age_group != age_group;
        if key_changed && key_exists(&tx, &record.name, &record.age_group)? {
            return Err(StoreError::duplicate(&record.name, &record.age_group));
        }

        tx.execute(
            "UPDATE lab_parameters
             SET parameter_name = ?, category = ?, sub_category = ?, age_group = ?,
                 low_range = ?, high_range = ?, unit = ?, notes = ?
             WHERE parameter_name = ? AND age_group = ?",
            (
                &record.name,
                &record.category,
                &record.sub_category,
                &record.age_group,
                record.min_value,
                record.max_value,
                &record.unit,
                &record.notes,
                name,
                age_group,
            ),
        )
        .map_err(|e| map_constraint(e, &record))?;
        tx.commit()?;

        tracing::info!(
            from_name = %name,
            from_age_group = %age_group,
            name = %record.name,
            age_group = %record.age_group,
            "parameter updated"
        );
        Ok(record)
    }

    pub fn delete(&self, name: &str, age_group: &str) -> StoreResult<()> {
        let (name, age_group) = (name.trim(), age_group.trim());
        let changed = self.conn.execute(
            "DELETE FROM lab_parameters WHERE parameter_name = ? AND age_group = ?",
            (name, age_group),
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(name, age_group));
        }
        tracing::info!(%name, %age_group, "parameter deleted");
        Ok(())
    }

    /// Delete every record. Returns how many were removed.
    pub fn purge_all(&self) -> StoreResult<usize> {
        let removed = self.conn.execute("DELETE FROM lab_parameters", [])?;
        tracing::warn!(removed, "parameter table purged");
        Ok(removed)
    }

    pub fn count(&self) -> StoreResult<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM lab_parameters", [], |r| r.get(0))?;
        Ok(n as usize)
    }

    pub fn distinct_units(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT unit FROM lab_parameters
             WHERE unit IS NOT NULL AND unit <> ''
             ORDER BY unit",
        )?;
        let units = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(units)
    }

    /// Write every record as a `Field: value` text block. Returns the number
    /// of records written.
    pub fn export(&self, path: &Path) -> StoreResult<usize> {
        let records = self.list_all()?;
        let text = render_export(&records);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        tracing::info!(path = %path.display(), count = records.len(), "parameters exported");
        Ok(records.len())
    }

    /// Insert import candidates in one transaction. Keys that already exist,
    /// or repeat within the batch, are skipped and never overwritten.
    pub fn import_candidates(&self, records: &[Parameter]) -> StoreResult<ApplySummary> {
        let tx = self.conn.unchecked_transaction()?;
        let mut summary = ApplySummary::default();
        for candidate in records {
            let record = candidate.clone().normalized();
            let outcome = match record.validate() {
                Ok(()) => insert(&tx, &record),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => summary.added.push(record),
                Err(e @ (StoreError::DuplicateKey { .. } | StoreError::Validation { .. })) => {
                    tracing::warn!(name = %record.name, age_group = %record.age_group, error = %e, "import candidate skipped");
                    summary.skipped.push(SkippedEntry {
                        location: format!("{} ({})", record.name, record.age_group),
                        name: Some(record.name),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        tx.commit()?;
        tracing::info!(
            added = summary.added.len(),
            skipped = summary.skipped.len(),
            "import applied"
        );
        Ok(summary)
    }

    fn query(&self, sql: &str, args: Vec<String>) -> StoreResult<Vec<Parameter>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(args), row_to_parameter)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn insert(conn: &Connection, record: &Parameter) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO lab_parameters
         (parameter_name, category, sub_category, age_group, low_range, high_range, unit, notes)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &record.name,
            &record.category,
            &record.sub_category,
            &record.age_group,
            record.min_value,
            record.max_value,
            &record.unit,
            &record.notes,
        ),
    )
    .map_err(|e| map_constraint(e, record))?;
    Ok(())
}

fn key_exists(conn: &Connection, name: &str, age_group: &str) -> StoreResult<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM lab_parameters WHERE parameter_name = ? AND age_group = ?",
            (name, age_group),
            |r| r.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

fn map_constraint(e: rusqlite::Error, record: &Parameter) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation => {
            StoreError::duplicate(&record.name, &record.age_group)
        }
        _ => StoreError::Db(e),
    }
}

fn row_to_parameter(row: &Row<'_>) -> rusqlite::Result<Parameter> {
    Ok(Parameter {
        name: row.get(0)?,
        age_group: row.get(1)?,
        min_value: row.get(2)?,
        max_value: row.get(3)?,
        unit: row.get(4)?,
        category: row.get(5)?,
        sub_category: row.get(6)?,
        notes: row.get(7)?,
    })
}

pub fn render_export(records: &[Parameter]) -> String {
    let mut out = String::from("Database Content:\n\n");
    for r in records {
        let _ = writeln!(out, "Parameter: {}", r.name);
        let _ = writeln!(out, "Category: {}", r.category.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Sub-Category: {}", r.sub_category.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Age Group: {}", r.age_group);
        let _ = writeln!(out, "Range: {}", r.range_label());
        let _ = writeln!(out, "Unit: {}", r.unit.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Notes: {}", r.notes.as_deref().unwrap_or(""));
        out.push_str(&"-".repeat(50));
        out.push('\n');
    }
    out
}
