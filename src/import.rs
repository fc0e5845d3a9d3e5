use crate::error::{StoreError, StoreResult};
use crate::model::{optional_text, Parameter};
use crate::range::parse_range;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key names looked up in import documents.
///
/// Stored in the workspace settings so a department can point the importer at
/// its own JSON without a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportKeys {
    pub name: String,
    pub min: String,
    pub max: String,
    pub range: String,
    pub unit: String,
    pub category: String,
    pub sub_category: String,
    pub notes: String,
    pub catalogue_root: String,
    pub catalogue_test: String,
    pub catalogue_range: String,
    pub default_age_group: String,
}

impl Default for ImportKeys {
    fn default() -> Self {
        Self {
            name: "name".into(),
            min: "min".into(),
            max: "max".into(),
            range: "range".into(),
            unit: "unit".into(),
            category: "category".into(),
            sub_category: "subCategory".into(),
            notes: "notes".into(),
            catalogue_root: "NICU_Tests".into(),
            catalogue_test: "Test".into(),
            catalogue_range: "ReferenceRange".into(),
            default_age_group: "All".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    /// Path into the document, e.g. `Adult[2]`.
    pub location: String,
    pub name: Option<String>,
    pub reason: String,
}

/// Partial-success result of an import: everything that parsed, plus one
/// entry per item that did not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub records: Vec<Parameter>,
    pub skipped: Vec<SkippedEntry>,
}

impl ImportOutcome {
    fn skip(&mut self, location: String, name: Option<String>, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(%location, %reason, "import entry skipped");
        self.skipped.push(SkippedEntry {
            location,
            name,
            reason,
        });
    }
}

/// Parse an import document into validated candidate records.
///
/// Two layouts are understood: a mapping from age group to an array of
/// entries, and the catalogue layout rooted at `keys.catalogue_root` where
/// tests are grouped by category (and optionally sub-category) and carry
/// textual reference ranges. Only a malformed document fails the call;
/// malformed entries are reported in `skipped`.
pub fn parse_json_import(text: &str, keys: &ImportKeys) -> StoreResult<ImportOutcome> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| StoreError::Parse(format!("invalid JSON: {e}")))?;
    let Value::Object(root) = doc else {
        return Err(StoreError::Parse(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    let mut outcome = ImportOutcome::default();
    match root.get(&keys.catalogue_root) {
        Some(catalogue) => {
            let Some(categories) = catalogue.as_object() else {
                return Err(StoreError::Parse(format!(
                    "'{}' must be an object of categories",
                    keys.catalogue_root
                )));
            };
            for (category, tests) in categories {
                let location = format!("{}.{}", keys.catalogue_root, category);
                read_category(&location, category, tests, keys, &mut outcome);
            }
        }
        None => {
            for (age_group, entries) in &root {
                read_bracket(age_group, entries, keys, &mut outcome);
            }
        }
    }

    tracing::info!(
        parsed = outcome.records.len(),
        skipped = outcome.skipped.len(),
        "import document parsed"
    );
    Ok(outcome)
}

fn read_bracket(age_group: &str, entries: &Value, keys: &ImportKeys, out: &mut ImportOutcome) {
    let Some(entries) = entries.as_array() else {
        out.skip(
            age_group.to_string(),
            None,
            "age group must map to an array of entries",
        );
        return;
    };
    for (i, entry) in entries.iter().enumerate() {
        let location = format!("{age_group}[{i}]");
        let name = entry
            .get(&keys.name)
            .and_then(|v| v.as_str())
            .and_then(|v| optional_text(Some(v)));
        match bracket_entry(age_group, entry, keys) {
            Ok(record) => out.records.push(record),
            Err(reason) => out.skip(location, name, reason),
        }
    }
}

fn bracket_entry(age_group: &str, entry: &Value, keys: &ImportKeys) -> Result<Parameter, String> {
    let obj = entry
        .as_object()
        .ok_or_else(|| "entry is not an object".to_string())?;
    let name = text_field(obj, &keys.name).ok_or_else(|| format!("missing '{}'", keys.name))?;

    let has_bounds = obj.contains_key(&keys.min) || obj.contains_key(&keys.max);
    let (min_value, max_value, range_unit) = match obj.get(&keys.range) {
        Some(range) if !has_bounds => {
            let text = range_text(range)
                .ok_or_else(|| format!("'{}' must be a string", keys.range))?;
            let parsed = parse_range(&text);
            let (low, high) = parsed
                .bounds()
                .ok_or_else(|| format!("range '{text}' has no lower and upper bound"))?;
            (low, high, parsed.unit().map(str::to_string))
        }
        _ => (
            number_field(obj, &keys.min)?,
            number_field(obj, &keys.max)?,
            None,
        ),
    };

    let record = Parameter {
        name,
        age_group: age_group.to_string(),
        min_value,
        max_value,
        unit: text_field(obj, &keys.unit).or(range_unit),
        category: text_field(obj, &keys.category),
        sub_category: text_field(obj, &keys.sub_category),
        notes: text_field(obj, &keys.notes),
    }
    .normalized();
    record.validate().map_err(|e| e.to_string())?;
    Ok(record)
}

fn read_category(
    location: &str,
    category: &str,
    tests: &Value,
    keys: &ImportKeys,
    out: &mut ImportOutcome,
) {
    match tests {
        Value::Array(entries) => {
            read_tests(location, category, None, entries, keys, out);
        }
        Value::Object(groups) if groups.values().any(Value::is_array) => {
            for (sub_category, entries) in groups {
                let sub_location = format!("{location}.{sub_category}");
                match entries.as_array() {
                    Some(entries) => read_tests(
                        &sub_location,
                        category,
                        Some(sub_category.as_str()),
                        entries,
                        keys,
                        out,
                    ),
                    None => out.skip(sub_location, None, "sub-category must be an array of tests"),
                }
            }
        }
        _ => out.skip(
            location.to_string(),
            None,
            "category must be an array of tests or an object of sub-categories",
        ),
    }
}

fn read_tests(
    location: &str,
    category: &str,
    sub_category: Option<&str>,
    entries: &[Value],
    keys: &ImportKeys,
    out: &mut ImportOutcome,
) {
    for (i, entry) in entries.iter().enumerate() {
        let location = format!("{location}[{i}]");
        let Some(obj) = entry.as_object() else {
            out.skip(location, None, "test is not an object");
            continue;
        };
        let Some(name) = text_field(obj, &keys.catalogue_test) else {
            out.skip(location, None, format!("missing '{}'", keys.catalogue_test));
            continue;
        };
        let Some(reference) = obj.get(&keys.catalogue_range) else {
            out.skip(
                location,
                Some(name),
                format!("missing '{}'", keys.catalogue_range),
            );
            continue;
        };

        let per_age: Vec<(String, &Value)> = match reference {
            Value::Object(ranges) => ranges.iter().map(|(k, v)| (k.clone(), v)).collect(),
            other => vec![(keys.default_age_group.clone(), other)],
        };
        for (age_group, range) in per_age {
            let entry_location = format!("{location}.{age_group}");
            match catalogue_record(&name, &age_group, category, sub_category, range) {
                Ok(record) => out.records.push(record),
                Err(reason) => out.skip(entry_location, Some(name.clone()), reason),
            }
        }
    }
}

fn catalogue_record(
    name: &str,
    age_group: &str,
    category: &str,
    sub_category: Option<&str>,
    range: &Value,
) -> Result<Parameter, String> {
    let text = range_text(range).ok_or_else(|| "reference range must be text".to_string())?;
    let parsed = parse_range(&text);
    let (low, high) = parsed
        .bounds()
        .ok_or_else(|| format!("range '{text}' has no lower and upper bound"))?;

    let record = Parameter {
        name: name.to_string(),
        age_group: age_group.to_string(),
        min_value: low,
        max_value: high,
        unit: parsed.unit().map(str::to_string),
        category: Some(category.to_string()),
        sub_category: sub_category.map(str::to_string),
        notes: None,
    }
    .normalized();
    record.validate().map_err(|e| e.to_string())?;
    Ok(record)
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    optional_text(obj.get(key).and_then(|v| v.as_str()))
}

fn range_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(obj: &Map<String, Value>, key: &str) -> Result<f64, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(format!("missing '{key}'")),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| format!("'{key}' is not a number")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("'{key}' is not a number: '{s}'")),
        Some(_) => Err(format!("'{key}' is not a number")),
    }
}
