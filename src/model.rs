use serde::{Deserialize, Serialize};

/// One reference-range row: a lab test for a given age group.
///
/// `(name, age_group)` is the unique key in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub age_group: String,
    pub min_value: f64,
    pub max_value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Parameter {
    pub fn new(name: &str, age_group: &str, min_value: f64, max_value: f64) -> Self {
        Self {
            name: name.to_string(),
            age_group: age_group.to_string(),
            min_value,
            max_value,
            unit: None,
            category: None,
            sub_category: None,
            notes: None,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Trim required keys and collapse blank optional strings to `None`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            age_group: self.age_group.trim().to_string(),
            min_value: self.min_value,
            max_value: self.max_value,
            unit: optional_text(self.unit.as_deref()),
            category: optional_text(self.category.as_deref()),
            sub_category: optional_text(self.sub_category.as_deref()),
            notes: optional_text(self.notes.as_deref()),
        }
    }

    pub fn range_label(&self) -> String {
        format!("{} - {}", self.min_value, self.max_value)
    }
}

/// Field values exactly as typed into the entry form, before any checks.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub min_value: String,
    #[serde(default)]
    pub max_value: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<&Parameter> for ParameterFields {
    fn from(p: &Parameter) -> Self {
        Self {
            name: p.name.clone(),
            age_group: p.age_group.clone(),
            min_value: p.min_value.to_string(),
            max_value: p.max_value.to_string(),
            unit: p.unit.clone(),
            category: p.category.clone(),
            sub_category: p.sub_category.clone(),
            notes: p.notes.clone(),
        }
    }
}

pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
