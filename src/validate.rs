use crate::error::{StoreError, StoreResult};
use crate::model::{optional_text, Parameter, ParameterFields};

/// Turn raw form input into a checked `Parameter`.
///
/// Rejects blank required fields, bounds that are not finite numbers, and
/// `min_value > max_value`. Equal bounds describe a single-point range and
/// are accepted.
pub fn validate_fields(fields: &ParameterFields) -> StoreResult<Parameter> {
    let name = required("name", &fields.name)?;
    let age_group = required("ageGroup", &fields.age_group)?;
    let min_value = parse_bound("minValue", &fields.min_value)?;
    let max_value = parse_bound("maxValue", &fields.max_value)?;

    let record = Parameter {
        name,
        age_group,
        min_value,
        max_value,
        unit: optional_text(fields.unit.as_deref()),
        category: optional_text(fields.category.as_deref()),
        sub_category: optional_text(fields.sub_category.as_deref()),
        notes: optional_text(fields.notes.as_deref()),
    };
    record.validate()?;
    Ok(record)
}

impl Parameter {
    /// Same checks as `validate_fields`, for records that are already typed.
    pub fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::validation("name", "must not be empty"));
        }
        if self.age_group.trim().is_empty() {
            return Err(StoreError::validation("ageGroup", "must not be empty"));
        }
        if !self.min_value.is_finite() {
            return Err(StoreError::validation("minValue", "must be a finite number"));
        }
        if !self.max_value.is_finite() {
            return Err(StoreError::validation("maxValue", "must be a finite number"));
        }
        if self.min_value > self.max_value {
            return Err(StoreError::validation(
                "minValue",
                format!(
                    "lower bound {} exceeds upper bound {}",
                    self.min_value, self.max_value
                ),
            ));
        }
        Ok(())
    }
}

fn required(field: &'static str, raw: &str) -> StoreResult<String> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(StoreError::validation(field, "must not be empty"));
    }
    Ok(v.to_string())
}

pub(crate) fn parse_bound(field: &'static str, raw: &str) -> StoreResult<f64> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(StoreError::validation(field, "must not be empty"));
    }
    let n: f64 = v
        .parse()
        .map_err(|_| StoreError::validation(field, format!("'{v}' is not a number")))?;
    if !n.is_finite() {
        return Err(StoreError::validation(field, "must be a finite number"));
    }
    Ok(n)
}
