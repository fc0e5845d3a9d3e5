// Pick-lists offered by the entry forms. Users may still type values outside
// these lists; they only seed the drop-downs.

pub const AGE_GROUPS: &[&str] = &[
    "Neonate",
    "Infant",
    "Child",
    "Adolescent",
    "Adult",
    "Pregnancy",
    "Term",
    "Preterm",
    "All",
];

pub const UNITS: &[&str] = &[
    "g/dL", "mg/dL", "µg/dL", "mmol/L", "µmol/L", "mEq/L", "ng/mL", "U/L", "IU/L", "%",
    "cells/µL", "g/L", "pg", "ratio", "seconds", "K/µL", "mm/hr", "mm³", "mmHg", "µIU/mL",
    "ng/dL", "pg/mL", "cells/mm³", "mg/L", "/mm³", "pg/dL",
];

pub const CATEGORIES: &[&str] = &[
    "Hematology",
    "BloodGas",
    "Electrolytes",
    "LiverFunctionTests",
    "RenalFunctionTests",
    "InfectionMarkers",
    "Coagulation",
    "Other",
];

/// Built-in units followed by any stored units not already listed.
pub fn merged_units(stored: &[String]) -> Vec<String> {
    let mut out: Vec<String> = UNITS.iter().map(|u| u.to_string()).collect();
    for unit in stored {
        if !out.iter().any(|u| u == unit) {
            out.push(unit.clone());
        }
    }
    out
}
