// src/quality/mod.rs
//
// Data-quality checks over the normalized dataset. Read-only: the checks
// run against the same table the loader consumed, not against sink state,
// and never write anywhere. Fatal findings abort the run through
// `PipelineError::Schema`; everything else accumulates into the report.

use crate::domain::{coerce_bool, OwnerOccupied};
use crate::errors::PipelineError;
use crate::table::{is_missing, DataTable};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

pub const REQUIRED_COLUMNS: [&str; 5] =
    ["property_id", "full_address", "city", "state", "property_type"];

/// Sanity windows for numeric columns. Values outside are suspicious but
/// tolerated: they become warnings, never rejection.
pub const NUMERIC_RANGES: [(&str, f64, f64); 4] = [
    ("bedrooms", 0.0, 50.0),
    ("bathrooms", 0.0, 50.0),
    ("square_footage", 100.0, 50000.0),
    ("year_built", 1700.0, 2100.0),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub row_count: usize,
    /// Nulls per required column (column, count). Non-zero is a warning.
    pub null_counts: Vec<(String, usize)>,
    /// Present-but-out-of-range values per checked column (column, count).
    pub range_violations: Vec<(String, usize)>,
    pub warnings: Vec<String>,
}

/// Runs the quality checks in fixed order, each a full pass over the table:
/// required columns, null density, duplicate keys, numeric ranges, boolean
/// domain. The fatal checks (1, 3, 5) abort immediately; a report is only
/// returned for a run with no fatal finding.
pub fn run_quality_checks(table: &DataTable) -> Result<ValidationReport, PipelineError> {
    println!("🔍 Running data quality checks...");

    check_required_columns(table)?;
    println!("✅ Required columns present");

    let mut report = ValidationReport {
        row_count: table.len(),
        null_counts: Vec::new(),
        range_violations: Vec::new(),
        warnings: Vec::new(),
    };

    check_null_density(table, &mut report);
    check_duplicate_ids(table)?;
    println!("✅ No duplicate property IDs");

    check_numeric_ranges(table, &mut report);
    println!("✅ Numeric sanity checks complete");

    check_boolean_domain(table)?;

    println!("🎉 Data quality checks PASSED");
    Ok(report)
}

fn check_required_columns(table: &DataTable) -> Result<(), PipelineError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !table.has_column(col))
        .copied()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Schema(format!(
            "missing required columns: {missing:?}"
        )))
    }
}

fn check_null_density(table: &DataTable, report: &mut ValidationReport) {
    for col in REQUIRED_COLUMNS {
        let nulls = (0..table.len())
            .filter(|&idx| is_missing(table.get(idx, col)))
            .count();
        if nulls > 0 {
            let msg = format!("{nulls} null values in required column '{col}'");
            eprintln!("⚠️ {msg}");
            report.warnings.push(msg);
        }
        report.null_counts.push((col.to_string(), nulls));
    }
}

fn check_duplicate_ids(table: &DataTable) -> Result<(), PipelineError> {
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;
    for idx in 0..table.len() {
        let id = crate::table::cell_to_string(table.get(idx, "property_id"));
        if !seen.insert(id) {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        return Err(PipelineError::Schema(format!(
            "{duplicates} duplicate property_id values detected"
        )));
    }
    Ok(())
}

fn check_numeric_ranges(table: &DataTable, report: &mut ValidationReport) {
    for (col, min, max) in NUMERIC_RANGES {
        if !table.has_column(col) {
            continue;
        }

        let invalid = (0..table.len())
            .filter_map(|idx| cell_as_number(table.get(idx, col)))
            .filter(|v| *v < min || *v > max)
            .count();

        if invalid > 0 {
            let msg = format!("{invalid} values outside [{min}, {max}] in '{col}'");
            eprintln!("⚠️ {msg}");
            report.warnings.push(msg);
        }
        report.range_violations.push((col.to_string(), invalid));
    }
}

/// A present `owner_occupied` cell must be a recognizable true/false; the
/// interchange file is text, so the accepted literals are exactly the ones
/// the loader's boolean coercion maps to a definite value.
fn check_boolean_domain(table: &DataTable) -> Result<(), PipelineError> {
    if !table.has_column("owner_occupied") {
        return Ok(());
    }

    let invalid = (0..table.len())
        .filter(|&idx| {
            let cell = table.get(idx, "owner_occupied");
            !is_missing(cell) && coerce_bool(cell) == OwnerOccupied::Unknown
        })
        .count();

    if invalid > 0 {
        return Err(PipelineError::Schema(format!(
            "{invalid} invalid boolean values in owner_occupied"
        )));
    }
    println!("✅ Boolean values validated");
    Ok(())
}

/// Range checks only look at values that are present and parse; the loader
/// is where unparseable numeric text turns fatal.
fn cell_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
