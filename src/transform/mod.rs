// src/transform/mod.rs
//
// Schema normalizer: renames the provider's camelCase fields to the
// canonical snake_case schema. Provider fields with no entry in the rename
// table are dropped; output columns follow the canonical order.

use crate::config::Settings;
use crate::errors::PipelineError;
use crate::table::DataTable;
use serde_json::Value;

/// Provider field name → canonical column name, in canonical column order.
pub const COLUMN_MAPPING: [(&str, &str); 26] = [
    ("id", "property_id"),
    ("formattedAddress", "full_address"),
    ("addressLine1", "address_line1"),
    ("addressLine2", "address_line2"),
    ("city", "city"),
    ("state", "state"),
    ("stateFips", "state_fips"),
    ("zipCode", "zip_code"),
    ("county", "county"),
    ("countyFips", "county_fips"),
    ("latitude", "latitude"),
    ("longitude", "longitude"),
    ("propertyType", "property_type"),
    ("bedrooms", "bedrooms"),
    ("bathrooms", "bathrooms"),
    ("squareFootage", "square_footage"),
    ("yearBuilt", "year_built"),
    ("features", "features"),
    ("taxAssessments", "tax_assessments"),
    ("propertyTaxes", "property_taxes"),
    ("lotSize", "lot_size"),
    ("assessorID", "assessor_id"),
    ("legalDescription", "legal_description"),
    ("subdivision", "subdivision"),
    ("owner", "owner"),
    ("ownerOccupied", "owner_occupied"),
];

/// Renames raw columns to canonical names. Canonical columns whose source
/// field is absent from the input stay absent; the quality checks decide
/// later whether that matters.
pub fn normalize(raw: &DataTable) -> DataTable {
    let kept: Vec<(usize, &str)> = COLUMN_MAPPING
        .iter()
        .filter_map(|(source, canonical)| raw.column_index(source).map(|idx| (idx, *canonical)))
        .collect();

    let mut out = DataTable::new(kept.iter().map(|(_, name)| name.to_string()).collect());
    for row in raw.rows() {
        out.push_row(
            kept.iter()
                .map(|(idx, _)| row.get(*idx).cloned().unwrap_or(Value::Null))
                .collect(),
        );
    }
    out
}

/// Normalization step of a pipeline run: renames columns and writes the
/// processed CSV that the load and quality stages both read.
pub fn run_transformations(settings: &Settings, raw: &DataTable) -> Result<DataTable, PipelineError> {
    let normalized = normalize(raw);

    settings.ensure_dirs()?;
    normalized.write_csv(&settings.processed_csv_path())?;

    println!("✅ Property transformation complete");
    println!("Number of properties: {}", normalized.len());
    println!("Columns after rename: {:?}", normalized.columns());

    Ok(normalized)
}
