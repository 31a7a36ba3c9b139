// src/domain/property.rs

use crate::errors::PipelineError;
use crate::table::{is_missing, DataTable};
use serde_json::Value;

/// Three-valued occupancy flag. The provider sends this column as a mix of
/// booleans, 0/1 and text, and a nullable bool kept leaking bad states into
/// the sink, so the third state is explicit in the type instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerOccupied {
    Yes,
    No,
    Unknown,
}

impl OwnerOccupied {
    /// What the sink stores: Unknown maps to NULL.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            OwnerOccupied::Yes => Some(true),
            OwnerOccupied::No => Some(false),
            OwnerOccupied::Unknown => None,
        }
    }
}

/// A property as persisted, one per `property_id`. This is the strongly
/// typed shape of one normalized row; building it is where all the loose
/// provider typing gets resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub property_id: String,
    pub full_address: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub state_fips: Option<String>,
    pub zip_code: Option<String>,
    pub county: Option<String>,
    pub county_fips: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub property_type: Option<String>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub square_footage: Option<f64>,
    pub year_built: Option<f64>,
    pub features: Option<String>,
    pub tax_assessments: Option<String>,
    pub property_taxes: Option<String>,
    pub lot_size: Option<String>,
    pub assessor_id: Option<String>,
    pub legal_description: Option<String>,
    pub subdivision: Option<String>,
    pub owner: Option<String>,
    pub owner_occupied: OwnerOccupied,
}

impl PropertyRecord {
    /// Builds a typed record from row `idx` of a normalized table.
    ///
    /// String fields and `owner_occupied` coerce totally (unrecognized
    /// values become absent); numeric fields are the one place a bad value
    /// is fatal, because silently dropping malformed numbers would hide
    /// upstream corruption.
    pub fn from_row(table: &DataTable, idx: usize) -> Result<Self, PipelineError> {
        let property_id = coerce_string(table.get(idx, "property_id")).ok_or_else(|| {
            PipelineError::Schema(format!("row {idx} has no property_id"))
        })?;

        Ok(PropertyRecord {
            property_id,
            full_address: coerce_string(table.get(idx, "full_address")),
            address_line1: coerce_string(table.get(idx, "address_line1")),
            address_line2: coerce_string(table.get(idx, "address_line2")),
            city: coerce_string(table.get(idx, "city")),
            state: coerce_string(table.get(idx, "state")),
            state_fips: coerce_string(table.get(idx, "state_fips")),
            zip_code: coerce_string(table.get(idx, "zip_code")),
            county: coerce_string(table.get(idx, "county")),
            county_fips: coerce_string(table.get(idx, "county_fips")),
            latitude: coerce_number("latitude", table.get(idx, "latitude"), idx)?,
            longitude: coerce_number("longitude", table.get(idx, "longitude"), idx)?,
            property_type: coerce_string(table.get(idx, "property_type")),
            bedrooms: coerce_number("bedrooms", table.get(idx, "bedrooms"), idx)?,
            bathrooms: coerce_number("bathrooms", table.get(idx, "bathrooms"), idx)?,
            square_footage: coerce_number("square_footage", table.get(idx, "square_footage"), idx)?,
            year_built: coerce_number("year_built", table.get(idx, "year_built"), idx)?,
            features: coerce_string(table.get(idx, "features")),
            tax_assessments: coerce_string(table.get(idx, "tax_assessments")),
            property_taxes: coerce_string(table.get(idx, "property_taxes")),
            lot_size: coerce_string(table.get(idx, "lot_size")),
            assessor_id: coerce_string(table.get(idx, "assessor_id")),
            legal_description: coerce_string(table.get(idx, "legal_description")),
            subdivision: coerce_string(table.get(idx, "subdivision")),
            owner: coerce_string(table.get(idx, "owner")),
            owner_occupied: coerce_bool(table.get(idx, "owner_occupied")),
        })
    }
}

/// Total boolean coercion: true / 1 / "1" / "true" -> Yes, false / 0 / "0" /
/// "false" -> No, anything else (missing included) -> Unknown. Never errors;
/// unrecognized junk silently becomes Unknown.
pub fn coerce_bool(value: &Value) -> OwnerOccupied {
    match value {
        Value::Bool(true) => OwnerOccupied::Yes,
        Value::Bool(false) => OwnerOccupied::No,
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => OwnerOccupied::Yes,
            Some(f) if f == 0.0 => OwnerOccupied::No,
            _ => OwnerOccupied::Unknown,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" => OwnerOccupied::Yes,
            "0" | "false" => OwnerOccupied::No,
            _ => OwnerOccupied::Unknown,
        },
        _ => OwnerOccupied::Unknown,
    }
}

/// Numeric coercion. Only the explicit missing markers (Null, empty string)
/// become absent; present text that does not parse is a fatal coercion
/// error, not a silent None.
pub fn coerce_number(column: &str, value: &Value, row: usize) -> Result<Option<f64>, PipelineError> {
    if is_missing(value) {
        return Ok(None);
    }

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(f) if f.is_finite() => Ok(Some(f)),
        _ => Err(PipelineError::Coercion {
            column: column.to_string(),
            value: crate::table::cell_to_string(value),
            row,
        }),
    }
}

/// Total string coercion. Missing markers become None; structured values
/// (features, tax assessments) are kept as their JSON text.
pub fn coerce_string(value: &Value) -> Option<String> {
    if is_missing(value) {
        return None;
    }
    Some(crate::table::cell_to_string(value))
}
