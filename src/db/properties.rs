// src/db/properties.rs
//
// SQLite-backed implementations of the loader's two seams: the identity
// store (what keys exist) and the persistence sink (batch upsert).

use crate::db::connection::Database;
use crate::domain::PropertyRecord;
use crate::errors::PipelineError;
use crate::load::{IdentityStore, PersistenceSink};
use chrono::Utc;
use rusqlite::params;
use std::collections::HashSet;

/// Snapshot of every persisted primary key. Reflects committed state at
/// call time; nothing stops another writer from inserting right after.
pub fn existing_property_ids(db: &Database) -> Result<HashSet<String>, PipelineError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT property_id FROM properties")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = HashSet::new();
        for id in rows {
            ids.insert(id?);
        }
        Ok(ids)
    })
}

/// Upserts the batch inside one transaction. The conflict path overwrites
/// every mutable column and refreshes `updated_at`; `created_at` is only
/// set by the insert path and survives any number of conflicts.
pub fn upsert_properties(db: &Database, records: &[PropertyRecord]) -> Result<(), PipelineError> {
    let now = Utc::now().naive_utc();

    db.with_conn(|conn| {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO properties (
                    property_id, full_address, address_line1, address_line2,
                    city, state, state_fips, zip_code, county, county_fips,
                    latitude, longitude, property_type, bedrooms, bathrooms,
                    square_footage, year_built, features, tax_assessments,
                    property_taxes, lot_size, assessor_id, legal_description,
                    subdivision, owner, owner_occupied, created_at, updated_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                    ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24,
                    ?25, ?26, ?27, ?28
                )
                ON CONFLICT(property_id) DO UPDATE SET
                    full_address = excluded.full_address,
                    address_line1 = excluded.address_line1,
                    address_line2 = excluded.address_line2,
                    city = excluded.city,
                    state = excluded.state,
                    state_fips = excluded.state_fips,
                    zip_code = excluded.zip_code,
                    county = excluded.county,
                    county_fips = excluded.county_fips,
                    latitude = excluded.latitude,
                    longitude = excluded.longitude,
                    property_type = excluded.property_type,
                    bedrooms = excluded.bedrooms,
                    bathrooms = excluded.bathrooms,
                    square_footage = excluded.square_footage,
                    year_built = excluded.year_built,
                    features = excluded.features,
                    tax_assessments = excluded.tax_assessments,
                    property_taxes = excluded.property_taxes,
                    lot_size = excluded.lot_size,
                    assessor_id = excluded.assessor_id,
                    legal_description = excluded.legal_description,
                    subdivision = excluded.subdivision,
                    owner = excluded.owner,
                    owner_occupied = excluded.owner_occupied,
                    updated_at = excluded.updated_at
                "#,
            )?;

            for rec in records {
                stmt.execute(params![
                    rec.property_id,
                    rec.full_address,
                    rec.address_line1,
                    rec.address_line2,
                    rec.city,
                    rec.state,
                    rec.state_fips,
                    rec.zip_code,
                    rec.county,
                    rec.county_fips,
                    rec.latitude,
                    rec.longitude,
                    rec.property_type,
                    rec.bedrooms,
                    rec.bathrooms,
                    rec.square_footage,
                    rec.year_built,
                    rec.features,
                    rec.tax_assessments,
                    rec.property_taxes,
                    rec.lot_size,
                    rec.assessor_id,
                    rec.legal_description,
                    rec.subdivision,
                    rec.owner,
                    rec.owner_occupied.as_bool(),
                    now,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    })
}

impl IdentityStore for Database {
    fn existing_keys(&self) -> Result<HashSet<String>, PipelineError> {
        existing_property_ids(self)
    }
}

impl PersistenceSink for Database {
    fn upsert_batch(&self, records: &[PropertyRecord]) -> Result<(), PipelineError> {
        upsert_properties(self, records)
    }
}
