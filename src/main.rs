use crate::config::Settings;
use crate::db::connection::{init_db, Database};
use crate::extract::{FileCache, RentCastClient};
use crate::table::DataTable;
use std::fs::File;
use std::io::BufWriter;

mod config;
mod db;
mod domain;
mod errors;
mod extract;
mod load;
mod quality;
mod table;
mod transform;

#[cfg(test)]
mod tests;

fn run_etl(settings: &Settings) -> Result<(), errors::PipelineError> {
    settings.ensure_dirs()?;

    // Extraction (cached; the API is paid)
    let client = RentCastClient::new()?;
    let cache = FileCache::new(&settings.raw_data_dir, settings.cache_expiry);
    let raw = client.get_property_listings(settings, &cache, "Austin", "TX", 300)?;
    println!("✅ Extracted {} listings", raw.len());

    // Transformation → processed CSV, the file the load and quality stages share
    transform::run_transformations(settings, &raw)?;

    // Load
    let db = Database::new(settings.db_path.display().to_string());
    init_db(&db, "sql/schema.sql")?;

    let dataset = DataTable::read_csv(&settings.processed_csv_path())?;
    let report = load::load_properties(&dataset, &db, &db)?;
    println!(
        "📊 Load report: {} considered, {} existing, {} loaded",
        report.total, report.existing, report.loaded
    );

    // Quality checks (read-only, independent of what the loader persisted)
    let quality_report = quality::run_quality_checks(&dataset)?;
    let out = File::create(settings.quality_report_path())?;
    serde_json::to_writer_pretty(BufWriter::new(out), &quality_report)
        .map_err(|e| errors::PipelineError::IoError(e.to_string()))?;

    Ok(())
}

fn main() {
    let settings = Settings::from_env();

    if let Err(e) = run_etl(&settings) {
        eprintln!("❌ Pipeline failed: {e}");
        std::process::exit(1);
    }

    println!("🎉 ETL run complete");
}
