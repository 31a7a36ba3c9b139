use crate::db::connection::{init_db, Database};
use crate::table::DataTable;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fresh SQLite database in the temp dir, initialized from the production
/// schema. Each test runs on its own thread, so the thread-local connection
/// slot never leaks a connection between databases.
pub fn make_db(prefix: &str) -> Database {
    let path = std::env::temp_dir().join(format!(
        "{prefix}_{}.sqlite",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let db = Database::new(path.display().to_string());
    init_db(&db, "sql/schema.sql").expect("Failed to initialize DB");
    db
}

/// Builds a table from column names and loosely-typed rows.
pub fn make_table(columns: &[&str], rows: Vec<Vec<Value>>) -> DataTable {
    let mut table = DataTable::new(columns.iter().map(|c| c.to_string()).collect());
    for row in rows {
        table.push_row(row);
    }
    table
}
