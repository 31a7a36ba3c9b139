use crate::errors::PipelineError;
use crate::quality::run_quality_checks;
use crate::tests::utils::make_table;
use serde_json::{json, Value};

const FULL_COLUMNS: [&str; 8] = [
    "property_id",
    "full_address",
    "city",
    "state",
    "property_type",
    "bedrooms",
    "square_footage",
    "owner_occupied",
];

fn row(id: &str, bedrooms: Value, owner_occupied: Value) -> Vec<Value> {
    vec![
        json!(id),
        json!("123 Main St, Austin, TX 78701"),
        json!("Austin"),
        json!("TX"),
        json!("Single Family"),
        bedrooms,
        json!("1800"),
        owner_occupied,
    ]
}

#[test]
fn clean_dataset_passes_with_empty_warnings() {
    let table = make_table(
        &FULL_COLUMNS,
        vec![
            row("P1", json!("3"), json!("true")),
            row("P2", json!("4"), Value::Null),
        ],
    );

    let report = run_quality_checks(&table).unwrap();
    assert_eq!(report.row_count, 2);
    assert!(report.warnings.is_empty());
    assert!(report.null_counts.iter().all(|(_, n)| *n == 0));
    assert!(report.range_violations.iter().all(|(_, n)| *n == 0));
}

#[test]
fn missing_required_column_aborts_before_anything_else() {
    // No property_type column, and the dataset also has a duplicate key
    // which must NOT be reported because the column gate fires first.
    let table = make_table(
        &["property_id", "full_address", "city", "state"],
        vec![
            vec![json!("P1"), json!("a"), json!("b"), json!("c")],
            vec![json!("P1"), json!("a"), json!("b"), json!("c")],
        ],
    );

    let err = run_quality_checks(&table).unwrap_err();
    match err {
        PipelineError::Schema(msg) => assert!(msg.contains("property_type"), "{msg}"),
        other => panic!("expected schema error, got {other}"),
    }
}

#[test]
fn nulls_in_required_columns_are_warnings_not_fatal() {
    let mut rows = vec![row("P1", json!("3"), Value::Null)];
    rows.push(vec![
        json!("P2"),
        Value::Null, // full_address missing
        json!(""),   // city empty string counts as null too
        json!("TX"),
        json!("Condo"),
        json!("2"),
        json!("900"),
        Value::Null,
    ]);
    let table = make_table(&FULL_COLUMNS, rows);

    let report = run_quality_checks(&table).unwrap();
    let nulls = |col: &str| {
        report
            .null_counts
            .iter()
            .find(|(c, _)| c == col)
            .map(|(_, n)| *n)
            .unwrap()
    };
    assert_eq!(nulls("full_address"), 1);
    assert_eq!(nulls("city"), 1);
    assert_eq!(nulls("property_id"), 0);
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn duplicate_property_id_is_fatal() {
    let table = make_table(
        &FULL_COLUMNS,
        vec![
            row("P1", json!("3"), json!("true")),
            row("P1", json!("4"), json!("false")),
        ],
    );

    let err = run_quality_checks(&table).unwrap_err();
    match err {
        PipelineError::Schema(msg) => assert!(msg.contains("duplicate"), "{msg}"),
        other => panic!("expected schema error, got {other}"),
    }
}

#[test]
fn out_of_range_numeric_is_only_a_warning() {
    let table = make_table(
        &FULL_COLUMNS,
        vec![
            row("P1", json!("120"), json!("true")), // 120 bedrooms
            row("P2", json!("3"), Value::Null),
        ],
    );

    let report = run_quality_checks(&table).unwrap();
    let bedrooms = report
        .range_violations
        .iter()
        .find(|(c, _)| c == "bedrooms")
        .unwrap();
    assert_eq!(bedrooms.1, 1);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn invalid_boolean_domain_is_fatal() {
    let table = make_table(
        &FULL_COLUMNS,
        vec![
            row("P1", json!("3"), json!("maybe")),
            row("P2", json!("2"), json!("true")),
        ],
    );

    let err = run_quality_checks(&table).unwrap_err();
    match err {
        PipelineError::Schema(msg) => assert!(msg.contains("owner_occupied"), "{msg}"),
        other => panic!("expected schema error, got {other}"),
    }
}

#[test]
fn absent_optional_columns_are_tolerated() {
    // A dataset with only the required columns: no owner_occupied, no
    // numeric columns. Range and boolean passes have nothing to inspect.
    let table = make_table(
        &["property_id", "full_address", "city", "state", "property_type"],
        vec![vec![
            json!("P1"),
            json!("a"),
            json!("Austin"),
            json!("TX"),
            json!("Land"),
        ]],
    );

    assert!(run_quality_checks(&table).is_ok());
}
