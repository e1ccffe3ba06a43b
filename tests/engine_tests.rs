// tests/engine_tests.rs

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field};
use lakeql::{
    Engine, EvalError, EvalMode, Evaluator, Expr, Query, Table, TableError, Value, execute_query,
    group_key,
};
use std::sync::Arc;

fn utf8(values: Vec<Option<&str>>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

fn float64(values: Vec<Option<f64>>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

fn prices() -> Table {
    Table::try_new(
        vec![
            Field::new("Date", DataType::Utf8, true),
            Field::new("Region", DataType::Utf8, true),
            Field::new("Open", DataType::Float64, true),
            Field::new("Close", DataType::Float64, true),
            Field::new("Volume", DataType::Float64, true),
        ],
        vec![
            utf8(vec![
                Some("2024-01-01"),
                Some("2024-01-02"),
                Some("2024-01-03"),
                Some("2024-01-04"),
                Some("2024-01-05"),
            ]),
            utf8(vec![
                Some("A"),
                Some("A"),
                Some("B"),
                Some("B"),
                None,
            ]),
            float64(vec![Some(100.0), Some(200.0), Some(300.0), Some(400.0), Some(500.0)]),
            float64(vec![Some(1500.0), Some(800.0), Some(2500.0), None, Some(1200.0)]),
            float64(vec![Some(4000.0), Some(6000.0), Some(3000.0), Some(1000.0), None]),
        ],
    )
    .unwrap()
}

fn empty_prices() -> Table {
    Table::try_new(
        vec![
            Field::new("Date", DataType::Utf8, true),
            Field::new("Region", DataType::Utf8, true),
            Field::new("Volume", DataType::Float64, true),
        ],
        vec![
            utf8(vec![]),
            utf8(vec![]),
            float64(vec![]),
        ],
    )
    .unwrap()
}

fn run(sql: &str, table: &Table) -> Result<Table, EvalError> {
    let query: Query = sql.parse().unwrap();
    execute_query(&query, table)
}

fn run_strict(sql: &str, table: &Table) -> Result<Table, EvalError> {
    let query: Query = sql.parse().unwrap();
    Engine::with_mode(EvalMode::Strict).execute(&query, table)
}

fn floats(table: &Table, index: usize) -> Vec<Option<f64>> {
    table
        .column(index)
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .map(|a| a.iter().collect())
        .unwrap_or_else(|| panic!("Expected float column at {}", index))
}

fn texts(table: &Table, index: usize) -> Vec<Option<String>> {
    table
        .column(index)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .map(|a| a.iter().map(|v| v.map(str::to_string)).collect())
        .unwrap_or_else(|| panic!("Expected string column at {}", index))
}

fn names(table: &Table) -> Vec<String> {
    table.schema().fields().iter().map(|f| f.name().clone()).collect()
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_simple_filter() {
    let result = run("SELECT Date, Close FROM prices WHERE Close > 1000", &prices()).unwrap();

    assert_eq!(names(&result), vec!["Date", "Close"]);
    assert_eq!(result.num_rows(), 3);
    assert_eq!(
        texts(&result, 0),
        vec![
            Some("2024-01-01".to_string()),
            Some("2024-01-03".to_string()),
            Some("2024-01-05".to_string()),
        ]
    );
    assert_eq!(floats(&result, 1), vec![Some(1500.0), Some(2500.0), Some(1200.0)]);
}

#[test]
fn test_null_cells_coerce_to_zero_in_comparisons() {
    // Row 4 has no volume, which compares as 0.
    let result = run("SELECT Date FROM prices WHERE Close > 1000 AND Volume < 3500", &prices()).unwrap();
    assert_eq!(
        texts(&result, 0),
        vec![Some("2024-01-03".to_string()), Some("2024-01-05".to_string())]
    );
}

#[test]
fn test_or_filter() {
    let result = run("SELECT Date FROM prices WHERE Close > 2000 OR Open < 150", &prices()).unwrap();
    assert_eq!(
        texts(&result, 0),
        vec![Some("2024-01-01".to_string()), Some("2024-01-03".to_string())]
    );
}

#[test]
fn test_equality_does_not_coerce() {
    let table = prices();

    let result = run("SELECT Date FROM prices WHERE Open = 300", &table).unwrap();
    assert_eq!(texts(&result, 0), vec![Some("2024-01-03".to_string())]);

    // A numeric literal never equals a string cell.
    let result = run("SELECT Date FROM prices WHERE Region = 1", &table).unwrap();
    assert_eq!(result.num_rows(), 0);
}

#[test]
fn test_filter_indices_are_ascending_and_idempotent() {
    let table = prices();
    let engine = Engine::new();
    let query: Query = "SELECT * FROM prices WHERE Open > 150 AND Open < 450".parse().unwrap();

    let rows = engine.filter(&table, query.filter.as_ref()).unwrap();
    assert_eq!(rows, vec![1, 2, 3]);
    assert!(rows.windows(2).all(|w| w[0] < w[1]));

    let filtered = engine.execute(&query, &table).unwrap();
    let again = engine.filter(&filtered, query.filter.as_ref()).unwrap();
    assert_eq!(again, (0..filtered.num_rows()).collect::<Vec<_>>());
}

#[test]
fn test_no_filter_keeps_every_row() {
    let rows = Engine::new().filter(&prices(), None).unwrap();
    assert_eq!(rows, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_non_boolean_where_is_type_error() {
    let err = run("SELECT Date FROM prices WHERE Close", &prices()).unwrap_err();
    assert_eq!(err, EvalError::TypeError { row: 0, found: "float" });

    let err = run("SELECT Date FROM prices WHERE Close + 1", &prices()).unwrap_err();
    assert!(matches!(err, EvalError::TypeError { row: 0, .. }));
}

#[test]
fn test_string_where_result_is_type_error() {
    let err = run("SELECT Date FROM prices WHERE Region", &prices()).unwrap_err();
    assert_eq!(err, EvalError::TypeError { row: 0, found: "string" });
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_expression_projection() {
    let result = run(
        "SELECT (Open + Close) / 2, Volume * 100 FROM prices WHERE Close > 1000",
        &prices(),
    )
    .unwrap();

    assert_eq!(names(&result), vec!["expr_0", "expr_1"]);
    assert_eq!(floats(&result, 0), vec![Some(800.0), Some(1400.0), Some(850.0)]);
    // A null volume is coerced to 0 by the multiplication.
    assert_eq!(floats(&result, 1), vec![Some(400000.0), Some(300000.0), Some(0.0)]);
    assert!(result.schema().fields().iter().all(|f| f.is_nullable()));
}

#[test]
fn test_projection_names_are_positional() {
    let result = run("SELECT Date, Open * 2 FROM prices", &prices()).unwrap();
    assert_eq!(names(&result), vec!["Date", "expr_1"]);
}

#[test]
fn test_division_by_zero_follows_ieee() {
    let result = run("SELECT Open / 0, 0 / 0 FROM prices", &prices()).unwrap();

    let inf = floats(&result, 0);
    assert!(inf.iter().all(|v| *v == Some(f64::INFINITY)));

    let nan = floats(&result, 1);
    assert!(nan.iter().all(|v| v.is_some_and(f64::is_nan)));
}

#[test]
fn test_column_pass_through_keeps_type_and_nulls() {
    let result = run("SELECT Region, Close FROM prices", &prices()).unwrap();

    assert_eq!(result.field(0), Some(&Field::new("Region", DataType::Utf8, true)));
    assert_eq!(texts(&result, 0)[4], None);
    assert_eq!(floats(&result, 1)[3], None);
}

#[test]
fn test_unfiltered_pass_through_shares_columns() {
    let table = prices();
    let result = run("SELECT Close FROM prices", &table).unwrap();

    assert!(Arc::ptr_eq(table.column(3).unwrap(), result.column(0).unwrap()));
}

#[test]
fn test_select_star() {
    let result = run("SELECT * FROM prices WHERE Open > 350", &prices()).unwrap();

    assert_eq!(names(&result), vec!["Date", "Region", "Open", "Close", "Volume"]);
    assert_eq!(result.num_rows(), 2);
    assert_eq!(floats(&result, 2), vec![Some(400.0), Some(500.0)]);
}

#[test]
fn test_unknown_column() {
    let err = run("SELECT Missing FROM prices", &prices()).unwrap_err();
    assert_eq!(err, EvalError::ColumnNotFound("Missing".to_string()));

    // Lookup is case-sensitive.
    let err = run("SELECT close FROM prices", &prices()).unwrap_err();
    assert_eq!(err, EvalError::ColumnNotFound("close".to_string()));
}

#[test]
fn test_mixed_aggregate_projection_is_rejected() {
    let err = run("SELECT Date, COUNT(*) FROM prices", &prices()).unwrap_err();
    assert!(matches!(err, EvalError::UnsupportedExpression { .. }));

    // Even when no rows survive.
    let err = run("SELECT Date, COUNT(*) FROM prices WHERE Open > 9999", &prices()).unwrap_err();
    assert!(matches!(err, EvalError::UnsupportedExpression { .. }));
}

// ============================================================================
// Evaluation modes
// ============================================================================

#[test]
fn test_lenient_mode_absorbs_operand_errors() {
    let table = prices();

    let result = run("SELECT Missing + 1 FROM prices", &table).unwrap();
    assert!(floats(&result, 0).iter().all(|v| *v == Some(1.0)));

    let result = run("SELECT Date FROM prices WHERE Missing > 1", &table).unwrap();
    assert_eq!(result.num_rows(), 0);

    // An aggregate inside an expression is evaluated row-wise and absorbed.
    let result = run("SELECT Date FROM prices WHERE SUM(Close) > 1", &table).unwrap();
    assert_eq!(result.num_rows(), 0);
}

#[test]
fn test_strict_mode_reports_operand_errors() {
    let table = prices();

    let err = run_strict("SELECT Missing + 1 FROM prices", &table).unwrap_err();
    assert_eq!(err, EvalError::ColumnNotFound("Missing".to_string()));

    let err = run_strict("SELECT Date FROM prices WHERE SUM(Close) > 1", &table).unwrap_err();
    assert!(matches!(err, EvalError::UnsupportedExpression { .. }));

    // Queries without failing operands behave the same in both modes.
    let strict = run_strict("SELECT Date FROM prices WHERE Close > 1000", &table).unwrap();
    let lenient = run("SELECT Date FROM prices WHERE Close > 1000", &table).unwrap();
    assert_eq!(strict, lenient);
}

#[test]
fn test_star_and_functions_in_row_context() {
    let table = prices();
    let evaluator = Evaluator::new();

    assert_eq!(evaluator.eval(&Expr::Star, &table, 0).unwrap(), Value::Text("*".to_string()));

    let call = Expr::Function {
        name: "SUM".to_string(),
        args: vec![Expr::Column("Close".to_string())],
    };
    assert!(matches!(
        evaluator.eval(&call, &table, 0),
        Err(EvalError::UnsupportedExpression { .. })
    ));
}

#[test]
fn test_literal_evaluation() {
    let table = prices();
    let evaluator = Evaluator::new();

    assert_eq!(
        evaluator.eval(&Expr::Literal("12.5".to_string()), &table, 0).unwrap(),
        Value::Float(12.5)
    );
    assert_eq!(
        evaluator.eval(&Expr::Literal(".".to_string()), &table, 0).unwrap(),
        Value::Text(".".to_string())
    );
}

// ============================================================================
// Aggregation
// ============================================================================

#[test]
fn test_all_aggregates() {
    let result = run(
        "SELECT COUNT(*), COUNT(Close), SUM(Volume), AVG(Close), MAX(Close), MIN(Open) FROM prices",
        &prices(),
    )
    .unwrap();

    assert_eq!(result.num_rows(), 1);
    assert_eq!(
        names(&result),
        vec!["expr_0", "expr_1", "expr_2", "expr_3", "expr_4", "expr_5"]
    );

    let row: Vec<Option<f64>> = (0..6).map(|i| floats(&result, i)[0]).collect();
    assert_eq!(
        row,
        vec![
            Some(5.0),
            Some(4.0),
            Some(14000.0),
            Some(1500.0),
            Some(2500.0),
            Some(100.0),
        ]
    );
}

#[test]
fn test_aggregate_after_filter() {
    let result = run("SELECT COUNT(*) FROM prices WHERE Close > 1000", &prices()).unwrap();
    assert_eq!(floats(&result, 0), vec![Some(3.0)]);
}

#[test]
fn test_aggregate_over_expression() {
    let result = run("SELECT sum(Close - Open) FROM prices", &prices()).unwrap();
    // The null close counts as 0: 1400 + 600 + 2200 - 400 + 700
    assert_eq!(floats(&result, 0), vec![Some(4500.0)]);
}

#[test]
fn test_aggregates_over_empty_table() {
    let result = run("SELECT SUM(Volume), COUNT(*) FROM prices", &empty_prices()).unwrap();
    assert_eq!(result.num_rows(), 1);
    assert_eq!(floats(&result, 0), vec![Some(0.0)]);
    assert_eq!(floats(&result, 1), vec![Some(0.0)]);

    let result = run("SELECT AVG(Volume), MAX(Volume), MIN(Volume) FROM prices", &empty_prices()).unwrap();
    assert_eq!(
        (0..3).map(|i| floats(&result, i)[0]).collect::<Vec<_>>(),
        vec![Some(0.0), Some(0.0), Some(0.0)]
    );
}

#[test]
fn test_aggregate_ignores_group_by() {
    let result = run("SELECT COUNT(*) FROM prices GROUP BY Region", &prices()).unwrap();
    assert_eq!(result.num_rows(), 1);
    assert_eq!(floats(&result, 0), vec![Some(5.0)]);
}

#[test]
fn test_aggregate_arity() {
    let err = run("SELECT SUM(Open, Close) FROM prices", &prices()).unwrap_err();
    assert_eq!(
        err,
        EvalError::ArityError {
            function: "SUM".to_string(),
            expected: 1,
            found: 2,
        }
    );

    let err = run("SELECT COUNT() FROM prices", &empty_prices()).unwrap_err();
    assert!(matches!(err, EvalError::ArityError { found: 0, .. }));
}

#[test]
fn test_unknown_aggregate() {
    let err = run("SELECT MEDIAN(Close) FROM prices", &prices()).unwrap_err();
    assert_eq!(err, EvalError::UnsupportedFunction("MEDIAN".to_string()));
}

#[test]
fn test_count_of_unknown_column() {
    let err = run("SELECT COUNT(Missing) FROM prices", &prices()).unwrap_err();
    assert_eq!(err, EvalError::ColumnNotFound("Missing".to_string()));
}

// ============================================================================
// GROUP BY
// ============================================================================

#[test]
fn test_group_by_counts() {
    let table = Table::try_new(
        vec![Field::new("Region", DataType::Utf8, true)],
        vec![utf8(vec![
            Some("A"),
            Some("A"),
            Some("B"),
        ])],
    )
    .unwrap();

    let result = run("SELECT Region, COUNT(*) FROM prices GROUP BY Region", &table).unwrap();

    assert_eq!(result.num_rows(), 2);
    assert_eq!(names(&result), vec!["Region", "COUNT"]);
    assert_eq!(texts(&result, 0), vec![Some("A".to_string()), Some("B".to_string())]);
    assert_eq!(floats(&result, 1), vec![Some(2.0), Some(1.0)]);
}

#[test]
fn test_group_by_with_aggregates_and_null_key() {
    let result = run(
        "SELECT Region, COUNT(*), avg(Close) FROM prices GROUP BY Region",
        &prices(),
    )
    .unwrap();

    assert_eq!(names(&result), vec!["Region", "COUNT", "AVG"]);
    // "A" < "B" < "NULL"
    assert_eq!(
        texts(&result, 0),
        vec![Some("A".to_string()), Some("B".to_string()), None]
    );
    assert_eq!(floats(&result, 1), vec![Some(2.0), Some(2.0), Some(1.0)]);
    assert_eq!(floats(&result, 2), vec![Some(1150.0), Some(2500.0), Some(1200.0)]);
    assert_eq!(result.field(1), Some(&Field::new("COUNT", DataType::Float64, true)));
}

#[test]
fn test_group_order_is_lexicographic() {
    let table = Table::try_new(
        vec![Field::new("Score", DataType::Float64, true)],
        vec![float64(vec![Some(9.0), Some(10.0), Some(9.0)])],
    )
    .unwrap();

    let result = run("SELECT Score, COUNT(*) FROM t GROUP BY Score", &table).unwrap();

    // "10" sorts before "9"
    assert_eq!(floats(&result, 0), vec![Some(10.0), Some(9.0)]);
    assert_eq!(floats(&result, 1), vec![Some(1.0), Some(2.0)]);

    // Keys render without exponents and null renders as NULL, so the
    // order is "0.000001" < "0.5" < "7" < "NULL".
    let table = Table::try_new(
        vec![Field::new("k", DataType::Float64, true)],
        vec![float64(vec![Some(0.5), Some(0.000001), None, Some(7.0)])],
    )
    .unwrap();

    let result = run("SELECT k, COUNT(*) FROM t GROUP BY k", &table).unwrap();
    assert_eq!(
        floats(&result, 0),
        vec![Some(0.000001), Some(0.5), Some(7.0), None]
    );
}

#[test]
fn test_group_uses_first_row_as_representative() {
    let result = run("SELECT Region, Date, COUNT(*) FROM prices GROUP BY Region", &prices()).unwrap();

    assert_eq!(
        texts(&result, 1),
        vec![
            Some("2024-01-01".to_string()),
            Some("2024-01-03".to_string()),
            Some("2024-01-05".to_string()),
        ]
    );
}

#[test]
fn test_group_by_respects_filter() {
    let result = run(
        "SELECT Region, SUM(Volume) FROM prices WHERE Open > 150 GROUP BY Region",
        &prices(),
    )
    .unwrap();

    assert_eq!(
        texts(&result, 0),
        vec![Some("A".to_string()), Some("B".to_string()), None]
    );
    assert_eq!(floats(&result, 1), vec![Some(6000.0), Some(4000.0), Some(0.0)]);
}

#[test]
fn test_group_by_multiple_keys() {
    let result = run(
        "SELECT Region, COUNT(*) FROM prices GROUP BY Region, Open > 250",
        &prices(),
    )
    .unwrap();

    // Keys: "A|false" x2, "B|true" x2, "NULL|true"
    assert_eq!(floats(&result, 1), vec![Some(2.0), Some(2.0), Some(1.0)]);
}

#[test]
fn test_group_keys_compare_as_text() {
    assert_eq!(
        group_key(&[Value::Float(5.0), Value::Text("x".into()), Value::Null]),
        "5|x|NULL"
    );
    // Distinct values with the same text share a key.
    assert_eq!(group_key(&[Value::Float(5.0)]), group_key(&[Value::Text("5".into())]));

    let table = Table::try_new(
        vec![Field::new("Code", DataType::Utf8, true)],
        vec![utf8(vec![Some("NULL"), None])],
    )
    .unwrap();
    let result = run("SELECT Code, COUNT(*) FROM t GROUP BY Code", &table).unwrap();
    assert_eq!(result.num_rows(), 1);
    assert_eq!(floats(&result, 1), vec![Some(2.0)]);
}

#[test]
fn test_group_by_rejects_other_projections() {
    let err = run("SELECT Close + 1, COUNT(*) FROM prices GROUP BY Region", &prices()).unwrap_err();
    assert!(matches!(err, EvalError::UnsupportedExpression { .. }));

    let err = run("SELECT *, COUNT(*) FROM prices GROUP BY Region", &empty_prices()).unwrap_err();
    assert!(matches!(err, EvalError::UnsupportedExpression { .. }));

    let err = run("SELECT Missing, COUNT(*) FROM prices GROUP BY Region", &prices()).unwrap_err();
    assert_eq!(err, EvalError::ColumnNotFound("Missing".to_string()));
}

// ============================================================================
// Other column types
// ============================================================================

fn flags() -> Table {
    Table::try_new(
        vec![
            Field::new("Flag", DataType::Boolean, true),
            Field::new("Close", DataType::Float64, true),
        ],
        vec![
            Arc::new(BooleanArray::from(vec![Some(true), None, Some(false)])),
            float64(vec![Some(1.0), Some(2.0), Some(3.0)]),
        ],
    )
    .unwrap()
}

#[test]
fn test_other_column_types_pass_through() {
    let table = flags();

    let result = run("SELECT Flag FROM t WHERE Close > 1", &table).unwrap();
    let flag = result
        .column(0)
        .and_then(|c| c.as_any().downcast_ref::<BooleanArray>())
        .unwrap();
    assert_eq!(flag.iter().collect::<Vec<_>>(), vec![None, Some(false)]);

    let result = run("SELECT Flag, COUNT(*) FROM t GROUP BY Close", &table).unwrap();
    assert_eq!(result.field(0), Some(&Field::new("Flag", DataType::Boolean, true)));
    assert_eq!(result.num_rows(), 3);
}

#[test]
fn test_reading_other_column_types_fails() {
    let table = flags();
    let unsupported = |err: &EvalError| {
        matches!(
            err,
            EvalError::Table(TableError::UnsupportedColumnType { column, .. }) if column == "Flag"
        )
    };

    let err = run("SELECT Close FROM t WHERE Flag", &table).unwrap_err();
    assert!(unsupported(&err), "{:?}", err);

    let err = run("SELECT COUNT(Flag) FROM t", &table).unwrap_err();
    assert!(unsupported(&err), "{:?}", err);

    let err = run_strict("SELECT Flag + 1 FROM t", &table).unwrap_err();
    assert!(unsupported(&err), "{:?}", err);

    // Lenient operands absorb the failure as null, which coerces to 0.
    let result = run("SELECT Flag + 1 FROM t", &table).unwrap();
    assert_eq!(floats(&result, 0), vec![Some(1.0), Some(1.0), Some(1.0)]);
}

// ============================================================================
// Empty inputs
// ============================================================================

#[test]
fn test_empty_table_keeps_output_schema() {
    let table = empty_prices();

    let result = run("SELECT Date, Volume * 2 FROM prices", &table).unwrap();
    assert_eq!(result.num_rows(), 0);
    assert_eq!(names(&result), vec!["Date", "expr_1"]);

    let result = run("SELECT Region, COUNT(*) FROM prices GROUP BY Region", &table).unwrap();
    assert_eq!(result.num_rows(), 0);
    assert_eq!(names(&result), vec!["Region", "COUNT"]);

    let result = run("SELECT * FROM prices WHERE Volume > 1", &table).unwrap();
    assert_eq!(result.num_rows(), 0);
    assert_eq!(result.num_columns(), 3);
}

#[test]
fn test_nothing_survives_filter() {
    let result = run("SELECT Date, Close FROM prices WHERE Close > 99999", &prices()).unwrap();
    assert_eq!(result.num_rows(), 0);
    assert_eq!(names(&result), vec!["Date", "Close"]);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_queries_share_a_table_across_threads() {
    let table = prices();
    let engine = Engine::new();
    let count: Query = "SELECT COUNT(*) FROM prices WHERE Close > 1000".parse().unwrap();
    let grouped: Query = "SELECT Region, SUM(Volume) FROM prices GROUP BY Region".parse().unwrap();

    std::thread::scope(|s| {
        let a = s.spawn(|| engine.execute(&count, &table));
        let b = s.spawn(|| engine.execute(&grouped, &table));

        let a = a.join().unwrap().unwrap();
        let b = b.join().unwrap().unwrap();
        assert_eq!(floats(&a, 0), vec![Some(3.0)]);
        assert_eq!(b.num_rows(), 3);
    });
}
