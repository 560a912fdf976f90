use crate::db::db_pool::DuckDBConnectionManager;
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Decimal128Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use async_trait::async_trait;
use duckdb::Connection;
use r2d2::Pool;
use serde_json::{Map, Number, Value};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error};

/// One result row: column name to display value, in select-list order.
pub type Row = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Database connection error: {0}")]
    Pool(String),
    #[error("Database task execution failed: {0}")]
    Task(String),
}

impl From<duckdb::Error> for ExecutionError {
    fn from(err: duckdb::Error) -> Self {
        ExecutionError::Database(err.to_string())
    }
}

impl From<ArrowError> for ExecutionError {
    fn from(err: ArrowError) -> Self {
        ExecutionError::Database(err.to_string())
    }
}

impl From<r2d2::Error> for ExecutionError {
    fn from(err: r2d2::Error) -> Self {
        ExecutionError::Pool(err.to_string())
    }
}

/// Runs one SQL string and returns its rows ready for display.
///
/// The SQL is executed verbatim. Callers are trusted to hand over read-only
/// statements; nothing here checks.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError>;
}

pub struct DuckDbExecutor {
    pool: Pool<DuckDBConnectionManager>,
}

impl DuckDbExecutor {
    pub fn new(pool: Pool<DuckDBConnectionManager>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryExecutor for DuckDbExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        let pool = self.pool.clone();
        let sql = sql.to_string();

        // DuckDB calls block, keep them off the async workers
        let result = tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            run_query(&conn, &sql)
        })
        .await
        .map_err(|e| {
            error!("Task join error: {}", e);
            ExecutionError::Task(e.to_string())
        })?;

        if let Err(e) = &result {
            error!("Database query error: {}", e);
        }
        result
    }
}

pub fn run_query(conn: &Connection, sql: &str) -> Result<Vec<Row>, ExecutionError> {
    let start_time = Instant::now();

    let mut stmt = conn.prepare(sql)?;
    let record_batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();

    let mut rows = Vec::new();
    for batch in &record_batches {
        rows.extend(batch_to_rows(batch)?);
    }

    debug!(
        "Query returned {} rows in {}ms",
        rows.len(),
        start_time.elapsed().as_millis()
    );
    Ok(rows)
}

pub fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<Row>, ArrowError> {
    let schema = batch.schema();
    let mut rows = vec![Row::new(); batch.num_rows()];

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        let values = column_values(column.as_ref())?;
        for (row, value) in rows.iter_mut().zip(values) {
            row.insert(field.name().clone(), value);
        }
    }

    Ok(rows)
}

/// Converts one column to display values: NULL becomes `""`, fractional
/// numbers are rounded to 2 decimals, everything without a JSON
/// counterpart is rendered as text.
fn column_values(array: &dyn Array) -> Result<Vec<Value>, ArrowError> {
    let values = match array.data_type() {
        DataType::Boolean => {
            let typed = array.as_boolean();
            cells(array, |i| Value::Bool(typed.value(i)))
        }
        DataType::Int8 => {
            let typed = array.as_primitive::<Int8Type>();
            cells(array, |i| Value::from(typed.value(i)))
        }
        DataType::Int16 => {
            let typed = array.as_primitive::<Int16Type>();
            cells(array, |i| Value::from(typed.value(i)))
        }
        DataType::Int32 => {
            let typed = array.as_primitive::<Int32Type>();
            cells(array, |i| Value::from(typed.value(i)))
        }
        DataType::Int64 => {
            let typed = array.as_primitive::<Int64Type>();
            cells(array, |i| Value::from(typed.value(i)))
        }
        DataType::UInt8 => {
            let typed = array.as_primitive::<UInt8Type>();
            cells(array, |i| Value::from(typed.value(i)))
        }
        DataType::UInt16 => {
            let typed = array.as_primitive::<UInt16Type>();
            cells(array, |i| Value::from(typed.value(i)))
        }
        DataType::UInt32 => {
            let typed = array.as_primitive::<UInt32Type>();
            cells(array, |i| Value::from(typed.value(i)))
        }
        DataType::UInt64 => {
            let typed = array.as_primitive::<UInt64Type>();
            cells(array, |i| Value::from(typed.value(i)))
        }
        DataType::Float32 => {
            let typed = array.as_primitive::<Float32Type>();
            cells(array, |i| rounded(f64::from(typed.value(i))))
        }
        DataType::Float64 => {
            let typed = array.as_primitive::<Float64Type>();
            cells(array, |i| rounded(typed.value(i)))
        }
        DataType::Decimal128(_, scale) => {
            let typed = array.as_primitive::<Decimal128Type>();
            let scale = *scale;
            cells(array, |i| decimal(typed.value(i), scale))
        }
        DataType::Utf8 => {
            let typed = array.as_string::<i32>();
            cells(array, |i| Value::String(typed.value(i).to_string()))
        }
        DataType::LargeUtf8 => {
            let typed = array.as_string::<i64>();
            cells(array, |i| Value::String(typed.value(i).to_string()))
        }
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(array, &options)?;
            cells(array, |i| Value::String(formatter.value(i).to_string()))
        }
    };

    Ok(values)
}

fn cells(array: &dyn Array, cell: impl Fn(usize) -> Value) -> Vec<Value> {
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Value::String(String::new())
            } else {
                cell(i)
            }
        })
        .collect()
}

pub fn rounded(value: f64) -> Value {
    if !value.is_finite() {
        return Value::String(String::new());
    }
    // Past 1e15 a double has no cents left to round, and scaling could overflow
    if value.abs() >= 1e15 {
        return Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(String::new()));
    }
    // + 0.0 folds -0.0 into 0.0
    let value = (value * 100.0).round() / 100.0 + 0.0;
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(String::new()))
}

fn decimal(raw: i128, scale: i8) -> Value {
    if scale <= 0 {
        let whole = 10i128
            .checked_pow(u32::from(scale.unsigned_abs()))
            .and_then(|factor| raw.checked_mul(factor));
        return match whole.and_then(|v| i64::try_from(v).ok()) {
            Some(v) => Value::from(v),
            None => rounded(raw as f64 * 10f64.powi(-i32::from(scale))),
        };
    }
    rounded(raw as f64 / 10f64.powi(i32::from(scale)))
}

/// Text shown in a result table cell.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
