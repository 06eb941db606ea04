// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::connector::quote_ident;
use crate::{PgWriter, Result, WarehouseError};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int32Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use diagnostics::*;
use duckdb::Connection;
use duckdb::types::Value;

/// Destination of an ingestion job.
pub trait TableWriter {
    /// Replace the entire contents (and shape) of `table` with `data`.
    /// Returns the number of rows written.
    fn replace_table(&mut self, table: &str, data: &RecordBatch) -> Result<usize>;
}

/// Bulk-write flavor of a connection, for whichever backend holds the
/// rate tables.
pub enum BulkWriter {
    DuckDb(DuckWriter),
    Postgres(PgWriter),
}

impl TableWriter for BulkWriter {
    fn replace_table(&mut self, table: &str, data: &RecordBatch) -> Result<usize> {
        match self {
            BulkWriter::DuckDb(writer) => writer.replace_table(table, data),
            BulkWriter::Postgres(writer) => writer.replace_table(table, data),
        }
    }
}

/// Replaces tables in a DuckDB database.
///
/// The table is dropped, recreated from the batch schema and filled inside
/// one transaction, so readers on other connections see either the old or
/// the new table.
pub struct DuckWriter {
    conn: Connection,
}

impl DuckWriter {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TableWriter for DuckWriter {
    fn replace_table(&mut self, table: &str, data: &RecordBatch) -> Result<usize> {
        let ident = table_ident(table)?;
        let create = create_table_sql(&ident, &data.schema(), duck_type)?;
        let placeholders = vec!["?"; data.num_columns()].join(", ");
        let insert = format!("INSERT INTO {ident} VALUES ({placeholders})");

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {ident}; {create};"))?;
        {
            let mut stmt = tx.prepare(&insert)?;
            for row in 0..data.num_rows() {
                let values = row_values(data, row)?;
                stmt.execute(duckdb::params_from_iter(values))?;
            }
        }
        tx.commit()?;

        let rows = data.num_rows();
        info!("Replaced table {table} with {rows} rows", table: table, rows: rows);
        Ok(rows)
    }
}

/// Quoted identifier for `table`, rejecting names no backend accepts.
pub(crate) fn table_ident(table: &str) -> Result<String> {
    if table.trim().is_empty() || table.contains('\0') {
        return Err(WarehouseError::InvalidTableName(table.to_string()));
    }
    Ok(quote_ident(table))
}

/// `CREATE TABLE` for `schema`, with column types named by `sql_type`.
pub(crate) fn create_table_sql(
    ident: &str,
    schema: &Schema,
    sql_type: fn(&DataType) -> Option<&'static str>,
) -> Result<String> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let sql_type = sql_type(field.data_type()).ok_or_else(|| unsupported(field.name(), field.data_type()))?;
            Ok(format!("{} {sql_type}", quote_ident(field.name())))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("CREATE TABLE {ident} ({})", columns.join(", ")))
}

fn duck_type(data_type: &DataType) -> Option<&'static str> {
    match data_type {
        DataType::Utf8 => Some("VARCHAR"),
        DataType::Float64 => Some("DOUBLE"),
        DataType::Int64 => Some("BIGINT"),
        DataType::Int32 => Some("INTEGER"),
        DataType::Boolean => Some("BOOLEAN"),
        DataType::Date32 => Some("DATE"),
        _ => None,
    }
}

fn row_values(data: &RecordBatch, row: usize) -> Result<Vec<Value>> {
    let schema = data.schema();
    data.columns()
        .iter()
        .zip(schema.fields().iter())
        .map(|(column, field)| cell_value(column, row).ok_or_else(|| unsupported(field.name(), field.data_type())))
        .collect()
}

fn cell_value(column: &ArrayRef, row: usize) -> Option<Value> {
    if column.is_null(row) {
        return Some(Value::Null);
    }
    let value = match column.data_type() {
        DataType::Utf8 => Value::Text(column.as_string::<i32>().value(row).to_string()),
        DataType::Float64 => Value::Double(column.as_primitive::<Float64Type>().value(row)),
        DataType::Int64 => Value::BigInt(column.as_primitive::<Int64Type>().value(row)),
        DataType::Int32 => Value::Int(column.as_primitive::<Int32Type>().value(row)),
        DataType::Boolean => Value::Boolean(column.as_boolean().value(row)),
        DataType::Date32 => Value::Date32(column.as_primitive::<Date32Type>().value(row)),
        _ => return None,
    };
    Some(value)
}

pub(crate) fn unsupported(column: &str, data_type: &DataType) -> WarehouseError {
    WarehouseError::UnsupportedType {
        column: column.to_string(),
        data_type: data_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Date32Array, Float64Array, StringArray};
    use arrow::datatypes::Field;
    use std::sync::Arc;

    fn rates() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("currency_symbol", DataType::Utf8, false),
            Field::new("rate_date", DataType::Date32, false),
            Field::new("exchange_rate", DataType::Float64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["CAD", "EUR"])),
            Arc::new(Date32Array::from(vec![18993, 18994])),
            Arc::new(Float64Array::from(vec![Some(1.27), None])),
        ];
        RecordBatch::try_new(schema, columns).unwrap()
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql("\"rates\"", &rates().schema(), duck_type).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE \"rates\" (\"currency_symbol\" VARCHAR, \"rate_date\" DATE, \"exchange_rate\" DOUBLE)"
        );
    }

    #[test]
    fn test_unsupported_type() {
        let schema = Schema::new(vec![Field::new("blob", DataType::Binary, false)]);
        assert!(matches!(
            create_table_sql("\"t\"", &schema, duck_type),
            Err(WarehouseError::UnsupportedType { column, .. }) if column == "blob"
        ));
    }

    #[test]
    fn test_row_values_with_null() {
        let values = row_values(&rates(), 1).unwrap();
        assert_eq!(
            values,
            vec![Value::Text("EUR".to_string()), Value::Date32(18994), Value::Null]
        );
    }

    #[test]
    fn test_replace_table_drops_previous_contents() {
        let mut writer = DuckWriter::new(Connection::open_in_memory().unwrap());
        writer
            .connection()
            .execute_batch("CREATE TABLE rates (legacy INTEGER); INSERT INTO rates VALUES (1), (2), (3);")
            .unwrap();

        let written = writer.replace_table("rates", &rates()).unwrap();
        assert_eq!(written, 2);

        let count: i64 = writer
            .connection()
            .query_row("SELECT count(*) FROM rates", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let symbol: String = writer
            .connection()
            .query_row(
                "SELECT currency_symbol FROM rates WHERE exchange_rate IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(symbol, "EUR");
    }

    #[test]
    fn test_replace_table_rejects_empty_name() {
        let mut writer = DuckWriter::new(Connection::open_in_memory().unwrap());
        assert!(matches!(
            writer.replace_table("  ", &rates()),
            Err(WarehouseError::InvalidTableName(_))
        ));
    }
}
