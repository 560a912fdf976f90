// Loading of the fixed flights dataset. The server never writes; these
// commands run from the CLI before it starts.
pub mod csv;
pub mod schema;

use crate::db::db_pool::DuckDBConnectionManager;
use r2d2::Pool;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Missing data file: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Data file has no header row: {}", .0.display())]
    EmptyFile(PathBuf),
}

impl From<duckdb::Error> for IngestError {
    fn from(err: duckdb::Error) -> Self {
        IngestError::Database(err.to_string())
    }
}

impl From<r2d2::Error> for IngestError {
    fn from(err: r2d2::Error) -> Self {
        IngestError::Database(err.to_string())
    }
}

pub struct IngestManager {
    pool: Pool<DuckDBConnectionManager>,
    csv_ingestor: csv::CsvIngestor,
}

impl IngestManager {
    pub fn new(pool: Pool<DuckDBConnectionManager>) -> Self {
        Self {
            pool,
            csv_ingestor: csv::CsvIngestor::new(),
        }
    }

    /// Drops and recreates the dataset tables, empty.
    pub fn create_tables(&self) -> Result<(), IngestError> {
        let conn = self.pool.get()?;

        for table in schema::flights_dataset() {
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", table.name))?;
            conn.execute_batch(&table.create_statement())?;
            info!("Created table {}", table.name);
        }

        Ok(())
    }

    /// Replaces every dataset table with the matching `<table>.csv` in `dir`.
    ///
    /// All files are checked up front and the tables are replaced in one
    /// transaction, so any failure leaves the database untouched.
    pub fn load_dataset(&self, dir: &Path) -> Result<Vec<(String, i64)>, IngestError> {
        let tables = schema::flights_dataset();

        let mut files = Vec::with_capacity(tables.len());
        for table in &tables {
            let path = dir.join(format!("{}.csv", table.name));
            if !path.is_file() {
                return Err(IngestError::MissingFile(path));
            }
            files.push((table.name, path));
        }

        let mut conn = self.pool.get()?;
        // Dropping the transaction on an early return rolls it back
        let tx = conn.transaction()?;
        let mut loaded = Vec::with_capacity(files.len());
        for (table_name, path) in files {
            let count = self.csv_ingestor.ingest(&tx, &path, table_name)?;
            info!("Loaded {} rows into {} from {}", count, table_name, path.display());
            loaded.push((table_name.to_string(), count));
        }
        tx.commit()?;

        Ok(loaded)
    }
}
