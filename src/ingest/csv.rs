use crate::ingest::IngestError;
use duckdb::Connection;
use std::path::Path;
use tracing::debug;

pub struct CsvIngestor {
    sample_size: i64,
}

impl CsvIngestor {
    pub fn new() -> Self {
        Self {
            // -1 scans the whole file for type detection
            sample_size: -1,
        }
    }

    pub fn with_sample_size(sample_size: i64) -> Self {
        Self { sample_size }
    }

    fn headers(&self, path: &Path) -> Result<Vec<String>, IngestError> {
        let mut reader = ::csv::Reader::from_path(path)?;
        Ok(reader.headers()?.iter().map(|h| h.trim().to_string()).collect())
    }

    /// Replaces `table_name` with the contents of the CSV at `path` and
    /// returns the number of rows loaded.
    pub fn ingest(&self, conn: &Connection, path: &Path, table_name: &str) -> Result<i64, IngestError> {
        let headers = self.headers(path)?;
        if headers.iter().all(|header| header.is_empty()) {
            return Err(IngestError::EmptyFile(path.to_path_buf()));
        }

        let columns = headers
            .iter()
            .map(|header| {
                format!(
                    "{} AS {}",
                    quote_identifier(header),
                    quote_identifier(&header.to_lowercase())
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS SELECT {} FROM read_csv_auto({}, header=true, sample_size={})",
            quote_identifier(table_name),
            columns,
            quote_literal(&path.to_string_lossy()),
            self.sample_size
        );
        debug!("Executing: {}", sql);
        conn.execute_batch(&sql)?;

        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name)),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl Default for CsvIngestor {
    fn default() -> Self {
        Self::new()
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_quoting() {
        assert_eq!(quote_identifier("Day \"1\""), "\"Day \"\"1\"\"\"");
        assert_eq!(quote_literal("/tmp/o'hare.csv"), "'/tmp/o''hare.csv'");
    }

    #[test]
    fn test_ingest_replaces_existing_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("airlines.csv");
        fs::write(&path, "IATA_CODE,AIRLINE\nUA,United Air Lines Inc.\n").unwrap();

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE airlines (iata_code VARCHAR, airline VARCHAR); INSERT INTO airlines VALUES ('XX', 'Old')")
            .unwrap();

        let ingestor = CsvIngestor::with_sample_size(100);
        assert_eq!(ingestor.ingest(&conn, &path, "airlines").unwrap(), 1);

        let name: String = conn
            .query_row("SELECT airline FROM airlines WHERE iata_code = 'UA'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "United Air Lines Inc.");
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("airports.csv");
        fs::write(&path, "").unwrap();

        let conn = Connection::open_in_memory().unwrap();
        let err = CsvIngestor::new().ingest(&conn, &path, "airports").unwrap_err();
        assert!(matches!(err, IngestError::EmptyFile(_)));
    }

    #[test]
    fn test_unreadable_file_is_csv_error() {
        let ingestor = CsvIngestor::new();
        let conn = Connection::open_in_memory().unwrap();
        let err = ingestor
            .ingest(&conn, Path::new("/nonexistent/airlines.csv"), "airlines")
            .unwrap_err();
        assert!(matches!(err, IngestError::Csv(_)));
    }
}
