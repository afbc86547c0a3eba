//! In-memory CSV table with header lookup and null detection

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Cell values treated as missing, matching common spreadsheet exports
pub const NULL_MARKERS: [&str; 11] = [
    "", "NA", "N/A", "n/a", "NULL", "null", "NaN", "nan", "None", "#N/A", "<NA>",
];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl CsvTable {
    pub fn read_path(path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TableError::NotFound(path.display().to_string()),
            _ => TableError::Io {
                path: path.display().to_string(),
                source: e,
            },
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Columns from `required` that the header lacks, in the given order
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Non-null values of one column, one entry per row
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        let position = self.position(name);
        self.rows
            .iter()
            .map(move |row| position.and_then(|p| cell(row, p)))
    }

    pub fn rows(&self) -> impl Iterator<Item = CsvRow<'_>> {
        self.rows.iter().map(move |record| CsvRow {
            table: self,
            record,
        })
    }

    /// Number of null cells in a column
    pub fn null_count(&self, name: &str) -> usize {
        self.column(name).filter(Option::is_none).count()
    }
}

fn cell(record: &StringRecord, position: usize) -> Option<&str> {
    record
        .get(position)
        .filter(|value| !NULL_MARKERS.contains(value))
}

/// One data row
#[derive(Debug, Clone, Copy)]
pub struct CsvRow<'a> {
    table: &'a CsvTable,
    record: &'a StringRecord,
}

impl<'a> CsvRow<'a> {
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.table.position(name).and_then(|p| cell(self.record, p))
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }
}

/// Parse a numeric cell; non-finite values count as non-numeric
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id, name ,salary
1,Ada,120000
2, ,NA
3,Grace
";

    #[test]
    fn test_headers_and_nulls() {
        let table = CsvTable::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.has_column("name"));
        assert_eq!(
            table.missing_columns(&["id", "team", "salary", "level"]),
            vec!["team", "level"]
        );
        assert_eq!(table.null_count("name"), 1);
        assert_eq!(table.null_count("salary"), 2);
    }

    #[test]
    fn test_row_access() {
        let table = CsvTable::from_reader(SAMPLE.as_bytes()).unwrap();
        let rows: Vec<_> = table.rows().collect();

        assert_eq!(rows[0].get("name"), Some("Ada"));
        assert_eq!(rows[1].get("name"), None);
        assert_eq!(rows[2].get("salary"), None);
        assert_eq!(rows[0].get("missing"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some("120000")), Some(120000.0));
        assert_eq!(parse_number(Some("98500.50")), Some(98500.5));
        assert_eq!(parse_number(Some("98,500")), None);
        assert_eq!(parse_number(Some("abc")), None);
        assert_eq!(parse_number(Some("inf")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_missing_file() {
        let err = CsvTable::read_path(Path::new("/nonexistent/paybench.csv")).unwrap_err();
        assert!(matches!(err, TableError::NotFound(_)));
        assert_eq!(err.to_string(), "File not found: /nonexistent/paybench.csv");
    }
}
