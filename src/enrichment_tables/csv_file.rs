//! Handles enrichment tables for `type = csv_file`.
//! Table data is parsed once from raw comma-separated text supplied at
//! configuration time; how that text reaches the configuration is up to the
//! host.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt, Snafu};

use super::{Condition, Table};
use crate::config::{EnrichmentTableConfig, GenerateConfig};

/// Configuration for the `csv_file` enrichment table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsvTableConfig {
    /// Raw comma-separated table text, header row first.
    pub contents: String,
}

impl GenerateConfig for CsvTableConfig {
    fn generate_config() -> toml::Value {
        toml::Value::try_from(Self {
            contents: "id,name\n1,Alice\n".to_string(),
        })
        .unwrap()
    }
}

impl EnrichmentTableConfig for CsvTableConfig {
    fn build(&self) -> crate::Result<Box<dyn Table>> {
        Ok(Box::new(CsvTable::parse(&self.contents)?))
    }
}

/// Errors from parsing raw table text. All are fatal to configuration.
#[derive(Debug, Snafu)]
pub enum CsvTableError {
    /// The text is empty or otherwise yields no header row.
    #[snafu(display("table text has no header row"))]
    MissingHeader,

    /// Column names must be unique (and are case sensitive).
    #[snafu(display("duplicate column {column:?} in header row"))]
    DuplicateColumn {
        /// The repeated column name.
        column: String,
    },

    /// The text is not decodable as comma-separated rows, including data
    /// rows whose field count differs from the header.
    #[snafu(display("table text is not valid comma-separated data: {source}"))]
    Malformed {
        /// The underlying decode error.
        source: csv::Error,
    },
}

/// An immutable, header-indexed reference table parsed from comma-separated
/// text.
#[derive(Clone, PartialEq, Eq)]
pub struct CsvTable {
    columns: Vec<String>,
    column_indexes: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parses raw table text. Pure: the same text always yields the same
    /// table or the same error.
    ///
    /// The first row is the mandatory header and defines the columns. Blank
    /// trailing lines are ignored. The delimiter is always a comma; no
    /// sniffing is attempted.
    pub fn parse(contents: &str) -> Result<Self, CsvTableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(contents.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .context(MalformedSnafu)?
            .iter()
            .map(str::to_string)
            .collect();
        ensure!(!columns.is_empty(), MissingHeaderSnafu);

        let mut column_indexes = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            ensure!(
                column_indexes.insert(column.clone(), index).is_none(),
                DuplicateColumnSnafu { column }
            );
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context(MalformedSnafu)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            columns,
            column_indexes,
            rows,
        })
    }

    /// The number of data rows (the header is not a data row).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.column_indexes.get(column).copied()
    }
}

impl Table for CsvTable {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn sample(&self, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.first().map(|row| row[index].as_str())
    }

    fn find_row(
        &self,
        condition: Condition<'_>,
        select: &[String],
    ) -> Option<Vec<(String, String)>> {
        let match_index = self.column_index(condition.column)?;
        let row = self
            .rows
            .iter()
            .find(|row| row[match_index] == condition.value)?;
        Some(
            select
                .iter()
                .filter_map(|column| {
                    self.column_index(column)
                        .map(|index| (column.clone(), row[index].clone()))
                })
                .collect(),
        )
    }
}

impl fmt::Debug for CsvTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CsvTable({} columns, {} rows)",
            self.columns.len(),
            self.rows.len()
        )
    }
}
