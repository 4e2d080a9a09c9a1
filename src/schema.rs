//! Output schema resolution.
//!
//! The operator declares the shape of the events it will produce before any
//! event flows: the input schema passes through untouched, and one
//! descriptor is appended per selected column, typed from the table's first
//! data row.

use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, Snafu};

use crate::enrichment_tables::Table;
use crate::types::Kind;

/// A named, typed field in an event schema.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// The field name.
    pub name: String,
    /// The field's value kind.
    pub kind: Kind,
}

impl FieldDescriptor {
    /// A descriptor with the given name and kind.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Errors resolving an output schema. Fatal to configuration.
#[derive(Debug, Snafu)]
pub enum SchemaError {
    /// With no data rows there is nothing to sample column types from.
    #[snafu(display("the reference table has no data rows to sample column types from"))]
    EmptyTable,

    /// An append column must exist in the table header.
    #[snafu(display("column {column:?} does not exist in the reference table"))]
    UnknownColumn {
        /// The unknown column name.
        column: String,
    },
}

/// Computes the output schema for the given input schema and append columns.
///
/// Existing input fields are never renamed or removed; the result is the
/// input schema followed by one descriptor per append column, in the order
/// given, each typed by [`Kind::guess`] over the table's first data row.
pub fn resolve_output_schema(
    input: &[FieldDescriptor],
    append_columns: &[String],
    table: &dyn Table,
) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let mut output = input.to_vec();
    for column in append_columns {
        ensure!(
            table.columns().iter().any(|name| name == column),
            UnknownColumnSnafu { column }
        );
        let sample = table.sample(column).context(EmptyTableSnafu)?;
        output.push(FieldDescriptor::new(column.clone(), Kind::guess(sample)));
    }
    Ok(output)
}
