//! The `enrich` transform: joins each event against the configured
//! reference table and appends the selected columns to matching events.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt, Snafu};

use crate::config::{GenerateConfig, TransformConfig, TransformContext};
use crate::enrichment_tables::{Condition, Table};
use crate::event::LogEvent;
use crate::internal_events::{emit, EnrichCoercionFailed, EnrichFieldMissing};
use crate::schema::{resolve_output_schema, FieldDescriptor};
use crate::transforms::{FunctionTransform, OutputBuffer, Transform};
use crate::types::{ConversionError, Kind};

/// What to do with an event whose join value matches no table row.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Emit the event unmodified, without the appended fields.
    #[default]
    Passthrough,
    /// Append every selected column with an empty value of its guessed kind.
    FillEmpty,
}

/// Configuration for the `enrich` transform.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrichConfig {
    /// Path of the event field whose value is joined against `match_column`.
    pub match_field: String,

    /// Reference-table column compared against the join value.
    pub match_column: String,

    /// Reference-table columns appended to matching events, in order.
    ///
    /// The match column itself cannot be appended.
    pub append_columns: Vec<String>,

    /// What to do when no table row matches.
    #[serde(default)]
    pub on_miss: MissPolicy,
}

/// Configuration fields whose selectable values depend on the table and on
/// earlier choices.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigOption {
    /// Candidate columns for `match_column`.
    MatchColumn,
    /// Candidate columns for `append_columns`.
    AppendColumns,
}

/// Errors resolving selectable option values. Fatal to configuration.
#[derive(Debug, Snafu)]
pub enum OptionsError {
    /// Options cannot be offered before a table has been parsed.
    #[snafu(display("no reference table has been configured yet"))]
    MissingTable,
}

/// Resolves the selectable values for `option` against the current partial
/// configuration.
///
/// Pure: the host configuration UI re-invokes this whenever an earlier
/// choice changes. Match-column candidates are every table column in header
/// order; append-column candidates additionally exclude the column already
/// chosen for matching.
pub fn resolve_options(
    option: ConfigOption,
    table: Option<&dyn Table>,
    match_column: Option<&str>,
) -> Result<Vec<String>, OptionsError> {
    let columns = table.context(MissingTableSnafu)?.columns().iter();
    Ok(match option {
        ConfigOption::MatchColumn => columns.cloned().collect(),
        ConfigOption::AppendColumns => columns
            .filter(|column| Some(column.as_str()) != match_column)
            .cloned()
            .collect(),
    })
}

/// Errors validating an [`EnrichConfig`] against its table. Fatal to
/// configuration; the operator must not be deployed.
#[derive(Debug, Snafu)]
pub enum BuildError {
    /// The transform cannot be built without a table.
    #[snafu(display("no reference table has been configured for this transform"))]
    TableMissing,

    /// `match_column` must exist in the table header.
    #[snafu(display("match column {column:?} does not exist in the reference table"))]
    UnknownMatchColumn {
        /// The unknown column name.
        column: String,
    },

    /// Every append column must exist in the table header.
    #[snafu(display("append column {column:?} does not exist in the reference table"))]
    UnknownAppendColumn {
        /// The unknown column name.
        column: String,
    },

    /// A column cannot be both the join key and an appended value.
    #[snafu(display("column {column:?} cannot be both the match column and an append column"))]
    MatchColumnAppended {
        /// The doubly selected column name.
        column: String,
    },

    /// Append kinds are sampled from the first data row, so a table with no
    /// data rows cannot be enriched from.
    #[snafu(display("the reference table has no data rows to sample column types from"))]
    NoSampleRow,
}

/// Failures while enriching a single event.
///
/// These fail that event only; the operator keeps running and the host
/// decides what a failed event means for the pipeline.
#[derive(Debug, Snafu)]
pub enum EnrichError {
    /// The configured match path resolved to nothing.
    #[snafu(display("event has no field at {field:?}"))]
    FieldNotFound {
        /// The match path.
        field: String,
    },

    /// A matched row's value diverged from the kind sampled for its column.
    #[snafu(display("matched value for column {column:?} is not its sampled kind"))]
    Coercion {
        /// The append column.
        column: String,
        /// The conversion failure.
        source: ConversionError,
    },
}

impl GenerateConfig for EnrichConfig {
    fn generate_config() -> toml::Value {
        toml::Value::try_from(Self {
            match_field: "user_id".to_string(),
            match_column: "id".to_string(),
            append_columns: vec!["name".to_string()],
            on_miss: MissPolicy::default(),
        })
        .unwrap()
    }
}

impl TransformConfig for EnrichConfig {
    fn build(&self, context: &TransformContext) -> crate::Result<Transform> {
        Ok(Transform::function(self.build_enrich(context)?))
    }

    fn outputs(
        &self,
        context: &TransformContext,
        input: &[FieldDescriptor],
    ) -> crate::Result<Vec<FieldDescriptor>> {
        let table = context.table.as_deref().context(TableMissingSnafu)?;
        Ok(resolve_output_schema(input, &self.append_columns, table)?)
    }
}

impl EnrichConfig {
    /// Validates the configuration against the context's table and freezes
    /// it into the runtime transform.
    pub fn build_enrich(&self, context: &TransformContext) -> Result<Enrich, BuildError> {
        let table = context.table.clone().context(TableMissingSnafu)?;
        ensure!(
            table.columns().iter().any(|name| name == &self.match_column),
            UnknownMatchColumnSnafu {
                column: &self.match_column
            }
        );

        let mut kinds = IndexMap::with_capacity(self.append_columns.len());
        for column in &self.append_columns {
            ensure!(
                column != &self.match_column,
                MatchColumnAppendedSnafu { column }
            );
            ensure!(
                table.columns().iter().any(|name| name == column),
                UnknownAppendColumnSnafu { column }
            );
            let sample = table.sample(column).context(NoSampleRowSnafu)?;
            kinds.insert(column.clone(), Kind::guess(sample));
        }

        Ok(Enrich {
            match_field: self.match_field.clone(),
            match_column: self.match_column.clone(),
            select: kinds.keys().cloned().collect(),
            kinds,
            on_miss: self.on_miss,
            table,
        })
    }
}

/// A configured enrichment operator instance.
///
/// Everything is frozen at build time; each invocation is an independent,
/// bounded in-memory computation over the immutable table.
#[derive(Clone)]
pub struct Enrich {
    match_field: String,
    match_column: String,
    select: Vec<String>,
    kinds: IndexMap<String, Kind>,
    on_miss: MissPolicy,
    table: Arc<dyn Table>,
}

impl Enrich {
    /// Enriches a single event: one event in, one event or a per-event
    /// error out.
    pub fn transform_one(&self, mut event: LogEvent) -> Result<LogEvent, EnrichError> {
        let join_value = event
            .get(&self.match_field)
            .context(FieldNotFoundSnafu {
                field: &self.match_field,
            })?
            .to_string_lossy()
            .into_owned();

        let matched = self.table.find_row(
            Condition {
                column: &self.match_column,
                value: &join_value,
            },
            &self.select,
        );

        match matched {
            Some(row) => {
                for (column, raw) in row {
                    let kind = self
                        .kinds
                        .get(&column)
                        .copied()
                        .expect("selected column has a sampled kind");
                    let value = kind
                        .coerce(&raw)
                        .with_context(|_| CoercionSnafu {
                            column: column.clone(),
                        })?;
                    event.insert(&column, value);
                }
                Ok(event)
            }
            None => {
                trace!(
                    message = "No table row matched the join value.",
                    value = %join_value,
                );
                if self.on_miss == MissPolicy::FillEmpty {
                    for (column, kind) in &self.kinds {
                        event.insert(column, kind.empty_value());
                    }
                }
                Ok(event)
            }
        }
    }
}

impl FunctionTransform for Enrich {
    fn transform(&mut self, output: &mut OutputBuffer, event: LogEvent) {
        match self.transform_one(event) {
            Ok(event) => output.push(event),
            Err(EnrichError::FieldNotFound { ref field }) => {
                emit(EnrichFieldMissing { field });
            }
            Err(EnrichError::Coercion {
                ref column,
                ref source,
            }) => {
                emit(EnrichCoercionFailed {
                    column,
                    error: source,
                });
            }
        }
    }
}

impl std::fmt::Debug for Enrich {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enrich")
            .field("match_field", &self.match_field)
            .field("match_column", &self.match_column)
            .field("select", &self.select)
            .field("on_miss", &self.on_miss)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::event::Value;
    use crate::test_util::log_event;
    use crate::types::Kind;

    fn context() -> TransformContext {
        let table = crate::enrichment_tables::csv_file::CsvTable::parse(indoc! {"
            id,name,score
            1,Alice,10
            2,Bob,20
        "})
        .unwrap();
        TransformContext::new(Arc::new(table))
    }

    fn config() -> EnrichConfig {
        EnrichConfig {
            match_field: "user_id".to_string(),
            match_column: "id".to_string(),
            append_columns: vec!["name".to_string(), "score".to_string()],
            on_miss: MissPolicy::default(),
        }
    }

    #[test]
    fn match_column_options_follow_header_order() {
        let context = context();
        let options =
            resolve_options(ConfigOption::MatchColumn, context.table.as_deref(), None).unwrap();
        assert_eq!(options, ["id", "name", "score"]);
    }

    #[test]
    fn append_column_options_exclude_match_column() {
        let context = context();
        let options = resolve_options(
            ConfigOption::AppendColumns,
            context.table.as_deref(),
            Some("name"),
        )
        .unwrap();
        assert_eq!(options, ["id", "score"]);
    }

    #[test]
    fn options_require_a_table() {
        let error = resolve_options(ConfigOption::MatchColumn, None, None).unwrap_err();
        assert!(matches!(error, OptionsError::MissingTable));
    }

    #[test]
    fn build_rejects_unknown_match_column() {
        let error = EnrichConfig {
            match_column: "nope".to_string(),
            ..config()
        }
        .build_enrich(&context())
        .unwrap_err();
        assert!(matches!(error, BuildError::UnknownMatchColumn { .. }));
    }

    #[test]
    fn build_rejects_unknown_append_column() {
        let error = EnrichConfig {
            append_columns: vec!["nope".to_string()],
            ..config()
        }
        .build_enrich(&context())
        .unwrap_err();
        assert!(matches!(error, BuildError::UnknownAppendColumn { .. }));
    }

    #[test]
    fn build_rejects_appending_the_match_column() {
        let error = EnrichConfig {
            append_columns: vec!["id".to_string()],
            ..config()
        }
        .build_enrich(&context())
        .unwrap_err();
        assert!(matches!(
            error,
            BuildError::MatchColumnAppended { column } if column == "id"
        ));
    }

    #[test]
    fn build_requires_a_sample_row() {
        let table =
            crate::enrichment_tables::csv_file::CsvTable::parse("id,name,score\n").unwrap();
        let error = config()
            .build_enrich(&TransformContext::new(Arc::new(table)))
            .unwrap_err();
        assert!(matches!(error, BuildError::NoSampleRow));
    }

    #[test]
    fn build_requires_a_table() {
        let error = config()
            .build_enrich(&TransformContext::default())
            .unwrap_err();
        assert!(matches!(error, BuildError::TableMissing));
    }

    #[test]
    fn enriches_a_matching_event() {
        let enrich = config().build_enrich(&context()).unwrap();
        let event = log_event([("user_id", Value::Integer(2))]);

        let enriched = enrich.transform_one(event).unwrap();

        assert_eq!(enriched.get("user_id"), Some(&Value::Integer(2)));
        assert_eq!(enriched.get("name"), Some(&Value::from("Bob")));
        assert_eq!(enriched.get("score"), Some(&Value::Integer(20)));
    }

    #[test]
    fn join_compares_string_renderings() {
        // The event carries text while the table cell is numeric text; the
        // comparison is on the rendering, never on a coerced value.
        let enrich = config().build_enrich(&context()).unwrap();
        let event = log_event([("user_id", Value::from("1"))]);

        let enriched = enrich.transform_one(event).unwrap();
        assert_eq!(enriched.get("name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn miss_passes_event_through_unmodified() {
        let enrich = config().build_enrich(&context()).unwrap();
        let event = log_event([("user_id", Value::Integer(3))]);

        let enriched = enrich.transform_one(event.clone()).unwrap();

        assert_eq!(enriched, event);
        assert!(!enriched.contains("name"));
        assert!(!enriched.contains("score"));
    }

    #[test]
    fn miss_fill_empty_appends_kind_defaults() {
        let enrich = EnrichConfig {
            on_miss: MissPolicy::FillEmpty,
            ..config()
        }
        .build_enrich(&context())
        .unwrap();
        let event = log_event([("user_id", Value::Integer(3))]);

        let enriched = enrich.transform_one(event).unwrap();

        assert_eq!(enriched.get("name"), Some(&Value::from("")));
        assert_eq!(enriched.get("score"), Some(&Value::Integer(0)));
    }

    #[test]
    fn missing_match_field_fails_the_event() {
        let enrich = config().build_enrich(&context()).unwrap();
        let event = log_event([("other", Value::Integer(2))]);

        let error = enrich.transform_one(event).unwrap_err();
        assert!(matches!(
            error,
            EnrichError::FieldNotFound { field } if field == "user_id"
        ));
    }

    #[test]
    fn divergent_row_value_fails_coercion() {
        // The first row samples `score` as integer; the second row diverges.
        let table = crate::enrichment_tables::csv_file::CsvTable::parse(indoc! {"
            id,score
            1,10
            2,abc
        "})
        .unwrap();
        let enrich = EnrichConfig {
            match_field: "user_id".to_string(),
            match_column: "id".to_string(),
            append_columns: vec!["score".to_string()],
            on_miss: MissPolicy::default(),
        }
        .build_enrich(&TransformContext::new(Arc::new(table)))
        .unwrap();

        let error = enrich
            .transform_one(log_event([("user_id", Value::Integer(2))]))
            .unwrap_err();
        assert!(matches!(
            error,
            EnrichError::Coercion { column, .. } if column == "score"
        ));
    }

    #[test]
    fn every_row_round_trips() {
        let enrich = config().build_enrich(&context()).unwrap();
        for (id, name, score) in [(1, "Alice", 10), (2, "Bob", 20)] {
            let enriched = enrich
                .transform_one(log_event([("user_id", Value::Integer(id))]))
                .unwrap();
            assert_eq!(enriched.get("name"), Some(&Value::from(name)));
            assert_eq!(enriched.get("score"), Some(&Value::Integer(score)));
        }
    }

    #[test]
    fn failed_events_are_dropped_by_the_function_transform() {
        let mut enrich = config().build_enrich(&context()).unwrap();
        let mut output = OutputBuffer::default();

        FunctionTransform::transform(
            &mut enrich,
            &mut output,
            log_event([("other", Value::Integer(1))]),
        );
        assert!(output.is_empty());

        FunctionTransform::transform(
            &mut enrich,
            &mut output,
            log_event([("user_id", Value::Integer(1))]),
        );
        assert_eq!(output.len(), 1);
        assert_eq!(
            output.first().and_then(|event| event.get("name")),
            Some(&Value::from("Alice"))
        );
    }

    #[test]
    fn config_deserializes_with_default_miss_policy() {
        let config: EnrichConfig = toml::from_str(indoc! {r#"
            match_field = "user_id"
            match_column = "id"
            append_columns = ["name"]
        "#})
        .unwrap();
        assert_eq!(config.on_miss, MissPolicy::Passthrough);
    }

    #[test]
    fn generate_config_builds() {
        let value = EnrichConfig::generate_config();
        let config: EnrichConfig = value.try_into().unwrap();
        assert_eq!(config.match_column, "id");
    }

    #[test]
    fn outputs_append_guessed_descriptors() {
        let input = vec![FieldDescriptor::new("user_id", Kind::Integer)];
        let output = config().outputs(&context(), &input).unwrap();
        assert_eq!(
            output,
            vec![
                FieldDescriptor::new("user_id", Kind::Integer),
                FieldDescriptor::new("name", Kind::Bytes),
                FieldDescriptor::new("score", Kind::Integer),
            ]
        );
    }
}
