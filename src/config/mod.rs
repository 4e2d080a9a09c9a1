//! Configuration-time plumbing shared by tables and transforms.
//!
//! A configuration session runs synchronously and exactly once per operator
//! instance: the host builds the table, resolves options and the output
//! schema as the user adjusts choices, then freezes the transform. Nothing
//! here is touched again at runtime.

use std::sync::Arc;

mod enrichment_table;

pub use enrichment_table::EnrichmentTableConfig;

use crate::enrichment_tables::Table;
use crate::schema::FieldDescriptor;
use crate::transforms::Transform;

/// Generate an example configuration value for a component.
pub trait GenerateConfig {
    /// Returns a complete, deserializable example configuration.
    fn generate_config() -> toml::Value;
}

/// Everything a transform needs from its host at build time.
///
/// Each operator instance owns its table outright; parallel instances of the
/// same configuration clone the `Arc` and read without synchronization.
#[derive(Clone, Default)]
pub struct TransformContext {
    /// The reference table configured for this operator instance, if any.
    pub table: Option<Arc<dyn Table>>,
}

impl TransformContext {
    /// A context carrying the given table.
    pub fn new(table: Arc<dyn Table>) -> Self {
        Self { table: Some(table) }
    }
}

/// Generalized interface for describing and building transform components.
pub trait TransformConfig: std::fmt::Debug + Send + Sync {
    /// Builds the transform with the given context.
    ///
    /// # Errors
    ///
    /// If the configuration does not validate against the context's table,
    /// an error variant explaining the issue is returned and the operator
    /// must not be deployed.
    fn build(&self, context: &TransformContext) -> crate::Result<Transform>;

    /// The schema of events produced by this transform, given the schema of
    /// the events flowing into it. Resolved before any event flows.
    fn outputs(
        &self,
        context: &TransformContext,
        input: &[FieldDescriptor],
    ) -> crate::Result<Vec<FieldDescriptor>>;
}
