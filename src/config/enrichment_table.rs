use enum_dispatch::enum_dispatch;

use crate::enrichment_tables::Table;

/// Generalized interface for describing and building enrichment table
/// components.
#[enum_dispatch]
pub trait EnrichmentTableConfig: std::fmt::Debug + Send + Sync {
    /// Builds the enrichment table.
    ///
    /// # Errors
    ///
    /// If the table source cannot be parsed, an error variant explaining the
    /// issue is returned; configuration must fail rather than continue with
    /// a partially initialized operator.
    fn build(&self) -> crate::Result<Box<dyn Table>>;
}
