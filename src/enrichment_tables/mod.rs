//! Functionality to handle enrichment tables.
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::config::{EnrichmentTableConfig, GenerateConfig};

pub mod csv_file;
mod enrichment;

pub use enrichment::{Condition, Table};

/// Configuration options for an enrichment table. Currently supported are:
///
/// * Comma-separated text supplied at configuration time
///
/// A table is parsed once when the operator is configured and is immutable
/// for the life of the operator instance; lookups are exact-match only.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[enum_dispatch(EnrichmentTableConfig)]
pub enum EnrichmentTables {
    /// Exposes parsed comma-separated text as an enrichment table.
    CsvFile(csv_file::CsvTableConfig),
}

impl GenerateConfig for EnrichmentTables {
    fn generate_config() -> toml::Value {
        toml::Value::try_from(Self::CsvFile(csv_file::CsvTableConfig {
            contents: "id,name\n1,Alice\n".to_string(),
        }))
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_config() {
        let tables: EnrichmentTables =
            toml::from_str("type = \"csv_file\"\ncontents = \"id\\n1\\n\"\n").unwrap();
        let table = tables.build().unwrap();
        assert_eq!(table.columns(), &["id"]);
    }

    #[test]
    fn generate_config_is_buildable() {
        let tables: EnrichmentTables = EnrichmentTables::generate_config().try_into().unwrap();
        assert!(tables.build().is_ok());
    }
}
