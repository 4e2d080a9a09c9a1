use metrics::counter;

use super::InternalEvent;
use crate::types::ConversionError;

#[derive(Debug)]
pub struct EnrichFieldMissing<'a> {
    pub field: &'a str,
}

impl InternalEvent for EnrichFieldMissing<'_> {
    fn emit(self) {
        error!(
            message = "Event has no field at the configured match path.",
            field = %self.field,
            error_code = "enrich_field_missing",
            error_type = "condition_failed",
            stage = "processing",
        );
        counter!(
            "component_errors_total",
            "error_code" => "enrich_field_missing",
            "error_type" => "condition_failed",
            "stage" => "processing",
        )
        .increment(1);
    }
}

#[derive(Debug)]
pub struct EnrichCoercionFailed<'a> {
    pub column: &'a str,
    pub error: &'a ConversionError,
}

impl InternalEvent for EnrichCoercionFailed<'_> {
    fn emit(self) {
        error!(
            message = "Matched row value could not be coerced to its sampled kind.",
            column = %self.column,
            error = %self.error,
            error_code = "enrich_coercion_failed",
            error_type = "conversion_failed",
            stage = "processing",
        );
        counter!(
            "component_errors_total",
            "error_code" => "enrich_coercion_failed",
            "error_type" => "conversion_failed",
            "stage" => "processing",
        )
        .increment(1);
    }
}
