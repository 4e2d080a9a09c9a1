use dyn_clone::DynClone;

/// An exact-match lookup criterion against a reference table.
///
/// The join key is compared under plain string equality; no type coercion is
/// applied to either side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition<'a> {
    /// The table column holding the candidate values.
    pub column: &'a str,
    /// The value the column must equal.
    pub value: &'a str,
}

/// Reference tables are static data sources used to enrich the events
/// passing through the pipeline.
///
/// A table is built once at configuration time and never mutated afterwards,
/// so parallel operator instances clone it freely and read without locks.
pub trait Table: DynClone + std::fmt::Debug + Send + Sync {
    /// The ordered column names, as declared by the table source.
    fn columns(&self) -> &[String];

    /// The raw value of `column` in the first data row, the row used for
    /// type sampling. `None` when the table has no data rows or no such
    /// column.
    fn sample(&self, column: &str) -> Option<&str>;

    /// Finds the first row matching `condition`, in table order, and returns
    /// the raw values of the `select`ed columns paired with their names.
    ///
    /// Duplicate keys are not an error; rows past the first match are never
    /// consulted. Selected columns missing from the table are skipped.
    fn find_row(&self, condition: Condition<'_>, select: &[String])
        -> Option<Vec<(String, String)>>;
}

dyn_clone::clone_trait_object!(Table);
