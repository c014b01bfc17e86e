//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the dataset engine.
//! CONTEXT: Rows, filters, projection, sorting and the table state machine.
//! Re-exports public types and modules for use by other crates.

pub mod alias;
pub mod filter;
pub mod projection;
pub mod row;
pub mod sort;
pub mod store;
pub mod table;
pub mod value;

// Re-export commonly used types at the crate root
pub use alias::AliasTable;
pub use filter::{
    apply, matching_indices, CompiledFilter, FilterSpec, FilterValue, BLANKS_TOKEN,
    GLOBAL_FILTER_KEY,
};
pub use projection::{
    has_identity, project, project_row, visible_columns, ColumnSpec, IDENTITY_FIELDS,
    LOCATION_FIELDS,
};
pub use row::Row;
pub use sort::{compare_values, sort_indices, sort_rows, SortDirection, SortKey, SortSpec};
pub use store::{distinct_values, field_names, DistinctValue, DistinctValues, RowStore};
pub use table::{
    filter_and_sort, Pagination, TableConsumer, TableSnapshot, TableState, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use value::{FieldValue, BLANK_MARKERS};
