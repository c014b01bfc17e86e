//! FILENAME: core/engine/src/table.rs
//! PURPOSE: State machine behind the paged, sortable data table.
//! CONTEXT: The table owns an immutable row snapshot plus a small state record
//! (sort, filters, visibility, column order, pagination). Every read
//! recomputes filter -> sort -> paginate from the full snapshot. After each
//! filter, sort or pagination transition the registered consumers receive the
//! filtered (unpaginated) rows so the map and chart stay in step with the
//! table.

use crate::filter::{apply, matching_indices, FilterSpec, FilterValue};
use crate::projection::{visible_columns, ColumnSpec};
use crate::row::Row;
use crate::sort::{sort_indices, sort_rows, SortSpec};
use crate::store::field_names;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound on rows per page.
pub const MAX_PAGE_SIZE: usize = 1000;

// ============================================================================
// PAGINATION
// ============================================================================

/// Zero-based pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Page size is held to `1..=MAX_PAGE_SIZE`.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Pagination {
            page_index,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// `ceil(total / page_size)`; zero rows give zero pages.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.max(1))
    }

    /// Brings the page index into `[0, page_count - 1]` (0 when empty).
    pub fn clamp(self, total: usize) -> Self {
        let last = self.page_count(total).saturating_sub(1);
        Pagination {
            page_index: self.page_index.min(last),
            page_size: self.page_size.max(1),
        }
    }

    /// Row range of the current page within `total` rows.
    pub fn range(&self, total: usize) -> Range<usize> {
        let clamped = self.clamp(total);
        let start = clamped.page_index.saturating_mul(clamped.page_size).min(total);
        let end = start.saturating_add(clamped.page_size).min(total);
        start..end
    }
}

// ============================================================================
// CONSUMERS
// ============================================================================

/// What a consumer receives after a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    /// Filtered and sorted, not paginated.
    pub rows: Vec<Row>,
    pub filters: FilterSpec,
    pub sort: SortSpec,
    pub pagination: Pagination,
    pub total_rows: usize,
}

/// Receives the filtered dataset whenever the table's derivation changes.
pub trait TableConsumer {
    fn table_changed(&mut self, snapshot: &TableSnapshot);
}

impl<F> TableConsumer for F
where
    F: FnMut(&TableSnapshot),
{
    fn table_changed(&mut self, snapshot: &TableSnapshot) {
        self(snapshot)
    }
}

// ============================================================================
// TABLE STATE
// ============================================================================

pub struct TableState {
    rows: Arc<[Row]>,
    sort: SortSpec,
    filters: FilterSpec,
    columns: ColumnSpec,
    hidden: HashSet<String>,
    column_order: Vec<String>,
    pagination: Pagination,
    consumers: Vec<Box<dyn TableConsumer + Send>>,
}

impl Default for TableState {
    fn default() -> Self {
        TableState::new(Arc::from(Vec::new()))
    }
}

impl std::fmt::Debug for TableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableState")
            .field("rows", &self.rows.len())
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("columns", &self.columns)
            .field("hidden", &self.hidden)
            .field("column_order", &self.column_order)
            .field("pagination", &self.pagination)
            .field("consumers", &self.consumers.len())
            .finish()
    }
}

impl TableState {
    pub fn new(rows: Arc<[Row]>) -> Self {
        TableState {
            rows,
            sort: SortSpec::new(),
            filters: FilterSpec::new(),
            columns: ColumnSpec::all(),
            hidden: HashSet::new(),
            column_order: Vec::new(),
            pagination: Pagination::default(),
            consumers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, consumer: impl TableConsumer + Send + 'static) {
        self.consumers.push(Box::new(consumer));
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Installs a new row snapshot; the page index is re-clamped.
    pub fn set_rows(&mut self, rows: Arc<[Row]>) {
        self.rows = rows;
        self.clamp_page();
        self.emit();
    }

    /// Header click on `field`.
    pub fn set_sort(&mut self, field: &str) {
        self.sort = self.sort.cycle(field);
        self.emit();
    }

    pub fn set_sort_spec(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.emit();
    }

    /// Replaces the list constraint on `field`; an empty list removes it.
    pub fn set_column_filter(&mut self, field: &str, values: Vec<String>) {
        self.filters.set(field, FilterValue::AnyOf(values));
        self.after_filter_change();
    }

    /// Replaces the substring constraint on `field`; blank text removes it.
    pub fn set_text_filter(&mut self, field: &str, text: &str) {
        self.filters.set(field, FilterValue::Text(text.to_string()));
        self.after_filter_change();
    }

    pub fn set_global_filter(&mut self, text: &str) {
        self.filters.set_global(text);
        self.after_filter_change();
    }

    /// Installs a full FilterSpec (e.g. from the shared dashboard filters).
    pub fn set_filters(&mut self, filters: FilterSpec) {
        self.filters = filters;
        self.after_filter_change();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.after_filter_change();
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.pagination.page_index = page_index;
        self.clamp_page();
        self.emit();
    }

    /// Changes the page size (0 is coerced to 1) and returns to page 0.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.pagination = Pagination::new(0, page_size);
        self.emit();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.pagination.page_index + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.pagination.page_index.saturating_sub(1));
    }

    pub fn toggle_column_visibility(&mut self, field: &str, visible: bool) {
        if visible {
            self.hidden.remove(field);
        } else {
            self.hidden.insert(field.to_string());
        }
    }

    /// Moves `field` to position `to` of the column order.
    pub fn move_column(&mut self, field: &str, to: usize) {
        let mut order = self.visible_order();
        let Some(from) = order.iter().position(|column| column == field) else {
            return;
        };
        let column = order.remove(from);
        order.insert(to.min(order.len()), column);
        self.column_order = order;
    }

    /// Selects which fields the table derives from; an empty selection means all.
    pub fn set_columns(&mut self, columns: ColumnSpec) {
        self.columns = columns;
        self.after_filter_change();
    }

    /// Applies a whole saved state at once, with a single emission.
    pub fn restore(
        &mut self,
        filters: FilterSpec,
        sort: SortSpec,
        columns: ColumnSpec,
        pagination: Pagination,
    ) {
        self.filters = filters;
        self.sort = sort;
        self.columns = columns;
        self.pagination = Pagination::new(pagination.page_index, pagination.page_size);
        self.clamp_page();
        self.emit();
    }

    // ------------------------------------------------------------------------
    // Read model
    // ------------------------------------------------------------------------

    pub fn rows(&self) -> &Arc<[Row]> {
        &self.rows
    }

    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort
    }

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn global_filter(&self) -> &str {
        self.filters.global().unwrap_or("")
    }

    pub fn columns(&self) -> &ColumnSpec {
        &self.columns
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn is_column_visible(&self, field: &str) -> bool {
        !self.hidden.contains(field)
    }

    /// Filtered and sorted, not paginated.
    pub fn filtered_rows(&self) -> Vec<Row> {
        self.ordered_indices()
            .into_iter()
            .map(|index| self.rows[index].clone())
            .collect()
    }

    pub fn total_filtered(&self) -> usize {
        matching_indices(&self.rows, &self.filters, &self.columns).len()
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.total_filtered())
    }

    /// The rows of the current page.
    pub fn visible_rows(&self) -> Vec<Row> {
        let indices = self.ordered_indices();
        let range = self.pagination.range(indices.len());
        indices[range]
            .iter()
            .map(|&index| self.rows[index].clone())
            .collect()
    }

    /// Header list: the selected (or all) fields in the user's order, minus
    /// hidden ones.
    pub fn visible_columns(&self) -> Vec<String> {
        let all = self.available_columns();
        visible_columns(&all, &self.column_order, &self.hidden)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let rows = self.filtered_rows();
        TableSnapshot {
            total_rows: rows.len(),
            rows,
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            pagination: self.pagination,
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn available_columns(&self) -> Vec<String> {
        if self.columns.is_all() {
            field_names(&self.rows)
        } else {
            self.columns.columns().to_vec()
        }
    }

    fn visible_order(&self) -> Vec<String> {
        let all = self.available_columns();
        visible_columns(&all, &self.column_order, &HashSet::new())
    }

    fn ordered_indices(&self) -> Vec<usize> {
        let mut indices = matching_indices(&self.rows, &self.filters, &self.columns);
        sort_indices(&self.rows, &mut indices, &self.sort);
        indices
    }

    fn after_filter_change(&mut self) {
        self.pagination.page_index = 0;
        self.emit();
    }

    fn clamp_page(&mut self) {
        let total = self.total_filtered();
        self.pagination = self.pagination.clamp(total);
    }

    fn emit(&mut self) {
        if self.consumers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for consumer in self.consumers.iter_mut() {
            consumer.table_changed(&snapshot);
        }
    }
}

/// Convenience for callers holding a plain slice: filter then sort.
pub fn filter_and_sort(rows: &[Row], filters: &FilterSpec, sort: &SortSpec) -> Vec<Row> {
    let mut out = apply(rows, filters, &ColumnSpec::all());
    sort_rows(&mut out, sort);
    out
}
