//! FILENAME: app/src/view_state.rs
// PURPOSE: The dashboard's user-controlled state as one immutable value.
// CONTEXT: Every change goes through `ViewState::reduce`, which returns a new
// value. Loading a saved view is a single action, so the table, chart and map
// never observe a half-applied view.

use engine::{ColumnSpec, FilterSpec, FilterValue, Pagination, SortSpec};
use persistence::{ChartConfig, MapConfig, PaginationConfig, SavedView, SortConfig, ViewSlot};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    SetFilters(FilterSpec),
    SetColumnFilter { field: String, value: FilterValue },
    SetGlobalFilter(String),
    ClearFilters,
    SetColumns(ColumnSpec),
    /// Header click: cycles the sort on one field.
    CycleSort(String),
    SetSort(SortSpec),
    SetPage(usize),
    SetPageSize(usize),
    SetChart(ChartConfig),
    SetMap(MapConfig),
    ApplySavedView(SavedView),
    /// The slot was cleared on the backend.
    ResetView(ViewSlot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub filters: FilterSpec,
    pub columns: ColumnSpec,
    pub sort: SortSpec,
    pub pagination: Pagination,
    pub chart: ChartConfig,
    pub map: MapConfig,
    /// Slot of the saved view last applied, if any.
    pub active_view: Option<ViewSlot>,
    pub view_name: String,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            filters: FilterSpec::new(),
            columns: ColumnSpec::all(),
            sort: SortSpec::new(),
            pagination: Pagination::default(),
            chart: ChartConfig::default(),
            map: MapConfig::default(),
            active_view: None,
            view_name: String::new(),
        }
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        ViewState {
            pagination: Pagination::new(0, page_size),
            ..ViewState::default()
        }
    }

    /// Returns the state after `action`. Any filter or column change moves
    /// the table back to its first page.
    pub fn reduce(&self, action: ViewAction) -> ViewState {
        let mut next = self.clone();
        match action {
            ViewAction::SetFilters(filters) => {
                next.filters = filters;
                next.pagination.page_index = 0;
            }
            ViewAction::SetColumnFilter { field, value } => {
                next.filters.set(field, value);
                next.pagination.page_index = 0;
            }
            ViewAction::SetGlobalFilter(text) => {
                next.filters.set_global(text);
                next.pagination.page_index = 0;
            }
            ViewAction::ClearFilters => {
                next.filters.clear();
                next.pagination.page_index = 0;
            }
            ViewAction::SetColumns(columns) => {
                next.columns = columns;
                next.pagination.page_index = 0;
            }
            ViewAction::CycleSort(field) => {
                next.sort = next.sort.cycle(&field);
            }
            ViewAction::SetSort(sort) => {
                next.sort = sort;
            }
            ViewAction::SetPage(page_index) => {
                next.pagination.page_index = page_index;
            }
            ViewAction::SetPageSize(page_size) => {
                next.pagination = Pagination::new(0, page_size);
            }
            ViewAction::SetChart(chart) => {
                next.chart = chart;
            }
            ViewAction::SetMap(map) => {
                next.map = map;
            }
            ViewAction::ApplySavedView(view) => {
                next = ViewState {
                    filters: view.filters,
                    columns: view.selected_columns,
                    sort: view.sort_config.to_sort_spec(),
                    pagination: view.pagination_config.to_pagination(),
                    chart: view.chart_config,
                    map: view.map_config,
                    active_view: Some(view.slot),
                    view_name: view.name,
                };
            }
            ViewAction::ResetView(slot) => {
                if self.active_view == Some(slot) {
                    next = ViewState::with_page_size(self.pagination.page_size);
                }
            }
        }
        next
    }

    /// Captures the current state as a view for `slot`.
    ///
    /// The map's marker filter follows the column selection.
    pub fn to_saved_view(&self, slot: ViewSlot, name: &str) -> SavedView {
        let mut map = self.map.clone();
        map.marker_filter = self.columns.columns().to_vec();
        SavedView {
            slot,
            name: name.trim().to_string(),
            selected_columns: self.columns.clone(),
            filters: self.filters.clone(),
            chart_config: self.chart.clone(),
            map_config: map,
            sort_config: SortConfig::from_sort_spec(&self.sort),
            pagination_config: PaginationConfig::from_pagination(self.pagination),
            updated_at: None,
        }
    }
}
