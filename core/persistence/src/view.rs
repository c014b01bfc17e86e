//! FILENAME: core/persistence/src/view.rs
//! PURPOSE: The saved view record and its client-side validation.

use crate::config::{ChartConfig, MapConfig, PaginationConfig, SortConfig};
use crate::error::ViewError;
use crate::slot::ViewSlot;
use engine::{ColumnSpec, FilterSpec};
use serde::Serialize;

/// Everything needed to restore the dashboard: column selection, filters,
/// sort, pagination, chart and map settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedView {
    pub slot: ViewSlot,
    pub name: String,
    pub selected_columns: ColumnSpec,
    pub filters: FilterSpec,
    pub chart_config: ChartConfig,
    pub map_config: MapConfig,
    pub sort_config: SortConfig,
    pub pagination_config: PaginationConfig,
    /// Set by the backend on save.
    pub updated_at: Option<String>,
}

impl SavedView {
    /// A view with default settings for every surface.
    pub fn new(slot: ViewSlot, name: impl Into<String>, selected_columns: ColumnSpec) -> Self {
        SavedView {
            slot,
            name: name.into(),
            selected_columns,
            filters: FilterSpec::new(),
            chart_config: ChartConfig::default(),
            map_config: MapConfig::default(),
            sort_config: SortConfig::default(),
            pagination_config: PaginationConfig::default(),
            updated_at: None,
        }
    }

    /// Checks run before anything is sent to the backend.
    ///
    /// The name must not be blank, at least one column must be selected and
    /// every chart axis in use must be one of the selected columns.
    pub fn validate(&self) -> Result<(), ViewError> {
        if self.name.trim().is_empty() {
            return Err(ViewError::EmptyName);
        }
        if self.selected_columns.is_all() {
            return Err(ViewError::NoColumnsSelected);
        }
        for (axis, column) in self.chart_config.axes() {
            if !self.selected_columns.contains(column) {
                return Err(ViewError::AxisNotSelected {
                    axis,
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// One entry of the slot picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub slot: ViewSlot,
    pub name: String,
    pub column_count: usize,
    pub updated_at: Option<String>,
}

impl From<&SavedView> for ViewSummary {
    fn from(view: &SavedView) -> Self {
        ViewSummary {
            slot: view.slot,
            name: view.name.clone(),
            column_count: view.selected_columns.len(),
            updated_at: view.updated_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_engine::ChartType;

    fn view() -> SavedView {
        let slot = ViewSlot::new(1).unwrap();
        SavedView::new(slot, "Kent sites", ColumnSpec::from(&["site_name", "county"][..]))
    }

    #[test]
    fn test_valid_view() {
        let mut view = view();
        view.chart_config = ChartConfig {
            chart_type: ChartType::Pie,
            x_axis: "county".to_string(),
            y_axis: String::new(),
        };
        assert!(view.validate().is_ok());
    }

    #[test]
    fn test_rejects_blank_name_and_empty_columns() {
        let mut blank = view();
        blank.name = "  ".to_string();
        assert!(matches!(blank.validate(), Err(ViewError::EmptyName)));

        let mut empty = view();
        empty.selected_columns = ColumnSpec::all();
        assert!(matches!(empty.validate(), Err(ViewError::NoColumnsSelected)));
    }

    #[test]
    fn test_rejects_axis_outside_selection() {
        let mut view = view();
        view.chart_config.x_axis = "county".to_string();
        view.chart_config.y_axis = "generation_headroom_mw".to_string();
        match view.validate() {
            Err(ViewError::AxisNotSelected { axis, column }) => {
                assert_eq!(axis, "y");
                assert_eq!(column, "generation_headroom_mw");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
