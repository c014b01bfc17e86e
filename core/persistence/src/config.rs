//! FILENAME: core/persistence/src/config.rs
//! PURPOSE: The per-surface configuration blocks stored inside a saved view.
//! CONTEXT: These records are written by the frontend, so they use its
//! camelCase field names. Each one has a default that is substituted when the
//! stored text is absent or does not parse.

use engine::{Pagination, SortDirection, SortKey, SortSpec, DEFAULT_PAGE_SIZE};
use pivot_engine::{ChartRequest, ChartType};
use serde::{Deserialize, Serialize};

// ============================================================================
// CHART
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(rename = "type", default)]
    pub chart_type: ChartType,
    #[serde(default)]
    pub x_axis: String,
    #[serde(default)]
    pub y_axis: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            chart_type: ChartType::Bar,
            x_axis: String::new(),
            y_axis: String::new(),
        }
    }
}

impl ChartConfig {
    pub fn to_request(&self) -> ChartRequest {
        ChartRequest::new(self.chart_type, self.x_axis.clone(), self.y_axis.clone())
    }

    /// Non-empty axes as (axis name, column) pairs.
    pub fn axes(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [("x", self.x_axis.as_str()), ("y", self.y_axis.as_str())]
            .into_iter()
            .filter(|(_, column)| !column.is_empty())
    }
}

// ============================================================================
// MAP
// ============================================================================

pub const DEFAULT_LOCATION_COLUMN: &str = "Site Name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapConfig {
    pub location_column: String,
    pub show_markers: bool,
    pub marker_filter: Vec<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            location_column: DEFAULT_LOCATION_COLUMN.to_string(),
            show_markers: true,
            marker_filter: Vec::new(),
        }
    }
}

// ============================================================================
// SORT
// ============================================================================

/// One stored sort entry. Older views store bare field names that share the
/// record-wide direction; newer ones store `{id, desc}` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortColumn {
    Field(String),
    Column {
        id: String,
        #[serde(default)]
        desc: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    #[serde(default)]
    pub sort_by: Vec<SortColumn>,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl SortConfig {
    pub fn to_sort_spec(&self) -> SortSpec {
        let keys = self
            .sort_by
            .iter()
            .map(|column| match column {
                SortColumn::Field(field) => SortKey {
                    field: field.clone(),
                    direction: self.sort_direction,
                },
                SortColumn::Column { id, desc } => SortKey {
                    field: id.clone(),
                    direction: SortDirection::from_desc(*desc),
                },
            })
            .collect::<Vec<_>>();
        SortSpec::from(keys)
    }

    pub fn from_sort_spec(spec: &SortSpec) -> Self {
        SortConfig {
            sort_by: spec
                .keys()
                .iter()
                .map(|key| SortColumn::Column {
                    id: key.field.clone(),
                    desc: key.direction.is_desc(),
                })
                .collect(),
            sort_direction: spec.primary().map(|key| key.direction).unwrap_or_default(),
        }
    }
}

// ============================================================================
// PAGINATION
// ============================================================================

/// Stored pagination window. `current_page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    pub page_size: usize,
    pub current_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
        }
    }
}

impl PaginationConfig {
    pub fn to_pagination(self) -> Pagination {
        Pagination::new(self.current_page.saturating_sub(1), self.page_size)
    }

    pub fn from_pagination(pagination: Pagination) -> Self {
        PaginationConfig {
            page_size: pagination.page_size,
            current_page: pagination.page_index + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_config_accepts_both_shapes() {
        let config: SortConfig = serde_json::from_str(
            r#"{"sortBy": ["site_name", {"id": "county", "desc": true}], "sortDirection": "desc"}"#,
        )
        .unwrap();
        let spec = config.to_sort_spec();
        assert_eq!(spec.keys(), &[SortKey::desc("site_name"), SortKey::desc("county")]);

        let back = SortConfig::from_sort_spec(&SortSpec::by("county", SortDirection::Asc));
        assert_eq!(
            serde_json::to_string(&back).unwrap(),
            r#"{"sortBy":[{"id":"county","desc":false}],"sortDirection":"asc"}"#
        );
    }

    #[test]
    fn test_pagination_is_one_based() {
        let config = PaginationConfig { page_size: 25, current_page: 3 };
        assert_eq!(config.to_pagination(), Pagination::new(2, 25));
        assert_eq!(PaginationConfig::from_pagination(Pagination::new(0, 10)), PaginationConfig::default());

        let partial: PaginationConfig = serde_json::from_str(r#"{"pageSize": 50}"#).unwrap();
        assert_eq!(partial.current_page, 1);
    }

    #[test]
    fn test_stored_page_size_is_bounded() {
        let stored: PaginationConfig =
            serde_json::from_str(&format!(r#"{{"pageSize": {}, "currentPage": 1}}"#, usize::MAX)).unwrap();
        let pagination = stored.to_pagination();
        assert_eq!(pagination.page_size, engine::MAX_PAGE_SIZE);
        assert_eq!(pagination.page_count(2), 1);
    }

    #[test]
    fn test_chart_config_wire_names() {
        let config: ChartConfig =
            serde_json::from_str(r#"{"type": "pie", "xAxis": "county", "yAxis": ""}"#).unwrap();
        assert_eq!(config.chart_type, ChartType::Pie);
        assert_eq!(config.axes().collect::<Vec<_>>(), vec![("x", "county")]);
        assert_eq!(
            serde_json::to_string(&ChartConfig::default()).unwrap(),
            r#"{"type":"bar","xAxis":"","yAxis":""}"#
        );
    }
}
