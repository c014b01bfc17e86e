//! FILENAME: app/src/backend_filters.rs
// PURPOSE: Translation from the declarative FilterSpec to the backend's
// fixed filter dictionary.
// CONTEXT: The map-data endpoints only understand four keys. Whatever cannot
// be expressed through them is returned as a residual FilterSpec that the
// caller re-applies to the response rows.

use engine::{FilterSpec, FilterValue};
use serde::{Deserialize, Serialize};

/// Filters the map-data endpoints accept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendFilters {
    /// Substring match on the site name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    /// Exact voltage in kV.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_level: Option<i64>,
    /// Minimum available power (`>=`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_power: Option<f64>,
    /// Exact operator name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_operator: Option<String>,
}

impl BackendFilters {
    pub fn is_empty(&self) -> bool {
        self.site_name.is_none()
            && self.voltage_level.is_none()
            && self.available_power.is_none()
            && self.network_operator.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    pub backend: BackendFilters,
    /// Constraints the backend cannot evaluate exactly.
    pub residual: FilterSpec,
}

// ============================================================================
// TRANSLATION
// ============================================================================

fn single_value(value: &FilterValue) -> Option<&str> {
    match value {
        FilterValue::AnyOf(values) if values.len() == 1 => Some(values[0].trim()),
        _ => None,
    }
}

/// Splits `spec` into the part the backend can apply and the rest.
///
/// A single-value list on the site name is sent as a substring constraint,
/// which is looser than equality, so it also stays in the residual.
pub fn translate(spec: &FilterSpec) -> Translation {
    let mut backend = BackendFilters::default();
    let mut residual = FilterSpec::new();

    for (field, value) in spec.iter() {
        let handled = match field {
            "site_name" => match value {
                FilterValue::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        backend.site_name = Some(text.to_string());
                    }
                    true
                }
                FilterValue::AnyOf(_) => {
                    if let Some(name) = single_value(value) {
                        backend.site_name = Some(name.to_string());
                    }
                    false
                }
            },
            "site_voltage" | "voltage_level" => {
                match single_value(value).and_then(|v| v.parse::<i64>().ok()) {
                    Some(kv) => {
                        backend.voltage_level = Some(kv);
                        true
                    }
                    None => false,
                }
            }
            "licence_area" | "network_operator" => match single_value(value) {
                Some(operator) => {
                    backend.network_operator = Some(operator.to_string());
                    true
                }
                None => false,
            },
            "available_power" | "generation_capacity" => match value {
                FilterValue::Text(text) => match text.trim().parse::<f64>() {
                    Ok(min) if min.is_finite() => {
                        backend.available_power = Some(min);
                        true
                    }
                    _ => false,
                },
                FilterValue::AnyOf(_) => false,
            },
            _ => false,
        };
        if !handled {
            residual.set(field, value.clone());
        }
    }

    Translation { backend, residual }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representable_filters_move_to_backend() {
        let spec = FilterSpec::new()
            .with("site_name", FilterValue::Text(" Alpha ".to_string()))
            .with("site_voltage", FilterValue::any_of(["33"]))
            .with("licence_area", FilterValue::any_of(["UKPN"]))
            .with("available_power", FilterValue::Text("20".to_string()));
        let translation = translate(&spec);
        assert_eq!(
            translation.backend,
            BackendFilters {
                site_name: Some("Alpha".to_string()),
                voltage_level: Some(33),
                available_power: Some(20.0),
                network_operator: Some("UKPN".to_string()),
            }
        );
        assert!(translation.residual.is_empty());
    }

    #[test]
    fn test_unrepresentable_filters_stay_residual() {
        let mut spec = FilterSpec::new()
            .with("county", FilterValue::any_of(["Kent"]))
            .with("licence_area", FilterValue::any_of(["UKPN", "SSEN"]))
            .with("site_voltage", FilterValue::any_of(["HV"]));
        spec.set_global("alpha");
        let translation = translate(&spec);
        assert!(translation.backend.is_empty());
        assert_eq!(translation.residual, spec);
    }

    #[test]
    fn test_site_name_list_is_sent_and_kept() {
        let spec = FilterSpec::new().with("site_name", FilterValue::any_of(["Alpha"]));
        let translation = translate(&spec);
        assert_eq!(translation.backend.site_name.as_deref(), Some("Alpha"));
        assert_eq!(translation.residual, spec);
    }

    #[test]
    fn test_serialises_only_present_keys() {
        let filters = BackendFilters {
            available_power: Some(5.0),
            ..BackendFilters::default()
        };
        assert_eq!(serde_json::to_string(&filters).unwrap(), r#"{"available_power":5.0}"#);
    }
}
