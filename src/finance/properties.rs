//! Dashboard property definitions with defaults from dashboard.json
//!
//! dashboard.json is embedded at compile time and is the single place where
//! property defaults live. User overrides come from a flat JSON object file
//! (`{"company.name": "Intel", "hexbin.gridsize": 30}`), and every typed getter
//! falls back to the registry default when the override is invalid.

use super::error::{DashboardError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

/// dashboard.json embedded at compile time
const DASHBOARD_JSON: &str = include_str!("../../dashboard.json");

/// Property definition from dashboard.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    pub description: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    String,
    Integer,
    Enumerated,
}

/// Registry of all dashboard properties with their defaults
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a property definition document
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| DashboardError::Config(format!("invalid property JSON: {}", e)))?;

        let properties_array = doc["properties"]
            .as_array()
            .ok_or_else(|| DashboardError::Config("missing 'properties' array".to_string()))?;

        let mut properties = HashMap::new();

        for prop in properties_array {
            let name = prop["name"]
                .as_str()
                .ok_or_else(|| DashboardError::Config("property missing 'name'".to_string()))?
                .to_string();

            let kind = match prop["kind"].as_str() {
                Some("StringProperty") => PropertyKind::String,
                Some("IntegerProperty") => PropertyKind::Integer,
                Some("EnumeratedProperty") => PropertyKind::Enumerated,
                other => {
                    return Err(DashboardError::Config(format!(
                        "property '{}' has unknown kind {:?}",
                        name, other
                    )))
                }
            };

            let default_value = prop["defaultValue"].as_str().unwrap_or("").to_string();
            let description = prop["description"].as_str().unwrap_or("").to_string();

            let valid_values = if kind == PropertyKind::Enumerated {
                prop["values"].as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
            } else {
                None
            };

            properties.insert(
                name.clone(),
                PropertyDef {
                    name,
                    kind,
                    default_value,
                    description,
                    valid_values,
                },
            );
        }

        Ok(Self { properties })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// All property definitions, sorted by name
    pub fn definitions(&self) -> Vec<&PropertyDef> {
        let mut defs: Vec<&PropertyDef> = self.properties.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(DASHBOARD_JSON).unwrap_or_else(|e| {
            error!("failed to load dashboard.json: {}", e);
            PropertyRegistry::default()
        })
    })
}

/// Typed property reader
///
/// User-set values take precedence; everything else comes from dashboard.json.
#[derive(Debug, Clone, Default)]
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    /// Create from user-set values (empty strings mean "not set")
    pub fn new(values: HashMap<String, String>) -> Self {
        let user_values = values
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .collect();
        Self { user_values }
    }

    /// Load overrides from a flat JSON object file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse overrides from a flat JSON object
    pub fn from_json_str(text: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)
            .map_err(|e| DashboardError::Config(format!("invalid config JSON: {}", e)))?;

        let mut values = HashMap::new();
        for (key, value) in map {
            let value_str = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => {
                    warn!(property = %key, "ignoring non-scalar config value");
                    continue;
                }
            };
            if registry().get_property(&key).is_none() {
                warn!(property = %key, "unknown property in config file");
            }
            values.insert(key, value_str);
        }

        debug!(count = values.len(), "loaded property overrides");
        Ok(Self::new(values))
    }

    /// Get string property (user value or default)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get enumerated property with validation
    ///
    /// The returned value uses the canonical spelling from dashboard.json.
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            let canonical = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .and_then(|values| values.iter().find(|v| v.eq_ignore_ascii_case(value)));

            match canonical {
                Some(v) => return v.clone(),
                None if reg.is_valid_enum_value(name, value) => return value.clone(),
                None => {
                    let valid_values = reg
                        .get_property(name)
                        .and_then(|p| p.valid_values.as_ref())
                        .map(|v| v.join(", "))
                        .unwrap_or_default();
                    warn!(
                        "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                        value, name, valid_values, default
                    );
                }
            }
        }

        default.to_string()
    }

    /// Get integer property with range validation
    pub fn get_i64_in_range(&self, name: &str, min: i64, max: i64) -> i64 {
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(min)
            .clamp(min, max);

        let value = self.get_string(name);
        match value.trim().parse::<i64>() {
            Ok(v) if (min..=max).contains(&v) => v,
            Ok(v) => {
                warn!(
                    "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
                    v, name, min, max, default
                );
                default
            }
            Err(_) => {
                warn!(
                    "Invalid integer value '{}' for property '{}'. Using default: {}",
                    value, name, default
                );
                default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("company.name").is_some());
        assert!(reg.get_property("hexbin.gridsize").is_some());
        assert!(reg.get_property("tabs.location").is_some());
        assert_eq!(
            reg.get_property("merge.join").map(|p| p.kind.clone()),
            Some(PropertyKind::Enumerated)
        );
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("company.name"), Some("Intel"));
        assert_eq!(reg.get_default("hexbin.colormap"), Some("Reds"));
        assert_eq!(reg.get_default("merge.join"), Some("inner"));
        assert_eq!(reg.get_default("tabs.location"), Some("left"));
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("merge.join", "outer"));
        assert!(reg.is_valid_enum_value("merge.join", "INNER"));
        assert!(!reg.is_valid_enum_value("merge.join", "cross"));
        // Non-enumerated properties accept anything
        assert!(reg.is_valid_enum_value("company.name", "Acme"));
    }

    #[test]
    fn test_reader_defaults() {
        let reader = PropertyReader::default();
        assert_eq!(reader.get_string("company.name"), "Intel");
        assert_eq!(reader.get_enum("tabs.location"), "left");
        assert_eq!(reader.get_i64_in_range("histogram.bins", 1, 200), 20);
        assert_eq!(reader.get_string("no.such.property"), "");
    }

    #[test]
    fn test_reader_overrides_and_fallbacks() {
        let reader = PropertyReader::from_json_str(
            r#"{
                "company.name": "Acme",
                "hexbin.colormap": "blues",
                "tabs.location": "sideways",
                "hexbin.gridsize": 35,
                "histogram.bins": 0,
                "grid.plot.width": "wide",
                "nested": {"a": 1}
            }"#,
        )
        .unwrap();

        assert_eq!(reader.get_string("company.name"), "Acme");
        assert_eq!(reader.get_enum("hexbin.colormap"), "Blues");
        assert_eq!(reader.get_enum("tabs.location"), "left");
        assert_eq!(reader.get_i64_in_range("hexbin.gridsize", 2, 200), 35);
        assert_eq!(reader.get_i64_in_range("histogram.bins", 1, 200), 20);
        assert_eq!(reader.get_i64_in_range("grid.plot.width", 100, 4000), 400);
    }

    #[test]
    fn test_reader_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard_config.json");
        std::fs::write(&path, r#"{"merge.join": "outer"}"#).unwrap();

        let reader = PropertyReader::from_json_file(&path).unwrap();
        assert_eq!(reader.get_enum("merge.join"), "outer");

        assert!(PropertyReader::from_json_file(dir.path().join("missing.json")).is_err());
        assert!(PropertyReader::from_json_str("[1, 2]").is_err());
    }
}
