//! GeoJSON boundary collections and the join keys read from feature properties.

use crate::error::{ClimateError, Result};
use serde_json::{json, Map, Value};

/// Property holding the national ISO3 code.
pub const NATIONAL_CODE_FIELDS: [&str; 2] = ["color_code", "iso3"];

/// Alternately-named properties holding a finer administrative code.
pub const REGIONAL_CODE_FIELDS: [&str; 3] = ["iso_3166_2", "region_code", "adm1_code"];

/// Property written by the join engine.
pub const TEMPERATURE_FIELD: &str = "temperature";

/// A boundary feature collection. Treated as read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCollection {
    pub features: Vec<Value>,
}

impl BoundaryCollection {
    /// Decode a GeoJSON FeatureCollection.
    ///
    /// Markup payloads (an HTML error page served where JSON was expected)
    /// are reported as `NotJson` before any parse is attempted.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('<') {
            let head: String = trimmed.chars().take(32).collect();
            return Err(ClimateError::NotJson(head));
        }
        let value: Value = serde_json::from_str(trimmed)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(ClimateError::InvalidGeoJson("root is not an object".into()));
        };
        match root.remove("features") {
            Some(Value::Array(features)) => Ok(Self { features }),
            Some(_) => Err(ClimateError::InvalidGeoJson("`features` is not an array".into())),
            None => Err(ClimateError::InvalidGeoJson("missing `features` array".into())),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_value(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features,
        })
    }
}

fn properties(feature: &Value) -> Option<&Map<String, Value>> {
    feature.get("properties")?.as_object()
}

/// First non-empty string among `fields`.
fn first_code<'a>(feature: &'a Value, fields: &[&str]) -> Option<&'a str> {
    let props = properties(feature)?;
    fields
        .iter()
        .filter_map(|f| props.get(*f)?.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

pub fn display_name(feature: &Value) -> Option<&str> {
    properties(feature)?.get("name")?.as_str()
}

pub fn national_code(feature: &Value) -> Option<&str> {
    first_code(feature, &NATIONAL_CODE_FIELDS)
}

pub fn regional_code(feature: &Value) -> Option<&str> {
    first_code(feature, &REGIONAL_CODE_FIELDS)
}

/// Copy of `feature` with `temperature` set; the input is left untouched.
pub fn with_temperature(feature: &Value, temperature: f64) -> Value {
    let mut copy = feature.clone();
    if let Value::Object(obj) = &mut copy {
        let props = obj
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        if !props.is_object() {
            *props = Value::Object(Map::new());
        }
        if let Value::Object(props) = props {
            props.insert(TEMPERATURE_FIELD.to_string(), json!(temperature));
        }
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(props: Value) -> Value {
        json!({ "type": "Feature", "geometry": null, "properties": props })
    }

    #[test]
    fn decodes_feature_collection() {
        let text = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"name":"France","color_code":"FRA"}}]}"#;
        let coll = BoundaryCollection::from_json_str(text).unwrap();
        assert_eq!(coll.len(), 1);
        assert_eq!(display_name(&coll.features[0]), Some("France"));
        assert_eq!(national_code(&coll.features[0]), Some("FRA"));
    }

    #[test]
    fn markup_is_reported_as_not_json() {
        let err = BoundaryCollection::from_json_str("\n  <!DOCTYPE html><html>404</html>").unwrap_err();
        assert!(matches!(err, ClimateError::NotJson(_)));
    }

    #[test]
    fn missing_features_is_invalid_geojson() {
        let err = BoundaryCollection::from_json_str(r#"{"type":"FeatureCollection"}"#).unwrap_err();
        assert!(matches!(err, ClimateError::InvalidGeoJson(_)));
        let err = BoundaryCollection::from_json_str("[1,2]").unwrap_err();
        assert!(matches!(err, ClimateError::InvalidGeoJson(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = BoundaryCollection::from_json_str(r#"{"features": [ }"#).unwrap_err();
        assert!(matches!(err, ClimateError::Json(_)));
    }

    #[test]
    fn regional_code_uses_first_present_alternate() {
        let f = feature(json!({ "color_code": "USA", "region_code": "", "adm1_code": "USA-TX" }));
        assert_eq!(regional_code(&f), Some("USA-TX"));
        let f = feature(json!({ "iso3": "CAN" }));
        assert_eq!(national_code(&f), Some("CAN"));
        assert_eq!(regional_code(&f), None);
    }

    #[test]
    fn with_temperature_copies() {
        let original = feature(json!({ "name": "X" }));
        let annotated = with_temperature(&original, 12.5);
        assert_eq!(annotated["properties"]["temperature"], json!(12.5));
        assert!(original["properties"].get("temperature").is_none());

        let bare = json!({ "type": "Feature" });
        assert_eq!(with_temperature(&bare, 0.0)["properties"]["temperature"], json!(0.0));
    }
}
