//! Partial payload merge for PUT requests.
//!
//! An update body may carry any subset of the resource's properties. The
//! merge reconciles it against the stored representation: properties present
//! and non-null overwrite, absent or null properties retain the stored value,
//! and privacy-restricted property paths always retain the stored value no
//! matter what the body carried. Objects merge recursively; arrays replace
//! wholesale.

use crate::error::{ApiError, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

/// Merge an incoming partial body over the stored resource and deserialize
/// the result back into the resource type.
pub fn perform_partial_payload_merge<T>(
    partial: Value,
    original: &T,
    data_privacy: &[String],
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let original_value =
        serde_json::to_value(original).map_err(|e| ApiError::Internal(e.into()))?;
    let mut merged = original_value.clone();
    merge_value(&mut merged, partial);

    for path in data_privacy {
        let stored = value_at_path(&original_value, path).cloned();
        let attempted = value_at_path(&merged, path);
        if attempted != stored.as_ref() {
            debug!(path = path.as_str(), "restricted property change discarded");
        }
        set_at_path(&mut merged, path, stored);
    }

    serde_json::from_value(merged).map_err(|e| {
        ApiError::validation(
            "An error occurred attempting to validate data.",
            format!("The merged payload is not a valid representation: {}.", e),
        )
    })
}

fn merge_value(target: &mut Value, incoming: Value) {
    match incoming {
        Value::Null => {}
        Value::Object(incoming_map) => {
            if !target.is_object() {
                *target = Value::Object(serde_json::Map::new());
            }
            let target_map = target.as_object_mut().expect("target is an object");
            for (key, value) in incoming_map {
                if value.is_null() {
                    continue;
                }
                match target_map.get_mut(&key) {
                    Some(existing) if value.is_object() && existing.is_object() => {
                        merge_value(existing, value);
                    }
                    _ => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        other => *target = other,
    }
}

fn value_at_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Write (or remove, when `value` is None) the property at a dot path,
/// creating intermediate objects as needed.
fn set_at_path(target: &mut Value, path: &str, value: Option<Value>) {
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = target;
    for segment in &segments[..segments.len() - 1] {
        if !current.is_object() {
            return;
        }
        let map = current.as_object_mut().expect("checked above");
        if value.is_none() && !map.contains_key(*segment) {
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    let Some(map) = current.as_object_mut() else {
        return;
    };
    let last = segments[segments.len() - 1];
    match value {
        Some(value) => {
            map.insert(last.to_string(), value);
        }
        None => {
            map.remove(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, AddressCountry, AddressPlace, AddressRegion};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn stored() -> Address {
        Address {
            id: "a-1".to_string(),
            address_lines: vec!["1 Main St".to_string(), "Suite 4".to_string()],
            place: Some(AddressPlace {
                country: AddressCountry {
                    code: "USA".to_string(),
                    locality: Some("Fairfax".to_string()),
                    region: Some(AddressRegion {
                        code: Some("US-VA".to_string()),
                        title: None,
                    }),
                    postal_code: Some("22030".to_string()),
                },
            }),
            latitude: Some(38.84),
            longitude: Some(-77.3),
            geographic_areas: None,
        }
    }

    #[test]
    fn test_empty_body_returns_stored() {
        let merged: Address =
            perform_partial_payload_merge(json!({}), &stored(), &[]).unwrap();
        assert_eq!(merged, stored());
    }

    #[test]
    fn test_fully_populated_body_wins() {
        let incoming = json!({
            "id": "a-1",
            "addressLines": ["9 Elm St"],
            "place": {"country": {"code": "CAN", "locality": "Toronto",
                                  "region": {"code": "CA-ON"}, "postalCode": "M5H"}},
            "latitude": 43.65,
            "longitude": -79.38,
        });
        let merged: Address =
            perform_partial_payload_merge(incoming.clone(), &stored(), &[]).unwrap();
        let expected: Address = serde_json::from_value(incoming).unwrap();
        // region.title was absent both ways; everything else is the incoming payload
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_absent_fields_retained() {
        let incoming = json!({"addressLines": ["9 Elm St"]});
        let merged: Address = perform_partial_payload_merge(incoming, &stored(), &[]).unwrap();

        assert_eq!(merged.address_lines, vec!["9 Elm St".to_string()]);
        assert_eq!(merged.latitude, Some(38.84));
        assert_eq!(merged.place, stored().place);
    }

    #[test]
    fn test_null_fields_retained() {
        let incoming = json!({"latitude": null, "addressLines": ["9 Elm St"]});
        let merged: Address = perform_partial_payload_merge(incoming, &stored(), &[]).unwrap();
        assert_eq!(merged.latitude, Some(38.84));
    }

    #[test]
    fn test_nested_objects_merge_recursively() {
        let incoming = json!({"place": {"country": {"locality": "Reston"}}});
        let merged: Address = perform_partial_payload_merge(incoming, &stored(), &[]).unwrap();

        let country = merged.place.unwrap().country;
        assert_eq!(country.locality.as_deref(), Some("Reston"));
        // untouched siblings survive
        assert_eq!(country.code, "USA");
        assert_eq!(country.postal_code.as_deref(), Some("22030"));
    }

    #[test]
    fn test_arrays_replace_wholesale() {
        let incoming = json!({"addressLines": ["9 Elm St"]});
        let merged: Address = perform_partial_payload_merge(incoming, &stored(), &[]).unwrap();
        assert_eq!(merged.address_lines, vec!["9 Elm St".to_string()]);
    }

    #[test]
    fn test_privacy_paths_pinned() {
        let incoming = json!({
            "latitude": 0.0,
            "place": {"country": {"postalCode": "99999"}},
        });
        let privacy = vec![
            "latitude".to_string(),
            "place.country.postalCode".to_string(),
        ];
        let merged: Address =
            perform_partial_payload_merge(incoming, &stored(), &privacy).unwrap();

        assert_eq!(merged.latitude, Some(38.84));
        assert_eq!(
            merged.place.unwrap().country.postal_code.as_deref(),
            Some("22030")
        );
    }

    #[test]
    fn test_privacy_path_absent_in_stored_is_removed() {
        let incoming = json!({"geographicAreas": [{"id": "ga-1"}]});
        let privacy = vec!["geographicAreas".to_string()];
        let merged: Address =
            perform_partial_payload_merge(incoming, &stored(), &privacy).unwrap();
        assert!(merged.geographic_areas.is_none());
    }

    #[test]
    fn test_type_mismatch_is_validation_error() {
        let incoming = json!({"addressLines": "not-an-array"});
        let result: Result<Address> = perform_partial_payload_merge(incoming, &stored(), &[]);
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
