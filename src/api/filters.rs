//! Query-string-bound JSON filter objects.
//!
//! Filtered list routes accept `?{name}={json}`. Malformed JSON is a 400; a
//! filter that parses but contains only empty values short-circuits the
//! request to an empty page, skipping the backend entirely.

use crate::error::{ApiError, Result};
use serde::de::DeserializeOwned;

/// Outcome of binding a named filter from the query string
#[derive(Debug, PartialEq)]
pub enum Filter<T> {
    /// The parameter was not present
    Absent,
    /// The parameter was present but carries no usable values
    Empty,
    /// A usable filter object
    Value(T),
}

impl<T> Filter<T> {
    /// True when the request asked for a filter that can match nothing
    pub fn is_empty_filter(&self) -> bool {
        matches!(self, Filter::Empty)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Filter::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Bind the named filter parameter from a raw query string.
pub fn parse_filter<T: DeserializeOwned>(
    raw_query: Option<&str>,
    name: &str,
) -> Result<Filter<T>> {
    let Some(query) = raw_query else {
        return Ok(Filter::Absent);
    };

    let Some(raw_value) = find_param(query, name) else {
        return Ok(Filter::Absent);
    };

    let decoded = urlencoding::decode(&raw_value).map_err(|_| invalid_filter(name))?;
    let value: serde_json::Value =
        serde_json::from_str(&decoded).map_err(|_| invalid_filter(name))?;

    if has_only_empty_values(&value) {
        return Ok(Filter::Empty);
    }

    let filter: T = serde_json::from_value(value).map_err(|_| invalid_filter(name))?;
    Ok(Filter::Value(filter))
}

fn invalid_filter(name: &str) -> ApiError {
    ApiError::validation(
        "Invalid filter",
        format!("The '{}' filter criteria is not valid.", name),
    )
}

fn find_param(query: &str, name: &str) -> Option<String> {
    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?;
        if key == name {
            // '+' is a space in query strings; decode before JSON parsing
            return Some(parts.next().unwrap_or("").replace('+', " "));
        }
    }
    None
}

/// True when a JSON value carries no usable filter content
fn has_only_empty_values(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(items) => items.iter().all(has_only_empty_values),
        serde_json::Value::Object(map) => map.values().all(has_only_empty_values),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AddressPersonFilter, RoomFilter};
    use serde_json::json;

    #[test]
    fn test_absent_filter() {
        let filter: Filter<RoomFilter> = parse_filter(None, "criteria").unwrap();
        assert!(matches!(filter, Filter::Absent));

        let filter: Filter<RoomFilter> =
            parse_filter(Some("offset=0&limit=10"), "criteria").unwrap();
        assert!(matches!(filter, Filter::Absent));
    }

    #[test]
    fn test_valid_filter() {
        let query = "criteria=%7B%22building%22%3A%7B%22id%22%3A%22b-1%22%7D%7D";
        let filter: Filter<RoomFilter> = parse_filter(Some(query), "criteria").unwrap();
        let Filter::Value(filter) = filter else {
            panic!("expected a filter value");
        };
        assert_eq!(filter.building.unwrap().id, "b-1");
    }

    #[test]
    fn test_empty_object_filter() {
        let filter: Filter<RoomFilter> = parse_filter(Some("criteria=%7B%7D"), "criteria").unwrap();
        assert!(filter.is_empty_filter());
    }

    #[test]
    fn test_filter_with_only_empty_values() {
        // {"personFilter":{"id":""}}
        let query = "personFilter=%7B%22personFilter%22%3A%7B%22id%22%3A%22%22%7D%7D";
        let filter: Filter<AddressPersonFilter> =
            parse_filter(Some(query), "personFilter").unwrap();
        assert!(filter.is_empty_filter());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result: Result<Filter<RoomFilter>> =
            parse_filter(Some("criteria=%7Bnot-json"), "criteria");
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_unknown_property_rejected() {
        // {"wing":"east"} is not a room filter property
        let query = "criteria=%7B%22wing%22%3A%22east%22%7D";
        let result: Result<Filter<RoomFilter>> = parse_filter(Some(query), "criteria");
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_has_only_empty_values() {
        assert!(has_only_empty_values(&json!({})));
        assert!(has_only_empty_values(&json!({"a": "", "b": null})));
        assert!(has_only_empty_values(&json!({"a": {"b": []}})));
        assert!(!has_only_empty_values(&json!({"a": "x"})));
        assert!(!has_only_empty_values(&json!({"a": 0})));
        assert!(!has_only_empty_values(&json!({"a": false})));
    }
}
