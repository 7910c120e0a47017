//! Permission codes and the granted-set check services run before touching
//! person-related data.
//!
//! Reference data (countries, rooms, sites, settings) is open to any
//! authenticated integration caller; person data (addresses, visas,
//! relationships, organizations) requires an explicit grant.

use crate::error::{ApiError, Result};

/// Permission codes for the Base domain
pub mod permissions {
    pub const VIEW_ADDRESS: &str = "VIEW.ADDRESS";
    pub const UPDATE_ADDRESS: &str = "UPDATE.ADDRESS";
    pub const VIEW_ORGANIZATION: &str = "VIEW.ORGANIZATION";
    pub const UPDATE_ORGANIZATION: &str = "UPDATE.ORGANIZATION";
    pub const VIEW_PERSON_VISA: &str = "VIEW.PERSON.VISA";
    pub const UPDATE_PERSON_VISA: &str = "UPDATE.PERSON.VISA";
    pub const VIEW_RELATIONSHIP: &str = "VIEW.RELATIONSHIP";
    pub const UPDATE_RELATIONSHIP: &str = "UPDATE.RELATIONSHIP";
    pub const UPDATE_SETTINGS: &str = "UPDATE.SETTINGS";
}

/// The set of permission codes granted to the integration caller
#[derive(Debug, Clone)]
pub struct PermissionSet {
    granted: Vec<String>,
}

impl PermissionSet {
    pub fn new(granted: Vec<String>) -> Self {
        Self { granted }
    }

    /// A set granting every permission
    pub fn allow_all() -> Self {
        Self {
            granted: vec!["*".to_string()],
        }
    }

    fn has(&self, code: &str) -> bool {
        self.granted.iter().any(|g| g == "*" || g == code)
    }

    /// Succeeds when any one of the listed codes is granted
    pub fn validate_any(&self, required: &[&str]) -> Result<()> {
        if required.iter().any(|code| self.has(code)) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "The caller does not have any of the required permissions: {}.",
                required.join(", ")
            )))
        }
    }

    /// Succeeds only when the single listed code is granted
    pub fn validate(&self, required: &str) -> Result<()> {
        self.validate_any(&[required])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all_grants_everything() {
        let set = PermissionSet::allow_all();
        assert!(set.validate(permissions::VIEW_ADDRESS).is_ok());
        assert!(set.validate(permissions::UPDATE_PERSON_VISA).is_ok());
    }

    #[test]
    fn test_explicit_grant() {
        let set = PermissionSet::new(vec![permissions::VIEW_ADDRESS.to_string()]);
        assert!(set.validate(permissions::VIEW_ADDRESS).is_ok());
        assert!(matches!(
            set.validate(permissions::UPDATE_ADDRESS),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_validate_any() {
        let set = PermissionSet::new(vec![permissions::UPDATE_ADDRESS.to_string()]);
        assert!(set
            .validate_any(&[permissions::VIEW_ADDRESS, permissions::UPDATE_ADDRESS])
            .is_ok());
        assert!(set
            .validate_any(&[permissions::VIEW_PERSON_VISA])
            .is_err());
    }

    #[test]
    fn test_empty_set_denies() {
        let set = PermissionSet::new(vec![]);
        assert!(set.validate(permissions::VIEW_ADDRESS).is_err());
    }
}
