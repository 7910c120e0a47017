//! Addresses business logic

use crate::cache::CacheManager;
use crate::domain::Address;
use crate::error::{ApiError, Result};
use crate::policy::{permissions, PermissionSet};
use crate::repository::AddressRepository;
use std::sync::Arc;

pub const ADDRESSES_RESOURCE: &str = "addresses";

pub struct AddressesService<R: AddressRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
    permission_set: PermissionSet,
}

impl<R: AddressRepository> AddressesService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>, permission_set: PermissionSet) -> Self {
        Self {
            repo,
            cache,
            permission_set,
        }
    }

    pub async fn get_addresses(
        &self,
        offset: i64,
        limit: i64,
        person_guid: Option<String>,
    ) -> Result<(Vec<Address>, i64)> {
        self.permission_set
            .validate_any(&[permissions::VIEW_ADDRESS, permissions::UPDATE_ADDRESS])?;
        self.repo.list(offset, limit, person_guid).await
    }

    pub async fn get_address_by_guid(&self, guid: &str, bypass_cache: bool) -> Result<Address> {
        self.permission_set
            .validate_any(&[permissions::VIEW_ADDRESS, permissions::UPDATE_ADDRESS])?;

        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(address)) = cache.get_record(ADDRESSES_RESOURCE, guid).await {
                    return Ok(address);
                }
            }
        }
        let address = self.repo.find_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!("No address was found for guid '{}'.", guid))
        })?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_record(ADDRESSES_RESOURCE, guid, &address).await;
        }
        Ok(address)
    }

    pub async fn query_addresses_by_person_ids(
        &self,
        person_ids: Vec<String>,
    ) -> Result<Vec<Address>> {
        self.permission_set
            .validate_any(&[permissions::VIEW_ADDRESS, permissions::UPDATE_ADDRESS])?;
        self.repo.query_by_person_ids(&person_ids).await
    }

    pub async fn update_address(&self, address: Address) -> Result<Address> {
        self.permission_set.validate(permissions::UPDATE_ADDRESS)?;

        // Verify the record exists before writing
        if self.repo.find_by_guid(&address.id).await?.is_none() {
            return Err(ApiError::NotFound(format!(
                "No address was found for guid '{}'.",
                address.id
            )));
        }

        let updated = self.repo.update(&address).await?;
        if let Some(cache) = &self.cache {
            let _ = cache.invalidate_record(ADDRESSES_RESOURCE, &address.id).await;
        }
        Ok(updated)
    }

    pub async fn delete_address(&self, guid: &str) -> Result<()> {
        self.permission_set.validate(permissions::UPDATE_ADDRESS)?;

        self.repo.delete(guid).await?;
        if let Some(cache) = &self.cache {
            let _ = cache.invalidate_record(ADDRESSES_RESOURCE, guid).await;
        }
        Ok(())
    }
}
