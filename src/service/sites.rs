//! Sites business logic

use crate::cache::CacheManager;
use crate::domain::Site;
use crate::error::{ApiError, Result};
use crate::repository::SiteRepository;
use std::sync::Arc;

pub const SITES_RESOURCE: &str = "sites";

pub struct SitesService<R: SiteRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
}

impl<R: SiteRepository> SitesService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>) -> Self {
        Self { repo, cache }
    }

    pub async fn get_sites(&self, bypass_cache: bool) -> Result<Vec<Site>> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(sites)) = cache.get_reference(SITES_RESOURCE).await {
                    return Ok(sites);
                }
            }
        }
        let sites = self.repo.list().await?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_reference(SITES_RESOURCE, &sites).await;
        }
        Ok(sites)
    }

    pub async fn get_site_by_guid(&self, guid: &str) -> Result<Site> {
        self.repo
            .find_by_guid(guid)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No site was found for guid '{}'.", guid)))
    }
}
