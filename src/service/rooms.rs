//! Rooms business logic

use crate::cache::CacheManager;
use crate::domain::{Room, RoomFilter};
use crate::error::{ApiError, Result};
use crate::repository::RoomRepository;
use std::sync::Arc;

pub const ROOMS_RESOURCE: &str = "rooms";

pub struct RoomsService<R: RoomRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
}

impl<R: RoomRepository> RoomsService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>) -> Self {
        Self { repo, cache }
    }

    pub async fn get_rooms(
        &self,
        offset: i64,
        limit: i64,
        filter: RoomFilter,
    ) -> Result<(Vec<Room>, i64)> {
        self.repo.list(offset, limit, filter).await
    }

    pub async fn get_room_by_guid(&self, guid: &str, bypass_cache: bool) -> Result<Room> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(room)) = cache.get_record(ROOMS_RESOURCE, guid).await {
                    return Ok(room);
                }
            }
        }
        let room = self
            .repo
            .find_by_guid(guid)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No room was found for guid '{}'.", guid)))?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_record(ROOMS_RESOURCE, guid, &room).await;
        }
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GuidObject;
    use crate::repository::facilities::MockRoomRepository;
    use mockall::predicate::*;

    fn sample() -> Room {
        Room {
            id: "r-1".to_string(),
            title: None,
            number: "204".to_string(),
            floor: Some("2".to_string()),
            building: GuidObject::new("b-1"),
            room_types: None,
            occupancies: None,
        }
    }

    #[tokio::test]
    async fn test_get_rooms() {
        let mut mock = MockRoomRepository::new();
        mock.expect_list().returning(|_, _, _| Ok((vec![sample()], 1)));

        let service = RoomsService::new(Arc::new(mock), None);
        let (rooms, total) = service
            .get_rooms(0, 200, RoomFilter::default())
            .await
            .unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_get_room_by_guid_not_found() {
        let mut mock = MockRoomRepository::new();
        mock.expect_find_by_guid()
            .with(eq("missing"))
            .returning(|_| Ok(None));

        let service = RoomsService::new(Arc::new(mock), None);
        let result = service.get_room_by_guid("missing", false).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
