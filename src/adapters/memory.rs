use crate::domain::model::{Brewery, NewVisit, Visit};
use crate::domain::ports::{BreweryStore, Clock, Page, VisitStore};
use crate::utils::error::{BeerLogError, Result};
use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Clone, Default)]
pub struct InMemoryBreweryStore {
    breweries: Arc<RwLock<HashMap<i64, Brewery>>>,
}

impl InMemoryBreweryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_breweries(breweries: impl IntoIterator<Item = Brewery>) -> Self {
        let map = breweries.into_iter().map(|b| (b.id(), b)).collect();
        Self {
            breweries: Arc::new(RwLock::new(map)),
        }
    }

    /// 新增或覆蓋一筆釀酒廠資料
    pub async fn upsert(&self, brewery: Brewery) -> Result<()> {
        if brewery.id() <= 0 {
            return Err(BeerLogError::invalid_argument("brewery id must be positive"));
        }
        self.breweries.write().await.insert(brewery.id(), brewery);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.breweries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.breweries.read().await.is_empty()
    }
}

#[async_trait]
impl BreweryStore for InMemoryBreweryStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Brewery>> {
        Ok(self.breweries.read().await.get(&id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.len().await)
    }
}

struct VisitTable {
    next_id: i64,
    rows: Vec<Visit>,
}

impl VisitTable {
    fn most_recent(&self, user_profile_id: i64, brewery_id: i64) -> Option<&Visit> {
        self.rows
            .iter()
            .filter(|v| v.user_profile_id == user_profile_id && v.brewery_id == brewery_id)
            .max_by_key(|v| (v.visited_at, v.id))
    }
}

/// 以單一互斥鎖保護整張表，使冷卻檢查與寫入在同一個臨界區內完成
#[derive(Clone)]
pub struct InMemoryVisitStore {
    table: Arc<Mutex<VisitTable>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryVisitStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(Mutex::new(VisitTable {
                next_id: 1,
                rows: Vec::new(),
            })),
            clock,
        }
    }

    pub async fn count(&self, user_profile_id: i64, brewery_id: i64) -> usize {
        self.table
            .lock()
            .await
            .rows
            .iter()
            .filter(|v| v.user_profile_id == user_profile_id && v.brewery_id == brewery_id)
            .count()
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.rows.is_empty()
    }
}

#[async_trait]
impl VisitStore for InMemoryVisitStore {
    async fn get_most_recent(
        &self,
        user_profile_id: i64,
        brewery_id: i64,
    ) -> Result<Option<Visit>> {
        let table = self.table.lock().await;
        Ok(table.most_recent(user_profile_id, brewery_id).cloned())
    }

    async fn create(&self, visit: NewVisit, cooldown: Duration) -> Result<Visit> {
        let mut table = self.table.lock().await;
        let now = self.clock.now();

        if let Some(last) = table.most_recent(visit.user_profile_id(), visit.brewery_id()) {
            if now - last.visited_at < cooldown {
                tracing::debug!(
                    "Conditional insert refused for user {} at brewery {}",
                    visit.user_profile_id(),
                    visit.brewery_id()
                );
                return Err(BeerLogError::DuplicateCheckIn {
                    brewery_id: visit.brewery_id(),
                });
            }
        }

        let id = table.next_id;
        table.next_id += 1;
        let created = visit.into_visit(id, now);
        table.rows.push(created.clone());

        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Visit>> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|v| v.id == id).cloned())
    }

    async fn list_by_user(
        &self,
        user_profile_id: i64,
        brewery_id: Option<i64>,
        page: Page,
    ) -> Result<(Vec<Visit>, usize)> {
        let table = self.table.lock().await;

        let mut matched: Vec<&Visit> = table
            .rows
            .iter()
            .filter(|v| v.user_profile_id == user_profile_id)
            .filter(|v| brewery_id.map_or(true, |b| v.brewery_id == b))
            .collect();
        matched.sort_by(|a, b| (b.visited_at, b.id).cmp(&(a.visited_at, a.id)));

        let total = matched.len();
        let visits = matched
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect();

        Ok((visits, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn brewery(id: i64) -> Brewery {
        Brewery::builder()
            .id(id)
            .name(&format!("Brewery {}", id))
            .location(35.0, 135.0)
            .build()
            .unwrap()
    }

    fn setup() -> (ManualClock, InMemoryVisitStore) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let store = InMemoryVisitStore::new(Arc::new(clock.clone()));
        (clock, store)
    }

    #[tokio::test]
    async fn test_brewery_store_lookup() {
        let store = InMemoryBreweryStore::with_breweries(vec![brewery(1), brewery(2)]);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.get_by_id(2).await.unwrap().unwrap().name(), "Brewery 2");
        assert!(store.get_by_id(3).await.unwrap().is_none());

        assert!(store.upsert(brewery(0)).await.is_err());
        store.upsert(brewery(3)).await.unwrap();
        assert!(store.get_by_id(3).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_stamps_time_and_id() {
        let (clock, store) = setup();
        let b = brewery(1);

        let first = store
            .create(NewVisit::new(10, &b).unwrap(), Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.visited_at, clock.now());

        let other = store
            .create(NewVisit::new(11, &b).unwrap(), Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(other.id, 2);
    }

    #[tokio::test]
    async fn test_create_refuses_within_cooldown() {
        let (clock, store) = setup();
        let b = brewery(1);

        store
            .create(NewVisit::new(10, &b).unwrap(), Duration::hours(1))
            .await
            .unwrap();

        clock.advance(Duration::minutes(59));
        let err = store
            .create(NewVisit::new(10, &b).unwrap(), Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BeerLogError::DuplicateCheckIn { brewery_id: 1 }));
        assert_eq!(store.count(10, 1).await, 1);

        clock.advance(Duration::minutes(1));
        store
            .create(NewVisit::new(10, &b).unwrap(), Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(store.count(10, 1).await, 2);
    }

    #[tokio::test]
    async fn test_most_recent_and_listing_order() {
        let (clock, store) = setup();
        let b1 = brewery(1);
        let b2 = brewery(2);

        for b in [&b1, &b2, &b1] {
            store
                .create(NewVisit::new(10, b).unwrap(), Duration::hours(1))
                .await
                .unwrap();
            clock.advance(Duration::hours(2));
        }

        let recent = store.get_most_recent(10, 1).await.unwrap().unwrap();
        assert_eq!(recent.id, 3);
        assert!(store.get_most_recent(99, 1).await.unwrap().is_none());

        let (all, total) = store.list_by_user(10, None, Page::default()).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(all.iter().map(|v| v.id).collect::<Vec<_>>(), vec![3, 2, 1]);

        let (only_b1, total) = store
            .list_by_user(10, Some(1), Page::new(1, 1))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(only_b1.len(), 1);
        assert_eq!(only_b1[0].id, 1);
    }
}
