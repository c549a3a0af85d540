use crate::domain::geo;
use crate::domain::model::{CheckInRequest, NewVisit, Visit};
use crate::domain::ports::{BreweryStore, Clock, VisitStore};
use crate::utils::error::{BeerLogError, Result};
use chrono::Duration;

/// 同一使用者在同一釀酒廠兩次打卡之間的最短間隔
pub fn cooldown() -> Duration {
    Duration::hours(1)
}

/// 判斷一次打卡是否成立；成立時寫入一筆訪問紀錄。
///
/// 檢查順序固定為：釀酒廠存在 → 距離範圍 → 冷卻時間 → 寫入。
/// 任何一步失敗都不會寫入資料。本身不持有可變狀態，可被多個請求並行呼叫；
/// 同一 (使用者, 釀酒廠) 的並行寫入由 [`VisitStore::create`] 保證原子性。
pub struct CheckInPolicy<B: BreweryStore, V: VisitStore, C: Clock> {
    breweries: B,
    visits: V,
    clock: C,
}

impl<B: BreweryStore, V: VisitStore, C: Clock> CheckInPolicy<B, V, C> {
    pub fn new(breweries: B, visits: V, clock: C) -> Self {
        Self {
            breweries,
            visits,
            clock,
        }
    }

    pub fn breweries(&self) -> &B {
        &self.breweries
    }

    pub fn visits(&self) -> &V {
        &self.visits
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// 對外的打卡入口：驗證參數後交給 [`Self::attempt`]
    pub async fn check_in(
        &self,
        user_profile_id: i64,
        brewery_id: i64,
        latitude: f64,
        longitude: f64,
        max_distance_meters: f64,
    ) -> Result<Visit> {
        let request = CheckInRequest::new(user_profile_id, brewery_id, latitude, longitude)?;
        self.attempt(request, max_distance_meters).await
    }

    pub async fn attempt(&self, request: CheckInRequest, max_distance_meters: f64) -> Result<Visit> {
        if max_distance_meters.is_nan() || max_distance_meters <= 0.0 {
            return Err(BeerLogError::invalid_argument(format!(
                "max distance must be positive, got {}",
                max_distance_meters
            )));
        }

        let CheckInRequest {
            user_profile_id,
            brewery_id,
            position,
        } = request;

        // 1. 取得釀酒廠
        let brewery = self
            .breweries
            .get_by_id(brewery_id)
            .await?
            .ok_or(BeerLogError::BreweryNotFound { id: brewery_id })?;
        tracing::debug!("Brewery {} resolved: {}", brewery_id, brewery.name());

        // 2. 距離檢查，必須先於冷卻檢查
        let distance = geo::distance_meters(brewery.location(), position);
        if !geo::is_within_range(brewery.location(), position, max_distance_meters)? {
            tracing::info!(
                user_profile_id,
                brewery_id,
                distance_meters = distance,
                max_distance_meters,
                "Check-in rejected: too far from brewery"
            );
            return Err(BeerLogError::TooFarForCheckIn {
                distance_meters: distance,
                max_distance_meters,
            });
        }

        // 3. 冷卻檢查：只看最新一筆
        if let Some(last) = self
            .visits
            .get_most_recent(user_profile_id, brewery_id)
            .await?
        {
            let elapsed = self.clock.now() - last.visited_at;
            if elapsed < cooldown() {
                tracing::info!(
                    user_profile_id,
                    brewery_id,
                    elapsed_seconds = elapsed.num_seconds(),
                    "Check-in rejected: cooldown not elapsed"
                );
                return Err(BeerLogError::DuplicateCheckIn { brewery_id });
            }
        }

        // 4. 寫入，visited_at 由儲存層決定
        let visit = self
            .visits
            .create(NewVisit::new(user_profile_id, &brewery)?, cooldown())
            .await?;

        tracing::info!(
            user_profile_id,
            brewery_id,
            visit_id = visit.id,
            distance_meters = distance,
            "Check-in committed"
        );
        Ok(visit)
    }
}
