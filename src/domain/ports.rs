use crate::domain::model::{Brewery, NewVisit, Visit};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// 分頁參數，建立時即套用預設值與上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            limit.min(MAX_PAGE_LIMIT)
        };
        Self {
            limit: limit as usize,
            offset: offset.max(0) as usize,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[async_trait]
pub trait BreweryStore: Send + Sync {
    /// 找不到時回傳 `Ok(None)`；`Err` 保留給儲存層本身的失敗
    async fn get_by_id(&self, id: i64) -> Result<Option<Brewery>>;

    /// 目前登錄的釀酒廠數量（健康檢查用）
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
pub trait VisitStore: Send + Sync {
    /// 該使用者在該釀酒廠最新的一筆訪問
    async fn get_most_recent(&self, user_profile_id: i64, brewery_id: i64)
        -> Result<Option<Visit>>;

    /// 寫入訪問紀錄，並由儲存層蓋上 `visited_at` 與 id。
    ///
    /// 同一 (使用者, 釀酒廠) 的「冷卻檢查 + 寫入」必須是原子的：若寫入時已有
    /// 一筆 `visited_at` 距今不足 `cooldown` 的紀錄，實作必須回傳
    /// `DuplicateCheckIn` 且不寫入任何資料。
    async fn create(&self, visit: NewVisit, cooldown: Duration) -> Result<Visit>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Visit>>;

    /// 依 `visited_at` 由新到舊排序，回傳 (該頁資料, 總筆數)
    async fn list_by_user(
        &self,
        user_profile_id: i64,
        brewery_id: Option<i64>,
        page: Page,
    ) -> Result<(Vec<Visit>, usize)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_caps() {
        assert_eq!(Page::new(0, 0), Page { limit: 20, offset: 0 });
        assert_eq!(Page::new(-5, -3), Page { limit: 20, offset: 0 });
        assert_eq!(Page::new(500, 10), Page { limit: 100, offset: 10 });
        assert_eq!(Page::new(7, 2), Page { limit: 7, offset: 2 });
    }
}
