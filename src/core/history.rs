use crate::domain::model::Visit;
use crate::domain::ports::{Page, VisitStore};
use crate::utils::error::{BeerLogError, Result};

/// 查詢使用者自己的訪問歷史
pub struct VisitHistory<V: VisitStore> {
    visits: V,
}

impl<V: VisitStore> VisitHistory<V> {
    pub fn new(visits: V) -> Self {
        Self { visits }
    }

    /// 由新到舊列出訪問紀錄，回傳 (該頁資料, 總筆數)。
    /// `brewery_id` 為 `None` 或非正數時不過濾釀酒廠。
    pub async fn list(
        &self,
        user_profile_id: i64,
        brewery_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Visit>, usize)> {
        if user_profile_id <= 0 {
            return Err(BeerLogError::invalid_argument("invalid user profile id"));
        }

        let brewery_id = brewery_id.filter(|id| *id > 0);
        let page = Page::new(limit, offset);
        tracing::debug!(
            "Listing visits for user {} (brewery {:?}, limit {}, offset {})",
            user_profile_id,
            brewery_id,
            page.limit,
            page.offset
        );

        self.visits
            .list_by_user(user_profile_id, brewery_id, page)
            .await
    }

    /// 取得單筆訪問，只能存取自己的紀錄
    pub async fn get(&self, visit_id: i64, user_profile_id: i64) -> Result<Visit> {
        if visit_id <= 0 || user_profile_id <= 0 {
            return Err(BeerLogError::invalid_argument(
                "invalid visit id or user profile id",
            ));
        }

        let visit = self
            .visits
            .get_by_id(visit_id)
            .await?
            .ok_or(BeerLogError::VisitNotFound { id: visit_id })?;

        if visit.user_profile_id != user_profile_id {
            tracing::warn!(
                "User {} attempted to read visit {} owned by another user",
                user_profile_id,
                visit_id
            );
            return Err(BeerLogError::AccessDenied);
        }

        Ok(visit)
    }
}
