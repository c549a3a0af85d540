use crate::config::toml_config::RUN_MODES;
use crate::core::checkin::CheckInPolicy;
use crate::core::history::VisitHistory;
use crate::domain::ports::{BreweryStore, Clock, VisitStore};
use crate::interfaces::dto::{
    CheckinResponse, ErrorResponse, HealthResponse, SuccessResponse, VisitResponse,
    VisitsResponse, CHECKIN_SUCCESS_MESSAGE,
};
use crate::utils::error::{BeerLogError, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const HEALTH_OK: &str = "ok";
const HEALTH_WARNING: &str = "warning";
const HEALTH_DEGRADED: &str = "degraded";

/// 進入點收到的事件；使用者身分由上游（API Gateway 授權）解析後帶入
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ApiEvent {
    CheckIn {
        user_profile_id: i64,
        brewery_id: i64,
        latitude: f64,
        longitude: f64,
    },
    ListVisits {
        user_profile_id: i64,
        brewery_id: Option<i64>,
        limit: Option<i64>,
        offset: Option<i64>,
    },
    GetVisit {
        user_profile_id: i64,
        visit_id: i64,
    },
    Health,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiReply {
    pub status_code: u16,
    pub body: serde_json::Value,
}

impl ApiReply {
    fn ok<T: Serialize>(status_code: u16, data: T) -> Self {
        match serde_json::to_value(SuccessResponse::new(data)) {
            Ok(body) => Self { status_code, body },
            Err(e) => Self::from_error(&BeerLogError::SerializationError(e)),
        }
    }

    fn malformed(e: serde_json::Error) -> Self {
        tracing::debug!("Malformed event: {}", e);
        Self::from_error(&BeerLogError::invalid_argument("Invalid request body"))
    }

    pub fn from_error(err: &BeerLogError) -> Self {
        let status_code = err.status_code();
        if err.kind() == ErrorKind::Internal {
            tracing::error!("Request failed: {}", err);
        } else {
            tracing::warn!("Request rejected ({}): {}", err.error_code(), err);
        }

        let body = serde_json::to_value(ErrorResponse::from(err)).unwrap_or_else(|_| {
            serde_json::json!({
                "success": false,
                "error": { "code": "INTERNAL_ERROR", "message": "Internal server error" }
            })
        });
        Self { status_code, body }
    }
}

pub struct ApiHandler<B: BreweryStore, V: VisitStore + Clone, C: Clock> {
    policy: CheckInPolicy<B, V, C>,
    history: VisitHistory<V>,
    checkin_radius_meters: f64,
    run_mode: String,
}

impl<B: BreweryStore, V: VisitStore + Clone, C: Clock> ApiHandler<B, V, C> {
    pub fn new(breweries: B, visits: V, clock: C, checkin_radius_meters: f64) -> Self {
        Self {
            policy: CheckInPolicy::new(breweries, visits.clone(), clock),
            history: VisitHistory::new(visits),
            checkin_radius_meters,
            run_mode: "prod".to_string(),
        }
    }

    /// 健康檢查回報的執行模式
    pub fn with_run_mode(mut self, run_mode: impl Into<String>) -> Self {
        self.run_mode = run_mode.into();
        self
    }

    /// 解析 JSON 事件並處理；格式錯誤回 400
    pub async fn handle_json(&self, raw: &str) -> ApiReply {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(payload) => self.handle_value(payload).await,
            Err(e) => ApiReply::malformed(e),
        }
    }

    /// 已解析為 JSON 但尚未確認結構的事件（Lambda 的原始 payload）
    pub async fn handle_value(&self, payload: serde_json::Value) -> ApiReply {
        match serde_json::from_value::<ApiEvent>(payload) {
            Ok(event) => self.handle(event).await,
            Err(e) => ApiReply::malformed(e),
        }
    }

    pub async fn handle(&self, event: ApiEvent) -> ApiReply {
        match self.dispatch(event).await {
            Ok(reply) => reply,
            Err(err) => ApiReply::from_error(&err),
        }
    }

    async fn dispatch(&self, event: ApiEvent) -> Result<ApiReply> {
        match event {
            ApiEvent::CheckIn {
                user_profile_id,
                brewery_id,
                latitude,
                longitude,
            } => {
                let visit = self
                    .policy
                    .check_in(
                        user_profile_id,
                        brewery_id,
                        latitude,
                        longitude,
                        self.checkin_radius_meters,
                    )
                    .await?;
                Ok(ApiReply::ok(
                    201,
                    CheckinResponse {
                        visit: VisitResponse::from(&visit),
                        message: CHECKIN_SUCCESS_MESSAGE.to_string(),
                    },
                ))
            }
            ApiEvent::ListVisits {
                user_profile_id,
                brewery_id,
                limit,
                offset,
            } => {
                let (visits, total) = self
                    .history
                    .list(
                        user_profile_id,
                        brewery_id,
                        limit.unwrap_or(0),
                        offset.unwrap_or(0),
                    )
                    .await?;
                Ok(ApiReply::ok(
                    200,
                    VisitsResponse {
                        visits: visits.iter().map(VisitResponse::from).collect(),
                        total,
                    },
                ))
            }
            ApiEvent::GetVisit {
                user_profile_id,
                visit_id,
            } => {
                let visit = self.history.get(visit_id, user_profile_id).await?;
                Ok(ApiReply::ok(200, VisitResponse::from(&visit)))
            }
            ApiEvent::Health => self.health().await,
        }
    }

    /// 儲存層失敗為 degraded（503）；設定可疑為 warning（仍回 200）
    async fn health(&self) -> Result<ApiReply> {
        let mut status = HEALTH_OK;
        let mut checks = BTreeMap::new();

        let breweries = match self.policy.breweries().count().await {
            Ok(0) => {
                tracing::warn!("Health check: no breweries registered");
                "empty"
            }
            Ok(_) => HEALTH_OK,
            Err(e) => {
                tracing::error!("Health check: brewery store failed: {}", e);
                "error"
            }
        };
        if breweries == "error" {
            status = HEALTH_DEGRADED;
        } else if breweries != HEALTH_OK {
            status = HEALTH_WARNING;
        }
        checks.insert("breweries".to_string(), breweries.to_string());

        let run_mode = if RUN_MODES.contains(&self.run_mode.as_str()) {
            HEALTH_OK
        } else {
            tracing::warn!("Health check: unknown run mode '{}'", self.run_mode);
            HEALTH_WARNING
        };
        if run_mode != HEALTH_OK && status == HEALTH_OK {
            status = HEALTH_WARNING;
        }
        checks.insert("run_mode".to_string(), run_mode.to_string());

        let response = HealthResponse {
            status: status.to_string(),
            timestamp: self.policy.clock().now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: self.run_mode.clone(),
            checks,
        };
        let status_code = if status == HEALTH_DEGRADED { 503 } else { 200 };

        Ok(ApiReply {
            status_code,
            body: serde_json::to_value(response)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryBreweryStore, InMemoryVisitStore, ManualClock};
    use crate::domain::model::Brewery;
    use chrono::Utc;
    use std::sync::Arc;

    fn handler() -> ApiHandler<InMemoryBreweryStore, InMemoryVisitStore, ManualClock> {
        let clock = ManualClock::new(Utc::now());
        let brewery = Brewery::builder()
            .id(1)
            .name("Kyoto Brewing")
            .location(35.0, 135.0)
            .build()
            .unwrap();
        ApiHandler::new(
            InMemoryBreweryStore::with_breweries(vec![brewery]),
            InMemoryVisitStore::new(Arc::new(clock.clone())),
            clock,
            100.0,
        )
    }

    #[tokio::test]
    async fn test_check_in_event() {
        let handler = handler();
        let reply = handler
            .handle_json(
                r#"{"action":"check_in","user_profile_id":1,"brewery_id":1,"latitude":35.0,"longitude":135.0}"#,
            )
            .await;

        assert_eq!(reply.status_code, 201);
        assert_eq!(reply.body["success"], true);
        assert_eq!(reply.body["data"]["message"], "Check-in successful!");
        assert_eq!(reply.body["data"]["visit"]["brewery"]["name"], "Kyoto Brewing");
    }

    #[tokio::test]
    async fn test_error_status_mapping() {
        let handler = handler();

        let not_found = handler
            .handle(ApiEvent::CheckIn {
                user_profile_id: 1,
                brewery_id: 9,
                latitude: 35.0,
                longitude: 135.0,
            })
            .await;
        assert_eq!(not_found.status_code, 404);
        assert_eq!(not_found.body["error"]["code"], "BREWERY_NOT_FOUND");

        let too_far = handler
            .handle(ApiEvent::CheckIn {
                user_profile_id: 1,
                brewery_id: 1,
                latitude: 35.1,
                longitude: 135.0,
            })
            .await;
        assert_eq!(too_far.status_code, 400);
        assert_eq!(too_far.body["error"]["code"], "LOCATION_TOO_FAR");

        let malformed = handler.handle_json(r#"{"action":"check_in"}"#).await;
        assert_eq!(malformed.status_code, 400);
        assert_eq!(malformed.body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_handle_value_rejects_wrong_shape() {
        let handler = handler();

        let reply = handler
            .handle_value(serde_json::json!({ "action": "check_in", "brewery_id": "one" }))
            .await;
        assert_eq!(reply.status_code, 400);
        assert_eq!(reply.body["error"]["code"], "INVALID_REQUEST");

        let reply = handler.handle_value(serde_json::json!([1, 2, 3])).await;
        assert_eq!(reply.status_code, 400);

        let reply = handler.handle_json("not json").await;
        assert_eq!(reply.status_code, 400);
        assert_eq!(reply.body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_health_reports_store_failure_as_degraded() {
        struct DownStore;

        #[async_trait::async_trait]
        impl BreweryStore for DownStore {
            async fn get_by_id(&self, _id: i64) -> Result<Option<Brewery>> {
                Err(BeerLogError::StoreError {
                    message: "timeout".to_string(),
                })
            }

            async fn count(&self) -> Result<usize> {
                Err(BeerLogError::StoreError {
                    message: "timeout".to_string(),
                })
            }
        }

        let clock = ManualClock::new(Utc::now());
        let handler = ApiHandler::new(
            DownStore,
            InMemoryVisitStore::new(Arc::new(clock.clone())),
            clock,
            100.0,
        );

        let reply = handler.handle(ApiEvent::Health).await;
        assert_eq!(reply.status_code, 503);
        assert_eq!(reply.body["status"], "degraded");
        assert_eq!(reply.body["checks"]["breweries"], "error");
        assert!(reply.body.get("success").is_none());
    }

    #[tokio::test]
    async fn test_history_events() {
        let handler = handler();
        handler
            .handle(ApiEvent::CheckIn {
                user_profile_id: 1,
                brewery_id: 1,
                latitude: 35.0,
                longitude: 135.0,
            })
            .await;

        let list = handler
            .handle_json(r#"{"action":"list_visits","user_profile_id":1}"#)
            .await;
        assert_eq!(list.status_code, 200);
        assert_eq!(list.body["data"]["total"], 1);

        let own = handler
            .handle(ApiEvent::GetVisit {
                user_profile_id: 1,
                visit_id: 1,
            })
            .await;
        assert_eq!(own.status_code, 200);
        assert_eq!(own.body["data"]["id"], 1);

        let other = handler
            .handle(ApiEvent::GetVisit {
                user_profile_id: 2,
                visit_id: 1,
            })
            .await;
        assert_eq!(other.status_code, 403);
        assert_eq!(other.body["error"]["code"], "FORBIDDEN");
    }
}
