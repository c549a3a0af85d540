use crate::domain::model::{BrewerySnapshot, Visit};
use crate::utils::error::BeerLogError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CHECKIN_SUCCESS_MESSAGE: &str = "Check-in successful!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreweryResponse {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&BrewerySnapshot> for BreweryResponse {
    fn from(snapshot: &BrewerySnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name.clone(),
            address: snapshot.address.clone(),
            latitude: snapshot.location.latitude(),
            longitude: snapshot.location.longitude(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitResponse {
    pub id: i64,
    pub brewery_id: i64,
    pub brewery: BreweryResponse,
    pub visited_at: DateTime<Utc>,
}

impl From<&Visit> for VisitResponse {
    fn from(visit: &Visit) -> Self {
        Self {
            id: visit.id,
            brewery_id: visit.brewery_id,
            brewery: BreweryResponse::from(&visit.brewery),
            visited_at: visit.visited_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinResponse {
    pub visit: VisitResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitsResponse {
    pub visits: Vec<VisitResponse>,
    pub total: usize,
}

/// 健康檢查結果；不包在 success 信封內，狀態由 HTTP status 表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub environment: String,
    pub checks: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

impl From<&BeerLogError> for ErrorResponse {
    fn from(err: &BeerLogError) -> Self {
        Self::new(err.error_code(), err.user_friendly_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Brewery, NewVisit};
    use chrono::TimeZone;

    #[test]
    fn test_visit_response_shape() {
        let brewery = Brewery::builder()
            .id(3)
            .name("Baird Brewing")
            .address("Shizuoka")
            .location(34.97, 138.93)
            .build()
            .unwrap();
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap();
        let visit = NewVisit::new(8, &brewery).unwrap().into_visit(11, at);

        let json = serde_json::to_value(VisitResponse::from(&visit)).unwrap();
        assert_eq!(json["id"], 11);
        assert_eq!(json["brewery_id"], 3);
        assert_eq!(json["brewery"]["name"], "Baird Brewing");
        assert_eq!(json["brewery"]["latitude"], 34.97);
        assert_eq!(json["visited_at"], "2024-07-01T09:30:00Z");
    }

    #[test]
    fn test_error_response_from_error() {
        let err = BeerLogError::DuplicateCheckIn { brewery_id: 1 };
        let response = ErrorResponse::from(&err);
        assert!(!response.success);
        assert_eq!(response.error.code, "DUPLICATE_CHECKIN");
        assert_eq!(response.error.message, "Already checked in within the last hour");
    }
}
