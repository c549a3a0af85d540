use crate::utils::error::{BeerLogError, Result};
use crate::utils::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_BREWERY_NAME_CHARS: usize = 255;
pub const MAX_BREWERY_ADDRESS_CHARS: usize = 512;

/// 緯度經度座標（度）
///
/// 0 視為「未設定」，因此赤道與本初子午線上的點不被接受。
/// 只能透過 [`Coordinate::new`] 建立，建立後即為有效座標。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !is_valid_latitude(latitude) || !is_valid_longitude(longitude) {
            return Err(BeerLogError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && lat != 0.0
}

fn is_valid_longitude(lng: f64) -> bool {
    (-180.0..=180.0).contains(&lng) && lng != 0.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brewery {
    id: i64,
    name: String,
    address: String,
    description: String,
    location: Coordinate,
}

impl Brewery {
    pub fn builder() -> BreweryBuilder {
        BreweryBuilder::default()
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> Coordinate {
        self.location
    }

    /// 打卡當下的釀酒廠快照
    pub fn snapshot(&self) -> BrewerySnapshot {
        BrewerySnapshot {
            id: self.id,
            name: self.name.clone(),
            address: self.address.clone(),
            location: self.location,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct BreweryBuilder {
    id: i64,
    name: String,
    address: String,
    description: String,
    latitude: f64,
    longitude: f64,
}

impl BreweryBuilder {
    pub fn id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.trim().to_string();
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = address.trim().to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.trim().to_string();
        self
    }

    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    pub fn build(self) -> Result<Brewery> {
        // 欄位錯誤對外一律視為請求參數錯誤，且不回顯欄位內容
        fn field_error(e: BeerLogError) -> BeerLogError {
            match e {
                BeerLogError::InvalidConfigValueError { field, reason, .. } => {
                    BeerLogError::invalid_argument(format!("{}: {}", field, reason))
                }
                other => other,
            }
        }

        if self.id < 0 {
            return Err(BeerLogError::invalid_argument(
                "brewery id must not be negative",
            ));
        }
        validation::validate_non_empty_string("brewery name", &self.name).map_err(field_error)?;
        validation::validate_max_length("brewery name", &self.name, MAX_BREWERY_NAME_CHARS)
            .map_err(field_error)?;
        validation::validate_max_length(
            "brewery address",
            &self.address,
            MAX_BREWERY_ADDRESS_CHARS,
        )
        .map_err(field_error)?;
        let location = Coordinate::new(self.latitude, self.longitude)?;

        Ok(Brewery {
            id: self.id,
            name: self.name,
            address: self.address,
            description: self.description,
            location,
        })
    }
}

/// 釀酒廠在打卡時的狀態，之後釀酒廠資料變更不影響歷史紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewerySnapshot {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub location: Coordinate,
}

/// 尚未寫入的訪問紀錄；`visited_at` 由儲存層蓋上
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisit {
    user_profile_id: i64,
    brewery: BrewerySnapshot,
}

impl NewVisit {
    pub fn new(user_profile_id: i64, brewery: &Brewery) -> Result<Self> {
        if user_profile_id <= 0 || brewery.id() <= 0 {
            return Err(BeerLogError::invalid_argument(
                "invalid user profile id or brewery id",
            ));
        }
        Ok(Self {
            user_profile_id,
            brewery: brewery.snapshot(),
        })
    }

    pub fn user_profile_id(&self) -> i64 {
        self.user_profile_id
    }

    pub fn brewery_id(&self) -> i64 {
        self.brewery.id
    }

    pub fn brewery(&self) -> &BrewerySnapshot {
        &self.brewery
    }

    /// 由儲存層在寫入時呼叫
    pub fn into_visit(self, id: i64, visited_at: DateTime<Utc>) -> Visit {
        Visit {
            id,
            user_profile_id: self.user_profile_id,
            brewery_id: self.brewery.id,
            brewery: self.brewery,
            visited_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub user_profile_id: i64,
    pub brewery_id: i64,
    pub brewery: BrewerySnapshot,
    pub visited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckInRequest {
    pub user_profile_id: i64,
    pub brewery_id: i64,
    pub position: Coordinate,
}

impl CheckInRequest {
    pub fn new(user_profile_id: i64, brewery_id: i64, latitude: f64, longitude: f64) -> Result<Self> {
        if user_profile_id <= 0 || brewery_id <= 0 {
            return Err(BeerLogError::invalid_argument(
                "invalid user profile id or brewery id",
            ));
        }
        Ok(Self {
            user_profile_id,
            brewery_id,
            position: Coordinate::new(latitude, longitude)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;

    fn brewery() -> Brewery {
        Brewery::builder()
            .id(7)
            .name("  Minoh Beer  ")
            .address("Osaka")
            .location(34.8361, 135.4708)
            .build()
            .unwrap()
    }

    #[test]
    fn test_coordinate_zero_is_unset() {
        assert!(Coordinate::new(0.0, 135.0).is_err());
        assert!(Coordinate::new(35.0, 0.0).is_err());
        assert!(Coordinate::new(-0.0, 135.0).is_err());
    }

    #[test]
    fn test_coordinate_range() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        let err = Coordinate::new(90.1, 135.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCoordinate);
        assert!(Coordinate::new(35.0, 180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 135.0).is_err());
    }

    #[test]
    fn test_coordinate_deserialize_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"latitude":35.0,"longitude":135.0}"#).unwrap();
        assert_eq!(ok.latitude(), 35.0);
        assert!(serde_json::from_str::<Coordinate>(r#"{"latitude":0,"longitude":135.0}"#).is_err());
    }

    #[test]
    fn test_builder_trims_and_validates() {
        let b = brewery();
        assert_eq!(b.name(), "Minoh Beer");

        let err = Brewery::builder()
            .name("   ")
            .location(35.0, 135.0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = Brewery::builder()
            .name("No Location")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCoordinate);

        let long_name = "x".repeat(MAX_BREWERY_NAME_CHARS + 1);
        let err = Brewery::builder()
            .name(&long_name)
            .location(35.0, 135.0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("brewery name"));

        // 以字元數計算，多位元組名稱剛好在上限內
        let kanji_name = "麦".repeat(MAX_BREWERY_NAME_CHARS);
        assert!(Brewery::builder()
            .name(&kanji_name)
            .location(35.0, 135.0)
            .build()
            .is_ok());

        let long_address = "x".repeat(MAX_BREWERY_ADDRESS_CHARS + 1);
        assert!(Brewery::builder()
            .name("Ok")
            .address(&long_address)
            .location(35.0, 135.0)
            .build()
            .is_err());
    }

    #[test]
    fn test_new_visit_requires_positive_ids() {
        let b = brewery();
        assert!(NewVisit::new(0, &b).is_err());

        let unsaved = Brewery::builder()
            .name("Unsaved")
            .location(35.0, 135.0)
            .build()
            .unwrap();
        assert!(NewVisit::new(1, &unsaved).is_err());

        let visit = NewVisit::new(3, &b).unwrap().into_visit(1, Utc::now());
        assert_eq!(visit.brewery_id, 7);
        assert_eq!(visit.brewery.name, "Minoh Beer");
    }

    #[test]
    fn test_check_in_request_validation() {
        assert_eq!(
            CheckInRequest::new(0, 1, 35.0, 135.0).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            CheckInRequest::new(1, -4, 35.0, 135.0).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            CheckInRequest::new(1, 1, 95.0, 135.0).unwrap_err().kind(),
            ErrorKind::InvalidCoordinate
        );
        assert!(CheckInRequest::new(1, 1, 35.0, 135.0).is_ok());
    }
}
