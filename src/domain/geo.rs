use crate::domain::model::Coordinate;
use crate::utils::error::{BeerLogError, Result};

/// 地球平均半徑（公尺）
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// 兩點間的大圓距離（公尺），使用半正矢（haversine）公式
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let delta_lat = (b.latitude() - a.latitude()).to_radians();
    let delta_lng = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // 浮點誤差可能讓 h 略超出 [0, 1]
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// `point` 是否位於以 `center` 為圓心、半徑 `max_distance_meters` 的範圍內（含邊界）
pub fn is_within_range(
    center: Coordinate,
    point: Coordinate,
    max_distance_meters: f64,
) -> Result<bool> {
    // 非正數半徑通常代表設定錯誤，回報給呼叫端而非默默回傳 false
    if max_distance_meters.is_nan() || max_distance_meters <= 0.0 {
        return Err(BeerLogError::invalid_argument(format!(
            "max distance must be positive, got {}",
            max_distance_meters
        )));
    }

    Ok(distance_meters(center, point) <= max_distance_meters)
}
