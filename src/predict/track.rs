use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::catalog::TleEntry;
use super::error::PredictError;
use super::ground_station::{GroundStation, WGS84_A_KM, WGS84_E2};
use super::look_angles::{look_angles, satellite_ecef_km};
use super::types::Pass;

/// Where the antenna points at one second of a pass.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrackPoint {
    pub time: DateTime<Utc>,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeoPoint {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
}

/// Ground points for drawing a pass on a map.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapView {
    /// Sub-satellite point at AOS.
    pub aos: GeoPoint,
    /// Sub-satellite point at LOS.
    pub los: GeoPoint,
    pub station: GeoPoint,
}

/// Look angles once per second from AOS up to, not including, LOS.
pub fn pass_track(
    station: &GroundStation,
    tle: &TleEntry,
    pass: &Pass,
) -> Result<Vec<TrackPoint>, PredictError> {
    let seconds = (pass.los - pass.aos).num_seconds().max(0);
    (0..seconds)
        .map(|offset| {
            let time = pass.aos + Duration::seconds(offset);
            let angles = look_angles(station, &tle.elements, &tle.constants, time)?;
            Ok(TrackPoint {
                time,
                elevation_deg: angles.elevation_deg,
                azimuth_deg: angles.azimuth_deg,
            })
        })
        .collect()
}

pub fn map_view(
    station: &GroundStation,
    tle: &TleEntry,
    pass: &Pass,
) -> Result<MapView, PredictError> {
    Ok(MapView {
        aos: rounded(sub_satellite_point(tle, pass.aos)?),
        los: rounded(sub_satellite_point(tle, pass.los)?),
        station: GeoPoint {
            longitude_deg: station.longitude_deg,
            latitude_deg: station.latitude_deg,
        },
    })
}

pub fn sub_satellite_point(tle: &TleEntry, time: DateTime<Utc>) -> Result<GeoPoint, PredictError> {
    let ecef = satellite_ecef_km(&tle.elements, &tle.constants, time)?;
    Ok(ecef_to_geodetic(ecef))
}

fn ecef_to_geodetic([x, y, z]: [f64; 3]) -> GeoPoint {
    let p = x.hypot(y);
    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    for _ in 0..5 {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let h = p / lat.cos() - n;
        lat = z.atan2(p * (1.0 - WGS84_E2 * n / (n + h)));
    }
    GeoPoint {
        longitude_deg: y.atan2(x).to_degrees(),
        latitude_deg: lat.to_degrees(),
    }
}

fn rounded(point: GeoPoint) -> GeoPoint {
    GeoPoint {
        longitude_deg: (point.longitude_deg * 100.0).round() / 100.0,
        latitude_deg: (point.latitude_deg * 100.0).round() / 100.0,
    }
}
