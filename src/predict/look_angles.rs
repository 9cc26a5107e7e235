use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use super::error::PredictError;
use super::ground_station::GroundStation;

#[derive(Debug, Clone, Copy)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

/// Azimuth and elevation of the satellite as seen from `station` at `timestamp`.
pub fn look_angles(
    station: &GroundStation,
    elements: &Elements,
    constants: &Constants,
    timestamp: DateTime<Utc>,
) -> Result<LookAngles, PredictError> {
    let sat = satellite_ecef_km(elements, constants, timestamp)?;
    let sta = station.position_ecef_km();
    let dr = [sat[0] - sta[0], sat[1] - sta[1], sat[2] - sta[2]];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let (east, north, up) = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    let elevation_deg = if range_km > 0.0 {
        (up / range_km).asin().to_degrees()
    } else {
        0.0
    };

    Ok(LookAngles {
        azimuth_deg: east.atan2(north).to_degrees().rem_euclid(360.0),
        elevation_deg,
    })
}

/// Earth-fixed satellite position at `timestamp`, in km.
pub(crate) fn satellite_ecef_km(
    elements: &Elements,
    constants: &Constants,
    timestamp: DateTime<Utc>,
) -> Result<[f64; 3], PredictError> {
    let minutes = elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let prediction = constants
        .propagate(minutes)
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let gmst =
        sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()));

    Ok(teme_to_ecef(prediction.position, gmst))
}

fn teme_to_ecef(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_gmst, cos_gmst) = gmst.sin_cos();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zenith_vector_maps_to_up() {
        let station = GroundStation {
            latitude_deg: 45.0,
            longitude_deg: -73.0,
            altitude_m: 0.0,
        };
        let (sin_lat, cos_lat) = station.lat_rad().sin_cos();
        let (sin_lon, cos_lon) = station.lon_rad().sin_cos();
        let radial = [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat];
        let (east, north, up) = ecef_to_enu(radial, station.lat_rad(), station.lon_rad());
        assert!(east.abs() < 1e-12);
        assert!(north.abs() < 1e-12);
        assert!((up - 1.0).abs() < 1e-12);
    }

    #[test]
    fn teme_rotation_preserves_length() {
        let v = teme_to_ecef([7000.0, 100.0, 50.0], 1.234);
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        let expected = (7000.0f64 * 7000.0 + 100.0 * 100.0 + 50.0 * 50.0).sqrt();
        assert!((len - expected).abs() < 1e-9);
    }
}
