use crate::settings::SettingsRecord;

pub(crate) const WGS84_A_KM: f64 = 6378.137;
pub(crate) const WGS84_E2: f64 = 0.00669437999014;

/// Observer position on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl GroundStation {
    pub fn from_settings(settings: &SettingsRecord) -> Self {
        Self {
            latitude_deg: settings.station_latitude(),
            longitude_deg: settings.station_longitude(),
            altitude_m: 0.0,
        }
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let a = WGS84_A_KM;
        let e2 = WGS84_E2;
        let (sin_lat, cos_lat) = self.lat_rad().sin_cos();
        let (sin_lon, cos_lon) = self.lon_rad().sin_cos();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        [
            (n + alt_km) * cos_lat * cos_lon,
            (n + alt_km) * cos_lat * sin_lon,
            (n * (1.0 - e2) + alt_km) * sin_lat,
        ]
    }
}
