use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A predicted pass of one roster satellite over the station.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pass {
    pub satellite: String,
    pub norad_id: u32,
    /// Roster position of the satellite; lower wins conflicts.
    pub priority: usize,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub duration_seconds: i64,
    pub max_elevation_deg: f64,
    pub aos_azimuth_deg: f64,
    pub los_azimuth_deg: f64,
    pub orbit_number: Option<u64>,
    /// Whether the pass survives conflict resolution and should be tracked.
    pub take: bool,
}

/// Payload of `/api/passData`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PassBoard {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub passes: Vec<Pass>,
    /// NORAD ids in the roster with no elements in the TLE catalog.
    pub missing: Vec<u32>,
}
