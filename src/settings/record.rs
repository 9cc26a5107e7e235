use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;
use utoipa::ToSchema;

use super::roster::Roster;
use super::wire::WireSettings;

pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const PREDICTION_HOURS_RANGE: RangeInclusive<u32> = 0..=24;
pub const ELEVATION_RANGE: RangeInclusive<f64> = 0.0..=90.0;

/// Realtime windows open slightly in the past so a pass in progress is kept.
const REALTIME_LOOKBACK: Duration = Duration::seconds(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    #[default]
    Realtime,
    Custom,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("station longitude {0} outside -180..=180")]
    Longitude(f64),
    #[error("station latitude {0} outside -90..=90")]
    Latitude(f64),
    #[error("prediction hours {0} outside 0..=24")]
    PredictionHours(u32),
    #[error("minimum elevation {0} outside 0..=90")]
    MinimumElevation(f64),
    #[error("custom prediction mode requires a start time")]
    MissingCustomStart,
}

/// The whole configuration the user edits: ground station, prediction
/// window and the tracked-satellite roster.
///
/// Setters drop out-of-range input and keep the previous value; they never
/// clamp. Records decoded from the wire are not checked on the way in, call
/// [`SettingsRecord::validate`] before trusting one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireSettings", try_from = "WireSettings")]
pub struct SettingsRecord {
    pub(crate) station_longitude: f64,
    pub(crate) station_latitude: f64,
    pub(crate) prediction_mode: PredictionMode,
    pub(crate) custom_start_time: Option<DateTime<Utc>>,
    pub(crate) prediction_hours: u32,
    pub(crate) minimum_elevation: f64,
    pub(crate) roster: Roster,
}

impl SettingsRecord {
    pub fn station_longitude(&self) -> f64 {
        self.station_longitude
    }

    pub fn station_latitude(&self) -> f64 {
        self.station_latitude
    }

    pub fn prediction_mode(&self) -> PredictionMode {
        self.prediction_mode
    }

    /// Kept even in realtime mode, where consumers ignore it.
    pub fn custom_start_time(&self) -> Option<DateTime<Utc>> {
        self.custom_start_time
    }

    pub fn prediction_hours(&self) -> u32 {
        self.prediction_hours
    }

    pub fn minimum_elevation(&self) -> f64 {
        self.minimum_elevation
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    pub fn set_station_longitude(&mut self, value: f64) -> bool {
        accept(&mut self.station_longitude, value, &LONGITUDE_RANGE)
    }

    pub fn set_station_latitude(&mut self, value: f64) -> bool {
        accept(&mut self.station_latitude, value, &LATITUDE_RANGE)
    }

    pub fn set_prediction_mode(&mut self, mode: PredictionMode) {
        self.prediction_mode = mode;
    }

    pub fn set_custom_start_time(&mut self, start: DateTime<Utc>) {
        self.custom_start_time = Some(start);
    }

    pub fn set_prediction_hours(&mut self, hours: u32) -> bool {
        accept(&mut self.prediction_hours, hours, &PREDICTION_HOURS_RANGE)
    }

    pub fn set_minimum_elevation(&mut self, degrees: f64) -> bool {
        accept(&mut self.minimum_elevation, degrees, &ELEVATION_RANGE)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !LONGITUDE_RANGE.contains(&self.station_longitude) {
            return Err(ValidationError::Longitude(self.station_longitude));
        }
        if !LATITUDE_RANGE.contains(&self.station_latitude) {
            return Err(ValidationError::Latitude(self.station_latitude));
        }
        if !PREDICTION_HOURS_RANGE.contains(&self.prediction_hours) {
            return Err(ValidationError::PredictionHours(self.prediction_hours));
        }
        if !ELEVATION_RANGE.contains(&self.minimum_elevation) {
            return Err(ValidationError::MinimumElevation(self.minimum_elevation));
        }
        if self.prediction_mode == PredictionMode::Custom && self.custom_start_time.is_none() {
            return Err(ValidationError::MissingCustomStart);
        }
        Ok(())
    }

    /// Start and end of the prediction window as seen at `now`.
    pub fn prediction_window(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
        let start = match self.prediction_mode {
            PredictionMode::Realtime => now - REALTIME_LOOKBACK,
            PredictionMode::Custom => self
                .custom_start_time
                .ok_or(ValidationError::MissingCustomStart)?,
        };
        let end = start + Duration::hours(i64::from(self.prediction_hours));
        Ok((start, end))
    }
}

fn accept<T: PartialOrd + Copy>(slot: &mut T, value: T, range: &RangeInclusive<T>) -> bool {
    if range.contains(&value) {
        *slot = value;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn longitude_bounds_are_inclusive_and_not_clamped() {
        let mut record = SettingsRecord::default();
        assert!(record.set_station_longitude(-73.43));

        assert!(!record.set_station_longitude(185.0));
        assert_eq!(record.station_longitude(), -73.43);

        assert!(record.set_station_longitude(180.0));
        assert_eq!(record.station_longitude(), 180.0);

        assert!(record.set_station_longitude(-180.0));
        assert_eq!(record.station_longitude(), -180.0);

        assert!(!record.set_station_longitude(-181.0));
        assert_eq!(record.station_longitude(), -180.0);
    }

    #[test]
    fn latitude_rejects_out_of_range_and_nan() {
        let mut record = SettingsRecord::default();
        assert!(record.set_station_latitude(45.51));
        assert!(!record.set_station_latitude(90.5));
        assert!(!record.set_station_latitude(f64::NAN));
        assert_eq!(record.station_latitude(), 45.51);
        assert!(record.set_station_latitude(-90.0));
    }

    #[test]
    fn hours_and_elevation_follow_control_bounds() {
        let mut record = SettingsRecord::default();
        assert!(record.set_prediction_hours(24));
        assert!(!record.set_prediction_hours(25));
        assert_eq!(record.prediction_hours(), 24);
        assert!(record.set_minimum_elevation(90.0));
        assert!(!record.set_minimum_elevation(-1.0));
        assert_eq!(record.minimum_elevation(), 90.0);
    }

    #[test]
    fn custom_mode_needs_start_time() {
        let mut record = SettingsRecord::default();
        record.set_prediction_mode(PredictionMode::Custom);
        assert_eq!(record.validate(), Err(ValidationError::MissingCustomStart));

        record.set_custom_start_time(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn stale_start_time_survives_switch_to_realtime() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut record = SettingsRecord::default();
        record.set_prediction_mode(PredictionMode::Custom);
        record.set_custom_start_time(start);
        record.set_prediction_mode(PredictionMode::Realtime);
        assert_eq!(record.custom_start_time(), Some(start));
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn validate_flags_wire_values_outside_bounds() {
        let record = SettingsRecord {
            station_longitude: 200.0,
            ..SettingsRecord::default()
        };
        assert_eq!(record.validate(), Err(ValidationError::Longitude(200.0)));

        let record = SettingsRecord {
            prediction_hours: 48,
            ..SettingsRecord::default()
        };
        assert_eq!(record.validate(), Err(ValidationError::PredictionHours(48)));
    }

    #[test]
    fn realtime_window_starts_before_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut record = SettingsRecord::default();
        record.set_prediction_hours(6);
        let (start, end) = record.prediction_window(now).unwrap();
        assert_eq!(start, now - Duration::seconds(30));
        assert_eq!(end, start + Duration::hours(6));
    }

    #[test]
    fn custom_window_uses_start_time() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let mut record = SettingsRecord::default();
        record.set_prediction_mode(PredictionMode::Custom);
        record.set_custom_start_time(start);
        record.set_prediction_hours(2);
        assert_eq!(
            record.prediction_window(now).unwrap(),
            (start, start + Duration::hours(2))
        );
    }
}
