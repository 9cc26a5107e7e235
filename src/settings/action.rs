use chrono::{DateTime, Utc};

use super::record::{PredictionMode, SettingsRecord};

/// One user edit to the settings record.
///
/// Roster variants mirror what the drag-and-drop table emits: move a row,
/// delete a row, or edit a row's NORAD id or name.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    SetStationLongitude(f64),
    SetStationLatitude(f64),
    SetPredictionMode(PredictionMode),
    SetCustomStartTime(DateTime<Utc>),
    SetPredictionHours(u32),
    SetMinimumElevation(f64),
    InsertSatellite,
    RemoveSatellite { index: usize },
    MoveSatellite { from: usize, to: usize },
    SetNoradId { index: usize, norad_id: u32 },
    RenameSatellite { index: usize, name: String },
}

/// Applies `action` and hands back the updated record.
///
/// Rejected edits (out-of-range numbers, a full roster, a stale row index)
/// return the record untouched.
pub fn reduce(mut record: SettingsRecord, action: SettingsAction) -> SettingsRecord {
    let applied = match action {
        SettingsAction::SetStationLongitude(v) => record.set_station_longitude(v),
        SettingsAction::SetStationLatitude(v) => record.set_station_latitude(v),
        SettingsAction::SetPredictionMode(mode) => {
            record.set_prediction_mode(mode);
            true
        }
        SettingsAction::SetCustomStartTime(start) => {
            record.set_custom_start_time(start);
            true
        }
        SettingsAction::SetPredictionHours(hours) => record.set_prediction_hours(hours),
        SettingsAction::SetMinimumElevation(degrees) => record.set_minimum_elevation(degrees),
        SettingsAction::InsertSatellite => record.roster_mut().insert_default(),
        SettingsAction::RemoveSatellite { index } => record.roster_mut().remove_at(index).is_some(),
        SettingsAction::MoveSatellite { from, to } => record.roster_mut().reorder(from, to),
        SettingsAction::SetNoradId { index, norad_id } => {
            record.roster_mut().set_norad_id(index, norad_id)
        }
        SettingsAction::RenameSatellite { index, name } => record.roster_mut().rename(index, name),
    };
    if !applied {
        log::debug!("settings edit ignored");
    }
    record
}
