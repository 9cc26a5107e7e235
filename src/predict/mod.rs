mod catalog;
mod error;
mod ground_station;
mod look_angles;
mod pass_finder;
mod selection;
mod track;
mod types;

use chrono::{DateTime, Utc};

use crate::settings::SettingsRecord;

pub use catalog::{TleCatalog, TleEntry};
pub use error::PredictError;
pub use ground_station::GroundStation;
pub use pass_finder::find_passes;
pub use selection::resolve_conflicts;
pub use track::{map_view, pass_track, sub_satellite_point, GeoPoint, MapView, TrackPoint};
pub use types::{Pass, PassBoard};

#[cfg(test)]
pub(crate) use catalog::tests::ISS_TLE;

/// Predicts the pass board for `settings` as seen at `now`.
///
/// Roster satellites missing from the catalog are reported in
/// [`PassBoard::missing`]; a satellite whose propagation fails is logged and
/// skipped so the rest of the board is still served.
pub fn predict_board(
    settings: &SettingsRecord,
    catalog: &TleCatalog,
    now: DateTime<Utc>,
) -> Result<PassBoard, PredictError> {
    let (window_start, window_end) = settings.prediction_window(now)?;
    let station = GroundStation::from_settings(settings);

    let mut passes = Vec::new();
    let mut missing = Vec::new();
    for (priority, entry) in settings.roster().iter() {
        let Some(tle) = catalog.get(entry.norad_id) else {
            log::warn!("No TLE for NORAD {} ({})", entry.norad_id, entry.name);
            missing.push(entry.norad_id);
            continue;
        };
        match find_passes(
            &station,
            tle,
            priority,
            window_start,
            window_end,
            settings.minimum_elevation(),
        ) {
            Ok(found) => passes.extend(found),
            Err(e) => log::warn!("Failed to predict passes for {}: {}", tle.name, e),
        }
    }

    passes.sort_by_key(|p| p.aos);
    resolve_conflicts(&mut passes);

    Ok(PassBoard {
        window_start,
        window_end,
        passes,
        missing,
    })
}

/// The first pass that is kept after conflict resolution and has not
/// started by `now`.
pub fn next_pass(
    settings: &SettingsRecord,
    catalog: &TleCatalog,
    now: DateTime<Utc>,
) -> Result<Option<Pass>, PredictError> {
    let board = predict_board(settings, catalog, now)?;
    Ok(board
        .passes
        .into_iter()
        .find(|pass| pass.take && pass.aos > now))
}
