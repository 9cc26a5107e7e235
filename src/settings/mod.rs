mod action;
mod record;
mod roster;
mod wire;

pub use action::{reduce, SettingsAction};
pub use record::{PredictionMode, SettingsRecord, ValidationError};
pub use roster::{Roster, RosterFull, SatelliteEntry, MAX_SATELLITES, PLACEHOLDER_NAME};
pub use wire::{WireError, WireSatellite, WireSettings};
