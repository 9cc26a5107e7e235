use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;
use utoipa::ToSchema;

use super::record::{PredictionMode, SettingsRecord};
use super::roster::{Roster, RosterFull, SatelliteEntry};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("satList key {0:?} is not a position index")]
    BadIndex(String),
    #[error(transparent)]
    RosterFull(#[from] RosterFull),
}

/// JSON shape exchanged with the backend.
///
/// The roster travels as an object keyed by stringified position
/// (`{"0": {...}, "1": {...}}`). Decoding orders entries by that key and
/// ignores the `priority` fields, which are rewritten from position on the
/// way out.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WireSettings {
    #[serde(deserialize_with = "lenient::float")]
    pub station_long: f64,
    #[serde(deserialize_with = "lenient::float")]
    pub station_lat: f64,
    pub prediction_type: PredictionMode,
    #[serde(default, with = "iso_millis")]
    pub custom_start_time: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::whole")]
    pub pred_hours: u32,
    #[serde(deserialize_with = "lenient::float")]
    pub min_elevation: f64,
    #[serde(default)]
    pub sat_list: BTreeMap<String, WireSatellite>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WireSatellite {
    #[serde(rename = "NORADid", deserialize_with = "lenient::whole")]
    pub norad_id: u32,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::whole")]
    pub priority: usize,
}

impl From<SettingsRecord> for WireSettings {
    fn from(record: SettingsRecord) -> Self {
        let sat_list = record
            .roster
            .iter()
            .map(|(priority, entry)| {
                (
                    priority.to_string(),
                    WireSatellite {
                        norad_id: entry.norad_id,
                        name: entry.name.clone(),
                        priority,
                    },
                )
            })
            .collect();

        WireSettings {
            station_long: record.station_longitude,
            station_lat: record.station_latitude,
            prediction_type: record.prediction_mode,
            custom_start_time: record.custom_start_time,
            pred_hours: record.prediction_hours,
            min_elevation: record.minimum_elevation,
            sat_list,
        }
    }
}

impl TryFrom<WireSettings> for SettingsRecord {
    type Error = WireError;

    fn try_from(wire: WireSettings) -> Result<Self, Self::Error> {
        let mut indexed = wire
            .sat_list
            .into_iter()
            .map(|(key, sat)| {
                key.trim()
                    .parse::<usize>()
                    .map(|index| (index, SatelliteEntry::new(sat.norad_id, sat.name)))
                    .map_err(|_| WireError::BadIndex(key))
            })
            .collect::<Result<Vec<_>, _>>()?;
        // BTreeMap orders keys as strings, so "10" would sort before "2".
        indexed.sort_by_key(|(index, _)| *index);
        let roster = Roster::try_from(
            indexed
                .into_iter()
                .map(|(_, entry)| entry)
                .collect::<Vec<_>>(),
        )?;

        Ok(SettingsRecord {
            station_longitude: wire.station_long,
            station_latitude: wire.station_lat,
            prediction_mode: wire.prediction_type,
            custom_start_time: wire.custom_start_time,
            prediction_hours: wire.pred_hours,
            minimum_elevation: wire.min_elevation,
            roster,
        })
    }
}

/// Numbers as browsers post them: form inputs arrive as strings, and
/// records written by older backends carry whole counts as floats (`24.0`).
/// Encoding always writes plain JSON numbers.
mod lenient {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Number(f64),
        Text(String),
    }

    pub fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Numeric::deserialize(deserializer)? {
            Numeric::Number(value) => Ok(value),
            Numeric::Text(raw) => raw
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected a number, got {raw:?}"))),
        }
    }

    pub fn whole<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u64>,
    {
        let value = float(deserializer)?;
        let out_of_range =
            || D::Error::custom(format!("expected a non-negative whole number, got {value}"));
        if value.fract() != 0.0 || !(0.0..=u64::MAX as f64).contains(&value) {
            return Err(out_of_range());
        }
        T::try_from(value as u64).map_err(|_| out_of_range())
    }
}

/// Browser-style ISO timestamps (`2024-03-01T12:00:00.000Z`).
mod iso_millis {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        match value {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_record() -> SettingsRecord {
        let mut record = SettingsRecord::default();
        record.set_station_longitude(-73.43);
        record.set_station_latitude(45.51);
        record.set_prediction_hours(24);
        record.set_minimum_elevation(5.0);
        record.set_custom_start_time(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let roster = record.roster_mut();
        roster.insert_default();
        roster.set_norad_id(0, 25544);
        roster.rename(0, "ISS (ZARYA)");
        roster.insert_default();
        roster.set_norad_id(0, 25338);
        roster.rename(0, "NOAA 15");
        record
    }

    #[test]
    fn encodes_roster_as_index_keyed_object() {
        let value = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(
            value,
            json!({
                "stationLong": -73.43,
                "stationLat": 45.51,
                "predictionType": "realtime",
                "customStartTime": "2024-03-01T12:00:00.000Z",
                "predHours": 24,
                "minElevation": 5.0,
                "satList": {
                    "0": { "NORADid": 25338, "name": "NOAA 15", "priority": 0 },
                    "1": { "NORADid": 25544, "name": "ISS (ZARYA)", "priority": 1 }
                }
            })
        );
    }

    #[test]
    fn decode_orders_numerically_and_ignores_sent_priority() {
        let mut sat_list = serde_json::Map::new();
        for i in (0..12).rev() {
            sat_list.insert(
                i.to_string(),
                json!({ "NORADid": 40000 + i, "name": format!("SAT {i}"), "priority": 99 }),
            );
        }
        let value = json!({
            "stationLong": 10.0,
            "stationLat": 20.0,
            "predictionType": "custom",
            "customStartTime": "2024-03-01T12:00:00.000Z",
            "predHours": 3,
            "minElevation": 10.0,
            "satList": sat_list
        });
        let record: SettingsRecord = serde_json::from_value(value).unwrap();
        let ids = record.roster().norad_ids();
        assert_eq!(ids, (0..12).map(|i| 40000 + i).collect::<Vec<u32>>());

        let wire = WireSettings::from(record);
        for (key, sat) in &wire.sat_list {
            assert_eq!(key.parse::<usize>().unwrap(), sat.priority);
        }
    }

    #[test]
    fn decode_accepts_null_start_time_and_missing_roster() {
        let record: SettingsRecord = serde_json::from_value(json!({
            "stationLong": 0.0,
            "stationLat": 0.0,
            "predictionType": "realtime",
            "customStartTime": null,
            "predHours": 1,
            "minElevation": 0.0
        }))
        .unwrap();
        assert!(record.roster().is_empty());
        assert_eq!(record.custom_start_time(), None);
    }

    #[test]
    fn decode_accepts_form_strings_and_float_counts() {
        let record: SettingsRecord = serde_json::from_value(json!({
            "stationLong": "12.5",
            "stationLat": " -33.9 ",
            "predictionType": "realtime",
            "customStartTime": null,
            "predHours": "6",
            "minElevation": "10",
            "satList": { "0": { "NORADid": "25544", "name": "ISS", "priority": "0" } }
        }))
        .unwrap();
        assert_eq!(record.station_longitude(), 12.5);
        assert_eq!(record.station_latitude(), -33.9);
        assert_eq!(record.prediction_hours(), 6);
        assert_eq!(record.minimum_elevation(), 10.0);
        assert_eq!(record.roster().norad_ids(), vec![25544]);

        let record: SettingsRecord = serde_json::from_value(json!({
            "stationLong": -73.43,
            "stationLat": 45.51,
            "predictionType": "realtime",
            "customStartTime": null,
            "predHours": 24.0,
            "minElevation": 5,
            "satList": { "0": { "NORADid": 25338.0, "name": "NOAA 15", "priority": 0 } }
        }))
        .unwrap();
        assert_eq!(record.prediction_hours(), 24);
        assert_eq!(record.roster().norad_ids(), vec![25338]);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["predHours"], json!(24));
        assert_eq!(value["minElevation"], json!(5.0));
    }

    #[test]
    fn decode_rejects_fractional_counts_and_junk_text() {
        let base = json!({
            "stationLong": 0.0,
            "stationLat": 0.0,
            "predictionType": "realtime",
            "predHours": 1,
            "minElevation": 0.0
        });

        let mut fractional = base.clone();
        fractional["predHours"] = json!(2.5);
        assert!(serde_json::from_value::<SettingsRecord>(fractional).is_err());

        let mut negative = base.clone();
        negative["predHours"] = json!("-1");
        assert!(serde_json::from_value::<SettingsRecord>(negative).is_err());

        let mut junk = base;
        junk["stationLong"] = json!("east");
        assert!(serde_json::from_value::<SettingsRecord>(junk).is_err());
    }

    #[test]
    fn decode_rejects_non_numeric_keys() {
        let err = serde_json::from_value::<SettingsRecord>(json!({
            "stationLong": 0.0,
            "stationLat": 0.0,
            "predictionType": "realtime",
            "predHours": 1,
            "minElevation": 0.0,
            "satList": { "first": { "NORADid": 1, "name": "x", "priority": 0 } }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("first"));
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let record = sample_record();
        let text = serde_json::to_string(&record).unwrap();
        let back: SettingsRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }
}
