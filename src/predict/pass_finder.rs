use chrono::{DateTime, Duration, Utc};

use super::catalog::TleEntry;
use super::error::PredictError;
use super::ground_station::GroundStation;
use super::look_angles::{look_angles, LookAngles};
use super::types::Pass;

const COARSE_STEP: Duration = Duration::seconds(60);
const FINE_STEP_SECONDS: i64 = 1;
/// How far before the window a pass already in progress is traced back.
const LOOKBACK_LIMIT: Duration = Duration::hours(24);

struct OpenPass {
    aos: DateTime<Utc>,
    aos_azimuth_deg: f64,
    max_elevation_deg: f64,
}

/// Passes of one satellite above `min_elevation` whose LOS falls inside
/// `[start, end]`.
///
/// AOS and LOS are the crossings of `min_elevation`. A pass already in
/// progress at `start` keeps its real AOS; a pass still in progress at `end`
/// is left out.
pub fn find_passes(
    station: &GroundStation,
    tle: &TleEntry,
    priority: usize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_elevation: f64,
) -> Result<Vec<Pass>, PredictError> {
    let sample = |t: DateTime<Utc>| look_angles(station, &tle.elements, &tle.constants, t);
    let mut passes = Vec::new();

    let first = sample(start)?;
    let mut open = if first.elevation_deg >= min_elevation {
        Some(trace_back_aos(&sample, start, min_elevation, first)?)
    } else {
        None
    };

    let mut cursor = start;
    loop {
        let angles = sample(cursor)?;
        let visible = angles.elevation_deg >= min_elevation;

        match open.take() {
            None if visible => {
                let (aos, aos_angles) =
                    refine(&sample, cursor - COARSE_STEP, cursor, true, min_elevation)?;
                open = Some(OpenPass {
                    aos,
                    aos_azimuth_deg: aos_angles.azimuth_deg,
                    max_elevation_deg: angles.elevation_deg,
                });
            }
            Some(mut pass) if visible => {
                pass.max_elevation_deg = pass.max_elevation_deg.max(angles.elevation_deg);
                open = Some(pass);
            }
            Some(pass) => {
                let (los, los_angles) =
                    refine(&sample, cursor - COARSE_STEP, cursor, false, min_elevation)?;
                passes.push(Pass {
                    satellite: tle.name.clone(),
                    norad_id: tle.norad_id,
                    priority,
                    aos: pass.aos,
                    los,
                    duration_seconds: (los - pass.aos).num_seconds(),
                    max_elevation_deg: round2(pass.max_elevation_deg),
                    aos_azimuth_deg: round2(pass.aos_azimuth_deg),
                    los_azimuth_deg: round2(los_angles.azimuth_deg),
                    orbit_number: orbit_number(tle, pass.aos),
                    take: true,
                });
            }
            None => {}
        }

        if cursor >= end {
            break;
        }
        cursor = (cursor + COARSE_STEP).min(end);
    }

    Ok(passes)
}

fn trace_back_aos<F>(
    sample: &F,
    start: DateTime<Utc>,
    min_elevation: f64,
    first: LookAngles,
) -> Result<OpenPass, PredictError>
where
    F: Fn(DateTime<Utc>) -> Result<LookAngles, PredictError>,
{
    let mut max_elevation_deg = first.elevation_deg;
    let mut later = start;
    while start - later < LOOKBACK_LIMIT {
        let earlier = later - COARSE_STEP;
        let angles = sample(earlier)?;
        if angles.elevation_deg < min_elevation {
            let (aos, aos_angles) = refine(sample, earlier, later, true, min_elevation)?;
            return Ok(OpenPass {
                aos,
                aos_azimuth_deg: aos_angles.azimuth_deg,
                max_elevation_deg,
            });
        }
        max_elevation_deg = max_elevation_deg.max(angles.elevation_deg);
        later = earlier;
    }

    // Never dipped below the mask within the lookback; start the pass there.
    let angles = sample(later)?;
    Ok(OpenPass {
        aos: later,
        aos_azimuth_deg: angles.azimuth_deg,
        max_elevation_deg,
    })
}

/// Bisects `[before, after]` down to the moment elevation crosses `threshold`.
fn refine<F>(
    sample: &F,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    rising: bool,
    threshold: f64,
) -> Result<(DateTime<Utc>, LookAngles), PredictError>
where
    F: Fn(DateTime<Utc>) -> Result<LookAngles, PredictError>,
{
    let mut low = before;
    let mut high = after;

    while (high - low).num_seconds() > FINE_STEP_SECONDS {
        let mid = low + (high - low) / 2;
        let above = sample(mid)?.elevation_deg >= threshold;
        if above == rising {
            high = mid;
        } else {
            low = mid;
        }
    }

    Ok((high, sample(high)?))
}

/// Revolution count at `aos`, counted from the element set's epoch.
fn orbit_number(tle: &TleEntry, aos: DateTime<Utc>) -> Option<u64> {
    let minutes = (aos.naive_utc() - tle.elements.datetime).num_seconds() as f64 / 60.0;
    let orbits = (minutes * tle.elements.mean_motion / 1440.0).floor() as i64;
    tle.elements.revolution_number.checked_add_signed(orbits)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
