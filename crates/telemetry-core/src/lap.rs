//! Lap and session containers with validity derivation.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::corner::CornerAnalysis;
use crate::sample::TelemetrySample;
use crate::setup::CarSetup;

/// Minimum number of samples for a lap to be usable at all.
pub const MIN_LAP_SAMPLES: usize = 100;

/// Slip-angle margin, in degrees, beyond which a single sample counts as
/// understeering or oversteering for the lap-level percentages.
const SLIP_BALANCE_MARGIN_DEG: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    #[default]
    Practice,
    Qualifying,
    Race,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionKind::Practice => "practice",
            SessionKind::Qualifying => "qualifying",
            SessionKind::Race => "race",
        };
        write!(f, "{name}")
    }
}

/// A single completed lap with its samples and derived aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    pub lap_number: u32,
    /// Seconds, from first to last sample of the lap.
    pub lap_time: f64,
    pub valid: bool,
    pub outlap: bool,
    pub inlap: bool,

    pub max_speed: f32,
    pub avg_speed: f32,
    pub fuel_used: f32,
    pub tire_temp_front_avg: f32,
    pub tire_temp_rear_avg: f32,

    /// Share of samples, 0-100, where the front axle slips more than the
    /// rear by the balance margin.
    pub understeer_pct: f32,
    /// Share of samples, 0-100, where the rear axle slips more than the
    /// front by the balance margin.
    pub oversteer_pct: f32,
    /// Share of samples, 0-100, spinning the driven axle under throttle.
    pub traction_loss_pct: f32,
    /// Share of samples, 0-100, with a locked front wheel under braking.
    pub lockup_pct: f32,

    pub corners: Vec<CornerAnalysis>,
    pub samples: Vec<TelemetrySample>,
}

impl Lap {
    /// Build a lap from its samples, deriving validity and aggregates.
    ///
    /// Returns `None` for laps with fewer than [`MIN_LAP_SAMPLES`] samples;
    /// such fragments carry too little signal to analyze.
    pub fn from_samples(lap_number: u32, samples: Vec<TelemetrySample>) -> Option<Self> {
        if samples.len() < MIN_LAP_SAMPLES {
            return None;
        }
        let first = samples.first()?;
        let last = samples.last()?;

        let lap_time = last.timestamp - first.timestamp;
        let outlap = lap_number == 1 || first.speed < 50.0;
        let inlap = last.speed < 50.0 && last.throttle < 10.0;
        let valid = !outlap && !inlap && lap_time > 30.0;

        let n = samples.len() as f32;
        let mut max_speed = 0.0f32;
        let mut speed_sum = 0.0f32;
        let mut temp_front_sum = 0.0f32;
        let mut temp_rear_sum = 0.0f32;
        let mut understeer_count = 0usize;
        let mut oversteer_count = 0usize;
        let mut traction_loss_count = 0usize;
        let mut lockup_count = 0usize;

        for sample in &samples {
            max_speed = max_speed.max(sample.speed);
            speed_sum += sample.speed;
            temp_front_sum += sample.tire_temp.front_avg();
            temp_rear_sum += sample.tire_temp.rear_avg();

            let front_slip = sample.front_slip_angle();
            let rear_slip = sample.rear_slip_angle();
            if front_slip - rear_slip > SLIP_BALANCE_MARGIN_DEG {
                understeer_count += 1;
            } else if rear_slip - front_slip > SLIP_BALANCE_MARGIN_DEG {
                oversteer_count += 1;
            }
            if sample.throttle > 50.0 && sample.rear_slip_ratio_peak() > 0.15 {
                traction_loss_count += 1;
            }
            if sample.brake > 30.0 && sample.slip_ratio.front_min() < -0.20 {
                lockup_count += 1;
            }
        }

        let fuel_used = (first.fuel - last.fuel).max(0.0);

        Some(Self {
            lap_number,
            lap_time,
            valid,
            outlap,
            inlap,
            max_speed,
            avg_speed: speed_sum / n,
            fuel_used,
            tire_temp_front_avg: temp_front_sum / n,
            tire_temp_rear_avg: temp_rear_sum / n,
            understeer_pct: understeer_count as f32 / n * 100.0,
            oversteer_pct: oversteer_count as f32 / n * 100.0,
            traction_loss_pct: traction_loss_count as f32 / n * 100.0,
            lockup_pct: lockup_count as f32 / n * 100.0,
            corners: Vec::new(),
            samples,
        })
    }
}

/// A full session: identity, setup in force, and the laps driven on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: String,
    pub kind: SessionKind,
    pub track: String,
    pub car: String,
    pub setup: Option<CarSetup>,
    pub laps: Vec<Lap>,
}

impl SessionData {
    pub fn valid_laps(&self) -> impl Iterator<Item = &Lap> {
        self.laps.iter().filter(|lap| lap.valid)
    }

    /// Fastest valid lap, if the session has one.
    pub fn best_valid_lap(&self) -> Option<&Lap> {
        self.valid_laps()
            .min_by(|a, b| a.lap_time.total_cmp(&b.lap_time))
    }

    /// Best valid lap time in seconds.
    pub fn best_lap_time(&self) -> Option<f64> {
        self.best_valid_lap().map(|lap| lap.lap_time)
    }
}
