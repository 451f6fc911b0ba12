//! Streaming session analyzer.
//!
//! Ingests telemetry one sample at a time, closes laps when the lap counter
//! changes and keeps a bounded history of per-lap results. Buffers are
//! fixed-capacity ring buffers; a stint of any length runs in constant
//! memory.

use std::collections::VecDeque;

use paddock_telemetry_core::{
    DrivePhase, ProblemMap, TelemetrySample, VehicleClass, WheelSet,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalysisError;
use crate::problems::{
    coarse_phases, detect_problems, lockup_ratio, phase_behavior, stability_score,
    wheelspin_ratio, PhaseBehavior,
};

/// Tuning knobs for the streaming analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Ring buffer capacity for raw samples.
    pub sample_capacity: usize,
    /// Number of lap analyses retained, oldest evicted first.
    pub lap_history: usize,
    /// Full steering lock used to normalize steering angles.
    pub steering_lock_deg: f32,
    /// Laps with this many samples or fewer are discarded at lap close.
    pub min_lap_samples: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_capacity: 5000,
            lap_history: 20,
            steering_lock_deg: 450.0,
            min_lap_samples: 100,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.sample_capacity == 0 {
            return Err(AnalysisError::ZeroSampleCapacity);
        }
        if self.lap_history == 0 {
            return Err(AnalysisError::ZeroLapHistory);
        }
        if !(self.steering_lock_deg > 0.0) {
            return Err(AnalysisError::InvalidSteeringLock(self.steering_lock_deg));
        }
        Ok(())
    }
}

/// Everything the analyzer derives from one completed lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapInsight {
    pub lap_number: u32,
    pub sample_count: usize,
    /// Balance ratios for Entry, Mid and Exit.
    pub behavior: [(DrivePhase, PhaseBehavior); 3],
    pub problems: ProblemMap,

    pub tire_temps_avg: WheelSet<f32>,
    pub tire_temps_max: WheelSet<f32>,
    pub tire_pressure_avg: WheelSet<f32>,
    pub tire_wear_start: WheelSet<f32>,
    pub tire_wear_end: WheelSet<f32>,
    /// Inner minus outer tread temperature, per wheel, from the last sample.
    pub tire_balance: WheelSet<f32>,
    pub brake_temps_max: WheelSet<f32>,

    pub avg_rake: f32,
    pub max_roll_front: f32,
    pub max_roll_rear: f32,
    pub bottoming_events: usize,

    pub wheelspin_pct: f32,
    pub lockup_pct: f32,
    pub avg_rear_slip: f32,
    pub stability_score: f32,
}

/// Immutable snapshot for presentation, taken from the most recent lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub lap_number: u32,
    pub sample_count: usize,
    pub vehicle_class: VehicleClass,
    pub problems: ProblemMap,
    /// Mean of the three phase understeer ratios, as a percentage.
    pub understeer_pct: f32,
    pub oversteer_pct: f32,
    pub traction_loss_pct: f32,
    pub tire_temps_avg: WheelSet<f32>,
    pub tire_temps_max: WheelSet<f32>,
    pub tire_pressure_avg: WheelSet<f32>,
    pub tire_wear_pct: WheelSet<f32>,
    pub brake_temps_max: WheelSet<f32>,
    pub stability_score: f32,
    pub wheelspin_pct: f32,
    pub lockup_pct: f32,
    pub avg_rake: f32,
    pub bottoming_events: usize,
    pub behavior: [(DrivePhase, PhaseBehavior); 3],
}

/// Live telemetry analyzer with bounded memory.
#[derive(Debug)]
pub struct SessionAnalyzer {
    config: AnalyzerConfig,
    samples: VecDeque<TelemetrySample>,
    current_lap_samples: Vec<TelemetrySample>,
    current_lap: u32,
    laps: VecDeque<LapInsight>,
    vehicle_class: VehicleClass,
}

impl Default for SessionAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl SessionAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            samples: VecDeque::with_capacity(config.sample_capacity),
            current_lap_samples: Vec::new(),
            current_lap: 0,
            laps: VecDeque::with_capacity(config.lap_history),
            vehicle_class: VehicleClass::default(),
        }
    }

    /// Validated construction for externally supplied configuration.
    pub fn with_config(config: AnalyzerConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn vehicle_class(&self) -> VehicleClass {
        self.vehicle_class
    }

    pub fn lap_insights(&self) -> impl Iterator<Item = &LapInsight> {
        self.laps.iter()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Ingest one sample.
    ///
    /// Closes the running lap when the sample's lap counter differs from the
    /// current one; the finished lap is analyzed only if it carries more than
    /// the configured minimum number of samples.
    pub fn push_sample(&mut self, sample: TelemetrySample) {
        if sample.lap != self.current_lap {
            if self.current_lap > 0 && self.current_lap_samples.len() > self.config.min_lap_samples
            {
                self.analyze_current_lap();
            }
            self.current_lap = sample.lap;
            self.current_lap_samples.clear();
        }

        if sample.speed > 0.0 {
            self.vehicle_class = VehicleClass::from_downforce(sample.total_downforce());
        }

        if self.samples.len() == self.config.sample_capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample.clone());
        self.current_lap_samples.push(sample);
    }

    fn analyze_current_lap(&mut self) {
        let samples = &self.current_lap_samples;
        let phases = coarse_phases(samples, self.config.steering_lock_deg);
        let behavior = phase_behavior(samples, &phases);
        let problems = detect_problems(
            samples,
            &phases,
            self.vehicle_class,
            self.config.steering_lock_deg,
        );

        let n = samples.len() as f32;
        let sum = |f: &dyn Fn(&TelemetrySample) -> WheelSet<f32>| {
            samples.iter().fold(WheelSet::splat(0.0), |acc, s| {
                let v = f(s);
                WheelSet {
                    fl: acc.fl + v.fl,
                    fr: acc.fr + v.fr,
                    rl: acc.rl + v.rl,
                    rr: acc.rr + v.rr,
                }
            })
        };
        let maxed = |f: &dyn Fn(&TelemetrySample) -> WheelSet<f32>| {
            samples.iter().fold(WheelSet::splat(0.0f32), |acc, s| {
                let v = f(s);
                WheelSet {
                    fl: acc.fl.max(v.fl),
                    fr: acc.fr.max(v.fr),
                    rl: acc.rl.max(v.rl),
                    rr: acc.rr.max(v.rr),
                }
            })
        };

        let tire_temps_avg = sum(&|s| s.tire_temp).map(|v| v / n);
        let tire_pressure_avg = sum(&|s| s.tire_pressure).map(|v| v / n);
        let tire_temps_max = maxed(&|s| s.tire_temp);
        let brake_temps_max = maxed(&|s| s.brake_temp);

        let tire_balance = match samples.last() {
            Some(last) => WheelSet {
                fl: last.tire_temp_inner.fl - last.tire_temp_outer.fl,
                fr: last.tire_temp_inner.fr - last.tire_temp_outer.fr,
                rl: last.tire_temp_inner.rl - last.tire_temp_outer.rl,
                rr: last.tire_temp_inner.rr - last.tire_temp_outer.rr,
            },
            None => WheelSet::splat(0.0),
        };

        let exit_samples: Vec<&TelemetrySample> = samples
            .iter()
            .zip(&phases)
            .filter(|(_, p)| **p == DrivePhase::Exit)
            .map(|(s, _)| s)
            .collect();
        let avg_rear_slip = if exit_samples.is_empty() {
            0.0
        } else {
            exit_samples.iter().map(|s| s.rear_slip_ratio()).sum::<f32>()
                / exit_samples.len() as f32
        };

        let insight = LapInsight {
            lap_number: self.current_lap,
            sample_count: samples.len(),
            behavior,
            problems,
            tire_temps_avg,
            tire_temps_max,
            tire_pressure_avg,
            tire_wear_start: samples.first().map(|s| s.tire_wear).unwrap_or_default(),
            tire_wear_end: samples.last().map(|s| s.tire_wear).unwrap_or_default(),
            tire_balance,
            brake_temps_max,
            avg_rake: samples.iter().map(|s| s.rake).sum::<f32>() / n,
            max_roll_front: samples.iter().map(|s| s.front_roll()).fold(0.0, f32::max),
            max_roll_rear: samples.iter().map(|s| s.rear_roll()).fold(0.0, f32::max),
            bottoming_events: samples.iter().filter(|s| s.ride_height.min() < 5.0).count(),
            wheelspin_pct: wheelspin_ratio(samples, &phases),
            lockup_pct: lockup_ratio(samples, &phases),
            avg_rear_slip,
            stability_score: stability_score(samples, &phases, self.config.steering_lock_deg),
        };

        debug!(
            lap = insight.lap_number,
            samples = insight.sample_count,
            problems = insight.problems.len(),
            "closed lap"
        );

        if self.laps.len() == self.config.lap_history {
            self.laps.pop_front();
        }
        self.laps.push_back(insight);
    }

    /// Snapshot of the latest lap analysis, or `None` while still collecting.
    pub fn summary(&self) -> Option<SessionSummary> {
        let insight = self.laps.back()?;

        let mut under_sum = 0.0f32;
        let mut over_sum = 0.0f32;
        for (_, ratios) in &insight.behavior {
            under_sum += ratios.understeer;
            over_sum += ratios.oversteer;
        }

        Some(SessionSummary {
            lap_number: insight.lap_number,
            sample_count: insight.sample_count,
            vehicle_class: self.vehicle_class,
            problems: insight.problems.clone(),
            understeer_pct: under_sum / 3.0 * 100.0,
            oversteer_pct: over_sum / 3.0 * 100.0,
            traction_loss_pct: insight.wheelspin_pct * 100.0,
            tire_temps_avg: insight.tire_temps_avg,
            tire_temps_max: insight.tire_temps_max,
            tire_pressure_avg: insight.tire_pressure_avg,
            tire_wear_pct: insight.tire_wear_end.map(|w| w * 100.0),
            brake_temps_max: insight.brake_temps_max,
            stability_score: insight.stability_score,
            wheelspin_pct: insight.wheelspin_pct,
            lockup_pct: insight.lockup_pct,
            avg_rake: insight.avg_rake,
            bottoming_events: insight.bottoming_events,
            behavior: insight.behavior,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(lap: u32, speed: f32) -> TelemetrySample {
        TelemetrySample {
            lap,
            speed,
            tire_temp: WheelSet::splat(85.0),
            grip: WheelSet::splat(1.0),
            ride_height: WheelSet::splat(50.0),
            ..Default::default()
        }
    }

    fn push_lap(analyzer: &mut SessionAnalyzer, lap: u32, count: usize) {
        for _ in 0..count {
            analyzer.push_sample(sample(lap, 150.0));
        }
    }

    #[test]
    fn config_validation() {
        assert!(AnalyzerConfig::default().validate().is_ok());
        let bad = AnalyzerConfig {
            sample_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(AnalysisError::ZeroSampleCapacity)
        ));
        let bad = AnalyzerConfig {
            steering_lock_deg: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(AnalysisError::InvalidSteeringLock(_))
        ));
    }

    #[test]
    fn no_summary_before_first_closed_lap() {
        let mut analyzer = SessionAnalyzer::default();
        push_lap(&mut analyzer, 1, 500);
        assert!(analyzer.summary().is_none());
    }

    #[test]
    fn lap_close_produces_summary() {
        let mut analyzer = SessionAnalyzer::default();
        push_lap(&mut analyzer, 1, 500);
        // First sample of lap 2 closes lap 1.
        analyzer.push_sample(sample(2, 150.0));
        let summary = analyzer.summary();
        assert!(summary.is_some());
        if let Some(summary) = summary {
            assert_eq!(summary.lap_number, 1);
            assert_eq!(summary.sample_count, 500);
            assert_eq!(summary.tire_temps_avg.fl, 85.0);
        }
    }

    #[test]
    fn short_laps_are_discarded() {
        let mut analyzer = SessionAnalyzer::default();
        push_lap(&mut analyzer, 1, 100);
        analyzer.push_sample(sample(2, 150.0));
        assert!(analyzer.summary().is_none());
    }

    #[test]
    fn sample_buffer_is_bounded() {
        let config = AnalyzerConfig {
            sample_capacity: 64,
            ..Default::default()
        };
        let mut analyzer = SessionAnalyzer::new(config);
        push_lap(&mut analyzer, 1, 1000);
        assert_eq!(analyzer.sample_count(), 64);
    }

    #[test]
    fn lap_history_is_bounded() {
        let config = AnalyzerConfig {
            lap_history: 3,
            ..Default::default()
        };
        let mut analyzer = SessionAnalyzer::new(config);
        for lap in 1..=6 {
            push_lap(&mut analyzer, lap, 150);
        }
        push_lap(&mut analyzer, 7, 1);
        assert_eq!(analyzer.lap_insights().count(), 3);
        let first = analyzer.lap_insights().next().map(|l| l.lap_number);
        assert_eq!(first, Some(4));
    }

    #[test]
    fn vehicle_class_tracks_downforce() {
        let mut analyzer = SessionAnalyzer::default();
        let mut prototype = sample(1, 200.0);
        prototype.front_downforce = 9000.0;
        prototype.rear_downforce = 9000.0;
        analyzer.push_sample(prototype);
        assert_eq!(analyzer.vehicle_class(), VehicleClass::Lmh);

        // Downforce reading while stationary is ignored.
        let mut parked = sample(1, 0.0);
        parked.front_downforce = 0.0;
        analyzer.push_sample(parked);
        assert_eq!(analyzer.vehicle_class(), VehicleClass::Lmh);
    }
}
