//! Per-session input record for the correlator.

use paddock_telemetry_core::SessionData;
use serde::{Deserialize, Serialize};

/// What the correlator keeps from one session: the setup that was in force,
/// the best valid lap time, and the session-mean balance tendencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// Best valid lap time, seconds.
    pub lap_time: f64,
    /// Flattened setup parameters, in `CarSetup::parameters()` order.
    pub parameters: Vec<(String, f64)>,
    /// Mean understeer share over valid laps, 0-100.
    pub understeer_tendency: f64,
    /// Mean oversteer share over valid laps, 0-100.
    pub oversteer_tendency: f64,
    /// Mean wheelspin-under-throttle share over valid laps, 0-100.
    pub traction_tendency: f64,
}

impl SessionRecord {
    /// Extract a record from a session.
    ///
    /// Returns `None` when the session has no setup attached or no valid lap;
    /// such sessions carry nothing to correlate.
    pub fn from_session(data: &SessionData) -> Option<Self> {
        let setup = data.setup.as_ref()?;
        let lap_time = data.best_lap_time()?;

        let valid: Vec<_> = data.valid_laps().collect();
        let n = valid.len() as f64;
        let understeer_tendency =
            valid.iter().map(|l| f64::from(l.understeer_pct)).sum::<f64>() / n;
        let oversteer_tendency =
            valid.iter().map(|l| f64::from(l.oversteer_pct)).sum::<f64>() / n;
        let traction_tendency =
            valid.iter().map(|l| f64::from(l.traction_loss_pct)).sum::<f64>() / n;

        Some(Self {
            session_id: data.session_id.clone(),
            lap_time,
            parameters: setup
                .parameters()
                .into_iter()
                .map(|(name, value)| (name.to_string(), f64::from(value)))
                .collect(),
            understeer_tendency,
            oversteer_tendency,
            traction_tendency,
        })
    }

    /// Look up one parameter value by name.
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_telemetry_core::{CarSetup, Lap, TelemetrySample};

    fn flying_lap(lap_number: u32) -> Lap {
        let samples: Vec<TelemetrySample> = (0..200)
            .map(|i| TelemetrySample {
                timestamp: f64::from(i) * 0.5,
                speed: 180.0,
                throttle: 90.0,
                ..Default::default()
            })
            .collect();
        Lap::from_samples(lap_number, samples).unwrap()
    }

    #[test]
    fn session_without_setup_yields_no_record() {
        let session = SessionData {
            laps: vec![flying_lap(4)],
            ..Default::default()
        };
        assert!(SessionRecord::from_session(&session).is_none());
    }

    #[test]
    fn session_without_valid_laps_yields_no_record() {
        let session = SessionData {
            setup: Some(CarSetup::default()),
            laps: vec![flying_lap(1)], // lap 1 is always an outlap
            ..Default::default()
        };
        assert!(SessionRecord::from_session(&session).is_none());
    }

    #[test]
    fn record_carries_setup_and_best_lap() {
        let mut setup = CarSetup::default();
        setup.front_arb = 120.0;
        let session = SessionData {
            session_id: "fp2".to_string(),
            setup: Some(setup),
            laps: vec![flying_lap(4), flying_lap(5)],
            ..Default::default()
        };
        let record = SessionRecord::from_session(&session).unwrap();
        assert_eq!(record.session_id, "fp2");
        assert_eq!(record.parameter("front_arb"), Some(120.0));
        assert!(record.lap_time > 30.0);
    }

    #[test]
    fn traction_tendency_averages_lap_wheelspin() {
        // One lap spins the rear on a quarter of its samples, one is clean.
        let mut samples: Vec<TelemetrySample> = (0..200)
            .map(|i| TelemetrySample {
                timestamp: f64::from(i) * 0.5,
                speed: 180.0,
                throttle: 90.0,
                ..Default::default()
            })
            .collect();
        for sample in samples.iter_mut().take(50) {
            sample.slip_ratio.rl = 0.3;
        }
        let spinning = Lap::from_samples(4, samples).unwrap();
        let session = SessionData {
            setup: Some(CarSetup::default()),
            laps: vec![spinning, flying_lap(5)],
            ..Default::default()
        };
        let record = SessionRecord::from_session(&session).unwrap();
        assert_eq!(record.traction_tendency, 12.5);
        assert_eq!(record.understeer_tendency, 0.0);
    }
}
