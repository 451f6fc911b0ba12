//! Numeric car setup record.
//!
//! The pipeline only ever reads setups: it diagnoses problems against the
//! setup in force and proposes changes as [`crate::report::Recommendation`]
//! values, never by mutating the record itself.

use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelPosition {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelPosition {
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    pub fn is_front(&self) -> bool {
        matches!(self, WheelPosition::FrontLeft | WheelPosition::FrontRight)
    }
}

impl fmt::Display for WheelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WheelPosition::FrontLeft => "front_left",
            WheelPosition::FrontRight => "front_right",
            WheelPosition::RearLeft => "rear_left",
            WheelPosition::RearRight => "rear_right",
        };
        write!(f, "{name}")
    }
}

/// Per-corner suspension and tire settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerTuning {
    pub camber_deg: f32,
    pub toe_deg: f32,
    pub pressure_kpa: f32,
    /// N/mm.
    pub spring_rate: f32,
    pub ride_height_mm: f32,
    pub slow_bump: f32,
    pub fast_bump: f32,
    pub slow_rebound: f32,
    pub fast_rebound: f32,
}

/// Complete numeric setup of a car for one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CarSetup {
    pub name: String,
    pub car: String,
    pub track: String,

    pub fl: CornerTuning,
    pub fr: CornerTuning,
    pub rl: CornerTuning,
    pub rr: CornerTuning,

    /// Anti-roll bar stiffness, N/mm.
    pub front_arb: f32,
    pub rear_arb: f32,

    /// Percent of braking force on the front axle.
    pub brake_bias: f32,
    pub brake_pressure: f32,

    pub front_wing: f32,
    pub rear_wing: f32,

    /// Differential lock percentages.
    pub diff_power: f32,
    pub diff_coast: f32,
    /// Nm.
    pub diff_preload: f32,

    pub traction_control: f32,
    pub tire_compound: String,
}

impl CarSetup {
    pub fn corner(&self, position: WheelPosition) -> &CornerTuning {
        match position {
            WheelPosition::FrontLeft => &self.fl,
            WheelPosition::FrontRight => &self.fr,
            WheelPosition::RearLeft => &self.rl,
            WheelPosition::RearRight => &self.rr,
        }
    }

    pub fn front_spring_rate(&self) -> f32 {
        (self.fl.spring_rate + self.fr.spring_rate) / 2.0
    }

    pub fn rear_spring_rate(&self) -> f32 {
        (self.rl.spring_rate + self.rr.spring_rate) / 2.0
    }

    pub fn front_camber(&self) -> f32 {
        (self.fl.camber_deg + self.fr.camber_deg) / 2.0
    }

    pub fn rear_camber(&self) -> f32 {
        (self.rl.camber_deg + self.rr.camber_deg) / 2.0
    }

    pub fn front_toe(&self) -> f32 {
        (self.fl.toe_deg + self.fr.toe_deg) / 2.0
    }

    pub fn rear_toe(&self) -> f32 {
        (self.rl.toe_deg + self.rr.toe_deg) / 2.0
    }

    pub fn front_pressure(&self) -> f32 {
        (self.fl.pressure_kpa + self.fr.pressure_kpa) / 2.0
    }

    pub fn rear_pressure(&self) -> f32 {
        (self.rl.pressure_kpa + self.rr.pressure_kpa) / 2.0
    }

    pub fn front_ride_height(&self) -> f32 {
        (self.fl.ride_height_mm + self.fr.ride_height_mm) / 2.0
    }

    pub fn rear_ride_height(&self) -> f32 {
        (self.rl.ride_height_mm + self.rr.ride_height_mm) / 2.0
    }

    /// Rake: rear minus front ride height, mm. Positive is nose-down.
    pub fn rake(&self) -> f32 {
        self.rear_ride_height() - self.front_ride_height()
    }

    /// Estimated aero balance as the front wing's share, 0.0 to 1.0.
    /// A wingless setup reads as balanced.
    pub fn aero_balance(&self) -> f32 {
        let total = self.front_wing + self.rear_wing;
        if total > 0.0 {
            self.front_wing / total
        } else {
            0.5
        }
    }

    /// Flatten the setup into named scalar parameters.
    ///
    /// This is the view the cross-session correlator works on; axle-level
    /// values are averaged over the two wheels of the axle.
    pub fn parameters(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("front_spring", self.front_spring_rate()),
            ("rear_spring", self.rear_spring_rate()),
            ("front_slow_bump", (self.fl.slow_bump + self.fr.slow_bump) / 2.0),
            ("front_fast_bump", (self.fl.fast_bump + self.fr.fast_bump) / 2.0),
            ("rear_slow_bump", (self.rl.slow_bump + self.rr.slow_bump) / 2.0),
            ("rear_fast_bump", (self.rl.fast_bump + self.rr.fast_bump) / 2.0),
            (
                "front_slow_rebound",
                (self.fl.slow_rebound + self.fr.slow_rebound) / 2.0,
            ),
            (
                "front_fast_rebound",
                (self.fl.fast_rebound + self.fr.fast_rebound) / 2.0,
            ),
            (
                "rear_slow_rebound",
                (self.rl.slow_rebound + self.rr.slow_rebound) / 2.0,
            ),
            (
                "rear_fast_rebound",
                (self.rl.fast_rebound + self.rr.fast_rebound) / 2.0,
            ),
            ("front_arb", self.front_arb),
            ("rear_arb", self.rear_arb),
            ("front_camber", self.front_camber()),
            ("rear_camber", self.rear_camber()),
            ("front_toe", self.front_toe()),
            ("rear_toe", self.rear_toe()),
            ("front_pressure", self.front_pressure()),
            ("rear_pressure", self.rear_pressure()),
            ("front_ride_height", self.front_ride_height()),
            ("rear_ride_height", self.rear_ride_height()),
            ("rake", self.rake()),
            ("brake_bias", self.brake_bias),
            ("brake_pressure", self.brake_pressure),
            ("front_wing", self.front_wing),
            ("rear_wing", self.rear_wing),
            ("aero_balance", self.aero_balance() * 100.0),
            ("diff_power", self.diff_power),
            ("diff_coast", self.diff_coast),
            ("diff_preload", self.diff_preload),
            ("traction_control", self.traction_control),
        ]
    }

    /// Look up one flattened parameter by name.
    pub fn parameter(&self, name: &str) -> Option<f32> {
        self.parameters()
            .into_iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value)
    }
}
