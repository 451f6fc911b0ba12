//! Raw telemetry samples and the per-wheel value container.

use serde::{Deserialize, Serialize};

/// One value per wheel, in the usual FL/FR/RL/RR order.
///
/// Used for everything that is measured at the contact patch: temperatures,
/// pressures, wear, grip, slip, ride heights and brake temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelSet<T> {
    pub fl: T,
    pub fr: T,
    pub rl: T,
    pub rr: T,
}

impl<T: Copy> WheelSet<T> {
    pub fn splat(value: T) -> Self {
        Self {
            fl: value,
            fr: value,
            rl: value,
            rr: value,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(T) -> U) -> WheelSet<U> {
        WheelSet {
            fl: f(self.fl),
            fr: f(self.fr),
            rl: f(self.rl),
            rr: f(self.rr),
        }
    }
}

impl WheelSet<f32> {
    /// Average of the two front wheels.
    pub fn front_avg(&self) -> f32 {
        (self.fl + self.fr) / 2.0
    }

    /// Average of the two rear wheels.
    pub fn rear_avg(&self) -> f32 {
        (self.rl + self.rr) / 2.0
    }

    pub fn avg(&self) -> f32 {
        (self.fl + self.fr + self.rl + self.rr) / 4.0
    }

    pub fn max(&self) -> f32 {
        self.fl.max(self.fr).max(self.rl).max(self.rr)
    }

    pub fn min(&self) -> f32 {
        self.fl.min(self.fr).min(self.rl).min(self.rr)
    }

    pub fn front_max(&self) -> f32 {
        self.fl.max(self.fr)
    }

    pub fn rear_max(&self) -> f32 {
        self.rl.max(self.rr)
    }

    pub fn front_min(&self) -> f32 {
        self.fl.min(self.fr)
    }

    pub fn rear_min(&self) -> f32 {
        self.rl.min(self.rr)
    }

    /// Element-wise absolute values.
    pub fn abs(&self) -> WheelSet<f32> {
        self.map(f32::abs)
    }
}

/// A single telemetry sample as produced by an external acquisition source.
///
/// All fields default to zero; a sample with partial sensor dropout is still
/// analyzable and never aborts the pipeline.
///
/// Units: speed km/h, throttle/brake/clutch 0-100, steering degrees (negative
/// is left), temperatures Celsius, pressures kPa, ride heights mm, slip
/// angles degrees, slip ratios dimensionless, downforce Newtons.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Seconds since session start.
    pub timestamp: f64,
    /// Meters from start/finish.
    pub distance: f32,
    pub lap: u32,

    pub speed: f32,
    pub rpm: f32,
    pub gear: i8,

    pub throttle: f32,
    pub brake: f32,
    pub steering: f32,
    pub clutch: f32,

    pub g_lat: f32,
    pub g_long: f32,

    pub tire_temp: WheelSet<f32>,
    pub tire_temp_inner: WheelSet<f32>,
    pub tire_temp_outer: WheelSet<f32>,
    pub tire_pressure: WheelSet<f32>,
    pub tire_wear: WheelSet<f32>,
    pub grip: WheelSet<f32>,
    pub tire_load: WheelSet<f32>,
    pub slip_angle: WheelSet<f32>,
    pub slip_ratio: WheelSet<f32>,

    pub ride_height: WheelSet<f32>,
    pub susp_travel: WheelSet<f32>,
    pub brake_temp: WheelSet<f32>,

    pub front_downforce: f32,
    pub rear_downforce: f32,
    pub rake: f32,

    pub fuel: f32,
}

impl TelemetrySample {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean of the absolute front slip angles, in degrees.
    pub fn front_slip_angle(&self) -> f32 {
        self.slip_angle.abs().front_avg()
    }

    /// Mean of the absolute rear slip angles, in degrees.
    pub fn rear_slip_angle(&self) -> f32 {
        self.slip_angle.abs().rear_avg()
    }

    /// Mean of the absolute front slip ratios.
    pub fn front_slip_ratio(&self) -> f32 {
        self.slip_ratio.abs().front_avg()
    }

    /// Mean of the absolute rear slip ratios.
    pub fn rear_slip_ratio(&self) -> f32 {
        self.slip_ratio.abs().rear_avg()
    }

    /// Largest absolute slip ratio on the driven (rear) axle.
    pub fn rear_slip_ratio_peak(&self) -> f32 {
        self.slip_ratio.abs().rear_max()
    }

    pub fn front_grip(&self) -> f32 {
        self.grip.front_avg()
    }

    pub fn rear_grip(&self) -> f32 {
        self.grip.rear_avg()
    }

    /// Combined aerodynamic downforce, used for vehicle class inference.
    pub fn total_downforce(&self) -> f32 {
        self.front_downforce + self.rear_downforce
    }

    /// Front axle roll: absolute ride height difference left-to-right, mm.
    pub fn front_roll(&self) -> f32 {
        (self.ride_height.fl - self.ride_height.fr).abs()
    }

    /// Rear axle roll: absolute ride height difference left-to-right, mm.
    pub fn rear_roll(&self) -> f32 {
        (self.ride_height.rl - self.ride_height.rr).abs()
    }
}
