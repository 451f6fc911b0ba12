//! Thermal and pressure operating windows per vehicle class.

use paddock_telemetry_core::VehicleClass;
use serde::{Deserialize, Serialize};

/// A min/max window with the sweet spot inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingRange {
    pub min: f32,
    pub max: f32,
    pub optimal: f32,
}

impl OperatingRange {
    pub const fn new(min: f32, max: f32, optimal: f32) -> Self {
        Self { min, max, optimal }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// How far above the window `value` sits; 0.0 inside or below.
    pub fn excess(&self, value: f32) -> f32 {
        (value - self.max).max(0.0)
    }

    /// How far below the window `value` sits; 0.0 inside or above.
    pub fn deficit(&self, value: f32) -> f32 {
        (self.min - value).max(0.0)
    }
}

/// Operating windows for one vehicle class.
///
/// Temperatures in Celsius, pressures in kPa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingRanges {
    pub tire_temp: OperatingRange,
    pub tire_pressure: OperatingRange,
    pub brake_temp: OperatingRange,
    /// Hard ceiling above which brake fade is imminent.
    pub brake_temp_max: f32,
    pub engine_temp: OperatingRange,
}

impl OperatingRanges {
    /// The windows for a vehicle class.
    pub const fn for_class(class: VehicleClass) -> Self {
        match class {
            VehicleClass::Gt3 => Self {
                tire_temp: OperatingRange::new(75.0, 95.0, 85.0),
                tire_pressure: OperatingRange::new(170.0, 190.0, 180.0),
                brake_temp: OperatingRange::new(300.0, 600.0, 450.0),
                brake_temp_max: 700.0,
                engine_temp: OperatingRange::new(82.0, 105.0, 92.0),
            },
            VehicleClass::Lmp2 => Self {
                tire_temp: OperatingRange::new(80.0, 95.0, 87.0),
                tire_pressure: OperatingRange::new(165.0, 180.0, 172.0),
                brake_temp: OperatingRange::new(350.0, 650.0, 500.0),
                brake_temp_max: 750.0,
                engine_temp: OperatingRange::new(88.0, 105.0, 95.0),
            },
            VehicleClass::Lmh => Self {
                tire_temp: OperatingRange::new(82.0, 98.0, 90.0),
                tire_pressure: OperatingRange::new(160.0, 178.0, 168.0),
                brake_temp: OperatingRange::new(380.0, 680.0, 530.0),
                brake_temp_max: 780.0,
                engine_temp: OperatingRange::new(90.0, 108.0, 98.0),
            },
        }
    }
}

impl Default for OperatingRanges {
    fn default() -> Self {
        Self::for_class(VehicleClass::Gt3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gt3_tire_window() {
        let ranges = OperatingRanges::for_class(VehicleClass::Gt3);
        assert!(ranges.tire_temp.contains(85.0));
        assert!(ranges.tire_temp.contains(95.0));
        assert!(!ranges.tire_temp.contains(95.1));
        assert_eq!(ranges.tire_temp.excess(105.0), 10.0);
        assert_eq!(ranges.tire_temp.deficit(70.0), 5.0);
    }

    #[test]
    fn faster_classes_run_hotter_brakes() {
        let gt3 = OperatingRanges::for_class(VehicleClass::Gt3);
        let lmp2 = OperatingRanges::for_class(VehicleClass::Lmp2);
        let lmh = OperatingRanges::for_class(VehicleClass::Lmh);
        assert!(gt3.brake_temp_max < lmp2.brake_temp_max);
        assert!(lmp2.brake_temp_max < lmh.brake_temp_max);
    }

    #[test]
    fn excess_and_deficit_are_zero_inside_window() {
        let range = OperatingRange::new(10.0, 20.0, 15.0);
        assert_eq!(range.excess(15.0), 0.0);
        assert_eq!(range.deficit(15.0), 0.0);
    }
}
