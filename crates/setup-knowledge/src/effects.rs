//! The parameter effect table.
//!
//! Each entry maps one setup parameter to the handling problems it influences.
//! Weights are in `-1.0..=1.0`: a negative weight means increasing the
//! parameter reduces the problem, a positive weight means increasing the
//! parameter makes it worse. Entry order and per-entry effect order are
//! preserved, which keeps recommendation generation deterministic.

use paddock_telemetry_core::Problem;
use serde::{Deserialize, Serialize};

use crate::error::KnowledgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterCategory {
    Suspension,
    Dampers,
    Geometry,
    Aero,
    Differential,
    Brakes,
    Tires,
}

/// One setup parameter with its problem effects and adjustment step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Stable id, matching `CarSetup::parameters()` names.
    pub id: String,
    pub display_name: String,
    pub unit: String,
    pub category: ParameterCategory,
    /// Magnitude of one suggested adjustment, in the parameter's unit.
    pub step: f32,
    /// Signed effect weights, in declaration order.
    pub effects: Vec<(Problem, f32)>,
}

impl ParameterSpec {
    /// Signed effect of this parameter on `problem`, or 0.0 if unrelated.
    pub fn effect_on(&self, problem: Problem) -> f32 {
        self.effects
            .iter()
            .find(|(p, _)| *p == problem)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    fn validate(&self) -> Result<(), KnowledgeError> {
        if self.effects.is_empty() {
            return Err(KnowledgeError::EmptyEffects(self.id.clone()));
        }
        for (_, weight) in &self.effects {
            if !(-1.0..=1.0).contains(weight) || !weight.is_finite() {
                return Err(KnowledgeError::WeightOutOfRange {
                    id: self.id.clone(),
                    weight: *weight,
                });
            }
        }
        Ok(())
    }
}

/// Ordered collection of parameter specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectTable {
    entries: Vec<ParameterSpec>,
}

impl Default for EffectTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn spec(
    id: &str,
    display_name: &str,
    unit: &str,
    category: ParameterCategory,
    step: f32,
    effects: &[(Problem, f32)],
) -> ParameterSpec {
    ParameterSpec {
        id: id.to_string(),
        display_name: display_name.to_string(),
        unit: unit.to_string(),
        category,
        step,
        effects: effects.to_vec(),
    }
}

impl EffectTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The built-in table for modern GT and prototype machinery.
    pub fn builtin() -> Self {
        use ParameterCategory as Cat;
        use Problem as P;

        let entries = vec![
            spec(
                "front_spring",
                "Front Springs",
                "N/mm",
                Cat::Suspension,
                5000.0,
                &[
                    (P::UndersteerEntry, -0.25),
                    (P::UndersteerMid, -0.15),
                    (P::OversteerExit, 0.15),
                    (P::TireOverheatFront, 0.1),
                    (P::InstabilityHighSpeed, -0.1),
                ],
            ),
            spec(
                "rear_spring",
                "Rear Springs",
                "N/mm",
                Cat::Suspension,
                5000.0,
                &[
                    (P::UndersteerEntry, 0.15),
                    (P::OversteerExit, -0.3),
                    (P::PoorTraction, 0.15),
                    (P::TireOverheatRear, 0.1),
                ],
            ),
            spec(
                "front_slow_bump",
                "Front Slow Bump",
                "clicks",
                Cat::Dampers,
                1.0,
                &[
                    (P::UndersteerEntry, -0.2),
                    (P::UndersteerMid, -0.1),
                    (P::InstabilityHighSpeed, -0.1),
                ],
            ),
            spec(
                "front_fast_bump",
                "Front Fast Bump",
                "clicks",
                Cat::Dampers,
                1.0,
                &[(P::Bottoming, -0.2)],
            ),
            spec(
                "rear_slow_bump",
                "Rear Slow Bump",
                "clicks",
                Cat::Dampers,
                1.0,
                &[
                    (P::OversteerExit, -0.15),
                    (P::PoorTraction, 0.12),
                    (P::Wheelspin, 0.1),
                ],
            ),
            spec(
                "rear_fast_bump",
                "Rear Fast Bump",
                "clicks",
                Cat::Dampers,
                1.0,
                &[(P::Bottoming, -0.15), (P::PoorTraction, 0.08)],
            ),
            spec(
                "front_slow_rebound",
                "Front Slow Rebound",
                "clicks",
                Cat::Dampers,
                1.0,
                &[(P::UndersteerEntry, 0.18), (P::InstabilityHighSpeed, -0.15)],
            ),
            spec(
                "front_fast_rebound",
                "Front Fast Rebound",
                "clicks",
                Cat::Dampers,
                1.0,
                &[(P::InstabilityHighSpeed, -0.1)],
            ),
            spec(
                "rear_slow_rebound",
                "Rear Slow Rebound",
                "clicks",
                Cat::Dampers,
                1.0,
                &[
                    (P::OversteerEntry, -0.2),
                    (P::OversteerExit, 0.12),
                    (P::PoorTraction, -0.08),
                ],
            ),
            spec(
                "rear_fast_rebound",
                "Rear Fast Rebound",
                "clicks",
                Cat::Dampers,
                1.0,
                &[(P::InstabilityHighSpeed, -0.08)],
            ),
            spec(
                "front_arb",
                "Front Anti-Roll Bar",
                "N/mm",
                Cat::Suspension,
                5000.0,
                &[
                    (P::UndersteerEntry, -0.3),
                    (P::UndersteerMid, -0.35),
                    (P::OversteerExit, 0.2),
                    (P::ExcessiveRoll, -0.3),
                    (P::TireOverheatFront, 0.08),
                ],
            ),
            spec(
                "rear_arb",
                "Rear Anti-Roll Bar",
                "N/mm",
                Cat::Suspension,
                5000.0,
                &[
                    (P::UndersteerEntry, 0.2),
                    (P::UndersteerMid, 0.25),
                    (P::OversteerExit, -0.35),
                    (P::OversteerEntry, -0.15),
                    (P::ExcessiveRoll, -0.25),
                    (P::PoorTraction, 0.12),
                ],
            ),
            spec(
                "front_camber",
                "Front Camber",
                "deg",
                Cat::Geometry,
                0.2,
                &[(P::UndersteerMid, -0.25), (P::TireOverheatFront, 0.15)],
            ),
            spec(
                "rear_camber",
                "Rear Camber",
                "deg",
                Cat::Geometry,
                0.2,
                &[
                    (P::OversteerMid, -0.2),
                    (P::TireOverheatRear, 0.15),
                    (P::PoorTraction, 0.08),
                ],
            ),
            spec(
                "front_toe",
                "Front Toe",
                "deg",
                Cat::Geometry,
                0.02,
                &[
                    // Toe-in pushes the front axle toward understeer.
                    (P::UndersteerEntry, 0.15),
                    (P::InstabilityHighSpeed, -0.2),
                    (P::TireOverheatFront, 0.1),
                ],
            ),
            spec(
                "rear_toe",
                "Rear Toe",
                "deg",
                Cat::Geometry,
                0.02,
                &[
                    // Toe-in stabilizes the rear.
                    (P::OversteerExit, -0.25),
                    (P::InstabilityHighSpeed, -0.3),
                    (P::PoorTraction, -0.1),
                    (P::TireOverheatRear, 0.1),
                ],
            ),
            spec(
                "front_wing",
                "Front Wing",
                "deg",
                Cat::Aero,
                1.0,
                &[(P::UndersteerMid, -0.2), (P::UndersteerEntry, -0.15)],
            ),
            spec(
                "rear_wing",
                "Rear Wing",
                "deg",
                Cat::Aero,
                1.0,
                &[
                    (P::OversteerMid, -0.3),
                    (P::OversteerExit, -0.2),
                    (P::InstabilityHighSpeed, -0.35),
                    (P::PoorTraction, -0.2),
                ],
            ),
            spec(
                "front_ride_height",
                "Front Ride Height",
                "mm",
                Cat::Aero,
                1.0,
                &[
                    // Higher nose sheds front downforce.
                    (P::UndersteerMid, 0.1),
                    (P::Bottoming, -0.3),
                ],
            ),
            spec(
                "rear_ride_height",
                "Rear Ride Height",
                "mm",
                Cat::Aero,
                1.0,
                &[
                    (P::OversteerMid, 0.1),
                    (P::Bottoming, -0.25),
                    (P::PoorTraction, 0.08),
                ],
            ),
            spec(
                "diff_power",
                "Differential Power Lock",
                "%",
                Cat::Differential,
                5.0,
                &[
                    (P::PoorTraction, -0.25),
                    (P::Wheelspin, -0.15),
                    (P::OversteerExit, 0.3),
                ],
            ),
            spec(
                "diff_coast",
                "Differential Coast Lock",
                "%",
                Cat::Differential,
                5.0,
                &[(P::OversteerEntry, 0.25), (P::InstabilityHighSpeed, 0.1)],
            ),
            spec(
                "diff_preload",
                "Differential Preload",
                "Nm",
                Cat::Differential,
                1.0,
                &[(P::PoorTraction, -0.1), (P::OversteerExit, 0.08)],
            ),
            spec(
                "brake_bias",
                "Brake Bias",
                "%",
                Cat::Brakes,
                1.0,
                &[
                    // More front bias unloads the rear under braking.
                    (P::OversteerEntry, -0.35),
                    (P::UndersteerEntry, 0.25),
                    (P::WheelLock, -0.2),
                    (P::BrakeOverheatFront, 0.15),
                    (P::BrakeOverheatRear, -0.15),
                ],
            ),
            spec(
                "front_pressure",
                "Front Tire Pressure",
                "kPa",
                Cat::Tires,
                3.0,
                &[
                    // Higher pressure shrinks the contact patch.
                    (P::UndersteerMid, 0.12),
                    (P::TireOverheatFront, -0.15),
                    (P::TireColdFront, 0.2),
                ],
            ),
            spec(
                "rear_pressure",
                "Rear Tire Pressure",
                "kPa",
                Cat::Tires,
                3.0,
                &[
                    (P::OversteerMid, 0.08),
                    (P::PoorTraction, 0.1),
                    (P::TireOverheatRear, -0.12),
                    (P::TireColdRear, 0.18),
                ],
            ),
        ];

        Self { entries }
    }

    /// Load a table from JSON, validating ids and weights.
    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), KnowledgeError> {
        for (i, entry) in self.entries.iter().enumerate() {
            entry.validate()?;
            if self.entries.iter().take(i).any(|e| e.id == entry.id) {
                return Err(KnowledgeError::DuplicateParameter(entry.id.clone()));
            }
        }
        Ok(())
    }

    /// Insert or replace an entry, keeping the position of a replaced one.
    pub fn insert(&mut self, entry: ParameterSpec) -> Result<(), KnowledgeError> {
        entry.validate()?;
        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ParameterSpec> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.entries.iter()
    }

    /// Parameters with a nonzero effect on `problem`, in registration order.
    pub fn affecting(&self, problem: Problem) -> impl Iterator<Item = &ParameterSpec> {
        self.entries
            .iter()
            .filter(move |e| e.effect_on(problem) != 0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn builtin_table_is_valid() -> Result<(), KnowledgeError> {
        let table = EffectTable::builtin();
        assert_eq!(table.len(), 26);
        table.validate()
    }

    #[test]
    fn front_arb_fights_mid_corner_understeer() {
        let table = EffectTable::builtin();
        let arb = table.get("front_arb");
        let weight = arb.map(|p| p.effect_on(Problem::UndersteerMid));
        assert_eq!(weight, Some(-0.35));
    }

    #[test]
    fn affecting_preserves_registration_order() {
        let table = EffectTable::builtin();
        let ids: Vec<&str> = table
            .affecting(Problem::UndersteerEntry)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(
            ids,
            [
                "front_spring",
                "rear_spring",
                "front_slow_bump",
                "front_slow_rebound",
                "front_arb",
                "rear_arb",
                "front_toe",
                "front_wing",
                "brake_bias",
            ]
        );
    }

    #[test]
    fn unrelated_parameter_has_zero_effect() {
        let table = EffectTable::builtin();
        let wing = table.get("rear_wing");
        let weight = wing.map(|p| p.effect_on(Problem::WheelLock));
        assert_eq!(weight, Some(0.0));
    }

    #[test]
    fn json_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let table = EffectTable::builtin();
        let json = serde_json::to_string(&table)?;
        let reloaded = EffectTable::from_json_str(&json)?;
        assert_eq!(table, reloaded);
        Ok(())
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let mut table = EffectTable::new();
        let result = table.insert(ParameterSpec {
            id: "bogus".to_string(),
            display_name: "Bogus".to_string(),
            unit: "".to_string(),
            category: ParameterCategory::Suspension,
            step: 1.0,
            effects: vec![(Problem::Wheelspin, 1.5)],
        });
        assert!(matches!(
            result,
            Err(KnowledgeError::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn insert_replaces_in_place() -> Result<(), KnowledgeError> {
        let mut table = EffectTable::builtin();
        let mut replacement = match table.get("front_arb") {
            Some(entry) => entry.clone(),
            None => return Err(KnowledgeError::DuplicateParameter("missing".to_string())),
        };
        replacement.step = 2500.0;
        table.insert(replacement)?;
        assert_eq!(table.len(), 26);
        let step = table.get("front_arb").map(|p| p.step);
        assert_relative_eq!(step.unwrap_or(0.0), 2500.0);
        Ok(())
    }
}
