//! Trait vector: the persona's fixed cognitive disposition.
//!
//! Twenty-five named scalars in `[0.0, 1.0]`.  Persona files may supply any
//! subset of them, under either camelCase or snake_case names;
//! [`TraitVector::from_map`] is the single place where the gaps are filled
//! and the values sanitised.  After that the vector never changes for the
//! lifetime of a journey, so none of the update logic carries fallbacks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default value for every trait except `change_blindness`.
pub const DEFAULT_TRAIT_VALUE: f64 = 0.5;

/// Default value for `change_blindness`.
pub const DEFAULT_CHANGE_BLINDNESS: f64 = 0.3;

/// Canonical (camelCase) trait names, in declaration order.
pub const TRAIT_NAMES: [&str; 25] = [
    "patience",
    "riskTolerance",
    "comprehension",
    "persistence",
    "curiosity",
    "workingMemory",
    "readingTendency",
    "resilience",
    "selfEfficacy",
    "satisficing",
    "trustCalibration",
    "interruptRecovery",
    "informationForaging",
    "changeBlindness",
    "anchoringBias",
    "timeHorizon",
    "attributionStyle",
    "metacognitivePlanning",
    "proceduralFluency",
    "transferLearning",
    "authoritySensitivity",
    "emotionalContagion",
    "fearOfMissingOut",
    "socialProofSensitivity",
    "mentalModelRigidity",
];

/// Fully populated, sanitised trait vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitVector {
    pub patience: f64,
    pub risk_tolerance: f64,
    pub comprehension: f64,
    pub persistence: f64,
    pub curiosity: f64,
    pub working_memory: f64,
    pub reading_tendency: f64,
    pub resilience: f64,
    pub self_efficacy: f64,
    pub satisficing: f64,
    pub trust_calibration: f64,
    pub interrupt_recovery: f64,
    pub information_foraging: f64,
    pub change_blindness: f64,
    pub anchoring_bias: f64,
    pub time_horizon: f64,
    pub attribution_style: f64,
    pub metacognitive_planning: f64,
    pub procedural_fluency: f64,
    pub transfer_learning: f64,
    pub authority_sensitivity: f64,
    pub emotional_contagion: f64,
    pub fear_of_missing_out: f64,
    pub social_proof_sensitivity: f64,
    pub mental_model_rigidity: f64,
}

impl Default for TraitVector {
    fn default() -> Self {
        let d = DEFAULT_TRAIT_VALUE;
        Self {
            patience: d,
            risk_tolerance: d,
            comprehension: d,
            persistence: d,
            curiosity: d,
            working_memory: d,
            reading_tendency: d,
            resilience: d,
            self_efficacy: d,
            satisficing: d,
            trust_calibration: d,
            interrupt_recovery: d,
            information_foraging: d,
            change_blindness: DEFAULT_CHANGE_BLINDNESS,
            anchoring_bias: d,
            time_horizon: d,
            attribution_style: d,
            metacognitive_planning: d,
            procedural_fluency: d,
            transfer_learning: d,
            authority_sensitivity: d,
            emotional_contagion: d,
            fear_of_missing_out: d,
            social_proof_sensitivity: d,
            mental_model_rigidity: d,
        }
    }
}

impl TraitVector {
    /// Build a trait vector from a partial name → value map.
    ///
    /// Keys may be camelCase (`riskTolerance`) or snake_case
    /// (`risk_tolerance`).  Missing traits take their defaults, values are
    /// clamped to `[0, 1]`, non-finite values fall back to the default and
    /// unknown keys are ignored with a warning.
    pub fn from_map(raw: &HashMap<String, f64>) -> Self {
        let mut traits = Self::default();
        for (key, value) in raw {
            let name = canonical_name(key);
            let Some(slot) = traits.slot_mut(&name) else {
                log::warn!("Ignoring unknown persona trait '{}'", key);
                continue;
            };
            if value.is_finite() {
                *slot = value.clamp(0.0, 1.0);
            } else {
                log::warn!("Trait '{}' is not a finite number, using default", key);
            }
        }
        traits
    }

    /// Look up a trait by canonical or snake_case name.
    pub fn get(&self, name: &str) -> Option<f64> {
        let name = canonical_name(name);
        self.values()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// All traits as `(canonical name, value)` pairs in declaration order.
    pub fn values(&self) -> [(&'static str, f64); 25] {
        let v = [
            self.patience,
            self.risk_tolerance,
            self.comprehension,
            self.persistence,
            self.curiosity,
            self.working_memory,
            self.reading_tendency,
            self.resilience,
            self.self_efficacy,
            self.satisficing,
            self.trust_calibration,
            self.interrupt_recovery,
            self.information_foraging,
            self.change_blindness,
            self.anchoring_bias,
            self.time_horizon,
            self.attribution_style,
            self.metacognitive_planning,
            self.procedural_fluency,
            self.transfer_learning,
            self.authority_sensitivity,
            self.emotional_contagion,
            self.fear_of_missing_out,
            self.social_proof_sensitivity,
            self.mental_model_rigidity,
        ];
        let mut out = [("", 0.0); 25];
        for (i, value) in v.into_iter().enumerate() {
            out[i] = (TRAIT_NAMES[i], value);
        }
        out
    }

    /// Human-readable summary of the traits that stand out (≤ 0.3 or ≥ 0.7).
    ///
    /// Used in the decision request so the oracle role-plays the extremes
    /// rather than a list of 25 numbers.
    pub fn summary(&self) -> String {
        let notable: Vec<String> = self
            .values()
            .iter()
            .filter(|(_, v)| *v <= 0.3 || *v >= 0.7)
            .map(|(name, v)| {
                let level = if *v >= 0.7 { "high" } else { "low" };
                format!("{} {} ({:.2})", level, name, v)
            })
            .collect();
        if notable.is_empty() {
            "average on every trait".to_string()
        } else {
            notable.join(", ")
        }
    }

    fn slot_mut(&mut self, canonical: &str) -> Option<&mut f64> {
        let slot = match canonical {
            "patience" => &mut self.patience,
            "riskTolerance" => &mut self.risk_tolerance,
            "comprehension" => &mut self.comprehension,
            "persistence" => &mut self.persistence,
            "curiosity" => &mut self.curiosity,
            "workingMemory" => &mut self.working_memory,
            "readingTendency" => &mut self.reading_tendency,
            "resilience" => &mut self.resilience,
            "selfEfficacy" => &mut self.self_efficacy,
            "satisficing" => &mut self.satisficing,
            "trustCalibration" => &mut self.trust_calibration,
            "interruptRecovery" => &mut self.interrupt_recovery,
            "informationForaging" => &mut self.information_foraging,
            "changeBlindness" => &mut self.change_blindness,
            "anchoringBias" => &mut self.anchoring_bias,
            "timeHorizon" => &mut self.time_horizon,
            "attributionStyle" => &mut self.attribution_style,
            "metacognitivePlanning" => &mut self.metacognitive_planning,
            "proceduralFluency" => &mut self.procedural_fluency,
            "transferLearning" => &mut self.transfer_learning,
            "authoritySensitivity" => &mut self.authority_sensitivity,
            "emotionalContagion" => &mut self.emotional_contagion,
            "fearOfMissingOut" => &mut self.fear_of_missing_out,
            "socialProofSensitivity" => &mut self.social_proof_sensitivity,
            "mentalModelRigidity" => &mut self.mental_model_rigidity,
            _ => return None,
        };
        Some(slot)
    }
}

/// Convert `snake_case` to `camelCase`; camelCase input passes through.
fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.trim().chars() {
        if c == '_' || c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
