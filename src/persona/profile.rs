//! Persona profiles: who is navigating.
//!
//! A [`PersonaDefinition`] is what a simulation file contains: a name, a
//! free-text description, a partial trait map and demographics.  A
//! [`Persona`] is the normalised, immutable form the engine runs with.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::traits::TraitVector;

/// Default persona age when none is given.
pub const DEFAULT_AGE: u32 = 35;

/// Demographic tags and motor parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    /// Age in years; drives the age modifier and gaze–mouse lag.
    #[serde(default = "default_age")]
    pub age: u32,
    /// Relative typing speed (1.0 = average typist).
    #[serde(default = "default_typing_speed")]
    pub typing_speed_modifier: f64,
    /// Pointer jitter in `[0, 1]` (0 = steady hand).
    #[serde(default)]
    pub motor_jitter: f64,
    /// Free-form tags ("mobile-first", "screen-reader", ...).
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_age() -> u32 {
    DEFAULT_AGE
}

fn default_typing_speed() -> f64 {
    1.0
}

impl Default for Demographics {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            typing_speed_modifier: 1.0,
            motor_jitter: 0.0,
            tags: Vec::new(),
        }
    }
}

/// Persona as written in a simulation file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Partial trait map; see [`TraitVector::from_map`].
    #[serde(default)]
    pub traits: HashMap<String, f64>,
    #[serde(default)]
    pub demographics: Demographics,
}

/// Normalised persona.  Immutable once a journey starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub name: String,
    pub description: String,
    pub traits: TraitVector,
    pub demographics: Demographics,
}

impl Persona {
    /// Create a persona with explicit traits and default demographics.
    pub fn new(name: impl Into<String>, traits: TraitVector) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            traits,
            demographics: Demographics::default(),
        }
    }

    /// Normalise a definition.
    pub fn from_definition(def: &PersonaDefinition) -> Self {
        let mut demographics = def.demographics.clone();
        demographics.motor_jitter = if demographics.motor_jitter.is_finite() {
            demographics.motor_jitter.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if !demographics.typing_speed_modifier.is_finite()
            || demographics.typing_speed_modifier <= 0.0
        {
            demographics.typing_speed_modifier = 1.0;
        }

        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            traits: TraitVector::from_map(&def.traits),
            demographics,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_from_yaml() {
        let yaml = r#"
name: Hurried Parent
description: Ordering school supplies between meetings.
traits:
  patience: 0.2
  reading_tendency: 0.1
demographics:
  age: 44
  motorJitter: 0.3
  tags: [mobile-first]
"#;
        let def: PersonaDefinition = serde_yaml::from_str(yaml).unwrap();
        let p = Persona::from_definition(&def);
        assert_eq!(p.name, "Hurried Parent");
        assert_eq!(p.traits.patience, 0.2);
        assert_eq!(p.traits.reading_tendency, 0.1);
        assert_eq!(p.traits.comprehension, 0.5);
        assert_eq!(p.demographics.age, 44);
        assert_eq!(p.demographics.typing_speed_modifier, 1.0);
        assert_eq!(p.demographics.tags, vec!["mobile-first".to_string()]);
    }

    #[test]
    fn test_minimal_definition_gets_defaults() {
        let def: PersonaDefinition = serde_yaml::from_str("name: Anyone").unwrap();
        let p = Persona::from_definition(&def);
        assert_eq!(p.traits, TraitVector::default());
        assert_eq!(p.demographics, Demographics::default());
    }

    #[test]
    fn test_motor_parameters_sanitised() {
        let def = PersonaDefinition {
            name: "x".into(),
            description: String::new(),
            traits: HashMap::new(),
            demographics: Demographics {
                age: 70,
                typing_speed_modifier: -2.0,
                motor_jitter: 4.0,
                tags: vec![],
            },
        };
        let p = Persona::from_definition(&def);
        assert_eq!(p.demographics.motor_jitter, 1.0);
        assert_eq!(p.demographics.typing_speed_modifier, 1.0);
    }
}
