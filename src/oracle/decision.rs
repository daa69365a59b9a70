//! Decision parsing: oracle text → [`OracleReply`].
//!
//! The oracle answers in free text that should contain one JSON object.
//! Anything that does not parse is [`OracleReply::Malformed`]; the
//! orchestrator turns that into a no-op turn.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cognitive::Mood;
use crate::executor::Action;

/// A parsed oracle decision.  Absent numeric fields leave the state alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Decision {
    /// Free label of the persona's current phase ("orienting", "searching").
    pub phase: Option<String>,
    /// Inner monologue for this step.
    pub monologue: Option<String>,
    /// Raw action string, e.g. `click:#checkout`.
    pub action: Option<String>,
    pub action_target: Option<String>,
    pub goal_achieved: bool,
    pub goal_progress: Option<f64>,
    pub new_confusion: Option<f64>,
    pub new_frustration: Option<f64>,
    pub mood: Option<String>,
    pub friction_description: Option<String>,
    pub friction_element: Option<String>,
    /// Whether the previous action visibly worked, as judged from the page.
    pub action_success: Option<bool>,
    pub error_message: Option<String>,
}

impl Decision {
    /// The proposed action, if the action string parses.
    ///
    /// Unparsable action strings are dropped with a warning: the turn still
    /// counts, the persona just does not act.
    pub fn parsed_action(&self) -> Option<Action> {
        let raw = self.action.as_deref()?.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("none")
        {
            return None;
        }
        match raw.parse::<Action>() {
            Ok(action) => Some(action),
            Err(e) => {
                log::warn!("Dropping unparsable action '{}': {}", raw, e);
                None
            }
        }
    }

    /// The reported mood, if it names a known mood.
    pub fn parsed_mood(&self) -> Option<Mood> {
        self.mood.as_deref().and_then(Mood::parse)
    }
}

/// Outcome of parsing one oracle reply.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleReply {
    Decision(Decision),
    Malformed { reason: String },
}

impl OracleReply {
    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Self::Decision(d) => Some(d),
            Self::Malformed { .. } => None,
        }
    }
}

/// Parse raw oracle text.
///
/// Accepts bare JSON, JSON inside a fenced code block, or JSON embedded in
/// surrounding prose (first `{` to last `}`).  Numeric fields outside
/// `[0, 1]` are clamped; non-finite ones are dropped.
pub fn parse_reply(raw: &str) -> OracleReply {
    let Some(candidate) = extract_json_object(raw) else {
        return OracleReply::Malformed {
            reason: "no JSON object found".to_string(),
        };
    };

    let value: Value = match serde_json::from_str(candidate) {
        Ok(v) => v,
        Err(e) => {
            return OracleReply::Malformed {
                reason: format!("invalid JSON: {}", e),
            }
        }
    };
    if !value.is_object() {
        return OracleReply::Malformed {
            reason: "reply is not a JSON object".to_string(),
        };
    }

    match serde_json::from_value::<Decision>(value) {
        Ok(mut decision) => {
            decision.goal_progress = sanitize_unit(decision.goal_progress);
            decision.new_confusion = sanitize_unit(decision.new_confusion);
            decision.new_frustration = sanitize_unit(decision.new_frustration);
            OracleReply::Decision(decision)
        }
        Err(e) => OracleReply::Malformed {
            reason: format!("unexpected field types: {}", e),
        },
    }
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn sanitize_unit(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite()).map(|x| x.clamp(0.0, 1.0))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_reply() {
        let raw = r##"{
            "phase": "searching",
            "monologue": "Where is the cart?",
            "action": "click:#cart",
            "actionTarget": "Cart icon",
            "goalAchieved": false,
            "goalProgress": 0.3,
            "newConfusion": 0.4,
            "newFrustration": 0.2,
            "mood": "confused",
            "frictionDescription": "Cart icon has no label",
            "frictionElement": "#cart",
            "actionSuccess": true
        }"##;
        let reply = parse_reply(raw);
        let d = reply.decision().unwrap();
        assert_eq!(d.phase.as_deref(), Some("searching"));
        assert_eq!(d.goal_progress, Some(0.3));
        assert_eq!(d.parsed_mood(), Some(Mood::Confused));
        assert_eq!(
            d.parsed_action(),
            Some(Action::Click {
                selector: "#cart".into()
            })
        );
        assert_eq!(d.action_success, Some(true));
    }

    #[test]
    fn test_fenced_and_prose_wrapped() {
        let raw = "Sure! Here is my decision:\n```json\n{\"goalAchieved\": true}\n```\nThanks.";
        let d = parse_reply(raw);
        assert!(d.decision().unwrap().goal_achieved);
    }

    #[test]
    fn test_null_action_means_no_action() {
        let d = parse_reply(r#"{"action": null, "goalAchieved": false}"#);
        assert_eq!(d.decision().unwrap().parsed_action(), None);
        let d = parse_reply(r#"{"action": "none"}"#);
        assert_eq!(d.decision().unwrap().parsed_action(), None);
    }

    #[test]
    fn test_malformed_variants() {
        assert!(matches!(parse_reply("I give up"), OracleReply::Malformed { .. }));
        assert!(matches!(parse_reply("{not json}"), OracleReply::Malformed { .. }));
        assert!(matches!(
            parse_reply(r#"{"goalAchieved": "maybe"}"#),
            OracleReply::Malformed { .. }
        ));
        assert!(matches!(parse_reply("} backwards {"), OracleReply::Malformed { .. }));
    }

    #[test]
    fn test_out_of_range_numbers_clamped() {
        let d = parse_reply(r#"{"newConfusion": 1.8, "newFrustration": -0.2}"#);
        let d = d.decision().unwrap();
        assert_eq!(d.new_confusion, Some(1.0));
        assert_eq!(d.new_frustration, Some(0.0));
        assert_eq!(d.goal_progress, None);
    }

    #[test]
    fn test_unknown_mood_ignored() {
        let d = parse_reply(r#"{"mood": "hangry"}"#);
        assert_eq!(d.decision().unwrap().parsed_mood(), None);
    }
}
