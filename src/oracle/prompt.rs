//! Decision request builder.
//!
//! Renders who the persona is, what it is trying to do, what it can see
//! and how it currently feels into a [`DecisionRequest`].  Elements of a
//! pattern the persona has habituated to are still listed, marked as
//! barely noticed.

use crate::cognitive::{CognitiveState, ProcessingSystem};
use crate::executor::{PageSnapshot, Screenshot};
use crate::persona::Persona;

use super::DecisionRequest;

/// Response contract appended to every system prompt.
pub const RESPONSE_CONTRACT: &str = r#"Respond with a single JSON object and nothing else:
{
  "phase": "<short label of what you are doing, e.g. orienting, searching, filling form>",
  "monologue": "<your inner thoughts, first person, 1-3 sentences>",
  "action": "click:<selector>" | "hover:<selector>" | "fill:<selector>:<value>" | "navigate:<url>" | "scroll:up" | "scroll:down" | null,
  "actionTarget": "<human description of what you act on>",
  "goalAchieved": true | false,
  "goalProgress": <0..1>,
  "newConfusion": <0..1>,
  "newFrustration": <0..1>,
  "mood": "neutral" | "hopeful" | "confused" | "frustrated" | "defeated" | "relieved",
  "frictionDescription": "<optional: what is getting in your way>",
  "frictionElement": "<optional: selector of the element causing friction>",
  "actionSuccess": <optional: did your previous action do what you expected>,
  "errorMessage": "<optional: any error message you can see>"
}"#;

const MAX_CLICKABLES: usize = 40;
const MAX_RECENT_ERRORS: usize = 3;

/// Everything the prompt is rendered from.
pub struct PromptContext<'a> {
    pub persona: &'a Persona,
    pub goal: &'a str,
    pub snapshot: &'a PageSnapshot,
    pub state: &'a CognitiveState,
    pub screenshot: Option<Screenshot>,
}

/// Render a decision request.
pub fn build_request(ctx: PromptContext<'_>) -> DecisionRequest {
    DecisionRequest {
        system_prompt: system_prompt(ctx.persona),
        user_prompt: user_prompt(&ctx),
        screenshot: ctx.screenshot,
    }
}

fn system_prompt(persona: &Persona) -> String {
    let mut sections = Vec::with_capacity(4);
    sections.push(format!(
        "You are {}, a real person using a website. Stay in character: think, \
         notice and act the way this person would, including their mistakes.",
        persona.name
    ));
    if !persona.description.trim().is_empty() {
        sections.push(format!("About you: {}", persona.description.trim()));
    }
    sections.push(format!("Your disposition: {}", persona.traits.summary()));
    if !persona.demographics.tags.is_empty() {
        sections.push(format!("Context: {}", persona.demographics.tags.join(", ")));
    }
    sections.push(RESPONSE_CONTRACT.to_string());
    sections.join("\n\n")
}

fn user_prompt(ctx: &PromptContext<'_>) -> String {
    let state = ctx.state;
    let snap = ctx.snapshot;
    let mut sections = Vec::with_capacity(8);

    sections.push(format!("Goal: {}", ctx.goal));
    sections.push(format!("Step {}", state.step_count));

    // 1. Page
    let mut page = format!("Current page: {}\nTitle: {}", snap.url, snap.title);
    if !snap.visible_headings.is_empty() {
        page.push_str(&format!("\nHeadings: {}", snap.visible_headings.join(" | ")));
    }
    if !snap.text_excerpt.trim().is_empty() {
        page.push_str(&format!("\nVisible text: {}", snap.text_excerpt.trim()));
    }
    sections.push(page);

    // 2. Clickables
    if snap.visible_clickables.is_empty() {
        sections.push("Clickable elements: none visible".to_string());
    } else {
        let lines: Vec<String> = snap
            .visible_clickables
            .iter()
            .take(MAX_CLICKABLES)
            .map(|c| {
                let mut line = format!("- [{}] {} ({})", c.selector, c.text.trim(), c.tag);
                if let Some(pattern) = state.habituation.blind_pattern(&c.text) {
                    line.push_str(&format!(" (you barely notice this: looks like a {})", pattern));
                }
                line
            })
            .collect();
        sections.push(format!("Clickable elements:\n{}", lines.join("\n")));
    }

    // 3. Inputs
    if !snap.visible_inputs.is_empty() {
        let lines: Vec<String> = snap
            .visible_inputs
            .iter()
            .map(|i| {
                let mut line = format!("- [{}] {} \"{}\"", i.selector, i.input_type, i.label);
                if !i.options.is_empty() {
                    line.push_str(&format!(" options: {}", i.options.join(" | ")));
                }
                if let Some(pattern) = state.habituation.blind_pattern(&i.label) {
                    line.push_str(&format!(" (you barely notice this: looks like a {})", pattern));
                }
                line
            })
            .collect();
        sections.push(format!("Fillable inputs:\n{}", lines.join("\n")));
    }

    // 4. Psychological state
    sections.push(format!(
        "How you feel: patience {:.0}%, confusion {:.0}%, frustration {:.0}%, \
         goal progress {:.0}%, mood {}, strongest emotion {}",
        state.patience() * 100.0,
        state.confusion_level * 100.0,
        state.frustration_level * 100.0,
        state.goal_progress * 100.0,
        state.current_mood,
        state.emotional_state.dominant,
    ));

    // 5. Attention and thinking mode
    let mut mind: Vec<String> = vec![match state.cognitive_mode.system {
        ProcessingSystem::System1 => "You are acting on autopilot, going with your gut.".into(),
        ProcessingSystem::System2 => "You have slowed down and are thinking carefully.".into(),
    }];
    if state.decision_fatigue.choosing_defaults {
        mind.push("You are tired of deciding and go for defaults and the most obvious option.".into());
    }
    let width = state.scan_pattern.effective_width;
    if width < 100.0 {
        mind.push(format!(
            "You are only taking in about {:.0}% of the page; anything off to the sides is easy to miss.",
            width
        ));
    }
    sections.push(mind.join(" "));

    // 6. Recent errors
    let errors = &state.memory.errors_encountered;
    if !errors.is_empty() {
        let start = errors.len().saturating_sub(MAX_RECENT_ERRORS);
        let lines: Vec<String> = errors[start..]
            .iter()
            .map(|e| format!("- {} ({})", e.error, e.context))
            .collect();
        sections.push(format!("Recent problems:\n{}", lines.join("\n")));
    }

    sections.join("\n\n")
}

// ============================================================================
// Tests
// ============================================================================
