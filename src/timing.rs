//! Biomechanical timing: how long a human body takes to carry out an
//! action.
//!
//! Pointer travel follows Fitts's law, `a + b·log2(D/W + 1)`, scaled by age
//! and tremor.  Typing is per-character, slowed for older or slower typists.
//! All results are in milliseconds and deterministic.

use serde::{Deserialize, Serialize};

use crate::executor::{Action, PageSnapshot};
use crate::persona::Demographics;

/// Fitts intercept (ms).
pub const FITTS_A: f64 = 50.0;
/// Fitts slope (ms per bit).
pub const FITTS_B: f64 = 150.0;
/// Travel distance when the target's position is unknown (px).
pub const DEFAULT_DISTANCE: f64 = 400.0;
/// Target width when the target's size is unknown (px).
pub const DEFAULT_TARGET_WIDTH: f64 = 80.0;
/// Per-character time of an average typist (ms).
pub const BASE_KEYSTROKE_MS: f64 = 280.0;
/// One scroll gesture (ms).
pub const SCROLL_MS: f64 = 400.0;

const WORD_PAUSE_MS: f64 = 120.0;
const PUNCTUATION_PAUSE_MS: f64 = 200.0;

// ============================================================================
// Motor profile
// ============================================================================

/// Motor parameters fixed per persona.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorProfile {
    pub age: u32,
    pub typing_speed_modifier: f64,
    pub motor_jitter: f64,
}

impl MotorProfile {
    pub fn from_demographics(d: &Demographics) -> Self {
        Self {
            age: d.age,
            typing_speed_modifier: d.typing_speed_modifier,
            motor_jitter: d.motor_jitter,
        }
    }

    /// 1.0 up to 40, +1% per year after.
    pub fn age_modifier(&self) -> f64 {
        1.0 + 0.01 * (self.age.saturating_sub(40) as f64)
    }

    pub fn tremor_modifier(&self) -> f64 {
        1.0 + 0.5 * self.motor_jitter.clamp(0.0, 1.0)
    }

    /// Typing expertise; higher is faster.
    pub fn expertise(&self) -> f64 {
        let speed = if self.typing_speed_modifier > 0.0 {
            self.typing_speed_modifier
        } else {
            1.0
        };
        speed / self.age_modifier()
    }

    /// Delay between the eyes landing on a target and the hand moving,
    /// 200 ms at 20 rising to 500 ms at 80.
    pub fn gaze_mouse_lag(&self) -> f64 {
        let t = ((self.age as f64 - 20.0) / 60.0).clamp(0.0, 1.0);
        200.0 + 300.0 * t
    }
}

impl Default for MotorProfile {
    fn default() -> Self {
        Self::from_demographics(&Demographics::default())
    }
}

// ============================================================================
// Primitive timings
// ============================================================================

/// Fitts's-law pointer travel time.
pub fn movement_time(distance: f64, target_width: f64, profile: &MotorProfile) -> f64 {
    let distance = if distance.is_finite() { distance.max(0.0) } else { DEFAULT_DISTANCE };
    let width = if target_width.is_finite() && target_width > 0.0 {
        target_width
    } else {
        DEFAULT_TARGET_WIDTH
    };
    let index_of_difficulty = (distance / width + 1.0).log2();
    (FITTS_A + FITTS_B * index_of_difficulty) * profile.age_modifier() * profile.tremor_modifier()
}

/// Time to type `text`.  `realistic` adds pauses at word boundaries and
/// after punctuation.
pub fn typing_time(text: &str, expertise: f64, realistic: bool) -> f64 {
    let expertise = if expertise.is_finite() && expertise > 0.0 { expertise } else { 1.0 };
    let per_char = BASE_KEYSTROKE_MS / expertise;
    let mut total = 0.0;
    for c in text.chars() {
        total += per_char;
        if realistic {
            if c.is_whitespace() {
                total += WORD_PAUSE_MS;
            } else if c.is_ascii_punctuation() {
                total += PUNCTUATION_PAUSE_MS;
            }
        }
    }
    total
}

// ============================================================================
// Pointer
// ============================================================================

/// Simulated pointer position, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    /// Travel distance and target width for `selector`, moving the pointer
    /// to the target's centre when its bounds are known.
    fn travel_to(&mut self, snapshot: &PageSnapshot, selector: &str) -> (f64, f64) {
        match snapshot.bounds_of(selector) {
            Some(bounds) => {
                let (cx, cy) = bounds.center();
                let distance = ((cx - self.x).powi(2) + (cy - self.y).powi(2)).sqrt();
                self.x = cx;
                self.y = cy;
                (distance, bounds.width.min(bounds.height).max(1.0))
            }
            None => (DEFAULT_DISTANCE, DEFAULT_TARGET_WIDTH),
        }
    }
}

/// Milliseconds the persona's body needs to perform `action`.
///
/// Pointer actions pay the gaze–mouse lag plus Fitts travel; fills also
/// type their value; navigation types the URL.
pub fn action_duration(
    action: &Action,
    snapshot: &PageSnapshot,
    pointer: &mut Pointer,
    profile: &MotorProfile,
    gaze_mouse_lag: f64,
) -> f64 {
    match action {
        Action::Click { selector } | Action::Hover { selector } => {
            let (d, w) = pointer.travel_to(snapshot, selector);
            gaze_mouse_lag + movement_time(d, w, profile)
        }
        Action::Fill { selector, value } => {
            let (d, w) = pointer.travel_to(snapshot, selector);
            gaze_mouse_lag + movement_time(d, w, profile) + typing_time(value, profile.expertise(), true)
        }
        Action::Navigate { url } => typing_time(url, profile.expertise(), false),
        Action::Scroll { .. } => SCROLL_MS,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Bounds, Clickable};

    fn profile(age: u32, jitter: f64) -> MotorProfile {
        MotorProfile {
            age,
            typing_speed_modifier: 1.0,
            motor_jitter: jitter,
        }
    }

    #[test]
    fn test_fitts_baseline() {
        let p = profile(30, 0.0);
        // D = W: log2(2) = 1 bit
        assert!((movement_time(80.0, 80.0, &p) - 200.0).abs() < 1e-9);
        assert!((movement_time(0.0, 80.0, &p) - FITTS_A).abs() < 1e-9);
    }

    #[test]
    fn test_farther_and_smaller_is_slower() {
        let p = MotorProfile::default();
        assert!(movement_time(800.0, 80.0, &p) > movement_time(400.0, 80.0, &p));
        assert!(movement_time(400.0, 20.0, &p) > movement_time(400.0, 80.0, &p));
    }

    #[test]
    fn test_age_and_tremor_slow_movement() {
        let young = profile(30, 0.0);
        let old = profile(70, 0.0);
        let shaky = profile(30, 1.0);
        let base = movement_time(400.0, 80.0, &young);
        assert!((movement_time(400.0, 80.0, &old) - base * 1.3).abs() < 1e-9);
        assert!((movement_time(400.0, 80.0, &shaky) - base * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_gaze_lag_range() {
        assert_eq!(profile(18, 0.0).gaze_mouse_lag(), 200.0);
        assert_eq!(profile(50, 0.0).gaze_mouse_lag(), 350.0);
        assert_eq!(profile(95, 0.0).gaze_mouse_lag(), 500.0);
    }

    #[test]
    fn test_typing() {
        assert_eq!(typing_time("abcd", 1.0, false), 4.0 * BASE_KEYSTROKE_MS);
        assert_eq!(typing_time("abcd", 2.0, false), 2.0 * BASE_KEYSTROKE_MS);
        assert!(typing_time("hi there.", 1.0, true) > typing_time("hi there.", 1.0, false));
        assert_eq!(typing_time("", 1.0, true), 0.0);
        // bad expertise falls back to average
        assert_eq!(typing_time("a", 0.0, false), BASE_KEYSTROKE_MS);
    }

    #[test]
    fn test_expertise_drops_with_age() {
        assert!(profile(70, 0.0).expertise() < profile(30, 0.0).expertise());
    }

    #[test]
    fn test_action_duration_tracks_pointer() {
        let snap = PageSnapshot {
            visible_clickables: vec![Clickable {
                selector: "#buy".into(),
                text: "Buy".into(),
                tag: "button".into(),
                href: None,
                bounds: Some(Bounds {
                    x: 280.0,
                    y: 380.0,
                    width: 40.0,
                    height: 40.0,
                }),
            }],
            ..Default::default()
        };
        let p = profile(30, 0.0);
        let mut pointer = Pointer::default();
        let click: Action = "click:#buy".parse().unwrap();

        let first = action_duration(&click, &snap, &mut pointer, &p, 250.0);
        assert_eq!(pointer, Pointer { x: 300.0, y: 400.0 });
        // 500 px to a 40 px target
        let expected = 250.0 + FITTS_A + FITTS_B * (500.0f64 / 40.0 + 1.0).log2();
        assert!((first - expected).abs() < 1e-9);

        // already on target
        let second = action_duration(&click, &snap, &mut pointer, &p, 250.0);
        assert!((second - (250.0 + FITTS_A)).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_target_uses_defaults() {
        let p = profile(30, 0.0);
        let mut pointer = Pointer::default();
        let hover: Action = "hover:#menu".parse().unwrap();
        let t = action_duration(&hover, &PageSnapshot::default(), &mut pointer, &p, 0.0);
        assert!((t - movement_time(DEFAULT_DISTANCE, DEFAULT_TARGET_WIDTH, &p)).abs() < 1e-9);
        assert_eq!(pointer, Pointer::default());

        let scroll: Action = "scroll:down".parse().unwrap();
        assert_eq!(
            action_duration(&scroll, &PageSnapshot::default(), &mut pointer, &p, 300.0),
            SCROLL_MS
        );
    }
}
