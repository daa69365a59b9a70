//! Visual attention: scan-pattern narrowing, peripheral vision, and
//! habituation to recurring UI patterns ("banner blindness").

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::persona::TraitVector;

// ============================================================================
// Scan pattern
// ============================================================================

/// Narrowest scan width, reached at full cognitive load.
pub const SCAN_WIDTH_FLOOR: f64 = 0.4;

/// How the persona sweeps a page when unloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseScanPattern {
    /// Reads headings and the first words of lines.
    FPattern,
    /// Reads section by section, thoroughly.
    LayerCake,
    /// Jumps between salient words and buttons.
    Spotted,
}

impl BaseScanPattern {
    pub fn for_traits(traits: &TraitVector) -> Self {
        if traits.reading_tendency > 0.7 {
            Self::LayerCake
        } else if traits.reading_tendency < 0.3 {
            Self::Spotted
        } else {
            Self::FPattern
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPattern {
    pub base_pattern: BaseScanPattern,
    pub width_multiplier: f64,
    /// Width as a percentage of the full scan.
    pub effective_width: f64,
}

impl ScanPattern {
    pub fn new(base_pattern: BaseScanPattern) -> Self {
        Self {
            base_pattern,
            width_multiplier: 1.0,
            effective_width: 100.0,
        }
    }

    /// Recompute width from the current confusion and frustration.
    pub fn update(&mut self, confusion: f64, frustration: f64) {
        self.width_multiplier = scan_width_multiplier((confusion + frustration) / 2.0);
        self.effective_width = self.width_multiplier * 100.0;
    }
}

/// Full width at load 0, falling linearly to [`SCAN_WIDTH_FLOOR`] at load 1.
pub fn scan_width_multiplier(load: f64) -> f64 {
    let load = if load.is_nan() { 0.0 } else { load.clamp(0.0, 1.0) };
    SCAN_WIDTH_FLOOR + (1.0 - SCAN_WIDTH_FLOOR) * (1.0 - load)
}

// ============================================================================
// Peripheral vision
// ============================================================================

/// Arousal at which peripheral width peaks.
pub const OPTIMAL_AROUSAL: f64 = 0.5;

const PERIPHERAL_FLOOR: f64 = 0.3;
const PERIPHERAL_SPREAD: f64 = 0.18;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeripheralVision {
    pub width_factor: f64,
    pub height_factor: f64,
    pub arousal_level: f64,
}

impl PeripheralVision {
    pub fn from_load(confusion: f64, frustration: f64) -> Self {
        let arousal = (0.25 + 0.45 * frustration + 0.30 * confusion).clamp(0.0, 1.0);
        let width = yerkes_dodson(arousal);
        Self {
            width_factor: width,
            // vertical field is narrower than horizontal
            height_factor: width * 0.75,
            arousal_level: arousal,
        }
    }
}

/// Inverted-U over arousal: 1.0 at [`OPTIMAL_AROUSAL`], tending to the floor
/// at both extremes.
pub fn yerkes_dodson(arousal: f64) -> f64 {
    let d = arousal - OPTIMAL_AROUSAL;
    PERIPHERAL_FLOOR
        + (1.0 - PERIPHERAL_FLOOR) * (-(d * d) / (2.0 * PERIPHERAL_SPREAD * PERIPHERAL_SPREAD)).exp()
}

// ============================================================================
// Habituation
// ============================================================================

/// Recurring UI patterns people learn to ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiPattern {
    CookieNotice,
    NewsletterPopup,
    ChatWidget,
    SocialShare,
    Banner,
}

impl UiPattern {
    /// Classify element text; the first matching pattern wins.
    pub fn classify(text: &str) -> Option<Self> {
        const RULES: [(UiPattern, &[&str]); 5] = [
            (
                UiPattern::CookieNotice,
                &["cookie", "consent", "gdpr", "privacy preferences"],
            ),
            (
                UiPattern::NewsletterPopup,
                &["newsletter", "subscribe", "sign up for updates", "join our mailing"],
            ),
            (
                UiPattern::ChatWidget,
                &["chat with us", "live chat", "need help?", "chat now"],
            ),
            (
                UiPattern::SocialShare,
                &["share on", "tweet", "follow us", "pin it"],
            ),
            (
                UiPattern::Banner,
                &["banner", "promo", "% off", "limited time", "sale", "sponsored", "advertisement"],
            ),
        ];

        let lower = text.to_lowercase();
        RULES
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(p, _)| *p)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CookieNotice => "cookie-notice",
            Self::NewsletterPopup => "newsletter-popup",
            Self::ChatWidget => "chat-widget",
            Self::SocialShare => "social-share",
            Self::Banner => "banner",
        }
    }
}

impl fmt::Display for UiPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exposure counters and the set of patterns the persona no longer sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habituation {
    pub exposures: BTreeMap<UiPattern, u32>,
    pub blind: BTreeSet<UiPattern>,
    /// Exposure count that must be exceeded before a pattern goes blind.
    pub threshold: u32,
}

impl Habituation {
    /// Low-comprehension personas habituate sooner (2–6 exposures).
    pub fn for_traits(traits: &TraitVector) -> Self {
        Self {
            exposures: BTreeMap::new(),
            blind: BTreeSet::new(),
            threshold: 2 + (traits.comprehension * 4.0).round() as u32,
        }
    }

    /// Count one exposure per classified element text.  Returns the
    /// patterns that went blind on this call.
    pub fn observe<'a, I>(&mut self, texts: I) -> Vec<UiPattern>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut newly_blind = Vec::new();
        for text in texts {
            let Some(pattern) = UiPattern::classify(text) else {
                continue;
            };
            let count = self.exposures.entry(pattern).or_insert(0);
            *count += 1;
            if *count > self.threshold && self.blind.insert(pattern) {
                newly_blind.push(pattern);
            }
        }
        newly_blind
    }

    /// The blind pattern this text belongs to, if any.
    pub fn blind_pattern(&self, text: &str) -> Option<UiPattern> {
        UiPattern::classify(text).filter(|p| self.blind.contains(p))
    }
}

// ============================================================================
// Tests
// ============================================================================
