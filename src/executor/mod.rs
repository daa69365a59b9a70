//! Action executor boundary: the browser-driving side of a journey.
//!
//! The engine never drives a browser itself.  It talks to an
//! [`ActionExecutor`], one instance per journey, which navigates, clicks,
//! fills and reports what is visible.  Failures are reported either as
//! `Ok(false)` or as an [`ExecutorError`]; the orchestrator records both and
//! keeps going.

pub mod http;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::StaticPageExecutor;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by an executor.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The page could not be loaded.
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// No element matches the selector.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The executor cannot perform this kind of action.
    #[error("Unsupported action: {0}")]
    Unsupported(String),
}

// ============================================================================
// Actions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl FromStr for ScrollDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "top" => Ok(Self::Up),
            "down" | "bottom" | "" => Ok(Self::Down),
            other => Err(format!("unknown scroll direction '{}'", other)),
        }
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Hover,
    Fill,
    Navigate,
    Scroll,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Hover => "hover",
            Self::Fill => "fill",
            Self::Navigate => "navigate",
            Self::Scroll => "scroll",
        }
    }
}

/// A proposed physical action, parsed from the oracle's action string.
///
/// Wire format: `click:sel`, `hover:sel`, `fill:sel:value`, `navigate:url`,
/// `scroll:dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Click { selector: String },
    Hover { selector: String },
    Fill { selector: String, value: String },
    Navigate { url: String },
    Scroll { direction: ScrollDirection },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Click { .. } => ActionKind::Click,
            Self::Hover { .. } => ActionKind::Hover,
            Self::Fill { .. } => ActionKind::Fill,
            Self::Navigate { .. } => ActionKind::Navigate,
            Self::Scroll { .. } => ActionKind::Scroll,
        }
    }

    /// Selector, URL or direction the action is aimed at.
    pub fn target(&self) -> String {
        match self {
            Self::Click { selector } | Self::Hover { selector } | Self::Fill { selector, .. } => {
                selector.clone()
            }
            Self::Navigate { url } => url.clone(),
            Self::Scroll { direction } => direction.to_string(),
        }
    }

    /// Rough number of alternatives weighed before choosing this action.
    ///
    /// Filling a form field ≈ 5, navigating or searching ≈ 8, anything
    /// else ≈ 3.
    pub fn estimated_option_count(&self) -> u32 {
        match self {
            Self::Navigate { .. } => 8,
            Self::Fill { selector, .. } if selector.to_lowercase().contains("search") => 8,
            Self::Fill { .. } => 5,
            _ => 3,
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("action '{}' has no ':' separator", s))?;
        let rest = rest.trim();
        let non_empty = |v: &str| -> Result<String, String> {
            if v.is_empty() {
                Err(format!("action '{}' is missing its target", s))
            } else {
                Ok(v.to_string())
            }
        };

        match kind.trim().to_lowercase().as_str() {
            "click" => Ok(Self::Click {
                selector: non_empty(rest)?,
            }),
            "hover" => Ok(Self::Hover {
                selector: non_empty(rest)?,
            }),
            "fill" | "type" => {
                let (selector, value) = rest
                    .split_once(':')
                    .ok_or_else(|| format!("fill action '{}' needs selector:value", s))?;
                Ok(Self::Fill {
                    selector: non_empty(selector.trim())?,
                    value: value.to_string(),
                })
            }
            "navigate" | "goto" => Ok(Self::Navigate {
                url: non_empty(rest)?,
            }),
            "scroll" => Ok(Self::Scroll {
                direction: rest.parse()?,
            }),
            other => Err(format!("unknown action kind '{}'", other)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click { selector } => write!(f, "click:{}", selector),
            Self::Hover { selector } => write!(f, "hover:{}", selector),
            Self::Fill { selector, value } => write!(f, "fill:{}:{}", selector, value),
            Self::Navigate { url } => write!(f, "navigate:{}", url),
            Self::Scroll { direction } => write!(f, "scroll:{}", direction),
        }
    }
}

// ============================================================================
// Page snapshot
// ============================================================================

/// Element bounding box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A visible clickable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clickable {
    pub selector: String,
    pub text: String,
    /// Tag name ("a", "button", ...).
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

/// A visible fillable input; dropdowns carry their options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    pub selector: String,
    /// Input type ("text", "email", "select", ...).
    pub input_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

/// What the persona can currently see.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub visible_headings: Vec<String>,
    pub visible_clickables: Vec<Clickable>,
    pub visible_inputs: Vec<InputField>,
    /// Short excerpt of the visible body text.
    #[serde(default)]
    pub text_excerpt: String,
}

impl PageSnapshot {
    /// Bounds of the element a selector refers to, if known.
    pub fn bounds_of(&self, selector: &str) -> Option<Bounds> {
        self.visible_clickables
            .iter()
            .find(|c| c.selector == selector)
            .and_then(|c| c.bounds)
            .or_else(|| {
                self.visible_inputs
                    .iter()
                    .find(|i| i.selector == selector)
                    .and_then(|i| i.bounds)
            })
    }

    /// Every piece of element text on the page, for habituation.
    pub fn element_texts(&self) -> Vec<&str> {
        self.visible_headings
            .iter()
            .map(String::as_str)
            .chain(self.visible_clickables.iter().map(|c| c.text.as_str()))
            .chain(self.visible_inputs.iter().map(|i| i.label.as_str()))
            .filter(|t| !t.trim().is_empty())
            .collect()
    }
}

/// Opaque screenshot handle: encoded image bytes plus media type.
#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    pub media_type: String,
    pub data: Vec<u8>,
}

/// Result of a navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateOutcome {
    pub final_url: String,
}

/// Result of executing one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedAction {
    pub success: bool,
    /// Landing URL when the action loaded a page (navigations, followed
    /// links).
    pub final_url: Option<String>,
}

// ============================================================================
// Executor trait
// ============================================================================

/// Browser-driving boundary.  One instance per journey.
#[async_trait]
pub trait ActionExecutor: Send {
    async fn navigate(&mut self, url: &str) -> Result<NavigateOutcome, ExecutorError>;

    /// Click an element.  A click that loads a page reports where it
    /// landed in `final_url`.
    async fn click(&mut self, selector: &str) -> Result<ExecutedAction, ExecutorError>;

    async fn fill(&mut self, selector: &str, value: &str) -> Result<bool, ExecutorError>;

    async fn hover(&mut self, selector: &str) -> Result<bool, ExecutorError>;

    async fn scroll(&mut self, direction: ScrollDirection) -> Result<bool, ExecutorError>;

    /// Capture the viewport.  Executors without rendering return `None`.
    async fn screenshot(&mut self) -> Result<Option<Screenshot>, ExecutorError>;

    async fn snapshot(&mut self) -> Result<PageSnapshot, ExecutorError>;

    /// Dispatch a parsed [`Action`].
    async fn execute(&mut self, action: &Action) -> Result<ExecutedAction, ExecutorError> {
        let outcome = match action {
            Action::Navigate { url } => {
                let nav = self.navigate(url).await?;
                ExecutedAction {
                    success: true,
                    final_url: Some(nav.final_url),
                }
            }
            Action::Click { selector } => self.click(selector).await?,
            Action::Fill { selector, value } => ExecutedAction {
                success: self.fill(selector, value).await?,
                final_url: None,
            },
            Action::Hover { selector } => ExecutedAction {
                success: self.hover(selector).await?,
                final_url: None,
            },
            Action::Scroll { direction } => ExecutedAction {
                success: self.scroll(*direction).await?,
                final_url: None,
            },
        };
        Ok(outcome)
    }
}

// ============================================================================
// Tests
// ============================================================================
