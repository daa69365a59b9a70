//! Static-page executor over plain HTTP.
//!
//! No browser, no JavaScript: navigation is a GET, the snapshot is pulled
//! out of the HTML with regexes, clicking a link follows its `href`.  Good
//! enough for server-rendered flows and for smoke-testing a cohort.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    ActionExecutor, Clickable, ExecutedAction, ExecutorError, InputField, NavigateOutcome,
    PageSnapshot, Screenshot, ScrollDirection,
};

const TEXT_EXCERPT_CHARS: usize = 400;
const USER_AGENT: &str = concat!("persona-journey/", env!("CARGO_PKG_VERSION"));

static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h[1-3][^>]*>(.*?)</h[1-3]>").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a>").unwrap());
static BUTTON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<button\b([^>]*)>(.*?)</button>").unwrap());
static INPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<input\b([^>]*)>").unwrap());
static SELECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<select\b([^>]*)>(.*?)</select>").unwrap());
static TEXTAREA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<textarea\b([^>]*)>").unwrap());
static OPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<option\b[^>]*>(.*?)</option>").unwrap());
static LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<label\b[^>]*\bfor\s*=\s*["']([^"']+)["'][^>]*>(.*?)</label>"#).unwrap()
});
static ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)([a-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:script|style|noscript)\b[^>]*>.*?</(?:script|style|noscript)>").unwrap()
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn parse_attrs(raw: &str) -> HashMap<String, String> {
    ATTR.captures_iter(raw)
        .map(|c| {
            let value = c.get(2).or_else(|| c.get(3)).map_or("", |m| m.as_str());
            (c[1].to_lowercase(), value.to_string())
        })
        .collect()
}

/// Visible text with tags stripped and whitespace collapsed.
fn visible_text(html: &str) -> String {
    let stripped = TAG.replace_all(html, " ");
    SPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Selector for an element: `#id`, then `[name="…"]`, then a positional
/// fallback.
fn selector_for(tag: &str, attrs: &HashMap<String, String>, index: usize) -> String {
    if let Some(id) = attrs.get("id").filter(|v| !v.is_empty()) {
        format!("#{}", id)
    } else if let Some(name) = attrs.get("name").filter(|v| !v.is_empty()) {
        format!("{}[name=\"{}\"]", tag, name)
    } else if let Some(href) = attrs.get("href").filter(|v| !v.is_empty()) {
        format!("a[href=\"{}\"]", href)
    } else {
        format!("{}:nth-of-type({})", tag, index + 1)
    }
}

/// Extract a [`PageSnapshot`] from raw HTML.
pub fn parse_page(url: &str, html: &str) -> PageSnapshot {
    let body = SCRIPT.replace_all(html, " ");

    let title = TITLE
        .captures(&body)
        .map(|c| visible_text(&c[1]))
        .unwrap_or_default();
    let visible_headings = HEADING
        .captures_iter(&body)
        .map(|c| visible_text(&c[1]))
        .filter(|t| !t.is_empty())
        .collect();

    let labels: HashMap<String, String> = LABEL
        .captures_iter(&body)
        .map(|c| (c[1].to_string(), visible_text(&c[2])))
        .collect();
    let label_for = |attrs: &HashMap<String, String>| -> String {
        attrs
            .get("id")
            .and_then(|id| labels.get(id).cloned())
            .or_else(|| attrs.get("aria-label").cloned())
            .or_else(|| attrs.get("placeholder").cloned())
            .or_else(|| attrs.get("name").cloned())
            .unwrap_or_default()
    };

    let mut visible_clickables = Vec::new();
    for (i, c) in LINK.captures_iter(&body).enumerate() {
        let attrs = parse_attrs(&c[1]);
        let text = visible_text(&c[2]);
        let text = if text.is_empty() {
            attrs.get("aria-label").cloned().unwrap_or_default()
        } else {
            text
        };
        visible_clickables.push(Clickable {
            selector: selector_for("a", &attrs, i),
            text,
            tag: "a".to_string(),
            href: attrs.get("href").cloned(),
            bounds: None,
        });
    }
    for (i, c) in BUTTON.captures_iter(&body).enumerate() {
        let attrs = parse_attrs(&c[1]);
        visible_clickables.push(Clickable {
            selector: selector_for("button", &attrs, i),
            text: visible_text(&c[2]),
            tag: "button".to_string(),
            href: None,
            bounds: None,
        });
    }

    let mut visible_inputs = Vec::new();
    for (i, c) in INPUT.captures_iter(&body).enumerate() {
        let attrs = parse_attrs(&c[1]);
        let input_type = attrs
            .get("type")
            .map(|t| t.to_lowercase())
            .unwrap_or_else(|| "text".to_string());
        if input_type == "hidden" {
            continue;
        }
        if input_type == "submit" || input_type == "button" {
            visible_clickables.push(Clickable {
                selector: selector_for("input", &attrs, i),
                text: attrs.get("value").cloned().unwrap_or_default(),
                tag: "input".to_string(),
                href: None,
                bounds: None,
            });
            continue;
        }
        visible_inputs.push(InputField {
            selector: selector_for("input", &attrs, i),
            label: label_for(&attrs),
            input_type,
            options: Vec::new(),
            bounds: None,
        });
    }
    for (i, c) in SELECT.captures_iter(&body).enumerate() {
        let attrs = parse_attrs(&c[1]);
        visible_inputs.push(InputField {
            selector: selector_for("select", &attrs, i),
            label: label_for(&attrs),
            input_type: "select".to_string(),
            options: OPTION
                .captures_iter(&c[2])
                .map(|o| visible_text(&o[1]))
                .filter(|t| !t.is_empty())
                .collect(),
            bounds: None,
        });
    }
    for (i, c) in TEXTAREA.captures_iter(&body).enumerate() {
        let attrs = parse_attrs(&c[1]);
        visible_inputs.push(InputField {
            selector: selector_for("textarea", &attrs, i),
            label: label_for(&attrs),
            input_type: "textarea".to_string(),
            options: Vec::new(),
            bounds: None,
        });
    }

    let text_excerpt: String = visible_text(&body).chars().take(TEXT_EXCERPT_CHARS).collect();

    PageSnapshot {
        url: url.to_string(),
        title,
        visible_headings,
        visible_clickables,
        visible_inputs,
        text_excerpt,
    }
}

// ============================================================================
// Executor
// ============================================================================

/// [`ActionExecutor`] for server-rendered pages.
pub struct StaticPageExecutor {
    client: reqwest::Client,
    page: Option<PageSnapshot>,
    /// Values entered per selector on the current page.
    filled: HashMap<String, String>,
    scroll_offset: u32,
}

impl StaticPageExecutor {
    pub fn new(timeout: Duration) -> Result<Self, ExecutorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            page: None,
            filled: HashMap::new(),
            scroll_offset: 0,
        })
    }

    /// Replace the current page with already-fetched HTML.
    pub fn load_html(&mut self, url: &str, html: &str) {
        self.page = Some(parse_page(url, html));
        self.filled.clear();
        self.scroll_offset = 0;
    }

    /// Values entered so far on the current page.
    pub fn filled_values(&self) -> &HashMap<String, String> {
        &self.filled
    }

    fn current(&self) -> Result<&PageSnapshot, ExecutorError> {
        self.page.as_ref().ok_or_else(|| ExecutorError::Navigation {
            url: String::new(),
            message: "no page loaded".to_string(),
        })
    }

    fn resolve(&self, href: &str) -> Result<String, ExecutorError> {
        let base = self.current()?.url.clone();
        let joined = reqwest::Url::parse(&base)
            .and_then(|b| b.join(href))
            .map_err(|e| ExecutorError::Navigation {
                url: href.to_string(),
                message: e.to_string(),
            })?;
        Ok(joined.to_string())
    }
}

#[async_trait]
impl ActionExecutor for StaticPageExecutor {
    async fn navigate(&mut self, url: &str) -> Result<NavigateOutcome, ExecutorError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ExecutorError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ExecutorError::Unsupported(format!(
                "navigation to {} scheme",
                parsed.scheme()
            )));
        }

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(ExecutorError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }
        let html = response.text().await?;
        log::debug!("Loaded {} ({} bytes)", final_url, html.len());
        self.load_html(&final_url, &html);
        Ok(NavigateOutcome { final_url })
    }

    async fn click(&mut self, selector: &str) -> Result<ExecutedAction, ExecutorError> {
        let target = self
            .current()?
            .visible_clickables
            .iter()
            .find(|c| c.selector == selector)
            .map(|c| c.href.clone());
        let no_effect = ExecutedAction {
            success: false,
            final_url: None,
        };
        match target {
            None => Ok(no_effect),
            Some(Some(href)) if !href.starts_with('#') && !href.starts_with("javascript:") => {
                let url = self.resolve(&href)?;
                let nav = self.navigate(&url).await?;
                Ok(ExecutedAction {
                    success: true,
                    final_url: Some(nav.final_url),
                })
            }
            // in-page anchors and script links change nothing we can see
            Some(Some(_)) => Ok(no_effect),
            // buttons need a script or a form post
            Some(None) => Ok(no_effect),
        }
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<bool, ExecutorError> {
        let Some(input) = self
            .current()?
            .visible_inputs
            .iter()
            .find(|i| i.selector == selector)
        else {
            return Ok(false);
        };
        if input.input_type == "select"
            && !input.options.iter().any(|o| o.eq_ignore_ascii_case(value.trim()))
        {
            return Ok(false);
        }
        self.filled.insert(selector.to_string(), value.to_string());
        Ok(true)
    }

    async fn hover(&mut self, selector: &str) -> Result<bool, ExecutorError> {
        let page = self.current()?;
        Ok(page.bounds_of(selector).is_some()
            || page.visible_clickables.iter().any(|c| c.selector == selector)
            || page.visible_inputs.iter().any(|i| i.selector == selector))
    }

    async fn scroll(&mut self, direction: ScrollDirection) -> Result<bool, ExecutorError> {
        self.current()?;
        match direction {
            ScrollDirection::Down => self.scroll_offset += 1,
            ScrollDirection::Up => self.scroll_offset = self.scroll_offset.saturating_sub(1),
        }
        Ok(true)
    }

    async fn screenshot(&mut self) -> Result<Option<Screenshot>, ExecutorError> {
        Ok(None)
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot, ExecutorError> {
        self.current().cloned()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r##"<!doctype html>
<html><head><title> Acme &middot; Checkout </title>
<style>.x { color: red }</style>
<script>var secret = "<h1>nope</h1>";</script></head>
<body>
  <h1>Your cart</h1>
  <h2 class="sub">Shipping</h2>
  <a href="/cart" id="cart-link">View <b>cart</b></a>
  <a href="https://help.example/returns">Returns</a>
  <a href="#top">Back to top</a>
  <button id="pay" type="submit">Pay now</button>
  <button>Chat with us</button>
  <label for="email">Email address</label>
  <input id="email" type="email" name="email">
  <input type="hidden" name="csrf" value="x">
  <input type="submit" name="go" value="Continue">
  <select name="country"><option>France</option><option value="es">Spain</option></select>
  <textarea name="notes" placeholder="Delivery notes"></textarea>
  <p>Free returns within 30 days.</p>
</body></html>"##;

    fn loaded() -> StaticPageExecutor {
        let mut exec = StaticPageExecutor::new(Duration::from_secs(5)).unwrap();
        exec.load_html("https://shop.example/checkout", HTML);
        exec
    }

    #[test]
    fn test_parse_page() {
        let snap = parse_page("https://shop.example/checkout", HTML);
        assert_eq!(snap.title, "Acme &middot; Checkout");
        assert_eq!(snap.visible_headings, vec!["Your cart", "Shipping"]);

        let sels: Vec<&str> = snap.visible_clickables.iter().map(|c| c.selector.as_str()).collect();
        assert!(sels.contains(&"#cart-link"));
        assert!(sels.contains(&"a[href=\"https://help.example/returns\"]"));
        assert!(sels.contains(&"#pay"));
        assert!(sels.contains(&"button:nth-of-type(2)"));
        assert!(sels.contains(&"input[name=\"go\"]"));
        let cart = snap.visible_clickables.iter().find(|c| c.selector == "#cart-link").unwrap();
        assert_eq!(cart.text, "View cart");

        assert_eq!(snap.visible_inputs.len(), 3);
        let email = &snap.visible_inputs[0];
        assert_eq!(email.selector, "#email");
        assert_eq!(email.label, "Email address");
        let country = snap.visible_inputs.iter().find(|i| i.input_type == "select").unwrap();
        assert_eq!(country.options, vec!["France", "Spain"]);
        let notes = snap.visible_inputs.iter().find(|i| i.input_type == "textarea").unwrap();
        assert_eq!(notes.label, "Delivery notes");

        assert!(snap.text_excerpt.contains("Free returns"));
        assert!(!snap.text_excerpt.contains("secret"));
    }

    #[test]
    fn test_patterns_compile_once_and_are_reused() {
        for pattern in [
            &TITLE, &HEADING, &LINK, &BUTTON, &INPUT, &SELECT, &TEXTAREA, &OPTION, &LABEL, &ATTR,
            &SCRIPT, &TAG, &SPACE,
        ] {
            Lazy::force(pattern);
        }
        let first = parse_page("https://a.example/", "<title>A</title><h1>One</h1>");
        let second = parse_page("https://b.example/", "<title>B</title><a href=\"/x\">X</a>");
        assert_eq!(first.title, "A");
        assert_eq!(first.visible_headings, vec!["One"]);
        assert!(first.visible_clickables.is_empty());
        assert_eq!(second.title, "B");
        assert!(second.visible_headings.is_empty());
        assert_eq!(second.visible_clickables[0].href.as_deref(), Some("/x"));
    }

    #[tokio::test]
    async fn test_fill_and_hover() {
        let mut exec = loaded();
        assert!(exec.fill("#email", "a@b.c").await.unwrap());
        assert!(exec.fill("select[name=\"country\"]", "spain").await.unwrap());
        assert!(!exec.fill("select[name=\"country\"]", "Narnia").await.unwrap());
        assert!(!exec.fill("#missing", "x").await.unwrap());
        assert_eq!(exec.filled_values().get("#email").map(String::as_str), Some("a@b.c"));

        assert!(exec.hover("#pay").await.unwrap());
        assert!(!exec.hover("#nothing").await.unwrap());
        assert!(exec.scroll(ScrollDirection::Down).await.unwrap());
        assert!(exec.screenshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clicks_without_navigation() {
        let mut exec = loaded();
        assert!(!exec.click("#pay").await.unwrap().success);
        assert!(!exec.click("a[href=\"#top\"]").await.unwrap().success);
        assert!(!exec.click("#nope").await.unwrap().success);
    }

    #[tokio::test]
    async fn test_nothing_loaded_and_bad_scheme() {
        let mut exec = StaticPageExecutor::new(Duration::from_secs(5)).unwrap();
        assert!(matches!(
            exec.snapshot().await,
            Err(ExecutorError::Navigation { .. })
        ));
        assert!(matches!(
            exec.navigate("ftp://files.example/").await,
            Err(ExecutorError::Unsupported(_))
        ));
        assert!(exec.navigate("not a url").await.is_err());
    }

    #[test]
    fn test_resolve_relative() {
        let exec = loaded();
        assert_eq!(exec.resolve("/cart").unwrap(), "https://shop.example/cart");
        assert_eq!(
            exec.resolve("https://help.example/returns").unwrap(),
            "https://help.example/returns"
        );
    }
}
