//! Anthropic Messages API oracle.
//!
//! - Real HTTP calls via `reqwest`
//! - Retry with exponential backoff on 429/529/5xx, honouring `Retry-After`
//! - Optional base64 screenshot block for vision requests
//! - Credentials checked at construction, before any journey state exists

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};

use super::{excerpt, DecisionOracle, DecisionRequest, OracleError};
use crate::config::{ConfigError, OracleSettings, API_KEY_ENV};

/// Anthropic API version header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Oracle backed by an Anthropic model.
#[derive(Debug, Clone)]
pub struct AnthropicOracle {
    settings: OracleSettings,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicOracle {
    /// Build from settings.  Fails with
    /// [`ConfigError::MissingCredentials`] when no API key is configured.
    pub fn new(settings: OracleSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingCredentials(format!(
                    "Anthropic API key not set. Set {} or oracle.apiKey.",
                    API_KEY_ENV
                ))
            })?;
        let timeout = Duration::try_from_secs_f64(settings.request_timeout_secs)
            .map_err(|e| ConfigError::Validation(format!("oracle.requestTimeoutSecs: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Validation(format!("HTTP client: {}", e)))?;
        Ok(Self {
            settings,
            api_key,
            client,
        })
    }

    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    /// Messages API request body.
    pub fn build_request_body(&self, request: &DecisionRequest) -> Value {
        let mut content = Vec::with_capacity(2);
        if let Some(shot) = &request.screenshot {
            content.push(json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": shot.media_type,
                    "data": base64::engine::general_purpose::STANDARD.encode(&shot.data),
                }
            }));
        }
        content.push(json!({ "type": "text", "text": request.user_prompt }));

        let mut body = json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "system": request.system_prompt,
            "messages": [{ "role": "user", "content": content }],
        });
        if let Some(t) = self.settings.temperature {
            body["temperature"] = json!(t);
        }
        body
    }

    /// Concatenate the text blocks of a Messages API response.
    fn parse_response(response: &Value) -> Result<String, OracleError> {
        if response.get("type").and_then(|t| t.as_str()) == Some("error") {
            let message = response
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown Anthropic API error");
            return Err(OracleError::InvalidResponse(message.to_string()));
        }
        let content = response
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                OracleError::InvalidResponse("No content array in Anthropic response".into())
            })?;

        let text: Vec<&str> = content
            .iter()
            .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
            .collect();
        if let Some(usage) = response.get("usage") {
            log::debug!("Anthropic usage: {}", usage);
        }
        Ok(text.join(""))
    }
}

#[async_trait]
impl DecisionOracle for AnthropicOracle {
    async fn decide(&self, request: &DecisionRequest) -> Result<String, OracleError> {
        let endpoint = format!(
            "{}/v1/messages",
            self.settings.api_base_url().trim_end_matches('/')
        );
        let body = self.build_request_body(request);

        let mut last_error = String::from("no attempt made");
        let mut retry_delay = Duration::from_secs(1);

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                log::warn!(
                    "Anthropic API retry attempt {} after {:?} ({})",
                    attempt,
                    retry_delay,
                    last_error
                );
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match self
                .client
                .post(&endpoint)
                .header("content-type", "application/json")
                .header("x-api-key", self.api_key.as_str())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    retry_delay = Duration::from_secs(retry_after);
                }
                last_error = "Rate limited by Anthropic API (429)".into();
                continue;
            }
            if status.as_u16() == 529 {
                last_error = "Anthropic API overloaded (529)".into();
                continue;
            }
            if status.is_server_error() {
                last_error = format!("Anthropic API server error: {}", status);
                continue;
            }

            let text = response.text().await?;
            if status.is_client_error() {
                return Err(OracleError::Api {
                    status: status.as_u16(),
                    body: text,
                });
            }

            let json: Value = serde_json::from_str(&text).map_err(|e| {
                OracleError::InvalidResponse(format!(
                    "{} - Body: {}",
                    e,
                    excerpt(&text, 500)
                ))
            })?;
            return Self::parse_response(&json);
        }

        Err(OracleError::RetriesExhausted {
            attempts: self.settings.max_retries + 1,
            last_error,
        })
    }

    fn name(&self) -> String {
        format!("anthropic:{}", self.settings.model)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Screenshot;

    fn settings(key: Option<&str>) -> OracleSettings {
        OracleSettings {
            api_key: key.map(str::to_string),
            ..Default::default()
        }
    }

    fn request(screenshot: Option<Screenshot>) -> DecisionRequest {
        DecisionRequest {
            system_prompt: "You are Dana.".into(),
            user_prompt: "Goal: buy".into(),
            screenshot,
        }
    }

    #[test]
    fn test_missing_key_is_config_error() {
        assert!(matches!(
            AnthropicOracle::new(settings(None)),
            Err(ConfigError::MissingCredentials(_))
        ));
        assert!(matches!(
            AnthropicOracle::new(settings(Some("  "))),
            Err(ConfigError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_body_text_only() {
        let oracle = AnthropicOracle::new(settings(Some("sk-test"))).unwrap();
        let body = oracle.build_request_body(&request(None));
        assert_eq!(body["system"], "You are Dana.");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["temperature"], 0.7);
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["text"], "Goal: buy");
        assert_eq!(oracle.name(), format!("anthropic:{}", crate::config::DEFAULT_MODEL));
    }

    #[test]
    fn test_body_with_screenshot() {
        let oracle = AnthropicOracle::new(settings(Some("sk-test"))).unwrap();
        let shot = Screenshot {
            media_type: "image/png".into(),
            data: b"png".to_vec(),
        };
        let body = oracle.build_request_body(&request(Some(shot)));
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["data"], "cG5n");
        assert_eq!(content[1]["type"], "text");
    }

    #[test]
    fn test_parse_response() {
        let resp = json!({
            "content": [
                { "type": "text", "text": "{\"goalAchieved\":" },
                { "type": "text", "text": " false}" }
            ],
            "usage": { "input_tokens": 10, "output_tokens": 5 }
        });
        assert_eq!(
            AnthropicOracle::parse_response(&resp).unwrap(),
            "{\"goalAchieved\": false}"
        );

        let err = json!({ "type": "error", "error": { "message": "overloaded" } });
        assert!(matches!(
            AnthropicOracle::parse_response(&err),
            Err(OracleError::InvalidResponse(m)) if m == "overloaded"
        ));
        assert!(AnthropicOracle::parse_response(&json!({})).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires ANTHROPIC_API_KEY
    async fn test_anthropic_real_call() {
        let mut s = OracleSettings::default();
        s.apply_env();
        let oracle = AnthropicOracle::new(s).unwrap();
        let reply = oracle
            .decide(&DecisionRequest {
                system_prompt: "Reply with {\"goalAchieved\": true} only.".into(),
                user_prompt: "Go.".into(),
                screenshot: None,
            })
            .await
            .unwrap();
        assert!(reply.contains("goalAchieved"));
    }
}
