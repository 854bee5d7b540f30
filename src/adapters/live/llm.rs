//! Live adapter for the `LlmClient` port.
//!
//! Three hosted providers are supported; each reads its API key from the
//! environment at call time so that a missing key surfaces as an oracle error
//! for the entry being generated rather than at startup.

use std::env;
use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ports::llm::{CompletionFuture, CompletionRequest, CompletionResponse, LlmClient};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const OPENAI_SYSTEM_MESSAGE: &str = "You are an expert software engineer. Generate code based on \
                                     the specification provided, following the requested output \
                                     format exactly.";

/// Hosted model provider backing the live oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Anthropic messages API.
    #[default]
    Anthropic,
    /// `OpenAI` chat completions API.
    OpenAi,
    /// Google Gemini `generateContent` API.
    Gemini,
}

impl LlmProvider {
    /// Model used when neither `--model` nor `ISLGEN_MODEL` is set.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::OpenAi => "gpt-4o",
            Self::Gemini => "gemini-2.5-flash",
        }
    }

    /// Environment variable holding this provider's API key.
    #[must_use]
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        })
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(format!("unknown provider '{other}' (expected anthropic, openai or gemini)")),
        }
    }
}

/// Live LLM client that calls a hosted provider over HTTPS.
pub struct LiveLlmClient {
    client: Client,
    provider: LlmProvider,
}

impl LiveLlmClient {
    /// Creates a new live client for the given provider.
    #[must_use]
    pub fn new(provider: LlmProvider) -> Self {
        Self { client: Client::new(), provider }
    }
}

impl Default for LiveLlmClient {
    fn default() -> Self {
        Self::new(LlmProvider::default())
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Error envelope shared by the Anthropic, `OpenAI` and Gemini APIs.
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn api_key(provider: LlmProvider) -> Result<String, BoxError> {
    env::var(provider.api_key_var())
        .map_err(|_| format!("{} environment variable not set", provider.api_key_var()).into())
}

impl LiveLlmClient {
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<String, BoxError> {
        let provider = self.provider;
        let response = builder.send().await.map_err(|e| -> BoxError {
            format!("{provider} API request failed: {e}").into()
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| -> BoxError {
            format!("Failed to read {provider} API response: {e}").into()
        })?;

        if !status.is_success() {
            let msg = serde_json::from_str::<ApiError>(&body).map(|e| e.error.message).unwrap_or(body);
            return Err(format!("{provider} API error ({}): {msg}", status.as_u16()).into());
        }
        Ok(body)
    }

    async fn complete_anthropic(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BoxError> {
        let key = api_key(self.provider)?;
        let body = AnthropicRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![ChatMessage { role: "user", content: &request.prompt }],
        };
        let raw = self
            .send(
                self.client
                    .post(ANTHROPIC_API_URL)
                    .header("x-api-key", &key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&body),
            )
            .await?;
        let parsed: AnthropicResponse = serde_json::from_str(&raw)
            .map_err(|e| -> BoxError { format!("Failed to parse anthropic response: {e}").into() })?;
        Ok(CompletionResponse {
            text: parsed.content.into_iter().map(|b| b.text).collect(),
            prompt_tokens: parsed.usage.input_tokens,
            completion_tokens: parsed.usage.output_tokens,
        })
    }

    async fn complete_openai(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BoxError> {
        let key = api_key(self.provider)?;
        let body = OpenAiRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![
                ChatMessage { role: "system", content: OPENAI_SYSTEM_MESSAGE },
                ChatMessage { role: "user", content: &request.prompt },
            ],
        };
        let raw = self.send(self.client.post(OPENAI_API_URL).bearer_auth(&key).json(&body)).await?;
        let parsed: OpenAiResponse = serde_json::from_str(&raw)
            .map_err(|e| -> BoxError { format!("Failed to parse openai response: {e}").into() })?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| -> BoxError { "No content in openai response".into() })?;
        let (prompt_tokens, completion_tokens) =
            parsed.usage.map_or((0, 0), |u| (u.prompt_tokens, u.completion_tokens));
        Ok(CompletionResponse { text, prompt_tokens, completion_tokens })
    }

    async fn complete_gemini(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BoxError> {
        let key = api_key(self.provider)?;
        let body = GeminiRequest {
            contents: vec![GeminiContent { parts: vec![GeminiPart { text: &request.prompt }] }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", request.model);
        let raw = self
            .send(self.client.post(url).query(&[("key", key.as_str())]).json(&body))
            .await?;
        let parsed: GeminiResponse = serde_json::from_str(&raw)
            .map_err(|e| -> BoxError { format!("Failed to parse gemini response: {e}").into() })?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.is_empty() {
            return Err("No content in gemini response".into());
        }
        let (prompt_tokens, completion_tokens) = parsed
            .usage_metadata
            .map_or((0, 0), |u| (u.prompt_token_count, u.candidates_token_count));
        Ok(CompletionResponse { text, prompt_tokens, completion_tokens })
    }
}

impl LlmClient for LiveLlmClient {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            match self.provider {
                LlmProvider::Anthropic => self.complete_anthropic(&request).await,
                LlmProvider::OpenAi => self.complete_openai(&request).await,
                LlmProvider::Gemini => self.complete_gemini(&request).await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAi);
        assert_eq!("gemini".parse::<LlmProvider>().unwrap(), LlmProvider::Gemini);
        assert_eq!("claude".parse::<LlmProvider>().unwrap(), LlmProvider::Anthropic);
        assert!("mystery".parse::<LlmProvider>().unwrap_err().contains("unknown provider"));
    }

    #[test]
    fn each_provider_has_its_own_key_and_model() {
        assert_eq!(LlmProvider::Gemini.api_key_var(), "GEMINI_API_KEY");
        assert_eq!(LlmProvider::OpenAi.default_model(), "gpt-4o");
        assert_eq!(LlmProvider::default(), LlmProvider::Anthropic);
        assert_eq!(LlmProvider::OpenAi.to_string(), "openai");
    }

    #[test]
    fn gemini_request_uses_camel_case_generation_config() {
        let body = GeminiRequest {
            contents: vec![GeminiContent { parts: vec![GeminiPart { text: "hi" }] }],
            generation_config: GeminiGenerationConfig { temperature: 0.2, max_output_tokens: 10 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 10);
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn openai_response_without_usage_parses() {
        let parsed: OpenAiResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"x"}}]}"#).unwrap();
        assert!(parsed.usage.is_none());
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("x"));
    }
}
