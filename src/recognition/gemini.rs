//! Gemini `generateContent` client

use serde::{Deserialize, Serialize};

use super::{Credential, InlineImage, RecognitionService};
use crate::config::Settings;
use crate::error::{SpendlogError, SpendlogResult};

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            base_url: settings.recognition_url,
            model: settings.recognition_model,
        }
    }
}

impl From<&Settings> for GeminiConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            base_url: settings.recognition_url.clone(),
            model: settings.recognition_model.clone(),
        }
    }
}

/// Blocking Gemini client
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

fn build_request<'a>(prompt: &'a str, images: &'a [InlineImage]) -> GenerateRequest<'a> {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(Part::Text { text: prompt });
    parts.extend(images.iter().map(|image| Part::Inline {
        inline_data: InlineData {
            mime_type: &image.mime_type,
            data: &image.data,
        },
    }));
    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

/// Concatenate the text parts of the first candidate
fn response_text(response: GenerateResponse) -> SpendlogResult<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(SpendlogError::ExternalService(
            "response contained no text".into(),
        ));
    }
    Ok(text)
}

impl RecognitionService for GeminiClient {
    fn infer(
        &self,
        credential: &Credential,
        prompt: &str,
        images: &[InlineImage],
    ) -> SpendlogResult<String> {
        let request = build_request(prompt, images);

        tracing::debug!(model = %self.config.model, images = images.len(), "calling gemini");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", credential.expose())])
            .json(&request)
            .send()
            .map_err(|e| SpendlogError::ExternalService(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SpendlogError::ExternalService(format!(
                "HTTP {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| SpendlogError::ExternalService(e.without_url().to_string()))?;
        response_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let images = vec![InlineImage {
            mime_type: "image/png".into(),
            data: "AAAA".into(),
        }];
        let value = serde_json::to_value(build_request("hello", &images)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "contents": [{
                    "parts": [
                        {"text": "hello"},
                        {"inline_data": {"mime_type": "image/png", "data": "AAAA"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"[{\"a\":"},{"text":"1}]"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response_text(response).unwrap(), r#"[{"a":1}]"#);
    }

    #[test]
    fn test_empty_response_is_error() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            response_text(response),
            Err(SpendlogError::ExternalService(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(GeminiConfig {
            base_url: "http://localhost:9/".into(),
            model: "gemini-2.5-flash".into(),
        });
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
