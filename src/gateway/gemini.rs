use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GatewayError, Rewriter, build_prompt};

/// Rewrites text through the Gemini `generateContent` REST endpoint.
pub struct GeminiRewriter {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiRewriter {
    pub fn new(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            api_key,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    fn build_request(input: &str) -> ApiRequest {
        ApiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(input)),
                }],
            }],
        }
    }

    /// Join the text parts of the first candidate.
    fn parse_response(body: &str) -> Result<String, GatewayError> {
        let resp: ApiResponse =
            serde_json::from_str(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or(GatewayError::Empty)?;

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        let text = text.trim();
        if text.is_empty() {
            return Err(GatewayError::Empty);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl Rewriter for GeminiRewriter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn rewrite(&self, input: &str) -> Result<String, GatewayError> {
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&Self::build_request(input))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Self::parse_response(&body)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}
