use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::GeminiConfig;
use crate::error::ModelError;

/// One schema-constrained call to a hosted generative model.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub parts: Vec<Part>,
    pub response_schema: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(Blob),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn inline(mime_type: &str, data: impl Into<String>) -> Self {
        Part::InlineData(Blob {
            mime_type: mime_type.to_string(),
            data: data.into(),
        })
    }
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Returns the response text, or `None` when the model produced none.
    async fn generate(&self, req: GenerateRequest) -> Result<Option<String>, ModelError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: &'a [Part],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Gemini `generateContent` over REST.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl Gemini {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
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

#[async_trait]
impl GenerativeModel for Gemini {
    async fn generate(&self, req: GenerateRequest) -> Result<Option<String>, ModelError> {
        let body = GenerateContentBody {
            contents: [Content {
                role: "user",
                parts: &req.parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &req.response_schema,
            },
        };

        debug!(model = %self.config.model, parts = req.parts.len(), "generateContent");
        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let raw = res.text().await?;
        if !status.is_success() {
            error!(%status, "model endpoint error");
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: raw,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(ModelError::Envelope)?;
        Ok(parsed.text())
    }
}


#[cfg(test)]
mod tests {
    use axum::{extract::Path, http::HeaderMap, routing::post, Json, Router};
    use serde_json::json;

    use super::*;

    async fn spawn_endpoint(reply: Value) -> String {
        let app = Router::new().route(
            "/v1beta/models/:call",
            post(move |Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    assert_eq!(call, "test-model:generateContent");
                    assert_eq!(headers["x-goog-api-key"], "k-123");
                    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
                    assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
                    Json(reply)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn client(base_url: String) -> Gemini {
        Gemini::new(GeminiConfig {
            api_key: "k-123".into(),
            model: "test-model".into(),
            base_url,
        })
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            parts: vec![Part::text("hello")],
            response_schema: json!({"type": "OBJECT"}),
        }
    }

    #[test]
    fn parts_serialize_in_gemini_shape() {
        let parts = vec![Part::inline("image/jpeg", "AAAA"), Part::text("hi")];
        let v = serde_json::to_value(parts).unwrap();
        assert_eq!(v[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(v[0]["inlineData"]["data"], "AAAA");
        assert_eq!(v[1]["text"], "hi");
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let r: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(r.text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert_eq!(empty.text(), None);

        let blocked: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert_eq!(blocked.text(), None);
    }

    #[tokio::test]
    async fn gemini_returns_candidate_text() {
        let base = spawn_endpoint(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "{\"ok\":true}"}]}}]
        }))
        .await;
        let text = client(base).generate(request()).await.unwrap();
        assert_eq!(text.as_deref(), Some("{\"ok\":true}"));
    }

    #[tokio::test]
    async fn gemini_maps_missing_text_to_none() {
        let base = spawn_endpoint(json!({"candidates": []})).await;
        assert!(client(base).generate(request()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn gemini_surfaces_http_errors() {
        let app = Router::new().route(
            "/v1beta/models/:call",
            post(|| async { (axum::http::StatusCode::FORBIDDEN, "API key not valid") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let err = client(format!("http://{}", addr)).generate(request()).await.unwrap_err();
        match err {
            ModelError::Status { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("API key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
