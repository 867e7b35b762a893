use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::collaborator::{ChatCollaborator, CollaboratorReply, TurnRequest};
use crate::config::CollaboratorConfig;
use crate::error::{CollaboratorError, ServiceError, ServiceResult};
use crate::parser::RawGroundingChunk;
use crate::prompts::{build_system_instruction, wrap_user_input};
use crate::transcript::MessageRole;

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &CollaboratorConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                ServiceError::Collaborator(CollaboratorError::Connection {
                    url: config.base_url.clone(),
                    source: e,
                })
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config
                .api_key
                .as_ref()
                .map(|key| SecretString::from(key.expose_secret().to_owned())),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ChatCollaborator for GeminiClient {
    async fn send(&self, request: TurnRequest) -> Result<CollaboratorReply, CollaboratorError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(CollaboratorError::MissingCredential)?;

        let url = self.endpoint();
        let body = build_request(&request);
        debug!(
            model = %self.model,
            history_len = request.history.len(),
            grounded = request.context.location.is_some(),
            "Sending turn to Gemini"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Connection {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(status, "Gemini request failed");
            return Err(CollaboratorError::Generation { status, message });
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| CollaboratorError::Connection {
                url: url.clone(),
                source: e,
            })?;

        decode_reply(&payload)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Parse a `generateContent` response body into a reply
fn decode_reply(body: &[u8]) -> Result<CollaboratorReply, CollaboratorError> {
    let parsed: GenerateContentResponse = serde_json::from_slice(body)
        .map_err(|source| CollaboratorError::InvalidResponse { source })?;
    Ok(parsed.into_reply())
}

fn build_request(request: &TurnRequest) -> GenerateContentRequest {
    let mut contents: Vec<Content> = request
        .history
        .iter()
        .filter_map(|m| {
            let role = match m.role {
                MessageRole::User => "user",
                MessageRole::Model => "model",
                MessageRole::System => return None,
            };
            Some(Content::text(role, &m.text))
        })
        .collect();
    contents.push(Content::text("user", &wrap_user_input(&request.query)));

    GenerateContentRequest {
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: build_system_instruction(&request.context),
            }],
        },
        contents,
        tools: vec![
            Tool {
                google_search: Some(EmptyObject {}),
                google_maps: None,
            },
            Tool {
                google_search: None,
                google_maps: Some(EmptyObject {}),
            },
        ],
        tool_config: request.context.location.map(|point| ToolConfig {
            retrieval_config: RetrievalConfig {
                lat_lng: LatLng {
                    latitude: point.latitude,
                    longitude: point.longitude,
                },
            },
        }),
    }
}

// Internal Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_maps: Option<EmptyObject>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    retrieval_config: RetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfig {
    lat_lng: LatLng,
}

#[derive(Debug, Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<RawGroundingChunk>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's parts, plus its grounding chunks
    fn into_reply(self) -> CollaboratorReply {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return CollaboratorReply::default();
        };

        let text = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();
        let grounding = candidate
            .grounding_metadata
            .map(|g| g.grounding_chunks)
            .unwrap_or_default();

        CollaboratorReply { text, grounding }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, GeoPoint, Intent, Language};
    use crate::parser::ParsedReply;
    use crate::transcript::ChatMessage;

    fn request(location: Option<GeoPoint>) -> TurnRequest {
        TurnRequest {
            context: Context {
                state: "Telangana".to_string(),
                district: "Warangal".to_string(),
                mandal: None,
                village: None,
                intent: Intent::SafetyHealth,
                crop_or_task: "Pesticide spraying".to_string(),
                language: Language::Te,
                location,
            },
            history: vec![
                ChatMessage::user("Is it safe to spray today?"),
                ChatMessage::system_update("SYSTEM UPDATE: Parameters modified."),
                ChatMessage::model(ParsedReply {
                    text: "Avoid spraying in the afternoon.".to_string(),
                    citations: vec![],
                    weather: None,
                }),
            ],
            query: "What protective gear?".to_string(),
        }
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(build_request(&request(None))).unwrap();

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3, "system notices are not sent");
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(
            contents[2]["parts"][0]["text"],
            "\n<USER_INPUT>\nWhat protective gear?\n</USER_INPUT>\n"
        );
        assert!(
            body["systemInstruction"]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("District: Warangal")
        );
        assert_eq!(body["tools"][0], serde_json::json!({"googleSearch": {}}));
        assert_eq!(body["tools"][1], serde_json::json!({"googleMaps": {}}));
        assert!(body.get("toolConfig").is_none());
    }

    #[test]
    fn test_request_biases_retrieval_to_gps() {
        let body = serde_json::to_value(build_request(&request(Some(GeoPoint {
            latitude: 17.5,
            longitude: 78.25,
        }))))
        .unwrap();
        assert_eq!(
            body["toolConfig"]["retrievalConfig"]["latLng"],
            serde_json::json!({"latitude": 17.5, "longitude": 78.25})
        );
    }

    #[test]
    fn test_response_extraction() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Wear gloves. "}, {"text": "Use a mask."}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://icar.org.in", "title": "ICAR"}},
                        {"maps": {"uri": "https://maps.google.com/?cid=1"}}
                    ]
                }
            }]
        }"#;
        let reply = decode_reply(json.as_bytes()).unwrap();
        assert_eq!(reply.text, "Wear gloves. Use a mask.");
        assert_eq!(reply.grounding.len(), 2);
        assert!(reply.grounding[1].web.is_none());
    }

    #[test]
    fn test_empty_response_yields_empty_reply() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let reply = response.into_reply();
        assert!(reply.text.is_empty());
        assert!(reply.grounding.is_empty());
    }

    #[test]
    fn test_malformed_response_keeps_decode_error() {
        let err = decode_reply(b"<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, CollaboratorError::InvalidResponse { .. }));

        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<serde_json::Error>().unwrap().is_syntax());
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_sending() {
        let config = CollaboratorConfig {
            api_key: None,
            ..CollaboratorConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert!(!client.is_configured());

        let err = client.send(request(None)).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::MissingCredential));
    }
}
