//! Gemini image provider implementation.
//!
//! Calls Google's `generateContent` endpoint requesting mixed TEXT+IMAGE
//! output, optionally conditioning on a source image for edits.

use super::{GeneratedImage, ImageProvider, ImageRequest, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// The only model that accepts explicit aspect-ratio/size controls.
const SIZED_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

/// Gemini image provider.
pub struct GeminiImageProvider {
    client: Client,
    api_base: String,
}

impl GeminiImageProvider {
    pub fn new(api_base: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base: api_base.into(),
        }
    }

    /// Build the API URL for the given model, with the credential as a
    /// query parameter per the Gemini auth scheme.
    fn api_url(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, model, api_key
        )
    }

    /// Assemble the wire request: a single user turn with the prompt and,
    /// when editing, the source image inline.
    fn build_request(request: &ImageRequest) -> GenerateContentRequest {
        let mut parts = vec![ContentPart::Text {
            text: request.prompt.clone(),
        }];

        if let Some(data) = &request.source_image {
            parts.push(ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: "image/png".to_string(),
                    data: data.clone(),
                },
            });
        }

        // Only the sized model understands imageConfig; other models reject
        // unknown generation settings.
        let image_config = if request.model == SIZED_IMAGE_MODEL {
            Some(ImageConfig {
                aspect_ratio: request.aspect_ratio.clone(),
                image_size: request.image_size.clone(),
            })
        } else {
            None
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
                image_config,
            }),
        }
    }
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    async fn generate(
        &self,
        request: &ImageRequest,
        api_key: &str,
    ) -> Result<GeneratedImage, ProviderError> {
        let body = Self::build_request(request);
        let url = self.api_url(&request.model, api_key);

        tracing::debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            editing = request.source_image.is_some(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or(ProviderError::NoCandidates)?;

        let scanned = scan_parts(candidate.content.parts);
        let image_base64 = scanned.image.ok_or(ProviderError::NoImagePart)?;

        Ok(GeneratedImage {
            image_base64,
            caption: scanned.text,
        })
    }
}

/// First text part and first inline-image part of a candidate, either of
/// which may be absent.
#[derive(Debug, Default, PartialEq, Eq)]
struct ScannedParts {
    text: Option<String>,
    image: Option<String>,
}

/// Single linear scan over a candidate's ordered parts.
fn scan_parts(parts: Vec<ContentPart>) -> ScannedParts {
    let mut scanned = ScannedParts::default();

    for part in parts {
        match part {
            ContentPart::Text { text } => {
                if scanned.text.is_none() {
                    scanned.text = Some(text);
                }
            }
            ContentPart::InlineData { inline_data } => {
                if scanned.image.is_none() {
                    scanned.image = Some(inline_data.data);
                }
            }
        }
    }

    scanned
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
    image_size: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_request(model: &str, source_image: Option<&str>) -> ImageRequest {
        ImageRequest {
            prompt: "a lighthouse at dusk".to_string(),
            model: model.to_string(),
            aspect_ratio: "16:9".to_string(),
            image_size: "2K".to_string(),
            source_image: source_image.map(|s| s.to_string()),
        }
    }

    #[test]
    fn scan_takes_first_text_and_first_image() {
        let parts = vec![
            ContentPart::Text {
                text: "first caption".to_string(),
            },
            ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: "image/png".to_string(),
                    data: "AAAA".to_string(),
                },
            },
            ContentPart::Text {
                text: "second caption".to_string(),
            },
            ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: "image/png".to_string(),
                    data: "BBBB".to_string(),
                },
            },
        ];

        let scanned = scan_parts(parts);
        assert_eq!(scanned.text.as_deref(), Some("first caption"));
        assert_eq!(scanned.image.as_deref(), Some("AAAA"));
    }

    #[test]
    fn scan_of_empty_parts_yields_nothing() {
        assert_eq!(scan_parts(vec![]), ScannedParts::default());
    }

    #[test]
    fn scan_without_image_part_has_no_image() {
        let parts = vec![ContentPart::Text {
            text: "words only".to_string(),
        }];

        let scanned = scan_parts(parts);
        assert_eq!(scanned.text.as_deref(), Some("words only"));
        assert!(scanned.image.is_none());
    }

    #[test]
    fn edit_request_carries_inline_image_after_prompt() {
        let body = GeminiImageProvider::build_request(&image_request("gemini-2.0-flash-exp", Some("QUJD")));
        let json = serde_json::to_value(&body).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "a lighthouse at dusk");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "QUJD");
    }

    #[test]
    fn image_config_only_for_sized_model() {
        let plain = GeminiImageProvider::build_request(&image_request("gemini-2.0-flash-exp", None));
        let plain_json = serde_json::to_value(&plain).unwrap();
        assert!(plain_json["generationConfig"].get("imageConfig").is_none());
        assert_eq!(
            plain_json["generationConfig"]["responseModalities"],
            serde_json::json!(["TEXT", "IMAGE"])
        );

        let sized = GeminiImageProvider::build_request(&image_request(SIZED_IMAGE_MODEL, None));
        let sized_json = serde_json::to_value(&sized).unwrap();
        assert_eq!(
            sized_json["generationConfig"]["imageConfig"]["aspectRatio"],
            "16:9"
        );
        assert_eq!(
            sized_json["generationConfig"]["imageConfig"]["imageSize"],
            "2K"
        );
    }

    #[test]
    fn response_parts_deserialize_as_text_or_inline_data() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "a caption" },
                        { "inlineData": { "mimeType": "image/png", "data": "Zm9v" } }
                    ]
                }
            }]
        });

        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let scanned = scan_parts(response.candidates.into_iter().next().unwrap().content.parts);
        assert_eq!(scanned.text.as_deref(), Some("a caption"));
        assert_eq!(scanned.image.as_deref(), Some("Zm9v"));
    }
}
