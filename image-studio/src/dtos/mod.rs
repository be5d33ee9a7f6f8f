use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
///
/// `prompt` is serde-defaulted so an absent field reaches the handler as an
/// empty string and fails validation with a 400 rather than a
/// deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    /// Source image as a `data:<mime>;base64,<body>` URI when editing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_image: Option<String>,
    /// Per-request credential; takes precedence over the configured key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            aspect_ratio: None,
            image_size: None,
            edit_image: None,
            api_key: None,
        }
    }
}

/// Successful relay response: the generated image as a PNG data URI and an
/// optional caption (empty string when the model produced none).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub image: String,
    pub text: String,
}
