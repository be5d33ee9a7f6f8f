use crate::dtos::{GenerateRequest, GenerateResponse};
use crate::services::providers::{ImageRequest, ProviderError};
use crate::startup::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use service_core::error::AppError;

const DEFAULT_ASPECT_RATIO: &str = "1:1";
const DEFAULT_IMAGE_SIZE: &str = "1K";

/// `POST /api/generate`: validate, relay one call to the image provider,
/// normalize the result into `{image, text}`.
pub async fn generate_image(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("Prompt required")));
    }

    // Explicit key wins over the process-wide default.
    let api_key = request
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| state.config.default_api_key())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("API key required")))?
        .to_string();

    let source_image = request
        .edit_image
        .as_deref()
        .map(strip_data_uri)
        .transpose()?
        .map(str::to_string);

    let image_request = ImageRequest {
        prompt: request.prompt.clone(),
        model: request
            .model
            .unwrap_or_else(|| state.config.models.image_model.clone()),
        aspect_ratio: request
            .aspect_ratio
            .unwrap_or_else(|| DEFAULT_ASPECT_RATIO.to_string()),
        image_size: request
            .image_size
            .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
        source_image,
    };

    let generated = state
        .provider
        .generate(&image_request, &api_key)
        .await
        .map_err(|e| {
            tracing::error!(
                model = %image_request.model,
                error = %e,
                "Image generation failed"
            );
            match e {
                ProviderError::NoCandidates | ProviderError::NoImagePart => {
                    AppError::Upstream(e.to_string())
                }
                ProviderError::ApiError(msg)
                | ProviderError::NetworkError(msg)
                | ProviderError::NotConfigured(msg) => AppError::Upstream(msg),
            }
        })?;

    Ok(Json(GenerateResponse {
        image: format!("data:image/png;base64,{}", generated.image_base64),
        text: generated.caption.unwrap_or_default(),
    }))
}

/// Extract the raw base64 body from a `data:<mime>;base64,<body>` URI.
fn strip_data_uri(uri: &str) -> Result<&str, AppError> {
    match uri.split_once(',') {
        Some((prefix, body)) if prefix.starts_with("data:") => Ok(body),
        _ => Err(AppError::BadRequest(anyhow::anyhow!(
            "editImage must be a base64 data URI"
        ))),
    }
}
