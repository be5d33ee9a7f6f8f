use crate::client::form::ImageForm;
use crate::dtos::{GenerateRequest, GenerateResponse};
use reqwest::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay answered with an error body.
    #[error("{0}")]
    Api(String),

    #[error("HTTP request failed: {0}")]
    Network(String),
}

/// HTTP client for the relay, used by tests and embedders that drive an
/// [`ImageForm`] against a running studio instance.
pub struct StudioClient {
    client: Client,
    base_url: String,
}

impl StudioClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// POST one generation request to the relay.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ClientError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                ClientError::Network(e.to_string())
            })?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| ClientError::Network(e.to_string()))
        } else {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["error"]
                .as_str()
                .unwrap_or("Failed to generate image")
                .to_string();
            Err(ClientError::Api(message))
        }
    }

    /// Run one full form cycle: validate and submit the form, send the
    /// request if validation passed, and feed the outcome back into the
    /// form. Returns false when the submission was rejected locally.
    pub async fn submit_form(&self, form: &mut ImageForm) -> bool {
        let Some(request) = form.submit() else {
            return false;
        };

        let outcome = self.generate(&request).await.map_err(|e| e.to_string());
        form.resolve(outcome);
        true
    }
}
