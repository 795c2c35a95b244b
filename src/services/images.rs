use std::time::Duration;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;

const SUPPORTED_FORMATS: &[&str] = &["png", "jpeg", "jpg", "webp", "gif"];

/// Checks `data:image/<fmt>;base64,<payload>` framing and that the payload is
/// non-empty, decodable base64.
pub(crate) fn validate_data_uri(value: &str) -> Result<(), String> {
    let Some(rest) = value.strip_prefix("data:image/") else {
        return Err("image must be a base64 data URI".to_string());
    };

    let Some((format, payload)) = rest.split_once(";base64,") else {
        return Err("image must be a base64 data URI".to_string());
    };

    if !SUPPORTED_FORMATS.contains(&format.to_ascii_lowercase().as_str()) {
        return Err(format!("unsupported image format {format}"));
    }

    if payload.is_empty() {
        return Err("image data is empty".to_string());
    }

    if STANDARD.decode(payload).is_err() {
        return Err("image data is not valid base64".to_string());
    }

    Ok(())
}

/// Client for the external image-hosting upload service. When the endpoint is
/// not configured, callers fall back to storing the data URI directly.
#[derive(Debug, Clone)]
pub(crate) struct ImageHostService {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ImageHostService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let images = settings.images();
        if images.endpoint.is_empty() || images.api_key.is_empty() {
            return Ok(None);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(images.request_timeout_seconds))
            .build()
            .context("Failed to build image host client")?;

        Ok(Some(Self {
            client,
            endpoint: images.endpoint.clone(),
            api_key: images.api_key.clone(),
        }))
    }

    /// Uploads a validated data URI and returns the hosted URL.
    pub(crate) async fn upload(&self, data_uri: &str) -> Result<String> {
        let payload = data_uri.split_once(";base64,").map(|(_, data)| data).unwrap_or(data_uri);

        let response = self
            .client
            .post(format!("{}/upload", self.endpoint.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&json!({ "image": payload }))
            .send()
            .await
            .context("Image host request failed")?
            .error_for_status()
            .context("Image host rejected the upload")?;

        let body: Value = response.json().await.context("Invalid image host response")?;
        body.get("url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("Image host response missing url")
    }
}

/// Resolves a data URI to a stored URL, inlining it when no host is configured.
pub(crate) async fn store_image(host: Option<&ImageHostService>, data_uri: &str) -> String {
    match host {
        Some(host) => match host.upload(data_uri).await {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(error = %err, "Image upload failed; storing inline data URI");
                data_uri.to_string()
            }
        },
        None => data_uri.to_string(),
    }
}
