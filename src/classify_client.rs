use anyhow::{Context, Result};
use reqwest::multipart;
use serde::Deserialize;

use crate::document_store::InputFile;

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(rename = "newName")]
    new_name: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeErrorBody {
    error: Option<String>,
}

/// Client for the document classification service. The service is opaque:
/// it receives the raw payload and original name, and answers with a
/// proposed filename. No client-side timeout is imposed; latency is
/// unbounded by contract.
#[derive(Debug, Clone)]
pub struct ClassifyClient {
    client: reqwest::Client,
    analyze_url: String,
}

impl ClassifyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            analyze_url: format!("{}/analyze", base_url.trim_end_matches('/')),
        }
    }

    pub fn analyze_url(&self) -> &str {
        &self.analyze_url
    }

    /// Send one file for classification and return the proposed filename.
    ///
    /// Non-success responses prefer the server-supplied error message and
    /// fall back to a status-derived one. An empty proposed name counts as
    /// a malformed response.
    pub async fn analyze(&self, file: &InputFile) -> Result<String> {
        let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(media_type) = &file.media_type {
            part = part
                .mime_str(media_type)
                .with_context(|| format!("Invalid media type: {media_type}"))?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.analyze_url)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach classification service")?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<AnalyzeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            return Err(anyhow::anyhow!(message));
        }

        let result: AnalyzeResponse = response
            .json()
            .await
            .context("Malformed classification response")?;

        if result.new_name.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "Classification service returned an empty filename"
            ));
        }

        Ok(result.new_name)
    }
}
