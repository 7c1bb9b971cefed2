use std::path::Path;

use async_trait::async_trait;
use common::gateway::{Classification, DocumentClassifier, GatewayError};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Response of the classification service's `/upload/` endpoint.
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    document_type: String,
    #[serde(default)]
    extracted_text: Option<String>,
    #[serde(default)]
    extracted_dates: Vec<String>,
}

/// Classification service reached over HTTP: the document is posted as the
/// multipart field `pdf` to `{base_url}/upload/`.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/upload/", base_url.trim_end_matches('/')),
        }
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    GatewayError::Unavailable(format!("classifier request failed: {err}"))
}

#[async_trait]
impl DocumentClassifier for HttpClassifier {
    async fn classify(&self, path: &Path, filename: &str) -> Result<Classification, GatewayError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| GatewayError::Unavailable(format!("staged file unreadable: {e}")))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("staged file unreadable: {e}")))?
            .len();
        let mime = mime_guess::from_path(filename).first_or_octet_stream();

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), size)
            .file_name(filename.to_string())
            .mime_str(mime.as_ref())
            .map_err(transport_error)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Form::new().part("pdf", part))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
                GatewayError::Rejected(format!("{status}: {body}"))
            } else {
                GatewayError::Unavailable(format!("{status}: {body}"))
            });
        }

        let body: ClassifyResponse = response.json().await.map_err(|e| {
            GatewayError::Unavailable(format!("unreadable classifier response: {e}"))
        })?;
        debug!(filename, reported = %body.document_type, "Document classified");

        Ok(Classification {
            extracted_text: body.extracted_text,
            extracted_dates: body.extracted_dates,
            ..Classification::from_reported(body.document_type)
        })
    }
}
