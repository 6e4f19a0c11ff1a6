use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::error::RemoteError;

/// Blob-store adapter for file attachments. Objects are addressed as
/// `{bucket}/{object}`; public URLs are derived, not returned by the
/// upload call.
pub struct StorageClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl StorageClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn headers(&self, content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.service_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        if let Ok(ct) = HeaderValue::from_str(content_type) {
            headers.insert(CONTENT_TYPE, ct);
        }
        headers
    }

    pub async fn upload(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, object);
        debug!("uploading {} bytes to {}/{}", bytes.len(), bucket, object);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(content_type))
            .body(bytes)
            .send()
            .await
            .map_err(RemoteError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(RemoteError::new(Some(status.as_u16()), message));
        }
        Ok(())
    }

    /// Retrieval URL for a stored object.
    pub fn public_url(&self, bucket: &str, object: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, object
        )
    }

    /// Best-effort removal. An object that is already gone, or any other
    /// provider failure, is logged and swallowed; callers proceed.
    pub async fn remove(&self, bucket: &str, object: &str) {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, object);
        let result = self
            .client
            .delete(&url)
            .headers(self.headers("application/json"))
            .send()
            .await;
        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    "blob removal {}/{} failed with status {}",
                    bucket,
                    object,
                    response.status()
                );
            }
            Err(err) => warn!("blob removal {}/{} failed: {}", bucket, object, err),
            _ => {}
        }
    }
}
