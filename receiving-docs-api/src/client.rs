use serde_json::Value;

use crate::config::ClientConfig;
use crate::documents::DocumentFile;
use crate::error::Result;

/// Thin wrapper over the document service routes.
///
/// Every call is a single request. Response bodies are handed back as
/// [`serde_json::Value`] without any schema check: JSON is parsed as-is and an
/// empty body is `null`. Any other body comes back as a string, decoded
/// lossily, so bytes that are not valid UTF-8 become U+FFFD and can't be
/// recovered. Failures are logged once through `tracing` and then returned to
/// the caller unchanged.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl Client {
    pub fn new(config: ClientConfig, http_client: reqwest::Client) -> Self {
        Client {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get_documents(&self) -> Result<Value> {
        logged("Error fetching documents", self.fetch_documents().await)
    }

    pub async fn get_documents_for_order(&self, order_id: &str) -> Result<Value> {
        logged(
            "Error fetching documents for order",
            self.fetch_documents_for_order(order_id).await,
        )
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Value> {
        logged(
            "Error fetching document",
            self.fetch_document(document_id).await,
        )
    }

    pub async fn upload_document(&self, file: DocumentFile) -> Result<Value> {
        logged("Error uploading document", self.send_document(file).await)
    }

    pub async fn delete_document(&self, document_id: &str) -> Result<Value> {
        logged(
            "Error deleting document",
            self.remove_document(document_id).await,
        )
    }

    async fn fetch_documents(&self) -> Result<Value> {
        let url = self.config.documents_url();
        tracing::debug!(%url, "listing documents");
        let response = self.http_client.get(&url).send().await?;
        read_body(response).await
    }

    async fn fetch_documents_for_order(&self, order_id: &str) -> Result<Value> {
        let url = self.config.documents_url();
        tracing::debug!(%url, order_id, "listing documents for order");
        let request = self
            .http_client
            .get(&url)
            .query(&[("order_id", order_id)]);
        read_body(request.send().await?).await
    }

    async fn fetch_document(&self, document_id: &str) -> Result<Value> {
        let url = self.config.document_url(document_id)?;
        tracing::debug!(%url, "fetching document");
        let response = self.http_client.get(url).send().await?;
        read_body(response).await
    }

    async fn send_document(&self, file: DocumentFile) -> Result<Value> {
        let url = self.config.upload_url();
        tracing::debug!(%url, file_name = %file.file_name, size = file.len(), "uploading document");
        // reqwest fills in `multipart/form-data; boundary=...` for us.
        let request = self.http_client.post(&url).multipart(file.into_form()?);
        read_body(request.send().await?).await
    }

    async fn remove_document(&self, document_id: &str) -> Result<Value> {
        let url = self.config.document_url(document_id)?;
        tracing::debug!(%url, "deleting document");
        let response = self.http_client.delete(url).send().await?;
        read_body(response).await
    }
}

fn logged<T>(context: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        tracing::error!(error = %err, "{}", context);
    }
    result
}

async fn read_body(response: reqwest::Response) -> Result<Value> {
    let bytes = response.error_for_status()?.bytes().await?;
    Ok(body_to_value(&bytes))
}

fn body_to_value(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
