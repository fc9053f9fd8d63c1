//! Bindings for the receiving document service.
//!
//! ```no_run
//! # async fn run() -> receiving_docs_api::Result<()> {
//! use receiving_docs_api::{Client, ClientConfig, DocumentFile};
//!
//! let client = Client::new(ClientConfig::from_env()?, reqwest::Client::new());
//! let listing = client.get_documents().await?;
//! let uploaded = client
//!     .upload_document(DocumentFile::new("report.pdf", std::fs::read("report.pdf")?))
//!     .await?;
//! # let _ = (listing, uploaded);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod documents;
mod error;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_API_ENDPOINT, ENDPOINT_ENV_VAR};
pub use documents::{DocumentFile, UPLOAD_FIELD};
pub use error::{Error, Result};
pub use serde_json::Value;
