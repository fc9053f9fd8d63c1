use std::env;
use std::fs;
use std::io;
use std::path;

use reqwest::Url;

use crate::error::{Error, Result};

/// Placeholder API Gateway stage used when nothing else is configured.
pub const DEFAULT_API_ENDPOINT: &str =
    "https://your-api-gateway-url.execute-api.region.amazonaws.com/dev";

/// Environment variable consulted by [`ClientConfig::from_env`].
pub const ENDPOINT_ENV_VAR: &str = "RECEIVING_DOCS_ENDPOINT";

const DOCUMENTS_PATH: &str = "documents";
const UPLOAD_PATH: &str = "documents/upload";

/// Where the document service lives.
///
/// The endpoint is validated once when the config is built and is read-only
/// afterwards. Request URLs are built relative to it.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "StoredConfig")]
pub struct ClientConfig {
    endpoint: String,
}

// On-disk shape; goes through `ClientConfig::new` so a hand-edited file
// can't smuggle in a bad endpoint.
#[derive(serde::Deserialize)]
struct StoredConfig {
    endpoint: String,
}

impl std::convert::TryFrom<StoredConfig> for ClientConfig {
    type Error = Error;

    fn try_from(stored: StoredConfig) -> Result<Self> {
        ClientConfig::new(stored.endpoint)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new<S>(endpoint: S) -> Result<Self>
    where
        S: Into<String>,
    {
        let raw = endpoint.into();
        let endpoint = raw.trim().trim_end_matches('/');
        let invalid = || Error::InvalidEndpoint {
            endpoint: raw.clone(),
        };

        if endpoint.is_empty() {
            return Err(invalid());
        }
        let url = Url::parse(endpoint).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(invalid());
        }
        // Route paths are appended to the endpoint, so it has to end in a path.
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid());
        }

        Ok(ClientConfig {
            endpoint: endpoint.to_string(),
        })
    }

    /// Reads the endpoint from `RECEIVING_DOCS_ENDPOINT`, falling back to
    /// [`DEFAULT_API_ENDPOINT`] when it is unset or blank.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(env::var(ENDPOINT_ENV_VAR).ok())
    }

    fn from_env_value(value: Option<String>) -> Result<Self> {
        match value {
            Some(v) if !v.trim().is_empty() => Self::new(v),
            _ => Ok(Self::default()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn load<R>(&mut self, f: R) -> Result<()>
    where
        R: io::Read,
    {
        #[allow(clippy::unit_arg)]
        Ok(*self = serde_json::from_reader(f)?)
    }

    pub fn load_from_path(&mut self, p: &path::Path) -> Result<()> {
        self.load(io::BufReader::new(fs::File::open(p)?))
    }

    pub fn save<W>(&self, f: W) -> Result<()>
    where
        W: io::Write,
    {
        Ok(serde_json::to_writer_pretty(f, self)?)
    }

    pub fn save_to_path(&self, p: &path::Path) -> Result<()> {
        // TODO: Make this be properly atomic
        self.save(io::BufWriter::new(fs::File::create(p)?))
    }

    pub fn documents_url(&self) -> String {
        format!("{}/{}", self.endpoint, DOCUMENTS_PATH)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/{}", self.endpoint, UPLOAD_PATH)
    }

    /// URL of a single document. The id is percent-encoded as one path segment.
    pub fn document_url(&self, document_id: &str) -> Result<Url> {
        let invalid = || Error::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
        };
        let mut url = Url::parse(&self.endpoint).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(DOCUMENTS_PATH)
            .push(document_id);
        Ok(url)
    }
}
