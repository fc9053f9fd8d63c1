use std::io;
use std::result;

use derive_more::{Display, Error, From};

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Display, Error, From)]
pub enum Error {
    #[display(fmt = "invalid API endpoint {:?}", endpoint)]
    #[from(ignore)]
    InvalidEndpoint { endpoint: String },
    #[display(fmt = "path has no file name")]
    #[from(ignore)]
    MissingFileName,
    IoError { source: io::Error },
    // Connection failures, non-2xx statuses and body read errors all land here.
    HttpError { source: reqwest::Error },
    JsonError { source: serde_json::Error },
}
