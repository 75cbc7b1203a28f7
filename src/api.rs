// API client module: a small blocking HTTP client that uploads one file to
// a Fedora Commons repository through its LDP REST interface. A single PUT
// creates a NonRDFSource (binary) under a freshly generated identifier.

use crate::config::FedoraConfig;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, LINK};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const NON_RDF_SOURCE_LINK: &str = "<http://www.w3.org/ns/ldp#NonRDFSource>; rel=\"type\"";
pub const SLUG: &str = "Slug";

/// Everything that can go wrong during one upload. The `Display` text is
/// the message shown to the user.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(
        "Fedora connection error: {0}\nCannot connect to Fedora. Please check if Fedora is running."
    )]
    Connection(#[source] reqwest::Error),

    #[error("Upload failed with status {code}: {body}", code = .status.as_u16())]
    Rejected { status: StatusCode, body: String },

    #[error("Error uploading file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error uploading file: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            UploadError::Connection(e)
        } else {
            UploadError::Transport(e)
        }
    }
}

/// One planned upload: where the bytes come from and where they go.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_path: PathBuf,
    pub file_name: String,
    pub extension: Option<String>,
    pub generated_id: Uuid,
    pub target_url: String,
}

impl UploadRequest {
    /// Plan an upload of `file_path` below `base_url`. A new v4 UUID is
    /// drawn on every call. The file name becomes the `Slug` header, so it
    /// must be valid UTF-8.
    pub fn new(file_path: &Path, base_url: &str) -> Result<Self, UploadError> {
        let file_name = match file_path.file_name() {
            Some(name) => name.to_str().map(str::to_owned).ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("file name is not valid UTF-8: {}", file_path.display()),
                )
            })?,
            None => String::new(),
        };
        let extension = file_path
            .extension()
            .map(|s| s.to_string_lossy().into_owned());
        let generated_id = Uuid::new_v4();
        let target_url = format!("{}/{}", base_url.trim_end_matches('/'), generated_id);
        Ok(UploadRequest {
            file_path: file_path.to_path_buf(),
            file_name,
            extension,
            generated_id,
            target_url,
        })
    }
}

/// A finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    /// The URL the file was PUT to.
    pub uri: String,
    pub file_name: String,
    pub status: u16,
}

impl Uploaded {
    /// The URI as seen from outside: `base_url` swapped for the configured
    /// public URL, if any.
    pub fn public_uri(&self, config: &FedoraConfig) -> String {
        match &config.public_base_url {
            Some(public) => match self.uri.strip_prefix(&config.base_url) {
                Some(rest) => format!("{}{}", public, rest),
                None => self.uri.clone(),
            },
            None => self.uri.clone(),
        }
    }
}

/// Blocking client bound to one Fedora repository.
#[derive(Clone)]
pub struct FedoraClient {
    client: Client,
    config: FedoraConfig,
}

impl FedoraClient {
    /// Build the underlying HTTP client. The configured timeout bounds the
    /// whole request/response exchange.
    pub fn new(config: FedoraConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FedoraClient { client, config })
    }

    pub fn config(&self) -> &FedoraConfig {
        &self.config
    }

    /// Upload `file_path` as a binary resource under a new identifier.
    /// Success statuses are 201 and 204; the returned URI is always the
    /// target URL, never something taken from the response.
    pub fn upload(&self, file_path: &Path) -> Result<Uploaded, UploadError> {
        if !file_path.exists() {
            return Err(UploadError::NotFound(file_path.to_path_buf()));
        }

        let req = UploadRequest::new(file_path, &self.config.base_url)?;
        debug!(
            file = %req.file_path.display(),
            extension = req.extension.as_deref().unwrap_or(""),
            target = %req.target_url,
            "prepared upload"
        );

        let content = std::fs::read(&req.file_path)?;
        debug!(bytes = content.len(), "read file");

        let res = self
            .client
            .put(&req.target_url)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .header(LINK, NON_RDF_SOURCE_LINK)
            .header(SLUG, req.file_name.as_str())
            .basic_auth(&self.config.username, Some(&self.config.password))
            .body(content)
            .send()?;

        let status = res.status();
        if status == StatusCode::CREATED || status == StatusCode::NO_CONTENT {
            info!(uri = %req.target_url, status = status.as_u16(), "uploaded");
            return Ok(Uploaded {
                uri: req.target_url,
                file_name: req.file_name,
                status: status.as_u16(),
            });
        }

        let body = res.text().unwrap_or_else(|_| "".into());
        warn!(status = status.as_u16(), "upload rejected");
        Err(UploadError::Rejected { status, body })
    }
}
