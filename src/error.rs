use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to read EXIF from '{path}': {source}")]
    ExifRead { path: PathBuf, source: exif::Error },

    #[error("Failed to delete '{path}': {source}")]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read credential file '{path}': {source}")]
    CredentialRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid credential file '{path}': {source}")]
    CredentialParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to store token '{path}': {source}")]
    TokenStore {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Token request failed: {source}")]
    TokenRequest { source: reqwest::Error },

    #[error("Token endpoint rejected the request: HTTP {status}")]
    TokenRejected { status: u16 },

    #[error("Failed to read '{path}' for upload: {source}")]
    UploadRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to upload '{path}': {source}")]
    UploadRequest {
        path: PathBuf,
        source: reqwest::Error,
    },

    #[error("Upload of '{path}' rejected: HTTP {status}")]
    UploadRejected { path: PathBuf, status: u16 },

    #[error("Could not register '{name}' in the library: {message}")]
    MediaItemCreate { name: String, message: String },
}
