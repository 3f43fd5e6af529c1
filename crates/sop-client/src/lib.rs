//! sop-client: remote access and caching for SOP documents.
//!
//! This crate provides:
//! - The [`DocumentGateway`] trait over the REST backend, with an HTTP
//!   implementation and an in-memory double for tests
//! - The write-then-refetch [`DocumentStore`] cache
//! - Upload orchestration against the CDN ([`Uploader`])
//! - JSON import/export of the whole collection

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod store;
pub mod transfer;
pub mod upload;

pub use config::{CdnConfig, Config, ConfigError};
pub use error::ClientError;
pub use gateway::{DocumentGateway, InMemoryGateway};
pub use http::HttpGateway;
pub use store::{DocumentStore, SaveFailed};
pub use transfer::{BACKUP_FILENAME, export_json, parse_import, write_backup};
pub use upload::{FileUpload, UploadProgress, UploadStatus, Uploader};
