//! Upload orchestration against the CDN.
//!
//! Image files go to the image endpoint, everything else to the raw
//! endpoint. The raw endpoint serves files inline by default, which is wrong
//! for a "Download" action, so non-image attachments get a content
//! disposition (`fl_attachment`) URL variant recorded next to the inline
//! one: `download_url` always saves to disk, `url` is always safe to embed.
//!
//! Multi-file batches upload concurrently; each file's outcome is
//! independent and observable mid-flight through [`UploadProgress`].

use crate::config::CdnConfig;
use crate::error::ClientError;
use serde::Deserialize;
use sop_core::model::{Attachment, AttachmentKind};
use std::sync::{Arc, RwLock};

const UPLOAD_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DELIVERY_BASE: &str = "https://res.cloudinary.com";

/// Chunk size for streaming the multipart body (progress granularity).
const CHUNK_SIZE: usize = 64 * 1024;

/// A file picked for upload: raw bytes plus the metadata the CDN and the
/// resulting attachment record need.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Per-file state of a running batch.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Uploading { percent: u8 },
    Done(Attachment),
    Failed(String),
}

/// Shared, snapshot-able view of a batch's per-file statuses.
#[derive(Debug, Clone, Default)]
pub struct UploadProgress {
    slots: Arc<RwLock<Vec<UploadStatus>>>,
}

impl UploadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status of every file in the batch, in submission order.
    pub fn snapshot(&self) -> Vec<UploadStatus> {
        self.read().clone()
    }

    fn reset(&self, count: usize) {
        *self.write() = vec![UploadStatus::Uploading { percent: 0 }; count];
    }

    fn set(&self, index: usize, status: UploadStatus) {
        let mut slots = self.write();
        if let Some(slot) = slots.get_mut(index) {
            *slot = status;
        }
    }

    fn set_percent(&self, index: usize, percent: u8) {
        let mut slots = self.write();
        if let Some(slot) = slots.get_mut(index) {
            // terminal states win over late progress updates
            if matches!(slot, UploadStatus::Uploading { .. }) {
                *slot = UploadStatus::Uploading { percent };
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<UploadStatus>> {
        self.slots.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<UploadStatus>> {
        self.slots.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Response body of the upload endpoint (extra fields ignored).
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    #[serde(default)]
    public_id: Option<String>,
}

pub struct Uploader {
    client: reqwest::Client,
    cdn: Option<CdnConfig>,
}

impl Uploader {
    /// Build an uploader. `cdn: None` is valid; every upload will then be
    /// rejected locally with a configuration error before any network call.
    pub fn new(cdn: Option<CdnConfig>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Upload(e.to_string()))?;
        Ok(Self { client, cdn })
    }

    /// Upload one file and build its attachment record.
    pub async fn upload(&self, file: &FileUpload) -> Result<Attachment, ClientError> {
        self.upload_tracked(file, None).await
    }

    /// Upload a batch. Files go up concurrently; one failure never aborts
    /// the others. Returns final statuses in submission order; `progress`
    /// can be snapshotted from elsewhere while the batch runs.
    pub async fn upload_many(
        &self,
        files: &[FileUpload],
        progress: &UploadProgress,
    ) -> Vec<UploadStatus> {
        progress.reset(files.len());
        let uploads = files.iter().enumerate().map(|(index, file)| {
            let progress = progress.clone();
            async move {
                let status = match self.upload_tracked(file, Some((progress.clone(), index))).await
                {
                    Ok(att) => UploadStatus::Done(att),
                    Err(err) => {
                        tracing::warn!(file = %file.filename, %err, "upload failed");
                        UploadStatus::Failed(err.to_string())
                    }
                };
                progress.set(index, status.clone());
                status
            }
        });
        futures::future::join_all(uploads).await
    }

    async fn upload_tracked(
        &self,
        file: &FileUpload,
        progress: Option<(UploadProgress, usize)>,
    ) -> Result<Attachment, ClientError> {
        let cdn = self.cdn.as_ref().ok_or(ClientError::Configuration)?;

        let resource = if file.is_image() { "image" } else { "raw" };
        let endpoint = format!("{UPLOAD_API_BASE}/{}/{resource}/upload", cdn.cloud_name);

        let total = file.bytes.len().max(1);
        let chunks: Vec<Vec<u8>> = file.bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let mut sent = 0usize;
        let body_stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len();
            if let Some((tracker, index)) = &progress {
                tracker.set_percent(*index, (sent * 100 / total) as u8);
            }
            Ok::<Vec<u8>, std::io::Error>(chunk)
        }));

        let mime = if file.mime_type.is_empty() {
            "application/octet-stream"
        } else {
            file.mime_type.as_str()
        };
        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(body_stream),
            file.bytes.len() as u64,
        )
        .file_name(file.filename.clone())
        .mime_str(mime)
        .map_err(|e| ClientError::Upload(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("upload_preset", cdn.upload_preset.clone())
            .part("file", part);

        let res = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Upload(e.to_string()))?;

        if !res.status().is_success() {
            return Err(ClientError::Upload(format!("HTTP {}", res.status())));
        }
        let response: UploadResponse = res
            .json()
            .await
            .map_err(|e| ClientError::Upload(e.to_string()))?;

        Ok(build_attachment(file, response, &cdn.cloud_name))
    }
}

/// Assemble the attachment record from the upload response.
fn build_attachment(file: &FileUpload, response: UploadResponse, cloud_name: &str) -> Attachment {
    let is_image = file.is_image();

    let download_url = match (&response.public_id, is_image) {
        // Raw files need the content-disposition variant to force save-to-disk
        (Some(public_id), false) => Some(format!(
            "{DELIVERY_BASE}/{cloud_name}/raw/upload/fl_attachment/{public_id}"
        )),
        _ => Some(response.secure_url.clone()),
    };

    Attachment {
        url: response.secure_url,
        download_url,
        filename: file.filename.clone(),
        kind: if is_image {
            AttachmentKind::Image
        } else {
            AttachmentKind::File
        },
        public_id: response.public_id,
        mime_type: file.mime_type.clone(),
    }
}
