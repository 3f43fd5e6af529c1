//! The SOP document tree and its JSON wire shape.
//!
//! A Document owns an ordered list of Steps, each Step owns SubHeads, each
//! SubHead owns Questions. Steps, sub heads, and questions all carry the same
//! `{text, subtext, link, attachments}` content — one [`ContentBlock`] record
//! rather than three structurally identical shapes. Field names on the wire
//! are the backend's camelCase (`stepHead`, `subHeads`, `downloadUrl`, ...).
//!
//! Every collection field defaults to empty on deserialization: a document
//! with no `steps` key and a document with `"steps": []` are the same value.

use serde::{Deserialize, Serialize};

/// Top-level aggregate: one procedure, containing an ordered list of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Document {
    /// Create an empty document with the given id and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            steps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub step_head: ContentBlock,
    #[serde(default)]
    pub sub_heads: Vec<SubHead>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubHead {
    pub id: String,
    pub sub_head_name: ContentBlock,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Leaf node. On the wire a question is a ContentBlock with an `id` inlined
/// next to the content fields, so the shared shape is flattened in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(flatten)]
    pub content: ContentBlock,
}

/// The common content shape shared by step heads, sub head names, and
/// questions: a title, optional markdown subtext, optional link, and an
/// ordered list of attachments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub text: String,
    #[serde(default)]
    pub subtext: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl ContentBlock {
    /// A block with the given title and everything else empty.
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subtext: String::new(),
            link: String::new(),
            attachments: Vec::new(),
        }
    }
}

/// Coarse attachment tag recorded at upload time.
///
/// Display code must not trust this blindly: legacy records exist where a
/// document was uploaded through the image endpoint and tagged `image`.
/// See [`crate::attachment::is_image`] for the authoritative check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    File,
}

/// Metadata for one previously uploaded file associated with a content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Inline URL, safe to open or embed directly.
    pub url: String,
    /// Content-disposition variant that forces save-to-disk. Falls back to
    /// `url` when absent (images are served fine either way).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default)]
    pub mime_type: String,
}
