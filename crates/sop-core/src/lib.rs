//! sop-core: data model and in-memory editing for SOP documents.
//!
//! This crate provides the core functionality for:
//! - The Document → Step → SubHead → Question tree and its JSON wire shape
//! - Timestamp-based id generation
//! - The edit session model (deep working copy, positional mutations)
//! - Attachment classification and viewer/carousel logic
//!
//! There is no I/O here; fetching and persistence live in `sop-client`.

pub mod attachment;
pub mod edit;
pub mod ident;
pub mod model;

pub use attachment::{Carousel, FileIcon, download_url, is_image, view_url};
pub use edit::{BlockPath, EditError, EditSession};
pub use model::{Attachment, AttachmentKind, ContentBlock, Document, Question, Step, SubHead};
