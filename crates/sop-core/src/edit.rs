//! The tree edit model: staged, in-memory mutation of one document.
//!
//! An [`EditSession`] exclusively owns a deep copy of a document. Mutations
//! address content blocks by position ([`BlockPath`]) and apply immediately
//! and synchronously against the current working copy — positional paths are
//! only sound because there is no batching, so an index can never go stale
//! between being computed and being applied. Nothing outside the session
//! sees a change until the whole working copy is committed through the
//! store's update operation.

use crate::ident;
use crate::model::{Attachment, ContentBlock, Document, Question, Step, SubHead};
use std::fmt;
use thiserror::Error;

/// Position of a content block inside the working copy.
///
/// Indices are positions in the current sequences, not stable identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPath {
    Step(usize),
    SubHead(usize, usize),
    Question(usize, usize, usize),
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockPath::Step(i) => write!(f, "step {i}"),
            BlockPath::SubHead(i, j) => write!(f, "step {i} / sub head {j}"),
            BlockPath::Question(i, j, k) => write!(f, "step {i} / sub head {j} / question {k}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("no content block at {0}")]
    InvalidPath(BlockPath),

    #[error("no attachment at index {index} in {path}")]
    AttachmentOutOfRange { path: BlockPath, index: usize },
}

pub type Result<T> = std::result::Result<T, EditError>;

/// An in-progress edit of one document.
///
/// Holds the working copy; dropping the session without saving leaves the
/// store and the remote collection untouched.
#[derive(Debug, Clone)]
pub struct EditSession {
    document: Document,
}

impl EditSession {
    /// Start a session on a deep copy of `document`.
    pub fn begin(document: Document) -> Self {
        Self { document }
    }

    /// The current working copy.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consume the session, yielding the working copy for commit.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Replace the document's name. Empty is a valid value; the backend,
    /// not this layer, enforces presence on create.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.document.name = name.into();
    }

    /// Append a new step with a generated id and default title.
    pub fn add_step(&mut self) -> &Step {
        self.document.steps.push(Step {
            id: ident::step_id(),
            step_head: ContentBlock::titled("New Step"),
            sub_heads: Vec::new(),
        });
        self.document.steps.last().unwrap()
    }

    /// Remove the step at `i`, discarding all of its sub heads and questions.
    pub fn delete_step(&mut self, i: usize) -> Result<()> {
        if i >= self.document.steps.len() {
            return Err(EditError::InvalidPath(BlockPath::Step(i)));
        }
        self.document.steps.remove(i);
        Ok(())
    }

    /// Append a new sub head to step `i`.
    pub fn add_sub_head(&mut self, i: usize) -> Result<&SubHead> {
        let step = self
            .document
            .steps
            .get_mut(i)
            .ok_or(EditError::InvalidPath(BlockPath::Step(i)))?;
        step.sub_heads.push(SubHead {
            id: ident::sub_head_id(),
            sub_head_name: ContentBlock::titled("New Sub"),
            questions: Vec::new(),
        });
        Ok(step.sub_heads.last().unwrap())
    }

    /// Remove sub head `j` of step `i`, discarding its questions.
    pub fn delete_sub_head(&mut self, i: usize, j: usize) -> Result<()> {
        let step = self
            .document
            .steps
            .get_mut(i)
            .ok_or(EditError::InvalidPath(BlockPath::Step(i)))?;
        if j >= step.sub_heads.len() {
            return Err(EditError::InvalidPath(BlockPath::SubHead(i, j)));
        }
        step.sub_heads.remove(j);
        Ok(())
    }

    /// Append a new question to sub head `j` of step `i`.
    pub fn add_question(&mut self, i: usize, j: usize) -> Result<&Question> {
        let sub = self.sub_head_mut(i, j)?;
        sub.questions.push(Question {
            id: ident::question_id(),
            content: ContentBlock::titled("New Q"),
        });
        Ok(sub.questions.last().unwrap())
    }

    /// Remove question `k` of sub head `j` of step `i`.
    pub fn delete_question(&mut self, i: usize, j: usize, k: usize) -> Result<()> {
        let sub = self.sub_head_mut(i, j)?;
        if k >= sub.questions.len() {
            return Err(EditError::InvalidPath(BlockPath::Question(i, j, k)));
        }
        sub.questions.remove(k);
        Ok(())
    }

    /// Replace the title text of the block at `path`.
    pub fn set_text(&mut self, path: BlockPath, value: impl Into<String>) -> Result<()> {
        self.block_mut(path)?.text = value.into();
        Ok(())
    }

    /// Replace the subtext of the block at `path`. Empty string is a valid,
    /// distinct value.
    pub fn set_subtext(&mut self, path: BlockPath, value: impl Into<String>) -> Result<()> {
        self.block_mut(path)?.subtext = value.into();
        Ok(())
    }

    /// Replace the link of the block at `path`.
    pub fn set_link(&mut self, path: BlockPath, value: impl Into<String>) -> Result<()> {
        self.block_mut(path)?.link = value.into();
        Ok(())
    }

    /// Append an attachment to the block at `path`.
    pub fn push_attachment(&mut self, path: BlockPath, attachment: Attachment) -> Result<()> {
        self.block_mut(path)?.attachments.push(attachment);
        Ok(())
    }

    /// Remove the attachment at `index` within the block at `path`.
    ///
    /// Returns the removed record. The uploaded object itself is not deleted
    /// from remote storage; orphaning it is the accepted behavior.
    pub fn remove_attachment(&mut self, path: BlockPath, index: usize) -> Result<Attachment> {
        let block = self.block_mut(path)?;
        if index >= block.attachments.len() {
            return Err(EditError::AttachmentOutOfRange { path, index });
        }
        Ok(block.attachments.remove(index))
    }

    /// Resolve `path` to its content block in the working copy.
    pub fn block_mut(&mut self, path: BlockPath) -> Result<&mut ContentBlock> {
        let err = EditError::InvalidPath(path);
        match path {
            BlockPath::Step(i) => self
                .document
                .steps
                .get_mut(i)
                .map(|s| &mut s.step_head)
                .ok_or(err),
            BlockPath::SubHead(i, j) => self
                .document
                .steps
                .get_mut(i)
                .and_then(|s| s.sub_heads.get_mut(j))
                .map(|sh| &mut sh.sub_head_name)
                .ok_or(err),
            BlockPath::Question(i, j, k) => self
                .document
                .steps
                .get_mut(i)
                .and_then(|s| s.sub_heads.get_mut(j))
                .and_then(|sh| sh.questions.get_mut(k))
                .map(|q| &mut q.content)
                .ok_or(err),
        }
    }

    fn sub_head_mut(&mut self, i: usize, j: usize) -> Result<&mut SubHead> {
        self.document
            .steps
            .get_mut(i)
            .ok_or(EditError::InvalidPath(BlockPath::Step(i)))?
            .sub_heads
            .get_mut(j)
            .ok_or(EditError::InvalidPath(BlockPath::SubHead(i, j)))
    }
}
