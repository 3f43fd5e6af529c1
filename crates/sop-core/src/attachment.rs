//! Attachment classification and presentation logic.
//!
//! Upload-time `type` tags are not trustworthy: legacy records exist where a
//! PDF went through the image endpoint and got tagged `image`. Classification
//! therefore checks the mime type first, then lets the filename extension
//! veto a stale tag, and only then falls back to the extension heuristic.

use crate::model::{Attachment, AttachmentKind};

/// Extensions recognized as images when no usable mime type is present.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "avif"];

/// Extensions that veto a stale `image` tag.
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// Lowercased filename extension (text after the last `.`), or empty when the
/// filename has no extension.
fn extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Decide whether an attachment is an image for display purposes.
///
/// Mime type wins outright in both directions. A recorded `image` tag is
/// honored unless the filename says otherwise.
pub fn is_image(att: &Attachment) -> bool {
    if att.mime_type.starts_with("image/") {
        return true;
    }
    if !att.mime_type.is_empty() {
        return false;
    }
    let ext = extension(&att.filename);
    if att.kind == AttachmentKind::Image {
        return !DOCUMENT_EXTENSIONS.contains(&ext.as_str());
    }
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Icon category for the non-image file tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIcon {
    Pdf,
    Word,
    Sheet,
    Text,
    Archive,
    Generic,
}

impl FileIcon {
    pub fn for_attachment(att: &Attachment) -> Self {
        let mime = att.mime_type.to_lowercase();
        let name = att.filename.to_lowercase();
        let ends = |exts: &[&str]| exts.iter().any(|e| name.ends_with(e));

        if mime.contains("pdf") || ends(&[".pdf"]) {
            FileIcon::Pdf
        } else if mime.contains("word") || ends(&[".doc", ".docx"]) {
            FileIcon::Word
        } else if mime.contains("sheet") || mime.contains("excel") || ends(&[".xls", ".xlsx"]) {
            FileIcon::Sheet
        } else if mime.contains("text") || ends(&[".txt"]) {
            FileIcon::Text
        } else if mime.contains("zip") || mime.contains("rar") || ends(&[".zip", ".rar"]) {
            FileIcon::Archive
        } else {
            FileIcon::Generic
        }
    }
}

/// URL for the "view" action: open inline in a browser.
///
/// Storage backends serve PDFs with headers that make browsers download them,
/// so PDFs are routed through the Google Docs viewer instead of opened raw.
pub fn view_url(att: &Attachment) -> String {
    let is_pdf = att.mime_type.to_lowercase().contains("pdf")
        || att.filename.to_lowercase().ends_with(".pdf");
    if is_pdf {
        format!(
            "https://docs.google.com/viewer?url={}&embedded=true",
            urlencoding::encode(&att.url)
        )
    } else {
        att.url.clone()
    }
}

/// URL for the "download" action: must force save-to-disk.
///
/// Falls back to the inline URL for records uploaded before download
/// variants were recorded.
pub fn download_url(att: &Attachment) -> &str {
    att.download_url.as_deref().unwrap_or(&att.url)
}

/// Wrapping cursor over the images of a full-screen viewer.
///
/// Directional navigation wraps at both ends; an empty carousel has no
/// current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current position, or None when there is nothing to show.
    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.index)
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// Jump straight to a position (thumbnail click). Out-of-range is ignored.
    pub fn jump(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn att(mime: &str, filename: &str, kind: AttachmentKind) -> Attachment {
        Attachment {
            url: format!("https://cdn.example/{filename}"),
            download_url: None,
            filename: filename.into(),
            kind,
            public_id: None,
            mime_type: mime.into(),
        }
    }

    #[test]
    fn mime_type_wins_over_filename() {
        // A PDF named like an image is still not an image
        assert!(!is_image(&att("application/pdf", "x.png", AttachmentKind::File)));
        assert!(is_image(&att("image/png", "weird.bin", AttachmentKind::File)));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_image(&att("", "photo.JPG", AttachmentKind::File)));
        assert!(is_image(&att("", "scan.WebP", AttachmentKind::File)));
        assert!(!is_image(&att("", "report.docx", AttachmentKind::File)));
    }

    #[test]
    fn stale_image_tag_is_overridden_by_document_extension() {
        // Legacy record: uploaded through the image endpoint, tagged image
        assert!(!is_image(&att("", "scan.pdf", AttachmentKind::Image)));
        assert!(!is_image(&att("", "notes.docx", AttachmentKind::Image)));
        // But a tag with a plausible filename is honored
        assert!(is_image(&att("", "photo", AttachmentKind::Image)));
    }

    #[test]
    fn file_icons_classify_by_mime_then_extension() {
        assert_eq!(
            FileIcon::for_attachment(&att("application/pdf", "a", AttachmentKind::File)),
            FileIcon::Pdf
        );
        assert_eq!(
            FileIcon::for_attachment(&att("application/msword", "r.bin", AttachmentKind::File)),
            FileIcon::Word
        );
        assert_eq!(
            FileIcon::for_attachment(&att("", "budget.xlsx", AttachmentKind::File)),
            FileIcon::Sheet
        );
        assert_eq!(
            FileIcon::for_attachment(&att("", "notes.txt", AttachmentKind::File)),
            FileIcon::Text
        );
        assert_eq!(
            FileIcon::for_attachment(&att("", "bundle.zip", AttachmentKind::File)),
            FileIcon::Archive
        );
        assert_eq!(
            FileIcon::for_attachment(&att("application/octet-stream", "blob", AttachmentKind::File)),
            FileIcon::Generic
        );
    }

    #[test]
    fn pdf_view_goes_through_the_docs_viewer() {
        let a = att("application/pdf", "manual.pdf", AttachmentKind::File);
        let url = view_url(&a);
        assert!(url.starts_with("https://docs.google.com/viewer?url="));
        assert!(url.contains("https%3A%2F%2Fcdn.example%2Fmanual.pdf"));
        assert!(url.ends_with("&embedded=true"));

        let plain = att("text/plain", "notes.txt", AttachmentKind::File);
        assert_eq!(view_url(&plain), plain.url);
    }

    #[test]
    fn download_url_falls_back_to_inline() {
        let mut a = att("application/pdf", "manual.pdf", AttachmentKind::File);
        assert_eq!(download_url(&a), a.url);
        a.download_url = Some("https://cdn.example/fl_attachment/manual".into());
        assert_eq!(download_url(&a), "https://cdn.example/fl_attachment/manual");
    }

    #[test]
    fn carousel_wraps_both_directions() {
        let mut c = Carousel::new(3);
        assert_eq!(c.current(), Some(0));
        c.prev();
        assert_eq!(c.current(), Some(2));
        c.next();
        assert_eq!(c.current(), Some(0));
        c.next();
        c.next();
        assert_eq!(c.current(), Some(2));
        c.jump(1);
        assert_eq!(c.current(), Some(1));
        c.jump(9); // ignored
        assert_eq!(c.current(), Some(1));
    }

    #[test]
    fn empty_carousel_has_no_position() {
        let mut c = Carousel::new(0);
        assert_eq!(c.current(), None);
        c.next();
        c.prev();
        assert_eq!(c.current(), None);
    }
}
