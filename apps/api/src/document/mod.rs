// Uploaded resume handling: the upload value type and page-ordered text extraction.

pub mod extractor;

use bytes::Bytes;

/// A resume file as received from the upload form. Consumed once by the extractor.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            content: content.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// True when the declared type or the leading magic bytes say PDF.
    pub fn is_pdf(&self) -> bool {
        let declared = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"));
        declared || self.content.starts_with(b"%PDF")
    }
}
