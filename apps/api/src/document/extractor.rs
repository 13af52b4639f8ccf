//! Resume text extraction. Pages are read in order and their text joined with
//! no separator; pages that yield nothing contribute an empty string.

use thiserror::Error;

use crate::document::UploadedDocument;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no document uploaded")]
    MissingInput,

    #[error("'{0}' is not a PDF document")]
    NotPdf(String),

    #[error("failed to parse PDF: {0}")]
    Malformed(#[from] lopdf::Error),
}

/// Extracts the concatenated text of every page of an uploaded PDF.
pub fn extract(document: Option<&UploadedDocument>) -> Result<String, ExtractError> {
    let document = document.ok_or(ExtractError::MissingInput)?;
    if !document.is_pdf() {
        return Err(ExtractError::NotPdf(document.file_name.clone()));
    }

    let doc = lopdf::Document::load_mem(&document.content)?;

    // get_pages is keyed by page number in a BTreeMap, so iteration is in page order.
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let text = concat_pages(pages.iter().map(|page| page_text(&doc, *page)));

    tracing::debug!(
        "Extracted {} chars from {} pages of '{}'",
        text.len(),
        pages.len(),
        document.file_name
    );

    Ok(text)
}

/// Text of one page. lopdf ends every text object with a newline; the one
/// closing the page is dropped so pages join without a separator.
fn page_text(doc: &lopdf::Document, page: u32) -> String {
    let mut text = doc.extract_text(&[page]).unwrap_or_default();
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Joins page texts in the order given, inserting nothing between them.
pub fn concat_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages.into_iter().fold(String::new(), |mut acc, page| {
        acc.push_str(page.as_ref());
        acc
    })
}
