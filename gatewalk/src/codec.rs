//! Loading and saving documents as JSON blobs.

use tracing::{debug, warn};

use crate::{Document, DocumentProblem, EditorError, check};

/// Parse a document blob and check its structure.
///
/// Ids must be unique and every jump, reveal, parent and next-page
/// reference must resolve; otherwise the load is rejected with
/// [`EditorError::MalformedDocument`] listing every problem found.
pub fn load(blob: &str) -> Result<Document, EditorError> {
    let document: Document = serde_json::from_str(blob).map_err(|err| {
        warn!(error = %err, "rejecting unparseable document");
        EditorError::MalformedDocument(vec![DocumentProblem::Unparseable(err.to_string())])
    })?;

    let problems = check::problems(&document);
    if !problems.is_empty() {
        warn!(problems = problems.len(), "rejecting malformed document");
        return Err(EditorError::MalformedDocument(problems));
    }

    debug!(title = %document.title, pages = document.pages.len(), "loaded document");
    Ok(document)
}

/// Serialize a document verbatim.
///
/// The output is stable: saving a freshly loaded save yields the same bytes.
pub fn save(document: &Document) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}
