//! Result Extractor — pulls the analysis text out of the thread's messages.

use crate::analysis::client::ThreadMessage;
use crate::analysis::saga::AnalysisError;

/// Soft fallback shown when the run finished without an assistant reply.
/// This is a user-facing sentinel, not an error condition.
pub const NO_ANALYSIS_SENTINEL: &str = "No analysis was generated.";

/// Returns the text of the first assistant-authored message. The message
/// list arrives newest-first, so this is the assistant's latest reply.
///
/// An assistant message whose first content part is not plain text is a
/// data-contract violation and surfaces as an error rather than an empty
/// string.
pub fn extract_analysis(messages: &[ThreadMessage]) -> Result<String, AnalysisError> {
    let Some(message) = messages.iter().find(|m| m.role == "assistant") else {
        return Ok(NO_ANALYSIS_SENTINEL.to_string());
    };

    message
        .content
        .first()
        .and_then(|part| part.text.as_ref())
        .map(|text| text.value.clone())
        .ok_or(AnalysisError::ExtractionMalformed)
}
