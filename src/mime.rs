//! MIME type helpers for upload payloads.

const FALLBACK: &str = "application/octet-stream";

/// Guess a MIME type from a filename extension.
pub fn guess_from_name(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or(FALLBACK)
        .to_string()
}

/// Detect a MIME type from the leading bytes of a payload.
pub fn sniff(data: &[u8]) -> Option<String> {
    infer::get(data).map(|kind| kind.mime_type().to_string())
}

/// Whether the service can process the given MIME type (PDF documents and audio).
pub fn is_processable(mime_type: &str) -> bool {
    mime_type == "application/pdf" || mime_type.starts_with("audio/")
}
