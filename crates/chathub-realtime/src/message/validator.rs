//! Inbound frame validation and decoding.

use validator::Validate;

use chathub_core::error::AppError;

use super::types::InboundEvent;

/// Decode and validate a raw inbound text frame.
///
/// Oversized, empty, undecodable, or unknown frames and payloads that
/// fail field validation are all reported as malformed events.
pub fn parse_inbound(raw: &str, max_bytes: usize) -> Result<InboundEvent, AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::malformed_event(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::malformed_event("Empty frame"));
    }

    let event: InboundEvent = serde_json::from_str(raw)
        .map_err(|e| AppError::malformed_event(format!("Invalid event: {e}")))?;

    event
        .validate()
        .map_err(|e| AppError::malformed_event(format!("Invalid {} payload: {e}", event.name())))?;

    Ok(event)
}
