//! Message validation rules.

use validator::Validate;

use seatlock_core::error::AppError;

use super::types::InboundMessage;

/// Maximum allowed message size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 65_536;

/// Validates a raw inbound frame before parsing.
pub fn validate_frame(raw: &str) -> Result<(), AppError> {
    if raw.len() > MAX_MESSAGE_SIZE {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {MAX_MESSAGE_SIZE} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Validates the payload of a parsed message.
pub fn validate_inbound(msg: &InboundMessage) -> Result<(), AppError> {
    let result = match msg {
        InboundMessage::JoinShowtime(id) | InboundMessage::LeaveShowtime(id) => {
            return seatlock_core::types::id::validate_identifier("showtimeId", id.as_str());
        }
        InboundMessage::RequestLock(req) => req.validate(),
        InboundMessage::ReleaseLock(req) => req.validate(),
    };
    result.map_err(|e| AppError::validation(format!("Invalid payload: {e}")))
}
