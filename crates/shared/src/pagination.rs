//! Cursor-based pagination for delivery history feeds.
//!
//! Delivery attempts are append-only and listed newest-first, so history
//! pagination uses an opaque composite cursor over (created_at, attempt_id)
//! instead of offsets. The id component disambiguates attempts recorded in
//! the same microsecond.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Error type for cursor operations.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid timestamp in cursor")]
    InvalidTimestamp,
    #[error("Invalid attempt id in cursor")]
    InvalidId,
}

/// Encodes a history cursor from an attempt's timestamp and id.
///
/// The cursor format is: base64url(RFC3339_timestamp:attempt_uuid).
pub fn encode_cursor(created_at: DateTime<Utc>, attempt_id: Uuid) -> String {
    let raw = format!(
        "{}:{}",
        created_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        attempt_id
    );
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// Decodes a history cursor into `(created_at, attempt_id)`.
pub fn decode_cursor(cursor: &str) -> Result<(DateTime<Utc>, Uuid), CursorError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| CursorError::InvalidEncoding)?;

    let s = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

    // Split on last colon (the timestamp itself contains colons)
    let colon_pos = s.rfind(':').ok_or(CursorError::InvalidFormat)?;
    let timestamp_str = &s[..colon_pos];
    let id_str = &s[colon_pos + 1..];

    let attempt_id: Uuid = id_str.parse().map_err(|_| CursorError::InvalidId)?;

    let created_at = DateTime::parse_from_rfc3339(timestamp_str)
        .map_err(|_| CursorError::InvalidTimestamp)?
        .with_timezone(&Utc);

    Ok((created_at, attempt_id))
}
