//! Error-shape translation: turns a backend (or locally-raised) error into the fixed foreign
//! envelope `{"type":"error","error":{"type":<taxonomy-tag>,"message":<string>}}`.
//!
//! Grounded on the `translate_error` functions in the retrieved agentgateway forks
//! (`other_examples/0f675b69`, `other_examples/5a48c5cb`), which parse the source schema's own
//! error shape and re-wrap it; generalised here to also cover the case where the backend's body
//! isn't the expected JSON shape at all. An unprocessable backend response still needs some
//! envelope, not a hard crash.

use bytes::Bytes;

use crate::error::error_envelope;

/// A backend error body loosely shaped like `{"error": {"message": ..., "type": ...}}`. Only
/// `message` is ever forwarded; canonical backends' own `type` values don't belong in the
/// foreign taxonomy, which is keyed by HTTP status, not by what the backend calls it.
#[derive(Debug, serde::Deserialize)]
struct BackendErrorBody {
	error: BackendErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct BackendErrorDetail {
	message: String,
}

/// Translates a backend error response into the foreign error envelope for `status`. Falls back
/// to the raw (lossily-decoded) body as the message when it doesn't parse as the expected shape,
/// so a malformed or non-JSON backend error never prevents an error from reaching the client.
pub fn translate_backend_error(status: u16, body: &[u8]) -> Bytes {
	let message = match serde_json::from_slice::<BackendErrorBody>(body) {
		Ok(parsed) => parsed.error.message,
		Err(_) => String::from_utf8_lossy(body).into_owned(),
	};
	encode(status, message)
}

/// Translates a locally-raised message (one this core produced itself, not relayed from a
/// backend) into the same envelope shape.
pub fn translate_local_error(status: u16, message: impl Into<String>) -> Bytes {
	encode(status, message.into())
}

fn encode(status: u16, message: String) -> Bytes {
	let value = error_envelope(status, message);
	Bytes::from(serde_json::to_vec(&value).unwrap_or_else(|_| {
		br#"{"type":"error","error":{"type":"api_error","message":"failed to encode error"}}"#
			.to_vec()
	}))
}
