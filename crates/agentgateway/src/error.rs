//! Error taxonomy for the translation core.
//!
//! Three enums, one per failure surface, mirroring the split the gateway's own `AIError` makes
//! between request parsing, streaming, and registry lookup rather than one grab-bag type.

use agent_core::strng::Strng;

/// Errors raised while translating a request or a unary response.
#[derive(thiserror::Error, Debug)]
pub enum TranslationError {
	#[error("request body exceeds the configured size limit")]
	RequestTooLarge,
	#[error("failed to parse request: {0}")]
	RequestParsing(#[from] serde_json::Error),
	#[error("missing required field: {0}")]
	MissingField(&'static str),
	#[error("field {field} is out of range: {value}")]
	OutOfRange { field: &'static str, value: String },
	#[error("tool_choice of type \"tool\" requires a name")]
	InvalidToolChoice,
	#[error("canonical response had no choices")]
	MissingChoices,
	#[error("canonical response choice had no message")]
	MissingMessage,
	#[error("content of this shape cannot be represented in the foreign schema")]
	UnrepresentableContent,
}

impl TranslationError {
	/// HTTP status this error should be reported as by the ingress layer.
	pub fn status_code(&self) -> u16 {
		match self {
			TranslationError::RequestTooLarge
			| TranslationError::RequestParsing(_)
			| TranslationError::MissingField(_)
			| TranslationError::OutOfRange { .. }
			| TranslationError::InvalidToolChoice => 400,
			TranslationError::MissingChoices
			| TranslationError::MissingMessage
			| TranslationError::UnrepresentableContent => 502,
		}
	}

	/// The `error.type` taxonomy tag for the foreign error envelope (see `error_envelope`).
	pub fn taxonomy_tag(&self) -> &'static str {
		taxonomy_tag_for_status(self.status_code())
	}
}

/// Fatal errors from the streaming transformer. Recoverable local conditions (malformed SSE
/// chunk, unparseable tool-argument JSON, a tool_use missing id/name) are not represented here:
/// they are logged and the stream continues, so they never need to become a propagated error
/// value.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
	#[error("error reading from backend stream: {0}")]
	Io(#[from] std::io::Error),
	#[error("SSE line exceeded the maximum length of {limit} bytes")]
	LineTooLong { limit: usize },
	#[error("request was cancelled")]
	Cancelled,
}

impl StreamError {
	pub fn status_code(&self) -> u16 {
		match self {
			StreamError::Cancelled => 499,
			_ => 502,
		}
	}
}

/// Errors from the translator registry.
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
	#[error("no translator registered for {name:?}; available: {available:?}")]
	NotFound { name: String, available: Vec<Strng> },
	#[error("translator name must not be empty")]
	EmptyName,
}

/// Maps an HTTP status onto the foreign-visible taxonomy tag.
pub fn taxonomy_tag_for_status(status: u16) -> &'static str {
	match status {
		400 => "invalid_request_error",
		401 => "authentication_error",
		403 => "permission_error",
		404 => "not_found_error",
		429 => "rate_limit_error",
		503 => "overloaded_error",
		_ => "api_error",
	}
}

/// Serialises any error, given its resolved HTTP status, into the fixed foreign error envelope:
/// `{"type": "error", "error": {"type": <tag>, "message": <string>}}`.
pub fn error_envelope(status: u16, message: impl Into<String>) -> serde_json::Value {
	serde_json::json!({
		"type": "error",
		"error": {
			"type": taxonomy_tag_for_status(status),
			"message": message.into(),
		}
	})
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(400, "invalid_request_error")]
	#[case(401, "authentication_error")]
	#[case(403, "permission_error")]
	#[case(404, "not_found_error")]
	#[case(429, "rate_limit_error")]
	#[case(503, "overloaded_error")]
	#[case(500, "api_error")]
	#[case(418, "api_error")]
	fn taxonomy_mapping(#[case] status: u16, #[case] tag: &str) {
		assert_eq!(taxonomy_tag_for_status(status), tag);
	}

	#[test]
	fn envelope_shape() {
		let v = error_envelope(429, "slow down");
		assert_eq!(v["type"], "error");
		assert_eq!(v["error"]["type"], "rate_limit_error");
		assert_eq!(v["error"]["message"], "slow down");
	}
}
