//! Passthrough gate: decides whether a request can skip translation entirely and be forwarded
//! bit-for-bit, then validates the body for that direct-forward path.
//!
//! Grounded on `TranslationPipeline::translate_request_for_target` in
//! `other_examples/75da8d08` (the "already in target format, passthrough" check), generalised
//! from that file's format-equality test into an exact rule: every candidate endpoint must
//! declare native support, not merely share a format tag. The ingress layer is expected to
//! pre-filter to native-supporting candidates, but this gate is the final authority and
//! re-checks independently.

use crate::error::TranslationError;
use crate::llm::conversion::request::validate;
use crate::llm::types::foreign;

pub const PASSTHROUGH_TARGET_PATH: &str = "/v1/messages";

/// What a backend declares about its ability to accept the foreign wire format directly.
#[derive(Debug, Clone, Copy)]
pub struct NativeSupport {
	pub enabled: bool,
}

/// The outcome of a successful passthrough decision: the original bytes, unchanged, plus the
/// routing metadata the response path needs.
#[derive(Debug, Clone)]
pub struct PassthroughRequest<'a> {
	pub body: &'a [u8],
	pub target_path: &'static str,
	pub model_name: String,
	pub is_streaming: bool,
}

/// Passthrough is permitted iff `passthrough_enabled` is true, the candidate list is non-empty,
/// and every candidate has native support declared and enabled.
/// `native_support` is expected to be the ingress layer's `GetNativeSupport` lookup; returning
/// `None` for a candidate is treated the same as `enabled: false`.
pub fn is_permitted<T>(
	passthrough_enabled: bool,
	candidates: &[T],
	native_support: impl Fn(&T) -> Option<NativeSupport>,
) -> bool {
	passthrough_enabled
		&& !candidates.is_empty()
		&& candidates
			.iter()
			.all(|c| native_support(c).is_some_and(|s| s.enabled))
}

/// Validates a buffered body for the passthrough path: it must be under the size limit, parse as
/// a foreign request, and pass the same field validation request translation applies. The body
/// itself is returned unchanged; no rewrite occurs.
pub fn prepare(body: &[u8], max_body_size: usize) -> Result<PassthroughRequest<'_>, TranslationError> {
	if body.len() > max_body_size {
		return Err(TranslationError::RequestTooLarge);
	}
	let req: foreign::Request = serde_json::from_slice(body)?;
	validate(&req)?;
	Ok(PassthroughRequest {
		body,
		target_path: PASSTHROUGH_TARGET_PATH,
		model_name: req.model,
		is_streaming: req.stream,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	enum Backend {
		Native,
		NativeDisabled,
		Unsupported,
	}

	fn support(b: &Backend) -> Option<NativeSupport> {
		match b {
			Backend::Native => Some(NativeSupport { enabled: true }),
			Backend::NativeDisabled => Some(NativeSupport { enabled: false }),
			Backend::Unsupported => None,
		}
	}

	#[test]
	fn permitted_when_all_candidates_natively_support_and_enabled() {
		assert!(is_permitted(true, &[Backend::Native, Backend::Native], support));
	}

	#[test]
	fn denied_when_any_candidate_lacks_native_support() {
		assert!(!is_permitted(
			true,
			&[Backend::Native, Backend::Unsupported],
			support
		));
		assert!(!is_permitted(
			true,
			&[Backend::Native, Backend::NativeDisabled],
			support
		));
	}

	#[test]
	fn denied_when_disabled_or_no_candidates() {
		assert!(!is_permitted(false, &[Backend::Native], support));
		assert!(!is_permitted(true, &[], support));
	}

	#[test]
	fn prepare_returns_body_unchanged_and_routing_metadata() {
		let body = serde_json::to_vec(&serde_json::json!({
			"model": "m",
			"max_tokens": 10,
			"stream": true,
			"messages": [{"role": "user", "content": "hi"}],
		}))
		.unwrap();
		let prepared = prepare(&body, 10 * 1024 * 1024).unwrap();
		assert_eq!(prepared.body, body.as_slice());
		assert_eq!(prepared.target_path, PASSTHROUGH_TARGET_PATH);
		assert_eq!(prepared.model_name, "m");
		assert!(prepared.is_streaming);
	}

	#[test]
	fn prepare_rejects_invalid_body() {
		let body = serde_json::to_vec(&serde_json::json!({
			"model": "",
			"max_tokens": 10,
			"messages": [{"role": "user", "content": "hi"}],
		}))
		.unwrap();
		assert!(prepare(&body, 10 * 1024 * 1024).is_err());
	}
}
