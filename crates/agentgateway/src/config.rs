//! Configuration recognised by the translation core. The core itself never reads this from disk
//! or environment; that's the ingress layer's job. It just defines the typed shape downstream
//! config loaders deserialise into.

use std::path::PathBuf;

const DEFAULT_MAX_MESSAGE_SIZE: i64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationConfig {
	#[serde(default = "default_true")]
	pub enabled: bool,
	/// Hard upper bound for request bodies. `<= 0` resolves to 10 MiB (see
	/// [`TranslationConfig::resolved_max_message_size`]).
	#[serde(default)]
	pub max_message_size: i64,
	#[serde(default)]
	pub passthrough_enabled: bool,
	#[serde(default)]
	pub inspector: InspectorConfig,
}

fn default_true() -> bool {
	true
}

impl Default for TranslationConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			max_message_size: 0,
			passthrough_enabled: false,
			inspector: InspectorConfig::default(),
		}
	}
}

impl TranslationConfig {
	/// Applies the `<= 0 -> 10 MiB` fallback once, so the request path never re-checks it.
	pub fn resolved_max_message_size(&self) -> usize {
		if self.max_message_size <= 0 {
			DEFAULT_MAX_MESSAGE_SIZE as usize
		} else {
			self.max_message_size as usize
		}
	}
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorConfig {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default)]
	pub output_dir: Option<PathBuf>,
	#[serde(default)]
	pub session_header: Option<String>,
}

impl InspectorConfig {
	/// Fallback chain for the session header: configured header -> `X-Request-ID` -> `"default"`.
	pub fn resolve_session_header<'a>(&'a self, request_id_header: Option<&'a str>) -> &'a str {
		self
			.session_header
			.as_deref()
			.or(request_id_header)
			.unwrap_or("default")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_size_fallback() {
		let cfg = TranslationConfig::default();
		assert_eq!(cfg.resolved_max_message_size(), 10 * 1024 * 1024);

		let cfg = TranslationConfig {
			max_message_size: -5,
			..Default::default()
		};
		assert_eq!(cfg.resolved_max_message_size(), 10 * 1024 * 1024);

		let cfg = TranslationConfig {
			max_message_size: 42,
			..Default::default()
		};
		assert_eq!(cfg.resolved_max_message_size(), 42);
	}

	#[test]
	fn session_header_fallback_chain() {
		let cfg = InspectorConfig::default();
		assert_eq!(cfg.resolve_session_header(Some("req-1")), "req-1");
		assert_eq!(cfg.resolve_session_header(None), "default");

		let cfg = InspectorConfig {
			session_header: Some("x-session".to_string()),
			..Default::default()
		};
		assert_eq!(cfg.resolve_session_header(Some("req-1")), "x-session");
	}
}
