//! The one concrete translator this gateway ships: foreign Anthropic-Messages ingress, canonical
//! OpenAI-chat-completions backend. Wires together request translation, response translation,
//! streaming transformation, token counting, and the passthrough gate behind the [`Translator`]
//! trait object the registry holds.

use agent_core::prelude::Strng;
use agent_core::strng;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::config::TranslationConfig;
use crate::error::TranslationError;
use crate::llm::types::canonical;
use crate::llm::{
	BodySizeLimited, ByteStream, ErrorWriter, ModelsLister, PassthroughCapable, PathProvider,
	TokenCounting, TranslatedRequest, Translator, conversion, passthrough, tokens,
};

pub const FORMAT_NAME: &str = "anthropic";

/// Stateless and reentrant: holds only the resolved configuration, never per-request state.
#[derive(Debug, Clone, Default)]
pub struct AnthropicTranslator {
	config: TranslationConfig,
}

impl AnthropicTranslator {
	pub fn new(config: TranslationConfig) -> Self {
		Self { config }
	}
}

impl Translator for AnthropicTranslator {
	fn name(&self) -> Strng {
		strng::literal!(FORMAT_NAME)
	}

	fn translate_request(&self, body: &[u8]) -> Result<TranslatedRequest, TranslationError> {
		conversion::request::translate(body, self.config.resolved_max_message_size())
	}

	fn translate_response(&self, canonical_body: &[u8]) -> Result<Bytes, TranslationError> {
		let canonical: canonical::Response = serde_json::from_slice(canonical_body)?;
		let foreign = conversion::response::translate(canonical)?;
		Ok(Bytes::from(serde_json::to_vec(&foreign)?))
	}

	fn translate_stream(&self, canonical: ByteStream, cancellation: CancellationToken) -> ByteStream {
		conversion::streaming::translate_stream(canonical, cancellation)
	}
}

impl PathProvider for AnthropicTranslator {
	fn format_name(&self) -> &str {
		FORMAT_NAME
	}
}

impl ErrorWriter for AnthropicTranslator {
	fn write_error(&self, status: u16, message: &str) -> Bytes {
		conversion::error::translate_local_error(status, message.to_string())
	}
}

impl TokenCounting for AnthropicTranslator {
	fn count_tokens(&self, body: &[u8]) -> Result<tokens::TokenCount, TranslationError> {
		tokens::count(body, self.config.resolved_max_message_size())
	}
}

impl PassthroughCapable for AnthropicTranslator {
	fn passthrough_target_path(&self) -> &'static str {
		passthrough::PASSTHROUGH_TARGET_PATH
	}
}

impl BodySizeLimited for AnthropicTranslator {
	fn max_body_size(&self) -> usize {
		self.config.resolved_max_message_size()
	}
}

impl ModelsLister for AnthropicTranslator {
	/// This translator rewrites whatever model name the caller sends straight through to the
	/// canonical request; it doesn't restrict the model catalogue itself, so it has none of its
	/// own to report. An empty list means "ask the endpoint registry", not "serves nothing".
	fn list_models(&self) -> Vec<Strng> {
		Vec::new()
	}
}
