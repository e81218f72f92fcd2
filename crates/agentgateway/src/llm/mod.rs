//! The translation core: parses a foreign request, rewrites it to canonical, consumes a
//! canonical unary or streaming response, and re-serialises it back to foreign. `translator`
//! wires the pieces below into the one concrete [`Translator`] this gateway ships; `registry`
//! is the name-keyed lookup in front of it.

pub mod conversion;
pub mod metrics;
pub mod passthrough;
pub mod registry;
pub mod tokens;
pub mod translator;
pub mod types;

use std::pin::Pin;

use agent_core::prelude::Strng;
use bytes::Bytes;
use futures_core::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::{StreamError, TranslationError};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

/// What the request translator hands back to the ingress layer: the canonical request, routing
/// metadata, and the fixed backend path for the translated flow. `response_metadata` carries
/// whatever opaque state the matching response translator needs to see again (for the one
/// concrete translator this gateway ships, that's nothing, but the field exists so a translator
/// with per-request state, a model alias, a prompt cache key, doesn't have to thread it in
/// through a side channel).
#[derive(Debug, Clone)]
pub struct TranslatedRequest {
	pub canonical: types::canonical::Request,
	pub model: String,
	pub streaming: bool,
	pub backend_path: &'static str,
	pub response_metadata: Option<Strng>,
}

/// A named, stateless, reentrant translator between one foreign wire format and the canonical
/// one. Object-safe so the registry can hold `Arc<dyn Translator>` regardless of how many
/// formats this gateway eventually grows to support.
pub trait Translator: Send + Sync {
	fn name(&self) -> Strng;

	fn translate_request(&self, body: &[u8]) -> Result<TranslatedRequest, TranslationError>;

	fn translate_response(&self, canonical_body: &[u8]) -> Result<Bytes, TranslationError>;

	fn translate_stream(&self, canonical: ByteStream, cancellation: CancellationToken)
	-> ByteStream;
}

/// Exposes the ingress path this translator owns: `/<prefix>/<format>/v1/messages`.
pub trait PathProvider {
	fn format_name(&self) -> &str;
}

/// A translator that can serialise an arbitrary status/message pair into its own error envelope
/// rather than the gateway's default one.
pub trait ErrorWriter {
	fn write_error(&self, status: u16, message: &str) -> Bytes;
}

/// A translator that can estimate input tokens for its own request shape without a backend call.
pub trait TokenCounting {
	fn count_tokens(&self, body: &[u8]) -> Result<tokens::TokenCount, TranslationError>;
}

/// A translator that can enumerate the models it's willing to serve. Optional, since most
/// translators delegate model discovery to the ingress layer's endpoint registry instead.
pub trait ModelsLister {
	fn list_models(&self) -> Vec<Strng>;
}

/// A translator that can participate in the passthrough gate: it knows the backend path a
/// passthrough-forwarded request should take.
pub trait PassthroughCapable {
	fn passthrough_target_path(&self) -> &'static str;
}

/// A translator that declares its own request body size ceiling, independent of the gateway-wide
/// default.
pub trait BodySizeLimited {
	fn max_body_size(&self) -> usize;
}

/// Capability discovery without `dyn Any` downcasting as the primary mechanism: the registry
/// exposes `Arc<dyn Translator>`, and call sites that need an optional capability ask for it
/// through `as_any().downcast_ref` only as a last resort. Blanket-implemented so every
/// translator gets it for free.
pub trait AsAny {
	fn as_any(&self) -> &dyn std::any::Any;
}

impl<T: Translator + 'static> AsAny for T {
	fn as_any(&self) -> &dyn std::any::Any {
		self
	}
}
