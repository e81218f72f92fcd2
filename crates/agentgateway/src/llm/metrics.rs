//! Ambient metrics: counters for passthrough decisions, translation errors by taxonomy tag, and
//! streaming frames emitted, registered into the same `prometheus-client` sub-registry convention
//! as `agent_core::metrics::sub_registry`.

use agent_core::metrics::sub_registry;
use agent_core::strng::RichStrng;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Hash, PartialEq, Eq, Debug, EncodeLabelSet)]
pub struct PassthroughLabel {
	pub format: RichStrng,
	pub permitted: bool,
}

#[derive(Clone, Hash, PartialEq, Eq, Debug, EncodeLabelSet)]
pub struct TranslationErrorLabel {
	pub format: RichStrng,
	pub taxonomy: RichStrng,
}

#[derive(Clone, Hash, PartialEq, Eq, Debug, EncodeLabelSet)]
pub struct StreamFrameLabel {
	pub format: RichStrng,
	pub event: RichStrng,
}

/// Per-process metrics for the translation core. Constructed once at startup and shared behind
/// an `Arc` by whichever ingress layer wires up the registry.
pub struct Metrics {
	passthrough_decisions: Family<PassthroughLabel, Counter>,
	translation_errors: Family<TranslationErrorLabel, Counter>,
	stream_frames: Family<StreamFrameLabel, Counter>,
}

impl Metrics {
	pub fn new(registry: &mut Registry) -> Self {
		let registry = sub_registry(registry);

		let passthrough_decisions = Family::default();
		registry.register(
			"passthrough_decisions",
			"Count of passthrough gate decisions by translator format and outcome",
			passthrough_decisions.clone(),
		);

		let translation_errors = Family::default();
		registry.register(
			"translation_errors",
			"Count of translation errors by translator format and taxonomy tag",
			translation_errors.clone(),
		);

		let stream_frames = Family::default();
		registry.register(
			"stream_frames",
			"Count of foreign SSE frames emitted by translator format and event name",
			stream_frames.clone(),
		);

		Self {
			passthrough_decisions,
			translation_errors,
			stream_frames,
		}
	}

	pub fn record_passthrough_decision(&self, format: RichStrng, permitted: bool) {
		self
			.passthrough_decisions
			.get_or_create(&PassthroughLabel { format, permitted })
			.inc();
	}

	pub fn record_translation_error(&self, format: RichStrng, taxonomy: RichStrng) {
		self
			.translation_errors
			.get_or_create(&TranslationErrorLabel { format, taxonomy })
			.inc();
	}

	pub fn record_stream_frame(&self, format: RichStrng, event: RichStrng) {
		self
			.stream_frames
			.get_or_create(&StreamFrameLabel { format, event })
			.inc();
	}
}
